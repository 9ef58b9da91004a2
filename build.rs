use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const DIST_DIR: &str = "frontend/dist";

// 前端未构建时的占位页，%SCHOOL_NAME% 和 %BASE_PATH% 在运行时替换
const PLACEHOLDER_INDEX: &str = r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <base href="%BASE_PATH%/">
  <title>%SCHOOL_NAME%</title>
  <style>
    body { font-family: system-ui, sans-serif; max-width: 640px; margin: 80px auto; padding: 0 16px; color: #1f2933; }
    .card { border: 1px solid #d9e2ec; border-radius: 8px; padding: 16px 24px; background: #f8fafc; }
    code { background: #eef2f6; padding: 1px 5px; border-radius: 4px; }
  </style>
</head>
<body>
  <h1>%SCHOOL_NAME%</h1>
  <div class="card">
    <p>后端服务已启动，但管理界面尚未构建。</p>
    <p>构建前端：<code>cd frontend &amp;&amp; bun install &amp;&amp; bun run build</code></p>
    <p>接口前缀：<code>%BASE_PATH%/api/v1/</code></p>
  </div>
</body>
</html>
"#;

fn main() {
    println!("cargo:rerun-if-changed={DIST_DIR}");

    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        return;
    };
    let dist = PathBuf::from(manifest_dir).join(DIST_DIR);
    if dist.join("index.html").exists() {
        return;
    }

    println!("cargo:warning={DIST_DIR} 不存在，嵌入占位页面");
    if let Err(e) = write_placeholder(&dist) {
        panic!("无法生成占位前端 {}: {e}", dist.display());
    }
}

// rust-embed 要求目录存在
fn write_placeholder(dist: &Path) -> io::Result<()> {
    fs::create_dir_all(dist.join("assets"))?;
    fs::write(dist.join("index.html"), PLACEHOLDER_INDEX)?;
    fs::write(dist.join("favicon.ico"), [])
}
