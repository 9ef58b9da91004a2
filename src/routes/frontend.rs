//! 管理界面静态资源
//!
//! 构建产物通过 rust-embed 编译进二进制。`./frontend-custom/` 下的同名文件优先，
//! 便于现场替换 logo 等资源。未知路径回退到 index.html，`api/` 前缀除外。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use rust_embed::Embed;
use std::path::Path;

use crate::models::{ApiResponse, ErrorCode};
use crate::services::DynamicConfig;
use crate::services::fees::receipt::escape_html;

const INDEX: &str = "index.html";
const CUSTOM_DIR: &str = "./frontend-custom";

#[derive(Embed)]
#[folder = "frontend/dist/"]
struct FrontendAssets;

/// 按扩展名区分的资源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssetKind {
    Html,
    /// 文件名带 hash 的构建产物，可长期缓存
    Immutable(&'static str),
    Other(&'static str),
}

impl AssetKind {
    fn of(path: &str) -> Self {
        let ext = Path::new(path)
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "html" => AssetKind::Html,
            "js" | "mjs" => AssetKind::Immutable("application/javascript; charset=utf-8"),
            "css" => AssetKind::Immutable("text/css; charset=utf-8"),
            "png" => AssetKind::Immutable("image/png"),
            "jpg" | "jpeg" => AssetKind::Immutable("image/jpeg"),
            "svg" => AssetKind::Immutable("image/svg+xml"),
            "webp" => AssetKind::Immutable("image/webp"),
            "woff" => AssetKind::Immutable("font/woff"),
            "woff2" => AssetKind::Immutable("font/woff2"),
            "ttf" => AssetKind::Immutable("font/ttf"),
            "ico" => AssetKind::Other("image/x-icon"),
            "json" | "map" => AssetKind::Other("application/json"),
            "pdf" => AssetKind::Other("application/pdf"),
            "txt" => AssetKind::Other("text/plain; charset=utf-8"),
            "webmanifest" => AssetKind::Other("application/manifest+json"),
            _ => AssetKind::Other("application/octet-stream"),
        }
    }

    fn content_type(self) -> &'static str {
        match self {
            AssetKind::Html => "text/html; charset=utf-8",
            AssetKind::Immutable(mime) | AssetKind::Other(mime) => mime,
        }
    }

    fn cache_control(self) -> &'static str {
        match self {
            AssetKind::Immutable(_) => "public, max-age=31536000, immutable",
            _ => "no-cache",
        }
    }
}

/// 填充 index.html 中的学校名称与基础路径
fn process_html(content: &[u8], school_name: &str) -> Vec<u8> {
    String::from_utf8_lossy(content)
        .replace("%BASE_PATH%", "")
        .replace("%SCHOOL_NAME%", &escape_html(school_name))
        .into_bytes()
}

fn load(path: &str) -> Option<Vec<u8>> {
    // 不允许跳出自定义目录
    if !path.contains("..")
        && let Ok(data) = std::fs::read(format!("{CUSTOM_DIR}/{path}"))
    {
        return Some(data);
    }
    FrontendAssets::get(path).map(|f| f.data.into_owned())
}

pub async fn serve_frontend(req: HttpRequest) -> ActixResult<HttpResponse> {
    let path = req.match_info().query("tail").trim_start_matches('/');

    if path == "api" || path.starts_with("api/") {
        return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::NotFound,
            format!("接口不存在: /{path}"),
        )));
    }

    let resolved = if path.is_empty() {
        None
    } else {
        load(path).map(|data| (path, data))
    };
    let Some((file, data)) = resolved.or_else(|| load(INDEX).map(|data| (INDEX, data))) else {
        return Ok(HttpResponse::NotFound()
            .content_type("text/plain; charset=utf-8")
            .body("管理界面资源缺失，请重新构建前端"));
    };

    let kind = AssetKind::of(file);
    let body = if kind == AssetKind::Html {
        process_html(&data, &DynamicConfig::school_name().await)
    } else {
        data
    };

    Ok(HttpResponse::Ok()
        .content_type(kind.content_type())
        .insert_header(("Cache-Control", kind.cache_control()))
        .body(body))
}

/// 兜底路由，必须最后注册
pub fn configure_frontend_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/{tail:.*}", web::get().to(serve_frontend));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test as actix_test};

    #[test]
    fn test_asset_kind() {
        assert_eq!(AssetKind::of("index.html"), AssetKind::Html);
        assert_eq!(
            AssetKind::of("assets/app.3f2a.js").content_type(),
            "application/javascript; charset=utf-8"
        );
        assert_eq!(
            AssetKind::of("assets/LOGO.PNG").cache_control(),
            "public, max-age=31536000, immutable"
        );
        assert_eq!(AssetKind::of("favicon.ico").cache_control(), "no-cache");
        assert_eq!(
            AssetKind::of("blob.bin").content_type(),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_process_html_placeholders() {
        let html = b"<title>%SCHOOL_NAME%</title><base href=\"%BASE_PATH%/\">";
        let out = String::from_utf8(process_html(html, "St. Mary's & Co")).unwrap();
        assert_eq!(out, "<title>St. Mary&#39;s &amp; Co</title><base href=\"/\">");
    }

    #[actix_web::test]
    async fn test_unknown_api_path_is_not_spa() {
        let app = actix_test::init_service(App::new().configure(configure_frontend_routes)).await;
        let req = actix_test::TestRequest::get().uri("/api/v1/nope").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    }
}
