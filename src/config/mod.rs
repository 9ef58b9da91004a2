//! 应用配置
//!
//! 静态配置来自配置文件与环境变量，启动后只读；
//! 运行期可修改的业务配置见 `services::config::DynamicConfig`。

#[path = "impl.rs"]
mod loader;
mod structs;

pub use structs::*;
