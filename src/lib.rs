//! SchoolMS - 学校办公管理后端服务
//!
//! 学生、员工、班级、收费与财务的 REST API，基于 Actix Web 与 SeaORM。
//!
//! 请求经 `routes` 进入 `services`，业务逻辑只通过 `storage::Storage` 访问数据库。
//! 收费计算（`models::fees::calculator`）是纯函数，不依赖存储。
//! `runtime` 负责启动时的迁移与管理员初始化、每小时的收费状态刷新以及优雅关闭。
//! `DynamicConfig` 缓存数据库中的可调配置，修改后立即生效。

pub mod cache;
pub mod config;
pub mod entity;
pub mod errors;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
