//! 学年升级
//!
//! 升级映射保存在配置 `promotion.class_map` 中：班级名 -> 下一班级名，
//! 或 `GRADUATE` 表示毕业离校。

pub mod entities;
pub mod requests;
pub mod responses;

pub use entities::{PromotionTarget, parse_class_map};
