use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 单页条数上限
pub const MAX_PAGE_SIZE: i64 = 100;

// 分页查询参数，页码和条数允许以字符串形式出现在查询串里
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/pagination.ts")]
pub struct PaginationQuery {
    #[serde(default = "default_page", deserialize_with = "lenient_i64")]
    pub page: i64,
    #[serde(default = "default_size", deserialize_with = "lenient_i64")]
    pub size: i64,
}

// 分页响应信息
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/pagination.ts")]
pub struct PaginationInfo {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl PaginationInfo {
    pub fn new(page: u64, page_size: u64, total: u64, total_pages: u64) -> Self {
        Self {
            page: page as i64,
            page_size: page_size as i64,
            total: total as i64,
            total_pages: total_pages as i64,
        }
    }
}

/// 存储层使用的页码与条数：页码从 1 开始，条数限制在 1..=MAX_PAGE_SIZE
pub fn page_bounds(page: Option<i64>, size: Option<i64>, default_size: i64) -> (u64, u64) {
    let page = page.unwrap_or(1).max(1);
    let size = size.unwrap_or(default_size).clamp(1, MAX_PAGE_SIZE);
    (page as u64, size as u64)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(i64),
    Text(String),
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("expected an integer, got {s:?}"))),
    }
}

fn default_page() -> i64 {
    1
}

fn default_size() -> i64 {
    20
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            size: default_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::web::Query;

    #[test]
    fn test_query_string_parsing() {
        let q = Query::<PaginationQuery>::from_query("page=3&size=50").unwrap();
        assert_eq!((q.page, q.size), (3, 50));

        let q = Query::<PaginationQuery>::from_query("").unwrap();
        assert_eq!((q.page, q.size), (1, 20));

        assert!(Query::<PaginationQuery>::from_query("page=abc").is_err());
    }

    #[test]
    fn test_page_bounds() {
        assert_eq!(page_bounds(None, None, 10), (1, 10));
        assert_eq!(page_bounds(Some(0), Some(500), 10), (1, MAX_PAGE_SIZE as u64));
        assert_eq!(page_bounds(Some(4), Some(0), 10), (4, 1));
    }
}
