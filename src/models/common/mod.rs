pub mod pagination;
pub mod response;
pub mod string_enum;

pub use pagination::{PaginationInfo, PaginationQuery, page_bounds};
pub use response::ApiResponse;
