//! 业务数据模型
//!
//! 每个资源按 `entities` / `requests` / `responses` 拆分，
//! 与 `entity` 模块中的 SeaORM 数据库实体相互独立。

pub mod activity;
pub mod auth;
pub mod classes;
pub mod common;
pub mod dashboard;
pub mod fees;
pub mod files;
pub mod finance;
pub mod promotion;
pub mod staff;
pub mod students;
pub mod system;
pub mod users;

pub use common::{ApiResponse, PaginationInfo, PaginationQuery};

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// API 业务错误码
///
/// 0 表示成功；1xxx 通用；2xxx 认证与用户；3xxx 学生 / 教职工 / 班级；
/// 4xxx 收费；5xxx 财务；6xxx 文件与导出；7xxx 配置与升级。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    InternalServerError = 1005,
    Conflict = 1009,
    RateLimitExceeded = 1029,

    // 认证与用户
    AuthFailed = 2000,
    SessionExpired = 2001,
    UserNotFound = 2004,
    UserNameInvalid = 2010,
    UserEmailInvalid = 2011,
    UserPasswordInvalid = 2012,
    UserAlreadyExists = 2013,
    UserCreationFailed = 2014,
    UserUpdateFailed = 2015,
    UserDeleteFailed = 2016,
    CanNotDeleteCurrentUser = 2017,
    UserInactive = 2018,
    SessionNotFound = 2020,

    // 学生 / 教职工 / 班级
    StudentNotFound = 3004,
    StudentAlreadyExists = 3013,
    StudentInvalid = 3010,
    StaffNotFound = 3104,
    StaffAlreadyExists = 3113,
    StaffInvalid = 3110,
    SalaryAlreadyPaid = 3120,
    ClassNotFound = 3204,
    ClassAlreadyExists = 3213,
    ClassInvalid = 3210,
    ClassHasStudents = 3220,

    // 收费
    FeeTypeNotFound = 4004,
    FeeTypeAlreadyExists = 4013,
    FeeTypeInUse = 4020,
    FeeStructureNotFound = 4104,
    FeeStructureInvalid = 4110,
    FeeCustomNotFound = 4204,
    FeeRecordNotFound = 4304,
    FeeRecordWaived = 4320,
    PaymentNotFound = 4404,
    PaymentInvalid = 4410,
    PaymentExceedsBalance = 4420,

    // 财务
    AccountNotFound = 5004,
    AccountAlreadyExists = 5013,
    AccountInUse = 5020,
    AccountInactive = 5021,
    InsufficientBalance = 5030,
    TransactionNotFound = 5104,
    TransactionInvalid = 5110,
    TransactionLocked = 5120,

    // 文件与导出
    FileNotFound = 6004,
    FileUploadFailed = 6010,
    FileTypeNotAllowed = 6011,
    FileSizeExceeded = 6012,
    MultifileUploadNotAllowed = 6013,
    ExportFailed = 6020,

    // 配置与升级
    SettingNotFound = 7004,
    SettingInvalid = 7010,
    PromotionMapInvalid = 7110,
    PromotionFailed = 7120,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success as i32, 0);
        assert_eq!(ErrorCode::Unauthorized as i32, 1001);
        assert_eq!(ErrorCode::PaymentExceedsBalance as i32, 4420);
    }
}
