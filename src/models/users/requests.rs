use super::entities::{Permission, UserRole, UserStatus};
use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

/// `GET /api/v1/users` 的查询参数
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct UserListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    /// 匹配用户名、邮箱或显示名
    pub search: Option<String>,
}

/// 管理员创建办公账号
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    #[serde(default)]
    pub display_name: Option<String>,
    /// 为空时使用角色预置权限
    #[serde(default)]
    pub permissions: Option<Vec<Permission>>,
}

/// 只更新传入的字段
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    pub display_name: Option<String>,
    /// 传空数组表示恢复为角色预置权限
    pub permissions: Option<Vec<Permission>>,
}

impl UpdateUserRequest {
    /// 重置密码或停用账号后，已有会话全部作废
    pub fn revokes_sessions(&self) -> bool {
        self.password.is_some() || self.status.is_some_and(|s| s != UserStatus::Active)
    }
}

/// 存储层的用户列表条件
#[derive(Debug, Clone, Default)]
pub struct UserListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revokes_sessions() {
        assert!(!UpdateUserRequest::default().revokes_sessions());

        let rename = UpdateUserRequest {
            display_name: Some("Front Desk".to_string()),
            ..Default::default()
        };
        assert!(!rename.revokes_sessions());

        let disable = UpdateUserRequest {
            status: Some(UserStatus::Suspended),
            ..Default::default()
        };
        assert!(disable.revokes_sessions());

        let reset = UpdateUserRequest {
            password: Some("NewPassw0rd".to_string()),
            ..Default::default()
        };
        assert!(reset.revokes_sessions());
    }
}
