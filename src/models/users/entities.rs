use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::define_string_enum! {
    // 用户角色
    #[derive(TS)]
    #[ts(export, export_to = "../frontend/src/types/generated/user.ts", rename_all = "snake_case")]
    pub enum UserRole {
        Admin => "admin",               // 管理员
        Accountant => "accountant",     // 财务
        Teacher => "teacher",           // 教师
        Receptionist => "receptionist", // 前台
    }
}

impl UserRole {
    pub fn admin_roles() -> &'static [&'static UserRole] {
        &[&Self::Admin]
    }
    pub fn office_roles() -> &'static [&'static UserRole] {
        &[&Self::Admin, &Self::Accountant, &Self::Receptionist]
    }

    /// 角色的预置权限集合
    pub fn default_permissions(&self) -> Vec<Permission> {
        use Permission::*;
        match self {
            UserRole::Admin => Permission::ALL.to_vec(),
            UserRole::Accountant => vec![
                StudentsView,
                StaffView,
                ClassesView,
                FeesView,
                FeesManage,
                FeesCollect,
                FinanceView,
                FinanceManage,
                DashboardView,
            ],
            UserRole::Teacher => vec![StudentsView, ClassesView, FeesView, DashboardView],
            UserRole::Receptionist => vec![
                StudentsView,
                StudentsManage,
                ClassesView,
                FeesView,
                FeesCollect,
                DashboardView,
            ],
        }
    }
}

crate::define_string_enum! {
    // 用户状态
    #[derive(TS)]
    #[ts(export, export_to = "../frontend/src/types/generated/user.ts", rename_all = "snake_case")]
    pub enum UserStatus {
        Active => "active",       // 活跃
        Inactive => "inactive",   // 非活跃
        Suspended => "suspended", // 暂停
    }
}

crate::define_string_enum! {
    // 细粒度权限
    #[derive(TS)]
    #[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
    pub enum Permission {
        #[ts(rename = "students.view")]
        StudentsView => "students.view",
        #[ts(rename = "students.manage")]
        StudentsManage => "students.manage",
        #[ts(rename = "staff.view")]
        StaffView => "staff.view",
        #[ts(rename = "staff.manage")]
        StaffManage => "staff.manage",
        #[ts(rename = "classes.view")]
        ClassesView => "classes.view",
        #[ts(rename = "classes.manage")]
        ClassesManage => "classes.manage",
        #[ts(rename = "fees.view")]
        FeesView => "fees.view",
        #[ts(rename = "fees.manage")]
        FeesManage => "fees.manage",
        #[ts(rename = "fees.collect")]
        FeesCollect => "fees.collect",
        #[ts(rename = "finance.view")]
        FinanceView => "finance.view",
        #[ts(rename = "finance.manage")]
        FinanceManage => "finance.manage",
        #[ts(rename = "users.manage")]
        UsersManage => "users.manage",
        #[ts(rename = "dashboard.view")]
        DashboardView => "dashboard.view",
        #[ts(rename = "config.manage")]
        ConfigManage => "config.manage",
        #[ts(rename = "activity.view")]
        ActivityView => "activity.view",
        #[ts(rename = "promotion.run")]
        PromotionRun => "promotion.run",
    }
}

/// 从数据库中的 JSON 数组解析权限列表，未知取值忽略
pub fn parse_permissions(raw: &str) -> Option<Vec<Permission>> {
    let values: Vec<String> = serde_json::from_str(raw).ok()?;
    Some(values.iter().filter_map(|v| v.parse().ok()).collect())
}

// 用户实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)] // 不序列化到JSON响应中
    #[ts(skip)]
    pub password_hash: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub display_name: Option<String>,
    // 为空时使用角色的预置权限
    pub permissions: Option<Vec<Permission>>,
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    /// 用户实际生效的权限
    pub fn effective_permissions(&self) -> Vec<Permission> {
        if self.role == UserRole::Admin {
            return Permission::ALL.to_vec();
        }
        match &self.permissions {
            Some(list) => list.clone(),
            None => self.role.default_permissions(),
        }
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.effective_permissions().contains(&permission)
    }

    /// 生成 token 对（access + refresh），绑定登录会话
    pub fn generate_token_pair(
        &self,
        session_id: &str,
        refresh_token_expiry: Option<chrono::TimeDelta>,
    ) -> Result<crate::utils::jwt::TokenPair, String> {
        crate::utils::jwt::JwtUtils::generate_token_pair(
            self.id,
            &self.role.to_string(),
            session_id,
            refresh_token_expiry,
        )
        .map_err(|e| format!("生成 token 对失败: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole, permissions: Option<Vec<Permission>>) -> User {
        User {
            id: 1,
            username: "tester".to_string(),
            email: "tester@example.com".to_string(),
            password_hash: String::new(),
            role,
            status: UserStatus::Active,
            display_name: None,
            permissions,
            last_login: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_admin_has_everything() {
        let admin = user(UserRole::Admin, Some(vec![]));
        assert!(admin.has_permission(Permission::PromotionRun));
        assert!(admin.has_permission(Permission::UsersManage));
    }

    #[test]
    fn test_role_defaults() {
        let accountant = user(UserRole::Accountant, None);
        assert!(accountant.has_permission(Permission::FinanceManage));
        assert!(!accountant.has_permission(Permission::UsersManage));

        let teacher = user(UserRole::Teacher, None);
        assert!(teacher.has_permission(Permission::StudentsView));
        assert!(!teacher.has_permission(Permission::FeesCollect));
    }

    #[test]
    fn test_explicit_permissions_replace_defaults() {
        let teacher = user(UserRole::Teacher, Some(vec![Permission::FeesCollect]));
        assert!(teacher.has_permission(Permission::FeesCollect));
        assert!(!teacher.has_permission(Permission::StudentsView));
    }

    #[test]
    fn test_parse_permissions_skips_unknown() {
        let parsed = parse_permissions(r#"["fees.view","bogus","finance.manage"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![Permission::FeesView, Permission::FinanceManage]
        );
        assert!(parse_permissions("not json").is_none());
    }

    #[test]
    fn test_role_serde() {
        let role: UserRole = serde_json::from_str("\"receptionist\"").unwrap();
        assert_eq!(role, UserRole::Receptionist);
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"admin\"");
    }
}
