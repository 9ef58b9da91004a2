use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::define_string_enum! {
    // 操作类型
    #[derive(TS)]
    #[ts(export, export_to = "../frontend/src/types/generated/activity.ts", rename_all = "snake_case")]
    pub enum ActivityAction {
        Login => "login",
        Logout => "logout",
        Create => "create",
        Update => "update",
        Delete => "delete",
        Payment => "payment",
        Reversal => "reversal",
        Generate => "generate",
        Promote => "promote",
        Export => "export",
        Upload => "upload",
    }
}

crate::define_string_enum! {
    // 操作对象类型
    #[derive(TS)]
    #[ts(export, export_to = "../frontend/src/types/generated/activity.ts", rename_all = "snake_case")]
    pub enum EntityType {
        User => "user",
        Session => "session",
        Student => "student",
        Staff => "staff",
        Class => "class",
        FeeType => "fee_type",
        FeeStructure => "fee_structure",
        FeeCustom => "fee_custom",
        FeeRecord => "fee_record",
        FeePayment => "fee_payment",
        Account => "account",
        Transaction => "transaction",
        Setting => "setting",
        Promotion => "promotion",
        File => "file",
        ActivityLog => "activity_log",
    }
}

// 操作日志
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/activity.ts")]
pub struct ActivityLog {
    pub id: i64,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub action: ActivityAction,
    pub entity_type: EntityType,
    pub entity_id: Option<i64>,
    pub description: String,
    pub ip_address: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct NewActivityLog {
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub action: ActivityAction,
    pub entity_type: EntityType,
    pub entity_id: Option<i64>,
    pub description: String,
    pub ip_address: Option<String>,
}
