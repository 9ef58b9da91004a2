use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/file.ts")]
pub struct File {
    // 下载令牌，同时是磁盘上的文件名
    pub file_token: String,
    // 原始文件名
    pub file_name: String,
    pub file_size: i64,
    pub file_type: String,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
    // 上传者，用户删除后为空
    pub user_id: Option<i64>,
}
