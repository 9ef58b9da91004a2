use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use futures_util::TryStreamExt;
use futures_util::stream::StreamExt;
use std::fs;
use std::io::Write;
use std::{fs::File, path::Path};
use uuid::Uuid;

use super::{FileService, stored_path};
use crate::config::AppConfig;
use crate::errors::SchoolError;
use crate::middlewares::RequireJWT;
use crate::models::ErrorCode;
use crate::models::{
    ApiResponse,
    activity::entities::{ActivityAction, EntityType},
    files::responses::FileUploadResponse,
};
use crate::services::{DynamicConfig, record_activity, storage_error_response};
use crate::utils::validate_magic_bytes;

const MAX_FILE_NAME_LEN: usize = 255;

/// 小写扩展名，带点号
fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}

// 去掉路径部分，只保留文件名
fn sanitize_file_name(raw: &str) -> String {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    name.chars()
        .filter(|c| !c.is_control() && *c != '"')
        .take(MAX_FILE_NAME_LEN)
        .collect()
}

fn upload_failed(msg: &str) -> HttpResponse {
    HttpResponse::InternalServerError()
        .json(ApiResponse::error_empty(ErrorCode::FileUploadFailed, msg))
}

pub async fn handle_upload(
    service: &FileService,
    req: &HttpRequest,
    mut payload: Multipart,
) -> ActixResult<HttpResponse> {
    // 目录来自静态配置，大小和类型限制来自动态配置
    let config = AppConfig::get();
    let upload_dir = &config.upload.dir;
    let max_size = DynamicConfig::upload_max_size().await;
    let allowed_types = DynamicConfig::upload_allowed_types().await;

    if !Path::new(upload_dir).exists()
        && let Err(e) = fs::create_dir_all(upload_dir)
    {
        tracing::error!("{}", SchoolError::file_operation(format!("{e}")));
        return Ok(upload_failed("创建上传目录失败"));
    }

    let mut original_name = String::new();
    let mut file_size: i64 = 0;
    let mut file_uploaded = false;
    let mut file_type = String::new();
    let file_token = Uuid::new_v4().simple().to_string();
    let file_path = stored_path(upload_dir, &file_token);

    while let Ok(Some(mut field)) = payload.try_next().await {
        let content_disposition = field.content_disposition();
        let name = content_disposition
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();

        if name != "file" {
            continue;
        }
        if file_uploaded {
            let _ = fs::remove_file(&file_path);
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::MultifileUploadNotAllowed,
                "Only one file can be uploaded at a time",
            )));
        }
        file_uploaded = true;

        original_name = content_disposition
            .and_then(|cd| cd.get_filename())
            .map(sanitize_file_name)
            .unwrap_or_default();

        let extension = extension_of(&original_name);
        if extension.is_empty() || !allowed_types.iter().any(|t| t.to_lowercase() == extension) {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::FileTypeNotAllowed,
                "File type not allowed",
            )));
        }

        // MIME 类型只用于记录，不参与校验
        file_type = field
            .content_type()
            .map(|ct| ct.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let mut f = match File::create(&file_path) {
            Ok(file) => file,
            Err(e) => {
                tracing::error!("{}", SchoolError::file_operation(format!("{e}")));
                return Ok(upload_failed("文件创建失败"));
            }
        };

        let mut total_size: usize = 0;
        let mut first_chunk = true;
        while let Some(chunk) = field.next().await {
            let data = match chunk {
                Ok(data) => data,
                Err(e) => {
                    let _ = fs::remove_file(&file_path);
                    return Err(e.into());
                }
            };

            if first_chunk {
                first_chunk = false;
                if !validate_magic_bytes(&data, &extension) {
                    let _ = fs::remove_file(&file_path);
                    return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                        ErrorCode::FileTypeNotAllowed,
                        "文件内容与扩展名不匹配",
                    )));
                }
            }

            total_size += data.len();
            if total_size > max_size {
                let _ = fs::remove_file(&file_path);
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::FileSizeExceeded,
                    "File size exceeds the limit",
                )));
            }
            if let Err(e) = f.write_all(&data) {
                let _ = fs::remove_file(&file_path);
                tracing::error!("{}", SchoolError::file_operation(format!("{e}")));
                return Ok(upload_failed("文件写入失败"));
            }
        }
        file_size = total_size as i64;
    }

    if !file_uploaded {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::FileNotFound,
            "No file found in upload payload",
        )));
    }
    if file_size == 0 {
        let _ = fs::remove_file(&file_path);
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::FileUploadFailed,
            "文件为空",
        )));
    }

    let storage = service.get_storage(req);
    let user_id = RequireJWT::extract_user_id(req);

    match storage
        .upload_file(&file_token, &original_name, file_size, &file_type, user_id)
        .await
    {
        Ok(file) => {
            record_activity(
                &storage,
                req,
                ActivityAction::Upload,
                EntityType::File,
                None,
                format!("上传文件 {}（{} 字节）", file.file_name, file.file_size),
            )
            .await;
            let response = FileUploadResponse {
                url: format!("/api/v1/upload/{}", file.file_token),
                file_token: file.file_token,
                file_name: file.file_name,
                size: file.file_size,
                content_type: file.file_type,
                uploaded_at: file.uploaded_at,
            };
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(response, "File uploaded successfully")))
        }
        Err(e) => {
            let _ = fs::remove_file(&file_path);
            Ok(storage_error_response(&e, ErrorCode::FileUploadFailed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("photo.JPG"), ".jpg");
        assert_eq!(extension_of("report.final.pdf"), ".pdf");
        assert_eq!(extension_of("README"), "");
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\Users\\a\\photo.png"), "photo.png");
        assert_eq!(sanitize_file_name("a\"b.pdf"), "ab.pdf");
        assert_eq!(sanitize_file_name(&"x".repeat(300)).len(), MAX_FILE_NAME_LEN);
    }
}
