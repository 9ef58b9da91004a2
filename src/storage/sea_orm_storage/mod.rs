//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod activity;
mod classes;
mod dashboard;
mod fee_payments;
mod fee_records;
mod fee_structures;
mod fee_types;
mod files;
mod finance;
mod lookups;
mod promotion;
mod sessions;
mod staff;
mod students;
mod system_settings;
mod users;

use crate::config::AppConfig;
use crate::errors::{Result, SchoolError};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| SchoolError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| SchoolError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| SchoolError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| SchoolError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 使用已建立的连接（测试与嵌入场景）
    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(SchoolError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

/// 写操作错误映射：唯一约束冲突转为 `Conflict`
pub(crate) fn write_error<'a>(
    action: &'a str,
    conflict: &'a str,
) -> impl FnOnce(DbErr) -> SchoolError + 'a {
    move |e| {
        let err = SchoolError::database_operation(format!("{action}: {e}"));
        if err.is_unique_violation() {
            SchoolError::conflict(conflict)
        } else {
            err
        }
    }
}

// Storage trait 实现
use crate::models::{
    activity::{
        entities::{ActivityLog, NewActivityLog},
        requests::ActivityListQuery,
        responses::ActivityListResponse,
    },
    auth::{
        requests::SessionListQuery,
        responses::{ActiveSession, SessionListResponse},
    },
    classes::{
        entities::Class,
        requests::{ClassListQuery, CreateClassRequest, UpdateClassRequest},
        responses::ClassListResponse,
    },
    dashboard::responses::{ClassFeeSummary, FeeSummary, MonthlyCollection, StudentCounts},
    fees::{
        calculator::FeeContext,
        entities::{
            ClassFeeStructureDetail, FeePaymentDetail, FeeRecordDetail, FeeType, NewFeePayment,
            StudentFeeCustom,
        },
        requests::{
            CreateFeeTypeRequest, FeeCustomListParams, FeeRecordListQuery, FeeStructureListParams,
            GenerateFeeRecordsRequest, PaymentListQuery, UpdateFeeRecordRequest,
            UpdateFeeTypeRequest, UpsertFeeCustomRequest, UpsertFeeStructureRequest,
        },
        responses::{
            FeeRecordListResponse, FeeRecordWithPayments, GenerateFeeRecordsResponse,
            PaymentListResponse, PaymentResponse,
        },
    },
    files::entities::File,
    finance::{
        entities::{Account, NewTransaction, Transaction},
        requests::{CreateAccountRequest, TransactionListQuery, UpdateAccountRequest},
        responses::{FinanceSummaryResponse, TransactionListResponse},
    },
    promotion::entities::PromotionStep,
    staff::{
        entities::{Staff, StaffCounts},
        requests::{CreateStaffRequest, SalaryPayment, StaffListQuery, UpdateStaffRequest},
        responses::{SalaryPaymentResponse, StaffListResponse},
    },
    students::{
        entities::{Student, StudentDetail},
        requests::{
            CreateStudentRequest, EnrolledStudentFilter, StudentListQuery, UpdateStudentRequest,
        },
        responses::StudentListResponse,
    },
    system::entities::SystemSetting,
    users::{
        entities::User,
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::storage::Storage;
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
impl Storage for SeaOrmStorage {
    // ==================== 用户 ====================

    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.delete_user_impl(id).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    // ==================== 会话 ====================

    async fn create_session(&self, session: ActiveSession) -> Result<ActiveSession> {
        self.create_session_impl(session).await
    }

    async fn get_session(&self, id: &str) -> Result<Option<ActiveSession>> {
        self.get_session_impl(id).await
    }

    async fn touch_session(&self, id: &str) -> Result<bool> {
        self.touch_session_impl(id).await
    }

    async fn delete_session(&self, id: &str) -> Result<bool> {
        self.delete_session_impl(id).await
    }

    async fn delete_user_sessions(&self, user_id: i64) -> Result<u64> {
        self.delete_user_sessions_impl(user_id).await
    }

    async fn list_sessions(&self, query: SessionListQuery) -> Result<SessionListResponse> {
        self.list_sessions_impl(query).await
    }

    async fn purge_expired_sessions(&self) -> Result<u64> {
        self.purge_expired_sessions_impl().await
    }

    // ==================== 操作日志 ====================

    async fn create_activity_log(&self, log: NewActivityLog) -> Result<ActivityLog> {
        self.create_activity_log_impl(log).await
    }

    async fn list_activity_logs(&self, query: ActivityListQuery) -> Result<ActivityListResponse> {
        self.list_activity_logs_impl(query).await
    }

    async fn list_activity_logs_for_export(
        &self,
        query: ActivityListQuery,
    ) -> Result<Vec<ActivityLog>> {
        self.list_activity_logs_for_export_impl(query).await
    }

    // ==================== 文件 ====================

    async fn upload_file(
        &self,
        file_token: &str,
        file_name: &str,
        file_size: i64,
        file_type: &str,
        user_id: Option<i64>,
    ) -> Result<File> {
        self.upload_file_impl(file_token, file_name, file_size, file_type, user_id)
            .await
    }

    async fn get_file_by_token(&self, file_token: &str) -> Result<Option<File>> {
        self.get_file_by_token_impl(file_token).await
    }

    // ==================== 系统设置 ====================

    async fn list_all_settings(&self) -> Result<Vec<SystemSetting>> {
        self.list_all_settings_impl().await
    }

    async fn get_setting(&self, key: &str) -> Result<Option<SystemSetting>> {
        self.get_setting_by_key_impl(key).await
    }

    async fn update_setting(
        &self,
        key: &str,
        value: &str,
        updated_by: Option<i64>,
    ) -> Result<Option<SystemSetting>> {
        self.update_setting_impl(key, value, updated_by).await
    }

    // ==================== 班级 ====================

    async fn create_class(&self, class: CreateClassRequest) -> Result<Class> {
        self.create_class_impl(class).await
    }

    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>> {
        self.get_class_by_id_impl(class_id).await
    }

    async fn get_class_by_name(&self, name: &str) -> Result<Option<Class>> {
        self.get_class_by_name_impl(name).await
    }

    async fn list_classes_with_pagination(
        &self,
        query: ClassListQuery,
    ) -> Result<ClassListResponse> {
        self.list_classes_with_pagination_impl(query).await
    }

    async fn list_all_classes(&self) -> Result<Vec<Class>> {
        self.list_all_classes_impl().await
    }

    async fn update_class(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>> {
        self.update_class_impl(class_id, update).await
    }

    async fn delete_class(&self, class_id: i64) -> Result<bool> {
        self.delete_class_impl(class_id).await
    }

    async fn count_active_students(&self, class_id: i64) -> Result<i64> {
        self.count_active_students_impl(class_id).await
    }

    // ==================== 学生 ====================

    async fn create_student(&self, student: CreateStudentRequest) -> Result<Student> {
        self.create_student_impl(student).await
    }

    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>> {
        self.get_student_by_id_impl(id).await
    }

    async fn get_student_detail(&self, id: i64) -> Result<Option<StudentDetail>> {
        self.get_student_detail_impl(id).await
    }

    async fn list_students_with_pagination(
        &self,
        query: StudentListQuery,
    ) -> Result<StudentListResponse> {
        self.list_students_with_pagination_impl(query).await
    }

    async fn update_student(
        &self,
        id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>> {
        self.update_student_impl(id, update).await
    }

    async fn delete_student(&self, id: i64) -> Result<bool> {
        self.delete_student_impl(id).await
    }

    async fn list_enrolled_students(&self, filter: EnrolledStudentFilter) -> Result<Vec<Student>> {
        self.list_enrolled_students_impl(filter).await
    }

    async fn count_students_by_status(&self) -> Result<StudentCounts> {
        self.count_students_by_status_impl().await
    }

    // ==================== 教职工 ====================

    async fn create_staff(&self, staff: CreateStaffRequest) -> Result<Staff> {
        self.create_staff_impl(staff).await
    }

    async fn get_staff_by_id(&self, id: i64) -> Result<Option<Staff>> {
        self.get_staff_by_id_impl(id).await
    }

    async fn list_staff_with_pagination(
        &self,
        query: StaffListQuery,
    ) -> Result<StaffListResponse> {
        self.list_staff_with_pagination_impl(query).await
    }

    async fn update_staff(&self, id: i64, update: UpdateStaffRequest) -> Result<Option<Staff>> {
        self.update_staff_impl(id, update).await
    }

    async fn delete_staff(&self, id: i64) -> Result<bool> {
        self.delete_staff_impl(id).await
    }

    async fn pay_salary(&self, payment: SalaryPayment) -> Result<SalaryPaymentResponse> {
        self.pay_salary_impl(payment).await
    }

    async fn reset_salary_statuses(&self, current_month: &str) -> Result<u64> {
        self.reset_salary_statuses_impl(current_month).await
    }

    async fn count_staff(&self) -> Result<StaffCounts> {
        self.count_staff_impl().await
    }

    // ==================== 收费项目 ====================

    async fn create_fee_type(&self, req: CreateFeeTypeRequest) -> Result<FeeType> {
        self.create_fee_type_impl(req).await
    }

    async fn get_fee_type_by_id(&self, id: i64) -> Result<Option<FeeType>> {
        self.get_fee_type_by_id_impl(id).await
    }

    async fn list_fee_types(&self, include_inactive: bool) -> Result<Vec<FeeType>> {
        self.list_fee_types_impl(include_inactive).await
    }

    async fn update_fee_type(
        &self,
        id: i64,
        update: UpdateFeeTypeRequest,
    ) -> Result<Option<FeeType>> {
        self.update_fee_type_impl(id, update).await
    }

    async fn delete_fee_type(&self, id: i64) -> Result<bool> {
        self.delete_fee_type_impl(id).await
    }

    // ==================== 收费标准与个别收费 ====================

    async fn list_fee_structures(
        &self,
        params: FeeStructureListParams,
    ) -> Result<Vec<ClassFeeStructureDetail>> {
        self.list_fee_structures_impl(params).await
    }

    async fn upsert_fee_structure(
        &self,
        req: UpsertFeeStructureRequest,
    ) -> Result<ClassFeeStructureDetail> {
        self.upsert_fee_structure_impl(req).await
    }

    async fn delete_fee_structure(&self, id: i64) -> Result<bool> {
        self.delete_fee_structure_impl(id).await
    }

    async fn list_fee_customs(
        &self,
        params: FeeCustomListParams,
    ) -> Result<Vec<StudentFeeCustom>> {
        self.list_fee_customs_impl(params).await
    }

    async fn upsert_fee_custom(&self, req: UpsertFeeCustomRequest) -> Result<StudentFeeCustom> {
        self.upsert_fee_custom_impl(req).await
    }

    async fn delete_fee_custom(&self, id: i64) -> Result<bool> {
        self.delete_fee_custom_impl(id).await
    }

    // ==================== 收费记录 ====================

    async fn list_fee_records(
        &self,
        query: FeeRecordListQuery,
        ctx: FeeContext,
    ) -> Result<FeeRecordListResponse> {
        self.list_fee_records_impl(query, ctx).await
    }

    async fn generate_fee_records(
        &self,
        req: GenerateFeeRecordsRequest,
        ctx: FeeContext,
    ) -> Result<GenerateFeeRecordsResponse> {
        self.generate_fee_records_impl(req, ctx).await
    }

    async fn get_fee_record_detail(
        &self,
        id: i64,
        ctx: FeeContext,
    ) -> Result<Option<FeeRecordWithPayments>> {
        self.get_fee_record_detail_impl(id, ctx).await
    }

    async fn update_fee_record(
        &self,
        id: i64,
        update: UpdateFeeRecordRequest,
        ctx: FeeContext,
    ) -> Result<Option<FeeRecordDetail>> {
        self.update_fee_record_impl(id, update, ctx).await
    }

    async fn list_student_fee_records(
        &self,
        student_id: i64,
        academic_year: Option<String>,
        ctx: FeeContext,
    ) -> Result<Vec<FeeRecordDetail>> {
        self.list_student_fee_records_impl(student_id, academic_year, ctx)
            .await
    }

    async fn list_fee_records_for_export(
        &self,
        academic_year: Option<String>,
        class_id: Option<i64>,
        ctx: FeeContext,
    ) -> Result<Vec<FeeRecordDetail>> {
        self.list_fee_records_for_export_impl(academic_year, class_id, ctx)
            .await
    }

    async fn refresh_fee_statuses(&self, ctx: FeeContext) -> Result<u64> {
        self.refresh_fee_statuses_impl(ctx).await
    }

    // ==================== 缴费 ====================

    async fn record_fee_payment(
        &self,
        payment: NewFeePayment,
        ctx: FeeContext,
    ) -> Result<PaymentResponse> {
        self.record_fee_payment_impl(payment, ctx).await
    }

    async fn list_fee_payments(&self, query: PaymentListQuery) -> Result<PaymentListResponse> {
        self.list_fee_payments_impl(query).await
    }

    async fn get_fee_payment_detail(&self, id: i64) -> Result<Option<FeePaymentDetail>> {
        self.get_fee_payment_detail_impl(id).await
    }

    async fn delete_fee_payment(
        &self,
        id: i64,
        ctx: FeeContext,
    ) -> Result<Option<FeeRecordDetail>> {
        self.delete_fee_payment_impl(id, ctx).await
    }

    async fn recent_fee_payments(&self, limit: u64) -> Result<Vec<FeePaymentDetail>> {
        self.recent_fee_payments_impl(limit).await
    }

    // ==================== 财务 ====================

    async fn create_account(&self, req: CreateAccountRequest) -> Result<Account> {
        self.create_account_impl(req).await
    }

    async fn get_account_by_id(&self, id: i64) -> Result<Option<Account>> {
        self.get_account_by_id_impl(id).await
    }

    async fn list_accounts(&self, include_inactive: bool) -> Result<Vec<Account>> {
        self.list_accounts_impl(include_inactive).await
    }

    async fn update_account(
        &self,
        id: i64,
        update: UpdateAccountRequest,
    ) -> Result<Option<Account>> {
        self.update_account_impl(id, update).await
    }

    async fn delete_account(&self, id: i64) -> Result<bool> {
        self.delete_account_impl(id).await
    }

    async fn create_transaction(&self, txn: NewTransaction) -> Result<Transaction> {
        self.create_transaction_impl(txn).await
    }

    async fn get_transaction_by_id(&self, id: i64) -> Result<Option<Transaction>> {
        self.get_transaction_by_id_impl(id).await
    }

    async fn list_transactions(
        &self,
        query: TransactionListQuery,
    ) -> Result<TransactionListResponse> {
        self.list_transactions_impl(query).await
    }

    async fn delete_transaction(&self, id: i64) -> Result<bool> {
        self.delete_transaction_impl(id).await
    }

    async fn finance_summary(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<FinanceSummaryResponse> {
        self.finance_summary_impl(from, to).await
    }

    // ==================== 统计 ====================

    async fn fee_summary(&self, academic_year: &str) -> Result<FeeSummary> {
        self.fee_summary_impl(academic_year).await
    }

    async fn monthly_collections(&self, year: i32) -> Result<Vec<MonthlyCollection>> {
        self.monthly_collections_impl(year).await
    }

    async fn class_fee_summaries(&self, academic_year: &str) -> Result<Vec<ClassFeeSummary>> {
        self.class_fee_summaries_impl(academic_year).await
    }

    // ==================== 学年升级 ====================

    async fn promote_student(&self, step: PromotionStep, ctx: FeeContext) -> Result<i64> {
        self.promote_student_impl(step, ctx).await
    }
}

/// 内存 SQLite，已执行迁移
#[cfg(test)]
pub(crate) async fn test_storage() -> SeaOrmStorage {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    // 内存库只存在于单个连接中
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.expect("connect sqlite memory");
    Migrator::up(&db, None).await.expect("run migrations");
    SeaOrmStorage::from_connection(db)
}

#[cfg(test)]
pub(crate) mod tests_support {
    use super::SeaOrmStorage;
    use crate::models::{
        classes::{entities::Class, requests::CreateClassRequest},
        fees::{
            entities::{FeeFrequency, FeeType},
            requests::CreateFeeTypeRequest,
        },
        finance::{
            entities::{Account, AccountType},
            requests::CreateAccountRequest,
        },
        staff::{entities::Staff, requests::CreateStaffRequest},
        students::{entities::Student, requests::CreateStudentRequest},
        users::{
            entities::{User, UserRole},
            requests::CreateUserRequest,
        },
    };

    pub async fn seed_user(storage: &SeaOrmStorage, username: &str) -> User {
        storage
            .create_user_impl(CreateUserRequest {
                username: username.to_string(),
                email: format!("{username}@school.test"),
                password: "hashed".to_string(),
                role: UserRole::Receptionist,
                display_name: None,
                permissions: None,
            })
            .await
            .unwrap()
    }

    pub async fn seed_class(storage: &SeaOrmStorage, name: &str, sort_order: i32) -> Class {
        storage
            .create_class_impl(CreateClassRequest {
                name: name.to_string(),
                section: None,
                class_teacher_id: None,
                capacity: Some(40),
                sort_order: Some(sort_order),
                description: None,
            })
            .await
            .unwrap()
    }

    pub async fn seed_student(
        storage: &SeaOrmStorage,
        admission_number: &str,
        class_id: Option<i64>,
        academic_year: &str,
    ) -> Student {
        storage
            .create_student_impl(CreateStudentRequest {
                admission_number: admission_number.to_string(),
                first_name: "Student".to_string(),
                last_name: admission_number.to_string(),
                gender: None,
                date_of_birth: None,
                class_id,
                roll_number: None,
                guardian_name: None,
                guardian_phone: None,
                guardian_email: None,
                address: None,
                photo_url: None,
                admission_date: None,
                academic_year: Some(academic_year.to_string()),
            })
            .await
            .unwrap()
    }

    pub async fn seed_staff(storage: &SeaOrmStorage, employee_code: &str) -> Staff {
        storage
            .create_staff_impl(CreateStaffRequest {
                employee_code: employee_code.to_string(),
                full_name: format!("Staff {employee_code}"),
                designation: "Teacher".to_string(),
                department: None,
                phone: None,
                email: None,
                joining_date: None,
                salary: 25000.0,
            })
            .await
            .unwrap()
    }

    pub async fn seed_fee_type(
        storage: &SeaOrmStorage,
        name: &str,
        frequency: FeeFrequency,
    ) -> FeeType {
        storage
            .create_fee_type_impl(CreateFeeTypeRequest {
                name: name.to_string(),
                description: None,
                frequency,
            })
            .await
            .unwrap()
    }

    pub async fn seed_account(storage: &SeaOrmStorage, name: &str, opening: f64) -> Account {
        storage
            .create_account_impl(CreateAccountRequest {
                name: name.to_string(),
                account_type: AccountType::Cash,
                account_number: None,
                opening_balance: opening,
                description: None,
            })
            .await
            .unwrap()
    }
}
