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
            ClassFeeStructureDetail, FeePaymentDetail, FeeRecordDetail, FeeType,
            NewFeePayment, StudentFeeCustom,
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
use chrono::NaiveDate;
use std::sync::Arc;

use crate::errors::Result;

pub mod sea_orm_storage;

/// 存储层接口
///
/// 涉及多张表的写操作（缴费、冲销、转账、发薪、升级）在实现内部使用数据库事务，
/// 业务规则不满足时返回 `NotFound` / `Conflict` / `BusinessRule` / `Validation` 错误；
/// 账户与缴费相关的失败使用自带错误码的专用变体（如 `InsufficientBalance`）。
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户（密码已哈希）
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名获取用户信息
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户信息
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 列出用户
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    // 更新用户信息
    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>>;
    // 删除用户
    async fn delete_user(&self, id: i64) -> Result<bool>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;

    /// 登录会话
    async fn create_session(&self, session: ActiveSession) -> Result<ActiveSession>;
    async fn get_session(&self, id: &str) -> Result<Option<ActiveSession>>;
    // 刷新最近活动时间
    async fn touch_session(&self, id: &str) -> Result<bool>;
    async fn delete_session(&self, id: &str) -> Result<bool>;
    async fn delete_user_sessions(&self, user_id: i64) -> Result<u64>;
    async fn list_sessions(&self, query: SessionListQuery) -> Result<SessionListResponse>;
    // 删除已过期会话
    async fn purge_expired_sessions(&self) -> Result<u64>;

    /// 操作日志
    async fn create_activity_log(&self, log: NewActivityLog) -> Result<ActivityLog>;
    async fn list_activity_logs(&self, query: ActivityListQuery) -> Result<ActivityListResponse>;
    // 导出用，不分页
    async fn list_activity_logs_for_export(
        &self,
        query: ActivityListQuery,
    ) -> Result<Vec<ActivityLog>>;

    /// 文件管理方法
    // 上传文件
    async fn upload_file(
        &self,
        file_token: &str,
        file_name: &str,
        file_size: i64,
        file_type: &str,
        user_id: Option<i64>,
    ) -> Result<File>;
    // 通过唯一 token 获取文件信息
    async fn get_file_by_token(&self, file_token: &str) -> Result<Option<File>>;

    /// 系统设置
    async fn list_all_settings(&self) -> Result<Vec<SystemSetting>>;
    async fn get_setting(&self, key: &str) -> Result<Option<SystemSetting>>;
    async fn update_setting(
        &self,
        key: &str,
        value: &str,
        updated_by: Option<i64>,
    ) -> Result<Option<SystemSetting>>;

    /// 班级管理方法
    async fn create_class(&self, class: CreateClassRequest) -> Result<Class>;
    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>>;
    async fn get_class_by_name(&self, name: &str) -> Result<Option<Class>>;
    // 列出班级（含在读人数）
    async fn list_classes_with_pagination(&self, query: ClassListQuery)
    -> Result<ClassListResponse>;
    async fn list_all_classes(&self) -> Result<Vec<Class>>;
    async fn update_class(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>>;
    // 删除班级，仍有在读学生时返回冲突
    async fn delete_class(&self, class_id: i64) -> Result<bool>;
    async fn count_active_students(&self, class_id: i64) -> Result<i64>;

    /// 学生管理方法
    async fn create_student(&self, student: CreateStudentRequest) -> Result<Student>;
    // 已删除的学生视为不存在
    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>>;
    async fn get_student_detail(&self, id: i64) -> Result<Option<StudentDetail>>;
    async fn list_students_with_pagination(
        &self,
        query: StudentListQuery,
    ) -> Result<StudentListResponse>;
    async fn update_student(
        &self,
        id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>>;
    // 软删除
    async fn delete_student(&self, id: i64) -> Result<bool>;
    // 在读学生（状态 active 且未删除）
    async fn list_enrolled_students(&self, filter: EnrolledStudentFilter) -> Result<Vec<Student>>;
    async fn count_students_by_status(&self) -> Result<StudentCounts>;

    /// 教职工管理方法
    async fn create_staff(&self, staff: CreateStaffRequest) -> Result<Staff>;
    async fn get_staff_by_id(&self, id: i64) -> Result<Option<Staff>>;
    async fn list_staff_with_pagination(&self, query: StaffListQuery)
    -> Result<StaffListResponse>;
    async fn update_staff(&self, id: i64, update: UpdateStaffRequest) -> Result<Option<Staff>>;
    // 软删除
    async fn delete_staff(&self, id: i64) -> Result<bool>;
    // 发薪：支出流水 + 账户余额 + 发薪状态
    async fn pay_salary(&self, payment: SalaryPayment) -> Result<SalaryPaymentResponse>;
    // 上次发薪不属于 current_month 的教职工重置为未发薪
    async fn reset_salary_statuses(&self, current_month: &str) -> Result<u64>;
    async fn count_staff(&self) -> Result<StaffCounts>;

    /// 收费项目
    async fn create_fee_type(&self, req: CreateFeeTypeRequest) -> Result<FeeType>;
    async fn get_fee_type_by_id(&self, id: i64) -> Result<Option<FeeType>>;
    async fn list_fee_types(&self, include_inactive: bool) -> Result<Vec<FeeType>>;
    async fn update_fee_type(&self, id: i64, update: UpdateFeeTypeRequest)
    -> Result<Option<FeeType>>;
    // 被收费标准或收费记录引用时返回冲突
    async fn delete_fee_type(&self, id: i64) -> Result<bool>;

    /// 班级收费标准
    async fn list_fee_structures(
        &self,
        params: FeeStructureListParams,
    ) -> Result<Vec<ClassFeeStructureDetail>>;
    async fn upsert_fee_structure(
        &self,
        req: UpsertFeeStructureRequest,
    ) -> Result<ClassFeeStructureDetail>;
    async fn delete_fee_structure(&self, id: i64) -> Result<bool>;

    /// 学生个别收费
    async fn list_fee_customs(&self, params: FeeCustomListParams)
    -> Result<Vec<StudentFeeCustom>>;
    async fn upsert_fee_custom(&self, req: UpsertFeeCustomRequest) -> Result<StudentFeeCustom>;
    async fn delete_fee_custom(&self, id: i64) -> Result<bool>;

    /// 收费记录
    async fn list_fee_records(
        &self,
        query: FeeRecordListQuery,
        ctx: FeeContext,
    ) -> Result<FeeRecordListResponse>;
    // 按班级收费标准批量生成，已存在的记录跳过
    async fn generate_fee_records(
        &self,
        req: GenerateFeeRecordsRequest,
        ctx: FeeContext,
    ) -> Result<GenerateFeeRecordsResponse>;
    async fn get_fee_record_detail(
        &self,
        id: i64,
        ctx: FeeContext,
    ) -> Result<Option<FeeRecordWithPayments>>;
    async fn update_fee_record(
        &self,
        id: i64,
        update: UpdateFeeRecordRequest,
        ctx: FeeContext,
    ) -> Result<Option<FeeRecordDetail>>;
    async fn list_student_fee_records(
        &self,
        student_id: i64,
        academic_year: Option<String>,
        ctx: FeeContext,
    ) -> Result<Vec<FeeRecordDetail>>;
    async fn list_fee_records_for_export(
        &self,
        academic_year: Option<String>,
        class_id: Option<i64>,
        ctx: FeeContext,
    ) -> Result<Vec<FeeRecordDetail>>;
    // 按当前日期重新推导所有未结清记录的状态，返回变更数量
    async fn refresh_fee_statuses(&self, ctx: FeeContext) -> Result<u64>;

    /// 缴费
    async fn record_fee_payment(
        &self,
        payment: NewFeePayment,
        ctx: FeeContext,
    ) -> Result<PaymentResponse>;
    async fn list_fee_payments(&self, query: PaymentListQuery) -> Result<PaymentListResponse>;
    async fn get_fee_payment_detail(&self, id: i64) -> Result<Option<FeePaymentDetail>>;
    // 冲销缴费，返回更新后的收费记录
    async fn delete_fee_payment(&self, id: i64, ctx: FeeContext)
    -> Result<Option<FeeRecordDetail>>;
    async fn recent_fee_payments(&self, limit: u64) -> Result<Vec<FeePaymentDetail>>;

    /// 财务账户
    async fn create_account(&self, req: CreateAccountRequest) -> Result<Account>;
    async fn get_account_by_id(&self, id: i64) -> Result<Option<Account>>;
    async fn list_accounts(&self, include_inactive: bool) -> Result<Vec<Account>>;
    async fn update_account(&self, id: i64, update: UpdateAccountRequest)
    -> Result<Option<Account>>;
    // 存在流水时返回冲突
    async fn delete_account(&self, id: i64) -> Result<bool>;

    /// 财务流水
    async fn create_transaction(&self, txn: NewTransaction) -> Result<Transaction>;
    async fn get_transaction_by_id(&self, id: i64) -> Result<Option<Transaction>>;
    async fn list_transactions(&self, query: TransactionListQuery)
    -> Result<TransactionListResponse>;
    // 删除并回滚余额；缴费产生的流水只能通过冲销缴费删除
    async fn delete_transaction(&self, id: i64) -> Result<bool>;
    async fn finance_summary(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<FinanceSummaryResponse>;

    /// 统计
    async fn fee_summary(&self, academic_year: &str) -> Result<FeeSummary>;
    async fn monthly_collections(&self, year: i32) -> Result<Vec<MonthlyCollection>>;
    async fn class_fee_summaries(&self, academic_year: &str) -> Result<Vec<ClassFeeSummary>>;

    /// 学年升级：单个学生在一个事务内完成，返回新建的收费记录数
    async fn promote_student(&self, step: PromotionStep, ctx: FeeContext) -> Result<i64>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
