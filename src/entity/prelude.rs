//! 预导入模块，方便使用

pub use super::accounts::{ActiveModel as AccountActiveModel, Entity as Accounts, Model as AccountModel};
pub use super::active_sessions::{
    ActiveModel as ActiveSessionActiveModel, Entity as ActiveSessions, Model as ActiveSessionModel,
};
pub use super::activity_logs::{
    ActiveModel as ActivityLogActiveModel, Entity as ActivityLogs, Model as ActivityLogModel,
};
pub use super::class_fee_structures::{
    ActiveModel as ClassFeeStructureActiveModel, Entity as ClassFeeStructures,
    Model as ClassFeeStructureModel,
};
pub use super::classes::{ActiveModel as ClassActiveModel, Entity as Classes, Model as ClassModel};
pub use super::fee_payments::{
    ActiveModel as FeePaymentActiveModel, Entity as FeePayments, Model as FeePaymentModel,
};
pub use super::fee_types::{
    ActiveModel as FeeTypeActiveModel, Entity as FeeTypes, Model as FeeTypeModel,
};
pub use super::files::{ActiveModel as FileActiveModel, Entity as Files, Model as FileModel};
pub use super::staff::{ActiveModel as StaffActiveModel, Entity as Staff, Model as StaffModel};
pub use super::student_fee_customs::{
    ActiveModel as StudentFeeCustomActiveModel, Entity as StudentFeeCustoms,
    Model as StudentFeeCustomModel,
};
pub use super::student_fee_records::{
    ActiveModel as StudentFeeRecordActiveModel, Entity as StudentFeeRecords,
    Model as StudentFeeRecordModel,
};
pub use super::students::{
    ActiveModel as StudentActiveModel, Entity as Students, Model as StudentModel,
};
pub use super::system_settings::{
    ActiveModel as SystemSettingActiveModel, Entity as SystemSettings, Model as SystemSettingModel,
};
pub use super::transactions::{
    ActiveModel as TransactionActiveModel, Entity as Transactions, Model as TransactionModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
