use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ==================== 收费项目表 ====================
        manager
            .create_table(
                Table::create()
                    .table(FeeTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FeeTypes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FeeTypes::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(FeeTypes::Description).text().null())
                    .col(ColumnDef::new(FeeTypes::Frequency).string().not_null())
                    .col(
                        ColumnDef::new(FeeTypes::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(FeeTypes::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(FeeTypes::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // ==================== 班级收费标准表 ====================
        manager
            .create_table(
                Table::create()
                    .table(ClassFeeStructures::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClassFeeStructures::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ClassFeeStructures::ClassId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassFeeStructures::FeeTypeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassFeeStructures::AcademicYear)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassFeeStructures::Amount)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassFeeStructures::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassFeeStructures::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ClassFeeStructures::Table, ClassFeeStructures::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ClassFeeStructures::Table, ClassFeeStructures::FeeTypeId)
                            .to(FeeTypes::Table, FeeTypes::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_class_fee_structures_class_type_year")
                    .table(ClassFeeStructures::Table)
                    .col(ClassFeeStructures::ClassId)
                    .col(ClassFeeStructures::FeeTypeId)
                    .col(ClassFeeStructures::AcademicYear)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ==================== 学生个性化收费表 ====================
        manager
            .create_table(
                Table::create()
                    .table(StudentFeeCustoms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StudentFeeCustoms::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StudentFeeCustoms::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentFeeCustoms::FeeTypeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentFeeCustoms::AcademicYear)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentFeeCustoms::CustomAmount)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StudentFeeCustoms::IsApplicable)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(StudentFeeCustoms::Remarks).text().null())
                    .col(
                        ColumnDef::new(StudentFeeCustoms::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentFeeCustoms::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StudentFeeCustoms::Table, StudentFeeCustoms::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StudentFeeCustoms::Table, StudentFeeCustoms::FeeTypeId)
                            .to(FeeTypes::Table, FeeTypes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_student_fee_customs_student_type_year")
                    .table(StudentFeeCustoms::Table)
                    .col(StudentFeeCustoms::StudentId)
                    .col(StudentFeeCustoms::FeeTypeId)
                    .col(StudentFeeCustoms::AcademicYear)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ==================== 学生应收记录表 ====================
        manager
            .create_table(
                Table::create()
                    .table(StudentFeeRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StudentFeeRecords::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StudentFeeRecords::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentFeeRecords::FeeTypeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StudentFeeRecords::ClassId).big_integer().null())
                    .col(
                        ColumnDef::new(StudentFeeRecords::AcademicYear)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentFeeRecords::Frequency)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentFeeRecords::AmountPerPeriod)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentFeeRecords::Periods)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentFeeRecords::TotalAmount)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentFeeRecords::PaidAmount)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(StudentFeeRecords::DiscountAmount)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(StudentFeeRecords::FirstDueAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StudentFeeRecords::Status).string().not_null())
                    .col(ColumnDef::new(StudentFeeRecords::Remarks).text().null())
                    .col(
                        ColumnDef::new(StudentFeeRecords::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentFeeRecords::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StudentFeeRecords::Table, StudentFeeRecords::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StudentFeeRecords::Table, StudentFeeRecords::FeeTypeId)
                            .to(FeeTypes::Table, FeeTypes::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_student_fee_records_student_type_year")
                    .table(StudentFeeRecords::Table)
                    .col(StudentFeeRecords::StudentId)
                    .col(StudentFeeRecords::FeeTypeId)
                    .col(StudentFeeRecords::AcademicYear)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_student_fee_records_status")
                    .table(StudentFeeRecords::Table)
                    .col(StudentFeeRecords::Status)
                    .to_owned(),
            )
            .await?;

        // ==================== 资金账户表 ====================
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Accounts::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Accounts::AccountType).string().not_null())
                    .col(ColumnDef::new(Accounts::AccountNumber).string().null())
                    .col(
                        ColumnDef::new(Accounts::OpeningBalance)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Accounts::Balance)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Accounts::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Accounts::Description).text().null())
                    .col(ColumnDef::new(Accounts::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Accounts::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // ==================== 收支流水表 ====================
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Transactions::AccountId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::CounterAccountId)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(Transactions::TxnType).string().not_null())
                    .col(ColumnDef::new(Transactions::Amount).double().not_null())
                    .col(ColumnDef::new(Transactions::Category).string().not_null())
                    .col(ColumnDef::new(Transactions::Description).text().null())
                    .col(ColumnDef::new(Transactions::Reference).string().null())
                    .col(ColumnDef::new(Transactions::StaffId).big_integer().null())
                    .col(
                        ColumnDef::new(Transactions::TxnDate)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::CreatedBy).big_integer().null())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Transactions::Table, Transactions::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_transactions_account_id")
                    .table(Transactions::Table)
                    .col(Transactions::AccountId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_transactions_txn_date")
                    .table(Transactions::Table)
                    .col(Transactions::TxnDate)
                    .to_owned(),
            )
            .await?;

        // ==================== 缴费记录表 ====================
        manager
            .create_table(
                Table::create()
                    .table(FeePayments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FeePayments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FeePayments::RecordId).big_integer().not_null())
                    .col(
                        ColumnDef::new(FeePayments::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FeePayments::Amount).double().not_null())
                    .col(
                        ColumnDef::new(FeePayments::Discount)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(FeePayments::Method).string().not_null())
                    .col(
                        ColumnDef::new(FeePayments::ReceiptNumber)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(FeePayments::PaidAt).big_integer().not_null())
                    .col(ColumnDef::new(FeePayments::AccountId).big_integer().null())
                    .col(
                        ColumnDef::new(FeePayments::TransactionId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(FeePayments::CollectedBy)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(FeePayments::Remarks).text().null())
                    .col(
                        ColumnDef::new(FeePayments::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(FeePayments::Table, FeePayments::RecordId)
                            .to(StudentFeeRecords::Table, StudentFeeRecords::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_fee_payments_record_id")
                    .table(FeePayments::Table)
                    .col(FeePayments::RecordId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_fee_payments_paid_at")
                    .table(FeePayments::Table)
                    .col(FeePayments::PaidAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FeePayments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StudentFeeRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StudentFeeCustoms::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ClassFeeStructures::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FeeTypes::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Classes {
    #[sea_orm(iden = "classes")]
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Students {
    #[sea_orm(iden = "students")]
    Table,
    Id,
}

#[derive(DeriveIden)]
enum FeeTypes {
    #[sea_orm(iden = "fee_types")]
    Table,
    Id,
    Name,
    Description,
    Frequency,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ClassFeeStructures {
    #[sea_orm(iden = "class_fee_structures")]
    Table,
    Id,
    ClassId,
    FeeTypeId,
    AcademicYear,
    Amount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum StudentFeeCustoms {
    #[sea_orm(iden = "student_fee_customs")]
    Table,
    Id,
    StudentId,
    FeeTypeId,
    AcademicYear,
    CustomAmount,
    IsApplicable,
    Remarks,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum StudentFeeRecords {
    #[sea_orm(iden = "student_fee_records")]
    Table,
    Id,
    StudentId,
    FeeTypeId,
    ClassId,
    AcademicYear,
    Frequency,
    AmountPerPeriod,
    Periods,
    TotalAmount,
    PaidAmount,
    DiscountAmount,
    FirstDueAt,
    Status,
    Remarks,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum FeePayments {
    #[sea_orm(iden = "fee_payments")]
    Table,
    Id,
    RecordId,
    StudentId,
    Amount,
    Discount,
    Method,
    ReceiptNumber,
    PaidAt,
    AccountId,
    TransactionId,
    CollectedBy,
    Remarks,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Accounts {
    #[sea_orm(iden = "accounts")]
    Table,
    Id,
    Name,
    AccountType,
    AccountNumber,
    OpeningBalance,
    Balance,
    IsActive,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Transactions {
    #[sea_orm(iden = "transactions")]
    Table,
    Id,
    AccountId,
    CounterAccountId,
    TxnType,
    Amount,
    Category,
    Description,
    Reference,
    StaffId,
    TxnDate,
    CreatedBy,
    CreatedAt,
}
