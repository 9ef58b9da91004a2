use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequirePermission};
use crate::models::finance::requests::{
    AccountListParams, CreateAccountRequest, CreateTransactionRequest, FinanceSummaryParams,
    TransactionListParams, UpdateAccountRequest,
};
use crate::models::users::entities::Permission;
use crate::services::FinanceService;
use crate::utils::SafeIDI64;

// 懒加载的全局 FinanceService 实例
static FINANCE_SERVICE: Lazy<FinanceService> = Lazy::new(FinanceService::new_lazy);

pub async fn list_accounts(
    req: HttpRequest,
    query: web::Query<AccountListParams>,
) -> ActixResult<HttpResponse> {
    FINANCE_SERVICE.list_accounts(&req, query.into_inner()).await
}

pub async fn create_account(
    req: HttpRequest,
    body: web::Json<CreateAccountRequest>,
) -> ActixResult<HttpResponse> {
    FINANCE_SERVICE.create_account(&req, body.into_inner()).await
}

pub async fn get_account(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    FINANCE_SERVICE.get_account(&req, id.0).await
}

pub async fn update_account(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateAccountRequest>,
) -> ActixResult<HttpResponse> {
    FINANCE_SERVICE
        .update_account(&req, id.0, body.into_inner())
        .await
}

pub async fn delete_account(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    FINANCE_SERVICE.delete_account(&req, id.0).await
}

pub async fn list_transactions(
    req: HttpRequest,
    query: web::Query<TransactionListParams>,
) -> ActixResult<HttpResponse> {
    FINANCE_SERVICE
        .list_transactions(&req, query.into_inner())
        .await
}

pub async fn create_transaction(
    req: HttpRequest,
    body: web::Json<CreateTransactionRequest>,
) -> ActixResult<HttpResponse> {
    FINANCE_SERVICE
        .create_transaction(&req, body.into_inner())
        .await
}

pub async fn get_transaction(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    FINANCE_SERVICE.get_transaction(&req, id.0).await
}

pub async fn delete_transaction(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    FINANCE_SERVICE.delete_transaction(&req, id.0).await
}

pub async fn get_summary(
    req: HttpRequest,
    query: web::Query<FinanceSummaryParams>,
) -> ActixResult<HttpResponse> {
    FINANCE_SERVICE.get_summary(&req, query.into_inner()).await
}

// 配置路由
pub fn configure_finance_routes(cfg: &mut web::ServiceConfig) {
    let view = || RequirePermission::new(Permission::FinanceView);
    let manage = || RequirePermission::new(Permission::FinanceManage);

    cfg.service(
        web::scope("/api/v1/finance")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/accounts")
                    .route(web::get().to(list_accounts).wrap(view()))
                    .route(web::post().to(create_account).wrap(manage())),
            )
            .service(
                web::resource("/accounts/{id}")
                    .route(web::get().to(get_account).wrap(view()))
                    .route(web::put().to(update_account).wrap(manage()))
                    .route(web::delete().to(delete_account).wrap(manage())),
            )
            .service(
                web::resource("/transactions")
                    .route(web::get().to(list_transactions).wrap(view()))
                    .route(web::post().to(create_transaction).wrap(manage())),
            )
            .service(
                web::resource("/transactions/{id}")
                    .route(web::get().to(get_transaction).wrap(view()))
                    .route(web::delete().to(delete_transaction).wrap(manage())),
            )
            .service(web::resource("/summary").route(web::get().to(get_summary).wrap(view()))),
    );
}
