/*!
 * 细粒度权限中间件
 *
 * 在 RequireJWT 之后执行，根据用户实际生效的权限（显式权限列表或角色预置权限）放行。
 *
 * ```rust,ignore
 * web::resource("")
 *     .route(web::get().to(list_students))
 *     .route(
 *         web::post()
 *             .to(create_student)
 *             .wrap(RequirePermission::new(Permission::StudentsManage)),
 *     )
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::info;

use crate::models::{
    ErrorCode,
    users::entities::{Permission, User},
};

use super::create_error_response;

#[derive(Clone)]
pub struct RequirePermission {
    any_of: Vec<Permission>,
}

impl RequirePermission {
    pub fn new(permission: Permission) -> Self {
        Self {
            any_of: vec![permission],
        }
    }

    /// 具备其中任一权限即可
    pub fn new_any(permissions: &[Permission]) -> Self {
        Self {
            any_of: permissions.to_vec(),
        }
    }

    fn allows(&self, user: &User) -> bool {
        let granted = user.effective_permissions();
        self.any_of.iter().any(|p| granted.contains(p))
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequirePermission
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequirePermissionMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequirePermissionMiddleware {
            service: Rc::new(service),
            rule: self.clone(),
        }))
    }
}

pub struct RequirePermissionMiddleware<S> {
    service: Rc<S>,
    rule: RequirePermission,
}

impl<S, B> Service<ServiceRequest> for RequirePermissionMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let rule = self.rule.clone();

        Box::pin(async move {
            let user = req.extensions().get::<User>().cloned();

            let Some(user) = user else {
                info!("Permission check without authenticated user on {}", req.path());
                return Ok(req.into_response(
                    create_error_response(
                        StatusCode::UNAUTHORIZED,
                        ErrorCode::Unauthorized,
                        "Authentication required",
                    )
                    .map_into_right_body(),
                ));
            };

            if rule.allows(&user) {
                let res = srv.call(req).await?.map_into_left_body();
                return Ok(res);
            }

            info!(
                "Permission denied for user {} on {}. Required any of: {:?}",
                user.id,
                req.path(),
                rule.any_of
            );
            Ok(req.into_response(
                create_error_response(
                    StatusCode::FORBIDDEN,
                    ErrorCode::Forbidden,
                    "Permission denied.",
                )
                .map_into_right_body(),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::{UserRole, UserStatus};

    fn user(role: UserRole, permissions: Option<Vec<Permission>>) -> User {
        User {
            id: 3,
            username: "frontdesk".to_string(),
            email: "frontdesk@school.test".to_string(),
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
    fn test_role_defaults_apply() {
        let collect = RequirePermission::new(Permission::FeesCollect);
        assert!(collect.allows(&user(UserRole::Receptionist, None)));
        assert!(!collect.allows(&user(UserRole::Teacher, None)));
    }

    #[test]
    fn test_any_of() {
        let rule = RequirePermission::new_any(&[Permission::FinanceView, Permission::FeesView]);
        assert!(rule.allows(&user(UserRole::Teacher, None)));
        assert!(!rule.allows(&user(UserRole::Teacher, Some(vec![]))));
    }
}
