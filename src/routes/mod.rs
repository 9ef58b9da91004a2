pub mod activity;

pub mod auth;

pub mod classes;

pub mod config;

pub mod dashboard;

pub mod fees;

pub mod finance;

pub mod frontend;

pub mod promotion;

pub mod sessions;

pub mod staff;

pub mod students;

pub mod upload;

pub mod users;

pub use activity::configure_activity_routes;
pub use auth::configure_auth_routes;
pub use classes::configure_classes_routes;
pub use config::configure_config_routes;
pub use dashboard::configure_dashboard_routes;
pub use fees::configure_fee_routes;
pub use finance::configure_finance_routes;
pub use frontend::configure_frontend_routes;
pub use promotion::configure_promotion_routes;
pub use sessions::configure_session_routes;
pub use staff::configure_staff_routes;
pub use students::configure_student_routes;
pub use upload::configure_upload_routes;
pub use users::configure_user_routes;
