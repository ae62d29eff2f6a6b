pub mod auth;
pub mod dispatch_service;
pub mod document_service;
pub mod driver_service;
pub mod product_service;
pub mod report_service;
pub mod route_service;
pub mod user_service;
