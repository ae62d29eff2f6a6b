pub mod dispatch_repo;
pub use dispatch_repo::{DispatchRepository, PgDispatchStore};
pub mod driver_repo;
pub use driver_repo::DriverRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod report_repo;
pub use report_repo::ReportRepository;
pub mod route_repo;
pub use route_repo::RouteRepository;
pub mod user_repo;
pub use user_repo::UserRepository;

#[cfg(test)]
pub mod fixtures;
