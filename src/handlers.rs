pub mod dispatches;
pub mod documents;
pub mod drivers;
pub mod products;
pub mod reports;
pub mod routes;
pub mod users;
