// src/models.rs

pub mod dispatch;
pub mod driver;
pub mod product;
pub mod report;
pub mod route;
pub mod user;
