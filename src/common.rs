pub mod command;
pub mod db_utils;
pub mod error;
pub mod lenient;
pub mod response;
pub mod validation;
