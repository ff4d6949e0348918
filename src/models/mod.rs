pub mod config;
pub mod portfolio;
pub mod result;
pub mod transaction;
