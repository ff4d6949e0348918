pub mod commands;
pub mod data;
pub mod driver;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod models;
pub mod utils;

pub use logging::init_tracing;
