pub mod loader;
pub mod parser;
pub mod settings;
pub mod store;
