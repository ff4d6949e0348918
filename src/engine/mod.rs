pub mod dispatcher;
pub mod filter;
pub mod purchase;
pub mod sale;
