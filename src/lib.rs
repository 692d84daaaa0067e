// Parco Shield Library

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod errors;
pub mod observability;
pub mod rate_limit;
pub mod security_headers;

pub use config::Config;
pub use errors::{AppError, Result};
