// Shared kernel: database pool, error types and logging used by every module.

pub mod database;
pub mod errors;
pub mod utils;

pub use database::Database;
pub use errors::{AppError, AppResult};
