pub mod config;
pub mod error;

pub use config::TimelineConfig;
pub use error::{AppError, Result};
