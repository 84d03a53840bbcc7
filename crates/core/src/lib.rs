pub mod config;
pub mod effect;
pub mod error;
pub mod telemetry;
pub mod validate;

pub use config::Settings;
pub use effect::best_effort;
pub use error::AppError;
