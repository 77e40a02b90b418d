pub mod app_config;
pub mod config;
pub mod fields;
pub mod products;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{build_app_config, load_app_config, load_app_config_from_env};
pub use fields::{CategoryRule, FieldError, NormalizationRules};
pub use products::{Availability, KeyField, ProductInput, ProductRecord, CANONICAL_COLUMNS};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
