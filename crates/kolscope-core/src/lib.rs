//! Shared domain types and configuration for the kolscope analytics core.

mod config;
mod types;

pub use config::{load_app_config, load_app_config_from_env, AppConfig};
pub use types::{FollowerProfile, Post, ProfileSummary, Subject};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
