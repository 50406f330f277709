use thiserror::Error;

/// Failures while starting, seeding or stopping the system.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid setting {key}: {reason}")]
    InvalidSetting { key: &'static str, reason: String },
    #[error("Could not read seed file {path}: {source}")]
    SeedIo {
        path: String,
        source: std::io::Error,
    },
    #[error("Malformed seed file: {0}")]
    SeedFormat(#[from] serde_json::Error),
    #[error("Seed record rejected: {0}")]
    SeedRecord(String),
    #[error("Actor task failed: {0}")]
    ActorTask(String),
}
