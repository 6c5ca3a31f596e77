use thiserror::Error;

/// Top-level error type shared by every library crate in the workspace.
#[derive(Debug, Error)]
pub enum DashError {
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T, E = DashError> = std::result::Result<T, E>;
