use thiserror::Error;

pub type Result<T, E = GambitError> = std::result::Result<T, E>;

/// Unified error type covering common failure scenarios across subsystems.
#[derive(Debug, Error)]
pub enum GambitError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("rules error: {0}")]
    Rules(String),
    #[error("engine error: {0}")]
    Engine(String),
    #[error("operational error: {0}")]
    Ops(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
