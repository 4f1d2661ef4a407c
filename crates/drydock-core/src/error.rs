use thiserror::Error;

#[derive(Debug, Error)]
pub enum DrydockError {
    #[error("not initialized: run 'drydock init'")]
    NotInitialized,

    #[error("service not found: {0}")]
    ServiceNotFound(String),

    #[error("environment not found: {0}")]
    EnvironmentNotFound(String),

    #[error("invalid name '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidName(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("operation '{operation}' is not supported for {platform} targets")]
    UnsupportedOperation { operation: String, platform: String },

    #[error("missing requirement: {0}")]
    MissingRequirement(String),

    #[error("dependency cycle involving service '{0}'")]
    DependencyCycle(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DrydockError>;
