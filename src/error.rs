use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecoyError {
    #[error("service '{0}' is not installed")]
    NotFound(String),

    #[error("service '{0}' is already installed (use --force to overwrite)")]
    AlreadyInstalled(String),

    #[error("invalid service manifest: {0}")]
    Manifest(String),

    #[error("{0} is missing")]
    MissingArgument(String),

    #[error("{key}={value} (must be {expected})")]
    BadValue {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("unknown argument '{0}'")]
    UnknownArgument(String),

    #[error("service '{name}' did not report ready within {seconds}s")]
    StartupTimeout { name: String, seconds: u64 },

    #[error("service '{0}' is not running")]
    NotRunning(String),

    #[error("no service name given")]
    MissingServiceName,

    #[error("another operation on '{0}' is in progress")]
    OperationInProgress(String),

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, DecoyError>;
