use std::path::PathBuf;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse manifest {}: {message}", .file.display())]
    Manifest { file: PathBuf, message: String },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unknown schema reference '{0}'")]
    UnknownSchema(String),
    #[error("unknown example reference '{0}'")]
    UnknownExample(String),
    #[error("unknown spec '{0}'")]
    UnknownSpec(String),
    #[error("invalid type descriptor: {0}")]
    InvalidType(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(format!("JSON: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Serialization(format!("YAML: {}", err))
    }
}
