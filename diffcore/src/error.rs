#[derive(thiserror::Error, Debug)]
pub enum DiffError {
    #[error("Error processing io: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid regular expression: {0}")]
    Pattern(#[from] regex::Error),
    #[error("{path}: {source}")]
    FileAccess {
        path: String,
        source: std::io::Error,
    },
    #[error("{0}: Is a directory")]
    IsDirectory(String),
}

pub type Result<T> = std::result::Result<T, DiffError>;
