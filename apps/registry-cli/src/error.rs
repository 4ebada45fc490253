use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CliError {
    #[error("Extraction timeout after {0}ms")]
    Timeout(u64),

    #[error("Extraction task panicked: {0}")]
    TaskFailed(String),

    #[error("Failed to read '{0}': {1}")]
    Read(String, String),
}
