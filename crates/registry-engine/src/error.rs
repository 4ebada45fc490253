use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Valuation missing or not positive")]
    ValuationMissing,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
