//! Parallel batch extraction
//!
//! Every document runs as its own blocking task on the tokio runtime, under
//! a per-document timeout. A slow or panicking document only fails itself;
//! results come back in input order.

use std::time::Duration;

use registry_engine::Extraction;
use serde::Serialize;

use crate::error::CliError;

/// One input document
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub text: Result<String, CliError>,
}

impl Document {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: Ok(text.into()),
        }
    }

    /// A document that could not be read; it is reported, not extracted
    pub fn unreadable(name: impl Into<String>, error: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            text: Err(CliError::Read(name.clone(), error.into())),
            name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
    Extracted { extraction: Extraction },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchItem {
    pub name: String,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

/// Extract one document on the blocking pool with a timeout
pub async fn extract_with_timeout(text: String, timeout_ms: u64) -> Result<Extraction, CliError> {
    let result = tokio::time::timeout(
        Duration::from_millis(timeout_ms),
        tokio::task::spawn_blocking(move || registry_engine::extract(&text)),
    )
    .await;

    match result {
        Ok(Ok(extraction)) => Ok(extraction),
        Ok(Err(join_error)) => Err(CliError::TaskFailed(join_error.to_string())),
        Err(_timeout) => Err(CliError::Timeout(timeout_ms)),
    }
}

/// Extract every document concurrently
pub async fn run_batch(documents: Vec<Document>, timeout_ms: u64) -> Vec<BatchItem> {
    let handles: Vec<_> = documents
        .into_iter()
        .map(|doc| {
            let handle = tokio::spawn(async move {
                match doc.text {
                    Ok(text) => extract_with_timeout(text, timeout_ms).await,
                    Err(e) => Err(e),
                }
            });
            (doc.name, handle)
        })
        .collect();

    let mut items = Vec::with_capacity(handles.len());
    for (name, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(join_error) => Err(CliError::TaskFailed(join_error.to_string())),
        };
        let outcome = match result {
            Ok(extraction) => BatchOutcome::Extracted { extraction },
            Err(e) => {
                tracing::warn!(document = %name, "{}", e);
                BatchOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        items.push(BatchItem { name, outcome });
    }
    items
}
