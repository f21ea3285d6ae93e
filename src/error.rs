use std::path::PathBuf;
use thiserror::Error;

/// Failure of the HTTP transport itself (connection, TLS, timeout, body read).
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Error from a single GitHub / Postman API call
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{operation} request failed: {source}")]
    Transport {
        operation: String,
        #[source]
        source: TransportError,
    },

    /// The API answered, but not with the status the endpoint documents as success
    #[error("{operation} returned {status}: {body}")]
    Status {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("{operation} request body could not be serialized: {source}")]
    Encode {
        operation: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{operation} returned malformed JSON: {source}")]
    Decode {
        operation: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    #[cfg(test)]
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Error while exporting a Postman document to disk
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error that stops the setup flow. The remaining steps are skipped and
/// nothing already applied on GitHub is rolled back.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Invalid option. Exiting.")]
    InvalidOption { prompt: &'static str, answer: String },

    #[error("Invalid repository name '{0}', expected owner/repo. Exiting.")]
    InvalidRepository(String),

    #[error("Failed to export Postman {kind}: {source}")]
    Export {
        kind: &'static str,
        #[source]
        source: ExportError,
    },

    #[error("Failed to check for README.md: {0}")]
    ReadmeProbe(#[source] ApiError),

    #[error("Failed to create the repository: {0}")]
    CreateRepository(#[source] ApiError),

    #[error("Failed to initialize the repository: {0}")]
    InitializeRepository(#[source] ApiError),

    #[error("Generated workflow {} does not run collection '{collection}'", path.display())]
    WorkflowInvariant { path: PathBuf, collection: String },

    #[error("Failed to commit files: {0}")]
    Commit(#[from] crate::github::CommitError),

    #[error("Failed to fetch workflows: {0}")]
    Verify(#[source] ApiError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl SetupError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
