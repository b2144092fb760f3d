use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while deriving dashboard state from polled snapshots
///
/// Plan-text parsing and alert evaluation never fail; the variants here cover
/// reconciliation contract violations and the snapshot/config edges.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    // Reconciliation errors
    #[error("SQL list shrank from {previous} to {current} entries")]
    QueryListShrank { previous: usize, current: usize },

    // Snapshot errors
    #[error("Failed to read snapshot {}: {source}", path.display())]
    SnapshotIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid snapshot {}: {source}", path.display())]
    SnapshotFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl AnalyzerError {
    /// Helper to create shrinking-input error
    pub fn query_list_shrank(previous: usize, current: usize) -> Self {
        Self::QueryListShrank { previous, current }
    }

    /// Helper to create snapshot read error
    pub fn snapshot_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::SnapshotIo { path: path.into(), source }
    }

    /// Helper to create snapshot decode error
    pub fn snapshot_format(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::SnapshotFormat { path: path.into(), source }
    }

    /// Helper to create configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Stable error code for callers that surface errors numerically
    pub fn error_code(&self) -> i32 {
        match self {
            // Reconciliation errors 1xxx
            Self::QueryListShrank { .. } => 1001,

            // Snapshot errors 2xxx
            Self::SnapshotIo { .. } => 2001,
            Self::SnapshotFormat { .. } => 2002,

            // Configuration errors 3xxx
            Self::Config(_) => 3001,
        }
    }
}

pub type AnalyzerResult<T> = Result<T, AnalyzerError>;
