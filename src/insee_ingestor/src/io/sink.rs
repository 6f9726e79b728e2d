use std::path::PathBuf;

use async_trait::async_trait;
use snafu::{Backtrace, ResultExt, Snafu};

use crate::models::SeriesTable;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SinkError {
    /// A row could not be serialised.
    #[snafu(display("Failed to serialise row: {source}"))]
    Serialize {
        source: serde_json::Error,
        backtrace: Backtrace,
    },

    /// The table could not be converted into the destination format (e.g. a DataFrame).
    #[snafu(display("Data conversion error: {message}"))]
    Conversion {
        message: String,
        backtrace: Backtrace,
    },

    #[snafu(display("I/O error on {}: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },
}

#[async_trait]
pub trait DataSink {
    /// What a successful write returns.
    ///
    /// A file sink returns the path it wrote; a database sink might return
    /// the number of rows inserted.
    type Output;

    /// Writes every row of `table` to the destination.
    async fn write(&self, table: &SeriesTable) -> Result<Self::Output, SinkError>;
}

/// Creates the parent directory of `path` when it does not exist yet.
pub(crate) async fn ensure_parent(path: &std::path::Path) -> Result<(), SinkError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent)
            .await
            .context(IoSnafu { path: parent }),
        _ => Ok(()),
    }
}
