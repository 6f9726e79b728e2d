use std::path::{Path, PathBuf};

use async_trait::async_trait;
use snafu::ResultExt;
use tracing::{info, instrument};

use crate::{
    io::sink::{DataSink, IoSnafu, SerializeSnafu, SinkError, ensure_parent},
    models::SeriesTable,
};

/// Writes one JSON object per observation, newline-delimited.
///
/// Missing values are written as `null`.
#[derive(Debug, Clone)]
pub struct JsonLinesSink {
    path: PathBuf,
}

impl JsonLinesSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encodes `table` without touching the filesystem.
    pub fn encode(table: &SeriesTable) -> Result<Vec<u8>, SinkError> {
        let mut buf = Vec::with_capacity(table.len() * 48);
        for row in table.rows() {
            serde_json::to_writer(&mut buf, row).context(SerializeSnafu)?;
            buf.push(b'\n');
        }
        Ok(buf)
    }
}

#[async_trait]
impl DataSink for JsonLinesSink {
    type Output = PathBuf;

    #[instrument(skip(self, table), fields(path = %self.path.display(), rows = table.len()))]
    async fn write(&self, table: &SeriesTable) -> Result<PathBuf, SinkError> {
        let bytes = Self::encode(table)?;
        ensure_parent(&self.path).await?;
        tokio::fs::write(&self.path, bytes)
            .await
            .context(IoSnafu { path: &self.path })?;
        info!("table written as JSON lines");
        Ok(self.path.clone())
    }
}
