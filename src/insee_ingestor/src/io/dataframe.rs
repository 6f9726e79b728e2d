use std::{
    env,
    fs::{self, File},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::Utc;
use polars::{df, frame::DataFrame, prelude::PolarsError};
use polars_io::{SerWriter, ipc::IpcWriter};
use snafu::ResultExt;
use tracing::{info, instrument};

use crate::{
    io::sink::{ConversionSnafu, DataSink, IoSnafu, SinkError},
    models::SeriesTable,
};

/// Converts the table into a `DataFrame` with `idbank`, `date`, `value` columns.
pub fn to_dataframe(table: &SeriesTable) -> Result<DataFrame, PolarsError> {
    let rows = table.rows();
    df!(
        "idbank" => rows.iter().map(|r| r.idbank.as_str()).collect::<Vec<_>>(),
        "date" => rows.iter().map(|r| r.date.as_str()).collect::<Vec<_>>(),
        "value" => rows.iter().map(|r| r.value).collect::<Vec<Option<f64>>>(),
    )
}

/// Writes the table as an Arrow IPC (Feather v2) file.
#[derive(Debug, Clone)]
pub struct FeatherSink {
    path: PathBuf,
}

impl FeatherSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A sink targeting `<tmp>/insee_ingestor/<label>_<timestamp>.feather`.
    pub fn in_temp_dir(label: &str) -> Self {
        let mut path = env::temp_dir();
        path.push("insee_ingestor");
        let timestamp = Utc::now().format("%Y%m%d%H%M%S%f");
        path.push(format!("{label}_{timestamp}.feather"));
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DataSink for FeatherSink {
    type Output = PathBuf;

    #[instrument(skip(self, table), fields(path = %self.path.display(), rows = table.len()))]
    async fn write(&self, table: &SeriesTable) -> Result<PathBuf, SinkError> {
        let mut df = to_dataframe(table).map_err(|e| {
            ConversionSnafu {
                message: e.to_string(),
            }
            .build()
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context(IoSnafu { path: parent })?;
        }
        let mut file = File::create(&self.path).context(IoSnafu { path: &self.path })?;
        IpcWriter::new(&mut file).finish(&mut df).map_err(|e| {
            ConversionSnafu {
                message: e.to_string(),
            }
            .build()
        })?;

        info!("table written as Feather");
        Ok(self.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use polars_io::{SerReader, ipc::IpcReader};

    use super::*;
    use crate::models::Observation;

    fn table() -> SeriesTable {
        SeriesTable::new(vec![
            Observation {
                idbank: "001688406".into(),
                date: "2024-02".into(),
                value: Some(118.3),
            },
            Observation {
                idbank: "001688407".into(),
                date: "2024-02".into(),
                value: None,
            },
        ])
    }

    #[test]
    fn dataframe_has_three_columns_and_nulls() {
        let df = to_dataframe(&table()).unwrap();
        assert_eq!(df.shape(), (2, 3));
        assert_eq!(df.get_column_names_str(), ["idbank", "date", "value"]);
        assert_eq!(df.column("value").unwrap().null_count(), 1);
    }

    #[tokio::test]
    async fn feather_file_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.feather");
        FeatherSink::new(&path).write(&table()).await.unwrap();

        let df = IpcReader::new(File::open(&path).unwrap()).finish().unwrap();
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn temp_sink_names_file_after_label() {
        let sink = FeatherSink::in_temp_dir("001688406");
        let name = sink.path().file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("001688406_"));
        assert!(name.ends_with(".feather"));
    }
}
