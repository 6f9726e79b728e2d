use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::models::{Detail, QueryError, SeriesQuery};

/// Query options shared by `fetch` and `ask`.
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Comma-separated idbanks (e.g. "001688406,001688407")
    #[arg(long)]
    pub idbanks: String,

    /// Start of the period (e.g. "2020", "2020-03", "2020-Q1")
    #[arg(long)]
    pub start_period: Option<String>,

    /// Keep only the N most recent observations. 0 means no limit.
    #[arg(long, default_value_t = 0)]
    pub last_n: u32,

    /// Level of detail: full, dataonly or nodata
    #[arg(long, default_value_t = Detail::Full)]
    pub detail: Detail,

    /// Include the revision history of each observation
    #[arg(long)]
    pub include_history: bool,

    /// Only observations updated after this date (YYYY-MM-DD)
    #[arg(long)]
    pub updated_after: Option<String>,
}

impl QueryArgs {
    pub fn to_query(&self) -> Result<SeriesQuery, QueryError> {
        let mut builder = SeriesQuery::builder(SeriesQuery::parse_idbanks(&self.idbanks))
            .last_n_observations(self.last_n)
            .detail(self.detail)
            .include_history(self.include_history);
        if let Some(start) = &self.start_period {
            builder = builder.start_period(start.as_str());
        }
        if let Some(date) = &self.updated_after {
            builder = builder.updated_after(date.as_str());
        }
        builder.build()
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Aligned text table
    #[default]
    Table,
    /// One JSON object per row
    Jsonl,
    /// Arrow IPC file (requires the `polars` feature)
    Feather,
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}
