//! Output sinks for fetched tables.

pub mod jsonl;
pub mod sink;

#[cfg(feature = "polars")]
pub mod dataframe;

#[cfg(feature = "polars")]
pub use dataframe::FeatherSink;
pub use jsonl::JsonLinesSink;
pub use sink::{DataSink, SinkError};
