//! INSEE BDM REST provider.
//!
//! - [`params`]: query-string parameters sent to the series endpoint
//! - [`response`]: typed model of the JSON body, validated on parse
//! - [`provider`]: the [`SeriesProvider`](crate::providers::SeriesProvider) implementation

pub mod params;
pub mod provider;
pub mod response;

pub use provider::InseeProvider;
