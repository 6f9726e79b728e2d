pub mod query;
pub mod table;

pub use query::{Detail, QueryError, SeriesQuery, SeriesQueryBuilder};
pub use table::{Observation, SeriesTable};
