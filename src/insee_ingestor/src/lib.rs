//! Client for the INSEE BDM (Banque de Données Macroéconomiques) API.
//!
//! The crate acquires an OAuth2 access token with client credentials, fetches
//! one or more series by idbank into a [`models::SeriesTable`], and can ask a
//! hosted text-generation service a question about the fetched rows.
//!
//! ```no_run
//! use insee_ingestor::{
//!     config::{ClientCredentials, IngestorConfig},
//!     models::SeriesQuery,
//!     session::Session,
//! };
//!
//! # async fn run() -> Result<(), insee_ingestor::errors::Error> {
//! let config = IngestorConfig::default();
//! let credentials = ClientCredentials::from_env(None, None)?;
//! let mut session = Session::new(&config, credentials)?;
//!
//! let query = SeriesQuery::builder(["001688406"]).last_n_observations(12).build()?;
//! let table = session.fetch(&query).await?;
//! println!("{table}");
//! # Ok(())
//! # }
//! ```

pub mod auth;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod errors;
pub mod generation;
pub mod io;
pub mod models;
pub mod providers;
pub mod session;

pub use errors::Error;
