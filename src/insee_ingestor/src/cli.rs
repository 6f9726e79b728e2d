pub mod commands;
pub mod params;
pub mod run;

pub use commands::{Cli, Commands};
pub use params::{OutputArgs, OutputFormat, QueryArgs};
pub use run::run;
