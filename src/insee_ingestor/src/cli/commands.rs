use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::params::{OutputArgs, QueryArgs};

#[derive(Parser, Debug)]
#[command(author, version, about = "INSEE BDM series fetcher")]
pub struct Cli {
    /// Path to the config file (insee_ingestor.toml). Defaults are used when absent.
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// INSEE client id. Falls back to INSEE_CLIENT_ID.
    #[arg(long, global = true)]
    pub client_id: Option<String>,

    /// INSEE client secret. Falls back to INSEE_CLIENT_SECRET.
    #[arg(long, global = true)]
    pub client_secret: Option<String>,

    /// Generation service key. Falls back to OPENAI_API_KEY.
    #[arg(long, global = true)]
    pub openai_key: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Acquire an access token and print its expiry
    Token,

    /// Fetch one or more series
    Fetch {
        #[command(flatten)]
        query: QueryArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Fetch series, then ask a question about them
    Ask {
        #[command(flatten)]
        query: QueryArgs,

        /// Question about the fetched data
        #[arg(short, long)]
        question: String,
    },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;
    use crate::{cli::OutputFormat, models::Detail};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_fetch_with_options() {
        let cli = Cli::try_parse_from([
            "insee-ingestor",
            "--config",
            "ingestor.toml",
            "fetch",
            "--idbanks",
            "001688406,001688407",
            "--last-n",
            "12",
            "--detail",
            "dataonly",
            "--format",
            "jsonl",
        ])
        .unwrap();

        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("ingestor.toml")));
        let Commands::Fetch { query, output } = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(query.idbanks, "001688406,001688407");
        assert_eq!(query.last_n, 12);
        assert_eq!(query.detail, Detail::DataOnly);
        assert!(!query.include_history);
        assert_eq!(output.format, OutputFormat::Jsonl);
        assert!(output.output.is_none());
    }

    #[test]
    fn ask_requires_a_question() {
        assert!(Cli::try_parse_from(["insee-ingestor", "ask", "--idbanks", "001688406"]).is_err());

        let cli = Cli::try_parse_from([
            "insee-ingestor",
            "ask",
            "--idbanks",
            "001688406",
            "-q",
            "Quelle est la tendance ?",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Ask { ref question, .. } if question == "Quelle est la tendance ?"));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["insee-ingestor", "token", "--client-id", "abc"]).unwrap();
        assert_eq!(cli.client_id.as_deref(), Some("abc"));
        assert!(matches!(cli.command, Commands::Token));
    }
}
