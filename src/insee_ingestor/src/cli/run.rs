use std::io::Write;

use anyhow::{Context, Result};
use tracing::info;

use crate::{
    cli::{Cli, Commands, OutputArgs, OutputFormat},
    config::{ClientCredentials, IngestorConfig},
    generation::{OpenAiGenerator, ask_question},
    io::{DataSink, JsonLinesSink},
    models::SeriesTable,
    session::Session,
};

/// Executes one parsed command line.
///
/// Results go to `out`. In `ask`, a failed generation is reported on `err`
/// after the table has been printed, and the command still succeeds.
pub async fn run<O, E>(cli: Cli, out: &mut O, err: &mut E) -> Result<()>
where
    O: Write,
    E: Write,
{
    let config = IngestorConfig::load(cli.config.as_deref())?;
    let credentials = ClientCredentials::from_env(cli.client_id, cli.client_secret)?;
    let mut session = Session::new(&config, credentials)?;

    match cli.command {
        Commands::Token => {
            let credential = session.credential().await?;
            writeln!(
                out,
                "Access token acquired, valid for {}s (until {})",
                credential.expires_in(),
                credential.expires_at().to_rfc3339()
            )?;
        }
        Commands::Fetch { query, output } => {
            let query = query.to_query()?;
            let table = session.fetch(&query).await?;
            emit(&table, &output, &query.idbanks()[0], out).await?;
        }
        Commands::Ask { query, question } => {
            let query = query.to_query()?;
            let table = session.fetch(&query).await?;
            write!(out, "{table}")?;

            let answer = match OpenAiGenerator::from_env(&config.generation, cli.openai_key) {
                Ok(generator) => {
                    ask_question(&generator, &table, &question, &config.generation).await
                }
                Err(e) => Err(e),
            };
            match answer {
                Ok(text) => writeln!(out, "\n{text}")?,
                Err(e) => writeln!(err, "No answer could be generated: {e}")?,
            }
        }
    }

    Ok(())
}

async fn emit<O: Write>(
    table: &SeriesTable,
    output: &OutputArgs,
    label: &str,
    out: &mut O,
) -> Result<()> {
    match output.format {
        OutputFormat::Table => match &output.output {
            Some(path) => {
                tokio::fs::write(path, table.render(None))
                    .await
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!(path = %path.display(), "table written");
            }
            None => write!(out, "{table}")?,
        },
        OutputFormat::Jsonl => match &output.output {
            Some(path) => {
                JsonLinesSink::new(path).write(table).await?;
            }
            None => out.write_all(&JsonLinesSink::encode(table)?)?,
        },
        OutputFormat::Feather => {
            let path = write_feather(table, output, label).await?;
            writeln!(out, "{}", path.display())?;
        }
    }
    Ok(())
}

#[cfg(feature = "polars")]
async fn write_feather(
    table: &SeriesTable,
    output: &OutputArgs,
    label: &str,
) -> Result<std::path::PathBuf> {
    use crate::io::FeatherSink;

    let sink = match &output.output {
        Some(path) => FeatherSink::new(path),
        None => FeatherSink::in_temp_dir(label),
    };
    Ok(sink.write(table).await?)
}

#[cfg(not(feature = "polars"))]
async fn write_feather(
    _table: &SeriesTable,
    _output: &OutputArgs,
    _label: &str,
) -> Result<std::path::PathBuf> {
    anyhow::bail!("feather output requires building with the `polars` feature")
}
