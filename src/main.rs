//! Entry point: parse CLI and dispatch to command handlers.

use anyhow::{bail, Context, Result};
use clap::Parser;
use playbook_export::{
    cli::{Commands, PlaybookExport},
    commands::{handle_batch, handle_generate, handle_summarize, BatchParams, GenerateParams},
};

/// Run the CLI.
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let app = PlaybookExport::parse();

    match app.command {
        Commands::Generate {
            records,
            overrides,
            output,
            captures,
            share,
            share_expires,
            quiet,
            json,
        } => {
            let source = records.display().to_string();
            let result = handle_generate(GenerateParams {
                records,
                overrides,
                output,
                captures,
                share,
                share_expires,
                quiet,
                as_json: json,
            })
            .await
            .with_context(|| format!("Could not export {}", source))?;

            if !result.success {
                bail!(
                    "Export failed: {}",
                    result.error.unwrap_or_else(|| "unknown error".to_string())
                );
            }
        }

        Commands::Batch {
            manifest,
            overrides,
            output,
            quiet,
            json,
        } => {
            let source = manifest.display().to_string();
            let results = handle_batch(BatchParams {
                manifest,
                overrides,
                output,
                quiet,
                as_json: json,
            })
            .await
            .with_context(|| format!("Could not run batch {}", source))?;

            let failed = results.iter().filter(|r| !r.success).count();
            if failed > 0 {
                bail!("{} of {} exports failed", failed, results.len());
            }
        }

        Commands::Summarize {
            records,
            overrides,
            json,
        } => {
            handle_summarize(&records, &overrides, json)
                .with_context(|| format!("Could not summarize {}", records.display()))?;
        }
    }

    Ok(())
}
