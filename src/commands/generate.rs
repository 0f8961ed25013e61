//! Generate command implementation

use std::path::PathBuf;

use crate::{
    cli::{types::ShareExpiry, ConfigOverrides},
    core::{files::load_captures, load_plays, resolve_output_dir},
    job::{run, RunInput},
    models::RunResult,
    Result,
};

use super::common::{
    build_config, print_result, share_if_configured, write_artifact, ConsoleSink,
};

/// Parameters for the generate command
#[derive(Debug, Default)]
pub struct GenerateParams {
    pub records: PathBuf,
    pub overrides: ConfigOverrides,
    pub output: Option<PathBuf>,
    pub captures: Vec<String>,
    pub share: bool,
    pub share_expires: ShareExpiry,
    pub quiet: bool,
    pub as_json: bool,
}

/// Handle the generate command.
///
/// Input and configuration problems surface as `Err`; a run that fails inside
/// the engine is returned as a failed [`RunResult`] so the caller can report it.
pub async fn handle_generate(params: GenerateParams) -> Result<RunResult> {
    let plays = load_plays(&params.records)?;
    let config = build_config(&params.overrides)?;
    let captures = load_captures(&params.captures, plays.len())?;
    let quiet = params.quiet || params.as_json;

    if !quiet {
        println!(
            "Exporting {} plays as {} ({} template)...",
            plays.len(),
            config.format,
            config.template_id
        );
    }

    let mut sink = ConsoleSink::new(quiet);
    let input = RunInput::new(&plays, &config).with_captures(captures);
    let result = run(input, Some(&mut sink), None);

    let path = write_artifact(&result, &resolve_output_dir(params.output))?;
    let result = if params.share {
        share_if_configured(result, params.share_expires).await
    } else {
        result
    };

    print_result(&result, path.as_deref(), params.as_json)?;
    Ok(result)
}
