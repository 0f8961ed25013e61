//! Batch command implementation

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{
    cli::ConfigOverrides,
    core::{
        files::{load_captures, load_config},
        load_plays, resolve_output_dir,
    },
    job::{run_batch, BatchItem},
    models::RunResult,
    Result,
};

use super::common::{
    build_config, describe_result, unique_filename, write_artifact, ConsoleSink, ExportReport,
};

/// One play collection listed in a batch manifest. Relative paths are read
/// against the manifest's directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub records: PathBuf,
    /// Replaces the shared configuration for this entry.
    #[serde(default)]
    pub config: Option<PathBuf>,
    /// `INDEX=PATH` diagram images.
    #[serde(default)]
    pub captures: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchManifest {
    pub items: Vec<ManifestEntry>,
}

impl BatchManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Read every entry's inputs into engine batch items.
    pub fn into_items(self, base: &Path) -> Result<Vec<BatchItem>> {
        self.items
            .into_iter()
            .map(|entry| {
                let plays = load_plays(&base.join(&entry.records))?;
                let config = entry
                    .config
                    .map(|path| load_config(&base.join(path)))
                    .transpose()?;
                let specs: Vec<String> = entry
                    .captures
                    .iter()
                    .map(|spec| rebase_capture(spec, base))
                    .collect();
                let captures = load_captures(&specs, plays.len())?;
                Ok(BatchItem {
                    plays,
                    captures,
                    config,
                })
            })
            .collect()
    }
}

/// Resolve the path half of an `INDEX=PATH` spec against `base`.
fn rebase_capture(spec: &str, base: &Path) -> String {
    match spec.split_once('=') {
        Some((index, path)) => format!("{}={}", index, base.join(path.trim()).display()),
        None => spec.to_string(),
    }
}

/// Parameters for the batch command
#[derive(Debug, Default)]
pub struct BatchParams {
    pub manifest: PathBuf,
    pub overrides: ConfigOverrides,
    pub output: Option<PathBuf>,
    pub quiet: bool,
    pub as_json: bool,
}

/// Handle the batch command: every entry runs in order with its own engine
/// and all of them report to the same console sink.
pub async fn handle_batch(params: BatchParams) -> Result<Vec<RunResult>> {
    let manifest = BatchManifest::load(&params.manifest)?;
    let base = params
        .manifest
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let config = build_config(&params.overrides)?;
    let items = manifest.into_items(&base)?;
    let quiet = params.quiet || params.as_json;

    if !quiet {
        println!("Running {} exports...", items.len());
    }

    let mut sink = ConsoleSink::new(quiet);
    let results = run_batch(&items, &config, Some(&mut sink), None);

    // Identical team/template/count/date produce identical names
    let dir = resolve_output_dir(params.output);
    let mut taken = HashSet::new();
    let mut written = Vec::with_capacity(results.len());
    for result in results {
        let result = match result.filename.as_deref() {
            Some(name) => {
                let filename = unique_filename(name, &mut taken);
                RunResult {
                    filename: Some(filename),
                    ..result
                }
            }
            None => result,
        };
        let path = write_artifact(&result, &dir)?;
        written.push((result, path));
    }

    if params.as_json {
        let reports: Vec<ExportReport<'_>> = written
            .iter()
            .map(|(result, path)| ExportReport {
                result,
                path: path.as_deref(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for (i, (result, path)) in written.iter().enumerate() {
            println!("Item {}:", i + 1);
            for line in describe_result(result, path.as_deref()) {
                println!("  {}", line);
            }
        }
        let succeeded = written.iter().filter(|(r, _)| r.success).count();
        println!("✓ {} of {} exports succeeded", succeeded, written.len());
    }

    Ok(written.into_iter().map(|(result, _)| result).collect())
}
