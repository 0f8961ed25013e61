//! Common utilities and helper functions shared across commands.
//!
//! Configuration assembly, output locations, console progress and result
//! printing live here so the individual handlers stay short.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use log::warn;
use serde::Serialize;

use crate::{
    cli::{types::ShareExpiry, ConfigOverrides},
    core::{
        files::{load_config_or_default, write_bytes},
        filters::ScoreRange,
    },
    export::{share::SHARE_URL_ENV_VAR, share_result, HttpShareService, ShareOptions},
    models::{Branding, ProgressEvent, ProgressSink, ReportConfig, RunResult},
    Result,
};

/// Load the configuration file (or defaults), then apply command-line overrides.
pub fn build_config(overrides: &ConfigOverrides) -> Result<ReportConfig> {
    let mut config = load_config_or_default(overrides.config.as_deref())?;

    if let Some(format) = overrides.format {
        config.format = format;
    }
    if let Some(template) = &overrides.template {
        config.template_id = template.clone();
    }
    if let Some(title) = &overrides.title {
        config.title = Some(title.clone());
    }
    if let Some(team) = &overrides.team {
        config.branding.get_or_insert_with(Branding::default).team_name = Some(team.clone());
    }
    if let Some(quality) = overrides.quality {
        config.quality = quality;
    }
    if let Some(color_mode) = overrides.color_mode {
        config.color_mode = color_mode;
    }
    if let Some(page_size) = overrides.page_size {
        config.page_size = page_size;
    }
    if let Some(orientation) = overrides.orientation {
        config.orientation = orientation;
    }
    if let Some(watermark) = &overrides.watermark {
        config.watermark = Some(watermark.clone());
    }
    if let Some(sheet_format) = overrides.sheet_format {
        config.sheet_format = sheet_format;
    }

    // Filter flags replace the matching criterion from the file
    if !overrides.categories.is_empty() {
        config.filter.categories = overrides.categories.clone();
    }
    if !overrides.formations.is_empty() {
        config.filter.formations = overrides.formations.clone();
    }
    if !overrides.tags.is_empty() {
        config.filter.tags = overrides.tags.clone();
    }
    if overrides.min_effectiveness.is_some() || overrides.max_effectiveness.is_some() {
        let range = config.filter.effectiveness.get_or_insert_with(ScoreRange::default);
        if overrides.min_effectiveness.is_some() {
            range.min = overrides.min_effectiveness;
        }
        if overrides.max_effectiveness.is_some() {
            range.max = overrides.max_effectiveness;
        }
    }

    Ok(config)
}

/// Write a successful result's artifact into `dir`.
///
/// Returns `None` for failed results, which carry no artifact.
pub fn write_artifact(result: &RunResult, dir: &Path) -> Result<Option<PathBuf>> {
    match (&result.data, &result.filename) {
        (Some(data), Some(filename)) => {
            let path = dir.join(filename);
            write_bytes(&path, data)?;
            Ok(Some(path))
        }
        _ => Ok(None),
    }
}

/// `name` if unused, otherwise `stem_2.ext`, `stem_3.ext`, ... Records the
/// returned name in `taken`.
pub fn unique_filename(name: &str, taken: &mut HashSet<String>) -> String {
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (name, None),
    };
    let mut candidate = name.to_string();
    let mut n = 2;
    while taken.contains(&candidate) {
        candidate = match ext {
            Some(ext) => format!("{}_{}.{}", stem, n, ext),
            None => format!("{}_{}", stem, n),
        };
        n += 1;
    }
    taken.insert(candidate.clone());
    candidate
}

/// Ask the share service configured in the environment for a link.
///
/// Without `PLAYBOOK_SHARE_URL` the export is kept and the missing setting is
/// reported on the result.
pub async fn share_if_configured(result: RunResult, expires: ShareExpiry) -> RunResult {
    if !result.success {
        return result;
    }
    let Some(service) = HttpShareService::from_env() else {
        warn!("Sharing requested but {} is not set", SHARE_URL_ENV_VAR);
        return RunResult {
            share_error: Some(format!("{} is not set", SHARE_URL_ENV_VAR)),
            ..result
        };
    };
    let options = ShareOptions {
        expiration: expires.into(),
        ..ShareOptions::default()
    };
    share_result(result, &service, &options).await
}

/// Progress sink printing one line per completed stage.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    pub quiet: bool,
}

impl ConsoleSink {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

/// `[3/8]  37.5% Rendering cover page (~0.4s left)`
pub fn progress_line(event: &ProgressEvent) -> String {
    let head = format!(
        "[{}/{}] {:>5.1}% {}",
        event.current, event.total, event.percentage, event.message
    );
    match event.estimated_remaining {
        Some(eta) => format!("{} (~{:.1}s left)", head, eta.as_secs_f64()),
        None => head,
    }
}

impl ProgressSink for ConsoleSink {
    fn on_progress(&mut self, event: &ProgressEvent) {
        if !self.quiet {
            println!("{}", progress_line(event));
        }
    }
}

/// JSON shape printed with `--json`: the run result plus where it was written.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReport<'a> {
    #[serde(flatten)]
    pub result: &'a RunResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<&'a Path>,
}

/// Human-readable lines describing a run result.
pub fn describe_result(result: &RunResult, path: Option<&Path>) -> Vec<String> {
    if !result.success {
        return vec![format!(
            "✗ Export failed: {}",
            result.error.as_deref().unwrap_or("unknown error")
        )];
    }

    let mut lines = Vec::new();
    let target = path
        .map(|p| p.display().to_string())
        .or_else(|| result.filename.clone())
        .unwrap_or_default();
    lines.push(format!("✓ Wrote {} ({} bytes)", target, result.size));
    if let Some(metadata) = &result.metadata {
        let units = match (metadata.page_count, metadata.sheet_count) {
            (Some(pages), _) => format!("{} pages", pages),
            (None, Some(sheets)) => format!("{} sheets", sheets),
            (None, None) => String::new(),
        };
        lines.push(format!(
            "  {} plays, {}, template {}, {} ms",
            metadata.record_count, units, metadata.template_id, metadata.processing_time_ms
        ));
    }
    if let Some(share) = &result.share {
        lines.push(format!("✓ Share link: {}", share.public_url));
    }
    if let Some(error) = &result.share_error {
        lines.push(format!("⚠ Could not create share link: {}", error));
    }
    lines
}

/// Print a result as text lines or JSON.
pub fn print_result(result: &RunResult, path: Option<&Path>, as_json: bool) -> Result<()> {
    if as_json {
        let report = ExportReport { result, path };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in describe_result(result, path) {
            println!("{}", line);
        }
    }
    Ok(())
}
