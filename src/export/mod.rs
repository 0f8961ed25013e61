//! Result Assembler: filenames, run results and the sharing hand-off.

pub mod share;


use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::models::{Artifact, ArtifactKind, ReportConfig, RunMetadata, RunResult};

pub use share::{
    share_result, ExpirationPolicy, HttpShareService, PasswordPolicy, ResourceDescriptor,
    ShareOptions, ShareRequest, ShareService,
};

/// Team segment used when no branding team name is configured.
pub const DEFAULT_TEAM_SEGMENT: &str = "default";

/// Replace whitespace with `_` and drop characters unsafe in filenames.
fn filename_segment(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect()
}

/// `{team}_{template}_{count}_{date}.{ext}`, or `{team}_{play}_{date}.{ext}` for
/// a single play.
pub fn export_filename(
    config: &ReportConfig,
    play_count: usize,
    single_name: Option<&str>,
    kind: ArtifactKind,
    now: DateTime<Utc>,
) -> String {
    let team = config
        .team_name()
        .map(filename_segment)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_TEAM_SEGMENT.to_string());
    let date = now.format("%Y-%m-%d");
    match single_name.map(filename_segment).filter(|s| !s.is_empty()) {
        Some(name) if play_count == 1 => format!("{}_{}_{}.{}", team, name, date, kind.extension()),
        _ => format!(
            "{}_{}_{}_{}.{}",
            team,
            filename_segment(&config.template_id),
            play_count,
            date,
            kind.extension()
        ),
    }
}

/// What the controller hands over once the last stage has run.
#[derive(Debug)]
pub struct AssembleInput<'a> {
    pub artifact: Artifact,
    pub config: &'a ReportConfig,
    pub play_count: usize,
    pub single_name: Option<String>,
    pub now: DateTime<Utc>,
    pub elapsed: Duration,
}

/// Package a finished artifact as a successful [`RunResult`].
pub fn assemble(input: AssembleInput<'_>) -> RunResult {
    let AssembleInput {
        artifact,
        config,
        play_count,
        single_name,
        now,
        elapsed,
    } = input;
    let filename = export_filename(config, play_count, single_name.as_deref(), artifact.kind, now);
    let (page_count, sheet_count) = match artifact.kind {
        ArtifactKind::Pdf => (Some(artifact.unit_count), None),
        _ => (None, Some(artifact.unit_count)),
    };

    RunResult {
        success: true,
        size: artifact.bytes.len(),
        data: Some(artifact.bytes),
        filename: Some(filename),
        mime_type: Some(artifact.kind.mime_type().to_string()),
        error: None,
        metadata: Some(RunMetadata {
            record_count: play_count,
            page_count,
            sheet_count,
            template_id: config.template_id.clone(),
            format: config.format,
            quality: config.quality,
            processing_time_ms: elapsed.as_millis() as u64,
            generated_at: now,
            config: config.clone(),
        }),
        share: None,
        share_error: None,
    }
}
