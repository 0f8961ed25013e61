//! Running stage plans against a builder and packaging the outcome.

use std::time::Instant;

use chrono::{DateTime, Utc};
use log::{debug, error, info};

use super::{plan_stages, ArtifactBuilder, CancellationFlag, Stage};
use crate::{
    document::DocumentEngine,
    export::{assemble, AssembleInput},
    models::{OutputFormat, Play, ProgressEvent, ProgressSink, ReportConfig, RunResult},
    workbook::WorkbookEngine,
    ReportError, Result,
};

/// Everything one run reads.
#[derive(Debug, Clone)]
pub struct RunInput<'a> {
    pub plays: &'a [Play],
    /// `captures[i]` is the diagram for `plays[i]`, before filtering.
    pub captures: Vec<Option<Vec<u8>>>,
    pub config: &'a ReportConfig,
    pub now: DateTime<Utc>,
}

impl<'a> RunInput<'a> {
    pub fn new(plays: &'a [Play], config: &'a ReportConfig) -> Self {
        Self {
            plays,
            captures: Vec::new(),
            config,
            now: Utc::now(),
        }
    }

    pub fn with_captures(mut self, captures: Vec<Option<Vec<u8>>>) -> Self {
        self.captures = captures;
        self
    }

    /// Pin the run date, which feeds filenames and time-based analytics.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}

/// One entry of a batch. `config` replaces the shared configuration.
#[derive(Debug, Clone, Default)]
pub struct BatchItem {
    pub plays: Vec<Play>,
    pub captures: Vec<Option<Vec<u8>>>,
    pub config: Option<ReportConfig>,
}

/// Execute one run. Never panics on bad input: every failure becomes a failed
/// [`RunResult`].
pub fn run(
    input: RunInput<'_>,
    sink: Option<&mut (dyn ProgressSink + '_)>,
    cancel: Option<&CancellationFlag>,
) -> RunResult {
    let started = Instant::now();
    match execute(input, sink, cancel, started) {
        Ok(result) => result,
        Err(e) => {
            error!("Export failed: {}", e);
            RunResult::failure(e.to_string())
        }
    }
}

/// Plays passing the filter, with their captures kept aligned.
fn select(input: &RunInput<'_>) -> (Vec<Play>, Vec<Option<Vec<u8>>>) {
    let filter = &input.config.filter;
    let mut captures = input.captures.iter();
    input
        .plays
        .iter()
        .map(|play| (play, captures.next().cloned().flatten()))
        .filter(|(play, _)| filter.matches(play))
        .map(|(play, capture)| (play.clone(), capture))
        .unzip()
}

fn execute(
    input: RunInput<'_>,
    mut sink: Option<&mut (dyn ProgressSink + '_)>,
    cancel: Option<&CancellationFlag>,
    started: Instant,
) -> Result<RunResult> {
    let config = input.config;
    config.validate()?;

    let (plays, captures) = select(&input);
    let play_count = plays.len();
    debug!("{} of {} plays selected", play_count, input.plays.len());
    let single_name = match plays.as_slice() {
        [only] => Some(only.name.clone()),
        _ => None,
    };

    let stages = plan_stages(config, play_count);
    let total = stages.len();
    let mut builder: Box<dyn ArtifactBuilder + '_> = match config.format {
        OutputFormat::Pdf => Box::new(DocumentEngine::new(config, plays, captures, input.now)),
        OutputFormat::Workbook | OutputFormat::FlatTable => {
            Box::new(WorkbookEngine::new(config, plays, input.now))
        }
    };
    debug!(
        "Planned {} stages for {} plays ({})",
        total,
        builder.play_count(),
        config.format
    );

    for (i, stage) in stages.iter().copied().enumerate() {
        if cancel.is_some_and(CancellationFlag::is_cancelled) {
            return Err(ReportError::Cancelled {
                stage: stage.name().to_string(),
            });
        }
        builder.run_stage(stage).map_err(|e| with_stage(e, stage))?;
        if let Some(sink) = sink.as_deref_mut() {
            let event = ProgressEvent::new(
                stage.name(),
                i + 1,
                total,
                stage.message(config),
                started.elapsed(),
            );
            sink.on_progress(&event);
        }
    }

    let artifact = builder.finish()?;
    let result = assemble(AssembleInput {
        artifact,
        config,
        play_count,
        single_name,
        now: input.now,
        elapsed: started.elapsed(),
    });
    info!(
        "Exported {} plays as {} ({} bytes, {} ms)",
        play_count,
        result.filename.as_deref().unwrap_or("-"),
        result.size,
        started.elapsed().as_millis()
    );
    Ok(result)
}

/// Keep stage failures readable: name the stage unless the error already does.
fn with_stage(error: ReportError, stage: Stage) -> ReportError {
    match error {
        ReportError::Render { .. } | ReportError::Cancelled { .. } => error,
        other => ReportError::render(stage.name(), other.to_string()),
    }
}

/// Run every item in order, one fresh engine each, sharing the sink.
pub fn run_batch(
    items: &[BatchItem],
    config: &ReportConfig,
    mut sink: Option<&mut (dyn ProgressSink + '_)>,
    cancel: Option<&CancellationFlag>,
) -> Vec<RunResult> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let config = item.config.as_ref().unwrap_or(config);
            debug!("batch item {} of {}", i + 1, items.len());
            let input = RunInput::new(&item.plays, config).with_captures(item.captures.clone());
            run(input, sink.as_deref_mut(), cancel)
        })
        .collect()
}
