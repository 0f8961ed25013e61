//! Job Controller: stage planning, progress reporting and batch runs.
//!
//! A run is planned up front by [`plan_stages`], a pure function of the
//! configuration and the filtered record count. The controller then walks the
//! plan in order, hands each stage to an [`ArtifactBuilder`], and emits exactly
//! one [`ProgressEvent`](crate::models::ProgressEvent) per completed stage.
//!
//! # Example
//!
//! ```rust
//! use playbook_export::{job::total_steps, models::ReportConfig};
//!
//! let config = ReportConfig::default();
//! // init + capture + cover + contents + 3 records + finalize
//! assert_eq!(total_steps(&config, 3), 8);
//! ```

pub mod controller;


use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::{
    models::{Artifact, OutputFormat, ReportConfig, SectionPlacement},
    Result,
};

pub use controller::{run, run_batch, BatchItem, RunInput};

/// One counted unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    /// Decode and color-convert the supplied captures.
    Capture,
    Cover,
    TableOfContents,
    /// Index into `ReportConfig::custom_sections`.
    Section(usize),
    Record(usize),
    Analytics,
    Index,
    Overview,
    FlatSheet,
    CategorySheets,
    Statistics,
    AnalyticsSheet,
    PlayerData,
    Variations,
    Trends,
    CustomSheets,
    Finalize,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::Capture => "capture",
            Stage::Cover => "cover",
            Stage::TableOfContents => "table-of-contents",
            Stage::Section(_) => "custom-section",
            Stage::Record(_) => "record",
            Stage::Analytics => "analytics",
            Stage::Index => "index",
            Stage::Overview => "overview",
            Stage::FlatSheet => "flat-sheet",
            Stage::CategorySheets => "category-sheets",
            Stage::Statistics => "statistics",
            Stage::AnalyticsSheet => "analytics-sheet",
            Stage::PlayerData => "player-data",
            Stage::Variations => "variations",
            Stage::Trends => "trends",
            Stage::CustomSheets => "custom-sheets",
            Stage::Finalize => "finalize",
        }
    }

    /// Human-readable progress message.
    pub fn message(&self, config: &ReportConfig) -> String {
        match self {
            Stage::Init => "Preparing export".to_string(),
            Stage::Capture => "Processing diagrams".to_string(),
            Stage::Cover => "Rendering cover page".to_string(),
            Stage::TableOfContents => "Rendering table of contents".to_string(),
            Stage::Section(i) => match config.custom_sections.get(*i) {
                Some(section) => format!("Rendering section '{}'", section.title),
                None => "Rendering custom section".to_string(),
            },
            Stage::Record(i) => format!("Rendering play {}", i + 1),
            Stage::Analytics => "Rendering analytics".to_string(),
            Stage::Index => "Building index".to_string(),
            Stage::Overview => "Building overview sheet".to_string(),
            Stage::FlatSheet => "Building play table".to_string(),
            Stage::CategorySheets => "Building category sheets".to_string(),
            Stage::Statistics => "Building statistics sheet".to_string(),
            Stage::AnalyticsSheet => "Building analytics sheet".to_string(),
            Stage::PlayerData => "Building player data sheet".to_string(),
            Stage::Variations => "Building variations sheet".to_string(),
            Stage::Trends => "Building trends sheet".to_string(),
            Stage::CustomSheets => "Building custom sheets".to_string(),
            Stage::Finalize => "Finalizing export".to_string(),
        }
    }
}

/// Ordered stage list for a run over `play_count` filtered plays.
///
/// Toggled-off stages are not in the list, so they are neither counted nor
/// reported.
pub fn plan_stages(config: &ReportConfig, play_count: usize) -> Vec<Stage> {
    match config.format {
        OutputFormat::Pdf => plan_document(config, play_count),
        OutputFormat::Workbook | OutputFormat::FlatTable => plan_workbook(config),
    }
}

pub fn total_steps(config: &ReportConfig, play_count: usize) -> usize {
    plan_stages(config, play_count).len()
}

fn plan_document(config: &ReportConfig, play_count: usize) -> Vec<Stage> {
    let content = &config.content;
    let sections_at = |placement: SectionPlacement| {
        config
            .custom_sections
            .iter()
            .enumerate()
            .filter(move |(_, s)| s.placement == placement)
            .map(|(i, _)| Stage::Section(i))
    };

    let mut stages = vec![Stage::Init, Stage::Capture];
    if content.include_cover_page {
        stages.push(Stage::Cover);
    }
    if content.include_table_of_contents {
        stages.push(Stage::TableOfContents);
    }
    stages.extend(sections_at(SectionPlacement::BeforeRecords));
    stages.extend((0..play_count).map(Stage::Record));
    stages.extend(sections_at(SectionPlacement::AfterRecords));
    if content.include_analytics {
        stages.push(Stage::Analytics);
    }
    if content.include_index {
        stages.push(Stage::Index);
    }
    stages.extend(sections_at(SectionPlacement::Appendix));
    stages.push(Stage::Finalize);
    stages
}

fn plan_workbook(config: &ReportConfig) -> Vec<Stage> {
    if !config.is_multi_sheet() {
        return vec![Stage::Init, Stage::FlatSheet, Stage::Finalize];
    }
    let content = &config.content;
    let mut stages = vec![Stage::Init, Stage::Overview, Stage::CategorySheets];
    let optional = [
        (content.include_statistics, Stage::Statistics),
        (content.include_analytics, Stage::AnalyticsSheet),
        (content.include_player_instructions, Stage::PlayerData),
        (content.include_variations, Stage::Variations),
        (content.include_trends, Stage::Trends),
        (!config.custom_sheets.is_empty(), Stage::CustomSheets),
    ];
    stages.extend(optional.into_iter().filter(|(on, _)| *on).map(|(_, s)| s));
    stages.push(Stage::Finalize);
    stages
}

/// Builds one artifact stage by stage. Each run gets a fresh builder.
pub trait ArtifactBuilder {
    fn run_stage(&mut self, stage: Stage) -> Result<()>;

    /// Number of filtered plays the builder is working on.
    fn play_count(&self) -> usize;

    fn finish(self: Box<Self>) -> Result<Artifact>;
}

/// Cooperative cancellation, checked between stages only.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
