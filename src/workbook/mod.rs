//! Workbook Builder: plays as spreadsheet sheets.
//!
//! Sheets are first built into a format-independent model ([`Sheet`]); only the
//! Finalize stage looks at the requested serialisation. A delimited export
//! keeps the first sheet.

pub mod serialize;
pub mod sheets;


use chrono::{DateTime, Utc};
use log::debug;

use crate::{
    analytics::{summarize_at, AnalyticsSummary},
    job::{ArtifactBuilder, Stage},
    models::{Artifact, ArtifactKind, Play, ReportConfig},
    ReportError, Result,
};

pub use sheets::{sanitize_sheet_name, Cell, Sheet, Table};

pub struct WorkbookEngine<'a> {
    config: &'a ReportConfig,
    plays: Vec<Play>,
    generated_at: DateTime<Utc>,
    summary: Option<AnalyticsSummary>,
    sheets: Vec<Sheet>,
    output: Option<Artifact>,
}

impl<'a> WorkbookEngine<'a> {
    pub fn new(config: &'a ReportConfig, plays: Vec<Play>, generated_at: DateTime<Utc>) -> Self {
        Self {
            config,
            plays,
            generated_at,
            summary: None,
            sheets: Vec::new(),
            output: None,
        }
    }

    /// Sheets built so far, in workbook order.
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    fn add(&mut self, mut sheet: Sheet) {
        let taken: Vec<String> = self.sheets.iter().map(|s| s.name.clone()).collect();
        sheet.name = sanitize_sheet_name(&sheet.name, &taken);
        self.sheets.push(sheet);
    }

    fn finalize(&mut self) -> Result<()> {
        let kind = ArtifactKind::for_config(self.config);
        let bytes = match kind {
            ArtifactKind::Xlsx => serialize::to_xlsx(
                &self.sheets,
                &self.config.branding_or_default(),
                self.config.content.alternate_row_colors,
            )?,
            ArtifactKind::Csv => serialize::to_delimited(&self.sheets, b',')?,
            ArtifactKind::Tsv => serialize::to_delimited(&self.sheets, b'\t')?,
            ArtifactKind::Pdf => {
                return Err(ReportError::render("finalize", "workbook cannot be written as pdf"))
            }
        };
        let unit_count = match kind {
            ArtifactKind::Xlsx => self.sheets.len(),
            _ => self.sheets.len().min(1),
        };
        self.output = Some(Artifact {
            kind,
            bytes,
            unit_count,
        });
        Ok(())
    }
}

impl ArtifactBuilder for WorkbookEngine<'_> {
    fn run_stage(&mut self, stage: Stage) -> Result<()> {
        debug!("workbook stage {:?} with {} sheets", stage, self.sheets.len());
        let toggles = self.config.content;
        match stage {
            Stage::Init => {
                self.sheets.clear();
                self.summary = None;
            }
            Stage::Overview => self.add(sheets::overview_sheet(&self.plays, &toggles)),
            Stage::FlatSheet => self.add(sheets::flat_sheet(&self.plays, &toggles)),
            Stage::CategorySheets => {
                for sheet in sheets::category_sheets(&self.plays) {
                    self.add(sheet);
                }
            }
            Stage::Statistics | Stage::AnalyticsSheet | Stage::Trends => {
                let now = self.generated_at;
                let plays = &self.plays;
                let summary = self.summary.get_or_insert_with(|| summarize_at(plays, now));
                let sheet = match stage {
                    Stage::Statistics => sheets::statistics_sheet(summary),
                    Stage::AnalyticsSheet => sheets::analytics_sheet(summary),
                    _ => sheets::trends_sheet(plays, summary, now),
                };
                self.add(sheet);
            }
            Stage::PlayerData => self.add(sheets::player_data_sheet(&self.plays)),
            Stage::Variations => self.add(sheets::variations_sheet(&self.plays)),
            Stage::CustomSheets => {
                let config = self.config;
                for custom in &config.custom_sheets {
                    self.add(sheets::custom_sheet(custom));
                }
            }
            Stage::Finalize => self.finalize()?,
            other => {
                return Err(ReportError::render(
                    other.name(),
                    "stage does not apply to workbooks",
                ))
            }
        }
        Ok(())
    }

    fn play_count(&self) -> usize {
        self.plays.len()
    }

    fn finish(self: Box<Self>) -> Result<Artifact> {
        self.output
            .ok_or_else(|| ReportError::render("finalize", "workbook was never finalized"))
    }
}
