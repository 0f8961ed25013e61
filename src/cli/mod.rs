//! CLI argument definitions and parsing.

pub mod types;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use types::ShareExpiry;

use crate::models::{
    Category, ColorMode, Orientation, OutputFormat, PageSize, Quality, SheetFormat,
};

/// Configuration file plus per-field overrides shared between commands
#[derive(Debug, Default, Args)]
pub struct ConfigOverrides {
    /// Report configuration JSON (camelCase keys, every field optional).
    #[clap(long, short)]
    pub config: Option<PathBuf>,

    /// Output format.
    #[clap(long, short, value_enum)]
    pub format: Option<OutputFormat>,

    /// Template id: playbook, game-plan, scouting-report, practice-plan, quick-reference.
    #[clap(long, short)]
    pub template: Option<String>,

    /// Document title (defaults to the team name or the template).
    #[clap(long)]
    pub title: Option<String>,

    /// Team name used on the cover and in the filename.
    #[clap(long)]
    pub team: Option<String>,

    #[clap(long, value_enum)]
    pub quality: Option<Quality>,

    #[clap(long, value_enum)]
    pub color_mode: Option<ColorMode>,

    #[clap(long, value_enum)]
    pub page_size: Option<PageSize>,

    #[clap(long, value_enum)]
    pub orientation: Option<Orientation>,

    /// Diagonal watermark printed on every page.
    #[clap(long)]
    pub watermark: Option<String>,

    /// Serialization for workbook and flat-table output.
    #[clap(long, value_enum)]
    pub sheet_format: Option<SheetFormat>,

    /// Only include plays of this category (repeatable):
    /// `--category offensive --category set-piece`.
    #[clap(long = "category", value_enum)]
    pub categories: Vec<Category>,

    /// Only include plays using this formation (repeatable).
    #[clap(long = "formation")]
    pub formations: Vec<String>,

    /// Only include plays carrying any of these tags (repeatable).
    #[clap(long = "tag")]
    pub tags: Vec<String>,

    /// Lowest effectiveness to include (inclusive).
    #[clap(long)]
    pub min_effectiveness: Option<f64>,

    /// Highest effectiveness to include (inclusive).
    #[clap(long)]
    pub max_effectiveness: Option<f64>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Export one play collection as a PDF, workbook or flat table.
    Generate {
        /// JSON array of plays.
        #[clap(long, short)]
        records: PathBuf,

        #[clap(flatten)]
        overrides: ConfigOverrides,

        /// Output directory (or set `PLAYBOOK_EXPORT_DIR` env var).
        #[clap(long, short)]
        output: Option<PathBuf>,

        /// Diagram image for a play, as `INDEX=PATH` (repeatable).
        #[clap(long = "capture")]
        captures: Vec<String>,

        /// Request a share link (needs `PLAYBOOK_SHARE_URL`).
        #[clap(long)]
        share: bool,

        /// Share link lifetime: a number of days or `never`.
        #[clap(long, default_value_t = ShareExpiry::default())]
        share_expires: ShareExpiry,

        /// Suppress progress lines.
        #[clap(long, short)]
        quiet: bool,

        /// Print the run result as JSON instead of text lines.
        #[clap(long)]
        json: bool,
    },

    /// Export several play collections listed in a manifest, one after another.
    Batch {
        /// JSON manifest: `{"items": [{"records": "...", "config": "...", "captures": [...]}]}`.
        #[clap(long, short)]
        manifest: PathBuf,

        #[clap(flatten)]
        overrides: ConfigOverrides,

        /// Output directory (or set `PLAYBOOK_EXPORT_DIR` env var).
        #[clap(long, short)]
        output: Option<PathBuf>,

        /// Suppress progress lines.
        #[clap(long, short)]
        quiet: bool,

        /// Print the run results as JSON instead of text lines.
        #[clap(long)]
        json: bool,
    },

    /// Print the analytics summary for a play collection.
    Summarize {
        /// JSON array of plays.
        #[clap(long, short)]
        records: PathBuf,

        #[clap(flatten)]
        overrides: ConfigOverrides,

        /// Output the summary as JSON instead of text lines.
        #[clap(long)]
        json: bool,
    },
}

#[derive(Debug, Parser)]
#[clap(
    name = "playbook-export",
    version,
    about = "Export tactical playbooks as PDF documents and workbooks"
)]
pub struct PlaybookExport {
    #[clap(subcommand)]
    pub command: Commands,
}
