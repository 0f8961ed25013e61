//! Playbook Export Library
//!
//! Turns a collection of tactical plays into shareable artifacts: a paginated
//! PDF playbook, a multi-sheet workbook, or a flat CSV/TSV table, together
//! with the analytics shown inside them.
//!
//! ## Features
//!
//! - **Content Filtering**: select plays by category, formation, creation date,
//!   effectiveness range and tags
//! - **Analytics**: category breakdowns, effectiveness distribution, formation
//!   analysis, monthly and rolling weekly trends
//! - **PDF Documents**: cover, table of contents with exact page numbers, one
//!   page per play, custom sections, analytics and index pages
//! - **Workbooks**: styled xlsx output with fixed sheet layout, or CSV/TSV
//! - **Progress Reporting**: one event per completed stage with a fixed total
//! - **Sharing**: hand the finished export to an external share-link service
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use playbook_export::{run, CollectingSink, OutputFormat, ReportConfig, RunInput};
//!
//! # fn example(plays: Vec<playbook_export::Play>) {
//! let config = ReportConfig {
//!     format: OutputFormat::Workbook,
//!     ..ReportConfig::default()
//! };
//! let mut sink = CollectingSink::default();
//! let result = run(RunInput::new(&plays, &config), Some(&mut sink), None);
//!
//! assert!(result.success);
//! assert_eq!(sink.events.last().map(|e| e.percentage), Some(100.0));
//! # }
//! ```
//!
//! ## Environment Configuration
//!
//! Set a default output directory and, optionally, a share service:
//! ```bash
//! export PLAYBOOK_EXPORT_DIR=~/exports
//! export PLAYBOOK_SHARE_URL=https://share.example.com/api
//! export PLAYBOOK_SHARE_TOKEN=...
//! ```

pub mod analytics;
pub mod cli;
pub mod commands;
pub mod core;
pub mod document;
pub mod error;
pub mod export;
pub mod job;
pub mod models;
pub mod workbook;

#[cfg(test)]
mod fixtures;

// Re-export commonly used types
pub use analytics::{summarize, AnalyticsSummary};
pub use core::filters::{filter_plays, PlayFilter};
pub use error::{ReportError, Result};
pub use export::{share_result, ShareOptions, ShareService};
pub use job::{run, run_batch, total_steps, BatchItem, CancellationFlag, RunInput};
pub use models::{
    Category, CollectingSink, OutputFormat, Play, PlayerAssignment, ProgressEvent, ProgressSink,
    ReportConfig, RunResult, Variation,
};

pub const OUTPUT_DIR_ENV_VAR: &str = "PLAYBOOK_EXPORT_DIR";
