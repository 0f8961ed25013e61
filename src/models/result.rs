//! Run results handed back to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::{OutputFormat, Quality, ReportConfig, SheetFormat};

/// Concrete file type of a produced artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Pdf,
    Xlsx,
    Csv,
    Tsv,
}

impl ArtifactKind {
    /// Artifact kind implied by a configuration. Depends only on the requested format.
    pub fn for_config(config: &ReportConfig) -> Self {
        match config.format {
            OutputFormat::Pdf => ArtifactKind::Pdf,
            OutputFormat::Workbook | OutputFormat::FlatTable => match config.sheet_format {
                SheetFormat::Xlsx => ArtifactKind::Xlsx,
                SheetFormat::Csv => ArtifactKind::Csv,
                SheetFormat::Tsv => ArtifactKind::Tsv,
            },
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ArtifactKind::Pdf => "application/pdf",
            ArtifactKind::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ArtifactKind::Csv => "text/csv",
            ArtifactKind::Tsv => "text/tab-separated-values",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactKind::Pdf => "pdf",
            ArtifactKind::Xlsx => "xlsx",
            ArtifactKind::Csv => "csv",
            ArtifactKind::Tsv => "tsv",
        }
    }
}

/// Raw bytes produced by a builder, before packaging.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub bytes: Vec<u8>,
    /// Pages for documents, sheets for workbooks.
    pub unit_count: usize,
}

/// Locator returned by the sharing collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    pub public_url: String,
    #[serde(skip)]
    pub qr_code: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    pub record_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_count: Option<usize>,
    pub template_id: String,
    pub format: OutputFormat,
    pub quality: Quality,
    pub processing_time_ms: u64,
    pub generated_at: DateTime<Utc>,
    pub config: ReportConfig,
}

/// Outcome of one run. Built once and never modified afterwards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub success: bool,
    #[serde(skip)]
    pub data: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RunMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share: Option<ShareLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_error: Option<String>,
}

impl RunResult {
    /// Failed run: no artifact, descriptive error.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            filename: None,
            size: 0,
            mime_type: None,
            error: Some(message.into()),
            metadata: None,
            share: None,
            share_error: None,
        }
    }
}
