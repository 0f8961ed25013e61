//! Error types for the playbook export engine

use thiserror::Error;

#[cfg(test)]
mod tests;

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook serialization failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Invalid report configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Stage '{stage}' failed: {message}")]
    Render { stage: String, message: String },

    #[error("Share link request failed: {message}")]
    Share { message: String },

    #[error("Export cancelled before stage '{stage}'")]
    Cancelled { stage: String },
}

impl ReportError {
    /// Shorthand for a stage failure with a formatted message.
    pub fn render(stage: impl Into<String>, message: impl Into<String>) -> Self {
        ReportError::Render {
            stage: stage.into(),
            message: message.into(),
        }
    }
}
