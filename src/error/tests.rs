//! Unit tests for error handling

use super::*;
use std::io;

#[cfg(test)]
mod report_error_tests {
    use super::*;

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let report_error = ReportError::from(json_error);

        match report_error {
            ReportError::Json(_) => (),
            _ => panic!("Expected Json error variant"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let report_error = ReportError::from(io_error);

        match report_error {
            ReportError::Io(_) => (),
            _ => panic!("Expected Io error variant"),
        }
    }

    #[test]
    fn test_xlsx_error_conversion() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let xlsx_error = match workbook.add_worksheet().set_name("") {
            Ok(_) => panic!("Expected an empty sheet name to be rejected"),
            Err(e) => e,
        };
        let report_error = ReportError::from(xlsx_error);

        match report_error {
            ReportError::Xlsx(_) => (),
            _ => panic!("Expected Xlsx error variant"),
        }
    }

    #[test]
    fn test_render_helper() {
        let error = ReportError::render("cover", "font table missing");
        let message = error.to_string();
        assert!(message.contains("cover"));
        assert!(message.contains("font table missing"));
    }

    #[test]
    fn test_invalid_config_display() {
        let error = ReportError::InvalidConfig {
            message: "watermark too long".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid report configuration: watermark too long"
        );
    }

    #[test]
    fn test_cancelled_display() {
        let error = ReportError::Cancelled {
            stage: "record 3".to_string(),
        };
        assert!(error.to_string().contains("record 3"));
    }

    #[test]
    fn test_error_debug_format() {
        let error = ReportError::Share {
            message: "timeout".to_string(),
        };
        let debug_str = format!("{:?}", error);
        assert!(debug_str.contains("Share"));
    }
}
