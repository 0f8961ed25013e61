//! Integration tests for CLI parsing and command handlers

use std::fs;

use clap::Parser;
use playbook_export::{
    cli::{types::ShareExpiry, Commands, PlaybookExport},
    commands::{common::build_config, handle_generate, handle_summarize, GenerateParams},
    models::{ColorMode, OutputFormat, Quality, SheetFormat},
    Category, OUTPUT_DIR_ENV_VAR,
};
use tempfile::tempdir;

const PLAYS: &str = r#"[
    {"id": "p1", "name": "Overload Left", "category": "offensive", "formation": "4-3-3",
     "effectiveness": 80, "createdAt": "2025-01-15T12:00:00Z", "updatedAt": "2025-01-15T12:00:00Z"},
    {"id": "p2", "name": "Mid Block", "category": "defensive", "formation": "4-4-2",
     "effectiveness": 40, "createdAt": "2025-02-10T12:00:00Z", "updatedAt": "2025-02-10T12:00:00Z"}
]"#;

#[test]
fn test_parse_generate_with_overrides() {
    let app = PlaybookExport::try_parse_from([
        "playbook-export",
        "generate",
        "--records",
        "plays.json",
        "--format",
        "workbook",
        "--sheet-format",
        "tsv",
        "--quality",
        "draft",
        "--color-mode",
        "black-white",
        "--category",
        "set-piece",
        "--category",
        "offensive",
        "--capture",
        "0=diagram.png",
        "--share",
        "--share-expires",
        "never",
        "--quiet",
    ])
    .unwrap();

    match app.command {
        Commands::Generate {
            records,
            overrides,
            captures,
            share,
            share_expires,
            quiet,
            json,
            ..
        } => {
            assert_eq!(records.to_str(), Some("plays.json"));
            assert_eq!(overrides.format, Some(OutputFormat::Workbook));
            assert_eq!(overrides.sheet_format, Some(SheetFormat::Tsv));
            assert_eq!(overrides.quality, Some(Quality::Draft));
            assert_eq!(overrides.color_mode, Some(ColorMode::BlackWhite));
            assert_eq!(
                overrides.categories,
                vec![Category::SetPiece, Category::Offensive]
            );
            assert_eq!(captures, vec!["0=diagram.png".to_string()]);
            assert!(share);
            assert_eq!(share_expires, ShareExpiry::Never);
            assert!(quiet);
            assert!(!json);
        }
        other => panic!("Expected generate command, got {:?}", other),
    }
}

#[test]
fn test_parse_defaults() {
    let app = PlaybookExport::try_parse_from(["playbook-export", "generate", "-r", "plays.json"])
        .unwrap();
    match app.command {
        Commands::Generate {
            overrides,
            share_expires,
            ..
        } => {
            assert!(overrides.format.is_none());
            assert!(overrides.categories.is_empty());
            assert_eq!(share_expires, ShareExpiry::Days(30));
        }
        other => panic!("Expected generate command, got {:?}", other),
    }
}

#[test]
fn test_parse_rejects_unknown_values() {
    assert!(PlaybookExport::try_parse_from([
        "playbook-export",
        "generate",
        "-r",
        "plays.json",
        "--format",
        "docx"
    ])
    .is_err());
    assert!(PlaybookExport::try_parse_from(["playbook-export", "generate"]).is_err());
}

#[test]
fn test_parse_batch_and_summarize() {
    let app = PlaybookExport::try_parse_from([
        "playbook-export",
        "batch",
        "--manifest",
        "jobs.json",
        "--json",
    ])
    .unwrap();
    assert!(matches!(app.command, Commands::Batch { json: true, .. }));

    let app = PlaybookExport::try_parse_from([
        "playbook-export",
        "summarize",
        "-r",
        "plays.json",
        "--min-effectiveness",
        "50",
    ])
    .unwrap();
    match app.command {
        Commands::Summarize { overrides, .. } => {
            let config = build_config(&overrides).unwrap();
            assert_eq!(config.filter.effectiveness.unwrap().min, Some(50.0));
        }
        other => panic!("Expected summarize command, got {:?}", other),
    }
}

#[tokio::test]
async fn test_generate_uses_output_dir_env_var() {
    let dir = tempdir().unwrap();
    let records = dir.path().join("plays.json");
    fs::write(&records, PLAYS).unwrap();
    let out = dir.path().join("from-env");
    std::env::set_var(OUTPUT_DIR_ENV_VAR, &out);

    let result = handle_generate(GenerateParams {
        records,
        quiet: true,
        ..GenerateParams::default()
    })
    .await
    .unwrap();
    std::env::remove_var(OUTPUT_DIR_ENV_VAR);

    assert!(result.success);
    let written = out.join(result.filename.unwrap());
    assert!(fs::read(written).unwrap().starts_with(b"%PDF"));
}

#[test]
fn test_summarize_records_file() {
    let dir = tempdir().unwrap();
    let records = dir.path().join("plays.json");
    fs::write(&records, PLAYS).unwrap();

    let args = ["playbook-export", "summarize", "-r", "plays.json"];
    let app = PlaybookExport::try_parse_from(args).unwrap();
    let Commands::Summarize { overrides, .. } = app.command else {
        panic!("Expected summarize command");
    };
    let summary = handle_summarize(&records, &overrides, false).unwrap();
    assert_eq!(summary.total_plays, 2);
    assert_eq!(summary.avg_effectiveness, 60.0);
}
