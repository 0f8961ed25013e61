//! End-to-end tests for the export engine's public API

use playbook_export::{
    job::total_steps, run, run_batch, summarize, BatchItem, CancellationFlag, Category,
    CollectingSink, OutputFormat, Play, PlayFilter, ProgressEvent, ReportConfig, RunInput,
};

fn plays() -> Vec<Play> {
    serde_json::from_str(
        r#"[
        {
            "id": "p1", "name": "Overload Left", "category": "offensive",
            "formation": "4-3-3", "effectiveness": 80, "usageFrequency": 12,
            "createdAt": "2025-01-15T12:00:00Z", "updatedAt": "2025-01-20T12:00:00Z",
            "tags": ["wide", "press"],
            "variations": [{"id": "v1", "name": "Underlap", "effectiveness": 70}],
            "playerAssignments": [{"playerId": "9", "playerName": "Striker", "position": "ST"}]
        },
        {
            "id": "p2", "name": "Quick Switch", "category": "offensive",
            "formation": "4-3-3", "effectiveness": 60,
            "createdAt": "2025-02-03T12:00:00Z", "updatedAt": "2025-02-03T12:00:00Z"
        },
        {
            "id": "p3", "name": "Mid Block", "category": "defensive",
            "formation": "4-4-2", "effectiveness": 40,
            "createdAt": "2025-02-10T12:00:00Z", "updatedAt": "2025-02-10T12:00:00Z"
        }
    ]"#,
    )
    .unwrap()
}

#[test]
fn test_pdf_export_end_to_end() {
    let plays = plays();
    let config = ReportConfig::default();
    let mut sink = CollectingSink::default();

    let result = run(RunInput::new(&plays, &config), Some(&mut sink), None);

    assert!(result.success, "{:?}", result.error);
    let data = result.data.as_ref().unwrap();
    assert!(data.starts_with(b"%PDF-1.4"));
    assert_eq!(result.size, data.len());
    assert_eq!(result.mime_type.as_deref(), Some("application/pdf"));
    let metadata = result.metadata.as_ref().unwrap();
    // cover + contents + one page per play
    assert_eq!(metadata.page_count, Some(5));
    assert_eq!(metadata.record_count, 3);
    assert_eq!(sink.events.len(), total_steps(&config, 3));
}

#[test]
fn test_workbook_export_end_to_end() {
    let plays = plays();
    let config = ReportConfig {
        format: OutputFormat::Workbook,
        ..ReportConfig::default()
    };

    let result = run(RunInput::new(&plays, &config), None, None);

    assert!(result.success, "{:?}", result.error);
    assert!(result.data.unwrap().starts_with(b"PK"));
    assert!(result.filename.unwrap().ends_with(".xlsx"));
    // Overview, Offensive, Defensive, Statistics, Player Data, Variations
    assert_eq!(result.metadata.unwrap().sheet_count, Some(6));
}

#[test]
fn test_progress_is_monotonic_and_complete() {
    let plays = plays();
    let mut config = ReportConfig::default();
    config.content.include_analytics = true;
    config.content.include_index = true;
    let mut events: Vec<ProgressEvent> = Vec::new();
    let mut sink = |event: &ProgressEvent| events.push(event.clone());

    let result = run(RunInput::new(&plays, &config), Some(&mut sink), None);

    assert!(result.success);
    let expected = total_steps(&config, plays.len());
    assert_eq!(events.len(), expected);
    for (i, event) in events.iter().enumerate() {
        assert_eq!(event.current, i + 1);
        assert_eq!(event.total, expected);
    }
    assert_eq!(events.last().map(|e| e.percentage), Some(100.0));
}

#[test]
fn test_filter_changes_record_count_not_data_shape() {
    let plays = plays();
    let mut config = ReportConfig {
        format: OutputFormat::FlatTable,
        ..ReportConfig::default()
    };
    config.sheet_format = playbook_export::models::SheetFormat::Csv;
    config.filter = PlayFilter::default().categories(vec![Category::Defensive]);

    let result = run(RunInput::new(&plays, &config), None, None);

    assert!(result.success);
    let csv = String::from_utf8(result.data.unwrap()).unwrap();
    assert_eq!(csv.lines().count(), 2);
    assert!(csv.contains("Mid Block"));
    assert_eq!(result.filename.unwrap().split('_').nth(1), Some("Mid"));
}

#[test]
fn test_cancelled_before_start() {
    let plays = plays();
    let config = ReportConfig::default();
    let flag = CancellationFlag::new();
    flag.cancel();
    let mut sink = CollectingSink::default();

    let result = run(RunInput::new(&plays, &config), Some(&mut sink), Some(&flag));

    assert!(!result.success);
    assert!(result.data.is_none());
    assert!(sink.events.is_empty());
}

#[test]
fn test_batch_shares_sink_across_runs() {
    let config = ReportConfig::default();
    let items = vec![
        BatchItem {
            plays: plays(),
            ..BatchItem::default()
        },
        BatchItem {
            plays: Vec::new(),
            ..BatchItem::default()
        },
    ];
    let mut sink = CollectingSink::default();

    let results = run_batch(&items, &config, Some(&mut sink), None);

    assert!(results.iter().all(|r| r.success));
    assert_eq!(
        sink.events.len(),
        total_steps(&config, 3) + total_steps(&config, 0)
    );
}

#[test]
fn test_summary_of_public_records() {
    let summary = summarize(&plays());
    assert_eq!(summary.total_plays, 3);
    assert_eq!(summary.avg_effectiveness, 60.0);
    assert_eq!(summary.most_used_category, Some(Category::Offensive));
    assert_eq!(summary.most_common_formation.as_deref(), Some("4-3-3"));
    assert_eq!(summary.plays_with_variations, 1);
}
