//! Summarize command implementation

use std::path::Path;

use crate::{
    analytics::{summarize, AnalyticsSummary},
    cli::ConfigOverrides,
    core::{filter_plays, load_plays},
    Result,
};

use super::common::build_config;

/// Handle the summarize command: filter the plays the same way an export
/// would, then print their analytics.
pub fn handle_summarize(
    records: &Path,
    overrides: &ConfigOverrides,
    as_json: bool,
) -> Result<AnalyticsSummary> {
    let plays = load_plays(records)?;
    let config = build_config(overrides)?;
    config.filter.validate()?;
    let selected = filter_plays(&plays, &config.filter);
    let summary = summarize(&selected);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for line in summary_lines(&summary) {
            println!("{}", line);
        }
    }
    Ok(summary)
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

/// Text rendering of a summary, one line per figure.
pub fn summary_lines(summary: &AnalyticsSummary) -> Vec<String> {
    let mut lines = vec![
        format!("Plays: {}", summary.total_plays),
        format!("Average effectiveness: {:.1}", summary.avg_effectiveness),
        format!("Average success rate: {:.1}", summary.avg_success_rate),
        format!("Total usage: {}", summary.total_usage),
        format!(
            "Most used category: {}",
            or_dash(summary.most_used_category.map(|c| c.label()))
        ),
        format!(
            "Most common formation: {}",
            or_dash(summary.most_common_formation.as_deref())
        ),
        format!(
            "Plays with variations: {} ({:.1} per play)",
            summary.plays_with_variations, summary.avg_variations_per_play
        ),
        format!("Most tagged play: {}", or_dash(summary.most_tagged_play.as_deref())),
        format!("Updated in the last week: {}", summary.recent_activity),
    ];

    if !summary.category_breakdown.is_empty() {
        lines.push("Categories:".to_string());
        for stats in &summary.category_breakdown {
            lines.push(format!(
                "  {:<14} {:>3} plays  avg {:>5.1}  best {}",
                stats.category.label(),
                stats.count,
                stats.avg_effectiveness,
                or_dash(stats.most_effective_play.as_deref())
            ));
        }
    }

    lines.push("Effectiveness distribution:".to_string());
    for bucket in &summary.effectiveness_distribution {
        lines.push(format!("  {:<8} {}", bucket.label, bucket.count));
    }

    if !summary.monthly_trends.is_empty() {
        lines.push("Monthly trends:".to_string());
        for trend in &summary.monthly_trends {
            lines.push(format!(
                "  {}  {:>3} plays  avg {:>5.1}  {:+.1}%",
                trend.month, trend.play_count, trend.avg_effectiveness, trend.improvement_rate
            ));
        }
    }

    lines
}
