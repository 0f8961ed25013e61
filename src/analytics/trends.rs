//! Time-bucketed trends.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use super::{group_by_category, most_frequent, safe_avg};
use crate::models::{Category, Play};

/// Number of weeks in the rolling weekly window.
pub const ROLLING_WEEKS: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrend {
    /// `YYYY-MM` of `created_at`
    pub month: String,
    pub play_count: usize,
    pub avg_effectiveness: f64,
    pub dominant_category: Option<Category>,
    pub total_usage: u64,
    /// Percent change of `avg_effectiveness` against the previous month.
    pub improvement_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTrend {
    pub label: String,
    pub week_start: NaiveDate,
    pub play_count: usize,
    pub avg_effectiveness: f64,
    pub total_usage: u64,
}

/// Monthly buckets in chronological order.
pub fn monthly_trends(plays: &[Play]) -> Vec<MonthlyTrend> {
    let mut buckets: BTreeMap<String, Vec<&Play>> = BTreeMap::new();
    for play in plays {
        buckets
            .entry(play.created_at.format("%Y-%m").to_string())
            .or_default()
            .push(play);
    }

    let mut trends: Vec<MonthlyTrend> = Vec::with_capacity(buckets.len());
    for (month, members) in buckets {
        let eff: f64 = members.iter().map(|p| p.effectiveness_or_zero()).sum();
        let avg_effectiveness = safe_avg(eff, members.len());
        let improvement_rate = match trends.last() {
            Some(prev) if prev.avg_effectiveness != 0.0 => {
                (avg_effectiveness - prev.avg_effectiveness) / prev.avg_effectiveness * 100.0
            }
            _ => 0.0,
        };

        trends.push(MonthlyTrend {
            month,
            play_count: members.len(),
            avg_effectiveness,
            dominant_category: most_frequent(&group_by_category(&members)),
            total_usage: members.iter().map(|p| p.usage_or_zero() as u64).sum(),
            improvement_rate,
        });
    }
    trends
}

/// Rolling window of [`ROLLING_WEEKS`] seven-day buckets ending at `now`.
///
/// Plays are bucketed by `created_at`; the oldest week comes first.
pub fn weekly_trends(plays: &[Play], now: DateTime<Utc>) -> Vec<WeeklyTrend> {
    (0..ROLLING_WEEKS)
        .map(|i| {
            let start = now - Duration::weeks((ROLLING_WEEKS - i) as i64);
            let end = start + Duration::weeks(1);
            let members: Vec<&Play> = plays
                .iter()
                .filter(|p| p.created_at >= start && p.created_at < end)
                .collect();
            let eff: f64 = members.iter().map(|p| p.effectiveness_or_zero()).sum();

            WeeklyTrend {
                label: format!("Week {}", i + 1),
                week_start: start.date_naive(),
                play_count: members.len(),
                avg_effectiveness: safe_avg(eff, members.len()),
                total_usage: members.iter().map(|p| p.usage_or_zero() as u64).sum(),
            }
        })
        .collect()
}
