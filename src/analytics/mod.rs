//! Analytics aggregation over a play collection.
//!
//! Summaries are recomputed on every run and never stored. All averages use
//! the total play count as the denominator with absent scores read as 0, and
//! an empty collection yields a zero-valued summary.
//!
//! Tie-breaks follow a "first wins" rule: groups keep first-appearance order
//! and a running best is only replaced by a strictly greater value.

pub mod trends;

#[cfg(test)]
mod tests;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::{Category, Play};

pub use trends::{monthly_trends, weekly_trends, MonthlyTrend, WeeklyTrend};

/// Plays updated within this many days count as recent activity.
pub const RECENT_ACTIVITY_DAYS: i64 = 7;

/// Width of one effectiveness distribution bucket.
pub const DISTRIBUTION_BUCKET_WIDTH: u32 = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub category: Category,
    pub count: usize,
    pub total_effectiveness: f64,
    pub avg_effectiveness: f64,
    /// Name of the most effective play, first wins on ties.
    pub most_effective_play: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionBucket {
    pub label: String,
    pub min: u32,
    pub max: u32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormationStats {
    pub formation: String,
    pub count: usize,
    pub avg_effectiveness: f64,
    pub avg_success_rate: f64,
    pub top_category: Option<Category>,
}

/// Aggregate statistics for a play collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_plays: usize,
    pub avg_effectiveness: f64,
    pub avg_success_rate: f64,
    pub total_usage: u64,
    pub category_breakdown: Vec<CategoryStats>,
    pub most_used_category: Option<Category>,
    pub most_common_formation: Option<String>,
    pub plays_with_variations: usize,
    pub avg_variations_per_play: f64,
    pub most_tagged_play: Option<String>,
    pub recent_activity: usize,
    pub effectiveness_distribution: Vec<DistributionBucket>,
    pub monthly_trends: Vec<MonthlyTrend>,
    pub formation_analysis: Vec<FormationStats>,
}

impl AnalyticsSummary {
    pub fn category(&self, category: Category) -> Option<&CategoryStats> {
        self.category_breakdown
            .iter()
            .find(|c| c.category == category)
    }
}

/// `sum / count`, or 0 for an empty set.
pub(crate) fn safe_avg(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Group items by key, keeping first-appearance order of the keys.
pub(crate) fn group_in_order<'a, K, F>(plays: &'a [Play], key: F) -> Vec<(K, Vec<&'a Play>)>
where
    K: PartialEq,
    F: Fn(&Play) -> K,
{
    let mut groups: Vec<(K, Vec<&Play>)> = Vec::new();
    for play in plays {
        let k = key(play);
        match groups.iter_mut().find(|(existing, _)| *existing == k) {
            Some((_, members)) => members.push(play),
            None => groups.push((k, vec![play])),
        }
    }
    groups
}

/// Key with the highest count; earlier keys win ties.
pub(crate) fn most_frequent<K: Clone>(groups: &[(K, usize)]) -> Option<K> {
    let mut sorted: Vec<&(K, usize)> = groups.iter().collect();
    // stable: equal counts keep encounter order
    sorted.sort_by(|a, b| b.1.cmp(&a.1));
    sorted.first().map(|(k, _)| k.clone())
}

/// Summarize `plays` relative to the current time.
pub fn summarize(plays: &[Play]) -> AnalyticsSummary {
    summarize_at(plays, Utc::now())
}

/// Summarize `plays` with an explicit "now" for the recent-activity window.
pub fn summarize_at(plays: &[Play], now: DateTime<Utc>) -> AnalyticsSummary {
    let count = plays.len();

    let total_effectiveness: f64 = plays.iter().map(Play::effectiveness_or_zero).sum();
    let total_success: f64 = plays.iter().map(Play::success_rate_or_zero).sum();
    let total_usage: u64 = plays.iter().map(|p| p.usage_or_zero() as u64).sum();

    let category_breakdown = category_breakdown(plays);
    let category_counts: Vec<(Category, usize)> = category_breakdown
        .iter()
        .map(|c| (c.category, c.count))
        .collect();

    let formation_counts: Vec<(String, usize)> = group_in_order(plays, |p| p.formation.clone())
        .into_iter()
        .map(|(f, members)| (f, members.len()))
        .collect();

    let plays_with_variations = plays.iter().filter(|p| !p.variations.is_empty()).count();
    let total_variations: usize = plays.iter().map(|p| p.variations.len()).sum();

    let recent_cutoff = now - Duration::days(RECENT_ACTIVITY_DAYS);
    let recent_activity = plays
        .iter()
        .filter(|p| p.updated_at >= recent_cutoff && p.updated_at <= now)
        .count();

    AnalyticsSummary {
        total_plays: count,
        avg_effectiveness: safe_avg(total_effectiveness, count),
        avg_success_rate: safe_avg(total_success, count),
        total_usage,
        most_used_category: most_frequent(&category_counts),
        most_common_formation: most_frequent(&formation_counts),
        category_breakdown,
        plays_with_variations,
        avg_variations_per_play: safe_avg(total_variations as f64, count),
        most_tagged_play: most_tagged_play(plays),
        recent_activity,
        effectiveness_distribution: effectiveness_distribution(plays),
        monthly_trends: monthly_trends(plays),
        formation_analysis: formation_analysis(plays),
    }
}

/// Per-category counts and averages in first-appearance order.
pub fn category_breakdown(plays: &[Play]) -> Vec<CategoryStats> {
    group_in_order(plays, |p| p.category)
        .into_iter()
        .map(|(category, members)| {
            let total_effectiveness: f64 = members.iter().map(|p| p.effectiveness_or_zero()).sum();

            let mut best: Option<&Play> = None;
            for play in members.iter().copied() {
                let replace = match best {
                    None => true,
                    Some(current) => play.effectiveness_or_zero() > current.effectiveness_or_zero(),
                };
                if replace {
                    best = Some(play);
                }
            }

            CategoryStats {
                category,
                count: members.len(),
                total_effectiveness,
                avg_effectiveness: safe_avg(total_effectiveness, members.len()),
                most_effective_play: best.map(|p| p.name.clone()),
            }
        })
        .collect()
}

/// Name of the play with the most tags; the earliest play wins ties.
pub fn most_tagged_play(plays: &[Play]) -> Option<String> {
    let mut ranked: Vec<&Play> = plays.iter().collect();
    ranked.sort_by(|a, b| b.tags.len().cmp(&a.tags.len()));
    ranked.first().map(|p| p.name.clone())
}

/// Five buckets of width 20 over `[0, 100]`, inclusive on both ends.
///
/// Adjacent buckets share their boundary, so a score of exactly 20, 40, 60 or
/// 80 is counted in two buckets.
pub fn effectiveness_distribution(plays: &[Play]) -> Vec<DistributionBucket> {
    (0..5)
        .map(|i| {
            let min = i * DISTRIBUTION_BUCKET_WIDTH;
            let max = min + DISTRIBUTION_BUCKET_WIDTH;
            let count = plays
                .iter()
                .filter(|p| {
                    let e = p.effectiveness_or_zero();
                    e >= min as f64 && e <= max as f64
                })
                .count();
            DistributionBucket {
                label: format!("{}-{}", min, max),
                min,
                max,
                count,
            }
        })
        .collect()
}

/// Per-formation counts, averages and dominant category.
pub fn formation_analysis(plays: &[Play]) -> Vec<FormationStats> {
    group_in_order(plays, |p| p.formation.clone())
        .into_iter()
        .map(|(formation, members)| {
            let eff: f64 = members.iter().map(|p| p.effectiveness_or_zero()).sum();
            let success: f64 = members.iter().map(|p| p.success_rate_or_zero()).sum();
            let categories: Vec<(Category, usize)> = group_by_category(&members);

            FormationStats {
                formation,
                count: members.len(),
                avg_effectiveness: safe_avg(eff, members.len()),
                avg_success_rate: safe_avg(success, members.len()),
                top_category: most_frequent(&categories),
            }
        })
        .collect()
}

pub(crate) fn group_by_category(members: &[&Play]) -> Vec<(Category, usize)> {
    let mut counts: Vec<(Category, usize)> = Vec::new();
    for play in members {
        match counts.iter_mut().find(|(c, _)| *c == play.category) {
            Some((_, n)) => *n += 1,
            None => counts.push((play.category, 1)),
        }
    }
    counts
}
