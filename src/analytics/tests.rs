//! Unit tests for analytics aggregation

use super::*;
use crate::fixtures::{at, full_set, play, scenario_b, variation};

#[test]
fn test_empty_summary_is_zero_valued() {
    let summary = summarize_at(&[], at(2025, 3, 1));
    assert_eq!(summary.total_plays, 0);
    assert_eq!(summary.avg_effectiveness, 0.0);
    assert_eq!(summary.avg_success_rate, 0.0);
    assert_eq!(summary.avg_variations_per_play, 0.0);
    assert!(summary.category_breakdown.is_empty());
    assert!(summary.most_used_category.is_none());
    assert!(summary.most_common_formation.is_none());
    assert!(summary.most_tagged_play.is_none());
    assert!(summary.monthly_trends.is_empty());
    assert_eq!(summary.effectiveness_distribution.len(), 5);
    assert!(summary
        .effectiveness_distribution
        .iter()
        .all(|b| b.count == 0));
}

#[test]
fn test_scenario_b_category_breakdown() {
    let summary = summarize_at(&scenario_b(), at(2025, 3, 1));

    let offensive = summary.category(Category::Offensive).unwrap();
    assert_eq!(offensive.count, 2);
    assert_eq!(offensive.avg_effectiveness, 70.0);
    assert_eq!(offensive.most_effective_play.as_deref(), Some("Overload Left"));

    let defensive = summary.category(Category::Defensive).unwrap();
    assert_eq!(defensive.count, 1);
    assert_eq!(defensive.avg_effectiveness, 40.0);

    assert_eq!(summary.most_used_category, Some(Category::Offensive));
    assert_eq!(summary.avg_effectiveness, 60.0);
}

#[test]
fn test_absent_scores_count_as_zero() {
    let plays = vec![
        play("1", "A", Category::Offensive, Some(90.0)),
        play("2", "B", Category::Offensive, None),
    ];
    let summary = summarize_at(&plays, at(2025, 3, 1));
    assert_eq!(summary.avg_effectiveness, 45.0);
    assert_eq!(summary.category_breakdown[0].avg_effectiveness, 45.0);
}

#[test]
fn test_average_within_bounds() {
    let summary = summarize_at(&full_set(), at(2025, 3, 1));
    let expected = (72.0 + 85.0 + 0.0) / 3.0;
    assert!((summary.avg_effectiveness - expected).abs() < 1e-9);
    assert!((0.0..=100.0).contains(&summary.avg_effectiveness));
}

#[test]
fn test_most_effective_play_first_wins_on_tie() {
    let plays = vec![
        play("1", "First", Category::Transition, Some(70.0)),
        play("2", "Second", Category::Transition, Some(70.0)),
        play("3", "Lower", Category::Transition, Some(10.0)),
    ];
    let breakdown = category_breakdown(&plays);
    assert_eq!(breakdown[0].most_effective_play.as_deref(), Some("First"));
}

#[test]
fn test_most_effective_play_later_higher_replaces() {
    let plays = vec![
        play("1", "Low", Category::Transition, None),
        play("2", "High", Category::Transition, Some(30.0)),
    ];
    let breakdown = category_breakdown(&plays);
    assert_eq!(breakdown[0].most_effective_play.as_deref(), Some("High"));
}

#[test]
fn test_most_used_category_tie_keeps_first_encountered() {
    let plays = vec![
        play("1", "D", Category::Defensive, None),
        play("2", "O", Category::Offensive, None),
    ];
    let summary = summarize_at(&plays, at(2025, 3, 1));
    assert_eq!(summary.most_used_category, Some(Category::Defensive));
}

#[test]
fn test_most_common_formation() {
    let mut plays = scenario_b();
    plays[0].formation = "3-5-2".to_string();
    plays[1].formation = "4-4-2".to_string();
    plays[2].formation = "4-4-2".to_string();
    let summary = summarize_at(&plays, at(2025, 3, 1));
    assert_eq!(summary.most_common_formation.as_deref(), Some("4-4-2"));
}

#[test]
fn test_variation_statistics_use_total_denominator() {
    let summary = summarize_at(&full_set(), at(2025, 3, 1));
    assert_eq!(summary.plays_with_variations, 2);
    assert!((summary.avg_variations_per_play - 1.0).abs() < 1e-9);
}

#[test]
fn test_most_tagged_play_stable_tie() {
    // "Corner Near Post" and "Third Man Run" both have three tags
    let summary = summarize_at(&full_set(), at(2025, 3, 1));
    assert_eq!(summary.most_tagged_play.as_deref(), Some("Corner Near Post"));
}

#[test]
fn test_recent_activity_window() {
    let summary = summarize_at(&full_set(), at(2025, 3, 5));
    // updated 2025-03-01 is within 7 days, 2025-02-10 and 2025-02-01 are not
    assert_eq!(summary.recent_activity, 1);
}

#[test]
fn test_distribution_boundaries_overlap() {
    let plays = vec![
        play("1", "Twenty", Category::Offensive, Some(20.0)),
        play("2", "Zero", Category::Offensive, None),
        play("3", "Hundred", Category::Offensive, Some(100.0)),
        play("4", "Fifty", Category::Offensive, Some(50.0)),
    ];
    let dist = effectiveness_distribution(&plays);
    let counts: Vec<usize> = dist.iter().map(|b| b.count).collect();
    assert_eq!(counts, vec![2, 1, 1, 0, 1]);
    assert_eq!(dist[1].label, "20-40");

    // the boundary value lands in exactly two buckets
    let containing_twenty = dist
        .iter()
        .filter(|b| 20.0 >= b.min as f64 && 20.0 <= b.max as f64)
        .count();
    assert_eq!(containing_twenty, 2);
}

#[test]
fn test_monthly_trends_and_improvement_rate() {
    let mut plays = vec![
        play("1", "Jan A", Category::Offensive, Some(40.0)),
        play("2", "Mar A", Category::Defensive, Some(60.0)),
        play("3", "Feb A", Category::Offensive, Some(50.0)),
        play("4", "Feb B", Category::Defensive, Some(70.0)),
    ];
    plays[0].created_at = at(2025, 1, 3);
    plays[1].created_at = at(2025, 3, 3);
    plays[2].created_at = at(2025, 2, 3);
    plays[3].created_at = at(2025, 2, 9);
    plays[3].usage_frequency = Some(4);

    let trends = monthly_trends(&plays);
    let months: Vec<&str> = trends.iter().map(|t| t.month.as_str()).collect();
    assert_eq!(months, vec!["2025-01", "2025-02", "2025-03"]);

    assert_eq!(trends[0].improvement_rate, 0.0);
    assert_eq!(trends[1].avg_effectiveness, 60.0);
    assert!((trends[1].improvement_rate - 50.0).abs() < 1e-9);
    assert_eq!(trends[2].improvement_rate, 0.0);
    assert_eq!(trends[1].dominant_category, Some(Category::Offensive));
    assert_eq!(trends[1].total_usage, 4);
}

#[test]
fn test_improvement_rate_zero_when_previous_average_zero() {
    let mut plays = vec![
        play("1", "Jan", Category::Offensive, None),
        play("2", "Feb", Category::Offensive, Some(50.0)),
    ];
    plays[0].created_at = at(2025, 1, 3);
    plays[1].created_at = at(2025, 2, 3);
    let trends = monthly_trends(&plays);
    assert_eq!(trends[1].improvement_rate, 0.0);
}

#[test]
fn test_formation_analysis() {
    let mut plays = scenario_b();
    plays[0].success_rate = Some(50.0);
    plays[2].formation = "5-3-2".to_string();
    plays[2].success_rate = Some(30.0);

    let analysis = formation_analysis(&plays);
    assert_eq!(analysis.len(), 2);
    assert_eq!(analysis[0].formation, "4-3-3");
    assert_eq!(analysis[0].count, 2);
    assert_eq!(analysis[0].avg_effectiveness, 70.0);
    assert_eq!(analysis[0].avg_success_rate, 25.0);
    assert_eq!(analysis[0].top_category, Some(Category::Offensive));
    assert_eq!(analysis[1].top_category, Some(Category::Defensive));
}

#[test]
fn test_weekly_trends_window() {
    let now = at(2025, 3, 31);
    let mut plays = vec![
        play("1", "Recent", Category::Offensive, Some(50.0)),
        play("2", "Old", Category::Offensive, Some(90.0)),
    ];
    plays[0].created_at = now - Duration::days(2);
    plays[1].created_at = now - Duration::weeks(20);

    let weeks = weekly_trends(&plays, now);
    assert_eq!(weeks.len(), trends::ROLLING_WEEKS);
    assert_eq!(weeks[0].label, "Week 1");
    assert_eq!(weeks.last().unwrap().play_count, 1);
    assert_eq!(weeks.iter().map(|w| w.play_count).sum::<usize>(), 1);
}

#[test]
fn test_variation_effectiveness_does_not_affect_play_average() {
    let mut p = play("1", "Solo", Category::Offensive, Some(10.0));
    p.variations = vec![variation("v", 99.0)];
    let summary = summarize_at(&[p], at(2025, 3, 1));
    assert_eq!(summary.avg_effectiveness, 10.0);
}
