//! Content filtering for play collections.
//!
//! A [`PlayFilter`] is a conjunction of independent predicates. Each criterion
//! is optional and an absent (or empty) criterion lets every play through, so
//! the order in which criteria are applied never changes the result.
//!
//! # Supported Criteria
//!
//! - **categories**: play category is one of the listed categories
//! - **formations**: play formation is one of the listed formations
//! - **created range**: `created_at` within inclusive date bounds
//! - **effectiveness range**: inclusive bounds, absent or negative effectiveness counts as 0
//! - **tags**: play carries *any* of the requested tags

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::ReportError,
    models::{Category, Play},
    Result,
};

/// Inclusive numeric bounds. Either side may be left open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl ScoreRange {
    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |m| value >= m) && self.max.map_or(true, |m| value <= m)
    }
}

/// Inclusive creation-date bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| at >= s) && self.end.map_or(true, |e| at <= e)
    }
}

/// Selection criteria for the plays that make it into a report.
///
/// # Examples
///
/// ```rust
/// use playbook_export::{Category, PlayFilter};
///
/// let filter = PlayFilter::default()
///     .categories(vec![Category::Offensive])
///     .effectiveness_between(Some(50.0), None);
/// assert!(!filter.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayFilter {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<Category>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub formations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effectiveness: Option<ScoreRange>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl PlayFilter {
    pub fn categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    pub fn formations(mut self, formations: Vec<String>) -> Self {
        self.formations = formations;
        self
    }

    pub fn created_between(
        mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        self.created = Some(DateRange { start, end });
        self
    }

    pub fn effectiveness_between(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.effectiveness = Some(ScoreRange { min, max });
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// True when no criterion restricts the selection.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.formations.is_empty()
            && self.created.is_none()
            && self.effectiveness.is_none()
            && self.tags.is_empty()
    }

    /// Reject ranges whose lower bound is above the upper bound.
    pub fn validate(&self) -> Result<()> {
        if let Some(ScoreRange {
            min: Some(min),
            max: Some(max),
        }) = self.effectiveness
        {
            if min > max {
                return Err(ReportError::InvalidConfig {
                    message: format!("effectiveness range {}..{} is inverted", min, max),
                });
            }
        }
        if let Some(DateRange {
            start: Some(start),
            end: Some(end),
        }) = self.created
        {
            if start > end {
                return Err(ReportError::InvalidConfig {
                    message: "creation date range is inverted".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Whether a single play passes every criterion.
    pub fn matches(&self, play: &Play) -> bool {
        if !self.categories.is_empty() && !self.categories.contains(&play.category) {
            return false;
        }

        if !self.formations.is_empty() && !self.formations.iter().any(|f| f == &play.formation) {
            return false;
        }

        if let Some(range) = &self.created {
            if !range.contains(play.created_at) {
                return false;
            }
        }

        if let Some(range) = &self.effectiveness {
            if !range.contains(play.effectiveness_or_zero()) {
                return false;
            }
        }

        if !self.tags.is_empty() && !play.tags.iter().any(|t| self.tags.contains(t)) {
            return false;
        }

        true
    }
}

/// Select the plays matching `filter`, preserving input order.
pub fn filter_plays(plays: &[Play], filter: &PlayFilter) -> Vec<Play> {
    if filter.is_empty() {
        return plays.to_vec();
    }
    plays.iter().filter(|p| filter.matches(p)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn play(id: &str, category: Category, effectiveness: Option<f64>, tags: &[&str]) -> Play {
        let at = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        Play {
            id: id.to_string(),
            name: format!("Play {}", id),
            description: String::new(),
            category,
            situation: "open-play".to_string(),
            formation: if category == Category::Offensive {
                "4-3-3".to_string()
            } else {
                "4-4-2".to_string()
            },
            created_at: at,
            updated_at: at,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            coach_notes: None,
            key_points: Vec::new(),
            variations: Vec::new(),
            effectiveness,
            success_rate: None,
            usage_frequency: None,
            player_assignments: Vec::new(),
        }
    }

    fn sample() -> Vec<Play> {
        vec![
            play("1", Category::Offensive, Some(80.0), &["press", "wide"]),
            play("2", Category::Defensive, Some(40.0), &["low-block"]),
            play("3", Category::Offensive, None, &[]),
            play("4", Category::SetPiece, Some(100.0), &["corner", "press"]),
        ]
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let plays = sample();
        let filter = PlayFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter_plays(&plays, &filter), plays);
    }

    #[test]
    fn test_category_filter() {
        let filter = PlayFilter::default().categories(vec![Category::Offensive]);
        let ids: Vec<_> = filter_plays(&sample(), &filter)
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_formation_filter() {
        let filter = PlayFilter::default().formations(vec!["4-4-2".to_string()]);
        let ids: Vec<_> = filter_plays(&sample(), &filter)
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["2", "4"]);
    }

    #[test]
    fn test_effectiveness_range_is_inclusive_and_absent_is_zero() {
        let filter = PlayFilter::default().effectiveness_between(Some(0.0), Some(40.0));
        let ids: Vec<_> = filter_plays(&sample(), &filter)
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["2", "3"]);

        let top = PlayFilter::default().effectiveness_between(Some(100.0), None);
        assert_eq!(filter_plays(&sample(), &top).len(), 1);
    }

    #[test]
    fn test_negative_effectiveness_counts_as_zero() {
        let plays = vec![play("neg", Category::Offensive, Some(-5.0), &[])];
        let low = PlayFilter::default().effectiveness_between(Some(0.0), Some(40.0));
        assert_eq!(filter_plays(&plays, &low).len(), 1);

        let floor = PlayFilter::default().effectiveness_between(None, Some(-1.0));
        assert!(filter_plays(&plays, &floor).is_empty());
    }

    #[test]
    fn test_tag_filter_matches_any() {
        let filter = PlayFilter::default().tags(vec!["press".to_string(), "zzz".to_string()]);
        let ids: Vec<_> = filter_plays(&sample(), &filter)
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["1", "4"]);
    }

    #[test]
    fn test_date_range_inclusive_bounds() {
        let at = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let exact = PlayFilter::default().created_between(Some(at), Some(at));
        assert_eq!(filter_plays(&sample(), &exact).len(), 4);

        let just_after = at + chrono::Duration::seconds(1);
        let later = PlayFilter::default().created_between(Some(just_after), None);
        assert!(filter_plays(&sample(), &later).is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let filter = PlayFilter::default()
            .categories(vec![Category::Offensive, Category::SetPiece])
            .tags(vec!["press".to_string()]);
        let once = filter_plays(&sample(), &filter);
        let twice = filter_plays(&once, &filter);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let filter = PlayFilter::default().categories(vec![Category::Defensive]);
        assert!(filter_plays(&[], &filter).is_empty());
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let filter = PlayFilter::default().effectiveness_between(Some(70.0), Some(10.0));
        assert!(filter.validate().is_err());
        assert!(PlayFilter::default().validate().is_ok());
    }

    #[test]
    fn test_filter_serialization() {
        let filter = PlayFilter::default()
            .categories(vec![Category::SpecialTeams])
            .tags(vec!["kick".to_string()]);
        let json = serde_json::to_string(&filter).unwrap();
        assert!(json.contains("\"categories\":[\"special-teams\"]"));
        assert!(json.contains("\"tags\":[\"kick\"]"));
        assert!(!json.contains("formations"));
    }
}
