//! Tactical play records as supplied by the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ReportError;

/// Tactical category a play belongs to.
///
/// # Examples
///
/// ```rust
/// use playbook_export::Category;
///
/// let category: Category = "special-teams".parse().unwrap();
/// assert_eq!(category.to_string(), "special-teams");
/// assert_eq!(category.label(), "Special Teams");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Offensive,
    Defensive,
    Transition,
    SpecialTeams,
    SetPiece,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Offensive,
        Category::Defensive,
        Category::Transition,
        Category::SpecialTeams,
        Category::SetPiece,
    ];

    /// Machine identifier used in filters and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Offensive => "offensive",
            Category::Defensive => "defensive",
            Category::Transition => "transition",
            Category::SpecialTeams => "special-teams",
            Category::SetPiece => "set-piece",
        }
    }

    /// Human-readable label used in rendered output.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Offensive => "Offensive",
            Category::Defensive => "Defensive",
            Category::Transition => "Transition",
            Category::SpecialTeams => "Special Teams",
            Category::SetPiece => "Set Piece",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| ReportError::InvalidConfig {
                message: format!("unknown category '{}'", s),
            })
    }
}

/// Alternate version of a play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variation {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// 0..=100
    #[serde(default)]
    pub effectiveness: f64,
}

/// Instructions for one player within a play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerAssignment {
    pub player_id: String,
    pub player_name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub performance_rating: Option<f64>,
}

/// One tactical play.
///
/// Numeric scores are optional; every aggregation treats an absent value as
/// zero rather than skipping the play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Play {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    #[serde(default)]
    pub situation: String,
    #[serde(default)]
    pub formation: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coach_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_points: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variations: Vec<Variation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effectiveness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_frequency: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub player_assignments: Vec<PlayerAssignment>,
}

impl Play {
    /// Effectiveness with absent values read as 0 and negatives floored at 0.
    pub fn effectiveness_or_zero(&self) -> f64 {
        self.effectiveness.unwrap_or(0.0).max(0.0)
    }

    pub fn success_rate_or_zero(&self) -> f64 {
        self.success_rate.unwrap_or(0.0).max(0.0)
    }

    pub fn usage_or_zero(&self) -> u32 {
        self.usage_frequency.unwrap_or(0)
    }
}
