//! Shared builders for unit tests.

use chrono::{DateTime, TimeZone, Utc};

use crate::models::{Category, Play, PlayerAssignment, Variation};

pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

pub fn play(id: &str, name: &str, category: Category, effectiveness: Option<f64>) -> Play {
    Play {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("{} description", name),
        category,
        situation: "open-play".to_string(),
        formation: "4-3-3".to_string(),
        created_at: at(2025, 1, 15),
        updated_at: at(2025, 1, 15),
        tags: Vec::new(),
        coach_notes: None,
        key_points: Vec::new(),
        variations: Vec::new(),
        effectiveness,
        success_rate: None,
        usage_frequency: None,
        player_assignments: Vec::new(),
    }
}

pub fn variation(id: &str, effectiveness: f64) -> Variation {
    Variation {
        id: id.to_string(),
        name: format!("Variation {}", id),
        description: "switch the weak side runner".to_string(),
        effectiveness,
    }
}

pub fn assignment(player: &str, position: &str) -> PlayerAssignment {
    PlayerAssignment {
        player_id: player.to_lowercase(),
        player_name: player.to_string(),
        position: position.to_string(),
        role: "support".to_string(),
        instructions: "hold width and check the run".to_string(),
        performance_rating: Some(7.5),
    }
}

/// Three plays: two offensive (80, 60) and one defensive (40).
pub fn scenario_b() -> Vec<Play> {
    vec![
        play("p1", "Overload Left", Category::Offensive, Some(80.0)),
        play("p2", "Quick Switch", Category::Offensive, Some(60.0)),
        play("p3", "Mid Block", Category::Defensive, Some(40.0)),
    ]
}

/// A richer set exercising every optional field.
pub fn full_set() -> Vec<Play> {
    let mut a = play("a", "Corner Near Post", Category::SetPiece, Some(72.0));
    a.formation = "zonal".to_string();
    a.tags = vec!["corner".into(), "near-post".into(), "aerial".into()];
    a.coach_notes = Some("Runner must arrive late.".to_string());
    a.key_points = vec!["Whipped delivery".into(), "Screen the keeper".into()];
    a.variations = vec![variation("a1", 65.0), variation("a2", 58.0)];
    a.success_rate = Some(35.0);
    a.usage_frequency = Some(12);
    a.player_assignments = vec![assignment("Ada", "CB"), assignment("Ben", "ST")];
    a.created_at = at(2025, 1, 5);
    a.updated_at = at(2025, 2, 1);

    let mut b = play("b", "High Press Trigger", Category::Defensive, Some(85.0));
    b.tags = vec!["press".into()];
    b.success_rate = Some(60.0);
    b.usage_frequency = Some(30);
    b.player_assignments = vec![assignment("Cy", "CM")];
    b.created_at = at(2025, 2, 10);
    b.updated_at = at(2025, 2, 10);

    let mut c = play("c", "Third Man Run", Category::Offensive, None);
    c.tags = vec!["combination".into(), "overlap".into(), "width".into()];
    c.variations = vec![variation("c1", 20.0)];
    c.created_at = at(2025, 2, 20);
    c.updated_at = at(2025, 3, 1);

    vec![a, b, c]
}
