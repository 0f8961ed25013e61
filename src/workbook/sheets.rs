//! Format-independent sheet model and the builders for each generated sheet.

use chrono::{DateTime, Utc};

use crate::{
    analytics::{weekly_trends, AnalyticsSummary},
    models::{Category, ContentToggles, CustomSheet, Play},
};

/// Spreadsheet limit on sheet name length.
pub const MAX_SHEET_NAME: usize = 31;
const FORBIDDEN_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Row where the category table starts on the Statistics sheet.
pub const STATISTICS_CATEGORY_ROW: u32 = 15;
/// Rows of the three tables on the Analytics sheet.
pub const ANALYTICS_TREND_ROW: u32 = 0;
pub const ANALYTICS_DISTRIBUTION_ROW: u32 = 20;
pub const ANALYTICS_FORMATION_ROW: u32 = 30;
/// Row where the rolling weekly table starts on the Trends sheet.
pub const TRENDS_WEEKLY_ROW: u32 = 16;

/// Blank rows kept between a table and one pushed down below it.
const TABLE_GAP: u32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    /// Written with one decimal place.
    Number(f64),
    Integer(i64),
    Empty,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Plain-text rendering used by delimited output.
    pub fn display(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => format!("{:.1}", n),
            Cell::Integer(n) => n.to_string(),
            Cell::Empty => String::new(),
        }
    }
}

impl From<Option<String>> for Cell {
    fn from(value: Option<String>) -> Self {
        value.map_or(Cell::Empty, Cell::Text)
    }
}

/// A rectangular block anchored at `origin_row`.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub origin_row: u32,
    pub title: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: &[&str], rows: Vec<Vec<Cell>>) -> Self {
        Self {
            origin_row: 0,
            title: None,
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    pub fn titled(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn header_row(&self) -> u32 {
        self.origin_row + u32::from(self.title.is_some())
    }

    /// Last row the table occupies.
    pub fn last_row(&self) -> u32 {
        self.header_row() + self.rows.len() as u32
    }

    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub tables: Vec<Table>,
    /// Apply an autofilter over the first table.
    pub autofilter: bool,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
            autofilter: false,
        }
    }

    /// Place `table` at `row`, or lower if the previous table reaches that far.
    pub fn place(&mut self, mut table: Table, row: u32) {
        let floor = self
            .tables
            .last()
            .map_or(0, |t| t.last_row() + 1 + TABLE_GAP);
        table.origin_row = row.max(floor);
        self.tables.push(table);
    }

    pub fn push(&mut self, table: Table) {
        let row = self.tables.last().map_or(0, |t| t.last_row() + 1 + TABLE_GAP);
        self.place(table, row);
    }

    /// Cells of every table written into a dense grid.
    pub fn grid(&self) -> Vec<Vec<Cell>> {
        let height = self.tables.iter().map(|t| t.last_row() + 1).max().unwrap_or(0) as usize;
        let mut grid: Vec<Vec<Cell>> = vec![Vec::new(); height];
        let mut put = |row: u32, cells: Vec<Cell>| {
            grid[row as usize] = cells;
        };
        for table in &self.tables {
            if let Some(title) = &table.title {
                put(table.origin_row, vec![Cell::text(title)]);
            }
            put(table.header_row(), table.headers.iter().map(Cell::text).collect());
            for (i, row) in table.rows.iter().enumerate() {
                put(table.header_row() + 1 + i as u32, row.clone());
            }
        }
        grid
    }
}

/// Make `name` a legal sheet name that is not already taken.
///
/// Names compare case-insensitively, as spreadsheet applications do.
pub fn sanitize_sheet_name(name: &str, taken: &[String]) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if FORBIDDEN_SHEET_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'');
    let base: String = if cleaned.is_empty() {
        "Sheet".to_string()
    } else {
        cleaned.chars().take(MAX_SHEET_NAME).collect()
    };

    let is_taken = |candidate: &str| taken.iter().any(|t| t.eq_ignore_ascii_case(candidate));
    if !is_taken(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let suffix = format!(" ({})", n);
        let keep = MAX_SHEET_NAME - suffix.chars().count();
        let stem: String = base.chars().take(keep).collect();
        let candidate = format!("{}{}", stem.trim_end(), suffix);
        if !is_taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn optional_score(value: Option<f64>) -> Cell {
    value.map_or(Cell::Empty, Cell::Number)
}

fn date(value: DateTime<Utc>) -> Cell {
    Cell::Text(value.format("%Y-%m-%d").to_string())
}

/// One row per play with the columns the toggles allow.
fn play_table(plays: &[Play], toggles: &ContentToggles, detailed: bool) -> Table {
    let mut headers = vec![
        "ID",
        "Name",
        "Category",
        "Situation",
        "Formation",
        "Effectiveness",
        "Success Rate",
        "Usage",
        "Variations",
        "Players",
    ];
    if toggles.include_tags {
        headers.push("Tags");
    }
    if toggles.include_timestamps {
        headers.extend(["Created", "Updated"]);
    }
    if detailed && toggles.include_notes {
        headers.extend(["Description", "Coach Notes"]);
    }
    if detailed && toggles.include_key_points {
        headers.push("Key Points");
    }

    let rows = plays
        .iter()
        .map(|p| {
            let mut row = vec![
                Cell::text(&p.id),
                Cell::text(&p.name),
                Cell::text(p.category.label()),
                Cell::text(&p.situation),
                Cell::text(&p.formation),
                optional_score(p.effectiveness),
                optional_score(p.success_rate),
                Cell::Integer(i64::from(p.usage_or_zero())),
                Cell::Integer(p.variations.len() as i64),
                Cell::Integer(p.player_assignments.len() as i64),
            ];
            if toggles.include_tags {
                row.push(Cell::Text(p.tags.join(", ")));
            }
            if toggles.include_timestamps {
                row.extend([date(p.created_at), date(p.updated_at)]);
            }
            if detailed && toggles.include_notes {
                row.push(Cell::text(&p.description));
                row.push(Cell::from(p.coach_notes.clone()));
            }
            if detailed && toggles.include_key_points {
                row.push(Cell::Text(p.key_points.join("; ")));
            }
            row
        })
        .collect();
    Table::new(&headers, rows)
}

pub fn overview_sheet(plays: &[Play], toggles: &ContentToggles) -> Sheet {
    let mut sheet = Sheet::new("Overview");
    sheet.push(play_table(plays, toggles, false));
    sheet.autofilter = true;
    sheet
}

/// Everything on one sheet, for flat and delimited exports.
pub fn flat_sheet(plays: &[Play], toggles: &ContentToggles) -> Sheet {
    let mut sheet = Sheet::new("Plays");
    sheet.push(play_table(plays, toggles, true));
    sheet
}

/// One sheet per category present, in order of first appearance.
pub fn category_sheets(plays: &[Play]) -> Vec<Sheet> {
    let mut order: Vec<Category> = Vec::new();
    for play in plays {
        if !order.contains(&play.category) {
            order.push(play.category);
        }
    }
    order
        .into_iter()
        .map(|category| {
            let rows = plays
                .iter()
                .filter(|p| p.category == category)
                .map(|p| {
                    vec![
                        Cell::text(&p.name),
                        Cell::text(&p.situation),
                        Cell::text(&p.formation),
                        optional_score(p.effectiveness),
                        optional_score(p.success_rate),
                        Cell::Integer(i64::from(p.usage_or_zero())),
                        Cell::text(&p.description),
                    ]
                })
                .collect();
            let mut sheet = Sheet::new(category.label());
            sheet.push(Table::new(
                &[
                    "Name",
                    "Situation",
                    "Formation",
                    "Effectiveness",
                    "Success Rate",
                    "Usage",
                    "Description",
                ],
                rows,
            ));
            sheet
        })
        .collect()
}

pub fn statistics_sheet(summary: &AnalyticsSummary) -> Sheet {
    let label = |c: Option<Category>| Cell::from(c.map(|c| c.label().to_string()));
    let rows = vec![
        vec![Cell::text("Total Plays"), Cell::Integer(summary.total_plays as i64)],
        vec![Cell::text("Average Effectiveness"), Cell::Number(summary.avg_effectiveness)],
        vec![Cell::text("Average Success Rate"), Cell::Number(summary.avg_success_rate)],
        vec![Cell::text("Total Usage"), Cell::Integer(summary.total_usage as i64)],
        vec![Cell::text("Most Used Category"), label(summary.most_used_category)],
        vec![
            Cell::text("Most Common Formation"),
            Cell::from(summary.most_common_formation.clone()),
        ],
        vec![
            Cell::text("Plays With Variations"),
            Cell::Integer(summary.plays_with_variations as i64),
        ],
        vec![
            Cell::text("Average Variations Per Play"),
            Cell::Number(summary.avg_variations_per_play),
        ],
        vec![Cell::text("Most Tagged Play"), Cell::from(summary.most_tagged_play.clone())],
        vec![Cell::text("Updated In Last 7 Days"), Cell::Integer(summary.recent_activity as i64)],
    ];
    let categories = summary
        .category_breakdown
        .iter()
        .map(|c| {
            vec![
                Cell::text(c.category.label()),
                Cell::Integer(c.count as i64),
                Cell::Number(c.avg_effectiveness),
                Cell::from(c.most_effective_play.clone()),
            ]
        })
        .collect();

    let mut sheet = Sheet::new("Statistics");
    sheet.place(Table::new(&["Metric", "Value"], rows).titled("Summary"), 0);
    sheet.place(
        Table::new(&["Category", "Plays", "Avg Effectiveness", "Most Effective Play"], categories)
            .titled("By Category"),
        STATISTICS_CATEGORY_ROW,
    );
    sheet
}

fn monthly_table(summary: &AnalyticsSummary) -> Table {
    let rows = summary
        .monthly_trends
        .iter()
        .map(|t| {
            vec![
                Cell::text(&t.month),
                Cell::Integer(t.play_count as i64),
                Cell::Number(t.avg_effectiveness),
                Cell::from(t.dominant_category.map(|c| c.label().to_string())),
                Cell::Integer(t.total_usage as i64),
                Cell::Number(t.improvement_rate),
            ]
        })
        .collect();
    Table::new(
        &["Month", "Plays", "Avg Effectiveness", "Dominant Category", "Usage", "Improvement %"],
        rows,
    )
    .titled("Monthly Trends")
}

pub fn analytics_sheet(summary: &AnalyticsSummary) -> Sheet {
    let distribution = summary
        .effectiveness_distribution
        .iter()
        .map(|b| vec![Cell::text(&b.label), Cell::Integer(b.count as i64)])
        .collect();
    let formations = summary
        .formation_analysis
        .iter()
        .map(|f| {
            vec![
                Cell::text(&f.formation),
                Cell::Integer(f.count as i64),
                Cell::Number(f.avg_effectiveness),
                Cell::Number(f.avg_success_rate),
                Cell::from(f.top_category.map(|c| c.label().to_string())),
            ]
        })
        .collect();

    let mut sheet = Sheet::new("Analytics");
    sheet.place(monthly_table(summary), ANALYTICS_TREND_ROW);
    sheet.place(
        Table::new(&["Effectiveness", "Plays"], distribution).titled("Effectiveness Distribution"),
        ANALYTICS_DISTRIBUTION_ROW,
    );
    sheet.place(
        Table::new(
            &["Formation", "Plays", "Avg Effectiveness", "Avg Success Rate", "Top Category"],
            formations,
        )
        .titled("Formation Analysis"),
        ANALYTICS_FORMATION_ROW,
    );
    sheet
}

/// Play × player assignment.
pub fn player_data_sheet(plays: &[Play]) -> Sheet {
    let rows = plays
        .iter()
        .flat_map(|p| {
            p.player_assignments.iter().map(move |a| {
                vec![
                    Cell::text(&p.name),
                    Cell::text(p.category.label()),
                    Cell::text(&a.player_name),
                    Cell::text(&a.position),
                    Cell::text(&a.role),
                    Cell::text(&a.instructions),
                    optional_score(a.performance_rating),
                ]
            })
        })
        .collect();
    let mut sheet = Sheet::new("Player Data");
    sheet.push(Table::new(
        &["Play", "Category", "Player", "Position", "Role", "Instructions", "Rating"],
        rows,
    ));
    sheet.autofilter = true;
    sheet
}

/// Play × variation.
pub fn variations_sheet(plays: &[Play]) -> Sheet {
    let rows = plays
        .iter()
        .flat_map(|p| {
            p.variations.iter().map(move |v| {
                vec![
                    Cell::text(&p.name),
                    Cell::text(p.category.label()),
                    Cell::text(&v.name),
                    Cell::text(&v.description),
                    Cell::Number(v.effectiveness),
                ]
            })
        })
        .collect();
    let mut sheet = Sheet::new("Variations");
    sheet.push(Table::new(
        &["Play", "Category", "Variation", "Description", "Effectiveness"],
        rows,
    ));
    sheet
}

pub fn trends_sheet(plays: &[Play], summary: &AnalyticsSummary, now: DateTime<Utc>) -> Sheet {
    let weekly = weekly_trends(plays, now)
        .into_iter()
        .map(|w| {
            vec![
                Cell::Text(w.label),
                Cell::Text(w.week_start.format("%Y-%m-%d").to_string()),
                Cell::Integer(w.play_count as i64),
                Cell::Number(w.avg_effectiveness),
                Cell::Integer(w.total_usage as i64),
            ]
        })
        .collect();
    let mut sheet = Sheet::new("Trends");
    sheet.place(monthly_table(summary), 0);
    sheet.place(
        Table::new(&["Week", "Starting", "Plays", "Avg Effectiveness", "Usage"], weekly)
            .titled("Rolling 12 Weeks"),
        TRENDS_WEEKLY_ROW,
    );
    sheet
}

/// A custom value becomes a number only when writing it back gives the same text.
fn custom_cell(value: &str) -> Cell {
    let trimmed = value.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        if n.to_string() == trimmed {
            return Cell::Integer(n);
        }
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() && format!("{:.1}", n) == trimmed => Cell::Number(n),
        _ => Cell::text(value),
    }
}

/// Caller-supplied sheet.
pub fn custom_sheet(custom: &CustomSheet) -> Sheet {
    let rows = custom
        .rows
        .iter()
        .map(|row| row.iter().map(|value| custom_cell(value)).collect())
        .collect();
    let headers: Vec<&str> = custom.headers.iter().map(String::as_str).collect();
    let mut sheet = Sheet::new(custom.name.clone());
    sheet.push(Table::new(&headers, rows));
    sheet
}
