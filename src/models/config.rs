//! Report configuration.
//!
//! A [`ReportConfig`] is read once per run and never mutated while the run is
//! in progress. Every field has a default so partial JSON files are accepted.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{core::filters::PlayFilter, error::ReportError, Result};

/// Which artifact a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Paginated PDF document
    #[default]
    Pdf,
    /// Workbook with one or more sheets
    Workbook,
    /// Single flat sheet
    FlatTable,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Workbook => "workbook",
            OutputFormat::FlatTable => "flat-table",
        };
        write!(f, "{}", s)
    }
}

/// Serialization target for tabular output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SheetFormat {
    #[default]
    Xlsx,
    Csv,
    Tsv,
}

/// Rendering fidelity. Never changes the data in the artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Draft,
    #[default]
    Standard,
    High,
    Print,
}

impl Quality {
    /// Longest edge, in pixels, of an embedded capture. `None` keeps the source size.
    pub fn max_image_edge(&self) -> Option<u32> {
        match self {
            Quality::Draft => Some(400),
            Quality::Standard => Some(800),
            Quality::High => Some(1600),
            Quality::Print => None,
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Quality::Draft => "draft",
            Quality::Standard => "standard",
            Quality::High => "high",
            Quality::Print => "print",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Legal,
}

impl PageSize {
    /// Portrait (width, height) in millimetres.
    pub fn dimensions_mm(&self) -> (f32, f32) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Legal => (215.9, 355.6),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Color transform applied to captured diagrams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ColorMode {
    #[default]
    Color,
    Grayscale,
    BlackWhite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramSize {
    Small,
    Medium,
    Large,
}

impl DiagramSize {
    /// Box height on the page, in millimetres.
    pub fn height_mm(&self) -> f32 {
        match self {
            DiagramSize::Small => 55.0,
            DiagramSize::Medium => 80.0,
            DiagramSize::Large => 110.0,
        }
    }
}

/// Per-template overrides for the layout defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutCustomization {
    pub diagram_size: Option<DiagramSize>,
    pub title_font_size: Option<f32>,
    pub heading_font_size: Option<f32>,
    pub body_font_size: Option<f32>,
}

/// Resolved layout metrics for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateLayout {
    pub diagram_size: DiagramSize,
    pub title_font_size: f32,
    pub heading_font_size: f32,
    pub body_font_size: f32,
}

impl TemplateLayout {
    /// Built-in defaults for a template id. Unknown ids fall back to `playbook`.
    pub fn for_template(template_id: &str) -> Self {
        let (diagram_size, title, heading, body) = match template_id {
            "game-plan" => (DiagramSize::Medium, 22.0, 13.0, 10.0),
            "scouting-report" => (DiagramSize::Small, 20.0, 12.0, 9.0),
            "practice-plan" => (DiagramSize::Large, 22.0, 14.0, 11.0),
            "quick-reference" => (DiagramSize::Small, 18.0, 11.0, 8.0),
            _ => (DiagramSize::Medium, 24.0, 14.0, 10.0),
        };
        Self {
            diagram_size,
            title_font_size: title,
            heading_font_size: heading,
            body_font_size: body,
        }
    }

    /// Template defaults with any customization applied on top.
    pub fn resolve(template_id: &str, custom: Option<&LayoutCustomization>) -> Self {
        let mut layout = Self::for_template(template_id);
        if let Some(c) = custom {
            if let Some(size) = c.diagram_size {
                layout.diagram_size = size;
            }
            if let Some(v) = c.title_font_size {
                layout.title_font_size = v;
            }
            if let Some(v) = c.heading_font_size {
                layout.heading_font_size = v;
            }
            if let Some(v) = c.body_font_size {
                layout.body_font_size = v;
            }
        }
        layout
    }
}

/// Organization branding shown on the cover, footer and filename.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Branding {
    pub team_name: Option<String>,
    pub organization: Option<String>,
    /// `#RRGGBB`
    pub primary_color: String,
    /// `#RRGGBB`
    pub secondary_color: String,
    pub footer_text: Option<String>,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            team_name: None,
            organization: None,
            primary_color: "#1F4E79".to_string(),
            secondary_color: "#D9E2F3".to_string(),
            footer_text: None,
        }
    }
}

/// Where a custom section is inserted in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionPlacement {
    BeforeRecords,
    AfterRecords,
    Appendix,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomSection {
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub placement: SectionPlacement,
}

/// Caller-supplied sheet appended to a multi-sheet workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomSheet {
    pub name: String,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

/// Independent on/off switches for optional content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentToggles {
    pub include_metadata: bool,
    pub include_notes: bool,
    pub include_key_points: bool,
    pub include_variations: bool,
    pub include_statistics: bool,
    pub include_player_instructions: bool,
    pub include_diagrams: bool,
    pub include_video_screenshots: bool,
    pub include_analytics: bool,
    pub include_trends: bool,
    pub include_branding: bool,
    pub include_page_numbers: bool,
    pub include_table_of_contents: bool,
    pub include_cover_page: bool,
    pub include_section_dividers: bool,
    pub include_index: bool,
    pub include_timestamps: bool,
    pub include_tags: bool,
    pub alternate_row_colors: bool,
    pub multi_sheet: bool,
}

impl Default for ContentToggles {
    fn default() -> Self {
        Self {
            include_metadata: true,
            include_notes: true,
            include_key_points: true,
            include_variations: true,
            include_statistics: true,
            include_player_instructions: true,
            include_diagrams: true,
            include_video_screenshots: false,
            include_analytics: false,
            include_trends: false,
            include_branding: true,
            include_page_numbers: true,
            include_table_of_contents: true,
            include_cover_page: true,
            include_section_dividers: true,
            include_index: false,
            include_timestamps: true,
            include_tags: true,
            alternate_row_colors: true,
            multi_sheet: true,
        }
    }
}

/// Full configuration for one export run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportConfig {
    pub format: OutputFormat,
    pub template_id: String,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub quality: Quality,
    pub page_size: PageSize,
    pub orientation: Orientation,
    pub color_mode: ColorMode,
    pub sheet_format: SheetFormat,
    #[serde(flatten)]
    pub content: ContentToggles,
    pub branding: Option<Branding>,
    pub watermark: Option<String>,
    pub custom_sections: Vec<CustomSection>,
    pub custom_sheets: Vec<CustomSheet>,
    pub layout: Option<LayoutCustomization>,
    pub filter: PlayFilter,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            template_id: "playbook".to_string(),
            title: None,
            subtitle: None,
            quality: Quality::default(),
            page_size: PageSize::default(),
            orientation: Orientation::default(),
            color_mode: ColorMode::default(),
            sheet_format: SheetFormat::default(),
            content: ContentToggles::default(),
            branding: None,
            watermark: None,
            custom_sections: Vec::new(),
            custom_sheets: Vec::new(),
            layout: None,
            filter: PlayFilter::default(),
        }
    }
}


impl ReportConfig {
    /// Page (width, height) in millimetres after applying orientation.
    pub fn page_dimensions_mm(&self) -> (f32, f32) {
        let (w, h) = self.page_size.dimensions_mm();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    pub fn layout(&self) -> TemplateLayout {
        TemplateLayout::resolve(&self.template_id, self.layout.as_ref())
    }

    /// Branding block, or defaults when none was configured.
    pub fn branding_or_default(&self) -> Branding {
        self.branding.clone().unwrap_or_default()
    }

    /// Team name used for titles and filenames, if branding provides one.
    pub fn team_name(&self) -> Option<&str> {
        self.branding
            .as_ref()
            .and_then(|b| b.team_name.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Whether this run builds a multi-sheet workbook.
    pub fn is_multi_sheet(&self) -> bool {
        self.format == OutputFormat::Workbook && self.content.multi_sheet
    }

    /// Reject configurations that cannot produce a coherent artifact.
    pub fn validate(&self) -> Result<()> {
        if self.template_id.trim().is_empty() {
            return Err(ReportError::InvalidConfig {
                message: "template id must not be empty".to_string(),
            });
        }
        if let Some(branding) = &self.branding {
            for color in [&branding.primary_color, &branding.secondary_color] {
                if parse_hex_color(color).is_none() {
                    return Err(ReportError::InvalidConfig {
                        message: format!("invalid color '{}', expected #RRGGBB", color),
                    });
                }
            }
        }
        if let Some(layout) = &self.layout {
            let sizes = [
                layout.title_font_size,
                layout.heading_font_size,
                layout.body_font_size,
            ];
            if sizes.iter().flatten().any(|s| !(4.0..=72.0).contains(s)) {
                return Err(ReportError::InvalidConfig {
                    message: "font sizes must be between 4 and 72 points".to_string(),
                });
            }
        }
        for sheet in &self.custom_sheets {
            if sheet.name.trim().is_empty() {
                return Err(ReportError::InvalidConfig {
                    message: "custom sheet name must not be empty".to_string(),
                });
            }
        }
        self.filter.validate()
    }
}

/// Parse `#RRGGBB` into an RGB triple.
pub fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}
