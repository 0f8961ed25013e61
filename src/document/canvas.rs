//! In-memory page model the layout draws onto.
//!
//! Coordinates are millimetres from the top-left corner of the page; text `y`
//! is the baseline.

use super::cursor::{Cursor, PageGeometry};
use super::imaging::ProcessedImage;
use crate::models::parse_hex_color;

/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_EM: f32 = 0.5;
const PT_TO_MM: f32 = 25.4 / 72.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb(1.0, 1.0, 1.0);
    pub const MUTED: Rgb = Rgb(0.4, 0.4, 0.4);
    pub const RULE: Rgb = Rgb(0.8, 0.8, 0.8);
    pub const PLACEHOLDER: Rgb = Rgb(0.93, 0.93, 0.93);
    pub const WATERMARK: Rgb = Rgb(0.85, 0.85, 0.85);

    /// `#RRGGBB`, or `fallback` when the string does not parse.
    pub fn from_hex(value: &str, fallback: Rgb) -> Rgb {
        parse_hex_color(value)
            .map(|(r, g, b)| Rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0))
            .unwrap_or(fallback)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text {
        x: f32,
        y: f32,
        size: f32,
        font: Font,
        color: Rgb,
        text: String,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: Rgb,
    },
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        fill: Option<Rgb>,
        stroke: Option<Rgb>,
    },
    Image {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        image: usize,
    },
    Watermark {
        text: String,
        size: f32,
    },
}

/// What a page holds, used for bookkeeping and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Cover,
    Contents,
    Section,
    Record(usize),
    Analytics,
    Index,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub number: usize,
    pub kind: PageKind,
    pub elements: Vec<Element>,
    /// Some content did not fit and was left out.
    pub clipped: bool,
}

/// The document under construction.
#[derive(Debug, Clone)]
pub struct Canvas {
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
    pub images: Vec<ProcessedImage>,
}

impl Canvas {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            pages: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Start a new page and return the cursor at its top.
    pub fn add_page(&mut self, cursor: Cursor, kind: PageKind) -> Cursor {
        let next = cursor.next_page(&self.geometry);
        self.pages.push(Page {
            number: next.page,
            kind,
            elements: Vec::new(),
            clipped: false,
        });
        next
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn draw(&mut self, cursor: Cursor, element: Element) {
        if let Some(page) = self.pages.get_mut(cursor.page.wrapping_sub(1)) {
            page.elements.push(element);
        }
    }

    pub fn mark_clipped(&mut self, cursor: Cursor) {
        if let Some(page) = self.pages.get_mut(cursor.page.wrapping_sub(1)) {
            page.clipped = true;
        }
    }

    pub fn add_image(&mut self, image: ProcessedImage) -> usize {
        self.images.push(image);
        self.images.len() - 1
    }

    /// First page number of each record, by record index.
    pub fn record_start_pages(&self) -> Vec<(usize, usize)> {
        let mut starts: Vec<(usize, usize)> = Vec::new();
        for page in &self.pages {
            if let PageKind::Record(i) = page.kind {
                if !starts.iter().any(|(idx, _)| *idx == i) {
                    starts.push((i, page.number));
                }
            }
        }
        starts
    }

    /// Text helper: draws one line at the cursor's baseline.
    pub fn text(&mut self, cursor: Cursor, x: f32, size: f32, font: Font, color: Rgb, text: &str) {
        self.draw(
            cursor,
            Element::Text {
                x,
                y: cursor.y,
                size,
                font,
                color,
                text: text.to_string(),
            },
        );
    }

    pub fn rule(&mut self, cursor: Cursor, color: Rgb, width: f32) {
        let g = self.geometry;
        self.draw(
            cursor,
            Element::Line {
                x1: g.margin,
                y1: cursor.y,
                x2: g.width - g.margin,
                y2: cursor.y,
                width,
                color,
            },
        );
    }
}

/// Vertical space one line of text needs, in millimetres.
pub fn line_height(size_pt: f32) -> f32 {
    size_pt * PT_TO_MM * 1.45
}

/// Estimated rendered width of `text`, in millimetres.
pub fn text_width(text: &str, size_pt: f32) -> f32 {
    text.chars().count() as f32 * size_pt * AVG_GLYPH_EM * PT_TO_MM
}

/// Greedy word wrap to lines no wider than `max_width` millimetres.
///
/// Words longer than a whole line are hard-split.
pub fn wrap_text(text: &str, size_pt: f32, max_width: f32) -> Vec<String> {
    let max_chars = ((max_width / (size_pt * AVG_GLYPH_EM * PT_TO_MM)).floor() as usize).max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            let word: String = word.into_iter().collect();
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > max_chars && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

/// Cut `text` to fit `max_width`, ending with an ellipsis when shortened.
pub fn truncate_to_width(text: &str, size_pt: f32, max_width: f32) -> String {
    if text_width(text, size_pt) <= max_width {
        return text.to_string();
    }
    let max_chars = (max_width / (size_pt * AVG_GLYPH_EM * PT_TO_MM)).floor() as usize;
    let keep = max_chars.saturating_sub(1);
    let mut out: String = text.chars().take(keep).collect();
    out.push('…');
    out
}
