//! Pagination cursor and page geometry.
//!
//! The cursor is a plain value: every rendering function takes the current
//! cursor and returns the updated one, so no layout state hides in the engine.

use crate::models::ReportConfig;

/// Page margin on every side, in millimetres.
pub const MARGIN_MM: f32 = 20.0;
/// Height reserved above the bottom margin for the footer.
pub const FOOTER_MM: f32 = 12.0;

/// Millimetres to PDF points.
pub const MM_TO_PT: f32 = 72.0 / 25.4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub footer: f32,
}

impl PageGeometry {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            margin: MARGIN_MM,
            footer: FOOTER_MM,
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        let (w, h) = config.page_dimensions_mm();
        Self::new(w, h)
    }

    pub fn content_top(&self) -> f32 {
        self.margin
    }

    /// Lowest y a content block may reach.
    pub fn content_bottom(&self) -> f32 {
        self.height - self.margin - self.footer
    }

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    pub fn content_height(&self) -> f32 {
        self.content_bottom() - self.content_top()
    }
}

/// Position in the document: 1-based page number and vertical offset in mm.
///
/// `page == 0` means no page has been started yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub page: usize,
    pub y: f32,
}

impl Cursor {
    pub fn start() -> Self {
        Self { page: 0, y: 0.0 }
    }

    /// Cursor at the top of the next page. Does not touch any canvas.
    pub fn next_page(self, geometry: &PageGeometry) -> Self {
        Self {
            page: self.page + 1,
            y: geometry.content_top(),
        }
    }

    /// Move down by `dy` millimetres. Offsets only grow within a page.
    pub fn advance(self, dy: f32) -> Self {
        Self {
            page: self.page,
            y: self.y + dy.max(0.0),
        }
    }

    pub fn fits(&self, height: f32, geometry: &PageGeometry) -> bool {
        self.page > 0 && self.y + height <= geometry.content_bottom()
    }
}
