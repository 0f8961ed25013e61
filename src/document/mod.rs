//! Document Layout Engine: renders plays into a paginated PDF.
//!
//! Rendering happens in two steps. The layout functions in [`layout`] draw onto
//! an in-memory [`Canvas`] while a [`Cursor`] value is threaded through every
//! call; the [`pdf`] writer then serialises the finished canvas. Page numbers
//! in the contents and index are computed up front by [`record_page_number`]
//! rather than by rendering ahead.

pub mod canvas;
pub mod cursor;
pub mod imaging;
pub mod layout;
pub mod pdf;

#[cfg(test)]
mod tests;

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::{
    analytics::summarize_at,
    job::{ArtifactBuilder, Stage},
    models::{Artifact, ArtifactKind, Play, ReportConfig, SectionPlacement},
    ReportError, Result,
};

pub use canvas::{Canvas, PageKind};
pub use cursor::{Cursor, PageGeometry};
pub use imaging::{process_capture, CaptureSlot, ProcessedImage};
use layout::LayoutContext;
pub use pdf::DocumentInfo;

/// Pages the table of contents takes for `play_count` plays.
///
/// Zero when the contents page is switched off.
pub fn toc_page_count(config: &ReportConfig, play_count: usize) -> usize {
    if !config.content.include_table_of_contents {
        return 0;
    }
    let per_page = layout::toc_entries_per_page(PageGeometry::from_config(config).content_height());
    play_count.div_ceil(per_page).max(1)
}

/// Page on which the play at `index` (in filtered order) begins.
pub fn record_page_number(config: &ReportConfig, play_count: usize, index: usize) -> usize {
    let cover = usize::from(config.content.include_cover_page);
    let before_sections = config
        .custom_sections
        .iter()
        .filter(|s| s.placement == SectionPlacement::BeforeRecords)
        .count();
    1 + cover + toc_page_count(config, play_count) + before_sections + index
}

/// Builds one PDF. A fresh engine is used for every run.
pub struct DocumentEngine<'a> {
    config: &'a ReportConfig,
    ctx: LayoutContext<'a>,
    plays: Vec<Play>,
    captures: Vec<Option<Vec<u8>>>,
    slots: Vec<CaptureSlot>,
    canvas: Canvas,
    cursor: Cursor,
    bytes: Option<Vec<u8>>,
}

impl<'a> DocumentEngine<'a> {
    /// `captures[i]` belongs to `plays[i]`; missing entries mean no capture.
    pub fn new(
        config: &'a ReportConfig,
        plays: Vec<Play>,
        captures: Vec<Option<Vec<u8>>>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            config,
            ctx: LayoutContext::new(config, generated_at),
            plays,
            captures,
            slots: Vec::new(),
            canvas: Canvas::new(PageGeometry::from_config(config)),
            cursor: Cursor::start(),
            bytes: None,
        }
    }

    /// The canvas as rendered so far.
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    fn page_of(&self, index: usize) -> usize {
        record_page_number(self.config, self.plays.len(), index)
    }

    fn process_captures(&mut self) {
        let captures = std::mem::take(&mut self.captures);
        let mut slots = vec![CaptureSlot::Missing; self.plays.len()];
        if !self.config.content.include_diagrams {
            self.slots = slots;
            return;
        }
        for (i, capture) in captures.into_iter().enumerate().take(self.plays.len()) {
            let Some(bytes) = capture else { continue };
            slots[i] = match process_capture(&bytes, self.config.color_mode, self.config.quality) {
                Ok(image) => CaptureSlot::Ready(self.canvas.add_image(image)),
                Err(e) => {
                    warn!("Capture for play '{}' could not be decoded: {}", self.plays[i].name, e);
                    CaptureSlot::Failed
                }
            };
        }
        self.slots = slots;
    }

    fn appendix_letter(&self, index: usize) -> Option<char> {
        let section = self.config.custom_sections.get(index)?;
        if section.placement != SectionPlacement::Appendix {
            return None;
        }
        let position = self.config.custom_sections[..index]
            .iter()
            .filter(|s| s.placement == SectionPlacement::Appendix)
            .count();
        char::from_u32('A' as u32 + (position % 26) as u32)
    }

    fn render_contents(&mut self) -> Result<()> {
        let first_record = record_page_number(self.config, self.plays.len(), 0);
        let pages_before = self.canvas.page_count();
        let page_of = |i: usize| first_record + i;
        self.cursor = layout::render_contents(
            &mut self.canvas,
            self.cursor,
            &self.ctx,
            &self.plays,
            &page_of,
        );

        let rendered = self.canvas.page_count() - pages_before;
        let expected = toc_page_count(self.config, self.plays.len());
        if rendered != expected {
            return Err(ReportError::render(
                "table-of-contents",
                format!("rendered {} contents pages, expected {}", rendered, expected),
            ));
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        if self.canvas.page_count() == 0 {
            self.cursor = layout::render_empty_notice(&mut self.canvas, self.cursor, &self.ctx);
        }
        layout::apply_page_furniture(&mut self.canvas, &self.ctx);

        let info = DocumentInfo {
            title: layout::document_title(self.config),
            author: self
                .ctx
                .branding
                .organization
                .clone()
                .or_else(|| self.config.team_name().map(str::to_string)),
            subject: self.config.subtitle.clone(),
            created: self.ctx.generated_at,
            color_mode: self.config.color_mode,
        };
        self.bytes = Some(pdf::write_pdf(&self.canvas, &info)?);
        Ok(())
    }
}

impl ArtifactBuilder for DocumentEngine<'_> {
    fn run_stage(&mut self, stage: Stage) -> Result<()> {
        debug!("document stage {:?} at page {}", stage, self.cursor.page);
        match stage {
            Stage::Init => {
                self.canvas = Canvas::new(PageGeometry::from_config(self.config));
                self.cursor = Cursor::start();
            }
            Stage::Capture => self.process_captures(),
            Stage::Cover => {
                self.cursor =
                    layout::render_cover(&mut self.canvas, self.cursor, &self.ctx, &self.plays);
            }
            Stage::TableOfContents => self.render_contents()?,
            Stage::Section(i) => {
                let section = self.config.custom_sections.get(i).ok_or_else(|| {
                    ReportError::render("custom-section", format!("no custom section at {}", i))
                })?;
                let letter = self.appendix_letter(i);
                self.cursor = layout::render_section(
                    &mut self.canvas,
                    self.cursor,
                    &self.ctx,
                    section,
                    letter,
                );
            }
            Stage::Record(i) => {
                let play = self
                    .plays
                    .get(i)
                    .ok_or_else(|| ReportError::render("record", format!("no play at {}", i)))?;
                let previous = i.checked_sub(1).map(|p| self.plays[p].category);
                let slot = self.slots.get(i).copied().unwrap_or(CaptureSlot::Missing);
                self.cursor = layout::render_record(
                    &mut self.canvas,
                    self.cursor,
                    &self.ctx,
                    play,
                    i,
                    previous,
                    slot,
                );
            }
            Stage::Analytics => {
                let summary = summarize_at(&self.plays, self.ctx.generated_at);
                self.cursor =
                    layout::render_analytics(&mut self.canvas, self.cursor, &self.ctx, &summary);
            }
            Stage::Index => {
                let first_record = self.page_of(0);
                let page_of = |i: usize| first_record + i;
                self.cursor = layout::render_index(
                    &mut self.canvas,
                    self.cursor,
                    &self.ctx,
                    &self.plays,
                    &page_of,
                );
            }
            Stage::Finalize => self.finalize()?,
            other => {
                return Err(ReportError::render(
                    other.name(),
                    "stage does not apply to documents",
                ))
            }
        }
        Ok(())
    }

    fn play_count(&self) -> usize {
        self.plays.len()
    }

    fn finish(self: Box<Self>) -> Result<Artifact> {
        let unit_count = self.canvas.page_count();
        let bytes = self.bytes.ok_or_else(|| {
            ReportError::render("finalize", "document was never finalized")
        })?;
        Ok(Artifact {
            kind: ArtifactKind::Pdf,
            bytes,
            unit_count,
        })
    }
}
