//! Rendering functions for each part of the document.
//!
//! Every function takes the canvas and the current [`Cursor`] and returns the
//! cursor after its content. Record pages and before-records sections are held
//! to exactly one page (overflowing content is clipped) so page numbers stay
//! predictable; everything placed after the records flows onto new pages.

use chrono::{DateTime, Utc};

use super::canvas::{
    line_height, text_width, truncate_to_width, wrap_text, Canvas, Element, Font, PageKind, Rgb,
};
use super::cursor::{Cursor, PageGeometry};
use super::imaging::CaptureSlot;
use crate::{
    analytics::AnalyticsSummary,
    models::{
        Branding, Category, CustomSection, Play, ReportConfig, SectionPlacement, TemplateLayout,
    },
};

/// Height of the heading block above the table of contents entries.
pub const TOC_HEADER_MM: f32 = 18.0;
/// Height of one table of contents entry.
pub const TOC_LINE_MM: f32 = 7.0;

/// Watermark size when the text fits across the page.
pub const WATERMARK_FONT_SIZE: f32 = 54.0;
/// Long watermarks shrink down to this size, then get shortened.
pub const MIN_WATERMARK_FONT_SIZE: f32 = 10.0;

const PARAGRAPH_GAP: f32 = 2.5;
const BLOCK_GAP: f32 = 5.0;

/// What to do when a block does not fit on the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    Clip,
    NewPage(PageKind),
}

/// Everything the rendering functions read but never change.
pub struct LayoutContext<'a> {
    pub config: &'a ReportConfig,
    pub layout: TemplateLayout,
    pub branding: Branding,
    pub primary: Rgb,
    pub secondary: Rgb,
    pub generated_at: DateTime<Utc>,
}

impl<'a> LayoutContext<'a> {
    pub fn new(config: &'a ReportConfig, generated_at: DateTime<Utc>) -> Self {
        let branding = config.branding_or_default();
        let primary = Rgb::from_hex(&branding.primary_color, Rgb(0.12, 0.31, 0.47));
        let secondary = Rgb::from_hex(&branding.secondary_color, Rgb(0.85, 0.89, 0.95));
        Self {
            config,
            layout: config.layout(),
            branding,
            primary,
            secondary,
            generated_at,
        }
    }

    fn body(&self) -> f32 {
        self.layout.body_font_size
    }

    fn heading(&self) -> f32 {
        self.layout.heading_font_size
    }
}

/// Title shown on the cover and in the document info.
pub fn document_title(config: &ReportConfig) -> String {
    if let Some(title) = config.title.as_deref().filter(|t| !t.trim().is_empty()) {
        return title.to_string();
    }
    match config.team_name() {
        Some(team) => format!("{} Playbook", team),
        None => "Playbook".to_string(),
    }
}

/// Make room for `height` mm. `None` means the block must be skipped.
fn reserve(canvas: &mut Canvas, cursor: Cursor, height: f32, overflow: Overflow) -> Option<Cursor> {
    let already_clipped = canvas
        .pages
        .get(cursor.page.wrapping_sub(1))
        .map_or(false, |p| p.clipped);
    if !already_clipped && cursor.fits(height, &canvas.geometry) {
        return Some(cursor);
    }
    match overflow {
        Overflow::Clip => {
            canvas.mark_clipped(cursor);
            None
        }
        Overflow::NewPage(kind) => Some(canvas.add_page(cursor, kind)),
    }
}

/// One line of text; the cursor ends below it.
#[allow(clippy::too_many_arguments)]
fn line(
    canvas: &mut Canvas,
    cursor: Cursor,
    x: f32,
    size: f32,
    font: Font,
    color: Rgb,
    text: &str,
    overflow: Overflow,
) -> Cursor {
    let lh = line_height(size);
    let Some(c) = reserve(canvas, cursor, lh, overflow) else {
        return cursor;
    };
    let c = c.advance(lh);
    canvas.text(Cursor { y: c.y - lh * 0.3, ..c }, x, size, font, color, text);
    c
}

fn paragraph(
    canvas: &mut Canvas,
    cursor: Cursor,
    indent: f32,
    size: f32,
    color: Rgb,
    text: &str,
    overflow: Overflow,
) -> Cursor {
    let x = canvas.geometry.margin + indent;
    let width = canvas.geometry.content_width() - indent;
    let mut c = cursor;
    for l in wrap_text(text, size, width) {
        let before = c;
        c = line(canvas, c, x, size, Font::Regular, color, &l, overflow);
        if c == before {
            break;
        }
    }
    c.advance(PARAGRAPH_GAP)
}

fn heading(
    canvas: &mut Canvas,
    cursor: Cursor,
    ctx: &LayoutContext,
    text: &str,
    overflow: Overflow,
) -> Cursor {
    let size = ctx.heading();
    let needed = line_height(size) + 3.0;
    let Some(c) = reserve(canvas, cursor, needed + line_height(ctx.body()), overflow) else {
        return cursor;
    };
    let margin = canvas.geometry.margin;
    let c = line(canvas, c, margin, size, Font::Bold, ctx.primary, text, overflow);
    if ctx.config.content.include_section_dividers {
        canvas.rule(c.advance(0.5), ctx.primary, 0.4);
        c.advance(2.5)
    } else {
        c.advance(1.5)
    }
}

/// Simple grid table with a filled header row.
fn table(
    canvas: &mut Canvas,
    cursor: Cursor,
    ctx: &LayoutContext,
    headers: &[&str],
    widths: &[f32],
    rows: &[Vec<String>],
    overflow: Overflow,
) -> Cursor {
    let size = ctx.body() - 1.0;
    let row_h = line_height(size) + 1.5;
    let total: f32 = widths.iter().sum();
    let scale = canvas.geometry.content_width() / total;
    let widths: Vec<f32> = widths.iter().map(|w| w * scale).collect();
    let left = canvas.geometry.margin;
    let content_width = canvas.geometry.content_width();

    let draw_row = |canvas: &mut Canvas, c: Cursor, cells: &[String], header: bool, band: bool| {
        let fill = if header {
            Some(ctx.primary)
        } else if band {
            Some(ctx.secondary)
        } else {
            None
        };
        canvas.draw(
            c,
            Element::Rect {
                x: left,
                y: c.y,
                w: content_width,
                h: row_h,
                fill,
                stroke: Some(Rgb::RULE),
            },
        );
        let mut x = left;
        for (cell, w) in cells.iter().zip(&widths) {
            let text = truncate_to_width(cell, size, w - 2.0);
            let (font, color) = if header {
                (Font::Bold, Rgb::WHITE)
            } else {
                (Font::Regular, Rgb::BLACK)
            };
            canvas.text(Cursor { y: c.y + row_h * 0.7, ..c }, x + 1.0, size, font, color, &text);
            x += w;
        }
    };

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let Some(mut c) = reserve(canvas, cursor, row_h * 2.0, overflow) else {
        return cursor;
    };
    draw_row(&mut *canvas, c, &header_cells, true, false);
    c = c.advance(row_h);

    for (i, row) in rows.iter().enumerate() {
        let page_before = c.page;
        let Some(next) = reserve(canvas, c, row_h, overflow) else {
            return c;
        };
        c = next;
        if c.page != page_before {
            draw_row(&mut *canvas, c, &header_cells, true, false);
            c = c.advance(row_h);
        }
        let band = ctx.config.content.alternate_row_colors && i % 2 == 1;
        draw_row(&mut *canvas, c, row, false, band);
        c = c.advance(row_h);
    }
    c.advance(BLOCK_GAP)
}

/// Labelled horizontal bar for a 0..=100 score.
fn score_bar(
    canvas: &mut Canvas,
    cursor: Cursor,
    ctx: &LayoutContext,
    label: &str,
    value: f64,
    overflow: Overflow,
) -> Cursor {
    let size = ctx.body();
    let h = line_height(size) + 1.0;
    let Some(c) = reserve(canvas, cursor, h, overflow) else {
        return cursor;
    };
    let left = canvas.geometry.margin;
    let label_w = 45.0;
    let track_w = canvas.geometry.content_width() - label_w - 20.0;
    let filled = track_w * (value.clamp(0.0, 100.0) / 100.0) as f32;

    let baseline = Cursor { y: c.y + h * 0.7, ..c };
    canvas.text(baseline, left, size, Font::Regular, Rgb::BLACK, label);
    canvas.draw(
        c,
        Element::Rect {
            x: left + label_w,
            y: c.y + 1.0,
            w: track_w,
            h: h - 2.0,
            fill: Some(Rgb::PLACEHOLDER),
            stroke: None,
        },
    );
    if filled > 0.0 {
        canvas.draw(
            c,
            Element::Rect {
                x: left + label_w,
                y: c.y + 1.0,
                w: filled,
                h: h - 2.0,
                fill: Some(ctx.primary),
                stroke: None,
            },
        );
    }
    canvas.text(
        baseline,
        left + label_w + track_w + 2.0,
        size,
        Font::Bold,
        Rgb::BLACK,
        &format!("{:.0}%", value),
    );
    c.advance(h + 1.0)
}

pub fn render_cover(
    canvas: &mut Canvas,
    cursor: Cursor,
    ctx: &LayoutContext,
    plays: &[Play],
) -> Cursor {
    let c = canvas.add_page(cursor, PageKind::Cover);
    let g = canvas.geometry;
    let title_size = ctx.layout.title_font_size + 8.0;

    canvas.draw(
        c,
        Element::Rect {
            x: 0.0,
            y: 0.0,
            w: g.width,
            h: 75.0,
            fill: Some(ctx.primary),
            stroke: None,
        },
    );
    canvas.text(
        Cursor { y: 40.0, ..c },
        g.margin,
        title_size,
        Font::Bold,
        Rgb::WHITE,
        &document_title(ctx.config),
    );
    if let Some(subtitle) = &ctx.config.subtitle {
        let at = Cursor { y: 55.0, ..c };
        canvas.text(at, g.margin, ctx.heading(), Font::Regular, Rgb::WHITE, subtitle);
    }

    let mut c = Cursor { y: 90.0, ..c };
    let body = ctx.body() + 2.0;
    let overflow = Overflow::Clip;
    if ctx.config.content.include_branding {
        if let Some(org) = &ctx.branding.organization {
            c = line(canvas, c, g.margin, body + 2.0, Font::Bold, Rgb::BLACK, org, overflow);
        }
    }
    let facts = [
        format!("Template: {}", ctx.config.template_id),
        format!("Plays: {}", plays.len()),
        format!("Generated: {}", ctx.generated_at.format("%Y-%m-%d")),
    ];
    for fact in &facts {
        c = line(canvas, c, g.margin, body, Font::Regular, Rgb::MUTED, fact, overflow);
    }
    c = c.advance(BLOCK_GAP);

    for category in Category::ALL {
        let n = plays.iter().filter(|p| p.category == category).count();
        if n > 0 {
            let text = format!("{}: {}", category.label(), n);
            c = line(canvas, c, g.margin, ctx.body(), Font::Regular, Rgb::BLACK, &text, overflow);
        }
    }
    c
}

/// Entries that fit on one contents page.
pub fn toc_entries_per_page(content_height: f32) -> usize {
    ((content_height - TOC_HEADER_MM) / TOC_LINE_MM).floor().max(1.0) as usize
}

/// Contents pages listing every play with its page number.
pub fn render_contents(
    canvas: &mut Canvas,
    cursor: Cursor,
    ctx: &LayoutContext,
    plays: &[Play],
    page_of: &dyn Fn(usize) -> usize,
) -> Cursor {
    let g = canvas.geometry;
    let per_page = toc_entries_per_page(g.content_height());
    let size = ctx.body();

    let contents_page = |canvas: &mut Canvas, c: Cursor, title: &str| -> Cursor {
        let c = canvas.add_page(c, PageKind::Contents);
        let title_at = Cursor { y: c.y + 10.0, ..c };
        canvas.text(title_at, g.margin, ctx.heading() + 2.0, Font::Bold, ctx.primary, title);
        if ctx.config.content.include_section_dividers {
            canvas.rule(Cursor { y: c.y + 13.0, ..c }, ctx.primary, 0.4);
        }
        c.advance(TOC_HEADER_MM)
    };

    let mut c = contents_page(&mut *canvas, cursor, "Table of Contents");
    let mut on_page = 0;
    for (i, play) in plays.iter().enumerate() {
        if on_page == per_page {
            c = contents_page(&mut *canvas, c, "Table of Contents (continued)");
            on_page = 0;
        }
        let page = page_of(i).to_string();
        let label = format!("{}. {}", i + 1, play.name);
        let label = truncate_to_width(&label, size, g.content_width() * 0.65);
        let baseline = Cursor { y: c.y + TOC_LINE_MM * 0.7, ..c };
        let category_x = g.margin + g.content_width() * 0.68;
        let page_x = g.width - g.margin - text_width(&page, size);
        canvas.text(baseline, g.margin, size, Font::Regular, Rgb::BLACK, &label);
        canvas.text(
            baseline,
            category_x,
            size - 1.0,
            Font::Regular,
            Rgb::MUTED,
            play.category.label(),
        );
        canvas.text(baseline, page_x, size, Font::Bold, Rgb::BLACK, &page);
        c = c.advance(TOC_LINE_MM);
        on_page += 1;
    }
    c
}

/// A custom section. `appendix` carries the appendix letter.
pub fn render_section(
    canvas: &mut Canvas,
    cursor: Cursor,
    ctx: &LayoutContext,
    section: &CustomSection,
    appendix: Option<char>,
) -> Cursor {
    let overflow = match section.placement {
        SectionPlacement::BeforeRecords => Overflow::Clip,
        _ => Overflow::NewPage(PageKind::Section),
    };
    let c = canvas.add_page(cursor, PageKind::Section);
    let title = match appendix {
        Some(letter) => format!("Appendix {}: {}", letter, section.title),
        None => section.title.clone(),
    };
    let mut c = heading(canvas, c, ctx, &title, overflow);
    for para in section.body.split("\n\n") {
        c = paragraph(canvas, c, 0.0, ctx.body(), Rgb::BLACK, para, overflow);
    }
    clip_marker(canvas, c, ctx);
    c
}

fn clip_marker(canvas: &mut Canvas, cursor: Cursor, ctx: &LayoutContext) {
    let clipped = canvas
        .pages
        .get(cursor.page.wrapping_sub(1))
        .map_or(false, |p| p.clipped);
    if clipped {
        let g = canvas.geometry;
        canvas.text(
            Cursor { y: g.content_bottom() - 1.0, ..cursor },
            g.margin,
            ctx.body() - 2.0,
            Font::Regular,
            Rgb::MUTED,
            "Content shortened to fit this page.",
        );
    }
}

/// One page for one play.
pub fn render_record(
    canvas: &mut Canvas,
    cursor: Cursor,
    ctx: &LayoutContext,
    play: &Play,
    index: usize,
    previous_category: Option<Category>,
    capture: CaptureSlot,
) -> Cursor {
    let overflow = Overflow::Clip;
    let g = canvas.geometry;
    let toggles = ctx.config.content;
    let mut c = canvas.add_page(cursor, PageKind::Record(index));

    if toggles.include_section_dividers && previous_category != Some(play.category) {
        canvas.draw(
            c,
            Element::Rect {
                x: g.margin,
                y: c.y,
                w: g.content_width(),
                h: 8.0,
                fill: Some(ctx.secondary),
                stroke: None,
            },
        );
        canvas.text(
            Cursor { y: c.y + 5.6, ..c },
            g.margin + 2.0,
            ctx.body(),
            Font::Bold,
            ctx.primary,
            &format!("{} Plays", play.category.label()).to_uppercase(),
        );
        c = c.advance(11.0);
    }

    let title_size = ctx.layout.title_font_size;
    c = line(canvas, c, g.margin, title_size, Font::Bold, ctx.primary, &play.name, overflow);
    let mut context_line = vec![play.category.label().to_string()];
    if !play.situation.is_empty() {
        context_line.push(play.situation.clone());
    }
    if !play.formation.is_empty() {
        context_line.push(play.formation.clone());
    }
    let context_line = context_line.join("  |  ");
    c = line(canvas, c, g.margin, ctx.body(), Font::Regular, Rgb::MUTED, &context_line, overflow);
    c = c.advance(BLOCK_GAP);

    if toggles.include_metadata {
        let mut rows = vec![
            vec!["Category".to_string(), play.category.label().to_string()],
            vec!["Situation".to_string(), play.situation.clone()],
            vec!["Formation".to_string(), play.formation.clone()],
            vec!["Usage".to_string(), play.usage_or_zero().to_string()],
        ];
        if toggles.include_timestamps {
            let created = play.created_at.format("%Y-%m-%d").to_string();
            let updated = play.updated_at.format("%Y-%m-%d").to_string();
            rows.push(vec!["Created".to_string(), created]);
            rows.push(vec!["Updated".to_string(), updated]);
        }
        if toggles.include_tags && !play.tags.is_empty() {
            rows.push(vec!["Tags".to_string(), play.tags.join(", ")]);
        }
        c = table(canvas, c, ctx, &["Field", "Value"], &[1.0, 3.0], &rows, overflow);
    }

    if toggles.include_diagrams && capture != CaptureSlot::Missing {
        c = render_diagram(canvas, c, ctx, capture, overflow);
    }

    if toggles.include_player_instructions && !play.player_assignments.is_empty() {
        c = heading(canvas, c, ctx, "Player Instructions", overflow);
        let rows: Vec<Vec<String>> = play
            .player_assignments
            .iter()
            .map(|a| {
                vec![
                    a.player_name.clone(),
                    a.position.clone(),
                    a.role.clone(),
                    a.instructions.clone(),
                    a.performance_rating.map(|r| format!("{:.1}", r)).unwrap_or_default(),
                ]
            })
            .collect();
        c = table(
            canvas,
            c,
            ctx,
            &["Player", "Position", "Role", "Instructions", "Rating"],
            &[2.0, 1.2, 1.5, 4.0, 0.8],
            &rows,
            overflow,
        );
    }

    if toggles.include_video_screenshots {
        c = render_video_placeholders(canvas, c, ctx, overflow);
    }

    if toggles.include_notes {
        if !play.description.is_empty() {
            c = heading(canvas, c, ctx, "Description", overflow);
            let body = ctx.body();
            c = paragraph(canvas, c, 0.0, body, Rgb::BLACK, &play.description, overflow);
        }
        if let Some(notes) = play.coach_notes.as_deref().filter(|n| !n.is_empty()) {
            c = heading(canvas, c, ctx, "Coach Notes", overflow);
            c = paragraph(canvas, c, 0.0, ctx.body(), Rgb::BLACK, notes, overflow);
        }
    }

    if toggles.include_key_points && !play.key_points.is_empty() {
        c = heading(canvas, c, ctx, "Key Points", overflow);
        for point in &play.key_points {
            let bullet = format!("• {}", point);
            c = paragraph(canvas, c, 4.0, ctx.body(), Rgb::BLACK, &bullet, overflow);
        }
    }

    if toggles.include_variations && !play.variations.is_empty() {
        c = heading(canvas, c, ctx, "Variations", overflow);
        for v in &play.variations {
            let text = if v.description.is_empty() {
                format!("{} ({:.0}%)", v.name, v.effectiveness)
            } else {
                format!("{} ({:.0}%): {}", v.name, v.effectiveness, v.description)
            };
            c = paragraph(canvas, c, 4.0, ctx.body(), Rgb::BLACK, &text, overflow);
        }
    }

    if toggles.include_statistics {
        c = heading(canvas, c, ctx, "Statistics", overflow);
        c = score_bar(canvas, c, ctx, "Effectiveness", play.effectiveness_or_zero(), overflow);
        c = score_bar(canvas, c, ctx, "Success rate", play.success_rate_or_zero(), overflow);
        let usage = format!("Times used: {}", play.usage_or_zero());
        c = line(canvas, c, g.margin, ctx.body(), Font::Regular, Rgb::BLACK, &usage, overflow);
    }

    clip_marker(canvas, c, ctx);
    c
}

fn render_diagram(
    canvas: &mut Canvas,
    cursor: Cursor,
    ctx: &LayoutContext,
    capture: CaptureSlot,
    overflow: Overflow,
) -> Cursor {
    let g = canvas.geometry;
    let height = ctx.layout.diagram_size.height_mm();
    let Some(c) = reserve(canvas, cursor, height + BLOCK_GAP, overflow) else {
        return cursor;
    };
    match capture {
        CaptureSlot::Ready(index) => {
            let aspect = canvas.images[index].aspect();
            let w = (height * aspect).min(g.content_width());
            let h = w / aspect;
            let x = g.margin + (g.content_width() - w) / 2.0;
            canvas.draw(c, Element::Image { x, y: c.y, w, h, image: index });
            c.advance(h + BLOCK_GAP)
        }
        _ => {
            canvas.draw(
                c,
                Element::Rect {
                    x: g.margin,
                    y: c.y,
                    w: g.content_width(),
                    h: height,
                    fill: Some(Rgb::PLACEHOLDER),
                    stroke: Some(Rgb::RULE),
                },
            );
            let label = "Diagram unavailable";
            canvas.text(
                Cursor { y: c.y + height / 2.0, ..c },
                g.margin + (g.content_width() - text_width(label, ctx.body())) / 2.0,
                ctx.body(),
                Font::Regular,
                Rgb::MUTED,
                label,
            );
            c.advance(height + BLOCK_GAP)
        }
    }
}

/// Number of video frame placeholders drawn per play.
pub const VIDEO_FRAMES: usize = 3;

fn render_video_placeholders(
    canvas: &mut Canvas,
    cursor: Cursor,
    ctx: &LayoutContext,
    overflow: Overflow,
) -> Cursor {
    let g = canvas.geometry;
    let gap = 4.0;
    let w = (g.content_width() - gap * (VIDEO_FRAMES as f32 - 1.0)) / VIDEO_FRAMES as f32;
    let h = w * 9.0 / 16.0;
    let c = heading(canvas, cursor, ctx, "Video Frames", overflow);
    let Some(c) = reserve(canvas, c, h + BLOCK_GAP, overflow) else {
        return c;
    };
    for i in 0..VIDEO_FRAMES {
        let x = g.margin + i as f32 * (w + gap);
        canvas.draw(
            c,
            Element::Rect {
                x,
                y: c.y,
                w,
                h,
                fill: Some(Rgb::PLACEHOLDER),
                stroke: Some(Rgb::RULE),
            },
        );
        canvas.text(
            Cursor { y: c.y + h / 2.0, ..c },
            x + 3.0,
            ctx.body() - 1.0,
            Font::Regular,
            Rgb::MUTED,
            &format!("Frame {}", i + 1),
        );
    }
    c.advance(h + BLOCK_GAP)
}

pub fn render_analytics(
    canvas: &mut Canvas,
    cursor: Cursor,
    ctx: &LayoutContext,
    summary: &AnalyticsSummary,
) -> Cursor {
    let overflow = Overflow::NewPage(PageKind::Analytics);
    let g = canvas.geometry;
    let c = canvas.add_page(cursor, PageKind::Analytics);
    let title_size = ctx.layout.title_font_size;
    let mut c = line(
        canvas,
        c,
        g.margin,
        title_size,
        Font::Bold,
        ctx.primary,
        "Analytics",
        overflow,
    );
    c = c.advance(BLOCK_GAP);

    c = heading(canvas, c, ctx, "Summary", overflow);
    let or_dash = |value: Option<&str>| value.unwrap_or("-").to_string();
    let rows = vec![
        vec!["Total plays".to_string(), summary.total_plays.to_string()],
        vec!["Average effectiveness".to_string(), format!("{:.1}%", summary.avg_effectiveness)],
        vec!["Average success rate".to_string(), format!("{:.1}%", summary.avg_success_rate)],
        vec!["Total usage".to_string(), summary.total_usage.to_string()],
        vec![
            "Most used category".to_string(),
            or_dash(summary.most_used_category.map(|c| c.label())),
        ],
        vec![
            "Most common formation".to_string(),
            or_dash(summary.most_common_formation.as_deref()),
        ],
        vec!["Plays with variations".to_string(), summary.plays_with_variations.to_string()],
        vec!["Variations per play".to_string(), format!("{:.2}", summary.avg_variations_per_play)],
        vec![
            "Most tagged play".to_string(),
            or_dash(summary.most_tagged_play.as_deref()),
        ],
        vec!["Updated in last 7 days".to_string(), summary.recent_activity.to_string()],
    ];
    c = table(canvas, c, ctx, &["Metric", "Value"], &[2.0, 2.0], &rows, overflow);

    if !summary.category_breakdown.is_empty() {
        c = heading(canvas, c, ctx, "Category Breakdown", overflow);
        let rows: Vec<Vec<String>> = summary
            .category_breakdown
            .iter()
            .map(|s| {
                vec![
                    s.category.label().to_string(),
                    s.count.to_string(),
                    format!("{:.1}%", s.avg_effectiveness),
                    s.most_effective_play.clone().unwrap_or_default(),
                ]
            })
            .collect();
        c = table(
            canvas,
            c,
            ctx,
            &["Category", "Plays", "Avg Effectiveness", "Most Effective"],
            &[1.5, 0.8, 1.3, 2.5],
            &rows,
            overflow,
        );
    }

    c = heading(canvas, c, ctx, "Effectiveness Distribution", overflow);
    let max = summary
        .effectiveness_distribution
        .iter()
        .map(|b| b.count)
        .max()
        .unwrap_or(0);
    for bucket in &summary.effectiveness_distribution {
        let share = if max == 0 { 0.0 } else { bucket.count as f64 / max as f64 * 100.0 };
        let label = format!("{} ({})", bucket.label, bucket.count);
        c = score_bar(canvas, c, ctx, &label, share, overflow);
    }
    c = c.advance(BLOCK_GAP);

    if ctx.config.content.include_trends && !summary.monthly_trends.is_empty() {
        c = heading(canvas, c, ctx, "Monthly Trends", overflow);
        let rows: Vec<Vec<String>> = summary
            .monthly_trends
            .iter()
            .map(|t| {
                vec![
                    t.month.clone(),
                    t.play_count.to_string(),
                    format!("{:.1}%", t.avg_effectiveness),
                    t.dominant_category.map(|c| c.label().to_string()).unwrap_or_default(),
                    t.total_usage.to_string(),
                    format!("{:+.1}%", t.improvement_rate),
                ]
            })
            .collect();
        c = table(
            canvas,
            c,
            ctx,
            &["Month", "Plays", "Avg Eff.", "Dominant", "Usage", "Change"],
            &[1.0, 0.7, 1.0, 1.5, 0.8, 0.9],
            &rows,
            overflow,
        );
    }

    if !summary.formation_analysis.is_empty() {
        c = heading(canvas, c, ctx, "Formation Analysis", overflow);
        let rows: Vec<Vec<String>> = summary
            .formation_analysis
            .iter()
            .map(|f| {
                vec![
                    if f.formation.is_empty() { "-".to_string() } else { f.formation.clone() },
                    f.count.to_string(),
                    format!("{:.1}%", f.avg_effectiveness),
                    format!("{:.1}%", f.avg_success_rate),
                    f.top_category.map(|c| c.label().to_string()).unwrap_or_default(),
                ]
            })
            .collect();
        c = table(
            canvas,
            c,
            ctx,
            &["Formation", "Plays", "Avg Eff.", "Avg Success", "Top Category"],
            &[1.4, 0.7, 1.0, 1.0, 1.5],
            &rows,
            overflow,
        );
    }
    c
}

/// Alphabetical index of plays and tags with page references.
pub fn render_index(
    canvas: &mut Canvas,
    cursor: Cursor,
    ctx: &LayoutContext,
    plays: &[Play],
    page_of: &dyn Fn(usize) -> usize,
) -> Cursor {
    let overflow = Overflow::NewPage(PageKind::Index);
    let g = canvas.geometry;
    let size = ctx.body();
    let c = canvas.add_page(cursor, PageKind::Index);
    let title_size = ctx.layout.title_font_size;
    let mut c = line(canvas, c, g.margin, title_size, Font::Bold, ctx.primary, "Index", overflow);
    c = c.advance(BLOCK_GAP);

    let mut order: Vec<usize> = (0..plays.len()).collect();
    order.sort_by_key(|&i| plays[i].name.to_lowercase());

    let mut letter: Option<char> = None;
    for i in order {
        let play = &plays[i];
        let first = play
            .name
            .chars()
            .next()
            .map(|ch| ch.to_ascii_uppercase())
            .unwrap_or('#');
        if letter != Some(first) {
            letter = Some(first);
            c = c.advance(1.5);
            let initial = first.to_string();
            let heading_size = ctx.heading();
            c = line(
                canvas,
                c,
                g.margin,
                heading_size,
                Font::Bold,
                ctx.primary,
                &initial,
                overflow,
            );
        }
        let entry = format!("{} ({})", play.name, play.category.label());
        let page = page_of(i).to_string();
        let entry = truncate_to_width(&entry, size, g.content_width() * 0.8);
        c = line(canvas, c, g.margin + 4.0, size, Font::Regular, Rgb::BLACK, &entry, overflow);
        let baseline = Cursor { y: c.y - line_height(size) * 0.3, ..c };
        let page_x = g.width - g.margin - text_width(&page, size);
        canvas.text(baseline, page_x, size, Font::Regular, Rgb::BLACK, &page);
    }

    let mut tags: Vec<(String, Vec<usize>)> = Vec::new();
    for (i, play) in plays.iter().enumerate() {
        for tag in &play.tags {
            match tags.iter_mut().find(|(t, _)| t == tag) {
                Some((_, pages)) => pages.push(page_of(i)),
                None => tags.push((tag.clone(), vec![page_of(i)])),
            }
        }
    }
    if !tags.is_empty() {
        tags.sort_by(|a, b| a.0.to_lowercase().cmp(&b.0.to_lowercase()));
        c = c.advance(BLOCK_GAP);
        c = heading(canvas, c, ctx, "Tags", overflow);
        for (tag, pages) in tags {
            let refs: Vec<String> = pages.iter().map(|p| p.to_string()).collect();
            let text = format!("{}: {}", tag, refs.join(", "));
            c = paragraph(canvas, c, 4.0, size, Rgb::BLACK, &text, overflow);
        }
    }
    c
}

/// Single notice page for a document that would otherwise be empty.
pub fn render_empty_notice(canvas: &mut Canvas, cursor: Cursor, ctx: &LayoutContext) -> Cursor {
    let overflow = Overflow::Clip;
    let margin = canvas.geometry.margin;
    let c = canvas.add_page(cursor, PageKind::Section);
    let title = document_title(ctx.config);
    let title_size = ctx.layout.title_font_size;
    let c = line(canvas, c, margin, title_size, Font::Bold, ctx.primary, &title, overflow);
    let c = c.advance(BLOCK_GAP);
    let notice = "No plays match the selected filters.";
    paragraph(canvas, c, 0.0, ctx.body(), Rgb::MUTED, notice, overflow)
}

/// Watermark text and font size that fit along the page diagonal.
pub fn fit_watermark(text: &str, geometry: &PageGeometry) -> (String, f32) {
    let room = (geometry.width.powi(2) + geometry.height.powi(2)).sqrt() * 0.8;
    let full = text_width(text, WATERMARK_FONT_SIZE);
    if full <= room {
        return (text.to_string(), WATERMARK_FONT_SIZE);
    }
    let size = WATERMARK_FONT_SIZE * room / full;
    if size >= MIN_WATERMARK_FONT_SIZE {
        return (text.to_string(), size);
    }
    (
        truncate_to_width(text, MIN_WATERMARK_FONT_SIZE, room),
        MIN_WATERMARK_FONT_SIZE,
    )
}

/// Footer and watermark on every page. Runs once, after all content.
pub fn apply_page_furniture(canvas: &mut Canvas, ctx: &LayoutContext) {
    let g = canvas.geometry;
    let total = canvas.page_count();
    let size = 8.0;
    let toggles = ctx.config.content;
    let brand = [ctx.branding.organization.as_deref(), ctx.config.team_name()]
        .into_iter()
        .flatten()
        .next()
        .map(str::to_string);
    let footer_text = ctx.branding.footer_text.clone();
    let baseline = g.height - g.margin - 2.0;
    let watermark = ctx
        .config
        .watermark
        .as_deref()
        .filter(|w| !w.trim().is_empty())
        .map(|w| fit_watermark(w, &g));

    for page in canvas.pages.iter_mut() {
        if let Some((mark, mark_size)) = &watermark {
            page.elements.insert(
                0,
                Element::Watermark {
                    text: mark.clone(),
                    size: *mark_size,
                },
            );
        }
        page.elements.push(Element::Line {
            x1: g.margin,
            y1: g.content_bottom() + 3.0,
            x2: g.width - g.margin,
            y2: g.content_bottom() + 3.0,
            width: 0.3,
            color: Rgb::RULE,
        });
        if toggles.include_branding {
            if let Some(brand) = &brand {
                page.elements.push(Element::Text {
                    x: g.margin,
                    y: baseline,
                    size,
                    font: Font::Bold,
                    color: ctx.primary,
                    text: brand.clone(),
                });
            }
        }
        if let Some(text) = &footer_text {
            page.elements.push(Element::Text {
                x: (g.width - text_width(text, size)) / 2.0,
                y: baseline,
                size,
                font: Font::Regular,
                color: Rgb::MUTED,
                text: text.clone(),
            });
        }
        if toggles.include_page_numbers {
            let label = format!("Page {} of {}", page.number, total);
            page.elements.push(Element::Text {
                x: g.width - g.margin - text_width(&label, size),
                y: baseline,
                size,
                font: Font::Regular,
                color: Rgb::MUTED,
                text: label,
            });
        }
    }
}
