//! Unit tests for document layout and serialisation

use std::io::Cursor as IoCursor;

use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma, RgbImage};

use super::canvas::Element;
use super::imaging::{apply_color_mode, PixelFormat};
use super::pdf::pdf_string;
use super::*;
use crate::{
    fixtures::{at, full_set, play, scenario_b},
    job::plan_stages,
    models::{Category, ColorMode, CustomSection, Quality, ReportConfig, SectionPlacement},
};

fn render(
    config: &ReportConfig,
    plays: Vec<Play>,
    captures: Vec<Option<Vec<u8>>>,
) -> DocumentEngine<'_> {
    let stages = plan_stages(config, plays.len());
    let mut engine = DocumentEngine::new(config, plays, captures, at(2025, 3, 1));
    for stage in stages {
        engine.run_stage(stage).unwrap();
    }
    engine
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, image::Rgb([200, 40, 40]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut IoCursor::new(&mut buf), ImageOutputFormat::Png)
        .unwrap();
    buf
}

fn texts(page: &canvas::Page) -> Vec<&str> {
    page.elements
        .iter()
        .filter_map(|e| match e {
            Element::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

fn many_plays(n: usize) -> Vec<Play> {
    (0..n)
        .map(|i| {
            let category = if i % 3 == 0 { Category::Defensive } else { Category::Offensive };
            play(&format!("p{}", i), &format!("Play {:02}", i), category, Some(50.0))
        })
        .collect()
}

fn section(title: &str, placement: SectionPlacement) -> CustomSection {
    CustomSection {
        title: title.to_string(),
        body: "Hold the shape.\n\nCommunicate early.".to_string(),
        placement,
    }
}

#[test]
fn test_contents_page_numbers_match_rendered_pages() {
    let mut config = ReportConfig::default();
    config.content.include_index = true;
    config.custom_sections = vec![
        section("Principles", SectionPlacement::BeforeRecords),
        section("Glossary", SectionPlacement::Appendix),
        section("Set-up", SectionPlacement::BeforeRecords),
    ];
    let plays = many_plays(40);
    let n = plays.len();
    let engine = render(&config, plays, Vec::new());

    assert_eq!(toc_page_count(&config, n), 2);
    let starts = engine.canvas().record_start_pages();
    assert_eq!(starts.len(), n);
    for (index, page) in starts {
        assert_eq!(page, record_page_number(&config, n, index), "play {}", index);
    }
    let contents = engine
        .canvas()
        .pages
        .iter()
        .filter(|p| p.kind == PageKind::Contents)
        .count();
    assert_eq!(contents, 2);
}

#[test]
fn test_index_entries_print_record_start_pages() {
    let mut config = ReportConfig::default();
    config.content.include_index = true;
    config.custom_sections = vec![
        section("Principles", SectionPlacement::BeforeRecords),
        section("Set-up", SectionPlacement::BeforeRecords),
    ];
    let mut plays = many_plays(6);
    plays[1].tags = vec!["press".to_string()];
    plays[4].tags = vec!["press".to_string()];
    let n = plays.len();
    let names: Vec<String> = plays
        .iter()
        .map(|p| format!("{} ({})", p.name, p.category.label()))
        .collect();
    let engine = render(&config, plays, Vec::new());
    let doc = engine.canvas();

    let index_pages: Vec<&canvas::Page> = doc
        .pages
        .iter()
        .filter(|p| p.kind == PageKind::Index)
        .collect();
    assert_eq!(index_pages.len(), 1);
    let t = texts(index_pages[0]);

    let starts = doc.record_start_pages();
    for (i, name) in names.iter().enumerate() {
        let pos = t.iter().position(|text| text == name).expect("index entry");
        let expected = record_page_number(&config, n, i);
        assert_eq!(t[pos + 1], expected.to_string(), "play {}", i);
        assert!(starts.contains(&(i, expected)));
    }

    let press = format!(
        "press: {}, {}",
        record_page_number(&config, n, 1),
        record_page_number(&config, n, 4)
    );
    assert!(t.contains(&press.as_str()));
}

#[test]
fn test_contents_entries_print_analytic_page_numbers() {
    let config = ReportConfig::default();
    let engine = render(&config, scenario_b(), Vec::new());
    let contents = &engine.canvas().pages[1];
    assert_eq!(contents.kind, PageKind::Contents);
    let t = texts(contents);
    // cover + one contents page, so the first play starts on page 3
    assert!(t.contains(&"3"));
    assert!(t.contains(&"5"));
}

#[test]
fn test_single_record_without_cover_or_contents_starts_on_page_one() {
    let mut config = ReportConfig::default();
    config.content.include_cover_page = false;
    config.content.include_table_of_contents = false;
    let solo = play("1", "Solo", Category::Offensive, Some(70.0));
    let engine = render(&config, vec![solo], Vec::new());

    assert_eq!(record_page_number(&config, 1, 0), 1);
    assert_eq!(engine.canvas().record_start_pages(), vec![(0, 1)]);
    assert_eq!(engine.canvas().page_count(), 1);
}

#[test]
fn test_record_keeps_to_one_page_and_marks_clipping() {
    let mut config = ReportConfig::default();
    config.content.include_cover_page = false;
    config.content.include_table_of_contents = false;
    let mut long = play("1", "Long Play", Category::Offensive, Some(70.0));
    long.description = "Switch play quickly through the pivot. ".repeat(400);
    let next = play("2", "Next", Category::Offensive, None);
    let engine = render(&config, vec![long, next], Vec::new());

    let pages = &engine.canvas().pages;
    assert_eq!(pages.len(), 2);
    assert!(pages[0].clipped);
    assert!(texts(&pages[0]).contains(&"Content shortened to fit this page."));
    assert!(!pages[1].clipped);
    assert_eq!(pages[1].kind, PageKind::Record(1));
}

#[test]
fn test_failed_capture_degrades_to_placeholder() {
    let mut config = ReportConfig::default();
    config.content.include_cover_page = false;
    config.content.include_table_of_contents = false;
    let plays = scenario_b();
    let captures = vec![Some(b"not an image".to_vec()), Some(png(8, 4)), None];
    let engine = render(&config, plays, captures);

    let canvas = engine.canvas();
    assert_eq!(canvas.images.len(), 1);
    assert!(texts(&canvas.pages[0]).contains(&"Diagram unavailable"));
    assert!(canvas.pages[1]
        .elements
        .iter()
        .any(|e| matches!(e, Element::Image { image: 0, .. })));
    // no capture supplied, so no diagram block at all
    assert!(!texts(&canvas.pages[2]).contains(&"Diagram unavailable"));
}

#[test]
fn test_grayscale_mode_converts_captures() {
    let mut config = ReportConfig::default();
    config.color_mode = ColorMode::Grayscale;
    let engine = render(&config, scenario_b(), vec![Some(png(6, 6))]);
    let image = &engine.canvas().images[0];
    assert_eq!(image.format, PixelFormat::Gray);
    assert_eq!(image.pixels.len(), 36);
}

#[test]
fn test_black_white_threshold() {
    let img = GrayImage::from_fn(2, 1, |x, _| Luma([if x == 0 { 127 } else { 128 }]));
    let processed = apply_color_mode(&DynamicImage::ImageLuma8(img), ColorMode::BlackWhite);
    assert_eq!(processed.pixels, vec![0, 255]);
}

#[test]
fn test_quality_bounds_capture_size() {
    let processed = process_capture(&png(1000, 500), ColorMode::Color, Quality::Draft).unwrap();
    assert_eq!((processed.width, processed.height), (400, 200));
    assert_eq!(processed.pixels.len(), 400 * 200 * 3);

    let untouched = process_capture(&png(1000, 500), ColorMode::Color, Quality::Print).unwrap();
    assert_eq!(untouched.width, 1000);
}

#[test]
fn test_every_page_gets_footer_and_watermark() {
    let mut config = ReportConfig::default();
    config.watermark = Some("CONFIDENTIAL".to_string());
    config.content.include_analytics = true;
    let engine = render(&config, full_set(), Vec::new());

    let canvas = engine.canvas();
    let total = canvas.page_count();
    for page in &canvas.pages {
        assert!(matches!(
            &page.elements[0],
            Element::Watermark { text, .. } if text == "CONFIDENTIAL"
        ));
        let label = format!("Page {} of {}", page.number, total);
        assert!(texts(page).contains(&label.as_str()));
    }
}

#[test]
fn test_long_watermark_shrinks_to_fit() {
    let geometry = PageGeometry::new(210.0, 297.0);
    let (text, size) = layout::fit_watermark("CONFIDENTIAL", &geometry);
    assert_eq!(text, "CONFIDENTIAL");
    assert_eq!(size, layout::WATERMARK_FONT_SIZE);

    let medium = "DRAFT ".repeat(7);
    let (text, size) = layout::fit_watermark(&medium, &geometry);
    assert_eq!(text, medium);
    assert!(size < layout::WATERMARK_FONT_SIZE && size > layout::MIN_WATERMARK_FONT_SIZE);

    let mut config = ReportConfig::default();
    config.watermark = Some("W".repeat(200));
    let engine = render(&config, scenario_b(), Vec::new());
    match &engine.canvas().pages[0].elements[0] {
        Element::Watermark { text, size } => {
            assert_eq!(*size, layout::MIN_WATERMARK_FONT_SIZE);
            assert!(text.ends_with('…'));
            assert!(text.chars().count() < 200);
        }
        other => panic!("Expected watermark, got {:?}", other),
    }
}

#[test]
fn test_appendix_sections_are_lettered_after_records() {
    let mut config = ReportConfig::default();
    config.content.include_cover_page = false;
    config.content.include_table_of_contents = false;
    config.custom_sections = vec![
        section("Drills", SectionPlacement::Appendix),
        section("Review", SectionPlacement::AfterRecords),
        section("Glossary", SectionPlacement::Appendix),
    ];
    let engine = render(&config, scenario_b(), Vec::new());

    let titles: Vec<&str> = engine
        .canvas()
        .pages
        .iter()
        .filter(|p| p.kind == PageKind::Section)
        .flat_map(|p| texts(p).into_iter().take(1))
        .collect();
    assert_eq!(titles, vec!["Review", "Appendix A: Drills", "Appendix B: Glossary"]);
}

#[test]
fn test_empty_document_gets_notice_page() {
    let mut config = ReportConfig::default();
    config.content.include_cover_page = false;
    config.content.include_table_of_contents = false;
    let engine = render(&config, Vec::new(), Vec::new());
    assert_eq!(engine.canvas().page_count(), 1);
    assert!(texts(&engine.canvas().pages[0]).contains(&"No plays match the selected filters."));
}

#[test]
fn test_finished_pdf_structure() {
    let config = ReportConfig::default();
    let engine = render(&config, scenario_b(), Vec::new());
    let pages = engine.canvas().page_count();
    let artifact = Box::new(engine).finish().unwrap();

    assert_eq!(artifact.unit_count, pages);
    let text = String::from_utf8_lossy(&artifact.bytes);
    assert!(text.starts_with("%PDF-1.4"));
    assert!(text.trim_end().ends_with("%%EOF"));
    assert!(text.contains(&format!("/Count {}", pages)));
    assert!(text.contains("/BaseFont /Helvetica-Bold"));
}

#[test]
fn test_finish_before_finalize_fails() {
    let config = ReportConfig::default();
    let engine = DocumentEngine::new(&config, scenario_b(), Vec::new(), at(2025, 3, 1));
    assert!(Box::new(engine).finish().is_err());
}

#[test]
fn test_pdf_string_escaping() {
    assert_eq!(pdf_string("a(b)\\c"), b"(a\\(b\\)\\\\c)".to_vec());
    assert_eq!(pdf_string("• é"), b"(\\225 \\351)".to_vec());
    assert_eq!(pdf_string("日"), b"(?)".to_vec());
}
