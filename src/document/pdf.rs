//! Serialises a [`Canvas`] to PDF 1.4.
//!
//! Object layout: 1 catalog, 2 page tree, 3 and 4 the Helvetica fonts,
//! 5 the info dictionary, then one XObject per image, then a page object and
//! its content stream for every page.

use std::io::Write;

use chrono::{DateTime, Utc};
use flate2::{write::ZlibEncoder, Compression};

use super::canvas::{text_width, Canvas, Element, Font, Rgb};
use super::cursor::MM_TO_PT;
use super::imaging::{PixelFormat, BLACK_WHITE_THRESHOLD};
use crate::{models::ColorMode, Result};

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const FONT_REGULAR_ID: usize = 3;
const FONT_BOLD_ID: usize = 4;
const INFO_ID: usize = 5;
const FIRST_IMAGE_ID: usize = 6;

/// Metadata written to the info dictionary.
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    pub title: String,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub created: DateTime<Utc>,
    /// Vector colors follow the same mode the captures were converted with.
    pub color_mode: ColorMode,
}

struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    fn begin(&mut self, id: usize) -> Result<()> {
        if self.offsets.len() < id {
            self.offsets.resize(id, 0);
        }
        self.offsets[id - 1] = self.buf.len();
        writeln!(self.buf, "{} 0 obj", id)?;
        Ok(())
    }

    fn object(&mut self, id: usize, body: &[u8]) -> Result<()> {
        self.begin(id)?;
        self.buf.extend_from_slice(body);
        self.buf.extend_from_slice(b"\nendobj\n");
        Ok(())
    }

    /// Flate-compressed stream object. `dict` holds extra dictionary entries.
    fn stream(&mut self, id: usize, dict: &str, data: &[u8]) -> Result<()> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data)?;
        let compressed = encoder.finish()?;

        self.begin(id)?;
        writeln!(
            self.buf,
            "<< {} /Filter /FlateDecode /Length {} >>\nstream",
            dict,
            compressed.len()
        )?;
        self.buf.extend_from_slice(&compressed);
        self.buf.extend_from_slice(b"\nendstream\nendobj\n");
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<u8>> {
        let xref_offset = self.buf.len();
        writeln!(self.buf, "xref\n0 {}\n0000000000 65535 f ", self.offsets.len() + 1)?;
        for offset in &self.offsets {
            writeln!(self.buf, "{:010} 00000 n ", offset)?;
        }
        writeln!(
            self.buf,
            "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF",
            self.offsets.len() + 1,
            CATALOG_ID,
            INFO_ID,
            xref_offset
        )?;
        Ok(self.buf)
    }
}

/// Render the canvas into PDF bytes.
pub fn write_pdf(canvas: &Canvas, info: &DocumentInfo) -> Result<Vec<u8>> {
    let mut pdf = PdfWriter::new();
    let page_count = canvas.pages.len();
    let first_page_id = FIRST_IMAGE_ID + canvas.images.len();
    let page_id = |i: usize| first_page_id + i * 2;

    pdf.object(CATALOG_ID, format!("<< /Type /Catalog /Pages {} 0 R >>", PAGES_ID).as_bytes())?;

    let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", page_id(i))).collect();
    pdf.object(
        PAGES_ID,
        format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), page_count).as_bytes(),
    )?;

    for (id, name) in [(FONT_REGULAR_ID, "Helvetica"), (FONT_BOLD_ID, "Helvetica-Bold")] {
        pdf.object(
            id,
            format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                name
            )
            .as_bytes(),
        )?;
    }

    let mut info_dict = Vec::new();
    info_dict.extend_from_slice(b"<< /Title ");
    info_dict.extend_from_slice(&pdf_string(&info.title));
    if let Some(author) = &info.author {
        info_dict.extend_from_slice(b" /Author ");
        info_dict.extend_from_slice(&pdf_string(author));
    }
    if let Some(subject) = &info.subject {
        info_dict.extend_from_slice(b" /Subject ");
        info_dict.extend_from_slice(&pdf_string(subject));
    }
    info_dict.extend_from_slice(b" /Creator ");
    let creator = concat!("playbook-export ", env!("CARGO_PKG_VERSION"));
    info_dict.extend_from_slice(&pdf_string(creator));
    write!(
        info_dict,
        " /CreationDate (D:{}Z) >>",
        info.created.format("%Y%m%d%H%M%S")
    )?;
    pdf.object(INFO_ID, &info_dict)?;

    for (i, image) in canvas.images.iter().enumerate() {
        let color_space = match image.format {
            PixelFormat::Rgb => "/DeviceRGB",
            PixelFormat::Gray => "/DeviceGray",
        };
        let dict = format!(
            "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace {} /BitsPerComponent 8",
            image.width, image.height, color_space
        );
        pdf.stream(FIRST_IMAGE_ID + i, &dict, &image.pixels)?;
    }

    let width_pt = canvas.geometry.width * MM_TO_PT;
    let height_pt = canvas.geometry.height * MM_TO_PT;
    let xobjects: Vec<String> = (0..canvas.images.len())
        .map(|i| format!("/Im{} {} 0 R", i, FIRST_IMAGE_ID + i))
        .collect();

    for (i, page) in canvas.pages.iter().enumerate() {
        let content_id = page_id(i) + 1;
        pdf.object(
            page_id(i),
            format!(
                "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {:.2} {:.2}] /Resources << /Font << /F1 {} 0 R /F2 {} 0 R >> /XObject << {} >> >> /Contents {} 0 R >>",
                PAGES_ID,
                width_pt,
                height_pt,
                FONT_REGULAR_ID,
                FONT_BOLD_ID,
                xobjects.join(" "),
                content_id
            )
            .as_bytes(),
        )?;

        let geometry = canvas.geometry;
        let mut ops = ContentStream::new(geometry.width, geometry.height, info.color_mode);
        for element in &page.elements {
            ops.element(element)?;
        }
        pdf.stream(content_id, "", &ops.buf)?;
    }

    pdf.finish()
}

/// Content stream builder working in page millimetres.
struct ContentStream {
    buf: Vec<u8>,
    width: f32,
    height: f32,
    mode: ColorMode,
}

impl ContentStream {
    fn new(width: f32, height: f32, mode: ColorMode) -> Self {
        Self {
            buf: Vec::new(),
            width,
            height,
            mode,
        }
    }

    fn x(&self, mm: f32) -> f32 {
        mm * MM_TO_PT
    }

    /// PDF origin is bottom-left.
    fn y(&self, mm: f32) -> f32 {
        (self.height - mm) * MM_TO_PT
    }

    fn fill_color(&mut self, color: Rgb) -> Result<()> {
        let Rgb(r, g, b) = shade(color, self.mode, false);
        writeln!(self.buf, "{:.3} {:.3} {:.3} rg", r, g, b)?;
        Ok(())
    }

    fn stroke_color(&mut self, color: Rgb) -> Result<()> {
        let Rgb(r, g, b) = shade(color, self.mode, true);
        writeln!(self.buf, "{:.3} {:.3} {:.3} RG", r, g, b)?;
        Ok(())
    }

    fn element(&mut self, element: &Element) -> Result<()> {
        match element {
            Element::Text {
                x,
                y,
                size,
                font,
                color,
                text,
            } => {
                self.fill_color(*color)?;
                let font = match font {
                    Font::Regular => "F1",
                    Font::Bold => "F2",
                };
                write!(
                    self.buf,
                    "BT /{} {:.1} Tf {:.2} {:.2} Td ",
                    font,
                    size,
                    self.x(*x),
                    self.y(*y)
                )?;
                self.buf.extend_from_slice(&pdf_string(text));
                self.buf.extend_from_slice(b" Tj ET\n");
            }
            Element::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                color,
            } => {
                self.stroke_color(*color)?;
                writeln!(
                    self.buf,
                    "{:.2} w {:.2} {:.2} m {:.2} {:.2} l S",
                    width * MM_TO_PT,
                    self.x(*x1),
                    self.y(*y1),
                    self.x(*x2),
                    self.y(*y2)
                )?;
            }
            Element::Rect {
                x,
                y,
                w,
                h,
                fill,
                stroke,
            } => {
                let op = match (fill, stroke) {
                    (Some(_), Some(_)) => "B",
                    (Some(_), None) => "f",
                    (None, Some(_)) => "S",
                    (None, None) => return Ok(()),
                };
                if let Some(fill) = fill {
                    self.fill_color(*fill)?;
                }
                if let Some(stroke) = stroke {
                    self.stroke_color(*stroke)?;
                    self.buf.extend_from_slice(b"0.5 w\n");
                }
                writeln!(
                    self.buf,
                    "{:.2} {:.2} {:.2} {:.2} re {}",
                    self.x(*x),
                    self.y(y + h),
                    w * MM_TO_PT,
                    h * MM_TO_PT,
                    op
                )?;
            }
            Element::Image { x, y, w, h, image } => {
                writeln!(
                    self.buf,
                    "q {:.2} 0 0 {:.2} {:.2} {:.2} cm /Im{} Do Q",
                    w * MM_TO_PT,
                    h * MM_TO_PT,
                    self.x(*x),
                    self.y(y + h),
                    image
                )?;
            }
            Element::Watermark { text, size } => {
                let (cos, sin) = (std::f32::consts::FRAC_1_SQRT_2, std::f32::consts::FRAC_1_SQRT_2);
                let half = text_width(text, *size) * MM_TO_PT / 2.0;
                let cx = self.width * MM_TO_PT / 2.0;
                let cy = self.height * MM_TO_PT / 2.0;
                self.buf.extend_from_slice(b"q\n");
                self.fill_color(Rgb::WATERMARK)?;
                write!(
                    self.buf,
                    "BT /F2 {:.1} Tf {:.4} {:.4} {:.4} {:.4} {:.2} {:.2} Tm ",
                    size,
                    cos,
                    sin,
                    -sin,
                    cos,
                    cx - half * cos,
                    cy - half * sin
                )?;
                self.buf.extend_from_slice(&pdf_string(text));
                self.buf.extend_from_slice(b" Tj ET Q\n");
            }
        }
        Ok(())
    }
}

fn luminance(Rgb(r, g, b): Rgb) -> f32 {
    0.299 * r + 0.587 * g + 0.114 * b
}

/// Map a color through the document color mode.
///
/// In black-white mode strokes never vanish: anything not pure white is black.
fn shade(color: Rgb, mode: ColorMode, stroke: bool) -> Rgb {
    match mode {
        ColorMode::Color => color,
        ColorMode::Grayscale => {
            let l = luminance(color);
            Rgb(l, l, l)
        }
        ColorMode::BlackWhite => {
            let l = luminance(color);
            let white = if stroke {
                l >= 0.999
            } else {
                l * 255.0 >= BLACK_WHITE_THRESHOLD as f32
            };
            if white {
                Rgb::WHITE
            } else {
                Rgb::BLACK
            }
        }
    }
}

/// Encode text as a PDF literal string in WinAnsiEncoding.
///
/// Characters outside the encoding become `?`.
pub fn pdf_string(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + 2);
    out.push(b'(');
    for ch in text.chars() {
        let byte = match ch {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                ch as u8
            }
            ' '..='~' => ch as u8,
            '\u{a0}'..='\u{ff}' => ch as u32 as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        };
        if byte >= 0x80 {
            out.extend_from_slice(format!("\\{:03o}", byte).as_bytes());
        } else {
            out.push(byte);
        }
    }
    out.push(b')');
    out
}
