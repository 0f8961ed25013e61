//! Preparing captured diagrams for placement.

use image::{imageops::FilterType, DynamicImage, GenericImageView};

use crate::models::{ColorMode, Quality};

/// Luminance at or above this value becomes white in black-white mode.
pub const BLACK_WHITE_THRESHOLD: u8 = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb,
    Gray,
}

/// Decoded, color-transformed pixels ready for embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedImage {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub pixels: Vec<u8>,
}

impl ProcessedImage {
    /// width / height
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Result of preparing the capture for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureSlot {
    /// No capture was supplied for this record.
    Missing,
    /// A capture was supplied but could not be decoded.
    Failed,
    /// Index into the canvas image list.
    Ready(usize),
}

/// Decode a capture, bound its size by quality tier and apply the color mode.
pub fn process_capture(
    bytes: &[u8],
    mode: ColorMode,
    quality: Quality,
) -> Result<ProcessedImage, image::ImageError> {
    let decoded = image::load_from_memory(bytes)?;
    let bounded = match quality.max_image_edge() {
        Some(edge) if decoded.width() > edge || decoded.height() > edge => {
            decoded.resize(edge, edge, FilterType::Triangle)
        }
        _ => decoded,
    };
    Ok(apply_color_mode(&bounded, mode))
}

pub fn apply_color_mode(img: &DynamicImage, mode: ColorMode) -> ProcessedImage {
    let (width, height) = img.dimensions();
    match mode {
        ColorMode::Color => ProcessedImage {
            width,
            height,
            format: PixelFormat::Rgb,
            pixels: img.to_rgb8().into_raw(),
        },
        ColorMode::Grayscale => ProcessedImage {
            width,
            height,
            format: PixelFormat::Gray,
            pixels: img.to_luma8().into_raw(),
        },
        ColorMode::BlackWhite => ProcessedImage {
            width,
            height,
            format: PixelFormat::Gray,
            pixels: img
                .to_luma8()
                .into_raw()
                .into_iter()
                .map(|l| if l >= BLACK_WHITE_THRESHOLD { 255 } else { 0 })
                .collect(),
        },
    }
}
