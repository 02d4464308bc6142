//! Composition export.
//!
//! Turns a finished composition into a JPEG artifact on the CPU: the
//! background is resized onto a canvas matching the surface boundary,
//! captions are drawn centered on their anchors in white with a black
//! outline, and the result is JPEG-encoded. The `Rasterize` trait is the
//! seam tests use to swap the real rasterizer for a stub.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage, Rgba, RgbaImage, imageops};
use imageproc::drawing::{draw_text_mut, text_size};

use crate::error::ErrorCode;

/// Artifact filename used when the caller does not pass one.
pub const DEFAULT_ARTIFACT_NAME: &str = "my-new-meme.jpeg";

/// Default JPEG quality, on the encoder's 1-100 scale.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Canvas fill behind the background image, and the full frame when no
/// background is selected.
const CANVAS_FILL: Rgba<u8> = Rgba([24, 24, 27, 255]);

const TEXT_FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);
const TEXT_OUTLINE: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// System font paths probed in order when no explicit font is configured.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
];

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// No usable caption font was found on this system.
    #[error("no caption font found; set MEMESTUDIO_FONT or install the DejaVu or Liberation fonts")]
    FontUnavailable,

    /// The configured font file could not be read.
    #[error("font read failed: {path}: {source}")]
    FontRead { path: PathBuf, source: std::io::Error },

    /// The configured font file is not a parseable TTF/OTF.
    #[error("not a usable TTF/OTF font: {path}")]
    FontInvalid { path: PathBuf },

    /// The fetched background bytes did not decode as an image.
    #[error("background decode failed: {0}")]
    BackgroundDecode(String),

    /// JPEG encoding failed.
    #[error("jpeg encode failed: {0}")]
    Encode(String),

    /// The artifact could not be written to disk.
    #[error("artifact write failed: {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
}

impl ErrorCode for ExportError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::FontUnavailable => "E_FONT_UNAVAILABLE",
            Self::FontRead { .. } => "E_FONT_READ",
            Self::FontInvalid { .. } => "E_FONT_INVALID",
            Self::BackgroundDecode(_) => "E_BACKGROUND_DECODE",
            Self::Encode(_) => "E_JPEG_ENCODE",
            Self::Write { .. } => "E_ARTIFACT_WRITE",
        }
    }
}

// =============================================================================
// FONTS
// =============================================================================

/// Load the caption font: the explicit override when given, otherwise the
/// first parseable candidate from well-known system locations.
///
/// # Errors
///
/// Returns an error when the override cannot be read or parsed, or when no
/// candidate font exists.
pub fn load_font(explicit: Option<&Path>) -> Result<FontVec, ExportError> {
    if let Some(path) = explicit {
        let bytes = std::fs::read(path)
            .map_err(|source| ExportError::FontRead { path: path.to_path_buf(), source })?;
        return FontVec::try_from_vec(bytes)
            .map_err(|_| ExportError::FontInvalid { path: path.to_path_buf() });
    }

    for candidate in FONT_CANDIDATES {
        let Ok(bytes) = std::fs::read(candidate) else {
            continue;
        };
        if let Ok(font) = FontVec::try_from_vec(bytes) {
            return Ok(font);
        }
    }

    Err(ExportError::FontUnavailable)
}

// =============================================================================
// SCENE
// =============================================================================

/// One caption prepared for rasterization: surface-space center anchor plus
/// the resolved font size in pixels.
#[derive(Debug, Clone)]
pub struct SceneCaption {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub px: f64,
}

/// Everything the rasterizer needs to draw one composition.
pub struct Scene {
    /// Decoded background, already fetched. `None` draws the plain canvas
    /// fill instead.
    pub background: Option<DynamicImage>,
    /// Canvas width in pixels, matching the surface boundary.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Captions in stacking order, bottom first.
    pub captions: Vec<SceneCaption>,
}

// =============================================================================
// RASTERIZER
// =============================================================================

/// Rasterization collaborator. Production draws on the CPU; tests substitute
/// a stub so studio flows run without fonts installed.
#[async_trait::async_trait]
pub trait Rasterize: Send + Sync {
    /// Render a scene to an encoded image payload.
    ///
    /// # Errors
    ///
    /// Returns an error when the scene cannot be drawn or encoded.
    async fn rasterize(&self, scene: &Scene) -> Result<Vec<u8>, ExportError>;
}

pub struct JpegRasterizer {
    font: FontVec,
    quality: u8,
}

impl JpegRasterizer {
    #[must_use]
    pub fn new(font: FontVec, quality: u8) -> Self {
        Self { font, quality: quality.clamp(1, 100) }
    }
}

#[async_trait::async_trait]
impl Rasterize for JpegRasterizer {
    async fn rasterize(&self, scene: &Scene) -> Result<Vec<u8>, ExportError> {
        let mut canvas = base_canvas(scene);
        for caption in &scene.captions {
            draw_caption(&mut canvas, &self.font, caption);
        }
        encode_jpeg(&canvas, self.quality)
    }
}

// =============================================================================
// DRAWING
// =============================================================================

/// Build the canvas for a scene: fill, then the background resized to cover
/// the full frame. Degenerate dimensions are clamped to one pixel.
fn base_canvas(scene: &Scene) -> RgbaImage {
    let width = scene.width.max(1);
    let height = scene.height.max(1);
    let mut canvas = RgbaImage::from_pixel(width, height, CANVAS_FILL);

    if let Some(background) = &scene.background {
        let resized = background.resize_exact(width, height, imageops::FilterType::Lanczos3);
        imageops::overlay(&mut canvas, &resized.to_rgba8(), 0, 0);
    }

    canvas
}

fn draw_caption(canvas: &mut RgbaImage, font: &FontVec, caption: &SceneCaption) {
    #[allow(clippy::cast_possible_truncation)]
    let scale = PxScale::from(caption.px as f32);
    let (text_width, text_height) = text_size(scale, font, &caption.text);
    #[allow(clippy::cast_possible_truncation)]
    let x = (caption.x - f64::from(text_width) / 2.0).round() as i32;
    #[allow(clippy::cast_possible_truncation)]
    let y = (caption.y - f64::from(text_height) / 2.0).round() as i32;

    // Outline first: the fill pass overwrites the center.
    let outline = outline_px(caption.px);
    for dx in -outline..=outline {
        for dy in -outline..=outline {
            if dx == 0 && dy == 0 {
                continue;
            }
            draw_text_mut(canvas, TEXT_OUTLINE, x + dx, y + dy, scale, font, &caption.text);
        }
    }
    draw_text_mut(canvas, TEXT_FILL, x, y, scale, font, &caption.text);
}

/// Outline thickness in pixels, stepped up for the larger tiers so the
/// lettering stays readable over busy backgrounds.
fn outline_px(px: f64) -> i32 {
    if px >= 72.0 {
        3
    } else if px >= 30.0 {
        2
    } else {
        1
    }
}

// =============================================================================
// ENCODING
// =============================================================================

fn encode_jpeg(canvas: &RgbaImage, quality: u8) -> Result<Vec<u8>, ExportError> {
    let rgb: RgbImage = canvas.convert();
    let mut bytes = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(Cursor::new(&mut bytes), quality);
    encoder
        .encode_image(&rgb)
        .map_err(|e| ExportError::Encode(e.to_string()))?;
    Ok(bytes)
}

/// Decode fetched background bytes into an image.
///
/// # Errors
///
/// Returns an error when the bytes are not a decodable image format.
pub fn decode_background(bytes: &[u8]) -> Result<DynamicImage, ExportError> {
    image::load_from_memory(bytes).map_err(|e| ExportError::BackgroundDecode(e.to_string()))
}

// =============================================================================
// ARTIFACTS
// =============================================================================

/// Render an encoded JPEG payload as a data URL, the form handed to hosts
/// that embed the artifact instead of saving it.
#[must_use]
pub fn data_url(bytes: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", STANDARD.encode(bytes))
}

/// Write the encoded payload to disk, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error when the directories or the file cannot be written.
pub fn write_artifact(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|source| ExportError::Write { path: path.to_path_buf(), source })?;
        }
    }
    std::fs::write(path, bytes)
        .map_err(|source| ExportError::Write { path: path.to_path_buf(), source })
}

#[cfg(test)]
#[path = "export_test.rs"]
mod tests;
