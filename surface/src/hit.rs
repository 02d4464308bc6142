#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::caption::{Caption, CaptionId, CaptionStore};
use crate::consts::{GLYPH_WIDTH_RATIO, LINE_HEIGHT_RATIO, MIN_HIT_HALF_EXTENT};
use crate::geom::Point;

/// Estimated half-extents of a caption's hit box.
///
/// Derived from its text length and size tier; the position is the caption's
/// center anchor, so the box spans `position - extent ..= position + extent`
/// on each axis. This is an estimate for grabbing, not a glyph measurement;
/// export measures real glyphs.
#[must_use]
pub fn caption_half_extent(caption: &Caption) -> (f64, f64) {
    let px = caption.tier.font_px();
    #[allow(clippy::cast_precision_loss)]
    let glyphs = caption.text.chars().count() as f64;
    let half_w = (glyphs * px * GLYPH_WIDTH_RATIO / 2.0).max(MIN_HIT_HALF_EXTENT);
    let half_h = (px * LINE_HEIGHT_RATIO / 2.0).max(MIN_HIT_HALF_EXTENT);
    (half_w, half_h)
}

/// Whether `pt` falls inside a caption's estimated hit box.
#[must_use]
pub fn caption_contains(caption: &Caption, pt: Point) -> bool {
    let (half_w, half_h) = caption_half_extent(caption);
    (pt.x - caption.position.x).abs() <= half_w && (pt.y - caption.position.y).abs() <= half_h
}

/// Test which caption (if any) is under `pt`.
///
/// Captions later in the store sit above earlier ones, so the scan runs in
/// reverse insertion order and the topmost match wins.
#[must_use]
pub fn hit_test(pt: Point, store: &CaptionStore) -> Option<CaptionId> {
    store.iter().rev().find(|c| caption_contains(c, pt)).map(|c| c.id)
}
