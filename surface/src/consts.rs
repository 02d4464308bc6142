//! Shared numeric constants for the surface crate.

// ── Surface geometry ────────────────────────────────────────────

/// Longest edge of the composition surface in pixels. Backgrounds larger than
/// this are scaled down (aspect preserved) so the drag space and the export
/// canvas stay bounded.
pub const MAX_SURFACE_EDGE: f64 = 1024.0;

/// Boundary width before any background is selected.
pub const DEFAULT_BOUNDARY_WIDTH: f64 = 800.0;

/// Boundary height before any background is selected.
pub const DEFAULT_BOUNDARY_HEIGHT: f64 = 600.0;

// ── Caption metrics ─────────────────────────────────────────────

/// Approximate advance width of one caption glyph as a fraction of the font
/// size. Used for hit-box estimation only; export measures real glyphs.
pub const GLYPH_WIDTH_RATIO: f64 = 0.6;

/// Caption line height as a fraction of the font size.
pub const LINE_HEIGHT_RATIO: f64 = 1.2;

/// Minimum half-extent of a caption's hit box in pixels, so one-character
/// captions at a small tier stay grabbable.
pub const MIN_HIT_HALF_EXTENT: f64 = 12.0;
