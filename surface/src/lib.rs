//! Composition engine for the meme studio.
//!
//! This crate owns the full state of one meme composition: the selected
//! background, the caption set, and the pointer gesture that drags captions
//! around the surface. It is pure logic with no I/O, so the whole state
//! machine can be driven and asserted from tests. The host layer (the CLI
//! binary, or any future shell) is responsible for feeding pointer events and
//! template picks in and for processing the resulting [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and the testable [`engine::SurfaceCore`] |
//! | [`caption`] | Caption records, size tiers, backgrounds, and the store |
//! | [`geom`] | Surface points, the clamp boundary, and background fitting |
//! | [`input`] | Pointer event types and the drag state machine |
//! | [`hit`] | Hit-testing pointer positions against captions |
//! | [`consts`] | Shared numeric constants (surface size, glyph metrics) |

pub mod caption;
pub mod consts;
pub mod engine;
pub mod geom;
pub mod hit;
pub mod input;
