//! Composition model: captions, size tiers, backgrounds, and the in-memory
//! caption store.
//!
//! This module defines the data types that describe what is on the surface
//! (`Caption`, `SizeTier`, `Background`) and the runtime store that owns all
//! live captions (`CaptionStore`). Data flows into this layer from the studio
//! session (submissions, template picks) and from the input engine (drag
//! mutations). The exporter reads the store in stacking order to determine
//! draw order.

#[cfg(test)]
#[path = "caption_test.rs"]
mod caption_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geom::Point;

/// Unique identifier for a caption.
pub type CaptionId = Uuid;

/// Caption text size, one of the seven steps of the studio's size menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeTier {
    /// Fine print.
    Tiny,
    /// Body text.
    Small,
    /// The starting tier for new compositions.
    #[default]
    Regular,
    /// Subheading size.
    Large,
    /// Headline size.
    Big,
    /// Poster size.
    Huge,
    /// Full-width impact text.
    Giant,
}

impl SizeTier {
    /// Font height in pixels for this tier, shared by hit-testing and export.
    #[must_use]
    pub fn font_px(self) -> f64 {
        match self {
            Self::Tiny => 12.0,
            Self::Small => 16.0,
            Self::Regular => 20.0,
            Self::Large => 30.0,
            Self::Big => 48.0,
            Self::Huge => 72.0,
            Self::Giant => 128.0,
        }
    }

    /// All tiers from smallest to largest.
    #[must_use]
    pub fn all() -> [Self; 7] {
        [Self::Tiny, Self::Small, Self::Regular, Self::Large, Self::Big, Self::Huge, Self::Giant]
    }

    /// Lowercase name as used on the wire and on the command line.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Tiny => "tiny",
            Self::Small => "small",
            Self::Regular => "regular",
            Self::Large => "large",
            Self::Big => "big",
            Self::Huge => "huge",
            Self::Giant => "giant",
        }
    }
}

impl std::str::FromStr for SizeTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tiny" => Ok(Self::Tiny),
            "small" => Ok(Self::Small),
            "regular" => Ok(Self::Regular),
            "large" => Ok(Self::Large),
            "big" => Ok(Self::Big),
            "huge" => Ok(Self::Huge),
            "giant" => Ok(Self::Giant),
            other => Err(format!("unknown size tier: {other}")),
        }
    }
}

/// A single text overlay as stored in the composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caption {
    /// Unique identifier for this caption. Identity lives here, never in the
    /// text: two captions with equal text are still two captions.
    pub id: CaptionId,
    /// The caption text as submitted.
    pub text: String,
    /// Center of the caption in surface coordinates.
    pub position: Point,
    /// Text size tier, frozen at creation unless bulk-restyled.
    pub tier: SizeTier,
}

/// The background template currently applied to the surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Background {
    /// Catalog id of the template.
    pub template_id: String,
    /// Human-readable template name.
    pub name: String,
    /// Source URL for the template image.
    pub url: String,
    /// Native image width in pixels.
    pub width: u32,
    /// Native image height in pixels.
    pub height: u32,
}

/// In-memory store of captions.
///
/// Insertion order is stacking order: later captions sit above earlier ones
/// and win hit-testing ties. A caption keeps its slot for its whole lifetime,
/// dragging included.
pub struct CaptionStore {
    captions: Vec<Caption>,
}

impl CaptionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { captions: Vec::new() }
    }

    /// Append a caption on top of the stack.
    pub fn push(&mut self, caption: Caption) {
        self.captions.push(caption);
    }

    /// Remove a caption by id, returning it if it was present.
    pub fn remove(&mut self, id: &CaptionId) -> Option<Caption> {
        let idx = self.captions.iter().position(|c| c.id == *id)?;
        Some(self.captions.remove(idx))
    }

    /// Return a reference to a caption by id.
    #[must_use]
    pub fn get(&self, id: &CaptionId) -> Option<&Caption> {
        self.captions.iter().find(|c| c.id == *id)
    }

    /// Return a mutable reference to a caption by id.
    pub fn get_mut(&mut self, id: &CaptionId) -> Option<&mut Caption> {
        self.captions.iter_mut().find(|c| c.id == *id)
    }

    /// Iterate captions in stacking order (bottom first).
    pub fn iter(&self) -> std::slice::Iter<'_, Caption> {
        self.captions.iter()
    }

    /// Iterate captions mutably in stacking order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Caption> {
        self.captions.iter_mut()
    }

    /// All captions in stacking order as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Caption] {
        &self.captions
    }

    /// Number of captions currently in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.captions.len()
    }

    /// Returns `true` if the store contains no captions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.captions.is_empty()
    }
}

impl Default for CaptionStore {
    fn default() -> Self {
        Self::new()
    }
}
