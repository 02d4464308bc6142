use rand::Rng;
use uuid::Uuid;

use crate::caption::{Background, Caption, CaptionId, CaptionStore, SizeTier};
use crate::geom::{Boundary, Point};
use crate::hit;
use crate::input::{Button, InputState};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone)]
pub enum Action {
    /// A drag gesture grabbed the caption with this id.
    DragStarted { id: CaptionId },
    /// A caption moved to a new (already clamped) position.
    CaptionMoved { id: CaptionId, position: Point },
    /// A caption was removed from the composition.
    CaptionDeleted { id: CaptionId },
    /// The host should redraw its view of the surface.
    RenderNeeded,
}

/// Core composition state: the caption set, the selected background, the
/// drag boundary, and the pointer gesture in flight.
///
/// No I/O happens here. Hosts feed pointer events and template picks in and
/// process the returned [`Action`]s; positions only ever change through the
/// pointer path or boundary re-clamps, so every caption is inside the
/// boundary at all times.
pub struct SurfaceCore {
    pub captions: CaptionStore,
    pub background: Option<Background>,
    pub boundary: Boundary,
    pub default_tier: SizeTier,
    pub input: InputState,
}

impl Default for SurfaceCore {
    fn default() -> Self {
        Self {
            captions: CaptionStore::new(),
            background: None,
            boundary: Boundary::default(),
            default_tier: SizeTier::default(),
            input: InputState::Idle,
        }
    }
}

impl SurfaceCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Captions ---

    /// Add a caption at the boundary center using the current default tier.
    ///
    /// Empty and whitespace-only text is ignored and `None` is returned.
    /// Duplicate texts are allowed; every submission gets a fresh id.
    pub fn submit_caption(&mut self, text: &str) -> Option<CaptionId> {
        if text.trim().is_empty() {
            return None;
        }
        let caption = Caption {
            id: Uuid::new_v4(),
            text: text.to_owned(),
            position: self.boundary.center(),
            tier: self.default_tier,
        };
        let id = caption.id;
        self.captions.push(caption);
        Some(id)
    }

    /// Remove a caption by id. Returns `false` (and changes nothing) when the
    /// id is unknown, so repeated deletes are harmless. Dropping the caption
    /// under an active drag also drops the gesture.
    pub fn delete_caption(&mut self, id: &CaptionId) -> bool {
        let removed = self.captions.remove(id).is_some();
        if removed && self.dragging_id() == Some(*id) {
            self.input = InputState::Idle;
        }
        removed
    }

    // --- Background ---

    /// Apply a background and re-fit the boundary to its dimensions.
    ///
    /// Existing captions are clamped into the new boundary so none is left
    /// stranded outside the image. An active drag survives; its caption
    /// clamps against the new boundary like any other.
    pub fn select_background(&mut self, background: Background) {
        self.boundary = Boundary::fit(background.width, background.height);
        self.background = Some(background);
        self.clamp_all();
    }

    /// Choose a random catalog index among `catalog_len` entries, never
    /// repeating `current` when at least two entries exist.
    ///
    /// Returns `None` for an empty catalog, and for a one-entry catalog whose
    /// only entry is already selected. Drawing from `len - 1` and shifting
    /// past `current` keeps the pick uniform without a rejection loop. The
    /// rng is injected so hosts and tests control determinism.
    pub fn pick_random_index(
        catalog_len: usize,
        current: Option<usize>,
        rng: &mut impl Rng,
    ) -> Option<usize> {
        match current {
            Some(cur) if cur < catalog_len => {
                if catalog_len <= 1 {
                    return None;
                }
                let mut idx = rng.random_range(0..catalog_len - 1);
                if idx >= cur {
                    idx += 1;
                }
                Some(idx)
            }
            _ => {
                if catalog_len == 0 {
                    return None;
                }
                Some(rng.random_range(0..catalog_len))
            }
        }
    }

    // --- Size tiers ---

    /// Set the tier used for captions submitted from now on. Existing
    /// captions keep theirs.
    pub fn set_default_size_tier(&mut self, tier: SizeTier) {
        self.default_tier = tier;
    }

    /// Restyle every existing caption to `tier` and make it the default.
    /// Returns the number of captions whose tier actually changed.
    pub fn apply_size_tier_to_all(&mut self, tier: SizeTier) -> usize {
        self.default_tier = tier;
        let mut touched = 0;
        for caption in self.captions.iter_mut() {
            if caption.tier != tier {
                caption.tier = tier;
                touched += 1;
            }
        }
        touched
    }

    // --- Boundary ---

    /// Replace the boundary (host-driven layout change) and clamp every
    /// caption into it.
    pub fn set_boundary(&mut self, boundary: Boundary) {
        self.boundary = boundary;
        self.clamp_all();
    }

    fn clamp_all(&mut self) {
        let boundary = self.boundary;
        for caption in self.captions.iter_mut() {
            caption.position = boundary.clamp(caption.position);
        }
    }

    // --- Pointer input ---

    /// Begin a drag if a caption sits under the pointer.
    ///
    /// Only the primary button starts a gesture, and only from `Idle`.
    /// Pointer-down on the bare background is a no-op; backgrounds and new
    /// captions never arrive through the pointer path.
    pub fn on_pointer_down(&mut self, pt: Point, button: Button) -> Vec<Action> {
        if button != Button::Primary || self.input.is_dragging() {
            return Vec::new();
        }
        let Some(id) = hit::hit_test(pt, &self.captions) else {
            return Vec::new();
        };
        let Some(caption) = self.captions.get(&id) else {
            return Vec::new();
        };
        self.input = InputState::Dragging { id, start: pt, origin: caption.position };
        vec![Action::DragStarted { id }, Action::RenderNeeded]
    }

    /// Track a drag: the caption follows the pointer offset from the grab
    /// point, clamped into the boundary.
    ///
    /// The position is recomputed from the grab origin on every move, so a
    /// pointer that leaves the surface pins the caption to the edge and
    /// returning inside snaps it straight back under the pointer.
    pub fn on_pointer_move(&mut self, pt: Point) -> Vec<Action> {
        let (id, start, origin) = match self.input {
            InputState::Dragging { id, start, origin } => (id, start, origin),
            InputState::Idle => return Vec::new(),
        };
        let target = Point::new(origin.x + (pt.x - start.x), origin.y + (pt.y - start.y));
        let clamped = self.boundary.clamp(target);
        let Some(caption) = self.captions.get_mut(&id) else {
            self.input = InputState::Idle;
            return Vec::new();
        };
        if caption.position == clamped {
            return Vec::new();
        }
        caption.position = clamped;
        vec![Action::CaptionMoved { id, position: clamped }, Action::RenderNeeded]
    }

    /// End the active drag. The caption rests at its last clamped position;
    /// moves were already reported, so there is nothing left to emit.
    pub fn on_pointer_up(&mut self, _pt: Point, button: Button) -> Vec<Action> {
        if button == Button::Primary && self.input.is_dragging() {
            self.input = InputState::Idle;
        }
        Vec::new()
    }

    /// Abort the active gesture (pointer capture lost, window blur). The
    /// caption rests wherever the last move left it.
    pub fn on_pointer_cancel(&mut self) -> Vec<Action> {
        if self.input.is_dragging() {
            self.input = InputState::Idle;
        }
        Vec::new()
    }

    /// Delete the topmost caption under the pointer, if any.
    ///
    /// Removal is terminal: the id is gone from the store, and a second
    /// double-click at the same spot matches the next caption down or
    /// nothing. Deleting the caption under an active drag drops the gesture.
    pub fn on_double_click(&mut self, pt: Point) -> Vec<Action> {
        let Some(id) = hit::hit_test(pt, &self.captions) else {
            return Vec::new();
        };
        self.delete_caption(&id);
        vec![Action::CaptionDeleted { id }, Action::RenderNeeded]
    }

    // --- Queries ---

    /// All captions in stacking order (bottom first).
    #[must_use]
    pub fn captions(&self) -> &[Caption] {
        self.captions.as_slice()
    }

    /// Look up a caption by id.
    #[must_use]
    pub fn caption(&self, id: &CaptionId) -> Option<&Caption> {
        self.captions.get(id)
    }

    /// The selected background, if any.
    #[must_use]
    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    /// The current drag boundary.
    #[must_use]
    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// The tier applied to captions submitted from now on.
    #[must_use]
    pub fn default_tier(&self) -> SizeTier {
        self.default_tier
    }

    /// The caption currently being dragged, if a gesture is active.
    #[must_use]
    pub fn dragging_id(&self) -> Option<CaptionId> {
        match &self.input {
            InputState::Dragging { id, .. } => Some(*id),
            InputState::Idle => None,
        }
    }

    /// Number of captions in the composition.
    #[must_use]
    pub fn caption_count(&self) -> usize {
        self.captions.len()
    }

    /// Returns `true` if the composition has no captions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.captions.is_empty()
    }
}
