//! Studio session: one composition plus its collaborators.
//!
//! Wires the pure composition surface to the template catalog and the
//! rasterizer. Caption placement goes through the surface's pointer
//! interface rather than poking positions directly, so placements obey the
//! same hit-testing and clamping rules as interactive drags.

use std::path::{Path, PathBuf};

use rand::Rng;
use surface::caption::{CaptionId, SizeTier};
use surface::engine::{Action, SurfaceCore};
use surface::geom::Point;
use surface::input::Button;

use crate::catalog::{CatalogClient, CatalogError, Template};
use crate::error::ErrorCode;
use crate::export::{self, ExportError, Rasterize, Scene, SceneCaption};

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// No templates are loaded; the catalog was empty or never fetched.
    #[error("no templates loaded")]
    NoTemplates,

    /// The requested template index is outside the catalog.
    #[error("template index {index} out of range (catalog has {len})")]
    BadTemplateIndex { index: usize, len: usize },

    /// The submitted caption text was empty or whitespace-only.
    #[error("caption text is empty")]
    EmptyCaption,

    /// The caption id is not part of this composition.
    #[error("unknown caption: {0}")]
    UnknownCaption(CaptionId),

    /// Another caption covers this one, so the pointer cannot grab it.
    #[error("caption {0} is covered by another caption")]
    CaptionObscured(CaptionId),

    /// A catalog call failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Rasterization or artifact output failed.
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl ErrorCode for StudioError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NoTemplates => "E_NO_TEMPLATES",
            Self::BadTemplateIndex { .. } => "E_BAD_TEMPLATE_INDEX",
            Self::EmptyCaption => "E_EMPTY_CAPTION",
            Self::UnknownCaption(_) => "E_UNKNOWN_CAPTION",
            Self::CaptionObscured(_) => "E_CAPTION_OBSCURED",
            Self::Catalog(e) => e.error_code(),
            Self::Export(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Catalog(e) => e.retryable(),
            _ => false,
        }
    }
}

/// Result of a successful export.
pub struct ExportReceipt {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

// =============================================================================
// STUDIO
// =============================================================================

pub struct Studio {
    surface: SurfaceCore,
    catalog: CatalogClient,
    templates: Vec<Template>,
}

impl Studio {
    #[must_use]
    pub fn new(catalog: CatalogClient) -> Self {
        Self { surface: SurfaceCore::new(), catalog, templates: Vec::new() }
    }

    /// Read-only view of the composition surface.
    #[must_use]
    pub fn surface(&self) -> &SurfaceCore {
        &self.surface
    }

    // --- Templates ---

    /// Fetch the template catalog. Failure is non-fatal: the studio keeps an
    /// empty catalog and selection operations report [`StudioError::NoTemplates`].
    pub async fn load_templates(&mut self) {
        match self.catalog.fetch_templates().await {
            Ok(templates) => {
                tracing::info!(count = templates.len(), "template catalog loaded");
                self.templates = templates;
            }
            Err(e) => {
                tracing::warn!(
                    code = e.error_code(),
                    retryable = e.retryable(),
                    error = %e,
                    "template catalog unavailable; composing without backgrounds"
                );
                self.templates = Vec::new();
            }
        }
    }

    /// Select a background by catalog index. The surface boundary re-fits to
    /// the template's dimensions and existing captions clamp into it.
    ///
    /// # Errors
    ///
    /// Returns an error when no templates are loaded or the index is out of
    /// range.
    pub fn select_template(&mut self, index: usize) -> Result<&Template, StudioError> {
        if self.templates.is_empty() {
            return Err(StudioError::NoTemplates);
        }
        let len = self.templates.len();
        let Some(template) = self.templates.get(index) else {
            return Err(StudioError::BadTemplateIndex { index, len });
        };
        let background = template.to_background();
        tracing::debug!(template = %background.name, "background selected");
        self.surface.select_background(background);
        Ok(&self.templates[index])
    }

    /// Select a random background, never re-picking the current one when the
    /// catalog has alternatives. With a single-template catalog already on
    /// the surface, the selection stays put.
    ///
    /// # Errors
    ///
    /// Returns an error when no templates are loaded.
    pub fn select_random_template(&mut self, rng: &mut impl Rng) -> Result<&Template, StudioError> {
        if self.templates.is_empty() {
            return Err(StudioError::NoTemplates);
        }
        let current = self.current_template_index();
        match SurfaceCore::pick_random_index(self.templates.len(), current, rng) {
            Some(index) => self.select_template(index),
            // Only one template, and it is already on the surface.
            None => Ok(&self.templates[current.unwrap_or(0)]),
        }
    }

    fn current_template_index(&self) -> Option<usize> {
        let background = self.surface.background()?;
        self.templates.iter().position(|t| t.id == background.template_id)
    }

    // --- Captions ---

    /// Submit a caption; it lands centered on the surface at the default tier.
    ///
    /// # Errors
    ///
    /// Returns an error when the text is empty or whitespace-only.
    pub fn add_caption(&mut self, text: &str) -> Result<CaptionId, StudioError> {
        self.surface.submit_caption(text).ok_or(StudioError::EmptyCaption)
    }

    /// Tier applied to captions submitted from now on.
    pub fn set_size_tier(&mut self, tier: SizeTier) {
        self.surface.set_default_size_tier(tier);
    }

    /// Drag a caption to `target` through the pointer interface: grab it at
    /// its current position, move, release. Returns the clamped resting
    /// position, which differs from `target` when `target` lies outside the
    /// boundary.
    ///
    /// # Errors
    ///
    /// Returns an error when the id is unknown, or when another caption
    /// covers this one and would be grabbed instead.
    pub fn place_caption(&mut self, id: &CaptionId, target: Point) -> Result<Point, StudioError> {
        let at = self
            .surface
            .caption(id)
            .ok_or(StudioError::UnknownCaption(*id))?
            .position;

        let actions = self.surface.on_pointer_down(at, Button::Primary);
        let grabbed = actions
            .iter()
            .any(|a| matches!(a, Action::DragStarted { id: grabbed } if grabbed == id));
        if !grabbed {
            // The pointer landed on whatever sits on top at this spot; back
            // out of that gesture instead of moving the wrong caption.
            self.surface.on_pointer_cancel();
            return Err(StudioError::CaptionObscured(*id));
        }

        self.surface.on_pointer_move(target);
        self.surface.on_pointer_up(target, Button::Primary);

        let rest = self
            .surface
            .caption(id)
            .ok_or(StudioError::UnknownCaption(*id))?
            .position;
        tracing::debug!(caption = %id, x = rest.x, y = rest.y, "caption placed");
        Ok(rest)
    }

    // --- Export ---

    /// Compose the current surface into a JPEG artifact at `out`.
    ///
    /// Fetches the background image when one is selected, hands the scene to
    /// the rasterizer, and writes the payload to disk.
    ///
    /// # Errors
    ///
    /// Returns an error when the background fetch, rasterization, or the
    /// file write fails.
    pub async fn export(
        &self,
        rasterizer: &dyn Rasterize,
        out: &Path,
    ) -> Result<ExportReceipt, StudioError> {
        let scene = self.assemble_scene().await?;
        let bytes = rasterizer.rasterize(&scene).await?;
        export::write_artifact(out, &bytes)?;
        tracing::info!(path = %out.display(), bytes = bytes.len(), "artifact written");
        Ok(ExportReceipt {
            path: out.to_path_buf(),
            width: scene.width,
            height: scene.height,
            bytes,
        })
    }

    async fn assemble_scene(&self) -> Result<Scene, StudioError> {
        let boundary = self.surface.boundary();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (width, height) = (boundary.width.round() as u32, boundary.height.round() as u32);

        let background = match self.surface.background() {
            Some(background) => {
                let bytes = self.catalog.fetch_image(&background.url).await?;
                Some(export::decode_background(&bytes)?)
            }
            None => None,
        };

        let captions = self
            .surface
            .captions()
            .iter()
            .map(|c| SceneCaption {
                text: c.text.clone(),
                x: c.position.x,
                y: c.position.y,
                px: c.tier.font_px(),
            })
            .collect();

        Ok(Scene { background, width, height, captions })
    }
}

#[cfg(test)]
#[path = "studio_test.rs"]
mod tests;
