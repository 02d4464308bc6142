use std::sync::Mutex;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::catalog::DEFAULT_CATALOG_URL;
use crate::export::JpegRasterizer;

// =============================================================================
// Helpers
// =============================================================================

fn offline_catalog() -> CatalogClient {
    // Port 1 refuses connections immediately, so nothing here hits a network.
    CatalogClient::new("http://127.0.0.1:1".into()).unwrap()
}

fn studio() -> Studio {
    Studio::new(offline_catalog())
}

fn template(id: &str, name: &str, width: u32, height: u32) -> Template {
    Template {
        id: id.into(),
        name: name.into(),
        url: format!("https://i.example.com/{id}.jpg"),
        width,
        height,
        box_count: 2,
    }
}

fn two_template_studio() -> Studio {
    let mut studio = studio();
    studio.templates = vec![
        template("181913649", "Drake Hotline Bling", 1200, 1218),
        template("87743020", "Two Buttons", 400, 300),
    ];
    studio
}

fn seeded() -> StdRng {
    StdRng::seed_from_u64(0xC0FFEE)
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("memestudio-{}-{name}", uuid::Uuid::new_v4()))
}

struct StubRasterizer;

#[async_trait::async_trait]
impl Rasterize for StubRasterizer {
    async fn rasterize(&self, _scene: &Scene) -> Result<Vec<u8>, ExportError> {
        Ok(vec![0xFF, 0xD8, 0xFF, 0xD9])
    }
}

/// Records what reaches the rasterizer so scene assembly is observable.
struct RecordingRasterizer {
    seen: Mutex<Vec<(u32, u32, usize)>>,
}

impl RecordingRasterizer {
    fn new() -> Self {
        Self { seen: Mutex::new(Vec::new()) }
    }
}

#[async_trait::async_trait]
impl Rasterize for RecordingRasterizer {
    async fn rasterize(&self, scene: &Scene) -> Result<Vec<u8>, ExportError> {
        self.seen.lock().unwrap().push((scene.width, scene.height, scene.captions.len()));
        Ok(vec![0xFF, 0xD8, 0xFF, 0xD9])
    }
}

// =============================================================================
// Construction and catalog loading
// =============================================================================

#[test]
fn new_studio_is_empty() {
    let studio = studio();
    assert!(studio.surface().is_empty());
    assert!(studio.templates.is_empty());
}

#[tokio::test]
async fn load_templates_unreachable_catalog_is_non_fatal() {
    let mut studio = studio();
    studio.load_templates().await;
    assert!(studio.templates.is_empty());
}

// =============================================================================
// select_template
// =============================================================================

#[test]
fn select_template_without_catalog() {
    let mut studio = studio();
    let err = studio.select_template(0).unwrap_err();
    assert!(matches!(err, StudioError::NoTemplates));
}

#[test]
fn select_template_bad_index() {
    let mut studio = two_template_studio();
    let err = studio.select_template(5).unwrap_err();
    assert!(matches!(err, StudioError::BadTemplateIndex { index: 5, len: 2 }));
    let msg = err.to_string();
    assert!(msg.contains('5'));
    assert!(msg.contains('2'));
}

#[test]
fn select_template_sets_background_and_boundary() {
    let mut studio = two_template_studio();
    let picked = studio.select_template(0).unwrap();
    assert_eq!(picked.name, "Drake Hotline Bling");

    let background = studio.surface().background().unwrap();
    assert_eq!(background.template_id, "181913649");
    // 1200x1218 scales down so the longest edge lands on 1024.
    let boundary = studio.surface().boundary();
    assert_eq!(boundary.width, 1009.0);
    assert_eq!(boundary.height, 1024.0);
}

#[test]
fn select_template_keeps_small_dimensions() {
    let mut studio = two_template_studio();
    studio.select_template(1).unwrap();
    let boundary = studio.surface().boundary();
    assert_eq!(boundary.width, 400.0);
    assert_eq!(boundary.height, 300.0);
}

#[test]
fn select_template_reclamps_existing_captions() {
    let mut studio = two_template_studio();
    let id = studio.add_caption("top text").unwrap();
    studio.place_caption(&id, Point::new(790.0, 585.0)).unwrap();

    studio.select_template(1).unwrap();
    let caption = studio.surface().caption(&id).unwrap();
    assert_eq!(caption.position, Point::new(400.0, 300.0));
}

// =============================================================================
// select_random_template
// =============================================================================

#[test]
fn select_random_without_catalog() {
    let mut studio = studio();
    let err = studio.select_random_template(&mut seeded()).unwrap_err();
    assert!(matches!(err, StudioError::NoTemplates));
}

#[test]
fn select_random_single_catalog_picks_it() {
    let mut studio = studio();
    studio.templates = vec![template("1", "Only", 500, 500)];
    let picked = studio.select_random_template(&mut seeded()).unwrap().id.clone();
    assert_eq!(picked, "1");
    assert!(studio.surface().background().is_some());
}

#[test]
fn select_random_single_already_selected_stays_put() {
    let mut studio = studio();
    studio.templates = vec![template("1", "Only", 500, 500)];
    studio.select_template(0).unwrap();

    let picked = studio.select_random_template(&mut seeded()).unwrap().id.clone();
    assert_eq!(picked, "1");
    assert_eq!(studio.surface().background().unwrap().template_id, "1");
}

#[test]
fn select_random_never_repeats_current() {
    let mut studio = two_template_studio();
    studio.select_template(0).unwrap();
    let mut rng = seeded();

    for _ in 0..50 {
        let before = studio.surface().background().unwrap().template_id.clone();
        let picked = studio.select_random_template(&mut rng).unwrap().id.clone();
        assert_ne!(picked, before);
        assert_eq!(studio.surface().background().unwrap().template_id, picked);
    }
}

#[test]
fn select_random_covers_catalog() {
    let mut studio = studio();
    studio.templates = vec![
        template("a", "A", 100, 100),
        template("b", "B", 100, 100),
        template("c", "C", 100, 100),
    ];
    let mut rng = seeded();
    let mut seen = [false; 3];

    for _ in 0..100 {
        let picked = studio.select_random_template(&mut rng).unwrap().id.clone();
        let index = studio.templates.iter().position(|t| t.id == picked).unwrap();
        seen[index] = true;
    }
    assert_eq!(seen, [true, true, true]);
}

// =============================================================================
// add_caption and tiers
// =============================================================================

#[test]
fn add_caption_lands_centered_at_default_tier() {
    let mut studio = studio();
    let id = studio.add_caption("hello").unwrap();
    let caption = studio.surface().caption(&id).unwrap();
    assert_eq!(caption.position, Point::new(400.0, 300.0));
    assert_eq!(caption.tier, SizeTier::Regular);
}

#[test]
fn add_caption_rejects_empty_text() {
    let mut studio = studio();
    let err = studio.add_caption("").unwrap_err();
    assert!(matches!(err, StudioError::EmptyCaption));
}

#[test]
fn add_caption_rejects_whitespace_text() {
    let mut studio = studio();
    let err = studio.add_caption("   \t  ").unwrap_err();
    assert!(matches!(err, StudioError::EmptyCaption));
}

#[test]
fn set_size_tier_applies_to_new_captions() {
    let mut studio = studio();
    studio.set_size_tier(SizeTier::Big);
    let id = studio.add_caption("BIG TEXT").unwrap();
    assert_eq!(studio.surface().caption(&id).unwrap().tier, SizeTier::Big);
}

// =============================================================================
// place_caption
// =============================================================================

#[test]
fn place_caption_moves_to_target() {
    let mut studio = studio();
    let id = studio.add_caption("top text").unwrap();
    let rest = studio.place_caption(&id, Point::new(120.0, 40.0)).unwrap();
    assert_eq!(rest, Point::new(120.0, 40.0));
    assert_eq!(studio.surface().caption(&id).unwrap().position, rest);
}

#[test]
fn place_caption_clamps_to_boundary() {
    let mut studio = studio();
    let id = studio.add_caption("way out").unwrap();
    let rest = studio.place_caption(&id, Point::new(5000.0, -50.0)).unwrap();
    assert_eq!(rest, Point::new(800.0, 0.0));
}

#[test]
fn place_caption_unknown_id() {
    let mut studio = studio();
    studio.add_caption("real").unwrap();
    let ghost = uuid::Uuid::new_v4();
    let err = studio.place_caption(&ghost, Point::new(10.0, 10.0)).unwrap_err();
    assert!(matches!(err, StudioError::UnknownCaption(id) if id == ghost));
}

#[test]
fn place_caption_obscured_by_newer_caption() {
    let mut studio = studio();
    let below = studio.add_caption("below").unwrap();
    let above = studio.add_caption("above").unwrap();

    // Both sit at the center; the pointer would grab the newer one.
    let err = studio.place_caption(&below, Point::new(100.0, 100.0)).unwrap_err();
    assert!(matches!(err, StudioError::CaptionObscured(id) if id == below));
    assert!(studio.surface().dragging_id().is_none());
    assert_eq!(studio.surface().caption(&below).unwrap().position, Point::new(400.0, 300.0));

    // Moving the covering caption away unblocks the lower one.
    studio.place_caption(&above, Point::new(700.0, 100.0)).unwrap();
    let rest = studio.place_caption(&below, Point::new(100.0, 100.0)).unwrap();
    assert_eq!(rest, Point::new(100.0, 100.0));
}

#[test]
fn place_caption_sequential_flow() {
    // The compose flow places each caption right after adding it, so each
    // placement grabs the caption while it is still topmost.
    let mut studio = studio();
    let first = studio.add_caption("top").unwrap();
    studio.place_caption(&first, Point::new(400.0, 60.0)).unwrap();
    let second = studio.add_caption("bottom").unwrap();
    studio.place_caption(&second, Point::new(400.0, 540.0)).unwrap();

    assert_eq!(studio.surface().caption(&first).unwrap().position, Point::new(400.0, 60.0));
    assert_eq!(studio.surface().caption(&second).unwrap().position, Point::new(400.0, 540.0));
}

// =============================================================================
// export
// =============================================================================

#[tokio::test]
async fn export_writes_stub_artifact() {
    let mut studio = studio();
    studio.add_caption("hello").unwrap();

    let out = temp_path("stub.jpeg");
    let receipt = studio.export(&StubRasterizer, &out).await.unwrap();

    assert_eq!(receipt.path, out);
    assert_eq!(receipt.width, 800);
    assert_eq!(receipt.height, 600);
    assert_eq!(receipt.bytes, vec![0xFF, 0xD8, 0xFF, 0xD9]);
    assert_eq!(std::fs::read(&out).unwrap(), receipt.bytes);
    std::fs::remove_file(&out).unwrap();
}

#[tokio::test]
async fn export_scene_carries_captions_and_dimensions() {
    let mut studio = studio();
    studio.add_caption("one").unwrap();
    studio.add_caption("two").unwrap();

    let rasterizer = RecordingRasterizer::new();
    let out = temp_path("recorded.jpeg");
    studio.export(&rasterizer, &out).await.unwrap();

    let seen = rasterizer.seen.lock().unwrap();
    assert_eq!(*seen, vec![(800, 600, 2)]);
    std::fs::remove_file(&out).unwrap();
}

#[tokio::test]
async fn export_without_captions_still_renders() {
    let studio = studio();
    let out = temp_path("blank.jpeg");
    let receipt = studio.export(&StubRasterizer, &out).await.unwrap();
    assert_eq!(receipt.width, 800);
    std::fs::remove_file(&out).unwrap();
}

// =============================================================================
// Error codes
// =============================================================================

#[test]
fn error_codes_stable() {
    assert_eq!(StudioError::NoTemplates.error_code(), "E_NO_TEMPLATES");
    let bad = StudioError::BadTemplateIndex { index: 9, len: 3 };
    assert_eq!(bad.error_code(), "E_BAD_TEMPLATE_INDEX");
    assert_eq!(StudioError::EmptyCaption.error_code(), "E_EMPTY_CAPTION");
    let id = uuid::Uuid::new_v4();
    assert_eq!(StudioError::UnknownCaption(id).error_code(), "E_UNKNOWN_CAPTION");
    assert_eq!(StudioError::CaptionObscured(id).error_code(), "E_CAPTION_OBSCURED");
}

#[test]
fn error_codes_delegate_to_sources() {
    let catalog = StudioError::Catalog(CatalogError::Rejected);
    assert_eq!(catalog.error_code(), "E_CATALOG_REJECTED");
    let export = StudioError::Export(ExportError::FontUnavailable);
    assert_eq!(export.error_code(), "E_FONT_UNAVAILABLE");
}

#[test]
fn retryable_delegates_to_catalog() {
    let retryable = StudioError::Catalog(CatalogError::Request("timeout".into()));
    assert!(retryable.retryable());
    assert!(!StudioError::NoTemplates.retryable());
    assert!(!StudioError::EmptyCaption.retryable());
}

// =============================================================================
// Live end-to-end
// =============================================================================

#[tokio::test]
#[ignore = "hits the public imgflip API and needs a system font"]
async fn end_to_end_compose_against_live_catalog() {
    let catalog = CatalogClient::new(DEFAULT_CATALOG_URL.into()).unwrap();
    let mut studio = Studio::new(catalog);
    studio.load_templates().await;

    studio.select_template(0).unwrap();
    let id = studio.add_caption("ONE DOES NOT SIMPLY").unwrap();
    studio.place_caption(&id, Point::new(200.0, 80.0)).unwrap();

    let font = crate::export::load_font(None).unwrap();
    let rasterizer = JpegRasterizer::new(font, 95);
    let out = temp_path("live.jpeg");
    let receipt = studio.export(&rasterizer, &out).await.unwrap();

    assert!(receipt.bytes.len() > 1000);
    assert_eq!(&receipt.bytes[..2], &[0xFF, 0xD8]);
    std::fs::remove_file(&out).unwrap();
}
