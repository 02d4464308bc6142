//! memestudio — compose meme images from the command line.
//!
//! Two subcommands: `templates` prints the background catalog, `compose`
//! builds a composition (template, captions, size tier) and writes the
//! JPEG artifact. Logs go to stderr; stdout carries only command output.

mod catalog;
mod error;
mod export;
mod studio;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use surface::caption::SizeTier;
use surface::geom::Point;
use tracing_subscriber::EnvFilter;

use crate::catalog::CatalogClient;
use crate::error::ErrorCode;
use crate::export::JpegRasterizer;
use crate::studio::Studio;

// =============================================================================
// CLI SURFACE
// =============================================================================

#[derive(Parser)]
#[command(name = "memestudio", version, about = "Compose meme images from a template catalog")]
struct Cli {
    /// Base URL of the template catalog.
    #[arg(long, env = "MEMESTUDIO_CATALOG_URL", default_value = catalog::DEFAULT_CATALOG_URL)]
    catalog_url: String,

    /// TTF/OTF font for caption lettering. Well-known system fonts are
    /// probed when unset.
    #[arg(long, env = "MEMESTUDIO_FONT")]
    font: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the template catalog and print it as JSON.
    Templates,
    /// Compose captions over a template and write the JPEG artifact.
    Compose(ComposeArgs),
}

#[derive(Args)]
struct ComposeArgs {
    /// Catalog index of the background template.
    #[arg(long, value_name = "INDEX", conflicts_with = "random")]
    template: Option<usize>,

    /// Pick a random template instead of naming one.
    #[arg(long)]
    random: bool,

    /// Caption text, repeatable. Append `@x,y` to place it: "TOP TEXT@400,60".
    /// Unplaced captions stay centered.
    #[arg(long = "caption", value_name = "TEXT[@x,y]")]
    captions: Vec<String>,

    /// Lettering size tier for the captions in this composition.
    #[arg(long, default_value = "regular")]
    tier: SizeTier,

    /// Output path for the JPEG artifact.
    #[arg(long, default_value = export::DEFAULT_ARTIFACT_NAME)]
    out: PathBuf,

    /// JPEG quality from 1 to 100.
    #[arg(long, default_value_t = export::DEFAULT_JPEG_QUALITY)]
    #[arg(value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Print the artifact as a base64 data URL instead of a summary.
    #[arg(long)]
    data_url: bool,
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Studio(#[from] studio::StudioError),

    #[error(transparent)]
    Catalog(#[from] catalog::CatalogError),

    #[error(transparent)]
    Export(#[from] export::ExportError),

    #[error("JSON encode failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl ErrorCode for CliError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Studio(e) => e.error_code(),
            Self::Catalog(e) => e.error_code(),
            Self::Export(e) => e.error_code(),
            Self::Json(_) => "E_JSON_ENCODE",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Studio(e) => e.retryable(),
            Self::Catalog(e) => e.retryable(),
            Self::Export(_) | Self::Json(_) => false,
        }
    }
}

// =============================================================================
// ENTRY
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before clap reads the process environment.
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if error.retryable() {
                eprintln!("error[{}]: {error} (retryable)", error.error_code());
            } else {
                eprintln!("error[{}]: {error}", error.error_code());
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("memestudio=info,surface=info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Templates => run_templates(&cli.catalog_url).await,
        Command::Compose(args) => run_compose(&cli.catalog_url, cli.font.as_deref(), args).await,
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

async fn run_templates(catalog_url: &str) -> Result<(), CliError> {
    let catalog = CatalogClient::new(catalog_url.to_owned())?;
    let templates = catalog.fetch_templates().await?;
    tracing::info!(count = templates.len(), "template catalog loaded");
    print_json(&serde_json::to_value(&templates)?)
}

async fn run_compose(
    catalog_url: &str,
    font: Option<&Path>,
    args: ComposeArgs,
) -> Result<(), CliError> {
    let catalog = CatalogClient::new(catalog_url.to_owned())?;
    let mut studio = Studio::new(catalog);

    if args.template.is_some() || args.random {
        studio.load_templates().await;
    }
    if let Some(index) = args.template {
        let picked = studio.select_template(index)?;
        tracing::info!(template = %picked.name, "using template");
    } else if args.random {
        let picked = studio.select_random_template(&mut rand::rng())?;
        tracing::info!(template = %picked.name, "using random template");
    }

    studio.set_size_tier(args.tier);
    for raw in &args.captions {
        let placement = parse_caption_arg(raw);
        let id = studio.add_caption(&placement.text)?;
        if let Some(target) = placement.target {
            studio.place_caption(&id, target)?;
        }
    }

    let font = export::load_font(font)?;
    let rasterizer = JpegRasterizer::new(font, args.quality);
    let receipt = studio.export(&rasterizer, &args.out).await?;

    if args.data_url {
        println!("{}", export::data_url(&receipt.bytes));
        return Ok(());
    }

    let captions: Vec<_> = studio
        .surface()
        .captions()
        .iter()
        .map(|c| {
            serde_json::json!({
                "text": c.text,
                "x": c.position.x,
                "y": c.position.y,
                "tier": c.tier.name(),
            })
        })
        .collect();
    print_json(&serde_json::json!({
        "artifact": receipt.path.display().to_string(),
        "width": receipt.width,
        "height": receipt.height,
        "bytes": receipt.bytes.len(),
        "captions": captions,
    }))
}

fn print_json(value: &serde_json::Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// =============================================================================
// CAPTION ARGUMENTS
// =============================================================================

struct CaptionArg {
    text: String,
    target: Option<Point>,
}

/// Split an optional `@x,y` placement suffix off a caption argument.
///
/// The suffix only counts when both coordinates parse as finite numbers, so
/// caption text containing `@` stays intact and `NaN`/`inf` never reach the
/// surface as a position.
fn parse_caption_arg(raw: &str) -> CaptionArg {
    if let Some((text, coords)) = raw.rsplit_once('@') {
        if let Some((x, y)) = coords.split_once(',') {
            if let (Ok(x), Ok(y)) = (x.trim().parse::<f64>(), y.trim().parse::<f64>()) {
                if x.is_finite() && y.is_finite() {
                    return CaptionArg { text: text.to_owned(), target: Some(Point::new(x, y)) };
                }
            }
        }
    }
    CaptionArg { text: raw.to_owned(), target: None }
}
