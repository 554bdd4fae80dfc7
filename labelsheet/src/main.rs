use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use label_categories::WasteCategory;
use label_core::{AssetKey, AssetLibrary, Catalog, Compositor, LabelRequest, Pictogram};
use std::fs;
use std::path::{Path, PathBuf};

mod config;
mod logging;
mod preview;

use config::Config;

#[derive(Parser, Debug)]
#[command(name = "labelsheet", version, about = "Printable chemical-waste label sheets")]
struct Cli {
    /// Configuration file (default: ./labelsheet.toml, then the user config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search the product table by name, ignoring case and accents
    Search { query: String },
    /// Print the whole product table
    List,
    /// List hazard pictograms and whether their image is available
    Pictograms,
    /// List waste categories for manually entered products
    Categories,
    /// Render a label request (JSON) to a PDF sheet
    Render {
        request: PathBuf,
        /// Output directory (overrides the configuration)
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
        /// Also write a PNG preview of the first page
        #[arg(long, value_name = "FILE.png")]
        preview: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, config_path) = Config::load(cli.config.as_deref())?;
    logging::init_logging(&config.logging, cli.verbose)?;
    match &config_path {
        Some(path) => tracing::debug!(path = %path.display(), "configuration loaded"),
        None => tracing::debug!("no configuration file, using defaults"),
    }

    match cli.command {
        Command::Search { query } => search(&config, &query),
        Command::List => list(&config),
        Command::Pictograms => {
            pictograms(&config);
            Ok(())
        }
        Command::Categories => {
            for cat in WasteCategory::ALL {
                println!("{:<18}{:<20}{}", cat.key(), cat.label(), cat.color_hex());
            }
            Ok(())
        }
        Command::Render {
            request,
            out_dir,
            preview,
        } => render(&config, &request, out_dir.as_deref(), preview.as_deref()),
    }
}

fn load_catalog(config: &Config) -> Result<Catalog> {
    Catalog::load(&config.catalog, &config.columns)
        .with_context(|| format!("Failed to load product table: {}", config.catalog.display()))
}

fn search(config: &Config, query: &str) -> Result<()> {
    let catalog = load_catalog(config)?;
    let hits = catalog.search(query)?;
    if hits.is_empty() {
        println!("No product matches {query:?}.");
        return Ok(());
    }
    for p in hits {
        println!("{}\t{}", p.name, p.regulatory_code);
    }
    Ok(())
}

fn list(config: &Config) -> Result<()> {
    let catalog = load_catalog(config)?;
    for p in catalog.list_all() {
        println!("{}\t{}\t{}", p.name, p.regulatory_code, p.color_hex);
    }
    println!("{} products", catalog.len());
    Ok(())
}

fn pictograms(config: &Config) {
    let assets = load_assets(config);
    for p in Pictogram::ALL {
        let state = if assets.contains(AssetKey::Pictogram(p)) {
            "ok"
        } else {
            "missing"
        };
        println!("{p}\t{state}");
    }
}

fn load_assets(config: &Config) -> AssetLibrary {
    AssetLibrary::load(&config.assets.logo, &config.assets.pictogram_dir)
}

fn render(
    config: &Config,
    request_path: &Path,
    out_dir: Option<&Path>,
    preview_path: Option<&Path>,
) -> Result<()> {
    let txt = fs::read_to_string(request_path)
        .with_context(|| format!("Failed to read request: {}", request_path.display()))?;
    let request: LabelRequest = serde_json::from_str(&txt)
        .with_context(|| format!("Failed to parse request: {}", request_path.display()))?;
    let catalog = load_catalog(config)?;
    let today = chrono::Local::now().format("%d/%m/%Y").to_string();
    let sheet = request.resolve(&catalog, &today)?;

    let assets = load_assets(config);
    let compositor = Compositor::new(&assets).with_captions(config.captions.clone());
    let dir = out_dir.unwrap_or(config.output_dir.as_path());
    let path = compositor
        .render_to_dir(&sheet, dir, &config.file_prefix)
        .context("Failed to write label sheet")?;
    println!("{}", path.display());

    if let Some(preview_path) = preview_path {
        let doc = compositor.compose(&sheet);
        let page = doc.pages.first().context("document has no pages")?;
        preview::write_preview(page, &assets, &config.preview, preview_path)?;
    }
    Ok(())
}
