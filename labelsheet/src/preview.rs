//! PNG preview of a composed page: SVG, rasterized with resvg.

use anyhow::{Context, Result, anyhow};
use label_core::svg::page_svg;
use label_core::{AssetLibrary, PageDrawing};
use png::{BitDepth, ColorType, Compression, Encoder, FilterType};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::config::PreviewConfig;

pub fn write_preview(
    page: &PageDrawing,
    assets: &AssetLibrary,
    config: &PreviewConfig,
    output: &Path,
) -> Result<()> {
    let (svg, w_px, h_px) = page_svg(page, assets, config.px_per_mm);

    let mut opt = usvg::Options::default();
    opt.fontdb = Arc::new(font_database(config.font_file.as_deref())?);
    if let Ok(cwd) = std::env::current_dir() {
        opt.resources_dir = Some(cwd);
    }
    let tree = usvg::Tree::from_str(&svg, &opt).map_err(|e| anyhow!("SVG parse error: {e}"))?;
    let mut pixmap = tiny_skia::Pixmap::new(w_px, h_px).context("pixmap alloc failed")?;
    let mut pm = pixmap.as_mut();
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pm);
    encode_png_deterministic(&pixmap, output)?;
    tracing::info!(path = %output.display(), width = w_px, height = h_px, "preview written");
    Ok(())
}

/// System fonts, plus `font_file` as the `sans-serif` family when given.
fn font_database(font_file: Option<&Path>) -> Result<usvg::fontdb::Database> {
    let mut fontdb = usvg::fontdb::Database::new();
    fontdb.load_system_fonts();
    if let Some(path) = font_file {
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read preview font: {}", path.display()))?;
        let mut probe = usvg::fontdb::Database::new();
        probe.load_font_data(bytes.clone());
        let family_name = probe
            .faces()
            .next()
            .and_then(|face| face.families.first().map(|(n, _)| n.clone()));
        match family_name {
            Some(name) => {
                fontdb.load_font_data(bytes);
                tracing::debug!(family = %name, "preview font registered as sans-serif");
                fontdb.set_sans_serif_family(name);
            }
            None => tracing::warn!(path = %path.display(), "preview font has no usable face"),
        }
    }
    Ok(fontdb)
}

fn encode_png_deterministic(pixmap: &tiny_skia::Pixmap, path: &Path) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("Failed to create preview file: {}", path.display()))?;
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    let mut enc = Encoder::new(file, pixmap.width(), pixmap.height());
    enc.set_color(ColorType::Rgba);
    enc.set_depth(BitDepth::Eight);
    enc.set_filter(FilterType::NoFilter);
    enc.set_compression(Compression::Default);
    let mut writer = enc.write_header()?;
    writer.write_image_data(&rgba)?;
    Ok(())
}
