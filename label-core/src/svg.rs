//! SVG rendition of one composed page, used for raster previews.

use crate::assets::AssetLibrary;
use crate::compose::{Align, DrawOp, PageDrawing};
use crate::sheet::PT_PER_MM;

/// Render `page` as SVG at `px_per_mm`. Returns the document and its pixel size.
///
/// Images are referenced by file path, not embedded.
pub fn page_svg(page: &PageDrawing, assets: &AssetLibrary, px_per_mm: f64) -> (String, u32, u32) {
    let scale = px_per_mm / PT_PER_MM;
    let w_px = (page.width * scale).ceil() as u32;
    let h_px = (page.height * scale).ceil() as u32;
    // PDF space has y up
    let to_px = |x: f64, y: f64| (x * scale, (page.height - y) * scale);

    let mut s = String::new();
    s.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    s.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{w_px}\" height=\"{h_px}\" viewBox=\"0 0 {w_px} {h_px}\" font-family=\"sans-serif\">\n"
    ));
    s.push_str("<rect x=\"0\" y=\"0\" width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>\n");
    // slot outlines help when checking alignment against the stock
    for slot in &page.slots {
        let (x, y) = to_px(slot.x, slot.top());
        s.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"none\" stroke=\"#ddd\" stroke-width=\"1\"/>\n",
            x,
            y,
            slot.width * scale,
            slot.height * scale
        ));
    }
    for op in &page.ops {
        match op {
            DrawOp::Line { from, to, width } => {
                let (x0, y0) = to_px(from.x, from.y);
                let (x1, y1) = to_px(to.x, to.y);
                s.push_str(&format!(
                    "<path d=\"M {:.2} {:.2} L {:.2} {:.2}\" stroke=\"#000\" stroke-width=\"{:.2}\"/>\n",
                    x0,
                    y0,
                    x1,
                    y1,
                    width * scale
                ));
            }
            DrawOp::FillRect { rect, color } => {
                let (x, y) = to_px(rect.x, rect.y + rect.h);
                s.push_str(&format!(
                    "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>\n",
                    x,
                    y,
                    rect.w * scale,
                    rect.h * scale,
                    color.to_hex()
                ));
            }
            DrawOp::Text {
                origin,
                text,
                font,
                size,
                align,
            } => {
                let (x, y) = to_px(origin.x, origin.y);
                let anchor = match align {
                    Align::Left => "start",
                    Align::Center => "middle",
                    Align::Right => "end",
                };
                let weight = if font.is_bold() { "bold" } else { "normal" };
                s.push_str(&format!(
                    "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"{}\" font-weight=\"{}\" font-size=\"{:.2}\" fill=\"#000\">{}</text>\n",
                    x,
                    y,
                    anchor,
                    weight,
                    size * scale,
                    svg_escape(text)
                ));
            }
            DrawOp::Image { rect, asset } => {
                let Some(img) = assets.get(*asset) else {
                    continue;
                };
                let (x, y) = to_px(rect.x, rect.y + rect.h);
                s.push_str(&format!(
                    "<image x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" preserveAspectRatio=\"none\" xlink:href=\"{}\"/>\n",
                    x,
                    y,
                    rect.w * scale,
                    rect.h * scale,
                    svg_escape(&img.source.display().to_string())
                ));
            }
        }
    }
    s.push_str("</svg>\n");
    (s, w_px, h_px)
}

fn svg_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{Compositor, SheetRequest};
    use crate::model::{LabelData, PageFormat};

    fn page(format: PageFormat) -> PageDrawing {
        let req = SheetRequest {
            label: LabelData {
                product_name: "Acide <nitrique> & co".to_string(),
                regulatory_code: "1002".to_string(),
                faculty: "SB".to_string(),
                submitter_number: "3".to_string(),
                creator_last_name: "Favre".to_string(),
                creator_first_name: "Anne".to_string(),
                date: "03/03/2026".to_string(),
                extra_notes: String::new(),
                background_color_hex: "#D32F2F".to_string(),
                pictograms: Vec::new(),
            },
            count: 1,
            format,
            positions: None,
        };
        let assets = AssetLibrary::empty();
        Compositor::new(&assets).compose(&req).pages.remove(0)
    }

    #[test]
    fn size_follows_page_and_resolution() {
        let assets = AssetLibrary::empty();
        let near = |a: u32, b: u32| a.abs_diff(b) <= 1;
        let (_, w, h) = page_svg(&page(PageFormat::Large), &assets, 4.0);
        assert!(near(w, 1188) && near(h, 840), "{w}x{h}");
        let (_, w, h) = page_svg(&page(PageFormat::Medium), &assets, 2.0);
        assert!(near(w, 420) && near(h, 594), "{w}x{h}");
    }

    #[test]
    fn text_is_escaped_and_anchored() {
        let assets = AssetLibrary::empty();
        let (svg, _, _) = page_svg(&page(PageFormat::Large), &assets, 4.0);
        assert!(svg.contains("Acide &lt;nitrique&gt; &amp; co"));
        assert!(svg.contains("text-anchor=\"end\""));
        assert!(svg.contains("fill=\"#D32F2F\""));
        assert!(svg.ends_with("</svg>\n"));
    }
}
