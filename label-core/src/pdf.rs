//! PDF serialization of a composed [`Document`].
//!
//! Text uses the standard Helvetica faces with WinAnsi encoding, so nothing is
//! embedded but the raster images. Each image is written once and shared by
//! every page that draws it.

use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str, TextStr};
use std::collections::BTreeMap;

use crate::assets::{AssetKey, AssetLibrary};
use crate::color::Rgb;
use crate::compose::{Align, Document, DrawOp, PageDrawing};
use crate::metrics::{Font, encode_win_ansi};

const FONTS: [Font; 2] = [Font::Helvetica, Font::HelveticaBold];

struct ImageRef {
    id: Ref,
    name: Vec<u8>,
}

/// Serialize `doc` to PDF bytes. Draw operations whose image is not in
/// `assets` are skipped.
pub fn write_pdf(doc: &Document, assets: &AssetLibrary) -> Vec<u8> {
    let mut alloc = Ref::new(1);
    let catalog_id = alloc.bump();
    let tree_id = alloc.bump();
    let info_id = alloc.bump();
    let font_ids: Vec<Ref> = FONTS.iter().map(|_| alloc.bump()).collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.document_info(info_id).producer(TextStr("labelsheet"));
    for (font, id) in FONTS.iter().zip(&font_ids) {
        pdf.type1_font(*id)
            .base_font(Name(font.base_font()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    let mut images: BTreeMap<AssetKey, ImageRef> = BTreeMap::new();
    for key in doc.assets_used() {
        let Some(img) = assets.get(key) else {
            continue;
        };
        let id = alloc.bump();
        let mask_id = img.alpha.as_ref().map(|_| alloc.bump());
        {
            let mut xobj = pdf.image_xobject(id, &img.rgb);
            xobj.width(img.width as i32);
            xobj.height(img.height as i32);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
            if let Some(mask_id) = mask_id {
                xobj.s_mask(mask_id);
            }
        }
        if let (Some(mask_id), Some(alpha)) = (mask_id, &img.alpha) {
            let mut mask = pdf.image_xobject(mask_id, alpha);
            mask.width(img.width as i32);
            mask.height(img.height as i32);
            mask.color_space().device_gray();
            mask.bits_per_component(8);
        }
        let name = format!("Im{}", images.len() + 1).into_bytes();
        images.insert(key, ImageRef { id, name });
    }

    let page_ids: Vec<(Ref, Ref)> = doc
        .pages
        .iter()
        .map(|_| (alloc.bump(), alloc.bump()))
        .collect();
    pdf.pages(tree_id)
        .kids(page_ids.iter().map(|(page, _)| *page))
        .count(page_ids.len() as i32);

    for (page, (page_id, content_id)) in doc.pages.iter().zip(&page_ids) {
        let content = page_content(page, &images);
        pdf.stream(*content_id, &content);

        let mut p = pdf.page(*page_id);
        p.media_box(Rect::new(0.0, 0.0, page.width as f32, page.height as f32));
        p.parent(tree_id);
        p.contents(*content_id);
        let mut resources = p.resources();
        {
            let mut fonts = resources.fonts();
            for (font, id) in FONTS.iter().zip(&font_ids) {
                fonts.pair(Name(font.resource_name()), *id);
            }
        }
        if !images.is_empty() {
            let mut xobjects = resources.x_objects();
            for img in images.values() {
                xobjects.pair(Name(&img.name), img.id);
            }
        }
        resources.finish();
        p.finish();
    }

    tracing::debug!(
        pages = doc.pages.len(),
        images = images.len(),
        "pdf serialized"
    );
    pdf.finish()
}

fn page_content(page: &PageDrawing, images: &BTreeMap<AssetKey, ImageRef>) -> Vec<u8> {
    let mut c = Content::new();
    for op in &page.ops {
        match op {
            DrawOp::Line { from, to, width } => {
                c.set_stroke_rgb(0.0, 0.0, 0.0);
                c.set_line_width(*width as f32);
                c.move_to(from.x as f32, from.y as f32);
                c.line_to(to.x as f32, to.y as f32);
                c.stroke();
            }
            DrawOp::FillRect { rect, color } => {
                let (r, g, b) = color.to_unit();
                c.set_fill_rgb(r, g, b);
                c.rect(rect.x as f32, rect.y as f32, rect.w as f32, rect.h as f32);
                c.fill_nonzero();
            }
            DrawOp::Text {
                origin,
                text,
                font,
                size,
                align,
            } => {
                let width = font.text_width(text, *size);
                let x = match align {
                    Align::Left => origin.x,
                    Align::Center => origin.x - width / 2.0,
                    Align::Right => origin.x - width,
                };
                let (r, g, b) = Rgb::BLACK.to_unit();
                c.set_fill_rgb(r, g, b);
                c.begin_text();
                c.set_font(Name(font.resource_name()), *size as f32);
                c.next_line(x as f32, origin.y as f32);
                c.show(Str(&encode_win_ansi(text)));
                c.end_text();
            }
            DrawOp::Image { rect, asset } => {
                let Some(img) = images.get(asset) else {
                    continue;
                };
                c.save_state();
                c.transform([
                    rect.w as f32,
                    0.0,
                    0.0,
                    rect.h as f32,
                    rect.x as f32,
                    rect.y as f32,
                ]);
                c.x_object(Name(&img.name));
                c.restore_state();
            }
        }
    }
    c.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::RasterImage;
    use crate::compose::{Compositor, SheetRequest};
    use crate::model::{LabelData, PageFormat, Pictogram};
    use std::path::PathBuf;

    fn label() -> LabelData {
        LabelData {
            product_name: "Mercure".to_string(),
            regulatory_code: "2001".to_string(),
            faculty: "FGSE".to_string(),
            submitter_number: "7".to_string(),
            creator_last_name: "Muller".to_string(),
            creator_first_name: "Jean".to_string(),
            date: "01/02/2026".to_string(),
            extra_notes: String::new(),
            background_color_hex: "#E0E0E0".to_string(),
            pictograms: vec![Pictogram::Sgh06],
        }
    }

    fn page_count(bytes: &[u8]) -> usize {
        let needle = b"/Type /Page";
        bytes
            .windows(needle.len() + 1)
            .filter(|w| w.starts_with(needle) && w[needle.len()] != b's')
            .count()
    }

    fn contains(hay: &[u8], needle: &[u8]) -> bool {
        hay.windows(needle.len()).any(|w| w == needle)
    }

    fn render(count: usize, format: PageFormat, assets: &AssetLibrary) -> Vec<u8> {
        let req = SheetRequest {
            label: label(),
            count,
            format,
            positions: None,
        };
        write_pdf(&Compositor::new(assets).compose(&req), assets)
    }

    #[test]
    fn one_pdf_page_per_composed_page() {
        let assets = AssetLibrary::empty();
        assert_eq!(page_count(&render(4, PageFormat::Large, &assets)), 1);
        assert_eq!(page_count(&render(5, PageFormat::Large, &assets)), 2);
        assert_eq!(page_count(&render(9, PageFormat::Medium, &assets)), 2);
    }

    #[test]
    fn text_is_written_with_standard_fonts() {
        let assets = AssetLibrary::empty();
        let bytes = render(1, PageFormat::Large, &assets);
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(contains(&bytes, b"/Helvetica-Bold"));
        assert!(contains(&bytes, b"/WinAnsiEncoding"));
        assert!(contains(&bytes, b"Code OMoD : 2001"));
        assert!(!contains(&bytes, b"/XObject"));
    }

    #[test]
    fn shared_image_written_once_with_soft_mask() {
        let mut assets = AssetLibrary::empty();
        assets.insert(
            AssetKey::Pictogram(Pictogram::Sgh06),
            RasterImage {
                source: PathBuf::from("SGH06.png"),
                width: 2,
                height: 1,
                rgb: vec![255, 0, 0, 0, 0, 255],
                alpha: Some(vec![255, 0]),
            },
        );
        let bytes = render(4, PageFormat::Large, &assets);
        let image_objects = bytes
            .windows(b"/Subtype /Image".len())
            .filter(|w| *w == b"/Subtype /Image")
            .count();
        // color plane plus its mask
        assert_eq!(image_objects, 2);
        assert!(contains(&bytes, b"/SMask"));
        assert!(contains(&bytes, b"/Im1 Do"));
    }

    #[test]
    fn empty_document_is_still_valid() {
        let assets = AssetLibrary::empty();
        let doc = Document {
            format: PageFormat::Large,
            pages: Vec::new(),
        };
        let bytes = write_pdf(&doc, &assets);
        assert!(bytes.starts_with(b"%PDF-"));
        assert_eq!(page_count(&bytes), 0);
    }
}
