//! Label compositor: places labels in slots and turns each one into draw operations.
//!
//! Every label is laid out relative to its slot. Offsets are fractions of
//! the slot width `w` and height `h` measured from the slot's bottom-left
//! corner; font sizes scale with `h / 100 mm` so both stock sizes share one
//! layout.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::assets::{AssetKey, AssetLibrary};
use crate::color::Rgb;
use crate::metrics::Font;
use crate::model::{LabelData, PageFormat};
use crate::naming;
use crate::pdf;
use crate::sheet::{LabelSlot, mm_to_pt, paginate, slot_rects};
use crate::text::{notes_lines, wrap_product_name};

/// Pictograms laid out per label; extra selections are ignored.
pub const MAX_PICTOGRAMS: usize = 6;
const PICTOGRAM_COLS: usize = 3;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("nothing to print: {count} label(s) requested with no usable slot")]
    EmptySheet { count: usize },
    #[error("failed to list output directory {path}: {source}")]
    ListDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Axis-aligned rectangle, bottom-left origin.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Horizontal anchoring of a text run relative to its origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// One drawing primitive, in page points.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Line {
        from: Point,
        to: Point,
        width: f64,
    },
    FillRect {
        rect: Rect,
        color: Rgb,
    },
    /// `origin` is on the baseline.
    Text {
        origin: Point,
        text: String,
        font: Font,
        size: f64,
        align: Align,
    },
    Image {
        rect: Rect,
        asset: AssetKey,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct PageDrawing {
    pub width: f64,
    pub height: f64,
    /// Slots that received a label, in drawing order.
    pub slots: Vec<LabelSlot>,
    pub ops: Vec<DrawOp>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub format: PageFormat,
    pub pages: Vec<PageDrawing>,
}

impl Document {
    pub fn label_count(&self) -> usize {
        self.pages.iter().map(|p| p.slots.len()).sum()
    }

    /// Every asset drawn anywhere in the document, in first-use order.
    pub fn assets_used(&self) -> Vec<AssetKey> {
        let mut out = Vec::new();
        for page in &self.pages {
            for op in &page.ops {
                if let DrawOp::Image { asset, .. } = op
                    && !out.contains(asset)
                {
                    out.push(*asset);
                }
            }
        }
        out
    }
}

/// Fixed words printed before each value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Captions {
    pub submitter: String,
    pub code: String,
    pub faculty: String,
    pub last_name: String,
    pub first_name: String,
    pub date: String,
    pub notes: String,
}

impl Default for Captions {
    fn default() -> Self {
        Captions {
            submitter: "N° remettant".to_string(),
            code: "Code OMoD".to_string(),
            faculty: "Faculté".to_string(),
            last_name: "Nom".to_string(),
            first_name: "Prénom".to_string(),
            date: "Date".to_string(),
            notes: "Données supplémentaires".to_string(),
        }
    }
}

/// One generation call: a label template, how many copies, on which stock.
#[derive(Clone, Debug, PartialEq)]
pub struct SheetRequest {
    pub label: LabelData,
    pub count: usize,
    pub format: PageFormat,
    /// 0-based slot indices to use on every page; all slots when `None`.
    pub positions: Option<Vec<usize>>,
}

pub struct Compositor<'a> {
    assets: &'a AssetLibrary,
    captions: Captions,
}

impl<'a> Compositor<'a> {
    pub fn new(assets: &'a AssetLibrary) -> Self {
        Compositor {
            assets,
            captions: Captions::default(),
        }
    }

    pub fn with_captions(mut self, captions: Captions) -> Self {
        self.captions = captions;
        self
    }

    /// Lay out `req.count` copies of the label, page after page.
    ///
    /// A count of 0, or positions naming no existing slot, yield a document
    /// without pages.
    pub fn compose(&self, req: &SheetRequest) -> Document {
        let slots = slot_rects(req.format);
        let usable: Vec<usize> = match &req.positions {
            Some(p) => {
                let mut p: Vec<usize> = p.iter().copied().filter(|i| *i < slots.len()).collect();
                p.sort_unstable();
                p.dedup();
                p
            }
            None => (0..slots.len()).collect(),
        };
        let (width, height) = req.format.page_size_pt();
        let pages = paginate(req.count, &usable)
            .into_iter()
            .map(|indices| {
                let mut page = PageDrawing {
                    width,
                    height,
                    slots: Vec::with_capacity(indices.len()),
                    ops: Vec::new(),
                };
                for i in indices {
                    let slot = slots[i];
                    self.draw_label(&slot, &req.label, &mut page.ops);
                    page.slots.push(slot);
                }
                page
            })
            .collect::<Vec<_>>();
        tracing::debug!(
            format = ?req.format,
            labels = req.count,
            pages = pages.len(),
            "sheet composed"
        );
        Document {
            format: req.format,
            pages,
        }
    }

    fn draw_label(&self, slot: &LabelSlot, d: &LabelData, ops: &mut Vec<DrawOp>) {
        let (x0, y0, w, h) = (slot.x, slot.y, slot.width, slot.height);
        let s = h / mm_to_pt(100.0);
        let at = |fx: f64, fy: f64| Point {
            x: x0 + fx * w,
            y: y0 + fy * h,
        };
        let c = &self.captions;

        // header band: top rule and both sides
        let band_h = 0.12 * h;
        let band_y = y0 + 0.85 * h;
        let band_top = band_y + band_h;
        for (from, to) in [
            ((x0, band_top), (x0 + w, band_top)),
            ((x0, band_y), (x0, band_top)),
            ((x0 + w, band_y), (x0 + w, band_top)),
        ] {
            ops.push(DrawOp::Line {
                from: Point { x: from.0, y: from.1 },
                to: Point { x: to.0, y: to.1 },
                width: 1.0,
            });
        }

        if self.assets.contains(AssetKey::Logo) {
            let logo_h = 0.12 * h;
            ops.push(DrawOp::Image {
                rect: Rect {
                    x: x0 + 0.05 * w,
                    y: band_y + (band_h - logo_h) / 2.0,
                    w: 0.25 * w,
                    h: logo_h,
                },
                asset: AssetKey::Logo,
            });
        }

        ops.push(DrawOp::Text {
            origin: Point {
                x: x0 + 0.55 * w,
                y: band_y + band_h / 2.0 - 4.0 * s,
            },
            text: format!("{} : {}", c.submitter, d.submitter_number),
            font: Font::HelveticaBold,
            size: 9.0 * s,
            align: Align::Left,
        });

        // swatch behind the name, left half
        let swatch = at(0.0, 0.67);
        ops.push(DrawOp::FillRect {
            rect: Rect {
                x: swatch.x,
                y: swatch.y,
                w: w / 2.0,
                h: 0.09 * h,
            },
            color: Rgb::from_hex_or_white(&d.background_color_hex),
        });

        for (i, line) in wrap_product_name(&d.product_name).into_iter().enumerate() {
            ops.push(DrawOp::Text {
                origin: Point {
                    x: x0 + w / 4.0,
                    y: y0 + 0.74 * h - i as f64 * 0.035 * h,
                },
                text: line,
                font: Font::HelveticaBold,
                size: 10.0 * s,
                align: Align::Center,
            });
        }

        ops.push(DrawOp::Text {
            origin: at(0.95, 0.70),
            text: format!("{} : {}", c.code, d.regulatory_code),
            font: Font::HelveticaBold,
            size: 11.0 * s,
            align: Align::Right,
        });

        self.draw_pictograms(x0, y0, w, h, d, ops);

        let info = [
            (0.39, &c.faculty, &d.faculty),
            (0.32, &c.last_name, &d.creator_last_name),
            (0.25, &c.first_name, &d.creator_first_name),
            (0.18, &c.date, &d.date),
        ];
        for (fy, caption, value) in info {
            ops.push(DrawOp::Text {
                origin: at(0.07, fy),
                text: format!("{caption} : {value}"),
                font: Font::Helvetica,
                size: 10.0 * s,
                align: Align::Left,
            });
        }

        let notes = notes_lines(&d.extra_notes);
        if !notes.is_empty() {
            let y_start = y0 + 0.15 * h;
            ops.push(DrawOp::Text {
                origin: Point {
                    x: x0 + 0.07 * w,
                    y: y_start,
                },
                text: format!("{} :", c.notes),
                font: Font::Helvetica,
                size: 10.0 * s,
                align: Align::Left,
            });
            for (i, line) in notes.into_iter().enumerate() {
                ops.push(DrawOp::Text {
                    origin: Point {
                        x: x0 + 0.10 * w,
                        y: y_start - (i + 1) as f64 * 0.045 * h,
                    },
                    text: line,
                    font: Font::Helvetica,
                    size: 10.0 * s,
                    align: Align::Left,
                });
            }
        }
    }

    /// Three-column grid centered in the right half. A pictogram without an
    /// image keeps its cell empty.
    fn draw_pictograms(&self, x0: f64, y0: f64, w: f64, h: f64, d: &LabelData, ops: &mut Vec<DrawOp>) {
        let size = 0.12 * h;
        let spacing_x = 0.02 * w;
        let spacing_y = 0.02 * h;
        let row_w = PICTOGRAM_COLS as f64 * size + (PICTOGRAM_COLS - 1) as f64 * spacing_x;
        let start_x = x0 + w / 2.0 + (w / 2.0 - row_w) / 2.0;
        let base_y = y0 + 0.48 * h;
        for (i, p) in d.pictograms.iter().take(MAX_PICTOGRAMS).enumerate() {
            let key = AssetKey::Pictogram(*p);
            if !self.assets.contains(key) {
                continue;
            }
            let (row, col) = (i / PICTOGRAM_COLS, i % PICTOGRAM_COLS);
            ops.push(DrawOp::Image {
                rect: Rect {
                    x: start_x + col as f64 * (size + spacing_x),
                    y: base_y - row as f64 * (size + spacing_y),
                    w: size,
                    h: size,
                },
                asset: key,
            });
        }
    }

    /// Compose, serialize and write the sheet into `dir` under a fresh name.
    ///
    /// Returns the path written. A request that lays out no page is refused
    /// and nothing is written.
    pub fn render_to_dir(
        &self,
        req: &SheetRequest,
        dir: &Path,
        prefix: &str,
    ) -> Result<PathBuf, RenderError> {
        let doc = self.compose(req);
        if doc.pages.is_empty() {
            return Err(RenderError::EmptySheet { count: req.count });
        }
        let bytes = pdf::write_pdf(&doc, self.assets);
        let existing = naming::list_dir_names(dir).map_err(|source| RenderError::ListDir {
            path: dir.display().to_string(),
            source,
        })?;
        let name = naming::allocate_output_name(&req.label.product_name, prefix, &existing);
        let path = dir.join(name);
        std::fs::write(&path, bytes).map_err(|source| RenderError::Write {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!(
            path = %path.display(),
            pages = doc.pages.len(),
            labels = doc.label_count(),
            "label sheet written"
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::RasterImage;
    use crate::model::Pictogram;

    pub(crate) fn sample_label() -> LabelData {
        LabelData {
            product_name: "Acétone".to_string(),
            regulatory_code: "1001".to_string(),
            faculty: "FBM".to_string(),
            submitter_number: "42".to_string(),
            creator_last_name: "Rossier".to_string(),
            creator_first_name: "Léa".to_string(),
            date: "16/10/2026".to_string(),
            extra_notes: String::new(),
            background_color_hex: "#FFEB3B".to_string(),
            pictograms: vec![Pictogram::Sgh02, Pictogram::Sgh07],
        }
    }

    fn request(count: usize, format: PageFormat) -> SheetRequest {
        SheetRequest {
            label: sample_label(),
            count,
            format,
            positions: None,
        }
    }

    fn pixel() -> RasterImage {
        RasterImage {
            source: PathBuf::from("p.png"),
            width: 1,
            height: 1,
            rgb: vec![0, 0, 0],
            alpha: None,
        }
    }

    fn texts(page: &PageDrawing) -> Vec<&str> {
        page.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn swatches(page: &PageDrawing) -> Vec<Rgb> {
        page.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillRect { color, .. } => Some(*color),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn large_four_fits_one_page() {
        let assets = AssetLibrary::empty();
        let doc = Compositor::new(&assets).compose(&request(4, PageFormat::Large));
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.pages[0].slots, slot_rects(PageFormat::Large));
    }

    #[test]
    fn medium_nine_spills_to_second_page() {
        let assets = AssetLibrary::empty();
        let doc = Compositor::new(&assets).compose(&request(9, PageFormat::Medium));
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.pages[0].slots.len(), 8);
        assert_eq!(doc.pages[1].slots.len(), 1);
        assert_eq!(doc.pages[1].slots[0], slot_rects(PageFormat::Medium)[0]);
        assert_eq!(doc.label_count(), 9);
    }

    #[test]
    fn every_label_is_drawn_identically_relative_to_its_slot() {
        let assets = AssetLibrary::empty();
        let doc = Compositor::new(&assets).compose(&request(2, PageFormat::Medium));
        let page = &doc.pages[0];
        let per_label = page.ops.len() / 2;
        let dx = page.slots[1].x - page.slots[0].x;
        for (a, b) in page.ops[..per_label].iter().zip(&page.ops[per_label..]) {
            match (a, b) {
                (DrawOp::Text { origin: oa, text: ta, .. }, DrawOp::Text { origin: ob, text: tb, .. }) => {
                    assert_eq!(ta, tb);
                    assert!((ob.x - oa.x - dx).abs() < 1e-9);
                    assert!((ob.y - oa.y).abs() < 1e-9);
                }
                _ => assert_eq!(std::mem::discriminant(a), std::mem::discriminant(b)),
            }
        }
    }

    #[test]
    fn invalid_color_renders_white_swatch() {
        let assets = AssetLibrary::empty();
        let mut req = request(1, PageFormat::Large);
        req.label.background_color_hex = "not-a-color".to_string();
        let doc = Compositor::new(&assets).compose(&req);
        assert_eq!(swatches(&doc.pages[0]), vec![Rgb::WHITE]);
    }

    #[test]
    fn swatch_uses_label_color() {
        let assets = AssetLibrary::empty();
        let doc = Compositor::new(&assets).compose(&request(1, PageFormat::Large));
        assert_eq!(swatches(&doc.pages[0])[0].to_hex(), "#FFEB3B");
    }

    #[test]
    fn captions_prefix_values() {
        let assets = AssetLibrary::empty();
        let doc = Compositor::new(&assets).compose(&request(1, PageFormat::Large));
        let t = texts(&doc.pages[0]);
        assert!(t.contains(&"N° remettant : 42"));
        assert!(t.contains(&"Code OMoD : 1001"));
        assert!(t.contains(&"Faculté : FBM"));
        assert!(t.contains(&"Prénom : Léa"));
        assert!(t.contains(&"Date : 16/10/2026"));
        assert!(!t.iter().any(|s| s.starts_with("Données")));
    }

    #[test]
    fn code_is_right_aligned_in_right_half() {
        let assets = AssetLibrary::empty();
        let doc = Compositor::new(&assets).compose(&request(1, PageFormat::Large));
        let slot = doc.pages[0].slots[0];
        let code = doc.pages[0]
            .ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Text { origin, text, align, .. } if text.starts_with("Code OMoD") => {
                    Some((*origin, *align))
                }
                _ => None,
            })
            .unwrap();
        assert_eq!(code.1, Align::Right);
        assert!((code.0.x - (slot.x + 0.95 * slot.width)).abs() < 1e-9);
        assert!((code.0.y - (slot.y + 0.70 * slot.height)).abs() < 1e-9);
    }

    #[test]
    fn notes_block_only_when_present() {
        let assets = AssetLibrary::empty();
        let mut req = request(1, PageFormat::Large);
        req.label.extra_notes = "Contient des traces de mercure. ".repeat(6);
        let doc = Compositor::new(&assets).compose(&req);
        let t = texts(&doc.pages[0]);
        let heading = t.iter().position(|s| *s == "Données supplémentaires :").unwrap();
        let lines = &t[heading + 1..];
        assert!(!lines.is_empty() && lines.len() <= 5);
        assert!(lines.last().unwrap().ends_with("..."));
    }

    #[test]
    fn long_name_prints_two_lines() {
        let assets = AssetLibrary::empty();
        let mut req = request(1, PageFormat::Large);
        req.label.product_name = "Solution de chlorure de sodium et de sulfate de cuivre pentahydraté 0.1 M".to_string();
        let doc = Compositor::new(&assets).compose(&req);
        let centered: Vec<&DrawOp> = doc.pages[0]
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Text { font: Font::HelveticaBold, align: Align::Center, .. }))
            .collect();
        assert_eq!(centered.len(), 2);
    }

    #[test]
    fn missing_images_are_skipped() {
        let mut assets = AssetLibrary::empty();
        assets.insert(AssetKey::Pictogram(Pictogram::Sgh07), pixel());
        let doc = Compositor::new(&assets).compose(&request(1, PageFormat::Large));
        let images: Vec<AssetKey> = doc.assets_used();
        assert_eq!(images, vec![AssetKey::Pictogram(Pictogram::Sgh07)]);
    }

    #[test]
    fn pictograms_capped_at_six_in_three_columns() {
        let mut assets = AssetLibrary::empty();
        for p in Pictogram::ALL {
            assets.insert(AssetKey::Pictogram(p), pixel());
        }
        let mut req = request(1, PageFormat::Large);
        req.label.pictograms = Pictogram::ALL.to_vec();
        let doc = Compositor::new(&assets).compose(&req);
        let rects: Vec<Rect> = doc.pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Image { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect();
        assert_eq!(rects.len(), MAX_PICTOGRAMS);
        let slot = doc.pages[0].slots[0];
        assert!(rects.iter().all(|r| r.x >= slot.x + slot.width / 2.0 && r.x + r.w <= slot.right()));
        assert!((rects[0].y - rects[2].y).abs() < 1e-9);
        assert!(rects[3].y < rects[0].y);
        assert!((rects[3].x - rects[0].x).abs() < 1e-9);
    }

    #[test]
    fn selected_positions_are_used_on_every_page() {
        let assets = AssetLibrary::empty();
        let mut req = request(3, PageFormat::Large);
        req.positions = Some(vec![3, 1, 9]);
        let doc = Compositor::new(&assets).compose(&req);
        let all = slot_rects(PageFormat::Large);
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.pages[0].slots, vec![all[1], all[3]]);
        assert_eq!(doc.pages[1].slots, vec![all[1]]);
    }

    #[test]
    fn render_to_dir_avoids_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("etiquettes_acetone.pdf"), b"old").unwrap();
        let assets = AssetLibrary::empty();
        let compositor = Compositor::new(&assets);
        let path = compositor
            .render_to_dir(&request(1, PageFormat::Large), dir.path(), "etiquettes")
            .unwrap();
        assert_eq!(path.file_name().unwrap(), "etiquettes_acetone_1.pdf");
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert_eq!(std::fs::read(dir.path().join("etiquettes_acetone.pdf")).unwrap(), b"old");
    }

    #[test]
    fn render_to_dir_refuses_empty_layout() {
        let dir = tempfile::tempdir().unwrap();
        let assets = AssetLibrary::empty();
        let compositor = Compositor::new(&assets);

        let err = compositor
            .render_to_dir(&request(0, PageFormat::Large), dir.path(), "etiquettes")
            .unwrap_err();
        assert!(matches!(err, RenderError::EmptySheet { count: 0 }));

        let mut req = request(2, PageFormat::Large);
        req.positions = Some(vec![4, 9]);
        assert!(matches!(
            compositor.render_to_dir(&req, dir.path(), "etiquettes"),
            Err(RenderError::EmptySheet { count: 2 })
        ));
        req.positions = Some(Vec::new());
        assert!(compositor.render_to_dir(&req, dir.path(), "etiquettes").is_err());

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn render_to_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let assets = AssetLibrary::empty();
        let err = Compositor::new(&assets)
            .render_to_dir(&request(1, PageFormat::Large), &dir.path().join("nope"), "etiquettes")
            .unwrap_err();
        assert!(matches!(err, RenderError::ListDir { .. }));
    }
}
