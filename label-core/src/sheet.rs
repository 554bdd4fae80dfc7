//! Page geometry: label slots on A4 sheets and how labels are spread over pages.
//!
//! Slots are expressed in PDF points with the origin at the bottom-left
//! corner of the page. The grid itself is specified in millimeters from the
//! top-left corner, the way label stock is measured.

use serde::{Deserialize, Serialize};

use crate::model::PageFormat;

pub const PT_PER_MM: f64 = 72.0 / 25.4;
pub const A4_SHORT_MM: f64 = 210.0;
pub const A4_LONG_MM: f64 = 297.0;

pub fn mm_to_pt(mm: f64) -> f64 {
    mm * PT_PER_MM
}

/// Fixed grid of one page format, in millimeters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SheetGeometry {
    pub page_w_mm: f64,
    pub page_h_mm: f64,
    pub cols: usize,
    pub rows: usize,
    pub label_w_mm: f64,
    pub label_h_mm: f64,
    /// Left edge of the first column.
    pub x_start_mm: f64,
    /// Top edge of the first row.
    pub y_start_mm: f64,
    pub x_gap_mm: f64,
    pub y_gap_mm: f64,
}

impl PageFormat {
    pub fn geometry(self) -> SheetGeometry {
        match self {
            // The second row ends 10 mm below the landscape sheet; kept for
            // compatibility with sheets printed by earlier versions.
            PageFormat::Large => SheetGeometry {
                page_w_mm: A4_LONG_MM,
                page_h_mm: A4_SHORT_MM,
                cols: 2,
                rows: 2,
                label_w_mm: 140.0,
                label_h_mm: 100.0,
                x_start_mm: 5.0,
                y_start_mm: 10.0,
                x_gap_mm: 10.0,
                y_gap_mm: 10.0,
            },
            PageFormat::Medium => SheetGeometry {
                page_w_mm: A4_SHORT_MM,
                page_h_mm: A4_LONG_MM,
                cols: 2,
                rows: 4,
                label_w_mm: 96.0,
                label_h_mm: 50.8,
                x_start_mm: 10.0,
                y_start_mm: 10.0,
                x_gap_mm: 5.0,
                y_gap_mm: 5.0,
            },
        }
    }

    /// Labels per page.
    pub fn max_labels(self) -> usize {
        let g = self.geometry();
        g.cols * g.rows
    }

    /// Page size in points.
    pub fn page_size_pt(self) -> (f64, f64) {
        let g = self.geometry();
        (mm_to_pt(g.page_w_mm), mm_to_pt(g.page_h_mm))
    }
}

/// Rectangle occupied by one label on a page, in points, bottom-left origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelSlot {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LabelSlot {
    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// All slots of a page, left to right then top to bottom.
pub fn slot_rects(format: PageFormat) -> Vec<LabelSlot> {
    let g = format.geometry();
    let page_h = mm_to_pt(g.page_h_mm);
    let (w, h) = (mm_to_pt(g.label_w_mm), mm_to_pt(g.label_h_mm));
    let mut slots = Vec::with_capacity(g.cols * g.rows);
    for row in 0..g.rows {
        for col in 0..g.cols {
            let left = mm_to_pt(g.x_start_mm + col as f64 * (g.label_w_mm + g.x_gap_mm));
            let top = mm_to_pt(g.y_start_mm + row as f64 * (g.label_h_mm + g.y_gap_mm));
            slots.push(LabelSlot {
                x: left,
                y: page_h - top - h,
                width: w,
                height: h,
            });
        }
    }
    slots
}

/// Slot indices used on each page for `count` labels.
///
/// `usable` lists the 0-based slot indices a page may use, in fill order.
/// Every page but the last is full.
pub fn paginate(count: usize, usable: &[usize]) -> Vec<Vec<usize>> {
    if usable.is_empty() {
        return Vec::new();
    }
    let mut pages = Vec::new();
    let mut remaining = count;
    while remaining > 0 {
        let n = remaining.min(usable.len());
        pages.push(usable[..n].to_vec());
        remaining -= n;
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn large_grid_is_two_by_two() {
        let slots = slot_rects(PageFormat::Large);
        assert_eq!(slots.len(), 4);
        let (_, page_h) = PageFormat::Large.page_size_pt();
        for s in &slots {
            assert!(close(s.width, mm_to_pt(140.0)));
            assert!(close(s.height, mm_to_pt(100.0)));
        }
        // top-left slot: 5 mm from the left, 10 mm from the top
        assert!(close(slots[0].x, mm_to_pt(5.0)));
        assert!(close(slots[0].top(), page_h - mm_to_pt(10.0)));
        // same row, one label plus one gap to the right
        assert!(close(slots[1].x, mm_to_pt(155.0)));
        assert!(close(slots[1].y, slots[0].y));
        // next row, one label plus one gap lower
        assert!(close(slots[2].x, slots[0].x));
        assert!(close(slots[0].y - slots[2].y, mm_to_pt(110.0)));
    }

    #[test]
    fn medium_grid_is_two_by_four() {
        let slots = slot_rects(PageFormat::Medium);
        assert_eq!(slots.len(), 8);
        assert_eq!(PageFormat::Medium.max_labels(), 8);
        let (page_w, page_h) = PageFormat::Medium.page_size_pt();
        assert!(close(page_w, mm_to_pt(210.0)));
        assert!(close(page_h, mm_to_pt(297.0)));
        for s in &slots {
            assert!(close(s.width, mm_to_pt(96.0)));
            assert!(close(s.height, mm_to_pt(50.8)));
            assert!(s.y >= 0.0 && s.right() <= page_w);
        }
        assert!(close(slots[1].x - slots[0].x, mm_to_pt(101.0)));
        assert!(close(slots[0].y - slots[2].y, mm_to_pt(55.8)));
        assert!(close(slots[7].y, page_h - mm_to_pt(10.0 + 3.0 * 55.8 + 50.8)));
    }

    #[test]
    fn pagination_fills_pages_in_order() {
        let all: Vec<usize> = (0..8).collect();
        let pages = paginate(9, &all);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0], all);
        assert_eq!(pages[1], vec![0]);
        assert_eq!(paginate(4, &[0, 1, 2, 3]).len(), 1);
        assert!(paginate(0, &all).is_empty());
    }

    #[test]
    fn pagination_with_selected_positions() {
        let pages = paginate(3, &[1, 3]);
        assert_eq!(pages, vec![vec![1, 3], vec![1]]);
        assert!(paginate(3, &[]).is_empty());
    }
}
