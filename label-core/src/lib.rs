//! Chemical-waste label sheets: product lookup, label layout and PDF output.
//!
//! A [`Catalog`] answers product searches. A [`LabelRequest`] is resolved
//! against it into a [`SheetRequest`], which the [`Compositor`] lays out on
//! A4 pages and writes as a PDF.

pub mod assets;
pub mod catalog;
pub mod color;
pub mod compose;
pub mod metrics;
pub mod model;
pub mod naming;
pub mod pdf;
pub mod request;
pub mod sheet;
pub mod svg;
pub mod text;

pub use assets::{AssetError, AssetKey, AssetLibrary, RasterImage};
pub use catalog::{Catalog, CatalogError, ColumnNames, LookupError};
pub use color::Rgb;
pub use compose::{Captions, Compositor, Document, DrawOp, PageDrawing, RenderError, SheetRequest};
pub use model::{LabelData, PageFormat, Pictogram, ProductRecord};
pub use naming::{DEFAULT_PREFIX, allocate_output_name};
pub use request::{LabelRequest, ProductChoice, RequestError};
pub use sheet::{LabelSlot, slot_rects};
pub use text::normalize_text;
