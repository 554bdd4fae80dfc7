//! Label requests as submitted by the operator, and their validation.

use label_categories::WasteCategory;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::compose::SheetRequest;
use crate::model::{LabelData, PageFormat, Pictogram};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("product {0:?} is not in the product table")]
    UnknownProduct(String),
    #[error("enter a product name and an OMoD code, or pick a product from the table")]
    MissingProduct,
    #[error("field {0} is required")]
    MissingField(&'static str),
    #[error("select at least one pictogram")]
    NoPictogram,
    #[error("count must be between 1 and {max} for this format (got {count})")]
    CountOutOfRange { count: usize, max: usize },
    #[error("position {position} does not exist, this format has slots 1 to {max}")]
    PositionOutOfRange { position: usize, max: usize },
    #[error("positions, when given, must list at least one slot")]
    NoPosition,
    #[error(transparent)]
    UnknownCategory(#[from] label_categories::UnknownCategory),
}

/// Where the product name, code and color come from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductChoice {
    /// A row of the product table, by exact name.
    Catalog { name: String },
    /// Typed by hand; the waste category supplies the color.
    Manual {
        name: String,
        code: String,
        category: String,
    },
}

fn default_count() -> usize {
    1
}

/// One generation request, as read from JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRequest {
    pub product: ProductChoice,
    #[serde(default)]
    pub faculty: String,
    #[serde(default)]
    pub submitter_number: String,
    #[serde(default)]
    pub creator_last_name: String,
    #[serde(default)]
    pub creator_first_name: String,
    /// Today is used when absent.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub extra_notes: String,
    #[serde(default)]
    pub pictograms: Vec<Pictogram>,
    #[serde(default)]
    pub format: PageFormat,
    #[serde(default = "default_count")]
    pub count: usize,
    /// 1-based slots to fill on each page.
    #[serde(default)]
    pub positions: Option<Vec<usize>>,
}

impl LabelRequest {
    /// Check the request and build what the compositor needs.
    ///
    /// `today` is the date printed when the request has none.
    pub fn resolve(self, catalog: &Catalog, today: &str) -> Result<SheetRequest, RequestError> {
        let (product_name, regulatory_code, background_color_hex) = match self.product {
            ProductChoice::Catalog { name } => {
                let record = catalog
                    .find_by_name(&name)
                    .ok_or(RequestError::UnknownProduct(name))?;
                (
                    record.name.clone(),
                    record.regulatory_code.clone(),
                    record.color_hex.clone(),
                )
            }
            ProductChoice::Manual {
                name,
                code,
                category,
            } => {
                if name.trim().is_empty() || code.trim().is_empty() {
                    return Err(RequestError::MissingProduct);
                }
                let category: WasteCategory = category.parse()?;
                (
                    name.trim().to_string(),
                    code.trim().to_string(),
                    category.color_hex().to_string(),
                )
            }
        };

        let date = self
            .date
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| today.to_string());
        for (field, value) in [
            ("faculty", &self.faculty),
            ("creator_last_name", &self.creator_last_name),
            ("creator_first_name", &self.creator_first_name),
            ("date", &date),
        ] {
            if value.trim().is_empty() {
                return Err(RequestError::MissingField(field));
            }
        }

        let mut pictograms: Vec<Pictogram> = Vec::with_capacity(self.pictograms.len());
        for p in self.pictograms {
            if !pictograms.contains(&p) {
                pictograms.push(p);
            }
        }
        if pictograms.is_empty() {
            return Err(RequestError::NoPictogram);
        }

        let max = self.format.max_labels();
        if !(1..=max).contains(&self.count) {
            return Err(RequestError::CountOutOfRange {
                count: self.count,
                max,
            });
        }
        let positions = match self.positions {
            None => None,
            Some(p) if p.is_empty() => return Err(RequestError::NoPosition),
            Some(p) => {
                let mut slots = Vec::with_capacity(p.len());
                for position in p {
                    if !(1..=max).contains(&position) {
                        return Err(RequestError::PositionOutOfRange { position, max });
                    }
                    slots.push(position - 1);
                }
                slots.sort_unstable();
                slots.dedup();
                Some(slots)
            }
        };

        tracing::debug!(
            product = %product_name,
            count = self.count,
            format = ?self.format,
            "label request resolved"
        );
        Ok(SheetRequest {
            label: LabelData {
                product_name,
                regulatory_code,
                faculty: self.faculty.trim().to_string(),
                submitter_number: self.submitter_number.trim().to_string(),
                creator_last_name: self.creator_last_name.trim().to_string(),
                creator_first_name: self.creator_first_name.trim().to_string(),
                date: date.trim().to_string(),
                extra_notes: self.extra_notes,
                background_color_hex,
                pictograms,
            },
            count: self.count,
            format: self.format,
            positions,
        })
    }
}
