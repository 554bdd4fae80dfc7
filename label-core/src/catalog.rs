//! Product table loaded from CSV and searched by folded substring.

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::model::ProductRecord;
use crate::text::normalize_text;

/// Color used for rows of a table without a color column.
pub const DEFAULT_COLOR: &str = "#FFFFFF";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read product table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed product table: {0}")]
    Csv(#[from] csv::Error),
    #[error("product table must contain the columns {name:?} and {code:?} (missing {missing:?})")]
    MissingColumn {
        name: String,
        code: String,
        missing: String,
    },
    #[error("product table line {line} has {found} fields, the header has {expected}")]
    MalformedRecord {
        line: u64,
        found: usize,
        expected: usize,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("enter a product name before searching")]
    EmptyQuery,
}

/// Header names of the product table, compared after trimming and lowercasing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub name: String,
    pub code: String,
    pub color: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        ColumnNames {
            name: "nom".to_string(),
            code: "omod".to_string(),
            color: "couleur".to_string(),
        }
    }
}

fn header_key(h: &str) -> String {
    h.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Read-only product table.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    products: Vec<ProductRecord>,
}

impl Catalog {
    pub fn from_records(products: Vec<ProductRecord>) -> Self {
        Catalog { products }
    }

    /// Load a table from a CSV file.
    pub fn load(path: &Path, columns: &ColumnNames) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_reader(file, columns)?;
        tracing::info!(
            path = %path.display(),
            products = catalog.len(),
            "product table loaded"
        );
        Ok(catalog)
    }

    /// Parse CSV with a header row. Rows may be shorter than the header;
    /// missing cells read as empty. A row longer than the header is rejected.
    pub fn from_reader<R: Read>(reader: R, columns: &ColumnNames) -> Result<Self, CatalogError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::None)
            .from_reader(reader);
        let headers: Vec<String> = rdr.headers()?.iter().map(header_key).collect();
        let find = |wanted: &str| {
            let key = header_key(wanted);
            headers.iter().position(|h| *h == key)
        };
        let missing = |which: &str| CatalogError::MissingColumn {
            name: columns.name.clone(),
            code: columns.code.clone(),
            missing: which.to_string(),
        };
        let name_idx = find(&columns.name).ok_or_else(|| missing(&columns.name))?;
        let code_idx = find(&columns.code).ok_or_else(|| missing(&columns.code))?;
        let color_idx = find(&columns.color);
        if color_idx.is_none() {
            tracing::debug!(column = %columns.color, "no color column, using white");
        }

        let mut products = Vec::new();
        for record in rdr.records() {
            let record = record?;
            if record.len() > headers.len() {
                return Err(CatalogError::MalformedRecord {
                    line: record.position().map_or(0, |p| p.line()),
                    found: record.len(),
                    expected: headers.len(),
                });
            }
            let cell = |i: usize| record.get(i).unwrap_or("").to_string();
            let color = match color_idx {
                Some(i) => cell(i),
                None => DEFAULT_COLOR.to_string(),
            };
            products.push(ProductRecord::new(cell(name_idx), cell(code_idx), color));
        }
        Ok(Catalog { products })
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// The whole table, in file order.
    pub fn list_all(&self) -> &[ProductRecord] {
        &self.products
    }

    /// Records whose folded name contains the folded query, in table order.
    pub fn search(&self, query: &str) -> Result<Vec<&ProductRecord>, LookupError> {
        let q = normalize_text(query);
        if q.is_empty() {
            return Err(LookupError::EmptyQuery);
        }
        let hits: Vec<&ProductRecord> = self
            .products
            .iter()
            .filter(|p| p.normalized_name.contains(&q))
            .collect();
        tracing::debug!(query = %q, hits = hits.len(), "catalog search");
        Ok(hits)
    }

    /// First record whose name is exactly `name`.
    pub fn find_by_name(&self, name: &str) -> Option<&ProductRecord> {
        self.products.iter().find(|p| p.name == name)
    }
}
