use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Waste category chosen for a manually entered product.
///
/// The category only drives the background color behind the product name;
/// catalog products carry their own color instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WasteCategory {
    Acid,
    Base,
    HeavyMetals,
    Halogenated,
    AqueousSolution,
    NonHalogenated,
}

// (category, key, printed label, ascii alias, color)
const CATEGORIES: [(WasteCategory, &str, &str, &str, &str); 6] = [
    (WasteCategory::Acid, "acid", "Acide", "acide", "#D32F2F"),
    (WasteCategory::Base, "base", "Base", "base", "#64B5F6"),
    (
        WasteCategory::HeavyMetals,
        "heavy_metals",
        "Métaux lourds",
        "metaux lourds",
        "#E0E0E0",
    ),
    (
        WasteCategory::Halogenated,
        "halogenated",
        "Halogéné",
        "halogene",
        "#FFEB3B",
    ),
    (
        WasteCategory::AqueousSolution,
        "aqueous_solution",
        "Solution aqueuse",
        "solution aqueuse",
        "#D7BDE2",
    ),
    (
        WasteCategory::NonHalogenated,
        "non_halogenated",
        "Non halogéné",
        "non halogene",
        "#A5D6A7",
    ),
];

impl WasteCategory {
    pub const ALL: [WasteCategory; 6] = [
        WasteCategory::Acid,
        WasteCategory::Base,
        WasteCategory::HeavyMetals,
        WasteCategory::Halogenated,
        WasteCategory::AqueousSolution,
        WasteCategory::NonHalogenated,
    ];

    fn entry(self) -> &'static (WasteCategory, &'static str, &'static str, &'static str, &'static str) {
        // Rows follow declaration order.
        &CATEGORIES[self as usize]
    }

    /// Stable machine key, e.g. `heavy_metals`.
    pub fn key(self) -> &'static str {
        self.entry().1
    }

    /// Label shown to the operator.
    pub fn label(self) -> &'static str {
        self.entry().2
    }

    /// Background color as `#RRGGBB`.
    pub fn color_hex(self) -> &'static str {
        self.entry().4
    }
}

impl fmt::Display for WasteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown waste category: {0:?}")]
pub struct UnknownCategory(pub String);

impl FromStr for WasteCategory {
    type Err = UnknownCategory;

    /// Accepts the machine key, the printed label or its unaccented form,
    /// ignoring case and surrounding whitespace. `-` and `_` count as spaces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['_', '-'], " ");
        CATEGORIES
            .iter()
            .find(|(_, key, label, alias, _)| {
                key.replace('_', " ") == wanted || label.to_lowercase() == wanted || *alias == wanted
            })
            .map(|row| row.0)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
