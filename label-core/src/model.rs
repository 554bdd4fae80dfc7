use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::text::normalize_text;

/// One row of the product table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    pub regulatory_code: String,
    pub color_hex: String,
    /// Folded form of `name`, see [`normalize_text`].
    pub normalized_name: String,
}

impl ProductRecord {
    pub fn new(
        name: impl Into<String>,
        regulatory_code: impl Into<String>,
        color_hex: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let normalized_name = normalize_text(&name);
        ProductRecord {
            name,
            regulatory_code: regulatory_code.into(),
            color_hex: color_hex.into(),
            normalized_name,
        }
    }
}

/// GHS hazard pictogram.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pictogram {
    #[serde(rename = "SGH01")]
    Sgh01,
    #[serde(rename = "SGH02")]
    Sgh02,
    #[serde(rename = "SGH03")]
    Sgh03,
    #[serde(rename = "SGH04")]
    Sgh04,
    #[serde(rename = "SGH05")]
    Sgh05,
    #[serde(rename = "SGH06")]
    Sgh06,
    #[serde(rename = "SGH07")]
    Sgh07,
    #[serde(rename = "SGH08")]
    Sgh08,
    #[serde(rename = "SGH09")]
    Sgh09,
}

impl Pictogram {
    pub const ALL: [Pictogram; 9] = [
        Pictogram::Sgh01,
        Pictogram::Sgh02,
        Pictogram::Sgh03,
        Pictogram::Sgh04,
        Pictogram::Sgh05,
        Pictogram::Sgh06,
        Pictogram::Sgh07,
        Pictogram::Sgh08,
        Pictogram::Sgh09,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Pictogram::Sgh01 => "SGH01",
            Pictogram::Sgh02 => "SGH02",
            Pictogram::Sgh03 => "SGH03",
            Pictogram::Sgh04 => "SGH04",
            Pictogram::Sgh05 => "SGH05",
            Pictogram::Sgh06 => "SGH06",
            Pictogram::Sgh07 => "SGH07",
            Pictogram::Sgh08 => "SGH08",
            Pictogram::Sgh09 => "SGH09",
        }
    }

    /// Asset file name, e.g. `SGH02.png`.
    pub fn file_name(self) -> String {
        format!("{}.png", self.code())
    }
}

impl fmt::Display for Pictogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Pictogram {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        Pictogram::ALL
            .into_iter()
            .find(|p| {
                p.code().eq_ignore_ascii_case(t)
                    || p.code().replace("SGH", "GHS").eq_ignore_ascii_case(t)
            })
            .ok_or_else(|| format!("unknown pictogram: {t:?}"))
    }
}

/// Label stock layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    /// 140×100 mm, four per A4 landscape page.
    #[default]
    #[serde(alias = "grand")]
    Large,
    /// 96×50.8 mm, eight per A4 portrait page.
    #[serde(alias = "moyen")]
    Medium,
}

impl fmt::Display for PageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageFormat::Large => f.write_str("large (140×100 mm, A4 landscape)"),
            PageFormat::Medium => f.write_str("medium (96×50.8 mm, A4 portrait)"),
        }
    }
}

/// Everything printed on one label.
///
/// Built by [`crate::request::LabelRequest::resolve`], which enforces the
/// required fields; the compositor takes it as-is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelData {
    pub product_name: String,
    pub regulatory_code: String,
    pub faculty: String,
    pub submitter_number: String,
    pub creator_last_name: String,
    pub creator_first_name: String,
    pub date: String,
    pub extra_notes: String,
    pub background_color_hex: String,
    pub pictograms: Vec<Pictogram>,
}
