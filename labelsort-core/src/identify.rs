//! Page identifier extraction strategies
//!
//! A label page is identified either by an 18-digit barcode number printed
//! anywhere on the page ([`IdentifierStrategy::FullTextPattern`]) or by the
//! text inside a fixed barcode rectangle
//! ([`IdentifierStrategy::RegionCrop`]). Each strategy owns its
//! normalization; the two are never combined.

use crate::document::PageSource;
use crate::geometry::Region;
use crate::text::extract_region;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Number of digits in a standard label barcode
pub const BARCODE_DIGITS: usize = 18;

/// Where the barcode text sits on an FBA label page
pub const FBA_BARCODE_REGION: Region = Region {
    x0: 325.0,
    top: 846.0,
    x1: 710.0,
    bottom: 870.0,
};

lazy_static! {
    static ref DIGIT_RUN: Regex = Regex::new(r"[0-9]+").unwrap();
}

/// How a page's identifier is read
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum IdentifierStrategy {
    /// First run of exactly 18 digits in the page text
    FullTextPattern,
    /// Whitespace-free, upper-cased text inside a region
    RegionCrop { region: Region },
}

impl IdentifierStrategy {
    /// Read the identifier of page `index`.
    ///
    /// Returns `(raw_text, normalized_identifier)`. Extraction failures
    /// produce empty strings.
    pub fn identify(&self, source: &dyn PageSource, index: usize) -> (String, String) {
        match self {
            IdentifierStrategy::FullTextPattern => {
                let text = extract_region(source, index, None);
                let identifier = first_barcode_run(&text).unwrap_or_default().to_string();
                (text, identifier)
            }
            IdentifierStrategy::RegionCrop { region } => {
                let text = extract_region(source, index, Some(region));
                let identifier = normalize_region_text(&text);
                (text, identifier)
            }
        }
    }

    /// Normalize an already extracted text the way [`identify`](Self::identify) does
    pub fn normalize(&self, text: &str) -> String {
        match self {
            IdentifierStrategy::FullTextPattern => {
                first_barcode_run(text).unwrap_or_default().to_string()
            }
            IdentifierStrategy::RegionCrop { .. } => normalize_region_text(text),
        }
    }
}

/// First run of exactly [`BARCODE_DIGITS`] ASCII digits.
///
/// Longer digit runs are not cut down to 18; they are skipped.
pub fn first_barcode_run(text: &str) -> Option<&str> {
    DIGIT_RUN
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|run| run.len() == BARCODE_DIGITS)
}

/// Remove all whitespace and upper-case
pub fn normalize_region_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Label document layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentType {
    /// Carrier labels with the barcode number in the page text
    #[default]
    Standard,
    /// FBA carton labels with the barcode text in a fixed box
    Fba,
}

impl DocumentType {
    /// The strategy for this layout
    pub fn strategy(self) -> IdentifierStrategy {
        match self {
            DocumentType::Standard => IdentifierStrategy::FullTextPattern,
            DocumentType::Fba => IdentifierStrategy::RegionCrop {
                region: FBA_BARCODE_REGION,
            },
        }
    }

    /// The strategy with the crop region replaced.
    ///
    /// A region override turns any layout into a region crop.
    pub fn strategy_with_region(self, region: Option<Region>) -> IdentifierStrategy {
        match region {
            Some(region) => IdentifierStrategy::RegionCrop { region },
            None => self.strategy(),
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentType::Standard => write!(f, "standard"),
            DocumentType::Fba => write!(f, "fba"),
        }
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(DocumentType::Standard),
            "fba" => Ok(DocumentType::Fba),
            other => Err(format!("unknown document type: {other}")),
        }
    }
}
