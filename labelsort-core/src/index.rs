//! Per-page identifier index

use crate::document::PageSource;
use crate::identify::IdentifierStrategy;
use serde::Serialize;

/// One source page and the identifier read from it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageRecord {
    /// 0-based page position in the source document
    pub page_index: usize,
    /// Text the strategy extracted before normalization
    pub raw_text: String,
    /// Identifier compared against targets; empty when none was found
    pub normalized_identifier: String,
    /// Set once the page has been assigned to a target
    #[serde(skip)]
    pub consumed: bool,
}

impl PageRecord {
    pub fn new(page_index: usize, raw_text: String, normalized_identifier: String) -> Self {
        Self {
            page_index,
            raw_text,
            normalized_identifier,
            consumed: false,
        }
    }

    pub fn has_identifier(&self) -> bool {
        !self.normalized_identifier.is_empty()
    }
}

/// Diagnostic line: which identifier was read from which page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageReport {
    /// 0-based page index
    pub page_index: usize,
    pub identifier: String,
}

impl From<&PageRecord> for PageReport {
    fn from(record: &PageRecord) -> Self {
        Self {
            page_index: record.page_index,
            identifier: record.normalized_identifier.clone(),
        }
    }
}

/// Read the identifier of every page, in page order
pub fn build_page_index(source: &dyn PageSource, strategy: &IdentifierStrategy) -> Vec<PageRecord> {
    (0..source.page_count())
        .map(|index| {
            let (raw_text, identifier) = strategy.identify(source, index);
            tracing::debug!("Page {} -> {:?}", index + 1, identifier);
            PageRecord::new(index, raw_text, identifier)
        })
        .collect()
}
