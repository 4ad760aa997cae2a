//! # labelsort
//!
//! Reorder the pages of a shipping-label PDF so they follow the barcode order
//! of a spreadsheet.
//!
//! ## Features
//!
//! - **Two identifier strategies**: an 18-digit barcode number anywhere in the
//!   page text, or the text inside a fixed barcode box (FBA labels)
//! - **Spreadsheet input**: `.xlsx`, `.xls`, `.xlsb`, `.ods` and `.csv` target lists
//! - **Greedy one-to-one matching**: sheet order wins, duplicates claim pages
//!   in page order, leftovers are reported rather than failing the run
//! - **Lossless output**: kept pages are copied, not re-rendered
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use labelsort::{sort_label_pdf, DocumentType, SortOptions};
//!
//! # fn main() -> labelsort::Result<()> {
//! let options = SortOptions {
//!     document_type: DocumentType::Fba,
//!     ..Default::default()
//! };
//! let outcome = sort_label_pdf("labels.pdf", "order.xlsx", "sorted.pdf", options)?;
//!
//! println!("{} page(s) written", outcome.matched);
//! for barcode in outcome.unmatched_identifiers() {
//!     println!("not found: {barcode}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Working in memory
//!
//! ```rust,no_run
//! use labelsort::{LabelSorter, SortOptions, Table};
//!
//! # fn main() -> labelsort::Result<()> {
//! let pdf = std::fs::read("labels.pdf")?;
//! let table = Table::from_path("order.csv")?;
//!
//! let outcome = LabelSorter::new(SortOptions::default()).run(&pdf, &table)?;
//! std::fs::write("sorted.pdf", &outcome.pdf)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`document`] - Page access ([`PageSource`]) and the `lopdf` backed [`LabelDocument`]
//! - [`text`] - Content stream interpretation and text layout
//! - [`identify`] - Identifier strategies and their normalization
//! - [`index`] - Per-page identifier index
//! - [`targets`] - Target list loading
//! - [`operations`] - Assignment, assembly and the sorting pipeline

pub mod document;
pub mod error;
pub mod geometry;
pub mod identify;
pub mod index;
pub mod objects;
pub mod operations;
pub mod targets;
pub mod text;

#[cfg(test)]
mod test_support;

pub use document::{LabelDocument, PageSource};
pub use error::{Result, SortError};
pub use geometry::{PageSize, Region};
pub use identify::{DocumentType, IdentifierStrategy, FBA_BARCODE_REGION};
pub use index::{build_page_index, PageRecord, PageReport};
pub use targets::{load_targets, Table, TableFormat, TargetColumns, TargetEntry, TargetList};
pub use text::extract_region;

// Re-export operations
pub use operations::{
    assemble_pdf, assign, sort_label_pdf, AssembleOptions, AssignmentResult, EmptyIdentifierPolicy,
    LabelSorter, PageAssembler, SortOptions, SortOutcome,
};

/// Current version of labelsort
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
