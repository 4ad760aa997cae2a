//! The label sorting pipeline
//!
//! One run reads the target list, indexes the identifier of every page,
//! assigns targets to pages and assembles the output. The target list is
//! validated before the PDF is touched, so a bad sheet fails fast.

use super::assemble::{AssembleOptions, PageAssembler};
use super::assign::{AssignmentResult, Assigner, EmptyIdentifierPolicy};
use crate::document::LabelDocument;
use crate::error::Result;
use crate::geometry::Region;
use crate::identify::{DocumentType, IdentifierStrategy};
use crate::index::{build_page_index, PageReport};
use crate::targets::{Table, TargetColumns, TargetEntry, TargetList};
use crate::text::{ExtractionOptions, TextExtractor};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Options for a sorting run
#[derive(Debug, Clone, Default)]
pub struct SortOptions {
    /// Label layout, which selects the identifier strategy
    pub document_type: DocumentType,
    /// Crop region replacing the layout's default
    pub region: Option<Region>,
    /// Names of the barcode and carton columns
    pub columns: TargetColumns,
    pub empty_policy: EmptyIdentifierPolicy,
    pub assemble: AssembleOptions,
    pub extraction: ExtractionOptions,
}

impl SortOptions {
    /// The identifier strategy these options select
    pub fn strategy(&self) -> IdentifierStrategy {
        self.document_type.strategy_with_region(self.region)
    }
}

/// Result of a sorting run
#[derive(Debug, Clone, Serialize)]
pub struct SortOutcome {
    /// The sorted PDF
    #[serde(skip)]
    pub pdf: Vec<u8>,
    /// Source page indices in output order
    pub page_order: Vec<usize>,
    /// Targets left without a page
    pub unmatched: Vec<TargetEntry>,
    /// Identifier read from every source page
    pub report: Vec<PageReport>,
    /// Number of pages written
    pub matched: usize,
}

impl SortOutcome {
    fn new(pdf: Vec<u8>, assignment: AssignmentResult, report: Vec<PageReport>) -> Self {
        Self {
            pdf,
            page_order: assignment.page_order(),
            matched: assignment.matched_count(),
            unmatched: assignment.unmatched,
            report,
        }
    }

    pub fn unmatched_identifiers(&self) -> Vec<&str> {
        self.unmatched.iter().map(|t| t.identifier.as_str()).collect()
    }
}

/// Label sorter
#[derive(Debug, Clone, Default)]
pub struct LabelSorter {
    options: SortOptions,
}

impl LabelSorter {
    /// Create a new label sorter
    pub fn new(options: SortOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SortOptions {
        &self.options
    }

    /// Sort `pdf_bytes` into the order given by `table`
    pub fn run(&self, pdf_bytes: &[u8], table: &Table) -> Result<SortOutcome> {
        let targets = TargetList::from_table(table, &self.options.columns)?;
        self.run_with_targets(pdf_bytes, &targets)
    }

    /// Sort `pdf_bytes` into the order of an already built target list
    pub fn run_with_targets(&self, pdf_bytes: &[u8], targets: &TargetList) -> Result<SortOutcome> {
        let document = self.open(pdf_bytes)?;
        let strategy = self.options.strategy();

        let mut pages = build_page_index(&document, &strategy);
        let report: Vec<PageReport> = pages.iter().map(PageReport::from).collect();

        let assignment = Assigner::new(self.options.empty_policy).assign(targets.entries(), &mut pages);
        tracing::info!(
            "Matched {} of {} target(s) across {} page(s)",
            assignment.matched_count(),
            targets.len(),
            pages.len()
        );
        for target in &assignment.unmatched {
            tracing::info!(
                "Unmatched barcode {:?} (carton {:?})",
                target.identifier,
                target.destination_key
            );
        }

        let pdf = PageAssembler::new(self.options.assemble.clone())
            .assemble(document.into_inner(), &assignment.page_order())?;

        Ok(SortOutcome::new(pdf, assignment, report))
    }

    /// Read the identifier of every page without sorting
    pub fn scan(&self, pdf_bytes: &[u8]) -> Result<Vec<PageReport>> {
        let document = self.open(pdf_bytes)?;
        let pages = build_page_index(&document, &self.options.strategy());
        Ok(pages.iter().map(PageReport::from).collect())
    }

    fn open(&self, pdf_bytes: &[u8]) -> Result<LabelDocument> {
        let extractor = TextExtractor::with_options(self.options.extraction.clone());
        Ok(LabelDocument::from_bytes(pdf_bytes)?.with_extractor(extractor))
    }
}

/// Sort a label PDF file by a target table file.
///
/// The output is written through a temporary file next to `output_path` and
/// only moved into place once the run has succeeded.
pub fn sort_label_pdf<P, T, Q>(
    pdf_path: P,
    table_path: T,
    output_path: Q,
    options: SortOptions,
) -> Result<SortOutcome>
where
    P: AsRef<Path>,
    T: AsRef<Path>,
    Q: AsRef<Path>,
{
    let table = Table::from_path(table_path)?;
    let targets = TargetList::from_table(&table, &options.columns)?;

    let pdf_bytes = std::fs::read(pdf_path)?;
    let outcome = LabelSorter::new(options).run_with_targets(&pdf_bytes, &targets)?;

    let output_path = output_path.as_ref();
    let dir = output_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(&outcome.pdf)?;
    file.flush()?;
    file.persist(output_path).map_err(|e| e.error)?;

    tracing::info!("Wrote {}", output_path.display());
    Ok(outcome)
}

#[cfg(test)]
#[path = "sort_tests.rs"]
mod sort_tests;
