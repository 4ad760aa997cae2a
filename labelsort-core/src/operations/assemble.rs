//! Output document assembly
//!
//! Builds the sorted PDF from the source document: the kept pages are
//! re-parented under a fresh, flat page tree in output order and everything
//! no longer reachable is pruned.

use crate::error::{Result, SortError};
use chrono::{DateTime, Utc};
use lopdf::{dictionary, Document, Object, ObjectId};
use std::collections::HashSet;

/// Page attributes a page may inherit from its ancestors
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Catalog entries that point into the old page order
const STALE_CATALOG_KEYS: [&[u8]; 3] = [b"Outlines", b"PageLabels", b"OpenAction"];

const PRODUCER: &str = concat!("labelsort ", env!("CARGO_PKG_VERSION"));

/// Options for page assembly
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Keep the document information dictionary (stamped with a new
    /// modification date and producer)
    pub preserve_metadata: bool,
    /// Compress uncompressed streams in the output
    pub compress: bool,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            preserve_metadata: true,
            compress: false,
        }
    }
}

/// Page assembler
#[derive(Debug, Clone, Default)]
pub struct PageAssembler {
    options: AssembleOptions,
}

impl PageAssembler {
    /// Create a new page assembler
    pub fn new(options: AssembleOptions) -> Self {
        Self { options }
    }

    /// Keep the pages named by `page_order` (0-based source indices), in that
    /// order, and serialize the result
    pub fn assemble(&self, doc: Document, page_order: &[usize]) -> Result<Vec<u8>> {
        let mut doc = self.assemble_document(doc, page_order)?;
        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)?;
        Ok(buffer)
    }

    /// Rebuild `doc` so that it holds exactly the pages in `page_order`
    pub fn assemble_document(&self, mut doc: Document, page_order: &[usize]) -> Result<Document> {
        let source_pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        self.validate_page_order(page_order, source_pages.len())?;

        let pages_id = doc.new_object_id();
        let mut seen = HashSet::new();
        let mut kids = Vec::with_capacity(page_order.len());

        for &index in page_order {
            let source_id = source_pages[index];
            let mut page = doc.get_dictionary(source_id)?.clone();

            for key in INHERITABLE_KEYS {
                if !page.has(key) {
                    if let Some(value) = inherited_value(&doc, source_id, key) {
                        page.set(key, value);
                    }
                }
            }
            page.set("Parent", pages_id);

            // A page listed twice gets its own page object the second time
            let page_id = if seen.insert(source_id) {
                source_id
            } else {
                doc.new_object_id()
            };
            doc.objects.insert(page_id, Object::Dictionary(page));
            kids.push(Object::Reference(page_id));
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => kids.len() as i64,
                "Kids" => kids,
            }),
        );

        let root_id = doc.trailer.get(b"Root")?.as_reference()?;
        let catalog = doc.get_object_mut(root_id)?.as_dict_mut()?;
        catalog.set("Pages", pages_id);
        for key in STALE_CATALOG_KEYS {
            catalog.remove(key);
        }

        if self.options.preserve_metadata {
            stamp_info(&mut doc, Utc::now());
        } else {
            doc.trailer.remove(b"Info");
        }

        let pruned = doc.prune_objects();
        tracing::debug!(
            "Assembled {} page(s), pruned {} object(s)",
            page_order.len(),
            pruned.len()
        );

        if self.options.compress {
            doc.compress();
        }

        Ok(doc)
    }

    /// Validate that every index names a source page
    fn validate_page_order(&self, page_order: &[usize], total_pages: usize) -> Result<()> {
        match page_order.iter().find(|&&idx| idx >= total_pages) {
            Some(&idx) => Err(SortError::PageIndexOutOfBounds(idx, total_pages)),
            None => Ok(()),
        }
    }
}

/// Nearest value of `key` on the page or its ancestors, unresolved so shared
/// resources stay shared
fn inherited_value(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..32 {
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        let parent_id = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent_id).ok()?;
    }
    None
}

/// Set `/ModDate` and `/Producer` on the information dictionary
fn stamp_info(doc: &mut Document, now: DateTime<Utc>) {
    let date = Object::string_literal(format_pdf_date(now));
    let producer = Object::string_literal(PRODUCER);

    let info_id = match doc.trailer.get(b"Info").and_then(Object::as_reference) {
        Ok(id) => id,
        Err(_) => {
            let id = doc.add_object(dictionary! {});
            doc.trailer.set("Info", id);
            id
        }
    };

    match doc.get_object_mut(info_id).and_then(Object::as_dict_mut) {
        Ok(info) => {
            info.set("ModDate", date);
            info.set("Producer", producer);
        }
        Err(e) => tracing::warn!("Document information dictionary is unusable: {e}"),
    }
}

/// Format a DateTime as a PDF date string (D:YYYYMMDDHHmmSSOHH'mm)
fn format_pdf_date(date: DateTime<Utc>) -> String {
    let formatted = date.format("D:%Y%m%d%H%M%S");
    format!("{formatted}+00'00")
}

/// Assemble the sorted PDF straight from source bytes
pub fn assemble_pdf(pdf_bytes: &[u8], page_order: &[usize], options: AssembleOptions) -> Result<Vec<u8>> {
    let doc = Document::load_mem(pdf_bytes)?;
    PageAssembler::new(options).assemble(doc, page_order)
}


#[cfg(test)]
#[path = "assemble_tests.rs"]
mod assemble_tests;
