//! Paginated label documents
//!
//! [`PageSource`] is the seam between identifier extraction and the PDF
//! library: the page index only ever asks for page counts, sizes and text.
//! [`LabelDocument`] implements it on top of `lopdf`.

use crate::error::{Result, SortError};
use crate::geometry::{PageSize, Region};
use crate::objects;
use crate::text::{TextChar, TextExtractor};
use lopdf::{Document, Object, ObjectId};
use std::path::Path;

/// Read access to the pages of a document
pub trait PageSource {
    /// Number of pages
    fn page_count(&self) -> usize;

    /// Size of the page box of page `index` (0-based)
    fn page_size(&self, index: usize) -> Result<PageSize>;

    /// All text on the page, laid out line by line
    fn page_text(&self, index: usize) -> Result<String>;

    /// Text whose glyphs lie entirely inside `region`
    fn region_text(&self, index: usize, region: &Region) -> Result<String>;
}

/// A loaded shipping-label PDF
pub struct LabelDocument {
    doc: Document,
    page_ids: Vec<ObjectId>,
    extractor: TextExtractor,
}

impl LabelDocument {
    /// Parse a PDF from memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self::from_document(Document::load_mem(bytes)?))
    }

    /// Open a PDF file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_document(doc: Document) -> Self {
        let page_ids = doc.get_pages().into_values().collect();
        Self {
            doc,
            page_ids,
            extractor: TextExtractor::new(),
        }
    }

    /// Use a custom text extractor
    pub fn with_extractor(mut self, extractor: TextExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// The underlying `lopdf` document
    pub fn inner(&self) -> &Document {
        &self.doc
    }

    pub fn into_inner(self) -> Document {
        self.doc
    }

    /// Object id of page `index`
    pub fn page_id(&self, index: usize) -> Result<ObjectId> {
        self.page_ids
            .get(index)
            .copied()
            .ok_or(SortError::PageIndexOutOfBounds(index, self.page_ids.len()))
    }

    /// `[llx, lly, urx, ury]` of the page's MediaBox, normalized so
    /// `llx <= urx` and `lly <= ury`
    fn media_box(&self, index: usize) -> Result<[f64; 4]> {
        let page = self.doc.get_dictionary(self.page_id(index)?)?;
        let media_box = match objects::get_inherited(&self.doc, page, b"MediaBox") {
            Some(Object::Array(items)) => objects::number_array(&self.doc, items)
                .filter(|values| values.len() == 4)
                .map(|v| [v[0].min(v[2]), v[1].min(v[3]), v[0].max(v[2]), v[1].max(v[3])]),
            _ => None,
        };

        Ok(media_box.unwrap_or_else(|| {
            let letter = PageSize::letter();
            [0.0, 0.0, letter.width, letter.height]
        }))
    }

    /// Every placed glyph on page `index`
    pub fn chars(&self, index: usize) -> Result<Vec<TextChar>> {
        let page_id = self.page_id(index)?;
        let media_box = self.media_box(index)?;
        let page = self.doc.get_dictionary(page_id)?;

        let resources = match objects::get_inherited(&self.doc, page, b"Resources") {
            Some(Object::Dictionary(dict)) => Some(dict),
            _ => None,
        };
        let content = self.doc.get_page_content(page_id)?;

        self.extractor
            .extract_chars(&self.doc, &content, resources, media_box)
    }
}

impl PageSource for LabelDocument {
    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page_size(&self, index: usize) -> Result<PageSize> {
        let [llx, lly, urx, ury] = self.media_box(index)?;
        Ok(PageSize::new(urx - llx, ury - lly))
    }

    fn page_text(&self, index: usize) -> Result<String> {
        let chars = self.chars(index)?;
        Ok(self.extractor.chars_to_text(&chars))
    }

    fn region_text(&self, index: usize, region: &Region) -> Result<String> {
        let chars = self.chars(index)?;
        Ok(self
            .extractor
            .chars_to_text(chars.iter().filter(|c| region.contains(&c.bbox))))
    }
}
