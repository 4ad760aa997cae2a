//! PDF text layer: glyph decoding, placement and layout

mod cmap;
mod encoding;
mod extraction;
mod font;
mod region;

pub use cmap::{CMap, CodeRange};
pub use encoding::TextEncoding;
pub use extraction::{ExtractionOptions, TextChar, TextExtractor};
pub use font::{FontDecoder, Glyph};
pub use region::extract_region;
