//! Font decoding and glyph metrics for text extraction

use super::cmap::CMap;
use super::encoding::{glyph_name_to_char, TextEncoding};
use crate::objects::{self, as_number};
use lopdf::{Dictionary, Document, Object};
use std::collections::HashMap;

/// Advance width (in 1/1000 em) assumed when a font gives none
const DEFAULT_WIDTH: f64 = 500.0;
/// Advance width of the Courier family
const COURIER_WIDTH: f64 = 600.0;
/// Highest character code or CID a width table may name
const MAX_CODE: u32 = 0xFFFF;

/// One decoded glyph from a string operand
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// Unicode text for the glyph (empty when the code is unmapped)
    pub text: String,
    /// Horizontal advance in em units (width / 1000)
    pub advance: f64,
    /// Single-byte code 32, which receives word spacing
    pub is_space: bool,
}

#[derive(Debug, Clone)]
enum FontKind {
    /// Single-byte font with a base encoding and `/Differences`
    Simple {
        encoding: TextEncoding,
        differences: HashMap<u8, char>,
    },
    /// Type0 font with two-byte codes
    Composite,
}

/// Everything extraction needs to know about a font resource
#[derive(Debug, Clone)]
pub struct FontDecoder {
    kind: FontKind,
    to_unicode: Option<CMap>,
    widths: HashMap<u32, f64>,
    default_width: f64,
    /// FontDescriptor `/Descent` in em units (usually negative)
    pub descent: f64,
}

impl Default for FontDecoder {
    fn default() -> Self {
        Self {
            kind: FontKind::Simple {
                encoding: TextEncoding::WinAnsiEncoding,
                differences: HashMap::new(),
            },
            to_unicode: None,
            widths: HashMap::new(),
            default_width: DEFAULT_WIDTH,
            descent: 0.0,
        }
    }
}

impl FontDecoder {
    /// Build a decoder from a font dictionary
    pub fn from_dict(doc: &Document, font: &Dictionary) -> Self {
        let mut decoder = FontDecoder::default();

        let base_font = objects::get_name(doc, font, b"BaseFont").unwrap_or_default();
        if base_font
            .windows(b"Courier".len())
            .any(|w| w == b"Courier")
        {
            decoder.default_width = COURIER_WIDTH;
        }

        if let Some(Object::Stream(stream)) = objects::get(doc, font, b"ToUnicode") {
            decoder.to_unicode = Some(CMap::parse(&objects::stream_data(stream)));
        }

        let subtype = objects::get_name(doc, font, b"Subtype").unwrap_or_default();
        if subtype == b"Type0" {
            decoder.kind = FontKind::Composite;
            let descendant = objects::get_array(doc, font, b"DescendantFonts")
                .and_then(|fonts| fonts.first())
                .and_then(|first| objects::resolve(doc, first))
                .and_then(|obj| match obj {
                    Object::Dictionary(d) => Some(d),
                    _ => None,
                });
            if let Some(cid_font) = descendant {
                decoder.default_width = objects::get_number(doc, cid_font, b"DW").unwrap_or(1000.0);
                if let Some(w) = objects::get_array(doc, cid_font, b"W") {
                    decoder.widths = parse_cid_widths(doc, w);
                }
                decoder.descent = read_descent(doc, cid_font);
            }
        } else {
            decoder.kind = simple_kind(doc, font);
            decoder.widths = parse_simple_widths(doc, font);
            decoder.descent = read_descent(doc, font);
        }

        decoder
    }

    /// Decode a string operand into glyphs
    pub fn decode(&self, bytes: &[u8]) -> Vec<Glyph> {
        match &self.kind {
            FontKind::Simple {
                encoding,
                differences,
            } => bytes
                .iter()
                .map(|&byte| {
                    let text = self
                        .to_unicode
                        .as_ref()
                        .and_then(|cmap| cmap.lookup(&[byte]))
                        .or_else(|| differences.get(&byte).map(|c| c.to_string()))
                        .unwrap_or_else(|| encoding.decode_byte(byte).to_string());
                    Glyph {
                        text,
                        advance: self.width(byte as u32),
                        is_space: byte == b' ',
                    }
                })
                .collect(),
            FontKind::Composite => match &self.to_unicode {
                Some(cmap) => cmap
                    .decode(bytes)
                    .into_iter()
                    .map(|(code, text)| {
                        let value = code.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32);
                        Glyph {
                            text: text.unwrap_or_default(),
                            advance: self.width(value),
                            is_space: false,
                        }
                    })
                    .collect(),
                None => bytes
                    .chunks(2)
                    .map(|pair| {
                        let value = pair.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32);
                        Glyph {
                            text: char::from_u32(value)
                                .filter(|c| !c.is_control())
                                .map(String::from)
                                .unwrap_or_default(),
                            advance: self.width(value),
                            is_space: false,
                        }
                    })
                    .collect(),
            },
        }
    }

    fn width(&self, code: u32) -> f64 {
        self.widths.get(&code).copied().unwrap_or(self.default_width) / 1000.0
    }
}

fn simple_kind(doc: &Document, font: &Dictionary) -> FontKind {
    let mut encoding = TextEncoding::WinAnsiEncoding;
    let mut differences = HashMap::new();

    match objects::get(doc, font, b"Encoding") {
        Some(Object::Name(name)) => {
            encoding = TextEncoding::from_name(name).unwrap_or(encoding);
        }
        Some(Object::Dictionary(dict)) => {
            if let Some(base) = objects::get_name(doc, dict, b"BaseEncoding") {
                encoding = TextEncoding::from_name(base).unwrap_or(encoding);
            }
            if let Some(items) = objects::get_array(doc, dict, b"Differences") {
                differences = parse_differences(items);
            }
        }
        _ => {}
    }

    FontKind::Simple {
        encoding,
        differences,
    }
}

/// `[code /name /name code /name ...]`
fn parse_differences(items: &[Object]) -> HashMap<u8, char> {
    let mut map = HashMap::new();
    let mut code: i64 = 0;
    for item in items {
        match item {
            Object::Integer(start) => code = *start,
            Object::Name(name) => {
                if let (Ok(byte), Some(c)) = (
                    u8::try_from(code),
                    glyph_name_to_char(&String::from_utf8_lossy(name)),
                ) {
                    map.insert(byte, c);
                }
                code = code.saturating_add(1);
            }
            _ => {}
        }
    }
    map
}

fn parse_simple_widths(doc: &Document, font: &Dictionary) -> HashMap<u32, f64> {
    let first = match objects::get_number(doc, font, b"FirstChar") {
        Some(value) => match code_from(value) {
            Some(code) => code,
            None => return HashMap::new(),
        },
        None => 0,
    };
    objects::get_array(doc, font, b"Widths")
        .map(|widths| {
            widths
                .iter()
                .enumerate()
                .filter_map(|(i, w)| {
                    let code = offset_code(first, i)?;
                    objects::resolve(doc, w)
                        .and_then(as_number)
                        .map(|w| (code, w))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// `/W` array: `c [w1 w2 ...]` or `c_first c_last w`.
///
/// Codes outside `0..=0xFFFF` are dropped and ranges are clipped to it.
fn parse_cid_widths(doc: &Document, items: &[Object]) -> HashMap<u32, f64> {
    let mut widths = HashMap::new();
    let mut i = 0;
    while i < items.len() {
        let Some(start) = objects::resolve(doc, &items[i]).and_then(as_number) else {
            break;
        };
        match items.get(i + 1).and_then(|next| objects::resolve(doc, next)) {
            Some(Object::Array(list)) => {
                if let Some(first) = code_from(start) {
                    for (offset, w) in list.iter().enumerate() {
                        let (Some(code), Some(w)) = (offset_code(first, offset), as_number(w)) else {
                            continue;
                        };
                        widths.insert(code, w);
                    }
                }
                i += 2;
            }
            Some(end) => {
                let (Some(end), Some(w)) = (
                    as_number(end),
                    items
                        .get(i + 2)
                        .and_then(|w| objects::resolve(doc, w))
                        .and_then(as_number),
                ) else {
                    break;
                };
                let first = start.max(0.0);
                let last = end.min(MAX_CODE as f64);
                if first <= last {
                    for cid in first as u32..=last as u32 {
                        widths.insert(cid, w);
                    }
                }
                i += 3;
            }
            None => break,
        }
    }
    widths
}

/// A width-table code, if it lies in `0..=0xFFFF`
fn code_from(value: f64) -> Option<u32> {
    (0.0..=MAX_CODE as f64)
        .contains(&value)
        .then_some(value as u32)
}

/// `first + offset`, if it is still a valid code
fn offset_code(first: u32, offset: usize) -> Option<u32> {
    u32::try_from(offset)
        .ok()
        .and_then(|offset| first.checked_add(offset))
        .filter(|&code| code <= MAX_CODE)
}

fn read_descent(doc: &Document, font: &Dictionary) -> f64 {
    objects::get_dict(doc, font, b"FontDescriptor")
        .and_then(|descriptor| objects::get_number(doc, descriptor, b"Descent"))
        .map(|d| d / 1000.0)
        .unwrap_or(0.0)
}
