//! ToUnicode CMap support for text extraction
//!
//! Implements the subset of ISO 32000-1:2008 Section 9.10.3 that text
//! extraction needs: code space ranges, `bfchar` and `bfrange` mappings.
//! Destination values are UTF-16BE.

use std::collections::HashMap;

/// Character code range
#[derive(Debug, Clone, PartialEq)]
pub struct CodeRange {
    /// Start of the code range
    pub start: Vec<u8>,
    /// End of the code range
    pub end: Vec<u8>,
}

impl CodeRange {
    /// Check if a code is within this range
    pub fn contains(&self, code: &[u8]) -> bool {
        if code.len() != self.start.len() || code.len() != self.end.len() {
            return false;
        }

        code >= &self.start[..] && code <= &self.end[..]
    }
}

/// Range mapping; `bfchar` entries live in the lookup table instead
#[derive(Debug, Clone)]
struct RangeEntry {
    src_start: Vec<u8>,
    src_end: Vec<u8>,
    dst: RangeDestination,
}

#[derive(Debug, Clone)]
enum RangeDestination {
    /// `<start> <end> <dst>`: consecutive codes map to consecutive values
    Offset(Vec<u16>),
    /// `<start> <end> [<d0> <d1> ...]`: one value per code
    List(Vec<Vec<u16>>),
}

/// Parsed ToUnicode CMap
#[derive(Debug, Clone, Default)]
pub struct CMap {
    /// Code space ranges
    pub codespace_ranges: Vec<CodeRange>,
    ranges: Vec<RangeEntry>,
    single_mappings: HashMap<Vec<u8>, Vec<u16>>,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Hex(Vec<u8>),
    ArrayStart,
    ArrayEnd,
    Word(String),
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    None,
    CodeSpace,
    BfChar,
    BfRange,
}

impl CMap {
    /// Parse a ToUnicode CMap stream.
    ///
    /// Unknown operators and malformed entries are skipped, so a damaged
    /// CMap still yields whatever mappings could be read.
    pub fn parse(data: &[u8]) -> Self {
        let mut cmap = Self::default();
        let tokens = tokenize(data);
        let mut section = Section::None;
        let mut i = 0;

        while i < tokens.len() {
            match &tokens[i] {
                Token::Word(word) => {
                    section = match word.as_str() {
                        "begincodespacerange" => Section::CodeSpace,
                        "beginbfchar" => Section::BfChar,
                        "beginbfrange" => Section::BfRange,
                        "endcodespacerange" | "endbfchar" | "endbfrange" => Section::None,
                        _ => section,
                    };
                    i += 1;
                }
                Token::Hex(first) => match section {
                    Section::CodeSpace => {
                        if let Some(Token::Hex(end)) = tokens.get(i + 1) {
                            cmap.codespace_ranges.push(CodeRange {
                                start: first.clone(),
                                end: end.clone(),
                            });
                        }
                        i += 2;
                    }
                    Section::BfChar => {
                        if let Some(Token::Hex(dst)) = tokens.get(i + 1) {
                            cmap.single_mappings.insert(first.clone(), to_utf16(dst));
                        }
                        i += 2;
                    }
                    Section::BfRange => {
                        i += cmap.read_bf_range(first, &tokens[i + 1..]);
                    }
                    Section::None => i += 1,
                },
                _ => i += 1,
            }
        }

        cmap
    }

    /// Read one bfrange entry, returning the number of tokens consumed
    fn read_bf_range(&mut self, start: &[u8], rest: &[Token]) -> usize {
        let Some(Token::Hex(end)) = rest.first() else {
            return 1;
        };

        match rest.get(1) {
            Some(Token::Hex(dst)) => {
                self.ranges.push(RangeEntry {
                    src_start: start.to_vec(),
                    src_end: end.clone(),
                    dst: RangeDestination::Offset(to_utf16(dst)),
                });
                3
            }
            Some(Token::ArrayStart) => {
                let mut values = Vec::new();
                let mut consumed = 3;
                for token in &rest[2..] {
                    consumed += 1;
                    match token {
                        Token::Hex(value) => values.push(to_utf16(value)),
                        Token::ArrayEnd => break,
                        _ => {}
                    }
                }
                self.ranges.push(RangeEntry {
                    src_start: start.to_vec(),
                    src_end: end.clone(),
                    dst: RangeDestination::List(values),
                });
                consumed
            }
            _ => 2,
        }
    }

    /// Number of bytes the next code occupies at the start of `bytes`
    pub fn code_length(&self, bytes: &[u8]) -> usize {
        for len in 1..=4.min(bytes.len()) {
            if self
                .codespace_ranges
                .iter()
                .any(|range| range.contains(&bytes[..len]))
            {
                return len;
            }
        }

        // No usable codespace: guess from the mappings we have
        if self.single_mappings.keys().any(|k| k.len() == 2)
            || self.ranges.iter().any(|r| r.src_start.len() == 2)
        {
            2.min(bytes.len()).max(1)
        } else {
            1
        }
    }

    /// Map a character code to its Unicode text
    pub fn lookup(&self, code: &[u8]) -> Option<String> {
        if let Some(dst) = self.single_mappings.get(code) {
            return String::from_utf16(dst).ok();
        }

        for entry in &self.ranges {
            if code.len() != entry.src_start.len()
                || code < &entry.src_start[..]
                || code > &entry.src_end[..]
            {
                continue;
            }

            let offset = calculate_offset(code, &entry.src_start);
            return match &entry.dst {
                RangeDestination::Offset(start) => {
                    let mut units = start.clone();
                    let last = units.last_mut()?;
                    *last = last.checked_add(u16::try_from(offset).ok()?)?;
                    String::from_utf16(&units).ok()
                }
                RangeDestination::List(values) => {
                    values.get(offset).and_then(|v| String::from_utf16(v).ok())
                }
            };
        }

        None
    }

    /// Decode a string operand, splitting it into codes per the codespace.
    ///
    /// Returns `(code, text)` pairs; unmapped codes yield `None` so the caller
    /// can still advance the text position.
    pub fn decode(&self, bytes: &[u8]) -> Vec<(Vec<u8>, Option<String>)> {
        let mut result = Vec::new();
        let mut pos = 0;
        while pos < bytes.len() {
            let len = self.code_length(&bytes[pos..]).max(1);
            let end = (pos + len).min(bytes.len());
            let code = bytes[pos..end].to_vec();
            let text = self.lookup(&code);
            result.push((code, text));
            pos = end;
        }
        result
    }
}

fn to_utf16(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks(2)
        .map(|chunk| match chunk {
            [hi, lo] => u16::from_be_bytes([*hi, *lo]),
            [single] => *single as u16,
            _ => 0,
        })
        .collect()
}

/// Distance from `start` to `code`, both read as big-endian integers
fn calculate_offset(code: &[u8], start: &[u8]) -> usize {
    let value = |bytes: &[u8]| bytes.iter().fold(0usize, |acc, &b| (acc << 8) | b as usize);
    value(code).saturating_sub(value(start))
}

fn tokenize(data: &[u8]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < data.len() {
        match data[i] {
            b'%' => {
                while i < data.len() && data[i] != b'\n' && data[i] != b'\r' {
                    i += 1;
                }
            }
            b'<' if data.get(i + 1) == Some(&b'<') => i += 2,
            b'>' if data.get(i + 1) == Some(&b'>') => i += 2,
            b'<' => {
                let start = i + 1;
                let mut end = start;
                while end < data.len() && data[end] != b'>' {
                    end += 1;
                }
                tokens.push(Token::Hex(parse_hex(&data[start..end])));
                i = end + 1;
            }
            b'[' => {
                tokens.push(Token::ArrayStart);
                i += 1;
            }
            b']' => {
                tokens.push(Token::ArrayEnd);
                i += 1;
            }
            b'(' => {
                // Literal strings carry nothing we map; skip balanced parens
                let mut depth = 0usize;
                while i < data.len() {
                    match data[i] {
                        b'\\' => i += 1,
                        b'(' => depth += 1,
                        b')' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    i += 1;
                }
                i += 1;
            }
            c if c.is_ascii_whitespace() => i += 1,
            _ => {
                let start = i;
                while i < data.len()
                    && !data[i].is_ascii_whitespace()
                    && !matches!(data[i], b'<' | b'>' | b'[' | b']' | b'(' | b'%')
                {
                    i += 1;
                }
                if i == start {
                    i += 1;
                    continue;
                }
                tokens.push(Token::Word(
                    String::from_utf8_lossy(&data[start..i]).into_owned(),
                ));
            }
        }
    }

    tokens
}

/// Parse hex digits to bytes, ignoring whitespace; an odd digit is padded with 0
fn parse_hex(digits: &[u8]) -> Vec<u8> {
    let nibbles: Vec<u8> = digits
        .iter()
        .filter_map(|&c| (c as char).to_digit(16).map(|d| d as u8))
        .collect();

    nibbles
        .chunks(2)
        .map(|pair| match pair {
            [hi, lo] => (hi << 4) | lo,
            [hi] => hi << 4,
            _ => 0,
        })
        .collect()
}

#[cfg(test)]
#[path = "cmap_tests.rs"]
mod cmap_tests;
