//! Single-byte font encodings used by simple (non-Type0) fonts

/// Upper half (0x80..=0xFF) of Mac OS Roman
const MAC_ROMAN_HIGH: &str = "ÄÅÇÉÑÖÜáàâäãåçéèêëíìîïñóòôöõúùûü†°¢£§•¶ß®©™´¨≠ÆØ∞±≤≥¥µ∂∑∏π∫ªºΩæø¿¡¬√ƒ≈∆«»…\u{00A0}ÀÃÕŒœ–—“”‘’÷◊ÿŸ⁄€‹›ﬁﬂ‡·‚„‰ÂÊÁËÈÍÎÏÌÓÔ\u{F8FF}ÒÚÛÙıˆ˜¯˘˙˚¸˝˛ˇ";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextEncoding {
    StandardEncoding,
    MacRomanEncoding,
    WinAnsiEncoding,
    PdfDocEncoding,
}

impl TextEncoding {
    /// Resolve a `/Encoding` base name
    pub fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"WinAnsiEncoding" => Some(TextEncoding::WinAnsiEncoding),
            b"MacRomanEncoding" => Some(TextEncoding::MacRomanEncoding),
            b"StandardEncoding" => Some(TextEncoding::StandardEncoding),
            b"PDFDocEncoding" => Some(TextEncoding::PdfDocEncoding),
            _ => None,
        }
    }

    /// Decode one character code
    pub fn decode_byte(&self, byte: u8) -> char {
        match self {
            TextEncoding::StandardEncoding => match byte {
                0x27 => '\u{2019}',
                0x60 => '\u{2018}',
                0x00..=0x7F => byte as char,
                _ => latin1(byte),
            },
            TextEncoding::PdfDocEncoding => latin1(byte),
            TextEncoding::WinAnsiEncoding => match byte {
                0x00..=0x7F => byte as char,
                0x80 => '\u{20AC}', // Euro sign
                0x82 => '\u{201A}', // Single low quotation mark
                0x83 => '\u{0192}', // Latin small letter f with hook
                0x84 => '\u{201E}', // Double low quotation mark
                0x85 => '\u{2026}', // Horizontal ellipsis
                0x86 => '\u{2020}', // Dagger
                0x87 => '\u{2021}', // Double dagger
                0x88 => '\u{02C6}', // Circumflex accent
                0x89 => '\u{2030}', // Per mille sign
                0x8A => '\u{0160}', // Latin capital letter S with caron
                0x8B => '\u{2039}', // Single left angle quotation mark
                0x8C => '\u{0152}', // Latin capital ligature OE
                0x8E => '\u{017D}', // Latin capital letter Z with caron
                0x91 => '\u{2018}', // Left single quotation mark
                0x92 => '\u{2019}', // Right single quotation mark
                0x93 => '\u{201C}', // Left double quotation mark
                0x94 => '\u{201D}', // Right double quotation mark
                0x95 => '\u{2022}', // Bullet
                0x96 => '\u{2013}', // En dash
                0x97 => '\u{2014}', // Em dash
                0x98 => '\u{02DC}', // Small tilde
                0x99 => '\u{2122}', // Trade mark sign
                0x9A => '\u{0161}', // Latin small letter s with caron
                0x9B => '\u{203A}', // Single right angle quotation mark
                0x9C => '\u{0153}', // Latin small ligature oe
                0x9E => '\u{017E}', // Latin small letter z with caron
                0x9F => '\u{0178}', // Latin capital letter Y with diaeresis
                0xA0..=0xFF => latin1(byte),
                // Undefined bytes
                _ => '?',
            },
            TextEncoding::MacRomanEncoding => match byte {
                0x00..=0x7F => byte as char,
                _ => MAC_ROMAN_HIGH
                    .chars()
                    .nth((byte - 0x80) as usize)
                    .unwrap_or('?'),
            },
        }
    }

    pub fn decode(&self, data: &[u8]) -> String {
        data.iter().map(|&b| self.decode_byte(b)).collect()
    }
}

fn latin1(byte: u8) -> char {
    char::from_u32(byte as u32).unwrap_or('?')
}

/// Map a glyph name from a `/Differences` array to a character.
///
/// Covers single-letter names, digit names, `uniXXXX` and the punctuation
/// that turns up on shipping labels; anything else is unknown.
pub fn glyph_name_to_char(name: &str) -> Option<char> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_alphabetic() {
            return Some(c);
        }
    }

    if let Some(hex) = name.strip_prefix("uni") {
        if hex.len() == 4 {
            return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
        }
    }

    let c = match name {
        "zero" => '0',
        "one" => '1',
        "two" => '2',
        "three" => '3',
        "four" => '4',
        "five" => '5',
        "six" => '6',
        "seven" => '7',
        "eight" => '8',
        "nine" => '9',
        "space" | "nbspace" => ' ',
        "hyphen" | "minus" => '-',
        "period" => '.',
        "comma" => ',',
        "colon" => ':',
        "semicolon" => ';',
        "slash" => '/',
        "backslash" => '\\',
        "parenleft" => '(',
        "parenright" => ')',
        "bracketleft" => '[',
        "bracketright" => ']',
        "numbersign" => '#',
        "underscore" => '_',
        "plus" => '+',
        "equal" => '=',
        "asterisk" => '*',
        "ampersand" => '&',
        "at" => '@',
        "percent" => '%',
        "exclam" => '!',
        "question" => '?',
        "quotesingle" => '\'',
        "quotedbl" => '"',
        _ => return None,
    };
    Some(c)
}
