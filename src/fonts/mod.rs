//! Font-aware decoding of shown text.
//!
//! Strings in `Tj`/`TJ` are character codes, not text. A font's ToUnicode
//! CMap (ISO 32000-1:2008 §9.10.3) maps them to Unicode; composite (Type0)
//! fonts use two-byte codes and without a ToUnicode CMap cannot be read at
//! all. Simple fonts without one fall back to the PDF text-string rules.

use crate::content::decode_text_string;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

/// Cap on the number of codes a single `bfrange` entry may expand to.
const MAX_RANGE: u32 = 0xFFFF;

lazy_static! {
    static ref RE_BFCHAR: Regex = Regex::new(r"<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]+)>").unwrap();
    static ref RE_BFRANGE_SEQ: Regex =
        Regex::new(r"<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]+)>").unwrap();
    static ref RE_BFRANGE_ARRAY: Regex =
        Regex::new(r"<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]+)>\s*\[([^\]]*)\]").unwrap();
    static ref RE_HEX: Regex = Regex::new(r"<([0-9A-Fa-f]+)>").unwrap();
}

/// Character code to Unicode mapping parsed from a ToUnicode CMap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToUnicodeMap {
    map: HashMap<u32, String>,
}

impl ToUnicodeMap {
    /// Parse the `bfchar` and `bfrange` sections of a decompressed CMap.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_formscan::fonts::ToUnicodeMap;
    ///
    /// let cmap = ToUnicodeMap::parse(b"1 beginbfrange\n<0041> <0043> <0061>\nendbfrange");
    /// assert_eq!(cmap.get(0x42), Some("b"));
    /// ```
    pub fn parse(data: &[u8]) -> Self {
        let content = String::from_utf8_lossy(data);
        let mut map = HashMap::new();

        for section in sections(&content, "beginbfchar", "endbfchar") {
            for caps in RE_BFCHAR.captures_iter(section) {
                if let (Some(code), Some(text)) = (hex_code(&caps[1]), utf16_hex(&caps[2])) {
                    map.insert(code, text);
                }
            }
        }

        for section in sections(&content, "beginbfrange", "endbfrange") {
            for line in section.lines() {
                if let Some(caps) = RE_BFRANGE_ARRAY.captures(line) {
                    let (Some(low), Some(high)) = (hex_code(&caps[1]), hex_code(&caps[2])) else {
                        continue;
                    };
                    for (code, dst) in (low..=high).zip(RE_HEX.captures_iter(&caps[3])) {
                        if let Some(text) = utf16_hex(&dst[1]) {
                            map.insert(code, text);
                        }
                    }
                } else if let Some(caps) = RE_BFRANGE_SEQ.captures(line) {
                    let (Some(low), Some(high), Some(start)) =
                        (hex_code(&caps[1]), hex_code(&caps[2]), utf16_units(&caps[3]))
                    else {
                        continue;
                    };
                    let high = high.min(low.saturating_add(MAX_RANGE));
                    for (offset, code) in (low..=high).enumerate() {
                        if let Some(text) = offset_units(&start, offset as u32) {
                            map.insert(code, text);
                        }
                    }
                }
            }
        }

        log::trace!("ToUnicode CMap: {} mapping(s)", map.len());
        Self { map }
    }

    /// Unicode text for a character code.
    pub fn get(&self, code: u32) -> Option<&str> {
        self.map.get(&code).map(String::as_str)
    }

    /// Number of mapped codes.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

fn sections<'a>(content: &'a str, begin: &str, end: &str) -> Vec<&'a str> {
    let mut found = Vec::new();
    let mut rest = content;
    while let Some(start) = rest.find(begin) {
        let body = &rest[start + begin.len()..];
        match body.find(end) {
            Some(stop) => {
                found.push(&body[..stop]);
                rest = &body[stop + end.len()..];
            },
            None => break,
        }
    }
    found
}

fn hex_code(hex: &str) -> Option<u32> {
    if hex.len() > 8 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

/// Big-endian UTF-16 code units of a hex destination string.
fn utf16_units(hex: &str) -> Option<Vec<u16>> {
    if hex.len() <= 4 {
        return u16::from_str_radix(hex, 16).ok().map(|u| vec![u]);
    }
    hex.as_bytes()
        .chunks(4)
        .map(|chunk| std::str::from_utf8(chunk).ok().and_then(|c| u16::from_str_radix(c, 16).ok()))
        .collect()
}

fn utf16_hex(hex: &str) -> Option<String> {
    utf16_units(hex).and_then(|units| String::from_utf16(&units).ok())
}

/// Destination of the `offset`-th code in a sequential range: the last code
/// unit is incremented.
fn offset_units(start: &[u16], offset: u32) -> Option<String> {
    let mut units = start.to_vec();
    let last = units.last_mut()?;
    *last = u16::try_from(u32::from(*last) + offset).ok()?;
    String::from_utf16(&units).ok()
}

/// Decodes the strings shown with one font resource.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDecoder {
    code_width: usize,
    to_unicode: Option<ToUnicodeMap>,
}

impl FontDecoder {
    /// Simple font: one-byte codes.
    pub fn simple(to_unicode: Option<ToUnicodeMap>) -> Self {
        Self {
            code_width: 1,
            to_unicode,
        }
    }

    /// Composite (Type0) font: two-byte codes, as with `Identity-H`.
    pub fn composite(to_unicode: Option<ToUnicodeMap>) -> Self {
        Self {
            code_width: 2,
            to_unicode,
        }
    }

    /// Build from a font's `/Subtype` name and its parsed ToUnicode CMap.
    pub fn from_subtype(subtype: &[u8], to_unicode: Option<ToUnicodeMap>) -> Self {
        if subtype == b"Type0" {
            Self::composite(to_unicode)
        } else {
            Self::simple(to_unicode)
        }
    }

    /// Number of bytes per character code.
    pub fn code_width(&self) -> usize {
        self.code_width
    }

    /// Decode a shown string; `None` when the codes cannot be mapped.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match &self.to_unicode {
            Some(cmap) => {
                let mut text = String::new();
                for chunk in bytes.chunks(self.code_width) {
                    let code = chunk.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
                    match cmap.get(code) {
                        Some(mapped) => text.push_str(mapped),
                        None if self.code_width == 1 => text.push(chunk[0] as char),
                        None => return None,
                    }
                }
                Some(text)
            },
            None if self.code_width == 1 => Some(decode_text_string(bytes)),
            // CIDs without a ToUnicode CMap carry no recoverable text
            None => None,
        }
    }
}

/// Font decoders of one page, keyed by resource name (`/F1`).
pub type PageFonts = HashMap<Vec<u8>, FontDecoder>;

/// Decode a shown string with an optional font.
///
/// Text containing control characters is rejected: it is the signature of
/// codes decoded with the wrong encoding.
pub fn decode_shown_text(bytes: &[u8], font: Option<&FontDecoder>) -> Option<String> {
    let text = match font {
        Some(font) => font.decode(bytes)?,
        None => decode_text_string(bytes),
    };
    if text.chars().any(|c| c.is_control() && !c.is_whitespace()) {
        log::trace!("Dropping undecodable text run {:?}", text);
        return None;
    }
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDENTITY_ASCII: &[u8] = b"/CIDInit /ProcSet findresource begin\n\
        1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n\
        1 beginbfrange\n<0020> <007E> <0020>\nendbfrange\nendcmap";

    #[test]
    fn test_bfchar_and_ligature() {
        let cmap = ToUnicodeMap::parse(b"2 beginbfchar\n<01> <0041> <02> <00660069>\nendbfchar");
        assert_eq!(cmap.get(1), Some("A"));
        assert_eq!(cmap.get(2), Some("fi"));
    }

    #[test]
    fn test_bfrange_array() {
        let cmap = ToUnicodeMap::parse(b"beginbfrange\n<0010> <0012> [<0041> <0042> <0043>]\nendbfrange");
        assert_eq!(cmap.get(0x11), Some("B"));
        assert_eq!(cmap.len(), 3);
    }

    #[test]
    fn test_surrogate_pair_destination() {
        let cmap = ToUnicodeMap::parse(b"beginbfchar\n<0001> <D835DF0C>\nendbfchar");
        assert_eq!(cmap.get(1), Some("\u{1D70C}"));
    }

    #[test]
    fn test_composite_font_decodes_two_byte_codes() {
        let font = FontDecoder::composite(Some(ToUnicodeMap::parse(IDENTITY_ASCII)));
        let bytes = [0x00, 0x45, 0x00, 0x6D, 0x00, 0x61, 0x00, 0x69, 0x00, 0x6C, 0x00, 0x3A];
        assert_eq!(decode_shown_text(&bytes, Some(&font)), Some("Email:".to_string()));
    }

    #[test]
    fn test_composite_font_without_cmap_is_unreadable() {
        let font = FontDecoder::from_subtype(b"Type0", None);
        assert_eq!(font.code_width(), 2);
        assert_eq!(decode_shown_text(&[0x00, 0x45], Some(&font)), None);
    }

    #[test]
    fn test_simple_font_falls_back_to_text_string() {
        let font = FontDecoder::from_subtype(b"TrueType", None);
        assert_eq!(decode_shown_text(b"Name:", Some(&font)), Some("Name:".to_string()));
    }

    #[test]
    fn test_control_characters_rejected() {
        assert_eq!(decode_shown_text(&[0x00, 0x45, 0x00, 0x6D], None), None);
        assert_eq!(decode_shown_text(b"Tab\tok", None), Some("Tab\tok".to_string()));
    }
}
