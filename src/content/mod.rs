//! PDF content stream walking.
//!
//! Only the operators that move or show text are interpreted; the goal is a
//! list of positioned text runs for label lookup, not faithful rendering.
//! Shown strings are decoded through the current `Tf` font when the page
//! provides one. Run widths are estimated from the font size since glyph
//! metrics are not loaded.

pub mod graphics_state;

pub use graphics_state::{Matrix, TextState};

use crate::backend::TextRun;
use crate::fonts::{decode_shown_text, FontDecoder, PageFonts};
use lopdf::content::Operation;
use lopdf::Object;

/// Average glyph advance as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// TJ adjustment (thousandths of an em) wide enough to count as a space.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Walk decoded content stream operations and collect text runs.
///
/// Runs whose codes cannot be decoded with their font are left out.
pub fn collect_text_runs(operations: &[Operation], fonts: &PageFonts) -> Vec<TextRun> {
    let mut state = TextState::default();
    let mut font: Option<&FontDecoder> = None;
    let mut runs = Vec::new();

    for op in operations {
        let operands = &op.operands;
        match op.operator.as_str() {
            "q" => state.ctm_stack.push(state.ctm),
            "Q" => {
                if let Some(ctm) = state.ctm_stack.pop() {
                    state.ctm = ctm;
                }
            },
            "cm" => {
                if let Some(m) = matrix_operand(operands) {
                    state.ctm = m.multiply(&state.ctm);
                }
            },
            "BT" => state.begin_text(),
            "Tf" => {
                if let Some(name) = operands.first().and_then(|o| o.as_name().ok()) {
                    font = fonts.get(name);
                }
                if let Some(size) = operands.get(1).and_then(number) {
                    state.font_size = size;
                }
            },
            "TL" => {
                if let Some(leading) = operands.first().and_then(number) {
                    state.leading = leading;
                }
            },
            "Tm" => {
                if let Some(m) = matrix_operand(operands) {
                    state.set_text_matrix(m);
                }
            },
            "Td" | "TD" => {
                if let (Some(tx), Some(ty)) = (
                    operands.first().and_then(number),
                    operands.get(1).and_then(number),
                ) {
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    state.move_text(tx, ty);
                }
            },
            "T*" => state.next_line(),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    let glyphs = glyph_count(bytes, font);
                    let text = decode_shown_text(bytes, font);
                    show_text(&mut state, &mut runs, text, glyphs, 0.0);
                }
            },
            "'" => {
                state.next_line();
                if let Some(Object::String(bytes, _)) = operands.first() {
                    let glyphs = glyph_count(bytes, font);
                    let text = decode_shown_text(bytes, font);
                    show_text(&mut state, &mut runs, text, glyphs, 0.0);
                }
            },
            "\"" => {
                state.next_line();
                if let Some(Object::String(bytes, _)) = operands.get(2) {
                    let glyphs = glyph_count(bytes, font);
                    let text = decode_shown_text(bytes, font);
                    show_text(&mut state, &mut runs, text, glyphs, 0.0);
                }
            },
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    let mut text = Some(String::new());
                    let mut glyphs = 0;
                    let mut adjustment = 0.0;
                    for item in items {
                        match item {
                            Object::String(bytes, _) => {
                                glyphs += glyph_count(bytes, font);
                                let piece = decode_shown_text(bytes, font);
                                text = text.zip(piece).map(|(mut t, p)| {
                                    t.push_str(&p);
                                    t
                                });
                            },
                            other => {
                                if let Some(n) = number(other) {
                                    adjustment += n;
                                    if let Some(t) = text.as_mut() {
                                        if n < -TJ_SPACE_THRESHOLD && !t.ends_with(' ') {
                                            t.push(' ');
                                        }
                                    }
                                }
                            },
                        }
                    }
                    show_text(&mut state, &mut runs, text, glyphs, adjustment);
                }
            },
            _ => {},
        }
    }

    runs
}

fn glyph_count(bytes: &[u8], font: Option<&FontDecoder>) -> usize {
    let width = font.map_or(1, FontDecoder::code_width);
    bytes.len().div_ceil(width)
}

fn show_text(
    state: &mut TextState,
    runs: &mut Vec<TextRun>,
    text: Option<String>,
    glyphs: usize,
    adjustment: f32,
) {
    if let Some(text) = text.filter(|t| !t.trim().is_empty()) {
        runs.push(TextRun {
            text,
            transform: state.rendering_matrix().to_array(),
        });
    }
    let advance =
        glyphs as f32 * state.font_size * AVG_GLYPH_WIDTH - adjustment / 1000.0 * state.font_size;
    state.advance(advance);
}

fn matrix_operand(operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let mut m = [0.0; 6];
    for (slot, obj) in m.iter_mut().zip(operands) {
        *slot = number(obj)?;
    }
    Some(Matrix::from_array(m))
}

/// Numeric value of an integer or real object.
pub(crate) fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(f) => Some(*f as f32),
        _ => None,
    }
}

/// Decode a PDF text string: UTF-16BE with BOM, else UTF-8, else Latin-1.
pub fn decode_text_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::ToUnicodeMap;

    fn op(operator: &str, operands: Vec<Object>) -> Operation {
        Operation::new(operator, operands)
    }

    #[test]
    fn test_tj_run_position() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
            op("Td", vec![Object::Integer(72), Object::Integer(700)]),
            op("Tj", vec![Object::string_literal("Email:")]),
            op("ET", vec![]),
        ];
        let runs = collect_text_runs(&ops, &PageFonts::new());
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "Email:");
        assert_eq!(runs[0].transform[4], 72.0);
        assert_eq!(runs[0].transform[5], 700.0);
    }

    #[test]
    fn test_consecutive_tj_advances() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(10)]),
            op("Td", vec![Object::Integer(0), Object::Integer(0)]),
            op("Tj", vec![Object::string_literal("ab")]),
            op("Tj", vec![Object::string_literal("cd")]),
            op("ET", vec![]),
        ];
        let runs = collect_text_runs(&ops, &PageFonts::new());
        assert_eq!(runs[1].transform[4], 10.0);
    }

    #[test]
    fn test_tj_array_inserts_space_for_wide_gap() {
        let ops = vec![
            op("BT", vec![]),
            op(
                "TJ",
                vec![Object::Array(vec![
                    Object::string_literal("First"),
                    Object::Integer(-250),
                    Object::string_literal("Name"),
                ])],
            ),
        ];
        let runs = collect_text_runs(&ops, &PageFonts::new());
        assert_eq!(runs[0].text, "First Name");
    }

    #[test]
    fn test_q_restores_ctm() {
        let ops = vec![
            op("q", vec![]),
            op(
                "cm",
                [1, 0, 0, 1, 0, 100].into_iter().map(Object::Integer).collect(),
            ),
            op("Q", vec![]),
            op("BT", vec![]),
            op("Td", vec![Object::Integer(10), Object::Integer(20)]),
            op("Tj", vec![Object::string_literal("x")]),
        ];
        let runs = collect_text_runs(&ops, &PageFonts::new());
        assert_eq!(runs[0].transform[5], 20.0);
    }

    #[test]
    fn test_tf_selects_composite_font() {
        let cmap = ToUnicodeMap::parse(b"beginbfrange\n<0020> <007E> <0020>\nendbfrange");
        let mut fonts = PageFonts::new();
        fonts.insert(b"F2".to_vec(), FontDecoder::composite(Some(cmap)));

        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F2".to_vec()), Object::Integer(10)]),
            op("Td", vec![Object::Integer(72), Object::Integer(702)]),
            op(
                "Tj",
                vec![Object::String(
                    vec![0x00, 0x45, 0x00, 0x6D, 0x00, 0x61, 0x00, 0x69, 0x00, 0x6C],
                    lopdf::StringFormat::Hexadecimal,
                )],
            ),
            op("Tj", vec![Object::String(vec![0x00, 0x3A], lopdf::StringFormat::Hexadecimal)]),
        ];
        let runs = collect_text_runs(&ops, &fonts);
        assert_eq!(runs[0].text, "Email");
        // five two-byte glyphs at 10pt
        assert_eq!(runs[1].transform[4], 97.0);
    }

    #[test]
    fn test_undecodable_run_dropped() {
        let mut fonts = PageFonts::new();
        fonts.insert(b"F2".to_vec(), FontDecoder::composite(None));
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F2".to_vec()), Object::Integer(10)]),
            op("Tj", vec![Object::String(vec![0x00, 0x45], lopdf::StringFormat::Hexadecimal)]),
        ];
        assert!(collect_text_runs(&ops, &fonts).is_empty());
    }

    #[test]
    fn test_decode_utf16_string() {
        let bytes = [0xFE, 0xFF, 0x00, 0x4E, 0x00, 0x6F];
        assert_eq!(decode_text_string(&bytes), "No");
    }

    #[test]
    fn test_decode_latin1_fallback() {
        assert_eq!(decode_text_string(&[0x4E, 0xE9]), "Né");
    }
}
