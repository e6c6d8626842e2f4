//! Sentences with embedded blanks, e.g. "I, ______ , agree to pay $____".

use super::rules::is_phone_pair;
use super::{LineContext, LineRule, RuleMatch};
use crate::fields::{ExtractedField, FieldShape, InlinePart, Provenance};
use crate::label::guess_type;
use crate::text::{collapse_whitespace, slugify};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    static ref RE_BLANK: Regex = Regex::new(r"_{3,}").unwrap();
}

/// Words before a blank used to name it.
const NAME_WORDS: usize = 3;

/// Lines where underscore blanks sit inside the text.
///
/// A single trailing blank (`Name: ______`) is left to
/// [`LabelValueRule`](super::LabelValueRule), signature lines to the
/// signature rules and phone/alternate phone lines to
/// [`PhonePairRule`](super::PhonePairRule).
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineBlankRule;

impl LineRule for InlineBlankRule {
    fn apply(&self, ctx: &LineContext<'_>, cursor: usize) -> Option<RuleMatch> {
        let line = ctx.line(cursor)?;
        if line.to_lowercase().contains("signature") || is_phone_pair(line) {
            return None;
        }

        let blanks: Vec<_> = RE_BLANK.find_iter(line).collect();
        let last = blanks.last()?;
        let trailing = &line[last.end()..];
        if blanks.len() < 2 && !trailing.chars().any(char::is_alphanumeric) {
            return None;
        }

        let mut parts = Vec::with_capacity(blanks.len() * 2 + 1);
        let mut names = HashSet::new();
        let mut start = 0;
        for (i, blank) in blanks.iter().enumerate() {
            let before = line[start..blank.start()].trim();
            if !before.is_empty() {
                parts.push(InlinePart::Text {
                    value: before.to_string(),
                });
            }

            let words = last_words(before, NAME_WORDS);
            let mut name = slugify(&words);
            if name.is_empty() {
                name = format!("field_{}", i + 1);
            }
            if !names.insert(name.clone()) {
                name = format!("{}_{}", name, i + 1);
                names.insert(name.clone());
            }
            parts.push(InlinePart::Input {
                input_type: guess_type(&words),
                name,
            });
            start = blank.end();
        }
        let trailing = trailing.trim();
        if !trailing.is_empty() {
            parts.push(InlinePart::Text {
                value: trailing.to_string(),
            });
        }

        let label = collapse_whitespace(&RE_BLANK.replace_all(line, "___"));
        Some(RuleMatch::single(ExtractedField::new(
            FieldShape::InlineText { parts },
            label,
            Provenance::Ocr,
        )))
    }

    fn name(&self) -> &'static str {
        "inline_blank"
    }
}

/// Last `n` words of `text` that contain a letter or digit.
fn last_words(text: &str, n: usize) -> String {
    let words: Vec<&str> = text
        .split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .collect();
    words[words.len().saturating_sub(n)..].join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractionConfig;
    use crate::fields::FieldType;

    fn apply(line: &str) -> Option<RuleMatch> {
        let lines = vec![line.to_string()];
        let config = ExtractionConfig::default();
        InlineBlankRule.apply(&LineContext::new(&lines, &config), 0)
    }

    #[test]
    fn test_embedded_blank() {
        let m = apply("I, ________ understand the rules of the program.").unwrap();
        let field = &m.fields[0];
        assert_eq!(field.field_type(), FieldType::InlineText);
        assert_eq!(
            field.parts(),
            &[
                InlinePart::Text {
                    value: "I,".to_string()
                },
                InlinePart::Input {
                    input_type: FieldType::Text,
                    name: "i".to_string()
                },
                InlinePart::Text {
                    value: "understand the rules of the program.".to_string()
                },
            ]
        );
        assert_eq!(field.label, "I, ___ understand the rules of the program.");
    }

    #[test]
    fn test_two_blanks_typed_by_preceding_words() {
        let m = apply("Home phone ______ Date of visit ______").unwrap();
        let inputs: Vec<_> = m.fields[0]
            .parts()
            .iter()
            .filter_map(|p| match p {
                InlinePart::Input { input_type, name } => Some((*input_type, name.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(
            inputs,
            vec![(FieldType::Phone, "home_phone"), (FieldType::Date, "date_of_visit")]
        );
    }

    #[test]
    fn test_unnamed_blanks_numbered() {
        let m = apply("____ / ____ / ____").unwrap();
        let names: Vec<_> = m.fields[0]
            .parts()
            .iter()
            .filter_map(|p| match p {
                InlinePart::Input { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["field_1", "field_2", "field_3"]);
    }

    #[test]
    fn test_trailing_blank_declined() {
        assert!(apply("Name: __________").is_none());
        assert!(apply("Address ____ .").is_none());
    }

    #[test]
    fn test_signature_lines_declined() {
        assert!(apply("Signature ______ Date ______").is_none());
    }

    #[test]
    fn test_phone_pair_declined() {
        assert!(apply("Phone: ____ Alternate Phone: ____").is_none());
    }

    #[test]
    fn test_short_underscores_ignored() {
        assert!(apply("snake__case text").is_none());
    }
}
