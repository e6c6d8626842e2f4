//! Runs of lines that start with a checkbox glyph.

use super::{LineContext, LineRule, RuleMatch};
use crate::fields::{ExtractedField, FieldOption, FieldShape, Provenance};
use crate::text::clean_label;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `[ ]`, `[x]`, `☐`, `☑`, `☒`, `■`, `□`, `▢`, `◻`, `○` followed by the option text
    static ref RE_CHECKBOX: Regex =
        Regex::new(r"^\s*(?:\[\s*[xX✓✔]?\s*\]|[☐☑☒■□▢◻○])\s*(.*)$").unwrap();
}

/// Label given to grouped checkbox options.
const GROUP_LABEL: &str = "Select Options";

/// Consecutive checkbox lines.
///
/// Two or more lines become one `multiselect`; a lone line becomes a
/// `checkbox` captioned with its text.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckboxGroupRule;

impl LineRule for CheckboxGroupRule {
    fn apply(&self, ctx: &LineContext<'_>, cursor: usize) -> Option<RuleMatch> {
        let mut captions = Vec::new();
        while let Some(caps) = ctx.line(cursor + captions.len()).and_then(|l| RE_CHECKBOX.captures(l)) {
            captions.push(clean_label(caps.get(1).map_or("", |m| m.as_str())));
        }

        match captions.len() {
            0 => None,
            1 => {
                let caption = captions.remove(0);
                if caption.is_empty() {
                    return Some(RuleMatch::new(Vec::new(), 1));
                }
                Some(RuleMatch::single(ExtractedField::new(
                    FieldShape::Checkbox {
                        checkbox_text: caption.clone(),
                    },
                    caption,
                    Provenance::Ocr,
                )))
            },
            consumed => {
                let mut options: Vec<FieldOption> = Vec::new();
                for caption in captions.into_iter().filter(|c| !c.is_empty()) {
                    let option = FieldOption::from_label(caption);
                    if !options.iter().any(|o| o.value == option.value) {
                        options.push(option);
                    }
                }
                Some(RuleMatch::new(
                    vec![ExtractedField::new(
                        FieldShape::Multiselect { options },
                        GROUP_LABEL,
                        Provenance::Ocr,
                    )],
                    consumed,
                ))
            },
        }
    }

    fn name(&self) -> &'static str {
        "checkbox_group"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractionConfig;
    use crate::fields::FieldType;

    fn apply(input: &[&str], cursor: usize) -> Option<RuleMatch> {
        let lines: Vec<String> = input.iter().map(|s| s.to_string()).collect();
        let config = ExtractionConfig::default();
        CheckboxGroupRule.apply(&LineContext::new(&lines, &config), cursor)
    }

    #[test]
    fn test_group_stops_at_first_plain_line() {
        let m = apply(&["[ ] Soccer", "[x] Chess", "□ Art", "Other notes"], 0).unwrap();
        assert_eq!(m.consumed, 3);
        assert_eq!(m.fields[0].options().len(), 3);
        assert_eq!(m.fields[0].options()[1], FieldOption::new("chess", "Chess"));
    }

    #[test]
    fn test_single_checkbox() {
        let m = apply(&["Intro", "☐ I agree to the terms"], 1).unwrap();
        assert_eq!(m.consumed, 1);
        assert_eq!(m.fields[0].field_type(), FieldType::Checkbox);
        assert_eq!(m.fields[0].label, "I agree to the terms");
    }

    #[test]
    fn test_repeated_options_merged() {
        let m = apply(&["○ Yes please", "○ yes please"], 0).unwrap();
        assert_eq!(m.fields[0].options().len(), 1);
    }

    #[test]
    fn test_plain_line_declined() {
        assert!(apply(&["Name: ____"], 0).is_none());
    }
}
