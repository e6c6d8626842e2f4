//! Single-line rules: phones, signatures, names, yes/no questions,
//! label/value pairs, gender choices and headings.

use super::{role_qualified, word_count, LineContext, LineRule, RuleMatch};
use crate::fields::{ExtractedField, FieldOption, FieldType, Provenance};
use crate::label::guess_type;
use crate::text::{clean_label, contains_word, title_case};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_PHONE_PAIR: Regex = Regex::new(r"(?i)\bphone\b.*\balternate\s+phone\b").unwrap();
    static ref RE_PRINTED_NAME: Regex = Regex::new(r"(?i)\bprint(ed)?\s+name\b").unwrap();
    static ref RE_YES_OR_NO: Regex = Regex::new(r"(?i)\b(yes|no)\b").unwrap();
    static ref RE_LABEL_COLON: Regex = Regex::new(r"^([^:]{1,60}?)\s*:\s*(.*)$").unwrap();
    static ref RE_LABEL_BLANK: Regex = Regex::new(r"^(.{1,60}?)\s*[_\-]{4,}\s*$").unwrap();
    static ref RE_GENDER_KEY: Regex = Regex::new(r"(?i)\b(gender|sex)\b").unwrap();
    static ref RE_GENDER_TOKEN: Regex =
        Regex::new(r"(?i)\b(female|male|non-binary|nonbinary|other|prefer not to say|f|m)\b")
            .unwrap();
}

/// Words that make a "signature" line prose rather than a signing line.
const SIGNATURE_DECOYS: [&str; 3] = ["design", "policy", "waiver"];

/// Longest label accepted by [`LabelValueRule`], in words.
const MAX_LABEL_WORDS: usize = 6;

/// Whether a line asks for a signature rather than talking about one.
fn is_signing_line(ctx: &LineContext<'_>, line: &str, lower: &str) -> bool {
    contains_word(lower, "signature")
        && word_count(line) <= ctx.config.signature_max_words
        && !SIGNATURE_DECOYS.iter().any(|decoy| lower.contains(decoy))
}

/// Whether a line carries both a phone and an alternate phone.
pub(super) fn is_phone_pair(line: &str) -> bool {
    RE_PHONE_PAIR.is_match(line)
}

/// "Phone ____ Alternate Phone ____" → two phone fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhonePairRule;

impl LineRule for PhonePairRule {
    fn apply(&self, ctx: &LineContext<'_>, cursor: usize) -> Option<RuleMatch> {
        let line = ctx.line(cursor)?;
        if !is_phone_pair(line) {
            return None;
        }
        Some(RuleMatch::new(
            vec![
                ExtractedField::plain(FieldType::Phone, "Phone", Provenance::Ocr),
                ExtractedField::plain(FieldType::Phone, "Alternate Phone", Provenance::Ocr),
            ],
            1,
        ))
    }

    fn name(&self) -> &'static str {
        "phone_pair"
    }
}

/// "Student Signature ______ Date ______" → signature and date fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureDateRule;

impl LineRule for SignatureDateRule {
    fn apply(&self, ctx: &LineContext<'_>, cursor: usize) -> Option<RuleMatch> {
        let line = ctx.line(cursor)?;
        let lower = line.to_lowercase();
        if !contains_word(&lower, "date") || !is_signing_line(ctx, line, &lower) {
            return None;
        }
        let signature = role_qualified(&lower, "Signature");
        let date = if signature == "Signature" {
            "Date".to_string()
        } else {
            format!("{} Date", signature)
        };
        Some(RuleMatch::new(
            vec![
                ExtractedField::plain(FieldType::Signature, signature, Provenance::Ocr),
                ExtractedField::plain(FieldType::Date, date, Provenance::Ocr),
            ],
            1,
        ))
    }

    fn name(&self) -> &'static str {
        "signature_date"
    }
}

/// "Parent Printed Name ______" → role-qualified text field.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintedNameRule;

impl LineRule for PrintedNameRule {
    fn apply(&self, ctx: &LineContext<'_>, cursor: usize) -> Option<RuleMatch> {
        let line = ctx.line(cursor)?;
        if !RE_PRINTED_NAME.is_match(line) {
            return None;
        }
        let label = role_qualified(&line.to_lowercase(), "Printed Name");
        Some(RuleMatch::single(ExtractedField::plain(
            FieldType::Text,
            label,
            Provenance::Ocr,
        )))
    }

    fn name(&self) -> &'static str {
        "printed_name"
    }
}

/// Short lines mentioning a signature → role-qualified signature field.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureRule;

impl LineRule for SignatureRule {
    fn apply(&self, ctx: &LineContext<'_>, cursor: usize) -> Option<RuleMatch> {
        let line = ctx.line(cursor)?;
        let lower = line.to_lowercase();
        if !is_signing_line(ctx, line, &lower) {
            return None;
        }
        Some(RuleMatch::single(ExtractedField::plain(
            FieldType::Signature,
            role_qualified(&lower, "Signature"),
            Provenance::Ocr,
        )))
    }

    fn name(&self) -> &'static str {
        "signature"
    }
}

/// "Do you have allergies?  Yes  No" → radio with yes/no options.
///
/// The label is the clause before the first Yes/No word, or the previous
/// line when the answers stand alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct YesNoRule;

impl LineRule for YesNoRule {
    fn apply(&self, ctx: &LineContext<'_>, cursor: usize) -> Option<RuleMatch> {
        let line = ctx.line(cursor)?;
        let lower = line.to_lowercase();
        if !contains_word(&lower, "yes") || !contains_word(&lower, "no") {
            return None;
        }

        let first = RE_YES_OR_NO.find(line)?;
        let mut label = question_clause(&line[..first.start()]);
        if label.is_empty() {
            label = cursor
                .checked_sub(1)
                .and_then(|prev| ctx.line(prev))
                .map(question_clause)
                .filter(|prev| !RE_YES_OR_NO.is_match(prev))
                .unwrap_or_default();
        }
        if label.is_empty() {
            label = "Question".to_string();
        }

        let options = vec![FieldOption::new("yes", "Yes"), FieldOption::new("no", "No")];
        ExtractedField::radio(label, options, Provenance::Ocr).map(RuleMatch::single)
    }

    fn name(&self) -> &'static str {
        "yes_no"
    }
}

/// Text before the answers, without trailing boxes or punctuation.
fn question_clause(text: &str) -> String {
    let trimmed = text.trim_end_matches(|c: char| {
        c.is_whitespace() || "[](){}|/☐☑☒■□▢◻○".contains(c)
    });
    clean_label(trimmed)
}

/// `Label: value` or `Label ______` → one field typed from the label.
///
/// Declines Gender/Sex labels that [`GenderRule`] can turn into a radio.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelValueRule;

impl LineRule for LabelValueRule {
    fn apply(&self, ctx: &LineContext<'_>, cursor: usize) -> Option<RuleMatch> {
        let line = ctx.line(cursor)?;
        let raw_label = RE_LABEL_COLON
            .captures(line)
            .or_else(|| RE_LABEL_BLANK.captures(line))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())?;

        let mut label = clean_label(raw_label);
        if !label.chars().any(char::is_alphabetic) || word_count(&label) > MAX_LABEL_WORDS {
            return None;
        }
        if RE_GENDER_KEY.is_match(&label) && GenderRule.apply(ctx, cursor).is_some() {
            return None;
        }
        if !label.chars().any(char::is_lowercase) {
            label = title_case(&label);
        }

        let field_type = if label.to_lowercase().contains("signature") {
            FieldType::Signature
        } else {
            guess_type(&label)
        };
        Some(RuleMatch::single(ExtractedField::plain(field_type, label, Provenance::Ocr)))
    }

    fn name(&self) -> &'static str {
        "label_value"
    }
}

/// "Gender:  Male  Female" (same or next line) → radio of the listed tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenderRule;

impl LineRule for GenderRule {
    fn apply(&self, ctx: &LineContext<'_>, cursor: usize) -> Option<RuleMatch> {
        let line = ctx.line(cursor)?;
        let key = RE_GENDER_KEY.find(line)?;
        let label = title_case(key.as_str());

        let same_line = gender_options(&line[key.end()..]);
        let (options, consumed) = if same_line.len() >= 2 {
            (same_line, 1)
        } else {
            let next = ctx.line(cursor + 1).map(gender_options).unwrap_or_default();
            if next.len() < 2 {
                return None;
            }
            (next, 2)
        };

        ExtractedField::radio(label, options, Provenance::Ocr).map(|f| RuleMatch::new(vec![f], consumed))
    }

    fn name(&self) -> &'static str {
        "gender"
    }
}

/// Distinct gender choices listed in `text`, in order.
fn gender_options(text: &str) -> Vec<FieldOption> {
    let mut options: Vec<FieldOption> = Vec::new();
    for token in RE_GENDER_TOKEN.find_iter(text) {
        let label = match token.as_str().to_lowercase().as_str() {
            "m" | "male" => "Male".to_string(),
            "f" | "female" => "Female".to_string(),
            "non-binary" | "nonbinary" => "Non-binary".to_string(),
            other => title_case(other),
        };
        let option = FieldOption::from_label(label);
        if !options.iter().any(|o| o.value == option.value) {
            options.push(option);
        }
    }
    options
}

/// Short all-uppercase lines → section heading.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingRule;

impl LineRule for HeadingRule {
    fn apply(&self, ctx: &LineContext<'_>, cursor: usize) -> Option<RuleMatch> {
        let line = ctx.line(cursor)?.trim();
        let len = line.chars().count();
        if len < ctx.config.heading_min_len || len > ctx.config.heading_max_len {
            return None;
        }
        let shape_ok = line
            .chars()
            .all(|c| c == ' ' || c.is_ascii_digit() || (c.is_alphabetic() && !c.is_lowercase()));
        if !shape_ok || !line.chars().any(char::is_alphabetic) {
            return None;
        }
        Some(RuleMatch::single(ExtractedField::plain(
            FieldType::Heading,
            title_case(line),
            Provenance::Ocr,
        )))
    }

    fn name(&self) -> &'static str {
        "heading"
    }
}
