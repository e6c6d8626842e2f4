//! Heuristic field recovery from recognized text lines.
//!
//! Scanned and flattened documents have no form layer, only lines of text.
//! The classifier walks those lines with a single forward cursor and tries an
//! ordered list of [`LineRule`]s at each position; the first rule that
//! matches emits its fields and says how many lines it consumed. Lines no
//! rule understands are skipped.
//!
//! # Default rules, in priority order
//!
//! 1. [`InlineBlankRule`]: sentences with embedded `____` blanks
//! 2. [`PhonePairRule`]: "Phone ... Alternate Phone"
//! 3. [`SignatureDateRule`]: signature and date on one line
//! 4. [`PrintedNameRule`]: "Printed Name" / "Print Name"
//! 5. [`SignatureRule`]: short lines mentioning a signature
//! 6. [`YesNoRule`]: questions answered Yes / No
//! 7. [`CheckboxGroupRule`]: runs of `☐ Option` lines
//! 8. [`LabelValueRule`]: `Label: value` and `Label ____`
//! 9. [`GenderRule`]: Gender / Sex with listed choices
//! 10. [`HeadingRule`]: short all-uppercase lines

mod checkbox;
mod inline;
mod rules;

pub use checkbox::CheckboxGroupRule;
pub use inline::InlineBlankRule;
pub use rules::{
    GenderRule, HeadingRule, LabelValueRule, PhonePairRule, PrintedNameRule, SignatureDateRule,
    SignatureRule, YesNoRule,
};

use crate::config::ExtractionConfig;
use crate::fields::{ExtractedField, FieldType};
use crate::text::contains_word;
use std::collections::HashSet;

/// Signer roles recognized in signature lines, in priority order.
const ROLES: [&str; 4] = ["Student", "Parent", "Guardian", "Witness"];

/// Default rule set, in priority order.
pub static DEFAULT_RULES: &[&dyn LineRule] = &[
    &InlineBlankRule,
    &PhonePairRule,
    &SignatureDateRule,
    &PrintedNameRule,
    &SignatureRule,
    &YesNoRule,
    &CheckboxGroupRule,
    &LabelValueRule,
    &GenderRule,
    &HeadingRule,
];

/// The lines of one page and the thresholds rules may consult.
#[derive(Debug, Clone, Copy)]
pub struct LineContext<'a> {
    /// Ordered, trimmed, non-empty lines
    pub lines: &'a [String],
    /// Extraction thresholds
    pub config: &'a ExtractionConfig,
}

impl<'a> LineContext<'a> {
    /// Create a context over a page's lines.
    pub fn new(lines: &'a [String], config: &'a ExtractionConfig) -> Self {
        Self { lines, config }
    }

    /// Line at `index`, if any.
    pub fn line(&self, index: usize) -> Option<&'a str> {
        self.lines.get(index).map(String::as_str)
    }
}

/// Result of a rule that recognized the line at the cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMatch {
    /// Fields emitted, possibly none
    pub fields: Vec<ExtractedField>,
    /// Lines consumed, at least one
    pub consumed: usize,
}

impl RuleMatch {
    /// One field from one line.
    pub fn single(field: ExtractedField) -> Self {
        Self {
            fields: vec![field],
            consumed: 1,
        }
    }

    /// Several fields from `consumed` lines.
    pub fn new(fields: Vec<ExtractedField>, consumed: usize) -> Self {
        Self {
            fields,
            consumed: consumed.max(1),
        }
    }
}

/// One predicate-and-constructor step of the classifier.
///
/// Rules are independent: each looks at the line under the cursor (and, for
/// grouping rules, the lines after it) and either declines or emits fields.
pub trait LineRule: Send + Sync {
    /// Try to recognize the line at `cursor`.
    fn apply(&self, ctx: &LineContext<'_>, cursor: usize) -> Option<RuleMatch>;

    /// Return the name of this rule for debugging.
    fn name(&self) -> &'static str;
}

/// Runs an ordered rule list over the lines of a page.
#[derive(Clone, Copy)]
pub struct LineClassifier<'c> {
    config: &'c ExtractionConfig,
    rules: &'c [&'c dyn LineRule],
}

impl std::fmt::Debug for LineClassifier<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineClassifier")
            .field("rules", &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>())
            .finish()
    }
}

impl<'c> LineClassifier<'c> {
    /// Classifier with the default rule set.
    pub fn new(config: &'c ExtractionConfig) -> Self {
        Self {
            config,
            rules: DEFAULT_RULES,
        }
    }

    /// Classifier with a custom rule list, tried in the given order.
    pub fn with_rules(config: &'c ExtractionConfig, rules: &'c [&'c dyn LineRule]) -> Self {
        Self { config, rules }
    }

    /// Classify the lines of one page.
    ///
    /// A `(type, label)` pair is emitted at most once per page; inline-text
    /// fields are exempt since their labels are whole sentences.
    pub fn classify(&self, lines: &[String]) -> Vec<ExtractedField> {
        let ctx = LineContext::new(lines, self.config);
        let mut seen: HashSet<(FieldType, String)> = HashSet::new();
        let mut fields = Vec::new();

        let mut cursor = 0;
        while cursor < lines.len() {
            let matched = self
                .rules
                .iter()
                .find_map(|rule| rule.apply(&ctx, cursor).map(|m| (rule.name(), m)));

            match matched {
                Some((name, m)) => {
                    log::debug!(
                        "Line {} matched {} ({} field(s), {} line(s))",
                        cursor,
                        name,
                        m.fields.len(),
                        m.consumed
                    );
                    for field in m.fields {
                        let field_type = field.field_type();
                        if field_type != FieldType::InlineText
                            && !seen.insert((field_type, field.label.clone()))
                        {
                            continue;
                        }
                        fields.push(field);
                    }
                    cursor += m.consumed.max(1);
                },
                None => {
                    log::trace!("Line {} unmatched: {:?}", cursor, lines[cursor]);
                    cursor += 1;
                },
            }
        }

        fields
    }
}

/// First signer role named in a lowercased line.
pub(crate) fn find_role(lower: &str) -> Option<&'static str> {
    ROLES
        .iter()
        .copied()
        .find(|role| contains_word(lower, &role.to_lowercase()))
}

/// Prefix `base` with the signer role found in the line, if any.
pub(crate) fn role_qualified(lower: &str, base: &str) -> String {
    match find_role(lower) {
        Some(role) => format!("{} {}", role, base),
        None => base.to_string(),
    }
}

/// Number of words containing a letter or digit.
pub(crate) fn word_count(line: &str) -> usize {
    line.split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .count()
}
