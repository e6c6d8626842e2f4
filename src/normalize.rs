//! Cross-page de-duplication and label uniqueness.

use crate::fields::ExtractedField;
use crate::text::title_case;
use std::collections::HashSet;

/// Keys of fields already emitted in this run.
///
/// Inline fields are keyed by their parts, everything else by type and
/// label (see [`ExtractedField::dedup_key`]).
#[derive(Debug, Clone, Default)]
pub struct SeenFields {
    keys: HashSet<String>,
}

impl SeenFields {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a field. Returns `false` if an identical field was already seen.
    pub fn insert(&mut self, field: &ExtractedField) -> bool {
        self.keys.insert(field.dedup_key())
    }

    /// Number of distinct fields seen.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether nothing was seen yet.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Make every label unique, ignoring case.
///
/// The first field with a label keeps it; later ones get ` 2`, ` 3`, ...
/// appended, skipping any suffixed label that already exists in the list.
/// Empty labels are replaced with the field's type name first.
///
/// # Examples
///
/// ```
/// use pdf_formscan::fields::{ExtractedField, FieldType, Provenance};
/// use pdf_formscan::normalize::unique_labels;
///
/// let fields = vec![
///     ExtractedField::plain(FieldType::Text, "Name", Provenance::Ocr),
///     ExtractedField::plain(FieldType::Text, "name", Provenance::Ocr),
/// ];
/// let labels: Vec<_> = unique_labels(fields).into_iter().map(|f| f.label).collect();
/// assert_eq!(labels, vec!["Name", "name 2"]);
/// ```
pub fn unique_labels(mut fields: Vec<ExtractedField>) -> Vec<ExtractedField> {
    for field in fields.iter_mut() {
        if field.label.trim().is_empty() {
            field.label = title_case(field.field_type().as_str());
        }
    }

    let mut taken: HashSet<String> = fields.iter().map(|f| f.label.to_lowercase()).collect();
    let mut assigned: HashSet<String> = HashSet::with_capacity(fields.len());

    for field in fields.iter_mut() {
        let key = field.label.to_lowercase();
        if assigned.insert(key) {
            continue;
        }

        let mut n = 2;
        let renamed = loop {
            let candidate = format!("{} {}", field.label, n);
            let candidate_key = candidate.to_lowercase();
            if !taken.contains(&candidate_key) && !assigned.contains(&candidate_key) {
                break candidate;
            }
            n += 1;
        };
        log::debug!("Renamed duplicate label '{}' to '{}'", field.label, renamed);
        taken.insert(renamed.to_lowercase());
        assigned.insert(renamed.to_lowercase());
        field.label = renamed;
    }

    fields
}
