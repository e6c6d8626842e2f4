//! Radio group aggregation across widgets and pages.
//!
//! Each radio button is its own widget annotation; the group identity is the
//! shared fully qualified field name, so `q1.answer` and `q2.answer` stay
//! apart. Members are accumulated as they are seen and turned
//! into one `radio` field per group once every page has been read.

use crate::fields::{ExtractedField, FieldOption, Provenance};
use crate::text::{slugify, title_case};
use indexmap::IndexMap;

/// Options accumulated for one radio group.
#[derive(Debug, Clone, PartialEq)]
pub struct RadioGroup {
    /// Group label, from the field name
    pub label: String,
    /// Options in first-seen order, unique by value
    pub options: Vec<FieldOption>,
    /// Any member widget was required
    pub required: bool,
}

/// Accumulates radio widgets keyed by field name.
#[derive(Debug, Clone, Default)]
pub struct RadioGroupAggregator {
    groups: IndexMap<String, RadioGroup>,
}

impl RadioGroupAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one radio widget to its group.
    ///
    /// The option label is the widget's resolved label, falling back to the
    /// title-cased export value. The option value is the export value,
    /// falling back to the slug of the label. An option whose value is
    /// already in the group is ignored.
    pub fn add(
        &mut self,
        name: &str,
        export_value: Option<&str>,
        resolved_label: Option<&str>,
        required: bool,
    ) {
        let group = self
            .groups
            .entry(name.to_string())
            .or_insert_with(|| RadioGroup {
                label: title_case(name),
                options: Vec::new(),
                required: false,
            });
        group.required |= required;

        let label = match (resolved_label, export_value) {
            (Some(label), _) if !label.trim().is_empty() => label.trim().to_string(),
            (_, Some(value)) => title_case(value),
            _ => format!("Option {}", group.options.len() + 1),
        };
        let value = match export_value {
            Some(value) => value.to_string(),
            None => match slugify(&label) {
                slug if slug.is_empty() => label.clone(),
                slug => slug,
            },
        };

        if group.options.iter().any(|o| o.value == value) {
            log::debug!("Radio group '{}': duplicate export value '{}' ignored", name, value);
            return;
        }
        group.options.push(FieldOption::new(value, label));
    }

    /// Number of groups seen so far.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no radio widget has been seen.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// A group by field name.
    pub fn group(&self, name: &str) -> Option<&RadioGroup> {
        self.groups.get(name)
    }

    /// One radio field per group, in first-seen order.
    pub fn finish(self) -> Vec<ExtractedField> {
        self.groups
            .into_values()
            .filter_map(|group| {
                let required = group.required;
                ExtractedField::radio(group.label, group.options, Provenance::Button)
                    .map(|field| field.with_required(required))
            })
            .collect()
    }
}
