//! Proximity label matching and keyword type guessing.
//!
//! A widget's label is usually printed just to its left on the same line.
//! [`LabelResolver`] looks at the rows within a narrow vertical band around
//! the widget's centre and picks the row whose nearest left-hand text is
//! closest to the widget's left edge.

use crate::config::ExtractionConfig;
use crate::fields::FieldType;
use crate::geometry::Rect;
use crate::layout::{TextItem, TextRows};
use crate::text::{clean_label, title_case};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_EMAIL: Regex = Regex::new(r"(?i)\be-?mail\b").unwrap();
    static ref RE_PHONE: Regex =
        Regex::new(r"(?i)\b(phone|telephone|tel|mobile|cell|fax)\b").unwrap();
    static ref RE_DATE: Regex =
        Regex::new(r"(?i)\b(date|dob|d\.o\.b|birthday|birthdate|mm\s*/\s*dd)\b").unwrap();
    static ref RE_TIME: Regex = Regex::new(r"(?i)\b(time|hh\s*:\s*mm)\b").unwrap();
    static ref RE_URL: Regex = Regex::new(r"(?i)\b(url|website|web\s+site|homepage)\b").unwrap();
    static ref RE_NUMBER: Regex = Regex::new(
        r"(?i)(#|\bno\.|\b(number|num|amount|age|zip|zipcode|postal\s+code|qty|quantity|count|total)\b)"
    )
    .unwrap();
}

/// Guess a field type from its label.
///
/// Checked in order email, phone, date, time, url, number; the first hit
/// wins. Web addresses have no dedicated type and map to `text`.
///
/// # Examples
///
/// ```
/// use pdf_formscan::fields::FieldType;
/// use pdf_formscan::label::guess_type;
///
/// assert_eq!(guess_type("Email"), FieldType::Email);
/// assert_eq!(guess_type("Phone Number"), FieldType::Phone);
/// assert_eq!(guess_type("Date of Birth"), FieldType::Date);
/// assert_eq!(guess_type("Website"), FieldType::Text);
/// assert_eq!(guess_type("First Name"), FieldType::Text);
/// ```
pub fn guess_type(label: &str) -> FieldType {
    if RE_EMAIL.is_match(label) {
        FieldType::Email
    } else if RE_PHONE.is_match(label) {
        FieldType::Phone
    } else if RE_DATE.is_match(label) {
        FieldType::Date
    } else if RE_TIME.is_match(label) {
        FieldType::Time
    } else if RE_URL.is_match(label) {
        FieldType::Text
    } else if RE_NUMBER.is_match(label) {
        FieldType::Number
    } else {
        FieldType::Text
    }
}

/// Finds the printed label of a widget from the page's text rows.
#[derive(Debug, Clone, Copy)]
pub struct LabelResolver<'a> {
    rows: &'a TextRows,
    band: f32,
    max_items: usize,
}

impl<'a> LabelResolver<'a> {
    /// Create a resolver over one page's rows.
    pub fn new(rows: &'a TextRows, config: &ExtractionConfig) -> Self {
        Self {
            rows,
            band: config.label_band,
            max_items: config.label_max_items.max(1),
        }
    }

    /// Nearest text left of `rect`, cleaned; `None` if nothing qualifies.
    /// Rows whose text contains control characters never qualify.
    ///
    /// Rows are scored by the gap between the widget's left edge and the
    /// start of the rightmost kept item. On equal scores the row with the
    /// lower key wins.
    pub fn resolve(&self, rect: &Rect) -> Option<String> {
        let center_y = rect.center().y;
        let left = rect.left();

        let mut best: Option<(f32, String)> = None;
        for (key, items) in self.rows.rows_near(center_y, self.band) {
            let before: Vec<&TextItem> = items.iter().filter(|i| i.x < left).collect();
            let kept = &before[before.len().saturating_sub(self.max_items)..];
            let nearest = match kept.last() {
                Some(item) => item,
                None => continue,
            };

            let label = clean_label(
                &kept
                    .iter()
                    .map(|i| i.text.trim())
                    .collect::<Vec<_>>()
                    .join(" "),
            );
            if label.is_empty() || label.chars().any(char::is_control) {
                continue;
            }

            let score = left - nearest.x;
            log::trace!("Label candidate row {} score {:.1}: {:?}", key, score, label);
            match &best {
                Some((best_score, _)) if score >= *best_score => {},
                _ => best = Some((score, label)),
            }
        }

        best.map(|(_, label)| label)
    }

    /// Resolved label, or the title-cased field name when nothing is near.
    pub fn resolve_or_name(&self, rect: &Rect, name: &str) -> String {
        self.resolve(rect).unwrap_or_else(|| title_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(items: Vec<(f32, f32, &str)>) -> TextRows {
        TextRows::from_items(items.into_iter().map(|(x, y, t)| TextItem::new(x, y, t)))
    }

    fn widget() -> Rect {
        Rect::from_points(150.0, 696.0, 350.0, 712.0)
    }

    #[test]
    fn test_label_left_of_widget() {
        let rows = rows(vec![(72.0, 702.0, "Email:"), (400.0, 702.0, "(work)")]);
        let config = ExtractionConfig::default();
        let resolver = LabelResolver::new(&rows, &config);
        assert_eq!(resolver.resolve(&widget()), Some("Email".to_string()));
    }

    #[test]
    fn test_multiword_label_joined() {
        let rows = rows(vec![(72.0, 704.0, "Date"), (95.0, 704.0, "of"), (110.0, 704.0, "Birth *")]);
        let config = ExtractionConfig::default();
        let resolver = LabelResolver::new(&rows, &config);
        assert_eq!(resolver.resolve(&widget()), Some("Date of Birth".to_string()));
    }

    #[test]
    fn test_closer_row_wins() {
        let rows = rows(vec![(20.0, 700.0, "Far"), (100.0, 708.0, "Near:")]);
        let config = ExtractionConfig::default();
        let resolver = LabelResolver::new(&rows, &config);
        assert_eq!(resolver.resolve(&widget()), Some("Near".to_string()));
    }

    #[test]
    fn test_tie_goes_to_lower_row() {
        let rows = rows(vec![(100.0, 708.0, "Upper"), (100.0, 700.0, "Lower")]);
        let config = ExtractionConfig::default();
        let resolver = LabelResolver::new(&rows, &config);
        assert_eq!(resolver.resolve(&widget()), Some("Lower".to_string()));
    }

    #[test]
    fn test_text_outside_band_ignored() {
        let rows = rows(vec![(72.0, 740.0, "Heading")]);
        let config = ExtractionConfig::default();
        let resolver = LabelResolver::new(&rows, &config);
        assert_eq!(resolver.resolve(&widget()), None);
        assert_eq!(resolver.resolve_or_name(&widget(), "email_addr"), "Email Addr");
    }

    #[test]
    fn test_only_nearest_items_kept() {
        let rows = rows(vec![
            (10.0, 704.0, "Please"),
            (40.0, 704.0, "enter"),
            (70.0, 704.0, "your"),
            (100.0, 704.0, "name:"),
        ]);
        let config = ExtractionConfig::default().with_label_max_items(2);
        let resolver = LabelResolver::new(&rows, &config);
        assert_eq!(resolver.resolve(&widget()), Some("your name".to_string()));
    }

    #[test]
    fn test_resolution_is_stable() {
        let rows = rows(vec![(100.0, 708.0, "A:"), (100.0, 700.0, "B:"), (90.0, 703.0, "C:")]);
        let config = ExtractionConfig::default();
        let resolver = LabelResolver::new(&rows, &config);
        let first = resolver.resolve(&widget());
        for _ in 0..10 {
            assert_eq!(resolver.resolve(&widget()), first);
        }
    }

    #[test]
    fn test_guess_type_keywords() {
        assert_eq!(guess_type("Cell"), FieldType::Phone);
        assert_eq!(guess_type("Appointment Time"), FieldType::Time);
        assert_eq!(guess_type("Zip Code"), FieldType::Number);
        assert_eq!(guess_type("Student ID #"), FieldType::Number);
        assert_eq!(guess_type("Home Page URL"), FieldType::Text);
        assert_eq!(guess_type("Emergency Contact"), FieldType::Text);
    }

    #[test]
    fn test_garbled_row_falls_back_to_name() {
        let rows = rows(vec![(72.0, 702.0, "\0E\0m\0a\0i\0l")]);
        let config = ExtractionConfig::default();
        let resolver = LabelResolver::new(&rows, &config);
        assert_eq!(resolver.resolve(&widget()), None);
        assert_eq!(resolver.resolve_or_name(&widget(), "email_addr"), "Email Addr");
    }
}
