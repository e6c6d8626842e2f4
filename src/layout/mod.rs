//! Row index over a page's text layer.
//!
//! Text runs are bucketed by their rounded baseline Y so that runs placed a
//! fraction of a unit apart still land on the same row. Within a row items are
//! kept in left-to-right order. The index is built once per page and only
//! read afterwards.

use crate::backend::TextRun;
use crate::utils::safe_float_cmp;
use std::collections::BTreeMap;
use std::ops::Bound;

/// One positioned run of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    /// X of the run origin
    pub x: f32,
    /// Y of the run baseline
    pub y: f32,
    /// Run text
    pub text: String,
}

impl TextItem {
    /// Create a new text item.
    pub fn new(x: f32, y: f32, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            text: text.into(),
        }
    }

    /// Take the position from a run's rendering matrix.
    pub fn from_run(run: &TextRun) -> Self {
        Self::new(run.transform[4], run.transform[5], run.text.clone())
    }
}

/// Text items grouped into rows keyed by rounded Y.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextRows {
    rows: BTreeMap<i32, Vec<TextItem>>,
}

impl TextRows {
    /// Index the runs of one page. Blank runs and runs at non-finite
    /// positions are dropped.
    pub fn from_runs(runs: &[TextRun]) -> Self {
        Self::from_items(runs.iter().map(TextItem::from_run))
    }

    /// Index arbitrary text items.
    pub fn from_items(items: impl IntoIterator<Item = TextItem>) -> Self {
        let mut rows: BTreeMap<i32, Vec<TextItem>> = BTreeMap::new();
        for item in items {
            if item.text.trim().is_empty() || !item.x.is_finite() || !item.y.is_finite() {
                continue;
            }
            rows.entry(item.y.round() as i32).or_default().push(item);
        }
        for row in rows.values_mut() {
            // stable sort keeps content order for runs at the same x
            row.sort_by(|a, b| safe_float_cmp(a.x, b.x));
        }
        Self { rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the page has no text.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Items of the row with the given key.
    pub fn row(&self, key: i32) -> Option<&[TextItem]> {
        self.rows.get(&key).map(Vec::as_slice)
    }

    /// Rows whose key lies within `band` of `y`, in ascending key order.
    pub fn rows_near(&self, y: f32, band: f32) -> impl Iterator<Item = (i32, &[TextItem])> + '_ {
        let (low, high) = if y.is_finite() && band.is_finite() {
            ((y - band).ceil() as i32, (y + band).floor() as i32)
        } else {
            (0, -1)
        };
        let range = if low <= high {
            (Bound::Included(low), Bound::Included(high))
        } else {
            (Bound::Included(low), Bound::Excluded(low))
        };
        self.rows
            .range(range)
            .map(|(key, items)| (*key, items.as_slice()))
    }

    /// All rows top-down as plain lines.
    pub fn lines(&self) -> Vec<String> {
        self.rows
            .values()
            .rev()
            .map(|items| {
                items
                    .iter()
                    .map(|i| i.text.trim())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jitter_lands_in_same_row() {
        let rows = TextRows::from_items(vec![
            TextItem::new(150.0, 700.2, "Name"),
            TextItem::new(72.0, 699.8, "Full"),
        ]);
        assert_eq!(rows.len(), 1);
        let row = rows.row(700).unwrap();
        assert_eq!(row[0].text, "Full");
        assert_eq!(row[1].text, "Name");
    }

    #[test]
    fn test_blank_runs_dropped() {
        let rows = TextRows::from_items(vec![TextItem::new(0.0, 10.0, "  ")]);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_rows_near_band() {
        let rows = TextRows::from_items(vec![
            TextItem::new(0.0, 100.0, "a"),
            TextItem::new(0.0, 106.0, "b"),
            TextItem::new(0.0, 107.0, "c"),
            TextItem::new(0.0, 94.0, "d"),
        ]);
        let keys: Vec<i32> = rows.rows_near(100.0, 6.0).map(|(k, _)| k).collect();
        assert_eq!(keys, vec![94, 100, 106]);
    }

    #[test]
    fn test_rows_near_nan_is_empty() {
        let rows = TextRows::from_items(vec![TextItem::new(0.0, 100.0, "a")]);
        assert_eq!(rows.rows_near(f32::NAN, 6.0).count(), 0);
    }

    #[test]
    fn test_lines_top_down() {
        let rows = TextRows::from_items(vec![
            TextItem::new(72.0, 600.0, "Second"),
            TextItem::new(72.0, 700.0, "First"),
            TextItem::new(120.0, 700.0, "line"),
        ]);
        assert_eq!(rows.lines(), vec!["First line", "Second"]);
    }
}
