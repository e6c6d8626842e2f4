//! Widget annotation validation and classification.
//!
//! Turns the loosely-shaped [`RawWidget`] records reported by a PDF backend
//! into validated [`WidgetAnnotation`]s, then decides which field each widget
//! becomes. Field flags follow ISO 32000-1:2008 Section 12.7.3.
//!
//! Radio buttons are not turned into fields here: a radio group spans several
//! widgets (often on different pages), so they are handed to the
//! [`RadioGroupAggregator`](crate::radio::RadioGroupAggregator) instead.

use crate::backend::{RawFieldKind, RawOption, RawWidget};
use crate::error::{Error, Result};
use crate::fields::{ExtractedField, FieldOption, FieldShape, FieldType, Provenance};
use crate::geometry::Rect;
use crate::label::guess_type;
use bitflags::bitflags;
use indexmap::IndexSet;

bitflags! {
    /// Field flags (`/Ff`) used when classifying widgets.
    ///
    /// ISO 32000-1:2008 Tables 221, 226, 228 and 230.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FieldFlags: u32 {
        /// Bit 2: Field is required
        const REQUIRED = 1 << 1;

        /// Bit 13: Text may include multiple lines
        const MULTILINE = 1 << 12;

        /// Bit 16: Button is a radio button
        const RADIO = 1 << 15;

        /// Bit 17: Button is a push button
        const PUSH_BUTTON = 1 << 16;

        /// Bit 18: Choice is a combo box
        const COMBO = 1 << 17;

        /// Bit 22: Choice allows multiple selections
        const MULTI_SELECT = 1 << 21;
    }
}

/// Form-field kind of a validated widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    /// Text field
    Text,
    /// Choice field (list or combo box)
    Choice,
    /// Button field (checkbox, radio or push button)
    Button,
    /// Signature field
    Signature,
}

impl WidgetKind {
    /// Provenance tag carried by fields built from this kind.
    pub fn provenance(&self) -> Provenance {
        match self {
            WidgetKind::Text => Provenance::Text,
            WidgetKind::Choice => Provenance::Choice,
            WidgetKind::Button => Provenance::Button,
            WidgetKind::Signature => Provenance::Signature,
        }
    }
}

/// A widget annotation that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetAnnotation {
    /// Field kind
    pub kind: WidgetKind,
    /// Normalized widget rectangle
    pub rect: Rect,
    /// Internal field name; may be empty
    pub name: String,
    /// Field must be filled in
    pub required: bool,
    /// Text field accepts several lines
    pub multiline: bool,
    /// Choice field accepts several selections
    pub multi_select: bool,
    /// Button is a radio button
    pub is_radio: bool,
    /// Button is a checkbox
    pub is_checkbox: bool,
    /// On-state export value of a button
    pub export_value: Option<String>,
    /// Choice options, deduplicated
    pub options: Vec<FieldOption>,
}

/// What a widget turns into once its label is known.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetOutcome {
    /// A finished field
    Field(ExtractedField),
    /// A radio button; belongs to a group
    RadioMember,
    /// A push button; carries no data
    Ignored,
}

impl WidgetAnnotation {
    /// Validate a raw widget.
    ///
    /// Explicit booleans reported by the backend take precedence over the
    /// flag bitmask; `required` is set if either says so.
    pub fn from_raw(raw: &RawWidget) -> Result<Self> {
        let kind = match &raw.kind {
            Some(RawFieldKind::Text) => WidgetKind::Text,
            Some(RawFieldKind::Choice) => WidgetKind::Choice,
            Some(RawFieldKind::Button) => WidgetKind::Button,
            Some(RawFieldKind::Signature) => WidgetKind::Signature,
            Some(RawFieldKind::Other(name)) => {
                return Err(Error::MalformedAnnotation(format!(
                    "unsupported field type /{}",
                    name
                )));
            },
            None => {
                return Err(Error::MalformedAnnotation("widget has no field type".to_string()));
            },
        };

        let coords = raw
            .rect
            .ok_or_else(|| Error::MalformedAnnotation("widget has no /Rect".to_string()))?;
        let rect = Rect::from_array(coords).ok_or_else(|| {
            Error::MalformedAnnotation(format!("widget /Rect is not numeric: {:?}", coords))
        })?;

        let flags = FieldFlags::from_bits_truncate(raw.flags);
        let is_button = kind == WidgetKind::Button;
        let is_radio = is_button && raw.radio.unwrap_or(flags.contains(FieldFlags::RADIO));
        let is_checkbox = is_button
            && !is_radio
            && raw.checkbox.unwrap_or(!flags.contains(FieldFlags::PUSH_BUTTON));

        let name = raw.name.as_deref().map(str::trim).unwrap_or_default().to_string();
        if is_radio && name.is_empty() {
            return Err(Error::MalformedAnnotation(
                "radio button without a field name".to_string(),
            ));
        }

        Ok(Self {
            kind,
            rect,
            name,
            required: raw.required.unwrap_or(false) || flags.contains(FieldFlags::REQUIRED),
            multiline: raw.multiline.unwrap_or(flags.contains(FieldFlags::MULTILINE)),
            multi_select: raw.multi_select.unwrap_or(flags.contains(FieldFlags::MULTI_SELECT)),
            is_radio,
            is_checkbox,
            export_value: raw.export_value.clone().filter(|v| !v.trim().is_empty()),
            options: normalize_options(&raw.options),
        })
    }

    /// Build the field for this widget given its resolved label.
    pub fn classify(&self, label: &str) -> WidgetOutcome {
        let pdf_type = self.kind.provenance();
        let shape = match self.kind {
            WidgetKind::Text if self.multiline => FieldShape::Textarea,
            WidgetKind::Text => match guess_type(label) {
                FieldType::Email => FieldShape::Email,
                FieldType::Phone => FieldShape::Phone,
                FieldType::Date => FieldShape::Date,
                FieldType::Time => FieldShape::Time,
                FieldType::Number => FieldShape::Number,
                _ => FieldShape::Text,
            },
            WidgetKind::Choice if self.multi_select => FieldShape::Multiselect {
                options: self.options.clone(),
            },
            WidgetKind::Choice => FieldShape::Select {
                options: self.options.clone(),
            },
            WidgetKind::Button if self.is_radio => return WidgetOutcome::RadioMember,
            WidgetKind::Button if self.is_checkbox => FieldShape::Checkbox {
                checkbox_text: label.to_string(),
            },
            WidgetKind::Button => return WidgetOutcome::Ignored,
            WidgetKind::Signature => FieldShape::Signature,
        };

        WidgetOutcome::Field(ExtractedField::new(shape, label, pdf_type).with_required(self.required))
    }
}

/// Normalize choice options from any source shape, dropping repeats.
///
/// Pairs are `[export, display]`; objects missing one side reuse the other;
/// scalars are both value and label. Options with neither are dropped.
pub fn normalize_options(raw: &[RawOption]) -> Vec<FieldOption> {
    let mut seen = IndexSet::new();
    for option in raw {
        let (value, label) = match option {
            RawOption::Pair(value, label) => (value.trim(), label.trim()),
            RawOption::Object { value, label } => {
                let value = value.as_deref().map(str::trim).unwrap_or_default();
                let label = label.as_deref().map(str::trim).unwrap_or_default();
                match (value.is_empty(), label.is_empty()) {
                    (true, true) => continue,
                    (true, false) => (label, label),
                    (false, true) => (value, value),
                    (false, false) => (value, label),
                }
            },
            RawOption::Scalar(text) => (text.trim(), text.trim()),
        };
        if value.is_empty() && label.is_empty() {
            continue;
        }
        seen.insert(FieldOption::new(value, label));
    }
    seen.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(kind: RawFieldKind, flags: u32) -> RawWidget {
        RawWidget {
            kind: Some(kind),
            rect: Some([100.0, 700.0, 300.0, 720.0]),
            name: Some("field".to_string()),
            flags,
            ..RawWidget::default()
        }
    }

    #[test]
    fn test_multiline_text_is_textarea_regardless_of_label() {
        let widget =
            WidgetAnnotation::from_raw(&raw(RawFieldKind::Text, FieldFlags::MULTILINE.bits()))
                .unwrap();
        match widget.classify("Email") {
            WidgetOutcome::Field(field) => assert_eq!(field.field_type(), FieldType::Textarea),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_text_type_guessed_from_label() {
        let widget = WidgetAnnotation::from_raw(&raw(RawFieldKind::Text, 0)).unwrap();
        match widget.classify("Email") {
            WidgetOutcome::Field(field) => {
                assert_eq!(field.field_type(), FieldType::Email);
                assert_eq!(field.pdf_type, Provenance::Text);
            },
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_required_from_flag_or_explicit() {
        let flagged =
            WidgetAnnotation::from_raw(&raw(RawFieldKind::Text, FieldFlags::REQUIRED.bits()))
                .unwrap();
        assert!(flagged.required);

        let mut explicit = raw(RawFieldKind::Text, 0);
        explicit.required = Some(true);
        assert!(WidgetAnnotation::from_raw(&explicit).unwrap().required);
        assert!(!WidgetAnnotation::from_raw(&raw(RawFieldKind::Text, 0)).unwrap().required);
    }

    #[test]
    fn test_button_kinds() {
        let checkbox = WidgetAnnotation::from_raw(&raw(RawFieldKind::Button, 0)).unwrap();
        assert!(checkbox.is_checkbox);
        assert!(matches!(checkbox.classify("I agree"), WidgetOutcome::Field(_)));

        let radio =
            WidgetAnnotation::from_raw(&raw(RawFieldKind::Button, FieldFlags::RADIO.bits()))
                .unwrap();
        assert_eq!(radio.classify("Male"), WidgetOutcome::RadioMember);

        let push =
            WidgetAnnotation::from_raw(&raw(RawFieldKind::Button, FieldFlags::PUSH_BUTTON.bits()))
                .unwrap();
        assert_eq!(push.classify("Submit"), WidgetOutcome::Ignored);
    }

    #[test]
    fn test_explicit_radio_flag_wins() {
        let mut widget = raw(RawFieldKind::Button, 0);
        widget.radio = Some(true);
        let widget = WidgetAnnotation::from_raw(&widget).unwrap();
        assert!(widget.is_radio);
        assert!(!widget.is_checkbox);
    }

    #[test]
    fn test_checkbox_text_is_label() {
        let widget = WidgetAnnotation::from_raw(&raw(RawFieldKind::Button, 0)).unwrap();
        match widget.classify("I agree to the terms") {
            WidgetOutcome::Field(field) => assert_eq!(
                field.shape,
                FieldShape::Checkbox {
                    checkbox_text: "I agree to the terms".to_string()
                }
            ),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_malformed_widgets_rejected() {
        let mut no_rect = raw(RawFieldKind::Text, 0);
        no_rect.rect = None;
        assert!(matches!(
            WidgetAnnotation::from_raw(&no_rect),
            Err(Error::MalformedAnnotation(_))
        ));

        let mut nan_rect = raw(RawFieldKind::Text, 0);
        nan_rect.rect = Some([f32::NAN, 0.0, 1.0, 1.0]);
        assert!(WidgetAnnotation::from_raw(&nan_rect).is_err());

        let unknown = raw(RawFieldKind::Other("Xx".to_string()), 0);
        assert!(WidgetAnnotation::from_raw(&unknown).is_err());

        let mut unnamed_radio = raw(RawFieldKind::Button, FieldFlags::RADIO.bits());
        unnamed_radio.name = None;
        assert!(WidgetAnnotation::from_raw(&unnamed_radio).is_err());
    }

    #[test]
    fn test_choice_options_normalized() {
        let mut widget = raw(RawFieldKind::Choice, FieldFlags::MULTI_SELECT.bits());
        widget.options = vec![
            RawOption::Pair("ca".to_string(), "California".to_string()),
            RawOption::Object {
                value: Some("ny".to_string()),
                label: None,
            },
            RawOption::Scalar("Texas".to_string()),
            RawOption::Pair("ca".to_string(), "California".to_string()),
            RawOption::Object {
                value: None,
                label: None,
            },
        ];
        let widget = WidgetAnnotation::from_raw(&widget).unwrap();
        assert_eq!(
            widget.options,
            vec![
                FieldOption::new("ca", "California"),
                FieldOption::new("ny", "ny"),
                FieldOption::new("Texas", "Texas"),
            ]
        );
        match widget.classify("States") {
            WidgetOutcome::Field(field) => {
                assert_eq!(field.field_type(), FieldType::Multiselect);
                assert_eq!(field.options().len(), 3);
            },
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_same_value_different_label_kept() {
        let options = normalize_options(&[
            RawOption::Pair("1".to_string(), "One".to_string()),
            RawOption::Pair("1".to_string(), "Uno".to_string()),
        ]);
        assert_eq!(options.len(), 2);
    }
}
