//! Extracted field records handed to the form-builder import step.
//!
//! A field's payload depends on its type: choice fields carry options,
//! checkboxes carry their caption, inline-text fields carry their parts.
//! [`FieldShape`] encodes that as an enum tagged by `type`, so a record can
//! never hold options it does not use.

use crate::text::slugify;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of field types understood by the form builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    /// Single-line text
    Text,
    /// Email address
    Email,
    /// Phone number
    Phone,
    /// Numeric value
    Number,
    /// Calendar date
    Date,
    /// Time of day
    Time,
    /// Multi-line text
    Textarea,
    /// Single-choice dropdown
    Select,
    /// Single choice among visible options
    Radio,
    /// Single boolean box
    Checkbox,
    /// Multiple-choice list
    Multiselect,
    /// Signature pad
    Signature,
    /// Section heading (no input)
    Heading,
    /// Sentence with embedded blanks
    InlineText,
}

impl FieldType {
    /// Name used by the form builder.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::Textarea => "textarea",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::Multiselect => "multiselect",
            FieldType::Signature => "signature",
            FieldType::Heading => "heading",
            FieldType::InlineText => "inlineText",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a field came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provenance {
    /// Text widget (`/FT /Tx`)
    #[serde(rename = "Tx")]
    Text,
    /// Choice widget (`/FT /Ch`)
    #[serde(rename = "Ch")]
    Choice,
    /// Button widget (`/FT /Btn`)
    #[serde(rename = "Btn")]
    Button,
    /// Signature widget (`/FT /Sig`)
    #[serde(rename = "Sig")]
    Signature,
    /// Recovered from recognized page text
    #[serde(rename = "OCR")]
    Ocr,
}

/// One selectable option of a choice or radio field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldOption {
    /// Value submitted when the option is chosen
    pub value: String,
    /// Text shown to the user
    pub label: String,
}

impl FieldOption {
    /// Create an option from a value and a display label.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Create an option whose value is the slug of its label.
    pub fn from_label(label: impl Into<String>) -> Self {
        let label = label.into();
        let value = match slugify(&label) {
            slug if slug.is_empty() => label.clone(),
            slug => slug,
        };
        Self { value, label }
    }
}

/// A fragment of an inline-text line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "camelCase")]
pub enum InlinePart {
    /// Literal text between blanks
    Text {
        /// The literal text
        value: String,
    },
    /// A named blank to be filled in
    #[serde(rename_all = "camelCase")]
    Input {
        /// Best-guess type of the blank
        input_type: FieldType,
        /// Identifier derived from the words preceding the blank
        name: String,
    },
}

/// Type-specific payload of a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldShape {
    /// Single-line text
    Text,
    /// Email address
    Email,
    /// Phone number
    Phone,
    /// Numeric value
    Number,
    /// Calendar date
    Date,
    /// Time of day
    Time,
    /// Multi-line text
    Textarea,
    /// Single-choice dropdown; options may be empty
    Select {
        /// Available options
        options: Vec<FieldOption>,
    },
    /// Multiple-choice list; options may be empty
    Multiselect {
        /// Available options
        options: Vec<FieldOption>,
    },
    /// Radio group; always at least one option
    Radio {
        /// Available options
        options: Vec<FieldOption>,
    },
    /// Single checkbox
    #[serde(rename_all = "camelCase")]
    Checkbox {
        /// Caption printed next to the box
        checkbox_text: String,
    },
    /// Signature pad
    Signature,
    /// Section heading
    Heading,
    /// Sentence with embedded blanks
    InlineText {
        /// Alternating literal text and blanks
        parts: Vec<InlinePart>,
    },
}

impl FieldShape {
    /// Payload-free shape for a type, if the type needs no payload.
    pub fn plain(field_type: FieldType) -> Option<Self> {
        match field_type {
            FieldType::Text => Some(FieldShape::Text),
            FieldType::Email => Some(FieldShape::Email),
            FieldType::Phone => Some(FieldShape::Phone),
            FieldType::Number => Some(FieldShape::Number),
            FieldType::Date => Some(FieldShape::Date),
            FieldType::Time => Some(FieldShape::Time),
            FieldType::Textarea => Some(FieldShape::Textarea),
            FieldType::Signature => Some(FieldShape::Signature),
            FieldType::Heading => Some(FieldShape::Heading),
            FieldType::Select
            | FieldType::Radio
            | FieldType::Checkbox
            | FieldType::Multiselect
            | FieldType::InlineText => None,
        }
    }

    /// The type tag of this shape.
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldShape::Text => FieldType::Text,
            FieldShape::Email => FieldType::Email,
            FieldShape::Phone => FieldType::Phone,
            FieldShape::Number => FieldType::Number,
            FieldShape::Date => FieldType::Date,
            FieldShape::Time => FieldType::Time,
            FieldShape::Textarea => FieldType::Textarea,
            FieldShape::Select { .. } => FieldType::Select,
            FieldShape::Multiselect { .. } => FieldType::Multiselect,
            FieldShape::Radio { .. } => FieldType::Radio,
            FieldShape::Checkbox { .. } => FieldType::Checkbox,
            FieldShape::Signature => FieldType::Signature,
            FieldShape::Heading => FieldType::Heading,
            FieldShape::InlineText { .. } => FieldType::InlineText,
        }
    }
}

fn default_import() -> bool {
    true
}

/// A logical input field recovered from a PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedField {
    /// Type and type-specific payload
    #[serde(flatten)]
    pub shape: FieldShape,
    /// Human-readable label
    pub label: String,
    /// Whether the field must be filled in
    pub required: bool,
    /// Provenance tag
    pub pdf_type: Provenance,
    /// Import toggle for the review step
    #[serde(default = "default_import")]
    pub import: bool,
}

impl ExtractedField {
    /// Create a field from a shape.
    pub fn new(shape: FieldShape, label: impl Into<String>, pdf_type: Provenance) -> Self {
        Self {
            shape,
            label: label.into(),
            required: false,
            pdf_type,
            import: true,
        }
    }

    /// Create a payload-free field. Payload types degrade to `text`.
    pub fn plain(field_type: FieldType, label: impl Into<String>, pdf_type: Provenance) -> Self {
        let shape = FieldShape::plain(field_type).unwrap_or(FieldShape::Text);
        Self::new(shape, label, pdf_type)
    }

    /// Create a radio field. Returns `None` when there are no options.
    pub fn radio(
        label: impl Into<String>,
        options: Vec<FieldOption>,
        pdf_type: Provenance,
    ) -> Option<Self> {
        if options.is_empty() {
            return None;
        }
        Some(Self::new(FieldShape::Radio { options }, label, pdf_type))
    }

    /// Mark the field as required or optional.
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// The type tag of this field.
    pub fn field_type(&self) -> FieldType {
        self.shape.field_type()
    }

    /// Options of a choice or radio field; empty for other types.
    pub fn options(&self) -> &[FieldOption] {
        match &self.shape {
            FieldShape::Select { options }
            | FieldShape::Multiselect { options }
            | FieldShape::Radio { options } => options,
            _ => &[],
        }
    }

    /// Inline parts of an inline-text field; empty for other types.
    pub fn parts(&self) -> &[InlinePart] {
        match &self.shape {
            FieldShape::InlineText { parts } => parts,
            _ => &[],
        }
    }

    /// Identity used to drop repeated fields.
    ///
    /// Inline fields are keyed by their parts since their labels repeat
    /// across unrelated sentences.
    pub fn dedup_key(&self) -> String {
        match &self.shape {
            FieldShape::InlineText { parts } => {
                let mut key = String::from("inlineText");
                for part in parts {
                    match part {
                        InlinePart::Text { value } => {
                            key.push_str("|t:");
                            key.push_str(value);
                        },
                        InlinePart::Input { input_type, name } => {
                            key.push_str("|i:");
                            key.push_str(input_type.as_str());
                            key.push(':');
                            key.push_str(name);
                        },
                    }
                }
                key
            },
            shape => format!("{}|{}", shape.field_type(), self.label),
        }
    }
}
