//! Integration tests for the line classifier.
//!
//! Covers whole recognized pages, rule priority, dedup across pages and
//! that labels the classifier emits are not re-matched when fed back in.

use pdf_formscan::classifier::{DEFAULT_RULES, LineClassifier};
use pdf_formscan::normalize::{unique_labels, SeenFields};
use pdf_formscan::{ExtractedField, ExtractionConfig, FieldOption, FieldType, InlinePart};

fn lines(input: &[&str]) -> Vec<String> {
    input.iter().map(|s| s.to_string()).collect()
}

fn classify(input: &[&str]) -> Vec<ExtractedField> {
    let config = ExtractionConfig::default();
    LineClassifier::new(&config).classify(&lines(input))
}

fn summary(fields: &[ExtractedField]) -> Vec<(FieldType, String)> {
    fields
        .iter()
        .map(|f| (f.field_type(), f.label.clone()))
        .collect()
}

#[test]
fn test_intake_form_page() {
    let fields = classify(&[
        "STUDENT INFORMATION",
        "Name: ______________________",
        "Email: _____________________",
        "Phone                    Alternate Phone",
        "Date of Birth ________",
        "Gender",
        "☐ Male ☐ Female",
        "Does the student have any allergies?  Yes  No",
        "Activities",
        "☐ Soccer",
        "☐ Chess",
        "☐ Robotics",
        "I, ____________, give permission for my child to attend.",
        "Parent Signature ______________ Date ________",
        "Printed Name ______________",
    ]);

    assert_eq!(
        summary(&fields),
        vec![
            (FieldType::Heading, "Student Information".to_string()),
            (FieldType::Text, "Name".to_string()),
            (FieldType::Email, "Email".to_string()),
            (FieldType::Phone, "Phone".to_string()),
            (FieldType::Phone, "Alternate Phone".to_string()),
            (FieldType::Date, "Date of Birth".to_string()),
            (FieldType::Radio, "Gender".to_string()),
            (FieldType::Radio, "Does the student have any allergies?".to_string()),
            (FieldType::Multiselect, "Select Options".to_string()),
            (FieldType::InlineText, "I, ___, give permission for my child to attend.".to_string()),
            (FieldType::Signature, "Parent Signature".to_string()),
            (FieldType::Date, "Parent Signature Date".to_string()),
            (FieldType::Text, "Printed Name".to_string()),
        ]
    );

    let gender = &fields[6];
    assert_eq!(
        gender.options(),
        &[FieldOption::new("male", "Male"), FieldOption::new("female", "Female")]
    );
    let activities = &fields[8];
    assert_eq!(activities.options().len(), 3);

    let inline = &fields[9];
    assert!(inline.parts().iter().any(|p| matches!(
        p,
        InlinePart::Input { name, .. } if name == "i"
    )));
}

#[test]
fn test_student_signature_scenario() {
    let fields = classify(&["Student Signature", "Date: ______"]);
    assert_eq!(
        summary(&fields),
        vec![
            (FieldType::Signature, "Student Signature".to_string()),
            (FieldType::Date, "Date".to_string()),
        ]
    );
}

#[test]
fn test_checkbox_scenario() {
    let fields = classify(&["☐ Red", "☐ Green", "☐ Blue"]);
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].field_type(), FieldType::Multiselect);
    assert_eq!(fields[0].label, "Select Options");
    let values: Vec<&str> = fields[0].options().iter().map(|o| o.value.as_str()).collect();
    assert_eq!(values, vec!["red", "green", "blue"]);
}

#[test]
fn test_inline_blank_wins_over_label_value() {
    let fields = classify(&["Name: ________ Grade: ____"]);
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].field_type(), FieldType::InlineText);
}

#[test]
fn test_phone_pair_with_blanks_stays_two_phones() {
    let fields = classify(&["Phone: ____ Alternate Phone: ____"]);
    assert_eq!(
        summary(&fields),
        vec![
            (FieldType::Phone, "Phone".to_string()),
            (FieldType::Phone, "Alternate Phone".to_string()),
        ]
    );
}

#[test]
fn test_signature_prose_not_a_field() {
    let fields = classify(&[
        "By signing below you confirm that your signature is legally binding and final",
        "Our signature design policy is available online",
    ]);
    assert!(fields.is_empty());
}

#[test]
fn test_rule_count_and_order() {
    let names: Vec<&str> = DEFAULT_RULES.iter().map(|r| r.name()).collect();
    assert_eq!(
        names,
        vec![
            "inline_blank",
            "phone_pair",
            "signature_date",
            "printed_name",
            "signature",
            "yes_no",
            "checkbox_group",
            "label_value",
            "gender",
            "heading",
        ]
    );
}

#[test]
fn test_cross_page_dedup_then_unique_labels() {
    let config = ExtractionConfig::default();
    let classifier = LineClassifier::new(&config);
    let mut seen = SeenFields::new();

    let mut fields = Vec::new();
    for page in [
        lines(&["Email: ______", "Date: ______"]),
        lines(&["Email: ______", "Date of Visit: ______", "Date: ______"]),
    ] {
        fields.extend(classifier.classify(&page).into_iter().filter(|f| seen.insert(f)));
    }

    let fields = unique_labels(fields);
    assert_eq!(
        summary(&fields),
        vec![
            (FieldType::Email, "Email".to_string()),
            (FieldType::Date, "Date".to_string()),
            (FieldType::Date, "Date of Visit".to_string()),
        ]
    );
}

#[test]
fn test_inline_fields_not_deduped_by_label() {
    let fields = classify(&["I, ____ agree.", "I, ____ agree."]);
    assert_eq!(fields.len(), 2);
}

/// Labels produced by the phone, yes/no, checkbox, label/value, gender and
/// heading rules are plain text and must not trigger any rule again.
#[test]
fn test_emitted_labels_do_not_rematch() {
    let fields = classify(&[
        "Phone          Alternate Phone",
        "Do you need transportation? [ ] Yes [ ] No",
        "☐ Red",
        "☐ Green",
        "Emergency Contact: ______",
        "EMERGENCY PHONE: ______",
        "Sex:  M  F",
        "MEDICAL HISTORY",
        "☐ I agree to the terms",
    ]);
    assert_eq!(fields.len(), 9);
    assert_eq!(fields[8].field_type(), FieldType::Checkbox);

    let labels: Vec<String> = fields.iter().map(|f| f.label.clone()).collect();
    let config = ExtractionConfig::default();
    let classifier = LineClassifier::new(&config);
    for label in &labels {
        let again = classifier.classify(&[label.clone()]);
        assert!(again.is_empty(), "label {:?} matched again as {:?}", label, again);
    }
}

#[test]
fn test_annotation_style_labels_do_not_rematch() {
    let config = ExtractionConfig::default();
    let classifier = LineClassifier::new(&config);
    for label in ["Email", "First Name", "Date of Birth", "Gender", "Zip Code", "Comments"] {
        assert!(classifier.classify(&[label.to_string()]).is_empty(), "{}", label);
    }
}
