//! Small text helpers shared by the label resolver and the line classifier.
//!
//! Labels reach the form builder verbatim, so these functions only tidy up
//! what PDF producers and recognition engines leave behind (trailing colons,
//! underscores, snake_case field names) and never try to rewrite wording.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Boundary between a lowercase letter and an uppercase one (camelCase)
    static ref RE_CAMEL: Regex = Regex::new(r"([a-z0-9])([A-Z])").unwrap();

    /// Separators used in PDF-internal field names
    static ref RE_NAME_SEPARATORS: Regex = Regex::new(r"[_\-.\[\]/]+").unwrap();

    /// Anything that is not a letter or a digit
    static ref RE_NON_WORD: Regex = Regex::new(r"[^a-z0-9]+").unwrap();

    /// Runs of whitespace
    static ref RE_SPACES: Regex = Regex::new(r"\s+").unwrap();
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    RE_SPACES.replace_all(text.trim(), " ").into_owned()
}

/// Strip trailing `:`, `*`, `-`, `_` and whitespace from a label.
///
/// # Examples
///
/// ```
/// use pdf_formscan::text::clean_label;
///
/// assert_eq!(clean_label("Email: *"), "Email");
/// assert_eq!(clean_label("  Last Name -  "), "Last Name");
/// ```
pub fn clean_label(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    collapsed
        .trim_end_matches(|c: char| c == ':' || c == '*' || c == '-' || c == '_' || c.is_whitespace())
        .trim_start()
        .to_string()
}

/// Turn an internal field name into a readable title.
///
/// Handles snake_case, kebab-case, dotted hierarchical names and camelCase.
///
/// # Examples
///
/// ```
/// use pdf_formscan::text::title_case;
///
/// assert_eq!(title_case("email_addr"), "Email Addr");
/// assert_eq!(title_case("firstName"), "First Name");
/// assert_eq!(title_case("PERSONAL INFO"), "Personal Info");
/// ```
pub fn title_case(name: &str) -> String {
    let spaced = RE_CAMEL.replace_all(name, "$1 $2");
    let spaced = RE_NAME_SEPARATORS.replace_all(&spaced, " ");
    spaced
        .split_whitespace()
        .map(capitalize_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

/// Lowercase, underscore-separated identifier for a piece of text.
///
/// Returns an empty string when the text has no letters or digits.
///
/// # Examples
///
/// ```
/// use pdf_formscan::text::slugify;
///
/// assert_eq!(slugify("Date of Birth:"), "date_of_birth");
/// assert_eq!(slugify("___"), "");
/// ```
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    RE_NON_WORD
        .replace_all(&lower, "_")
        .trim_matches('_')
        .to_string()
}

/// Case-insensitive whole-word containment check.
pub fn contains_word(haystack_lower: &str, word: &str) -> bool {
    haystack_lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|w| w == word)
}
