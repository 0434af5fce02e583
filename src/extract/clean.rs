/// Keeps only alphanumerics and spaces, then trims leading whitespace.
pub fn strip_special_chars(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ')
        .collect();
    kept.trim_start().to_string()
}

pub const MALE: &str = "Male";
pub const FEMALE: &str = "Female";
pub const NOT_RECOGNIZED: &str = "Not Recognized";

/// Maps the OCR output of the gender mark to a label. `M` is checked first.
pub fn gender(text: &str) -> &'static str {
    if text.contains('M') {
        MALE
    } else if text.contains('F') {
        FEMALE
    } else {
        NOT_RECOGNIZED
    }
}
