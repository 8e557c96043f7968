//! Pure input validators. No side effects.

/// Permissive email shape check: both `@` and `.` must be present.
/// Deliberately not full RFC validation.
pub fn looks_like_email(text: &str) -> bool {
    text.contains('@') && text.contains('.')
}

/// Parse a one-digit menu choice in `1..=max`. Anything else — including
/// zero-padded digits or extra characters — is rejected.
pub fn menu_choice(text: &str, max: u8) -> Option<u8> {
    let trimmed = text.trim();
    let mut chars = trimmed.chars();
    let digit = chars.next()?.to_digit(10)? as u8;
    if chars.next().is_some() {
        return None;
    }
    (1..=max).contains(&digit).then_some(digit)
}

/// Case-insensitive exact match against the `skip` sentinel.
pub fn is_skip(text: &str) -> bool {
    text.eq_ignore_ascii_case("skip")
}
