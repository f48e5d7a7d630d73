//! Pure helpers applied to raw input before it reaches the form state.
//!
//! Currency-like fields are kept as grouped display strings while being
//! edited (`2 500 000`) and are recovered as integers by stripping every
//! non-digit character at submit time.

use std::num::ParseIntError;

/// Separator inserted between digit groups of currency-like values.
pub const GROUP_SEPARATOR: char = ' ';

/// Keeps only ASCII digits from the input.
pub fn strip_formatting(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Strips every non-digit character from a phone number input.
pub fn sanitize_phone_digits(raw: &str) -> String {
    strip_formatting(raw)
}

/// Strips non-digit characters and groups the remaining digits by three from the right.
pub fn format_currency(raw: &str) -> String {
    let digits = strip_formatting(raw);
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);

    for (idx, digit) in digits.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            grouped.push(GROUP_SEPARATOR);
        }
        grouped.push(digit);
    }

    grouped
}

/// Parses a grouped display value back into an integer.
///
/// Returns `Ok(None)` when the value carries no digits at all.
pub fn parse_formatted_int(raw: &str) -> Result<Option<u64>, ParseIntError> {
    let digits = strip_formatting(raw);
    if digits.is_empty() {
        return Ok(None);
    }
    digits.parse::<u64>().map(Some)
}

/// Removes markup from free-text input before it is stored.
pub fn sanitize_text(raw: &str) -> String {
    ammonia::clean(raw)
}
