//! Integer literal text handling

/// Parses integer literal text into a value.
///
/// Accepts an optional sign, `_` separators, leading zeros and the
/// `0x`/`0o`/`0b` radix prefixes. Returns `None` for malformed text or
/// values outside `i64`.
#[must_use]
pub fn parse_integer_text(text: &str) -> Option<i64> {
    let text = text.trim();
    let (negative, unsigned) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let (radix, digits) = match unsigned.get(..2) {
        Some("0x" | "0X") => (16, &unsigned[2..]),
        Some("0o" | "0O") => (8, &unsigned[2..]),
        Some("0b" | "0B") => (2, &unsigned[2..]),
        _ => (10, unsigned),
    };

    let digits: String = digits.chars().filter(|ch| *ch != '_').collect();
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }

    let signed = if negative {
        format!("-{digits}")
    } else {
        digits
    };
    i64::from_str_radix(&signed, radix).ok()
}

/// Canonical decimal text for an integer literal, or `None` if the text
/// does not parse.
#[must_use]
pub fn normalize_integer_text(text: &str) -> Option<String> {
    parse_integer_text(text).map(|value| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_prefixed() {
        assert_eq!(parse_integer_text("42"), Some(42));
        assert_eq!(parse_integer_text("0x1F"), Some(31));
        assert_eq!(parse_integer_text("0b101"), Some(5));
        assert_eq!(parse_integer_text("0o17"), Some(15));
        assert_eq!(parse_integer_text("1_000"), Some(1000));
        assert_eq!(parse_integer_text("-9223372036854775808"), Some(i64::MIN));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(parse_integer_text(""), None);
        assert_eq!(parse_integer_text("0x"), None);
        assert_eq!(parse_integer_text("--1"), None);
        assert_eq!(parse_integer_text("12abc"), None);
        assert_eq!(parse_integer_text("9223372036854775808"), None);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_integer_text("007").as_deref(), Some("7"));
        assert_eq!(normalize_integer_text("+5").as_deref(), Some("5"));
        assert_eq!(normalize_integer_text("0xff").as_deref(), Some("255"));
        assert_eq!(normalize_integer_text("10").as_deref(), Some("10"));
    }
}
