//! String helpers shared by the CVar and command systems.
//!
//! Covers name hashing (Jenkins one-at-a-time), case-folded comparison,
//! number formatting and parsing, and the replaceable boolean-string table.

use std::sync::RwLock;

use crate::core::cvar::NumberFormat;

/// Jenkins one-at-a-time hash of a byte string.
///
/// <http://en.wikipedia.org/wiki/Jenkins_hash_function>
pub fn jenkins_hash(key: &str) -> u32 {
    let mut h: u32 = 0;
    for &b in key.as_bytes() {
        h = h.wrapping_add(u32::from(b));
        h = h.wrapping_add(h << 10);
        h ^= h >> 6;
    }
    h = h.wrapping_add(h << 3);
    h ^= h >> 11;
    h.wrapping_add(h << 15)
}

/// Like [`jenkins_hash`] but folds ASCII uppercase to lowercase first.
pub fn jenkins_hash_nocase(key: &str) -> u32 {
    let mut h: u32 = 0;
    for &b in key.as_bytes() {
        h = h.wrapping_add(u32::from(b.to_ascii_lowercase()));
        h = h.wrapping_add(h << 10);
        h ^= h >> 6;
    }
    h = h.wrapping_add(h << 3);
    h ^= h >> 11;
    h.wrapping_add(h << 15)
}

/// ASCII case-insensitive equality.
pub fn eq_no_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Whitespace as the command scanners see it: space, tab, CR, LF and below.
#[inline]
pub fn is_whitespace(byte: u8) -> bool {
    byte <= b' ' && byte != 0
}

/// Substring search used by the `listCmds`/`listCVars` patterns.
pub fn find_substring(haystack: &str, needle: &str, ignore_case: bool) -> bool {
    if needle.is_empty() {
        return true;
    }
    if ignore_case {
        haystack
            .to_ascii_lowercase()
            .contains(&needle.to_ascii_lowercase())
    } else {
        haystack.contains(needle)
    }
}

/// Render an integer in the given format.
///
/// Decimal keeps the sign; binary, octal and hexadecimal print the raw
/// two's-complement bits, hexadecimal with a `0x` prefix and uppercase digits.
pub fn int_to_string(value: i64, format: NumberFormat) -> String {
    match format {
        NumberFormat::Decimal => value.to_string(),
        NumberFormat::Hexadecimal => format!("0x{:X}", value as u64),
        NumberFormat::Binary => format!("{:b}", value as u64),
        NumberFormat::Octal => format!("{:o}", value as u64),
    }
}

/// Render a float with up to eight fractional digits, trailing zeros trimmed.
///
/// Values outside the comfortable fixed-point range fall back to scientific
/// notation so magnitude is never silently lost.
pub fn float_to_string(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if !(1.0e-4..1.0e16).contains(&magnitude) {
        return format!("{:e}", value);
    }

    let mut text = format!("{:.8}", value);
    if text.contains('.') {
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
    }
    text
}

/// Parse an integer with C `strtoll(.., 0)` prefix rules: optional sign,
/// `0x`/`0X` hexadecimal, leading-zero octal, decimal otherwise.
///
/// Unlike `strtoll`, trailing garbage rejects the whole token.
pub fn parse_int(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    if rest.is_empty() {
        return None;
    }

    let (radix, digits) = if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        (16, hex)
    } else if rest.len() > 1 && rest.starts_with('0') {
        (8, &rest[1..])
    } else {
        (10, rest)
    };

    let magnitude = i64::from_str_radix(digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Parse a float. Trailing garbage rejects the whole token.
pub fn parse_float(text: &str) -> Option<f64> {
    let value: f64 = text.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

// ========================================================
// Boolean value strings:
// ========================================================

const DEFAULT_BOOL_STRINGS: [(&str, &str); 4] =
    [("true", "false"), ("yes", "no"), ("on", "off"), ("1", "0")];

static BOOL_STRINGS: RwLock<Option<Vec<(String, String)>>> = RwLock::new(None);

/// Replace the process-wide true/false spelling table, or restore the
/// defaults (`true/false`, `yes/no`, `on/off`, `1/0`) with `None`.
pub fn set_bool_strings(pairs: Option<Vec<(String, String)>>) {
    let pairs = pairs.filter(|p| !p.is_empty());
    if let Ok(mut guard) = BOOL_STRINGS.write() {
        *guard = pairs;
    }
}

/// Match `text` against any registered true/false spelling.
pub fn parse_bool_string(text: &str) -> Option<bool> {
    if let Ok(guard) = BOOL_STRINGS.read() {
        if let Some(pairs) = guard.as_ref() {
            for (true_str, false_str) in pairs {
                if true_str == text {
                    return Some(true);
                }
                if false_str == text {
                    return Some(false);
                }
            }
            return None;
        }
    }
    for (true_str, false_str) in DEFAULT_BOOL_STRINGS {
        if true_str == text {
            return Some(true);
        }
        if false_str == text {
            return Some(false);
        }
    }
    None
}

/// Render a boolean using the first registered spelling pair.
pub fn bool_to_string(value: bool) -> String {
    if let Ok(guard) = BOOL_STRINGS.read() {
        if let Some(pairs) = guard.as_ref() {
            if let Some((true_str, false_str)) = pairs.first() {
                return if value { true_str.clone() } else { false_str.clone() };
            }
        }
    }
    let (true_str, false_str) = DEFAULT_BOOL_STRINGS[0];
    if value { true_str.to_string() } else { false_str.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jenkins_hash_known_values() {
        assert_eq!(jenkins_hash(""), 0);
        assert_ne!(jenkins_hash("a"), 0);
        assert_ne!(jenkins_hash("sv_gravity"), jenkins_hash("sv_cheats"));
    }

    #[test]
    fn test_jenkins_hash_nocase_folds() {
        assert_eq!(jenkins_hash_nocase("HeLLo"), jenkins_hash_nocase("hello"));
        assert_ne!(jenkins_hash("HeLLo"), jenkins_hash("hello"));
    }

    #[test]
    fn test_int_to_string_formats() {
        assert_eq!(int_to_string(255, NumberFormat::Decimal), "255");
        assert_eq!(int_to_string(255, NumberFormat::Hexadecimal), "0xFF");
        assert_eq!(int_to_string(5, NumberFormat::Binary), "101");
        assert_eq!(int_to_string(8, NumberFormat::Octal), "10");
        assert_eq!(int_to_string(-1, NumberFormat::Decimal), "-1");
        assert_eq!(
            int_to_string(-1, NumberFormat::Hexadecimal),
            "0xFFFFFFFFFFFFFFFF"
        );
    }

    #[test]
    fn test_float_to_string_trims_zeros() {
        assert_eq!(float_to_string(0.0), "0");
        assert_eq!(float_to_string(0.5), "0.5");
        assert_eq!(float_to_string(800.0), "800");
        assert_eq!(float_to_string(0.1 + 0.2), "0.3");
    }

    #[test]
    fn test_parse_int_base_prefixes() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("-42"), Some(-42));
        assert_eq!(parse_int("0x10"), Some(16));
        assert_eq!(parse_int("010"), Some(8));
        assert_eq!(parse_int("0"), Some(0));
        assert_eq!(parse_int("12abc"), None);
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("abc"), None);
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float("0.5"), Some(0.5));
        assert_eq!(parse_float("-1e3"), Some(-1000.0));
        assert_eq!(parse_float("x"), None);
    }

    #[test]
    fn test_bool_strings_defaults() {
        assert_eq!(parse_bool_string("true"), Some(true));
        assert_eq!(parse_bool_string("off"), Some(false));
        assert_eq!(parse_bool_string("1"), Some(true));
        assert_eq!(parse_bool_string("maybe"), None);
        assert_eq!(bool_to_string(true), "true");
        assert_eq!(bool_to_string(false), "false");
    }

    #[test]
    fn test_find_substring() {
        assert!(find_substring("listCmds", "Cmd", false));
        assert!(!find_substring("listCmds", "cmd", false));
        assert!(find_substring("listCmds", "cmd", true));
        assert!(find_substring("anything", "", false));
    }
}
