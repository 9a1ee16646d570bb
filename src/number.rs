//! Coordinate number reading and formatting.
//!
//! Reading follows the lenient rule WKT producers in the wild rely on: the
//! longest numeric prefix of a token is used, and a token without one reads
//! as NaN. Formatting produces the shortest text that reads back to the same
//! value, switching to exponent notation outside `1e-6 <= |x| < 1e21`.

const INFINITY: &str = "Infinity";

/// Scans the longest numeric prefix of `token`, returning its length and value.
fn scan(token: &str) -> Option<(usize, f64)> {
    let bytes = token.as_bytes();
    let mut i = 0;
    let negative = bytes.first() == Some(&b'-');
    if matches!(bytes.first(), Some(&b'+') | Some(&b'-')) {
        i += 1;
    }

    if token[i..].starts_with(INFINITY) {
        let value = if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
        return Some((i + INFINITY.len(), value));
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        // A lone "." is not a number.
        if digits > 0 || j > frac_start {
            digits += j - frac_start;
            i = j;
        }
    }
    if digits == 0 {
        return None;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }

    token[..i].parse().ok().map(|value| (i, value))
}

/// Reads the longest numeric prefix of `token`; NaN when there is none.
pub(crate) fn parse_lenient(token: &str) -> f64 {
    scan(token).map_or(f64::NAN, |(_, value)| value)
}

/// Reads `token` only if all of it is a number.
pub(crate) fn parse_strict(token: &str) -> Option<f64> {
    match scan(token) {
        Some((len, value)) if len == token.len() => Some(value),
        _ => None,
    }
}

/// Formats a coordinate without rounding.
pub(crate) fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let text = if value > 0.0 { INFINITY } else { "-Infinity" };
        return text.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let abs = value.abs();
    if (1e-6..1e21).contains(&abs) {
        return value.to_string();
    }

    // `{:e}` already picks the shortest mantissa; only the exponent sign differs.
    let formatted = format!("{:e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => formatted,
    }
}
