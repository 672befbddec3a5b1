//! Number rendering for converter displays
//!
//! Locale-neutral: '.' is the decimal separator and no grouping is applied.

/// Format `value` in fixed notation with exactly `digits` digits after the point.
pub fn round_significant(value: f64, digits: usize) -> String {
    format!("{:.*}", digits, value)
}

/// Remove trailing zeros after the decimal point, then a dangling point.
pub fn trim_trailing_zeros(s: &mut String) {
    if !s.contains('.') {
        return;
    }
    let trimmed = s.trim_end_matches('0').len();
    s.truncate(trimmed);
    if s.ends_with('.') {
        s.pop();
    }
}

/// Scientific notation with a six digit mantissa and a signed exponent of at
/// least two digits, e.g. `1.500000e+20`.
pub fn to_scientific(value: f64) -> String {
    let raw = format!("{:.6e}", value);
    match raw.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => raw,
    }
}
