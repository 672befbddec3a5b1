//! Ratio rounding and display

/// Digits kept after the decimal point in displayed ratios
const FORMATTER_DIGIT_COUNT: usize = 4;

/// Round a raw exchange ratio for storage.
///
/// Ratios of at least 1 keep four decimals. Smaller ratios keep four
/// significant-looking digits after their leading zeros, so 0.000054616
/// becomes 0.00005462.
pub fn round_currency_ratio(ratio: f64) -> f64 {
    if ratio == 0.0 || !ratio.is_finite() {
        return ratio;
    }

    let mut digits = FORMATTER_DIGIT_COUNT as i32;
    if ratio.abs() < 1.0 {
        digits += (-ratio.abs().log10()).floor() as i32;
    }
    let scale = 10f64.powi(digits);
    (ratio * scale).round() / scale
}

/// Ratio as shown in "1 X = r Y": truncated to four decimals, grouped by thousands.
pub fn format_ratio(ratio: f64) -> String {
    let scale = 10f64.powi(FORMATTER_DIGIT_COUNT as i32);
    let truncated = (ratio * scale).trunc() / scale;
    let fixed = format!("{:.*}", FORMATTER_DIGIT_COUNT, truncated);

    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let (sign, digits) = match integer.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", integer),
    };

    let mut grouped = String::with_capacity(fixed.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}{grouped}.{fraction}")
}
