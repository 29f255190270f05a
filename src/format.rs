//! Display formatting for financial figures.
//!
//! Large values are abbreviated by magnitude (`1.50 B`, `-2.50 K`); per-share values
//! (any unit containing `/sh`) are always printed with two decimals and never
//! abbreviated. Missing values render as an en dash placeholder.

use num_format::{Locale, ToFormattedString};

/// Placeholder for a value the backend did not report.
pub const MISSING: &str = "–";

/// Base currency; suffixing it on every figure would be noise.
pub const BASE_CURRENCY: &str = "USD";

const BILLION: f64 = 1e9;
const MILLION: f64 = 1e6;
const THOUSAND: f64 = 1e3;

/// Formats a value for display, scaled by magnitude unless it is a per-share figure.
///
/// # Examples
///
/// ```rust
/// use edgardash::format::format_value;
///
/// assert_eq!(format_value(None, Some("USD")), "–");
/// assert_eq!(format_value(Some(1_500_000_000.0), Some("USD")), "1.50 B");
/// assert_eq!(format_value(Some(0.0734), Some("USD/sh")), "0.07");
/// assert_eq!(format_value(Some(-2_500.0), Some("USD")), "-2.50 K");
/// ```
pub fn format_value(value: Option<f64>, unit: Option<&str>) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return MISSING.to_string();
    };

    if unit.is_some_and(is_per_share) {
        return format!("{:.2}", value);
    }

    format_scaled(value)
}

/// Magnitude-scaled rendering without any unit awareness.
pub fn format_scaled(value: f64) -> String {
    if !value.is_finite() {
        return MISSING.to_string();
    }

    let abs = value.abs();
    if abs >= BILLION {
        format!("{:.2} B", value / BILLION)
    } else if abs >= MILLION {
        format!("{:.2} M", value / MILLION)
    } else if abs >= THOUSAND {
        format!("{:.2} K", value / THOUSAND)
    } else {
        format_grouped(value)
    }
}

/// Value followed by its unit, unless the unit is the base currency or the value is missing.
pub fn format_with_unit(value: Option<f64>, unit: Option<&str>) -> String {
    let formatted = format_value(value, unit);
    let present = value.is_some_and(f64::is_finite);
    match unit_suffix(unit) {
        Some(suffix) if present => format!("{} {}", formatted, suffix),
        _ => formatted,
    }
}

/// The unit label to show next to a figure, if any.
pub fn unit_suffix(unit: Option<&str>) -> Option<&str> {
    unit.filter(|u| !u.is_empty() && *u != BASE_CURRENCY)
}

pub fn is_per_share(unit: &str) -> bool {
    unit.contains("/sh")
}

/// Y-axis tick for the revenue chart, whole billions of dollars.
pub fn format_axis_billions(value: f64) -> String {
    format!("${:.0}B", value / BILLION)
}

// en-locale grouping, at most two fraction digits, trailing zeros dropped
fn format_grouped(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let grouped = match whole.parse::<u64>() {
        Ok(n) => n.to_formatted_string(&Locale::en),
        Err(_) => whole.to_string(),
    };

    let is_zero = grouped == "0" && fraction.is_empty();
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    if fraction.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_value_placeholder() {
        assert_eq!(format_value(None, None), MISSING);
        assert_eq!(format_value(None, Some("USD/sh")), MISSING);
        assert_eq!(format_value(Some(f64::NAN), Some("USD")), MISSING);
    }

    #[test]
    fn test_magnitude_thresholds() {
        assert_eq!(format_value(Some(1_500_000_000.0), Some("USD")), "1.50 B");
        assert_eq!(format_value(Some(1_000_000_000.0), None), "1.00 B");
        assert_eq!(format_value(Some(25_300_000.0), Some("USD")), "25.30 M");
        assert_eq!(format_value(Some(1_000.0), Some("USD")), "1.00 K");
        assert_eq!(format_value(Some(999.0), Some("USD")), "999");
    }

    #[test]
    fn test_negative_values_keep_sign() {
        assert_eq!(format_value(Some(-2_500.0), Some("USD")), "-2.50 K");
        assert_eq!(format_value(Some(-3_200_000_000.0), Some("USD")), "-3.20 B");
        assert_eq!(format_value(Some(-12.75), None), "-12.75");
    }

    #[test]
    fn test_per_share_is_never_scaled() {
        assert_eq!(format_value(Some(0.0734), Some("USD/sh")), "0.07");
        assert_eq!(format_value(Some(1_234.5), Some("USD/sh")), "1234.50");
        assert_eq!(format_value(Some(-1.0), Some("USD/sh")), "-1.00");
    }

    #[test]
    fn test_small_values_drop_trailing_zeros() {
        assert_eq!(format_value(Some(12.5), None), "12.5");
        assert_eq!(format_value(Some(0.0), None), "0");
        // rounds to zero, so no sign
        assert_eq!(format_value(Some(-0.001), None), "0");
        assert_eq!(format_value(Some(-0.004), Some("USD")), "0");
        assert_eq!(format_value(Some(999.999), None), "1,000");
    }

    #[test]
    fn test_unit_suffix_skips_base_currency() {
        assert_eq!(unit_suffix(Some("USD")), None);
        assert_eq!(unit_suffix(None), None);
        assert_eq!(unit_suffix(Some("USD/sh")), Some("USD/sh"));
        assert_eq!(unit_suffix(Some("shares")), Some("shares"));
    }

    #[test]
    fn test_format_with_unit() {
        assert_eq!(format_with_unit(Some(1.53), Some("USD/sh")), "1.53 USD/sh");
        assert_eq!(format_with_unit(Some(2_000_000.0), Some("USD")), "2.00 M");
        assert_eq!(format_with_unit(None, Some("USD/sh")), MISSING);
        assert_eq!(format_with_unit(Some(f64::NAN), Some("USD/sh")), MISSING);
        assert_eq!(format_with_unit(Some(f64::INFINITY), Some("shares")), MISSING);
    }

    #[test]
    fn test_axis_ticks() {
        assert_eq!(format_axis_billions(85_777_000_000.0), "$86B");
        assert_eq!(format_axis_billions(0.0), "$0B");
    }
}
