//! Numeric literals carrying units, and result formatting
//!
//! Values arrive as text such as "300K", "1.588e9nm" or "-4.5 eV". The
//! leading literal is read the way C's `strtod` reads it, and results are
//! written back with `%g` semantics (six significant digits) so that every
//! binding prints the same text.

use crate::UnitsError;

/// Significant digits used by `format_number`
const SIGNIFICANT_DIGITS: i32 = 6;

/// A value string split into its numeric literal and trailing units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueLiteral<'a> {
    /// Parsed numeric value
    pub value: f64,
    /// The literal exactly as written (without surrounding whitespace)
    pub literal: &'a str,
    /// Trimmed unit text following the literal, possibly empty
    pub units: &'a str,
}

/// Split "72F" into (72.0, "72", "F").
///
/// The exponent marker is only consumed when digits follow it, so "5eV"
/// reads as 5 of "eV" and "2e3m" as 2000 of "m".
pub fn split_value(s: &str) -> Result<ValueLiteral<'_>, UnitsError> {
    let s = s.trim();
    let bytes = s.as_bytes();
    let mut i = 0;

    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
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
        digits += j - frac_start;
        i = j;
    }

    if digits == 0 {
        return Err(UnitsError::MalformedValue(s.to_string()));
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

    let literal = &s[..i];
    let value: f64 = literal
        .parse()
        .map_err(|_| UnitsError::MalformedValue(s.to_string()))?;

    Ok(ValueLiteral {
        value,
        literal,
        units: s[i..].trim(),
    })
}

/// Format like C's `%g`: six significant digits, trailing zeros removed,
/// scientific notation when the decimal exponent is below -4 or at least 6.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-inf".to_string() } else { "inf".to_string() };
    }
    if value == 0.0 {
        return "0".to_string();
    }

    // Round to the target precision first; the exponent can shift (9.999999 -> 1e1)
    let sci = format!("{:.*e}", (SIGNIFICANT_DIGITS - 1) as usize, value);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exp < -4 || exp >= SIGNIFICANT_DIGITS {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_zeros(mantissa), sign, exp.abs())
    } else {
        let decimals = (SIGNIFICANT_DIGITS - 1 - exp) as usize;
        trim_zeros(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_simple() {
        let v = split_value("300K").unwrap();
        assert_eq!(v.value, 300.0);
        assert_eq!(v.literal, "300");
        assert_eq!(v.units, "K");
    }

    #[test]
    fn test_split_scientific() {
        let v = split_value("1.588e9nm").unwrap();
        assert_eq!(v.value, 1.588e9);
        assert_eq!(v.units, "nm");

        let v = split_value("3.12075e+28neV").unwrap();
        assert_eq!(v.literal, "3.12075e+28");
        assert_eq!(v.units, "neV");
    }

    #[test]
    fn test_split_exponent_marker_without_digits() {
        let v = split_value("5eV").unwrap();
        assert_eq!(v.value, 5.0);
        assert_eq!(v.units, "eV");
    }

    #[test]
    fn test_split_signs_and_spaces() {
        let v = split_value("  -4.5 eV ").unwrap();
        assert_eq!(v.value, -4.5);
        assert_eq!(v.literal, "-4.5");
        assert_eq!(v.units, "eV");

        let v = split_value(".5m").unwrap();
        assert_eq!(v.value, 0.5);
    }

    #[test]
    fn test_split_no_units() {
        let v = split_value("42").unwrap();
        assert_eq!(v.value, 42.0);
        assert_eq!(v.units, "");
    }

    #[test]
    fn test_split_malformed() {
        assert!(split_value("K300").is_err());
        assert!(split_value("").is_err());
        assert!(split_value("-.m").is_err());
    }

    #[test]
    fn test_format_fixed() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(22.222222222), "22.2222");
        assert_eq!(format_number(1.588), "1.588");
        assert_eq!(format_number(80.33000000000004), "80.33");
        assert_eq!(format_number(-0.5), "-0.5");
        assert_eq!(format_number(0.0001), "0.0001");
        assert_eq!(format_number(123456.0), "123456");
    }

    #[test]
    fn test_format_scientific() {
        assert_eq!(format_number(1e9), "1e+09");
        assert_eq!(format_number(1234567.0), "1.23457e+06");
        assert_eq!(format_number(1.5e-7), "1.5e-07");
        assert_eq!(format_number(3.12075e28), "3.12075e+28");
    }

    #[test]
    fn test_format_rounding_shifts_exponent() {
        assert_eq!(format_number(999999.7), "1e+06");
        assert_eq!(format_number(0.0), "0");
    }
}
