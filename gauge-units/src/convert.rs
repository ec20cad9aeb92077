//! Conversion engine
//!
//! Two call shapes: strings in, string out (`convert`), and handles plus a
//! raw number (`convert_value`). The `_code` variants return the
//! `(result, error code)` pair that bindings hand to their callers.

use std::borrow::Cow;
use gauge_core::{format_number, split_value, with_code, UnitsError};
use crate::graph::compose;
use crate::metric::integer_power;
use crate::parse::{CompoundUnit, Factor};
use crate::registry::Registry;
use crate::unit::UnitId;

impl Registry {
    /// Convert a value string such as "300K" into `to_units`.
    ///
    /// An empty `to_units` strips the units and returns the literal as
    /// written. A value without units is taken to be in `to_units` already.
    pub fn convert(&self, value: &str, to_units: &str, show_units: bool) -> Result<String, UnitsError> {
        let parsed = split_value(value)?;
        let to_units = to_units.trim();

        if to_units.is_empty() {
            return Ok(parsed.literal.to_string());
        }
        if parsed.units.is_empty() {
            return Ok(with_units(parsed.literal, to_units, show_units));
        }

        let from = self.resolve(&rate_units(parsed.units))?;
        let to = self.resolve(&rate_units(to_units))?;
        let result = self.convert_units(&from, &to, parsed.value)?;

        Ok(with_units(&format_number(result), to_units, show_units))
    }

    /// `convert` returning ("", code) on failure
    pub fn convert_code(&self, value: &str, to_units: &str, show_units: bool) -> (String, i32) {
        with_code(self.convert(value, to_units, show_units))
    }

    /// Convert a raw number between two registered units
    pub fn convert_value(&self, from: UnitId, to: UnitId, value: f64) -> Result<f64, UnitsError> {
        let from_record = self.record(from)?;
        let to_record = self.record(to)?;

        if from == to {
            return Ok(value);
        }

        let path = self.find_path(from, to).ok_or_else(|| UnitsError::Incommensurable {
            from: from_record.name().to_string(),
            to: to_record.name().to_string(),
        })?;

        Ok(path.iter().fold(value, |v, hop| hop.apply(v)))
    }

    /// `convert_value` returning (0.0, code) on failure
    pub fn convert_value_code(&self, from: UnitId, to: UnitId, value: f64) -> (f64, i32) {
        with_code(self.convert_value(from, to, value))
    }

    /// Convert between two parsed expressions.
    ///
    /// Single units convert through their full path, offsets included.
    /// Compound expressions pair factors on the same side of the line and
    /// combine their linear scales.
    pub fn convert_units(&self, from: &CompoundUnit, to: &CompoundUnit, value: f64) -> Result<f64, UnitsError> {
        if from == to {
            return Ok(value);
        }

        if from.is_simple() && to.is_simple() {
            let (f, t) = (&from.numerator[0], &to.numerator[0]);
            let converted = self.convert_value(f.unit, t.unit, value * f.scale)?;
            return Ok(converted / t.scale);
        }

        let incommensurable = || UnitsError::Incommensurable {
            from: from.display(self),
            to: to.display(self),
        };
        let numerator = self
            .side_scale(&from.numerator, &to.numerator)
            .ok_or_else(incommensurable)?;
        let denominator = self
            .side_scale(&from.denominator, &to.denominator)
            .ok_or_else(incommensurable)?;

        Ok(value * numerator / denominator)
    }

    /// Product of the scales of matched factor pairs, or `None` if some
    /// factor has no commensurable partner
    fn side_scale(&self, from: &[Factor], to: &[Factor]) -> Option<f64> {
        if from.len() != to.len() {
            return None;
        }

        let mut used = vec![false; to.len()];
        let mut scale = 1.0;

        for f in from {
            let (slot, factor_scale) = to
                .iter()
                .enumerate()
                .filter(|(i, t)| !used[*i] && t.exponent == f.exponent)
                .find_map(|(i, t)| self.factor_scale(f, t).map(|s| (i, s)))?;
            used[slot] = true;
            scale *= integer_power(factor_scale, f.exponent);
        }

        Some(scale)
    }

    fn factor_scale(&self, from: &Factor, to: &Factor) -> Option<f64> {
        let slope = if from.unit == to.unit {
            1.0
        } else {
            compose(&self.find_path(from.unit, to.unit)?).slope()
        };
        Some(from.scale * slope / to.scale)
    }
}

/// "/s" written right after a number means "1/s"
fn rate_units(units: &str) -> Cow<'_, str> {
    if units.starts_with('/') {
        Cow::Owned(format!("1{}", units))
    } else {
        Cow::Borrowed(units)
    }
}

fn with_units(number: &str, units: &str, show_units: bool) -> String {
    if show_units {
        format!("{}{}", number, units)
    } else {
        number.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::Conversion;

    fn assert_close(a: f64, b: f64) {
        let tol = 1e-9 * a.abs().max(b.abs()).max(1.0);
        assert!((a - b).abs() <= tol, "{} != {}", a, b);
    }

    /// Meters, volts and seconds with their metric families, and a F -> C -> K chain
    fn registry() -> Registry {
        let mut reg = Registry::new();
        let m = reg.define("m", None);
        reg.make_metric(Some(m));
        let v = reg.define("V", None);
        reg.make_metric(Some(v));
        let s = reg.define("s", None);
        reg.make_metric(Some(s));

        let f = reg.define("F", None);
        let c = reg.define("C", None);
        let k = reg.define("K", None);
        reg.define_conversion(f, c, Conversion::affine(5.0 / 9.0, -160.0 / 9.0)).unwrap();
        reg.define_conversion(c, k, Conversion::affine(1.0, 273.15)).unwrap();
        reg
    }

    #[test]
    fn test_convert_nanometers() {
        let reg = registry();
        let result = reg.convert("1.588e9nm", "m", true).unwrap();
        assert!(result.starts_with("1.588"));
        assert!(result.ends_with('m'));
        assert_eq!(result, "1.588m");
    }

    #[test]
    fn test_convert_temperature_chain() {
        let reg = registry();
        assert_eq!(reg.convert("72F", "C", false).unwrap(), "22.2222");
        assert_eq!(reg.convert("300K", "F", false).unwrap(), "80.33");
        assert_eq!(reg.convert("300K", "F", true).unwrap(), "80.33F");
    }

    #[test]
    fn test_convert_millivolts() {
        let reg = registry();
        assert_eq!(reg.convert("5000mV", "V", false).unwrap(), "5");
    }

    #[test]
    fn test_convert_millivolts_by_prefix_decomposition() {
        let mut reg = Registry::new();
        reg.define("V", None);
        assert!(reg.find("mV").is_none());
        assert_eq!(reg.convert("5000mV", "V", false).unwrap(), "5");
        assert_eq!(reg.convert("5V", "mV", true).unwrap(), "5000mV");
        // Parsing never registers anything
        assert!(reg.find("mV").is_none());
    }

    #[test]
    fn test_convert_strip_units() {
        let reg = registry();
        assert_eq!(reg.convert("1.23456789m", "", true).unwrap(), "1.23456789");
        assert_eq!(reg.convert("42 K", "  ", false).unwrap(), "42");
    }

    #[test]
    fn test_convert_value_without_units() {
        let reg = registry();
        assert_eq!(reg.convert("12", "cm", true).unwrap(), "12cm");
        assert_eq!(reg.convert("12", "cm", false).unwrap(), "12");
    }

    #[test]
    fn test_convert_compound() {
        let reg = registry();
        let result = reg.convert("1cm2/Vs", "m2/Vs", false).unwrap();
        assert_eq!(result, "0.0001");

        // Factor order inside a side does not matter
        let result = reg.convert("2m/Vs", "cm/sV", false).unwrap();
        assert_eq!(result, "200");
    }

    #[test]
    fn test_convert_compound_denominator() {
        let reg = registry();
        assert_eq!(reg.convert("1km/s", "m/s", false).unwrap(), "1000");
        assert_eq!(reg.convert("1/ms", "1/s", false).unwrap(), "1000");
        assert_eq!(reg.convert("2 1/ms", "/s", true).unwrap(), "2000/s");
    }

    #[test]
    fn test_convert_equivalent_compound_forms() {
        let reg = registry();
        assert_eq!(reg.convert("5m/s/s", "m/s2", false).unwrap(), "5");
        assert_eq!(reg.convert("1km/s/s", "m/s2", true).unwrap(), "1000m/s2");
        assert_eq!(reg.convert("5s-1", "/s", true).unwrap(), "5/s");
        assert_eq!(reg.convert("5m s-1", "m/s", false).unwrap(), "5");
        assert_eq!(reg.convert("5m*m", "cm2", false).unwrap(), "50000");
        assert_eq!(reg.convert("2ms-1", "1/s", false).unwrap(), "2000");
    }

    #[test]
    fn test_convert_rejects_huge_exponents() {
        let reg = registry();
        let err = reg.convert("1m2147483647", "cm2147483647", true).unwrap_err();
        assert!(matches!(err, UnitsError::MalformedUnit(_)));
        assert_eq!(reg.convert_code("1m65", "cm65", true), (String::new(), 1));
    }

    #[test]
    fn test_convert_long_unknown_unit() {
        let reg = registry();
        let value = format!("1{}z", "m".repeat(60));
        assert!(matches!(reg.convert(&value, "m", true), Err(UnitsError::UnknownUnit(_))));
    }

    #[test]
    fn test_compound_uses_interval_scale_for_offsets() {
        let reg = registry();
        // A per-degree quantity: 1 V/C is 1 V/K, the offset does not apply
        assert_eq!(reg.convert("1V/C", "V/K", false).unwrap(), "1");
    }

    #[test]
    fn test_convert_incommensurable() {
        let reg = registry();
        let err = reg.convert("3m", "V", true).unwrap_err();
        assert!(matches!(err, UnitsError::Incommensurable { .. }));
        assert_eq!(reg.convert_code("3m", "V", true), (String::new(), 1));

        let err = reg.convert("3m/s", "m/V", true).unwrap_err();
        assert!(matches!(err, UnitsError::Incommensurable { .. }));

        let err = reg.convert("3m2", "m", true).unwrap_err();
        assert!(matches!(err, UnitsError::Incommensurable { .. }));
    }

    #[test]
    fn test_convert_errors() {
        let reg = registry();
        assert!(matches!(reg.convert("K", "C", true), Err(UnitsError::MalformedValue(_))));
        assert!(matches!(reg.convert("3furlong", "m", true), Err(UnitsError::UnknownUnit(_))));
        assert!(matches!(reg.convert("3m", "furlong", true), Err(UnitsError::UnknownUnit(_))));
        assert!(matches!(reg.convert("3m", "m$", true), Err(UnitsError::MalformedUnit(_))));
    }

    #[test]
    fn test_failed_convert_leaves_registry_untouched() {
        let reg = registry();
        let before = reg.len();
        let _ = reg.convert("3qq", "m", true);
        let _ = reg.convert("5mV", "K", true);
        assert_eq!(reg.len(), before);
    }

    #[test]
    fn test_convert_value() {
        let reg = registry();
        let cm = reg.find("cm").unwrap();
        let m = reg.find("m").unwrap();
        let nm = reg.find("nm").unwrap();

        assert_eq!(reg.convert_value(cm, m, 1.0).unwrap(), 0.01);
        assert_close(reg.convert_value(nm, m, 1.0e9).unwrap(), 1.0);
        assert_close(reg.convert_value(cm, nm, 1.0).unwrap(), 1e7);
        assert_eq!(reg.convert_value(m, m, 7.5).unwrap(), 7.5);
    }

    #[test]
    fn test_convert_value_codes() {
        let reg = registry();
        let m = reg.find("m").unwrap();
        let s = reg.find("s").unwrap();
        let k = reg.find("K").unwrap();
        let f = reg.find("F").unwrap();

        assert_eq!(reg.convert_value_code(m, s, 1.0), (0.0, 1));
        assert_eq!(reg.convert_value_code(m, UnitId::from_raw(999), 1.0), (0.0, 1));
        assert_eq!(
            reg.convert_value(UnitId::from_raw(999), m, 1.0),
            Err(UnitsError::InvalidHandle(999))
        );

        let (value, code) = reg.convert_value_code(k, f, 300.0);
        assert_eq!(code, 0);
        assert_close(value, 80.33);
    }

    #[test]
    fn test_transitivity() {
        let reg = registry();
        let f = reg.find("F").unwrap();
        let c = reg.find("C").unwrap();
        let k = reg.find("K").unwrap();

        for v in [-40.0, 0.0, 72.0, 451.0] {
            let direct = reg.convert_value(f, k, v).unwrap();
            let chained = reg.convert_value(c, k, reg.convert_value(f, c, v).unwrap()).unwrap();
            assert_close(direct, chained);
        }
    }

    #[test]
    fn test_convert_custom_edge() {
        let mut reg = Registry::new();
        let ph = reg.define("pH", None);
        let poh = reg.define("pOH", None);
        reg.define_conversion_fn(ph, poh, |x| 14.0 - x, |x| 14.0 - x).unwrap();

        assert_eq!(reg.convert("3pH", "pOH", true).unwrap(), "11pOH");
        assert_eq!(reg.convert("11pOH", "pH", false).unwrap(), "3");
    }
}
