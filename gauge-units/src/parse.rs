//! Compound unit parsing - expressions like "cm2/Vs" or "kg*m/s2"
//!
//! Grammar, per side of the first '/':
//! - runs of letters followed by an optional signed exponent ("cm2", "s-1")
//! - runs may be separated by '*', '·', '.' or whitespace
//! - a bare "1" is allowed as the numerator ("1/s")
//!
//! A run with several symbols glued together ("Vs") is split against the
//! registry. Longer registered symbols win, so a whole-token match always
//! beats decomposition: with "ms" registered, "ms" is that unit; with only
//! "m" and "s" it is meter·second. SI-prefix decomposition ("mV" as
//! milli-"V") is attempted only when no split into registered symbols exists.

use gauge_core::UnitsError;
use crate::metric::Prefix;
use crate::registry::Registry;
use crate::unit::{UnitId, MAX_EXPONENT};

/// One factor of a compound expression
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Factor {
    pub unit: UnitId,
    /// Power applied to the unit (on top of the record's own exponent)
    pub exponent: i32,
    /// Set when the token was decomposed into prefix + registered unit
    pub prefix: Option<Prefix>,
    /// Multiplier contributed by `prefix`, already scaled by the record's exponent
    pub scale: f64,
}

impl Factor {
    pub fn new(unit: UnitId, exponent: i32) -> Self {
        Factor { unit, exponent, prefix: None, scale: 1.0 }
    }
}

/// A parsed unit expression: numerator factors over denominator factors
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundUnit {
    pub numerator: Vec<Factor>,
    pub denominator: Vec<Factor>,
}

impl CompoundUnit {
    /// Expression made of a single registered unit
    pub fn single(unit: UnitId) -> Self {
        CompoundUnit {
            numerator: vec![Factor::new(unit, 1)],
            denominator: Vec::new(),
        }
    }

    /// One factor with exponent 1 and nothing below the line
    pub fn is_simple(&self) -> bool {
        self.denominator.is_empty()
            && self.numerator.len() == 1
            && self.numerator[0].exponent == 1
    }

    /// Canonical form: every factor appears once, with a positive exponent,
    /// on the side its net power puts it ("m s-1" and "m/s" agree, "m/s/s"
    /// becomes "m/s2"). Factors that cancel out are dropped.
    ///
    /// `None` when a merged exponent exceeds `MAX_EXPONENT`.
    pub fn normalized(&self) -> Option<CompoundUnit> {
        let mut merged: Vec<Factor> = Vec::new();
        let signed = self
            .numerator
            .iter()
            .map(|f| (f, f.exponent))
            .chain(self.denominator.iter().map(|f| (f, -f.exponent)));

        for (factor, exponent) in signed {
            let key = factor.prefix.map(|p| p.symbol);
            match merged.iter_mut().find(|m| m.unit == factor.unit && m.prefix.map(|p| p.symbol) == key) {
                Some(m) => m.exponent = m.exponent.checked_add(exponent)?,
                None => merged.push(Factor { exponent, ..*factor }),
            }
        }

        let mut normal = CompoundUnit::default();
        for factor in merged {
            if factor.exponent.abs() > MAX_EXPONENT {
                return None;
            }
            match factor.exponent {
                0 => {}
                e if e > 0 => normal.numerator.push(factor),
                e => normal.denominator.push(Factor { exponent: -e, ..factor }),
            }
        }
        Some(normal)
    }

    /// Render as text, e.g. "cm2/V*s"
    pub fn display(&self, registry: &Registry) -> String {
        let side = |factors: &[Factor]| {
            factors
                .iter()
                .map(|f| {
                    let prefix = f.prefix.map_or("", |p| p.symbol);
                    let name = registry.describe(f.unit).unwrap_or("?");
                    if f.exponent == 1 {
                        format!("{}{}", prefix, name)
                    } else {
                        format!("{}{}{}", prefix, name, f.exponent)
                    }
                })
                .collect::<Vec<_>>()
                .join("*")
        };

        let numerator = if self.numerator.is_empty() {
            "1".to_string()
        } else {
            side(&self.numerator)
        };

        if self.denominator.is_empty() {
            numerator
        } else {
            format!("{}/{}", numerator, side(&self.denominator))
        }
    }
}

/// A letters run and its exponent
#[derive(Debug, PartialEq)]
struct Run<'a> {
    letters: &'a str,
    exponent: i32,
}

impl Registry {
    /// Resolve a unit name: a registered symbol first, otherwise a compound
    /// expression
    pub fn resolve(&self, units: &str) -> Result<CompoundUnit, UnitsError> {
        match self.find(units) {
            Some(id) => Ok(CompoundUnit::single(id)),
            None => self.parse_compound(units),
        }
    }

    /// Parse a compound unit expression against the registered units
    pub fn parse_compound(&self, units: &str) -> Result<CompoundUnit, UnitsError> {
        let text = units.trim();
        if text.is_empty() {
            return Err(UnitsError::MalformedUnit(units.to_string()));
        }

        let mut sides = text.split('/');
        let numerator_text = sides.next().unwrap_or("");
        let denominator_texts: Vec<&str> = sides.collect();

        let (numerator_runs, has_unity) = runs(numerator_text, text)?;
        if numerator_runs.is_empty() && !(has_unity && !denominator_texts.is_empty()) {
            return Err(UnitsError::MalformedUnit(text.to_string()));
        }

        let mut compound = CompoundUnit::default();
        for run in &numerator_runs {
            compound.numerator.extend(self.resolve_run(run)?);
        }

        for denominator_text in denominator_texts {
            let (denominator_runs, has_unity) = runs(denominator_text, text)?;
            if denominator_runs.is_empty() || has_unity {
                return Err(UnitsError::MalformedUnit(text.to_string()));
            }
            for run in &denominator_runs {
                compound.denominator.extend(self.resolve_run(run)?);
            }
        }

        compound
            .normalized()
            .ok_or_else(|| UnitsError::MalformedUnit(text.to_string()))
    }

    fn resolve_run(&self, run: &Run<'_>) -> Result<Vec<Factor>, UnitsError> {
        self.split_run(run.letters, run.exponent, false)
            .or_else(|| self.split_run(run.letters, run.exponent, true))
            .ok_or_else(|| UnitsError::UnknownUnit(run.letters.to_string()))
    }

    /// Split `letters` into registered symbols. The run's exponent belongs
    /// to the last symbol.
    ///
    /// At every offset the longest registered segment whose remainder still
    /// splits wins, and prefixed segments come after all registered ones.
    /// Offsets are solved from the end, so each is visited once.
    fn split_run(&self, letters: &str, exponent: i32, allow_prefix: bool) -> Option<Vec<Factor>> {
        let len = letters.len();
        let longest = self.longest_base() + if allow_prefix { MAX_PREFIX_LEN } else { 0 };

        // first[i]: end and factor of the first segment of the split of letters[i..]
        let mut first: Vec<Option<(usize, Factor)>> = vec![None; len + 1];

        for start in (0..len).rev() {
            if !letters.is_char_boundary(start) {
                continue;
            }
            let mut ends: Vec<usize> = letters[start..]
                .char_indices()
                .map(|(i, c)| start + i + c.len_utf8())
                .take_while(|end| end - start <= longest)
                .collect();
            ends.retain(|&end| end == len || first[end].is_some());
            ends.reverse();

            let mut found = ends.iter().find_map(|&end| {
                self.registered_segment(&letters[start..end], exponent, end == len)
                    .map(|factor| (end, factor))
            });
            if found.is_none() && allow_prefix {
                found = ends.iter().find_map(|&end| {
                    self.prefixed_segment(&letters[start..end], exponent, end == len)
                        .map(|factor| (end, factor))
                });
            }
            first[start] = found;
        }

        let mut factors = Vec::new();
        let mut at = 0;
        while at < len {
            let (end, factor) = first[at]?;
            factors.push(factor);
            at = end;
        }
        Some(factors)
    }

    fn registered_segment(&self, segment: &str, exponent: i32, last: bool) -> Option<Factor> {
        if !last {
            return self.find_key(segment, 1).map(|id| Factor::new(id, 1));
        }
        if let Some(id) = self.find_key(segment, exponent) {
            return Some(Factor::new(id, 1));
        }
        self.find_key(segment, 1).map(|id| Factor::new(id, exponent))
    }

    fn prefixed_segment(&self, segment: &str, exponent: i32, last: bool) -> Option<Factor> {
        Prefix::strip(segment)
            .filter(|(_, rest)| !rest.is_empty())
            .find_map(|(prefix, rest)| {
                let factor = self.registered_segment(rest, exponent, last)?;
                let record_exponent = self.unit(factor.unit)?.exponent();
                Some(Factor {
                    prefix: Some(prefix),
                    scale: prefix.factor_for(record_exponent),
                    ..factor
                })
            })
    }
}

/// Longest prefix symbol in bytes ("µ")
const MAX_PREFIX_LEN: usize = 2;

/// Tokenize one side of an expression into runs.
///
/// Returns the runs and whether a bare "1" was present.
fn runs<'a>(side: &'a str, whole: &str) -> Result<(Vec<Run<'a>>, bool), UnitsError> {
    let malformed = || UnitsError::MalformedUnit(whole.to_string());
    let mut result = Vec::new();
    let mut has_unity = false;
    let mut chars = side.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() || c == '*' || c == '·' || c == '.' {
            chars.next();
            continue;
        }

        if c.is_alphabetic() {
            let mut end = start;
            while let Some(&(i, c)) = chars.peek() {
                if !c.is_alphabetic() {
                    break;
                }
                end = i + c.len_utf8();
                chars.next();
            }
            let letters = &side[start..end];

            let exp_start = end;
            let mut exp_end = end;
            if let Some(&(_, sign)) = chars.peek() {
                if sign == '+' || sign == '-' {
                    chars.next();
                    exp_end += 1;
                    if !matches!(chars.peek(), Some(&(_, d)) if d.is_ascii_digit()) {
                        return Err(malformed());
                    }
                }
            }
            while let Some(&(i, d)) = chars.peek() {
                if !d.is_ascii_digit() {
                    break;
                }
                exp_end = i + 1;
                chars.next();
            }

            let exponent = if exp_end > exp_start {
                match side[exp_start..exp_end].parse::<i32>() {
                    Ok(e) if e != 0 && e.abs() <= MAX_EXPONENT => e,
                    _ => return Err(malformed()),
                }
            } else {
                1
            };

            result.push(Run { letters, exponent });
            continue;
        }

        if c.is_ascii_digit() {
            let mut end = start;
            while let Some(&(i, d)) = chars.peek() {
                if !d.is_ascii_digit() {
                    break;
                }
                end = i + 1;
                chars.next();
            }
            if &side[start..end] != "1" || has_unity || !result.is_empty() {
                return Err(malformed());
            }
            has_unity = true;
            continue;
        }

        return Err(malformed());
    }

    if has_unity && !result.is_empty() {
        return Err(malformed());
    }

    Ok((result, has_unity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn registry() -> Registry {
        let mut reg = Registry::new();
        let m = reg.define("m", None);
        reg.make_metric(Some(m));
        reg.define("V", None);
        reg.define("s", None);
        reg.define("m3", None);
        reg
    }

    fn id(reg: &Registry, symbol: &str) -> UnitId {
        reg.find(symbol).unwrap()
    }

    #[test]
    fn test_runs() {
        let (r, unity) = runs("cm2 Vs-1", "cm2 Vs-1").unwrap();
        assert!(!unity);
        assert_eq!(r, vec![
            Run { letters: "cm", exponent: 2 },
            Run { letters: "Vs", exponent: -1 },
        ]);

        let (r, unity) = runs("1", "1/s").unwrap();
        assert!(r.is_empty());
        assert!(unity);
    }

    #[test]
    fn test_runs_malformed() {
        assert!(runs("m-", "m-").is_err());
        assert!(runs("m$", "m$").is_err());
        assert!(runs("2m", "2m").is_err());
        assert!(runs("m0", "m0").is_err());
    }

    #[test]
    fn test_parse_mobility() {
        let reg = registry();
        let unit = reg.parse_compound("cm2/Vs").unwrap();

        assert_eq!(unit.numerator, vec![Factor::new(id(&reg, "cm"), 2)]);
        assert_eq!(unit.denominator, vec![
            Factor::new(id(&reg, "V"), 1),
            Factor::new(id(&reg, "s"), 1),
        ]);
        assert_eq!(unit.display(&reg), "cm2/V*s");
    }

    #[test]
    fn test_parse_prefers_registered_exponent_key() {
        let reg = registry();
        let unit = reg.parse_compound("m3/s").unwrap();
        assert_eq!(unit.numerator, vec![Factor::new(id(&reg, "m3"), 1)]);
    }

    #[test]
    fn test_parse_separators_and_repeated_slash() {
        let reg = registry();
        let a = reg.parse_compound("m / s / s").unwrap();
        let b = reg.parse_compound("m/s*s").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.denominator, vec![Factor::new(id(&reg, "s"), 2)]);
        assert_eq!(a, reg.parse_compound("m/s2").unwrap());
        assert_eq!(a.display(&reg), "m/s2");
    }

    #[test]
    fn test_parse_negative_exponent_moves_below_line() {
        let reg = registry();
        assert_eq!(reg.parse_compound("s-1").unwrap(), reg.parse_compound("1/s").unwrap());
        assert_eq!(reg.parse_compound("m s-1").unwrap(), reg.parse_compound("m/s").unwrap());
        // A negative exponent in the denominator lands on top
        assert_eq!(reg.parse_compound("1/s-2").unwrap(), reg.parse_compound("s2").unwrap());
    }

    #[test]
    fn test_parse_merges_repeated_factors() {
        let reg = registry();
        let unit = reg.parse_compound("m*m").unwrap();
        assert_eq!(unit.numerator, vec![Factor::new(id(&reg, "m"), 2)]);

        let unit = reg.parse_compound("m2 V/m").unwrap();
        assert_eq!(unit.numerator, vec![
            Factor::new(id(&reg, "m"), 1),
            Factor::new(id(&reg, "V"), 1),
        ]);
        assert!(unit.denominator.is_empty());

        let unit = reg.parse_compound("m/m").unwrap();
        assert_eq!(unit, CompoundUnit::default());
    }

    #[test]
    fn test_parse_exponent_bound() {
        let reg = registry();
        assert!(reg.parse_compound("m64").is_ok());
        assert!(matches!(reg.parse_compound("m65"), Err(UnitsError::MalformedUnit(_))));
        assert!(matches!(reg.parse_compound("m2147483647"), Err(UnitsError::MalformedUnit(_))));
        assert!(matches!(reg.parse_compound("m40*m40"), Err(UnitsError::MalformedUnit(_))));
    }

    #[test]
    fn test_long_unknown_run_fails_quickly() {
        let reg = registry();
        let started = Instant::now();
        for n in [40, 400] {
            let text = format!("{}z", "m".repeat(n));
            assert!(matches!(reg.parse_compound(&text), Err(UnitsError::UnknownUnit(_))));
        }
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_long_run_splits() {
        let reg = registry();
        let unit = reg.parse_compound(&"m".repeat(40)).unwrap();
        // "mm" is millimeter, so forty letters make twenty of them
        assert_eq!(unit.numerator, vec![Factor::new(id(&reg, "mm"), 20)]);
    }

    #[test]
    fn test_parse_unity_numerator() {
        let reg = registry();
        let unit = reg.parse_compound("1/s").unwrap();
        assert!(unit.numerator.is_empty());
        assert_eq!(unit.denominator, vec![Factor::new(id(&reg, "s"), 1)]);
        assert_eq!(unit.display(&reg), "1/s");
    }

    #[test]
    fn test_parse_unknown_token() {
        let reg = registry();
        assert_eq!(
            reg.parse_compound("cm2/Vx"),
            Err(UnitsError::UnknownUnit("Vx".to_string()))
        );
    }

    #[test]
    fn test_parse_malformed() {
        let reg = registry();
        assert!(matches!(reg.parse_compound(""), Err(UnitsError::MalformedUnit(_))));
        assert!(matches!(reg.parse_compound("m/"), Err(UnitsError::MalformedUnit(_))));
        assert!(matches!(reg.parse_compound("/s"), Err(UnitsError::MalformedUnit(_))));
        assert!(matches!(reg.parse_compound("1"), Err(UnitsError::MalformedUnit(_))));
    }

    #[test]
    fn test_ms_is_registered_unit_when_defined() {
        let mut reg = registry();
        let s = id(&reg, "s");
        reg.make_metric(Some(s));

        let unit = reg.resolve("ms").unwrap();
        assert_eq!(unit, CompoundUnit::single(id(&reg, "ms")));
        // Inside a larger run the whole-token match still wins over m + s
        let unit = reg.parse_compound("Vms").unwrap();
        assert_eq!(unit.numerator[1], Factor::new(id(&reg, "ms"), 1));
    }

    #[test]
    fn test_ms_is_meter_second_without_millisecond() {
        let reg = registry();
        let unit = reg.parse_compound("ms").unwrap();
        assert_eq!(unit.numerator, vec![
            Factor::new(id(&reg, "m"), 1),
            Factor::new(id(&reg, "s"), 1),
        ]);
    }

    #[test]
    fn test_prefix_decomposition_as_last_resort() {
        let mut reg = Registry::new();
        let v = reg.define("V", None);
        let unit = reg.parse_compound("mV").unwrap();

        let factor = unit.numerator[0];
        assert_eq!(factor.unit, v);
        assert_eq!(factor.prefix.map(|p| p.name), Some("milli"));
        assert_eq!(factor.scale, 1e-3);
        assert_eq!(unit.display(&reg), "mV");
    }

    #[test]
    fn test_prefix_decomposition_respects_record_exponent() {
        let mut reg = Registry::new();
        reg.define("m3", None);
        let unit = reg.parse_compound("km3").unwrap();
        assert_eq!(unit.numerator[0].scale, 1e9);
    }

    #[test]
    fn test_backtracking_split() {
        let mut reg = Registry::new();
        reg.define("ab", None);
        reg.define("a", None);
        reg.define("bc", None);
        // Longest-first "ab" leaves "c", which is unknown; backtrack to "a" + "bc"
        let unit = reg.parse_compound("abc").unwrap();
        assert_eq!(unit.numerator.len(), 2);
        assert_eq!(reg.describe(unit.numerator[1].unit), Some("bc"));
    }
}
