//! SI prefixes and metric family generation

use tracing::debug;
use crate::conversion::Conversion;
use crate::registry::Registry;
use crate::unit::UnitId;

/// An SI prefix with its multiplier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prefix {
    pub name: &'static str,
    pub symbol: &'static str,
    pub factor: f64,
}

/// The prefixes generated for every metric family, smallest first
pub static PREFIXES: [Prefix; 13] = [
    Prefix { name: "atto", symbol: "a", factor: 1e-18 },
    Prefix { name: "femto", symbol: "f", factor: 1e-15 },
    Prefix { name: "pico", symbol: "p", factor: 1e-12 },
    Prefix { name: "nano", symbol: "n", factor: 1e-9 },
    Prefix { name: "micro", symbol: "u", factor: 1e-6 },
    Prefix { name: "milli", symbol: "m", factor: 1e-3 },
    Prefix { name: "centi", symbol: "c", factor: 1e-2 },
    Prefix { name: "deci", symbol: "d", factor: 1e-1 },
    Prefix { name: "kilo", symbol: "k", factor: 1e3 },
    Prefix { name: "mega", symbol: "M", factor: 1e6 },
    Prefix { name: "giga", symbol: "G", factor: 1e9 },
    Prefix { name: "tera", symbol: "T", factor: 1e12 },
    Prefix { name: "peta", symbol: "P", factor: 1e15 },
];

impl Prefix {
    /// Look up a prefix by symbol; "µ" and "μ" are accepted for micro
    pub fn from_symbol(symbol: &str) -> Option<Prefix> {
        let symbol = match symbol {
            "µ" | "μ" => "u",
            s => s,
        };
        PREFIXES.iter().find(|p| p.symbol == symbol).copied()
    }

    /// Split a leading prefix off `s`, returning the prefix and the rest
    pub fn strip(s: &str) -> impl Iterator<Item = (Prefix, &str)> + '_ {
        let micro_alias = ["µ", "μ"]
            .into_iter()
            .filter_map(move |alias| s.strip_prefix(alias).map(|rest| (PREFIXES[4], rest)));
        PREFIXES
            .iter()
            .filter_map(move |p| s.strip_prefix(p.symbol).map(|rest| (*p, rest)))
            .chain(micro_alias)
    }

    /// Multiplier for a unit carrying this prefix raised to `exponent`
    /// (centi on "m3" scales by 1e-6)
    pub fn factor_for(&self, exponent: i32) -> f64 {
        integer_power(self.factor, exponent)
    }
}

/// `base^exp` for an integer exponent
pub fn integer_power(base: f64, exp: i32) -> f64 {
    base.powi(exp)
}

impl Registry {
    /// Generate the metric family of `basis` ("m" -> "am" .. "Pm").
    ///
    /// Each prefixed unit gets `basis` as its basis and a linear conversion
    /// to it. Returns false only when `basis` is missing or not registered.
    pub fn make_metric(&mut self, basis: Option<UnitId>) -> bool {
        let Some(basis) = basis else {
            return false;
        };
        let Some(record) = self.unit(basis) else {
            return false;
        };

        let basis_name = record.name().to_string();
        let exponent = record.exponent();

        for prefix in &PREFIXES {
            let symbol = format!("{}{}", prefix.symbol, basis_name);
            let unit = self.define(&symbol, Some(basis));
            if unit == basis || self.has_conversion(unit, basis) {
                continue;
            }
            self.push_edge(unit, basis, Conversion::linear(prefix.factor_for(exponent)));
        }

        debug!(basis = %basis_name, "generated metric family");
        true
    }
}
