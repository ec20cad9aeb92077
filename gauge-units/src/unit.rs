//! Unit records and their handles

use std::fmt;
use serde::{Serialize, Deserialize};
use crate::registry::{EdgeId, Direction};

/// Handle to a unit record inside a `Registry`.
///
/// Handles index the registry's record arena and stay valid for the
/// registry's whole lifetime since records are never removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(u32);

impl UnitId {
    /// Rebuild a handle from its raw value (e.g. received from a binding)
    pub fn from_raw(raw: u32) -> Self {
        UnitId(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A registered unit, keyed by (base symbol, exponent)
#[derive(Debug, Clone)]
pub struct UnitRecord {
    pub(crate) base: String,
    pub(crate) exponent: i32,
    pub(crate) name: String,
    pub(crate) basis: Option<UnitId>,
    pub(crate) edges: Vec<(EdgeId, Direction)>,
    pub(crate) derived: Vec<UnitId>,
}

impl UnitRecord {
    pub(crate) fn new(base: &str, exponent: i32, basis: Option<UnitId>) -> Self {
        let name = if exponent == 1 {
            base.to_string()
        } else {
            format!("{}{}", base, exponent)
        };
        UnitRecord {
            base: base.to_string(),
            exponent,
            name,
            basis,
            edges: Vec::new(),
            derived: Vec::new(),
        }
    }

    /// Base symbol without the exponent ("cm" for "cm2")
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn exponent(&self) -> i32 {
        self.exponent
    }

    /// Display name: base symbol followed by the exponent unless it is 1
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The unit this one was defined relative to
    pub fn basis(&self) -> Option<UnitId> {
        self.basis
    }

    /// Conversion edges touching this unit, in registration order
    pub fn edges(&self) -> &[(EdgeId, Direction)] {
        &self.edges
    }

    /// Units that name this one as their basis
    pub fn derived(&self) -> &[UnitId] {
        &self.derived
    }
}

impl fmt::Display for UnitRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Largest exponent magnitude accepted in a symbol or unit expression
pub const MAX_EXPONENT: i32 = 64;

/// Split a symbol into (base, exponent) by its trailing signed digits.
///
/// Never fails: a symbol without usable exponent digits is its own base
/// with exponent 1 ("m" -> ("m", 1), "42" -> ("42", 1), "m0" -> ("m0", 1)).
/// Exponents beyond `MAX_EXPONENT` count as unusable.
pub fn split_symbol(symbol: &str) -> (&str, i32) {
    let s = symbol.trim();
    let digits_start = s.trim_end_matches(|c: char| c.is_ascii_digit()).len();

    if digits_start == s.len() || digits_start == 0 {
        return (s, 1);
    }

    let mut base_end = digits_start;
    if s[..digits_start].ends_with(['+', '-']) {
        base_end -= 1;
    }

    let base = &s[..base_end];
    if base.is_empty() {
        return (s, 1);
    }

    match s[base_end..].parse::<i32>() {
        Ok(exp) if exp != 0 && exp.abs() <= MAX_EXPONENT => (base, exp),
        _ => (s, 1),
    }
}
