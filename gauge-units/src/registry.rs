//! Unit record store and conversion edges
//!
//! The registry owns every unit record and conversion edge. Definitions take
//! `&mut self` and lookups `&self`, so a populated registry can be shared
//! read-only (for example behind an `Arc`) without locking.

use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use tracing::trace;
use gauge_core::UnitsError;
use crate::conversion::Conversion;
use crate::unit::{split_symbol, UnitId, UnitRecord};

/// Handle to a conversion edge inside a `Registry`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(u32);

impl EdgeId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Orientation in which a unit sees an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The unit is the edge's source
    Forward,
    /// The unit is the edge's destination
    Backward,
}

/// A registered conversion between two units
#[derive(Debug, Clone)]
pub struct Edge {
    from: UnitId,
    to: UnitId,
    conversion: Conversion,
}

impl Edge {
    pub fn from(&self) -> UnitId {
        self.from
    }

    pub fn to(&self) -> UnitId {
        self.to
    }

    pub fn conversion(&self) -> &Conversion {
        &self.conversion
    }

    /// (start, end, conversion) when walking the edge in `direction`
    pub fn oriented(&self, direction: Direction) -> (UnitId, UnitId, Conversion) {
        match direction {
            Direction::Forward => (self.from, self.to, self.conversion.clone()),
            Direction::Backward => (self.to, self.from, self.conversion.inverse()),
        }
    }
}

/// Registry of units and the conversions between them
#[derive(Debug, Clone, Default)]
pub struct Registry {
    pub(crate) units: Vec<UnitRecord>,
    pub(crate) edges: Vec<Edge>,
    index: HashMap<(String, i32), UnitId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a unit, or return the existing one with the same key.
    ///
    /// The symbol's trailing digits are its exponent ("cm2"). Malformed
    /// symbols degrade to exponent 1 rather than failing, and a basis handle
    /// that is not in this registry is ignored.
    pub fn define(&mut self, symbol: &str, basis: Option<UnitId>) -> UnitId {
        let (base, exponent) = split_symbol(symbol);

        if let Some(id) = self.find_key(base, exponent) {
            return id;
        }

        let basis = basis.filter(|b| self.unit(*b).is_some());
        let id = UnitId::from_raw(self.units.len() as u32);
        self.units.push(UnitRecord::new(base, exponent, basis));
        self.index.insert((base.to_string(), exponent), id);

        if let Some(b) = basis {
            self.units[b.index()].derived.push(id);
        }

        trace!(unit = %self.units[id.index()].name, ?basis, "defined unit");
        id
    }

    /// Exact-key lookup of a symbol such as "cm" or "m3"
    pub fn find(&self, symbol: &str) -> Option<UnitId> {
        let (base, exponent) = split_symbol(symbol);
        self.find_key(base, exponent)
    }

    /// Whether any unit uses `base` as its base symbol, whatever the exponent
    pub fn contains_base(&self, base: &str) -> bool {
        self.units.iter().any(|u| u.base == base)
    }

    /// Byte length of the longest registered base symbol
    pub(crate) fn longest_base(&self) -> usize {
        self.units.iter().map(|u| u.base.len()).max().unwrap_or(0)
    }

    pub(crate) fn find_key(&self, base: &str, exponent: i32) -> Option<UnitId> {
        self.index.get(&(base.to_string(), exponent)).copied()
    }

    /// Register a conversion from `from` to `to`.
    ///
    /// The edge is walked forward from `from` and backward from `to`.
    pub fn define_conversion(
        &mut self,
        from: UnitId,
        to: UnitId,
        conversion: Conversion,
    ) -> Result<EdgeId, UnitsError> {
        self.record(from)?;
        self.record(to)?;
        Ok(self.push_edge(from, to, conversion))
    }

    /// Append an edge between two units known to be in this registry
    pub(crate) fn push_edge(&mut self, from: UnitId, to: UnitId, conversion: Conversion) -> EdgeId {
        let id = EdgeId(self.edges.len() as u32);
        trace!(
            from = %self.units[from.index()].name,
            to = %self.units[to.index()].name,
            ?conversion,
            "defined conversion"
        );
        self.edges.push(Edge { from, to, conversion });
        self.units[from.index()].edges.push((id, Direction::Forward));
        self.units[to.index()].edges.push((id, Direction::Backward));
        id
    }

    /// Register a conversion given as two plain functions
    pub fn define_conversion_fn<F, B>(
        &mut self,
        from: UnitId,
        to: UnitId,
        forward: F,
        backward: B,
    ) -> Result<EdgeId, UnitsError>
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
        B: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        self.define_conversion(from, to, Conversion::custom(forward, backward))
    }

    /// Whether an explicit edge joins the two units, in either orientation
    pub fn has_conversion(&self, a: UnitId, b: UnitId) -> bool {
        self.unit(a).map_or(false, |record| {
            record.edges.iter().any(|(edge, _)| {
                let e = &self.edges[edge.0 as usize];
                (e.from == a && e.to == b) || (e.from == b && e.to == a)
            })
        })
    }

    pub fn unit(&self, id: UnitId) -> Option<&UnitRecord> {
        self.units.get(id.index())
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0 as usize)
    }

    /// Display name of a unit
    pub fn describe(&self, id: UnitId) -> Option<&str> {
        self.unit(id).map(|u| u.name())
    }

    /// All units in definition order
    pub fn units(&self) -> impl Iterator<Item = (UnitId, &UnitRecord)> {
        self.units
            .iter()
            .enumerate()
            .map(|(i, u)| (UnitId::from_raw(i as u32), u))
    }

    /// All edges in registration order
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges
            .iter()
            .enumerate()
            .map(|(i, e)| (EdgeId(i as u32), e))
    }

    /// Display names of all units in definition order
    pub fn symbols(&self) -> Vec<&str> {
        self.units.iter().map(|u| u.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub(crate) fn record(&self, id: UnitId) -> Result<&UnitRecord, UnitsError> {
        self.unit(id).ok_or(UnitsError::InvalidHandle(id.raw()))
    }
}
