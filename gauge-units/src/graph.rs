//! Path search over the conversion graph
//!
//! Units are nodes. Every registered edge can be walked in both directions,
//! and a prefixed unit ("cm") is implicitly linked to its basis ("m") even
//! without a registered edge. Breadth-first search gives the path with the
//! fewest hops.

use std::collections::{HashMap, VecDeque};
use tracing::debug;
use crate::conversion::Conversion;
use crate::metric::Prefix;
use crate::registry::{Direction, EdgeId, Registry};
use crate::unit::UnitId;

/// How a hop was made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Via {
    /// A registered edge, walked in the given direction
    Edge(EdgeId, Direction),
    /// The implicit prefix link; `Forward` goes from the prefixed unit to its basis
    Basis(Direction),
}

impl Via {
    fn direction(&self) -> Direction {
        match self {
            Via::Edge(_, d) | Via::Basis(d) => *d,
        }
    }
}

/// One step of a conversion path
#[derive(Debug, Clone)]
pub struct Hop {
    pub from: UnitId,
    pub to: UnitId,
    pub via: Via,
    conversion: Conversion,
}

impl Hop {
    /// Convert a value expressed in `from` into `to`
    pub fn apply(&self, value: f64) -> f64 {
        match self.via.direction() {
            Direction::Forward => self.conversion.forward(value),
            Direction::Backward => self.conversion.backward(value),
        }
    }

    /// The conversion oriented from `from` to `to`
    pub fn conversion(&self) -> Conversion {
        match self.via.direction() {
            Direction::Forward => self.conversion.clone(),
            Direction::Backward => self.conversion.inverse(),
        }
    }
}

/// Collapse a path into a single conversion
pub fn compose(path: &[Hop]) -> Conversion {
    path.iter()
        .fold(Conversion::identity(), |acc, hop| acc.then(&hop.conversion()))
}

impl Registry {
    /// Shortest chain of hops converting `from` into `to`.
    ///
    /// `None` means the units are not connected (incommensurable) or a
    /// handle is not in this registry. Identical units give an empty path.
    pub fn find_path(&self, from: UnitId, to: UnitId) -> Option<Vec<Hop>> {
        self.unit(from)?;
        self.unit(to)?;
        if from == to {
            return Some(Vec::new());
        }

        let mut visited = vec![false; self.units.len()];
        let mut came_from: HashMap<UnitId, Hop> = HashMap::new();
        let mut queue = VecDeque::new();

        visited[from.index()] = true;
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            for hop in self.neighbors(current) {
                let next = hop.to;
                if visited[next.index()] {
                    continue;
                }
                visited[next.index()] = true;
                came_from.insert(next, hop);

                if next == to {
                    return Some(unwind(came_from, from, to));
                }
                queue.push_back(next);
            }
        }

        debug!(from = ?self.describe(from), to = ?self.describe(to), "no conversion path");
        None
    }

    /// Hops leaving `id`: registered edges first, then basis links
    fn neighbors(&self, id: UnitId) -> Vec<Hop> {
        let record = &self.units[id.index()];
        let mut hops = Vec::with_capacity(record.edges.len() + record.derived.len() + 1);

        for &(edge_id, direction) in &record.edges {
            let edge = &self.edges[edge_id.raw() as usize];
            let to = match direction {
                Direction::Forward => edge.to(),
                Direction::Backward => edge.from(),
            };
            hops.push(Hop {
                from: id,
                to,
                via: Via::Edge(edge_id, direction),
                conversion: edge.conversion().clone(),
            });
        }

        if let Some(basis) = record.basis {
            if let Some(conversion) = self.basis_link(id) {
                hops.push(Hop { from: id, to: basis, via: Via::Basis(Direction::Forward), conversion });
            }
        }

        for &derived in &record.derived {
            if let Some(conversion) = self.basis_link(derived) {
                hops.push(Hop { from: id, to: derived, via: Via::Basis(Direction::Backward), conversion });
            }
        }

        hops
    }

    /// Implicit conversion from a prefixed unit to its basis.
    ///
    /// Exists only when the unit's base symbol is an SI prefix followed by
    /// the basis's base symbol and both carry the same exponent.
    pub(crate) fn basis_link(&self, unit: UnitId) -> Option<Conversion> {
        let record = self.unit(unit)?;
        let basis = self.unit(record.basis?)?;
        if record.exponent != basis.exponent {
            return None;
        }

        let prefix = record.base.strip_suffix(basis.base.as_str())?;
        let prefix = Prefix::from_symbol(prefix)?;
        Some(Conversion::linear(prefix.factor_for(record.exponent)))
    }
}

fn unwind(mut came_from: HashMap<UnitId, Hop>, from: UnitId, to: UnitId) -> Vec<Hop> {
    let mut path = Vec::new();
    let mut current = to;
    while current != from {
        match came_from.remove(&current) {
            Some(hop) => {
                current = hop.from;
                path.push(hop);
            }
            None => break,
        }
    }
    path.reverse();
    path
}
