//! Gauge Units - Unit registry and conversion engine
//!
//! Values carrying units ("300K", "5000mV", "1.2cm2/Vs") are converted
//! across an open set of user-defined units. Callers populate a `Registry`
//! first and only read from it afterwards:
//!
//! - `define` / `find`: unit records keyed by (base symbol, exponent)
//! - `define_conversion`: edges of the conversion graph
//! - `make_metric`: SI-prefix families ("m" -> "cm", "km", ...)
//! - `add_presets`: standard groups (time, temp, length, energy, ...)
//! - `convert` / `convert_value`: conversions along the shortest path
//!
//! ```
//! use gauge_units::Registry;
//!
//! let mut units = Registry::new();
//! units.add_presets("temp").unwrap();
//! assert_eq!(units.convert("72F", "C", true).unwrap(), "22.2222C");
//! ```

mod unit;
mod conversion;
mod registry;
mod metric;
mod graph;
mod parse;
mod convert;
mod presets;
pub mod stdconv;

pub use unit::{UnitId, UnitRecord, split_symbol, MAX_EXPONENT};
pub use conversion::{Conversion, ConversionFn};
pub use registry::{Registry, Edge, EdgeId, Direction};
pub use metric::{Prefix, PREFIXES, integer_power};
pub use graph::{Hop, Via, compose};
pub use parse::{CompoundUnit, Factor};
pub use presets::{STANDARD, preset_groups};
