//! Gauge Core - Fundamental types
//!
//! This crate provides the vocabulary shared by the engine and its bindings:
//! - `UnitsError`: the error taxonomy with binding error codes
//! - `ErrorReport`: structured, serializable error for protocol responses
//! - `split_value` / `format_number`: numeric literal handling

mod error;
mod number;

pub use error::{UnitsError, ErrorReport, codes, with_code, SUCCESS};
pub use number::{split_value, format_number, ValueLiteral};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{UnitsError, ErrorReport, split_value, format_number};
    pub use crate::error::codes;
}
