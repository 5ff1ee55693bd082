//! # tally-sheets-core
//!
//! Core data structures for the tally-sheets spreadsheet engine.
//!
//! This crate provides the fundamental types used throughout tally-sheets:
//! - [`Position`] and [`Size`] - Cell addressing and the printable extent
//! - [`Value`] - Read-back cell values (numbers, text, evaluation errors)
//! - [`CellError`] - Evaluation error kinds (`#REF!`, `#VALUE!`, `#DIV/0!`)
//! - [`Error`] - Structural errors (bad addresses, syntax, cycles)
//!
//! ## Example
//!
//! ```rust
//! use tally_sheets_core::{Position, Value};
//!
//! let pos = Position::parse("B2").unwrap();
//! assert_eq!(pos, Position::new(1, 1));
//! assert_eq!(pos.to_string(), "B2");
//!
//! let v = Value::Number(42.0);
//! assert_eq!(v.to_string(), "42");
//! ```

pub mod error;
pub mod position;
pub mod value;

// Re-exports for convenience
pub use error::{Error, Result};
pub use position::{Position, Size};
pub use value::{CellError, Value};

/// Maximum number of rows in a sheet
pub const MAX_ROWS: u32 = 16_384;

/// Maximum number of columns in a sheet
pub const MAX_COLS: u16 = 16_384;

/// Leading character marking cell text as a formula
pub const FORMULA_MARKER: char = '=';

/// Leading character suppressing special interpretation of cell text
pub const ESCAPE_MARKER: char = '\'';
