//! # tally-sheets
//!
//! An in-process spreadsheet engine with dependency tracking, cycle
//! rejection, and lazy, memoized recalculation.
//!
//! A [`Sheet`] stores cell content (empty, literal text, or formula), keeps
//! a bidirectional dependency graph between cells, rejects edits that would
//! create reference cycles before committing anything, and memoizes formula
//! results — an edit invalidates exactly the caches it can affect, and the
//! next read re-evaluates exactly the stale subgraph.
//!
//! ## Example
//!
//! ```rust
//! use tally_sheets::{Sheet, Value};
//!
//! let mut sheet = Sheet::new();
//! sheet.set_cell("A1", "5").unwrap();
//! sheet.set_cell("B1", "=A1*2").unwrap();
//! assert_eq!(sheet.value("B1").unwrap(), Value::Number(10.0));
//!
//! // Editing A1 invalidates B1's memo; the next read recomputes
//! sheet.set_cell("A1", "10").unwrap();
//! assert_eq!(sheet.value("B1").unwrap(), Value::Number(20.0));
//!
//! // Cycles are rejected before anything is committed
//! assert!(sheet.set_cell("A1", "=B1").is_err());
//! ```
//!
//! The engine is single-threaded and synchronous: every operation runs to
//! completion, and a host embedding it in a concurrent context must
//! serialize access.

pub mod cell;
mod graph;
pub mod sheet;

pub use cell::{Cell, CellContent};
pub use sheet::Sheet;

// Re-export core types
pub use tally_sheets_core::{
    CellError, Error, Position, Result, Size, Value, ESCAPE_MARKER, FORMULA_MARKER, MAX_COLS,
    MAX_ROWS,
};

// Re-export formula types
pub use tally_sheets_formula::{
    parse_formula, CellValueLookup, Formula, FormulaError, FormulaResult,
};
