//! # tally-sheets-formula
//!
//! Formula parser and evaluator for tally-sheets.
//!
//! This crate provides:
//! - Formula parsing (text → AST)
//! - Formula evaluation against a cell-value lookup (AST → value)
//! - Canonical rendering (AST → normalized text)
//! - Referenced-position extraction for dependency tracking
//!
//! The grammar covers numeric literals, cell references, unary `+`/`-`,
//! binary `+ - * /`, and parentheses. Evaluation never fails with an
//! exception: reference, type, and division problems surface as
//! [`CellError`](tally_sheets_core::CellError) values.
//!
//! ## Example
//!
//! ```rust
//! use tally_sheets_formula::parse_formula;
//!
//! // The leading '=' marker is the caller's concern; parse the body only.
//! let formula = parse_formula("1 + (2 * 3)").unwrap();
//! assert_eq!(formula.render(), "1+2*3");
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod formula;
pub mod parser;

pub use ast::{BinaryOperator, CellRef, Expr, UnaryOperator};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::CellValueLookup;
pub use formula::Formula;
pub use parser::parse_formula;
