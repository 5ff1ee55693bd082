//! Error types for tally-sheets-core

use crate::position::Position;
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Structural errors raised by the engine's public entry points
///
/// These abort the single offending operation atomically; none of them leaves
/// a sheet in a partially-edited state. Evaluation-time problems are not
/// errors in this sense — they surface as [`crate::CellError`] values.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Row index out of bounds
    #[error("Row index {0} out of bounds (max: {1})")]
    RowOutOfBounds(u32, u32),

    /// Column index out of bounds
    #[error("Column index {0} out of bounds (max: {1})")]
    ColumnOutOfBounds(u16, u16),

    /// Position outside the sheet extent
    #[error("Cell position ({row}, {col}) is not valid")]
    InvalidPosition { row: u32, col: u16 },

    /// Formula text could not be parsed
    #[error("Formula syntax error: {0}")]
    FormulaSyntax(String),

    /// Committing the edit would create a reference cycle
    #[error("Circular dependency detected involving cell {0}")]
    CircularDependency(Position),
}
