//! Formula evaluator
//!
//! Evaluates formula ASTs against a cell-value lookup. Evaluation never
//! fails with an exception: reference, type, and division problems become
//! [`CellError`] values carried inside the result.

use crate::ast::{BinaryOperator, Expr, UnaryOperator};
use tally_sheets_core::{CellError, Position, Value};

/// Read-only source of cell values during evaluation
///
/// The sheet supplies this; the evaluator asks it for every position a
/// reference names. Implementations must answer for any in-extent position
/// (unset cells read back as empty text).
pub trait CellValueLookup {
    /// The current value of the cell at `pos`
    fn cell_value(&self, pos: Position) -> Value;
}

impl CellValueLookup for std::collections::HashMap<Position, Value> {
    fn cell_value(&self, pos: Position) -> Value {
        self.get(&pos).cloned().unwrap_or_else(Value::empty)
    }
}

/// Evaluate an expression to a value
pub(crate) fn evaluate(expr: &Expr, lookup: &dyn CellValueLookup) -> Value {
    match eval_number(expr, lookup) {
        Ok(n) => Value::Number(n),
        Err(e) => Value::Error(e),
    }
}

fn eval_number(expr: &Expr, lookup: &dyn CellValueLookup) -> Result<f64, CellError> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Ref(cell_ref) => {
            let pos = cell_ref.position().ok_or(CellError::Ref)?;
            coerce_to_number(&lookup.cell_value(pos))
        }
        Expr::UnaryOp { op, operand } => {
            let v = eval_number(operand, lookup)?;
            Ok(match op {
                UnaryOperator::Plus => v,
                UnaryOperator::Negate => -v,
            })
        }
        Expr::BinaryOp { op, left, right } => {
            let lhs = eval_number(left, lookup)?;
            let rhs = eval_number(right, lookup)?;
            match op {
                BinaryOperator::Add => Ok(lhs + rhs),
                BinaryOperator::Subtract => Ok(lhs - rhs),
                BinaryOperator::Multiply => Ok(lhs * rhs),
                BinaryOperator::Divide => {
                    if rhs == 0.0 {
                        Err(CellError::Div0)
                    } else {
                        Ok(lhs / rhs)
                    }
                }
            }
        }
    }
}

/// Arithmetic coercion of a cell value
///
/// Blank text counts as zero; numeric text converts; anything else is a
/// type error. Errors propagate unchanged through dependent formulas.
fn coerce_to_number(value: &Value) -> Result<f64, CellError> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Ok(0.0)
            } else {
                trimmed.parse::<f64>().map_err(|_| CellError::Value)
            }
        }
        Value::Error(e) => Err(*e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_formula;
    use std::collections::HashMap;

    fn eval(src: &str, cells: &HashMap<Position, Value>) -> Value {
        parse_formula(src).unwrap().evaluate(cells)
    }

    fn empty() -> HashMap<Position, Value> {
        HashMap::new()
    }

    #[test]
    fn test_evaluate_arithmetic() {
        let cells = empty();
        assert_eq!(eval("1+2*3", &cells), Value::Number(7.0));
        assert_eq!(eval("(1+2)*3", &cells), Value::Number(9.0));
        assert_eq!(eval("10/4", &cells), Value::Number(2.5));
        assert_eq!(eval("-3+1", &cells), Value::Number(-2.0));
    }

    #[test]
    fn test_evaluate_division_by_zero() {
        let cells = empty();
        assert_eq!(eval("1/0", &cells), Value::Error(CellError::Div0));
        assert_eq!(eval("1/(2-2)", &cells), Value::Error(CellError::Div0));
    }

    #[test]
    fn test_evaluate_cell_references() {
        let mut cells = empty();
        cells.insert(Position::new(0, 0), Value::Number(10.0));
        cells.insert(Position::new(0, 1), Value::Number(4.0));

        assert_eq!(eval("A1", &cells), Value::Number(10.0));
        assert_eq!(eval("A1+B1", &cells), Value::Number(14.0));
        assert_eq!(eval("A1/B1", &cells), Value::Number(2.5));
    }

    #[test]
    fn test_evaluate_text_coercion() {
        let mut cells = empty();
        cells.insert(Position::new(0, 0), Value::Text("12".into()));
        cells.insert(Position::new(1, 0), Value::Text("abc".into()));
        cells.insert(Position::new(2, 0), Value::Text(String::new()));

        assert_eq!(eval("A1*2", &cells), Value::Number(24.0));
        assert_eq!(eval("A2+1", &cells), Value::Error(CellError::Value));
        assert_eq!(eval("A3+1", &cells), Value::Number(1.0)); // Blank is zero
    }

    #[test]
    fn test_evaluate_unset_cell_is_zero() {
        let cells = empty();
        assert_eq!(eval("Z99+1", &cells), Value::Number(1.0));
    }

    #[test]
    fn test_evaluate_error_propagation() {
        let mut cells = empty();
        cells.insert(Position::new(0, 0), Value::Error(CellError::Div0));

        assert_eq!(eval("A1+1", &cells), Value::Error(CellError::Div0));
        assert_eq!(eval("2*A1", &cells), Value::Error(CellError::Div0));
    }

    #[test]
    fn test_evaluate_out_of_extent_ref() {
        let cells = empty();
        assert_eq!(eval("XFE1", &cells), Value::Error(CellError::Ref));
        assert_eq!(eval("A99999999", &cells), Value::Error(CellError::Ref));
    }
}
