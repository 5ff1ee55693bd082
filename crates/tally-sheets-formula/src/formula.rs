//! Parsed formula handle

use crate::ast::Expr;
use crate::evaluator::{self, CellValueLookup};
use std::fmt;
use tally_sheets_core::{Position, Value};

/// A parsed formula expression
///
/// Produced by [`parse_formula`](crate::parse_formula). Evaluation runs
/// against a [`CellValueLookup`] and always yields a [`Value`]; rendering
/// yields canonical text independent of the original input's formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    expr: Expr,
}

impl Formula {
    pub(crate) fn from_expr(expr: Expr) -> Self {
        Self { expr }
    }

    /// The underlying expression tree
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Evaluate against the given cell values
    ///
    /// Never fails: reference, type, and division problems come back as
    /// [`CellError`](tally_sheets_core::CellError) values.
    pub fn evaluate<L: CellValueLookup>(&self, lookup: &L) -> Value {
        evaluator::evaluate(&self.expr, lookup)
    }

    /// Canonical text of the expression, without the leading `=` marker
    ///
    /// No whitespace, minimal parentheses.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.expr.render_into(&mut out);
        out
    }

    /// Positions this formula reads, sorted row-major and de-duplicated
    ///
    /// Only in-extent references appear; an out-of-extent reference is not a
    /// dependency (it evaluates to `#REF!` regardless of sheet state).
    pub fn referenced_cells(&self) -> Vec<Position> {
        let mut refs = Vec::new();
        self.expr.collect_refs(&mut refs);

        let mut positions: Vec<Position> = refs.iter().filter_map(|r| r.position()).collect();
        positions.sort_unstable();
        positions.dedup();
        positions
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse_formula;
    use tally_sheets_core::Position;

    #[test]
    fn test_referenced_cells_sorted_and_deduped() {
        let f = parse_formula("B2+A1+B2+A2").unwrap();
        assert_eq!(
            f.referenced_cells(),
            vec![
                Position::new(0, 0), // A1
                Position::new(1, 0), // A2
                Position::new(1, 1), // B2
            ]
        );
    }

    #[test]
    fn test_referenced_cells_ignores_absolute_markers() {
        // $A$1 and A1 are the same dependency
        let f = parse_formula("$A$1+A1").unwrap();
        assert_eq!(f.referenced_cells(), vec![Position::new(0, 0)]);
    }

    #[test]
    fn test_referenced_cells_empty_for_literals() {
        let f = parse_formula("1+2*3").unwrap();
        assert!(f.referenced_cells().is_empty());
    }

    #[test]
    fn test_display_is_canonical_render() {
        let f = parse_formula(" (1 + 2) * A1 ").unwrap();
        assert_eq!(f.to_string(), "(1+2)*A1");
    }
}
