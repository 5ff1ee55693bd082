//! Formula Abstract Syntax Tree types

use tally_sheets_core::{Position, MAX_COLS, MAX_ROWS};

/// Formula expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal
    Number(f64),
    /// Cell reference
    Ref(CellRef),
    /// Unary operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expr>,
    },
    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

/// A cell reference as written in a formula
///
/// Row and column are stored wide so that a syntactically well-formed but
/// out-of-extent reference (e.g. `XFE1`) still parses; it evaluates to
/// `#REF!` and is excluded from the referenced-position set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRef {
    /// Row index (0-based; may exceed the sheet extent)
    pub row: u32,
    /// Column index (0-based; may exceed the sheet extent)
    pub col: u32,
    /// Whether the row reference is absolute ($)
    pub row_abs: bool,
    /// Whether the column reference is absolute ($)
    pub col_abs: bool,
}

impl CellRef {
    /// Create a relative reference to an in-extent position
    pub fn new(pos: Position) -> Self {
        Self {
            row: pos.row,
            col: pos.col as u32,
            row_abs: false,
            col_abs: false,
        }
    }

    /// The in-extent position this reference denotes, if any
    pub fn position(&self) -> Option<Position> {
        if self.row < MAX_ROWS && self.col < MAX_COLS as u32 {
            Some(Position::new(self.row, self.col as u16))
        } else {
            None
        }
    }

    fn render_into(&self, out: &mut String) {
        if self.col_abs {
            out.push('$');
        }
        out.push_str(&column_letters(self.col));
        if self.row_abs {
            out.push('$');
        }
        out.push_str(&(self.row as u64 + 1).to_string());
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOperator {
    fn symbol(&self) -> char {
        match self {
            BinaryOperator::Add => '+',
            BinaryOperator::Subtract => '-',
            BinaryOperator::Multiply => '*',
            BinaryOperator::Divide => '/',
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,
    Negate,
}

impl UnaryOperator {
    fn symbol(&self) -> char {
        match self {
            UnaryOperator::Plus => '+',
            UnaryOperator::Negate => '-',
        }
    }
}

// Precedence tiers used for both parsing and minimal-parenthesis rendering.
const PREC_ADDITIVE: u8 = 1;
const PREC_MULTIPLICATIVE: u8 = 2;
const PREC_UNARY: u8 = 3;
const PREC_ATOM: u8 = 4;

impl Expr {
    fn precedence(&self) -> u8 {
        match self {
            Expr::Number(_) | Expr::Ref(_) => PREC_ATOM,
            Expr::UnaryOp { .. } => PREC_UNARY,
            Expr::BinaryOp { op, .. } => match op {
                BinaryOperator::Add | BinaryOperator::Subtract => PREC_ADDITIVE,
                BinaryOperator::Multiply | BinaryOperator::Divide => PREC_MULTIPLICATIVE,
            },
        }
    }

    /// Render canonical text: no whitespace, parentheses only where the
    /// structure requires them. Independent of the input's formatting.
    pub(crate) fn render_into(&self, out: &mut String) {
        match self {
            Expr::Number(n) => {
                out.push_str(&n.to_string());
            }
            Expr::Ref(cell_ref) => cell_ref.render_into(out),
            Expr::UnaryOp { op, operand } => {
                out.push(op.symbol());
                self.render_child(operand, operand.precedence() < PREC_UNARY, out);
            }
            Expr::BinaryOp { op, left, right } => {
                let prec = self.precedence();
                self.render_child(left, left.precedence() < prec, out);
                out.push(op.symbol());
                // Subtraction and division are left-associative: an
                // equal-precedence right operand must keep its parentheses
                // (a-(b+c) is not a-b+c).
                let right_parens = right.precedence() < prec
                    || (right.precedence() == prec
                        && matches!(op, BinaryOperator::Subtract | BinaryOperator::Divide));
                self.render_child(right, right_parens, out);
            }
        }
    }

    fn render_child(&self, child: &Expr, parens: bool, out: &mut String) {
        if parens {
            out.push('(');
        }
        child.render_into(out);
        if parens {
            out.push(')');
        }
    }

    /// Collect every cell reference in the tree, in syntactic order
    pub(crate) fn collect_refs(&self, refs: &mut Vec<CellRef>) {
        match self {
            Expr::Number(_) => {}
            Expr::Ref(cell_ref) => refs.push(*cell_ref),
            Expr::UnaryOp { operand, .. } => operand.collect_refs(refs),
            Expr::BinaryOp { left, right, .. } => {
                left.collect_refs(refs);
                right.collect_refs(refs);
            }
        }
    }
}

/// Column letters for a wide column index (rendering only; unlike
/// `Position`, references may name columns beyond the sheet extent)
fn column_letters(col: u32) -> String {
    let mut result = String::new();
    let mut n = col as u64 + 1;

    while n > 0 {
        n -= 1;
        let c = ((n % 26) as u8 + b'A') as char;
        result.insert(0, c);
        n /= 26;
    }

    result
}
