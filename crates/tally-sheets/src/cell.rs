//! Cell content and per-cell state
//!
//! A cell's stored form is exactly one of empty, literal text, or a parsed
//! formula. Formula content carries a lazily-filled result cache; the sheet
//! clears it whenever any transitively-referenced cell changes.

use ahash::AHashSet;
use std::cell::RefCell;
use tally_sheets_core::{Error, Position, Result, Value, ESCAPE_MARKER, FORMULA_MARKER};
use tally_sheets_formula::{parse_formula, Formula};

/// The stored content of a cell
#[derive(Debug, Clone)]
pub enum CellContent {
    /// Nothing stored; reads back as empty text
    Empty,
    /// Literal text, stored verbatim (escape marker included)
    Text(String),
    /// Parsed formula plus its memoized result
    ///
    /// The cache is filled on first read after any invalidation and cleared
    /// on any write that could affect it. `RefCell` because reads fill it
    /// through shared access; the engine is single-threaded by contract, and
    /// no borrow is held across a lookup into another cell.
    Formula {
        formula: Formula,
        cache: RefCell<Option<Value>>,
    },
}

impl CellContent {
    /// Build content from raw input text
    ///
    /// Rules, checked in order:
    /// 1. text starting with `=` and longer than one character parses as a
    ///    formula; a parse failure surfaces as [`Error::FormulaSyntax`] and
    ///    the caller's state stays untouched,
    /// 2. empty text is [`CellContent::Empty`],
    /// 3. anything else (including a lone `=`) is literal text.
    pub fn parse(text: &str) -> Result<Self> {
        if text.len() > 1 && text.starts_with(FORMULA_MARKER) {
            let formula = parse_formula(&text[1..])
                .map_err(|e| Error::FormulaSyntax(e.to_string()))?;
            Ok(CellContent::Formula {
                formula,
                cache: RefCell::new(None),
            })
        } else if text.is_empty() {
            Ok(CellContent::Empty)
        } else {
            Ok(CellContent::Text(text.to_string()))
        }
    }

    /// The positions this content reads, sorted row-major and de-duplicated
    pub fn referenced_cells(&self) -> Vec<Position> {
        match self {
            CellContent::Formula { formula, .. } => formula.referenced_cells(),
            _ => Vec::new(),
        }
    }

    pub fn is_formula(&self) -> bool {
        matches!(self, CellContent::Formula { .. })
    }
}

impl Default for CellContent {
    fn default() -> Self {
        CellContent::Empty
    }
}

/// A single cell in the sheet registry
///
/// Identity is the cell's [`Position`] key in the registry; cells relate to
/// each other only through position-keyed edge sets, never through direct
/// references to one another's memory. Invariant: `references` and
/// `dependents` are consistent duals across the registry, and the reference
/// graph is acyclic in every publicly observable state — both maintained by
/// the sheet's commit path.
#[derive(Debug, Clone, Default)]
pub struct Cell {
    content: CellContent,
    /// Cells this cell reads (outgoing edges; mirrors the content)
    references: AHashSet<Position>,
    /// Cells that read this cell (incoming edges; maintained incrementally)
    dependents: AHashSet<Position>,
}

impl Cell {
    /// Create an empty cell
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored content
    pub fn content(&self) -> &CellContent {
        &self.content
    }

    /// The text form of the content
    ///
    /// Empty cells give an empty string, text cells their raw stored string
    /// (escape marker included), formula cells the `=` marker plus the
    /// canonical rendering — independent of the original input's formatting.
    pub fn text(&self) -> String {
        match &self.content {
            CellContent::Empty => String::new(),
            CellContent::Text(raw) => raw.clone(),
            CellContent::Formula { formula, .. } => {
                format!("{}{}", FORMULA_MARKER, formula.render())
            }
        }
    }

    /// The positions this cell's content reads, sorted and de-duplicated
    pub fn referenced_cells(&self) -> Vec<Position> {
        self.content.referenced_cells()
    }

    /// Whether the content is a formula
    pub fn is_formula(&self) -> bool {
        self.content.is_formula()
    }

    /// Whether the content is empty
    pub fn is_empty(&self) -> bool {
        matches!(self.content, CellContent::Empty)
    }

    /// The value of non-formula content
    ///
    /// Empty reads back as empty text; literal text has a leading escape
    /// marker stripped (the text form keeps it). Formula cells have no local
    /// value — the sheet evaluates them against the whole registry.
    pub(crate) fn local_value(&self) -> Option<Value> {
        match &self.content {
            CellContent::Empty => Some(Value::empty()),
            CellContent::Text(raw) => {
                let stripped = raw.strip_prefix(ESCAPE_MARKER).unwrap_or(raw);
                Some(Value::Text(stripped.to_string()))
            }
            CellContent::Formula { .. } => None,
        }
    }

    /// The memoized formula result, if present and current
    pub(crate) fn cached_value(&self) -> Option<Value> {
        match &self.content {
            CellContent::Formula { cache, .. } => cache.borrow().clone(),
            _ => None,
        }
    }

    /// Fill the formula result cache
    pub(crate) fn fill_cache(&self, value: Value) {
        if let CellContent::Formula { cache, .. } = &self.content {
            *cache.borrow_mut() = Some(value);
        }
    }

    /// Drop the memoized result; the next read re-evaluates
    pub(crate) fn clear_cache(&self) {
        if let CellContent::Formula { cache, .. } = &self.content {
            *cache.borrow_mut() = None;
        }
    }

    /// The formula, if the content is one
    pub(crate) fn formula(&self) -> Option<&Formula> {
        match &self.content {
            CellContent::Formula { formula, .. } => Some(formula),
            _ => None,
        }
    }

    /// Replace the content; the caller rewires edges and invalidates caches
    pub(crate) fn set_content(&mut self, content: CellContent) {
        self.content = content;
    }

    pub(crate) fn references(&self) -> &AHashSet<Position> {
        &self.references
    }

    pub(crate) fn set_references(&mut self, references: AHashSet<Position>) {
        self.references = references;
    }

    pub(crate) fn dependents(&self) -> &AHashSet<Position> {
        &self.dependents
    }

    pub(crate) fn add_dependent(&mut self, pos: Position) {
        self.dependents.insert(pos);
    }

    pub(crate) fn remove_dependent(&mut self, pos: Position) {
        self.dependents.remove(&pos);
    }
}
