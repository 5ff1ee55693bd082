//! The sheet: cell registry and sole mutation entry point
//!
//! All edits flow through [`Sheet::set_cell_at`] / [`Sheet::clear_cell_at`],
//! which keep three invariants: every cell's `references` and `dependents`
//! sets are consistent duals, the reference graph is acyclic, and no formula
//! cache survives an edit to anything it transitively reads. Reads are lazy:
//! an edit only clears caches, and the next value read re-evaluates exactly
//! the stale subgraph.

use ahash::{AHashMap, AHashSet};
use std::io::{self, Write};

use tally_sheets_core::{Error, Position, Result, Size, Value};
use tally_sheets_formula::CellValueLookup;

use crate::cell::{Cell, CellContent};
use crate::graph;

/// An in-process spreadsheet with dependency-tracked, memoized formulas
///
/// The sheet exclusively owns every cell; cells name each other only by
/// [`Position`], resolved through the registry. A cell comes into existence
/// when its position is first set explicitly, or implicitly (as an empty
/// placeholder) when another cell's formula references it. Cell records are
/// never deleted — clearing resets content to empty but keeps the record, so
/// edges held by other cells stay valid.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    cells: AHashMap<Position, Cell>,
    /// Positions with explicitly-set content; placeholders are absent
    occupied: AHashSet<Position>,
    /// Minimal rectangle covering `occupied`
    size: Size,
}

impl Sheet {
    /// Create an empty sheet
    pub fn new() -> Self {
        Self::default()
    }

    // === Mutation ===

    /// Set a cell's content by address string (e.g. `"B2"`)
    pub fn set_cell(&mut self, address: &str, text: &str) -> Result<()> {
        self.set_cell_at(Position::parse(address)?, text)
    }

    /// Set a cell's content
    ///
    /// The whole edit is atomic: on any error the target cell's content,
    /// value, text, and edges are exactly as before. Placeholder cells
    /// created for a rejected formula's references may remain as harmless
    /// empties — they are invisible through [`Sheet::cell_at`].
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPosition`] for positions outside the sheet extent,
    /// [`Error::FormulaSyntax`] when formula text does not parse, and
    /// [`Error::CircularDependency`] when committing the formula would
    /// create a reference cycle.
    pub fn set_cell_at(&mut self, pos: Position, text: &str) -> Result<()> {
        self.validate(pos)?;

        let content = CellContent::parse(text)?;
        let new_refs: AHashSet<Position> = content.referenced_cells().into_iter().collect();

        if content.is_formula() {
            // Materialize referenced positions first so the cycle walk and
            // the edge rewiring always operate on existing cells.
            for &r in &new_refs {
                self.cells.entry(r).or_default();
            }
            if graph::would_create_cycle(&self.cells, pos, &new_refs) {
                log::debug!("rejecting edit of {pos}: formula would close a reference cycle");
                return Err(Error::CircularDependency(pos));
            }
        }

        self.commit(pos, content, new_refs);

        self.occupied.insert(pos);
        if self.size.rows <= pos.row {
            self.size.rows = pos.row + 1;
        }
        if self.size.cols <= pos.col {
            self.size.cols = pos.col + 1;
        }

        Ok(())
    }

    /// Clear a cell by address string
    pub fn clear_cell(&mut self, address: &str) -> Result<()> {
        self.clear_cell_at(Position::parse(address)?)
    }

    /// Reset a cell to empty
    ///
    /// Runs the normal commit path (edge rewiring and cache invalidation
    /// included), then shrinks the printable extent. A no-op on absent or
    /// already-empty positions.
    pub fn clear_cell_at(&mut self, pos: Position) -> Result<()> {
        self.validate(pos)?;

        if self.cells.contains_key(&pos) {
            self.commit(pos, CellContent::Empty, AHashSet::new());
        }
        self.occupied.remove(&pos);
        self.recompute_size();

        Ok(())
    }

    /// Commit new content for a cell: rewire edges, then invalidate
    ///
    /// Cycle-freedom of the result is the caller's responsibility; this is
    /// the only place edges change, so the reference/dependent duality holds
    /// before and after.
    fn commit(&mut self, pos: Position, content: CellContent, new_refs: AHashSet<Position>) {
        // Unhook this cell from its old references' dependent sets.
        let old_refs = self
            .cells
            .get(&pos)
            .map(|c| c.references().clone())
            .unwrap_or_default();
        for q in &old_refs {
            if let Some(cell) = self.cells.get_mut(q) {
                cell.remove_dependent(pos);
            }
        }

        // Install the content and the new outgoing edges. Fresh formula
        // content starts with an empty cache, so the cell's own memo is
        // dropped unconditionally.
        for &q in &new_refs {
            self.cells.entry(q).or_default().add_dependent(pos);
        }
        let cell = self.cells.entry(pos).or_default();
        cell.set_content(content);
        cell.set_references(new_refs);

        // Invalidate every transitive dependent. Lazy by design: caches are
        // cleared here, re-evaluation happens on the next read.
        let dirty = graph::dirty_dependents(&self.cells, pos);
        if !dirty.is_empty() {
            log::debug!("edit of {pos} invalidated {} dependent cache(s)", dirty.len());
        }
        for q in &dirty {
            if let Some(cell) = self.cells.get(q) {
                cell.clear_cache();
            }
        }
    }

    // === Reads ===

    /// Get a read handle to the cell at an address string
    pub fn cell(&self, address: &str) -> Result<Option<&Cell>> {
        self.cell_at(Position::parse(address)?)
    }

    /// Get a read handle to a cell
    ///
    /// Only explicitly-set cells are visible; a cell kept alive merely as a
    /// formula's placeholder referent yields `None` until it is set.
    pub fn cell_at(&self, pos: Position) -> Result<Option<&Cell>> {
        self.validate(pos)?;
        if self.occupied.contains(&pos) {
            Ok(self.cells.get(&pos))
        } else {
            Ok(None)
        }
    }

    /// The current value of the cell at an address string
    pub fn value(&self, address: &str) -> Result<Value> {
        self.value_at(Position::parse(address)?)
    }

    /// The current value of a cell
    ///
    /// Empty and absent cells read back as empty text; literal text has a
    /// leading escape marker stripped; formulas return the memoized result,
    /// evaluating (and caching) on demand. The result is always consistent
    /// with the current content of every transitively-referenced cell.
    pub fn value_at(&self, pos: Position) -> Result<Value> {
        self.validate(pos)?;
        Ok(self.read_value(pos))
    }

    /// The text form of the cell at an address string
    pub fn text(&self, address: &str) -> Result<String> {
        self.text_at(Position::parse(address)?)
    }

    /// The text form of a cell (empty string for absent cells)
    pub fn text_at(&self, pos: Position) -> Result<String> {
        self.validate(pos)?;
        Ok(self
            .cells
            .get(&pos)
            .map(|c| c.text())
            .unwrap_or_default())
    }

    /// The printable extent: the minimal rectangle covering every
    /// explicitly-set cell, or 0x0 for an empty sheet
    pub fn printable_size(&self) -> Size {
        self.size
    }

    // === Printing ===

    /// Write the value grid, tab-separated, one line per row
    pub fn print_values<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.print_grid(out, |sheet, pos| sheet.read_value(pos).to_string())
    }

    /// Write the text grid, tab-separated, one line per row
    pub fn print_texts<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.print_grid(out, |sheet, pos| {
            sheet.cells.get(&pos).map(|c| c.text()).unwrap_or_default()
        })
    }

    fn print_grid<W: Write>(
        &self,
        out: &mut W,
        render: impl Fn(&Sheet, Position) -> String,
    ) -> io::Result<()> {
        for row in 0..self.size.rows {
            for col in 0..self.size.cols {
                if col > 0 {
                    write!(out, "\t")?;
                }
                write!(out, "{}", render(self, Position::new(row, col)))?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    // === Internals ===

    fn validate(&self, pos: Position) -> Result<()> {
        if pos.is_valid() {
            Ok(())
        } else {
            Err(Error::InvalidPosition {
                row: pos.row,
                col: pos.col,
            })
        }
    }

    fn recompute_size(&mut self) {
        let mut size = Size::default();
        for pos in &self.occupied {
            if size.rows <= pos.row {
                size.rows = pos.row + 1;
            }
            if size.cols <= pos.col {
                size.cols = pos.col + 1;
            }
        }
        self.size = size;
    }

    fn read_value(&self, pos: Position) -> Value {
        match self.cells.get(&pos) {
            None => Value::empty(),
            Some(cell) => match cell.local_value() {
                Some(v) => v,
                None => self.evaluate_formula(pos),
            },
        }
    }

    /// Settle the stale subgraph under `pos` bottom-up, then read its memo
    ///
    /// Iterative post-order over uncached formula cells reachable through
    /// `references` edges — an explicit stack, so arbitrarily deep chains
    /// cannot overflow, and a scheduled set visits shared subgraphs once.
    /// Cells with a live cache stop the descent: invalidation clears every
    /// transitive dependent on edit, so a live cache is current. Because the
    /// graph is acyclic, each cell is evaluated only after everything it
    /// reads has settled.
    fn evaluate_formula(&self, pos: Position) -> Value {
        enum Frame {
            Enter(Position),
            Exit(Position),
        }

        let mut stack = vec![Frame::Enter(pos)];
        let mut scheduled: AHashSet<Position> = AHashSet::new();

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(p) => {
                    if !scheduled.insert(p) {
                        continue;
                    }
                    if let Some(cell) = self.cells.get(&p) {
                        if cell.is_formula() && cell.cached_value().is_none() {
                            stack.push(Frame::Exit(p));
                            for &r in cell.references() {
                                stack.push(Frame::Enter(r));
                            }
                        }
                    }
                }
                Frame::Exit(p) => {
                    if let Some(cell) = self.cells.get(&p) {
                        if let Some(formula) = cell.formula() {
                            let value = formula.evaluate(&Settled { sheet: self });
                            cell.fill_cache(value);
                        }
                    }
                }
            }
        }

        self.cells
            .get(&pos)
            .and_then(|c| c.cached_value())
            .unwrap_or_else(Value::empty)
    }
}

/// Lookup over a sheet whose stale precedents have already been settled
struct Settled<'a> {
    sheet: &'a Sheet,
}

impl CellValueLookup for Settled<'_> {
    fn cell_value(&self, pos: Position) -> Value {
        match self.sheet.cells.get(&pos) {
            None => Value::empty(),
            Some(cell) => match cell.local_value() {
                Some(v) => v,
                // Filled by the driver's post-order before anything reads it
                None => cell.cached_value().unwrap_or_else(Value::empty),
            },
        }
    }
}

/// The sheet's own read interface doubles as the evaluator's value source
impl CellValueLookup for Sheet {
    fn cell_value(&self, pos: Position) -> Value {
        self.read_value(pos)
    }
}
