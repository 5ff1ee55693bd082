//! Tests for incremental evaluation with dependency tracking

use pretty_assertions::assert_eq;
use tally_sheets::{CellError, Error, Position, Sheet, Size, Value};

/// Scenario: literal plus a formula over it
#[test]
fn test_formula_over_literal() {
    let mut sheet = Sheet::new();
    sheet.set_cell("A1", "1").unwrap();
    sheet.set_cell("A2", "=A1+1").unwrap();

    assert_eq!(sheet.value("A2").unwrap(), Value::Number(2.0));
}

/// Scenario: editing a referenced cell recomputes the dependent
#[test]
fn test_edit_invalidates_dependent() {
    let mut sheet = Sheet::new();
    sheet.set_cell("A1", "5").unwrap();
    sheet.set_cell("B1", "=A1*2").unwrap();
    assert_eq!(sheet.value("B1").unwrap(), Value::Number(10.0));

    sheet.set_cell("A1", "10").unwrap();
    assert_eq!(sheet.value("B1").unwrap(), Value::Number(20.0));
}

/// Scenario: the second half of a mutual reference is rejected
#[test]
fn test_mutual_reference_rejected() {
    let mut sheet = Sheet::new();
    sheet.set_cell("A1", "=A2").unwrap();

    let err = sheet.set_cell("A2", "=A1").unwrap_err();
    assert!(matches!(err, Error::CircularDependency(_)));

    // A2 is unaffected by the failed edit
    assert!(sheet.cell("A2").unwrap().is_none());
    assert_eq!(sheet.text("A2").unwrap(), "");
}

/// Scenario: escape marker is stripped from the value, kept in the text
#[test]
fn test_escape_marker() {
    let mut sheet = Sheet::new();
    sheet.set_cell("A1", "'123").unwrap();

    assert_eq!(sheet.text("A1").unwrap(), "'123");
    assert_eq!(sheet.value("A1").unwrap(), Value::Text("123".into()));
}

/// Scenario: division by zero is a value, not a failure
#[test]
fn test_division_by_zero() {
    let mut sheet = Sheet::new();
    sheet.set_cell("A1", "=1/0").unwrap();

    assert_eq!(sheet.value("A1").unwrap(), Value::Error(CellError::Div0));
    assert_eq!(sheet.text("A1").unwrap(), "=1/0");
}

/// Scenario: clearing the only occupied cell empties the printable extent
#[test]
fn test_clear_shrinks_to_empty() {
    let mut sheet = Sheet::new();
    sheet.set_cell("A1", "x").unwrap();
    sheet.clear_cell("A1").unwrap();

    assert_eq!(sheet.printable_size(), Size::new(0, 0));
}

/// Property: referenced cells are sorted row-major and de-duplicated
#[test]
fn test_referenced_cells_sorted_and_deduped() {
    let mut sheet = Sheet::new();
    sheet.set_cell("D4", "=C3+A1+C3+$A$1+B2").unwrap();

    let cell = sheet.cell("D4").unwrap().expect("cell was just set");
    assert_eq!(
        cell.referenced_cells(),
        vec![
            Position::parse("A1").unwrap(),
            Position::parse("B2").unwrap(),
            Position::parse("C3").unwrap(),
        ]
    );
    assert_eq!(cell.text(), "=C3+A1+C3+$A$1+B2");
}

/// Property: a failing edit never changes the target's value, text, or edges
#[test]
fn test_failed_edits_are_atomic() {
    let mut sheet = Sheet::new();
    sheet.set_cell("A1", "2").unwrap();
    sheet.set_cell("B1", "=A1+1").unwrap();

    // Syntax failure
    assert!(sheet.set_cell("B1", "=1+*2").is_err());
    // Cycle failure (B1 -> B1 through a fresh chain)
    sheet.set_cell("C1", "=B1").unwrap();
    assert!(sheet.set_cell("B1", "=C1").is_err());

    let b1 = sheet.cell("B1").unwrap().expect("cell was set");
    assert_eq!(b1.text(), "=A1+1");
    assert_eq!(
        b1.referenced_cells(),
        vec![Position::parse("A1").unwrap()]
    );
    assert_eq!(sheet.value("B1").unwrap(), Value::Number(3.0));

    // The surviving graph still recalculates correctly
    sheet.set_cell("A1", "7").unwrap();
    assert_eq!(sheet.value("B1").unwrap(), Value::Number(8.0));
    assert_eq!(sheet.value("C1").unwrap(), Value::Number(8.0));
}

/// Property: a chain A1 -> B1 -> C1 never serves a stale memo
#[test]
fn test_cache_coherence_through_chain() {
    let mut sheet = Sheet::new();
    sheet.set_cell("A1", "1").unwrap();
    sheet.set_cell("B1", "=A1+1").unwrap();
    sheet.set_cell("C1", "=B1+1").unwrap();

    // Warm every cache
    assert_eq!(sheet.value("C1").unwrap(), Value::Number(3.0));

    // Edit the root; read only the far end
    sheet.set_cell("A1", "10").unwrap();
    assert_eq!(sheet.value("C1").unwrap(), Value::Number(12.0));
    assert_eq!(sheet.value("B1").unwrap(), Value::Number(11.0));
}

/// Property: diamonds recalculate consistently through both arms
#[test]
fn test_cache_coherence_through_diamond() {
    let mut sheet = Sheet::new();
    sheet.set_cell("A1", "1").unwrap();
    sheet.set_cell("B1", "=A1+1").unwrap();
    sheet.set_cell("C1", "=A1*10").unwrap();
    sheet.set_cell("D1", "=B1+C1").unwrap();

    assert_eq!(sheet.value("D1").unwrap(), Value::Number(12.0));

    sheet.set_cell("A1", "2").unwrap();
    assert_eq!(sheet.value("D1").unwrap(), Value::Number(23.0));
}

/// Property: long chains evaluate and invalidate without recursion limits
#[test]
fn test_deep_chain() {
    let mut sheet = Sheet::new();
    sheet.set_cell("A1", "1").unwrap();

    // A2 = A1+1, A3 = A2+1, ... A1000 = A999+1
    for row in 2..=1000u32 {
        sheet
            .set_cell(&format!("A{row}"), &format!("=A{}+1", row - 1))
            .unwrap();
    }
    assert_eq!(sheet.value("A1000").unwrap(), Value::Number(1000.0));

    // One edit at the root invalidates the whole chain
    sheet.set_cell("A1", "5").unwrap();
    assert_eq!(sheet.value("A1000").unwrap(), Value::Number(1004.0));
}

/// Property: a long cycle through many cells is still caught
#[test]
fn test_long_cycle_rejected() {
    let mut sheet = Sheet::new();
    for row in 1..100u32 {
        sheet
            .set_cell(&format!("A{}", row + 1), &format!("=A{row}"))
            .unwrap();
    }
    assert!(matches!(
        sheet.set_cell("A1", "=A100"),
        Err(Error::CircularDependency(_))
    ));

    // The sheet still works after the rejection
    sheet.set_cell("A1", "3").unwrap();
    assert_eq!(sheet.value("A100").unwrap(), Value::Number(3.0));
}

/// Formulas referencing text follow the coercion rules
#[test]
fn test_text_coercion_in_formulas() {
    let mut sheet = Sheet::new();
    sheet.set_cell("A1", "12").unwrap();
    sheet.set_cell("A2", "words").unwrap();
    sheet.set_cell("A3", "'7").unwrap();

    sheet.set_cell("B1", "=A1*2").unwrap();
    sheet.set_cell("B2", "=A2+1").unwrap();
    sheet.set_cell("B3", "=A3+1").unwrap(); // Escaped text evaluates as its value
    sheet.set_cell("B4", "=Z99+1").unwrap(); // Unset cell counts as zero

    assert_eq!(sheet.value("B1").unwrap(), Value::Number(24.0));
    assert_eq!(sheet.value("B2").unwrap(), Value::Error(CellError::Value));
    assert_eq!(sheet.value("B3").unwrap(), Value::Number(8.0));
    assert_eq!(sheet.value("B4").unwrap(), Value::Number(1.0));
}

/// Out-of-extent references parse but evaluate to #REF!
#[test]
fn test_out_of_extent_reference() {
    let mut sheet = Sheet::new();
    sheet.set_cell("A1", "=XFE1+1").unwrap();

    assert_eq!(sheet.value("A1").unwrap(), Value::Error(CellError::Ref));
    // Not a dependency: nothing to invalidate, nothing in the edge set
    let cell = sheet.cell("A1").unwrap().expect("cell was set");
    assert!(cell.referenced_cells().is_empty());
}

/// Formula text round-trips through the canonical rendering
#[test]
fn test_formula_text_is_canonical() {
    let mut sheet = Sheet::new();
    sheet.set_cell("A1", "= 1 + ((2 * 3))").unwrap();
    assert_eq!(sheet.text("A1").unwrap(), "=1+2*3");

    sheet.set_cell("A2", "=(1+2)*3").unwrap();
    assert_eq!(sheet.text("A2").unwrap(), "=(1+2)*3");
}

/// Replacing a formula with text drops its outgoing edges
#[test]
fn test_formula_to_text_transition() {
    let mut sheet = Sheet::new();
    sheet.set_cell("A1", "1").unwrap();
    sheet.set_cell("B1", "=A1").unwrap();
    assert_eq!(sheet.value("B1").unwrap(), Value::Number(1.0));

    sheet.set_cell("B1", "plain").unwrap();
    let b1 = sheet.cell("B1").unwrap().expect("cell was set");
    assert!(b1.referenced_cells().is_empty());
    assert_eq!(sheet.value("B1").unwrap(), Value::Text("plain".into()));

    // A former reference no longer becomes a cycle
    sheet.set_cell("A1", "=B1").unwrap();
    assert_eq!(sheet.value("A1").unwrap(), Value::Error(CellError::Value));
}

/// The printed grids reflect the current state
#[test]
fn test_print_grids() {
    let mut sheet = Sheet::new();
    sheet.set_cell("A1", "1").unwrap();
    sheet.set_cell("B1", "=A1+1").unwrap();
    sheet.set_cell("A2", "'text").unwrap();

    let mut out = Vec::new();
    sheet.print_values(&mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "1\t2\ntext\t\n");

    let mut out = Vec::new();
    sheet.print_texts(&mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "1\t=A1+1\n'text\t\n");
}
