//! Tests for schema module

use super::*;
use test_case::test_case;

fn headers(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| (*c).to_string()).collect()
}

// ============================================================================
// Establishment Tests
// ============================================================================

#[test]
fn test_from_headers_basic() {
    let schema = Schema::from_headers(&headers(&["Fund Name", "NAV", "Return 1Y"])).unwrap();
    assert_eq!(schema.columns(), &["Fund Name", "NAV", "Return 1Y"]);
    assert_eq!(schema.len(), 3);
    assert!(!schema.is_empty());
}

#[test]
fn test_from_headers_trims_cells() {
    let schema = Schema::from_headers(&headers(&["  Fund Name ", "\tNAV\n"])).unwrap();
    assert_eq!(schema.columns(), &["Fund Name", "NAV"]);
}

#[test]
fn test_from_headers_drops_trailing_empties() {
    let schema = Schema::from_headers(&headers(&["Name", "NAV", "", "  ", ""])).unwrap();
    assert_eq!(schema.columns(), &["Name", "NAV"]);
}

#[test]
fn test_from_headers_renames_interior_empties() {
    let schema = Schema::from_headers(&headers(&["Name", "", "NAV", ""])).unwrap();
    assert_eq!(schema.columns(), &["Name", "_empty_0", "NAV"]);

    let schema = Schema::from_headers(&headers(&["", "", "NAV"])).unwrap();
    assert_eq!(schema.columns(), &["_empty_0", "_empty_1", "NAV"]);
}

#[test_case(&[]; "no cells")]
#[test_case(&["", "", ""]; "all empty")]
#[test_case(&["  ", "\t"]; "all whitespace")]
fn test_from_headers_empty_is_fatal(cells: &[&str]) {
    let err = Schema::from_headers(&headers(cells)).unwrap_err();
    assert_eq!(err.kind(), "schema_establishment");
    assert!(!err.is_transient());
}

// ============================================================================
// Lookup Tests
// ============================================================================

#[test]
fn test_index_of() {
    let schema = Schema::from_headers(&headers(&["Name", "NAV", "AUM"])).unwrap();
    assert_eq!(schema.index_of("Name"), Some(0));
    assert_eq!(schema.index_of("AUM"), Some(2));
    assert_eq!(schema.index_of("Missing"), None);
}

#[test]
fn test_contains() {
    let schema = Schema::from_headers(&headers(&["Name", "NAV"])).unwrap();
    assert!(schema.contains("NAV"));
    assert!(!schema.contains("nav"));
}
