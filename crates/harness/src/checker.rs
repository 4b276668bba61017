//! Result expectations and the checks that enforce them.
//!
//! An [`Expectation`] is pure data: either a row count or one (row, column,
//! value) cell. [`check`] compares an expectation against a materialized
//! result set and reports the first divergence as a [`CheckFailure`]. Value
//! equality is domain-aware: `Int(3)` never equals `Double(3.0)`, floats
//! compare without tolerance (the fixtures use literals that round-trip
//! exactly), and timestamps compare as exact instants.

use common::{CheckFailure, ResultSet};
use serde::{Deserialize, Serialize};
use types::Value;

/// One assertion attached to a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expectation {
    /// The result set holds exactly this many rows. Zero is meaningful.
    RowCount(usize),
    /// The cell at (row, col), zero-based in scan order, holds this value.
    Cell { row: usize, col: usize, value: Value },
}

impl Expectation {
    pub fn rows(expected: usize) -> Self {
        Expectation::RowCount(expected)
    }

    pub fn cell(row: usize, col: usize, value: Value) -> Self {
        Expectation::Cell { row, col, value }
    }
}

/// Compare one expectation against a result set.
pub fn check(result: &ResultSet, expectation: &Expectation) -> Result<(), CheckFailure> {
    match expectation {
        Expectation::RowCount(expected) => {
            let actual = result.row_count();
            if actual != *expected {
                return Err(CheckFailure::RowCount {
                    expected: *expected,
                    actual,
                });
            }
            Ok(())
        }
        Expectation::Cell { row, col, value } => match result.cell(*row, *col) {
            Some(actual) if actual == value => Ok(()),
            Some(actual) => Err(CheckFailure::Cell {
                row: *row,
                col: *col,
                expected: value.clone(),
                actual: actual.clone(),
            }),
            None => Err(CheckFailure::OutOfBounds {
                row: *row,
                col: *col,
                rows: result.row_count(),
                cols: result.width(),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Row;
    use pretty_assertions::assert_eq;

    fn fixture() -> ResultSet {
        ResultSet::new(
            vec!["ts".into(), "c1".into()],
            vec![
                Row::new(vec![Value::Timestamp(0), Value::Int(10)]),
                Row::new(vec![Value::Timestamp(1), Value::Int(3)]),
                Row::new(vec![Value::Timestamp(2), Value::Int(1)]),
            ],
        )
    }

    #[test]
    fn test_row_count_match() {
        assert_eq!(check(&fixture(), &Expectation::rows(3)), Ok(()));
        assert_eq!(check(&ResultSet::empty(), &Expectation::rows(0)), Ok(()));
    }

    #[test]
    fn test_row_count_mismatch_carries_both_counts() {
        let failure = check(&fixture(), &Expectation::rows(2)).unwrap_err();
        assert_eq!(
            failure,
            CheckFailure::RowCount {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn test_cell_match_is_positional() {
        assert_eq!(
            check(&fixture(), &Expectation::cell(1, 1, Value::Int(3))),
            Ok(())
        );
        assert_eq!(
            check(&fixture(), &Expectation::cell(2, 1, Value::Int(1))),
            Ok(())
        );
    }

    #[test]
    fn test_cell_mismatch_reports_expected_and_actual() {
        let failure = check(&fixture(), &Expectation::cell(0, 1, Value::Int(3))).unwrap_err();
        assert_eq!(
            failure,
            CheckFailure::Cell {
                row: 0,
                col: 1,
                expected: Value::Int(3),
                actual: Value::Int(10),
            }
        );
    }

    #[test]
    fn test_equality_never_crosses_value_domains() {
        let result = ResultSet::new(
            vec!["c1".into()],
            vec![Row::new(vec![Value::Double(3.0)])],
        );
        let failure = check(&result, &Expectation::cell(0, 0, Value::Int(3))).unwrap_err();
        assert!(matches!(failure, CheckFailure::Cell { .. }));
    }

    #[test]
    fn test_float_equality_is_tolerance_free() {
        let result = ResultSet::new(
            vec!["c2".into()],
            vec![Row::new(vec![Value::Float(1.55)])],
        );
        assert_eq!(
            check(&result, &Expectation::cell(0, 0, Value::Float(1.55))),
            Ok(())
        );
        assert!(check(&result, &Expectation::cell(0, 0, Value::Float(1.56))).is_err());
    }

    #[test]
    fn test_out_of_bounds_reports_the_shape() {
        let failure = check(&fixture(), &Expectation::cell(5, 1, Value::Int(1))).unwrap_err();
        assert_eq!(
            failure,
            CheckFailure::OutOfBounds {
                row: 5,
                col: 1,
                rows: 3,
                cols: 2,
            }
        );
        let failure = check(&fixture(), &Expectation::cell(0, 9, Value::Int(1))).unwrap_err();
        assert!(matches!(failure, CheckFailure::OutOfBounds { col: 9, .. }));
    }
}
