//! Property-based test generators using proptest.
//!
//! Strategies for random values, rows, and result sets, used to pin the
//! checker's invariants over arbitrary result shapes. Float strategies stay
//! in finite ranges; the value domain's equality is what the checker
//! relies on, and NaN would break reflexivity without telling us anything
//! about the harness.

use common::{ResultSet, Row};
use proptest::prelude::*;
use types::Value;

/// Strategy for generating random `Value` instances across all domains.
pub fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Int),
        (-1.0e6f32..1.0e6f32).prop_map(Value::Float),
        (-1.0e9f64..1.0e9f64).prop_map(Value::Double),
        (0i64..4_102_444_800_000_000i64).prop_map(Value::Timestamp),
        Just(Value::Null),
    ]
}

/// Strategy for rows with 1-5 random cells.
pub fn arb_row() -> impl Strategy<Value = Row> {
    prop::collection::vec(arb_value(), 1..6).prop_map(Row::new)
}

/// Strategy for rows with exactly `len` cells.
pub fn arb_row_with_len(len: usize) -> impl Strategy<Value = Row> {
    prop::collection::vec(arb_value(), len).prop_map(Row::new)
}

/// Strategy for result sets with consistent row width and 0-7 rows.
pub fn arb_result_set() -> impl Strategy<Value = ResultSet> {
    (1usize..6).prop_flat_map(|width| {
        prop::collection::vec(arb_row_with_len(width), 0..8).prop_map(move |rows| {
            let columns = (0..width).map(|i| format!("c{}", i)).collect();
            ResultSet::new(columns, rows)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{check, Expectation};
    use common::CheckFailure;

    // Fewer cases than the default; these run on every test invocation.
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_value_equality_is_reflexive(value in arb_value()) {
            assert_eq!(value, value);
        }

        #[test]
        fn prop_row_clone_preserves_cells(row in arb_row()) {
            let cloned = row.clone();
            assert_eq!(row.values, cloned.values);
        }

        #[test]
        fn prop_row_count_check_accepts_exact_length(rs in arb_result_set()) {
            assert!(check(&rs, &Expectation::rows(rs.row_count())).is_ok());
        }

        #[test]
        fn prop_row_count_check_rejects_off_by_one(rs in arb_result_set()) {
            let expected = rs.row_count() + 1;
            let failure = check(&rs, &Expectation::rows(expected)).unwrap_err();
            assert_eq!(
                failure,
                CheckFailure::RowCount { expected, actual: rs.row_count() }
            );
        }

        #[test]
        fn prop_cell_check_matches_stored_values(rs in arb_result_set()) {
            for (row, cells) in rs.rows.iter().enumerate() {
                for (col, value) in cells.values.iter().enumerate() {
                    let expectation = Expectation::cell(row, col, value.clone());
                    assert!(check(&rs, &expectation).is_ok());
                }
            }
        }

        #[test]
        fn prop_row_index_past_end_is_out_of_bounds(rs in arb_result_set()) {
            let expectation = Expectation::cell(rs.row_count(), 0, Value::Int(0));
            let failure = check(&rs, &expectation).unwrap_err();
            assert!(matches!(failure, CheckFailure::OutOfBounds { .. }));
        }
    }
}
