
pub mod pretty;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use types::Value;

/// Positional row representation backed by `types::Value`.
/// Examples:
/// - `let row = Row::new(vec![Value::Int(1)]);`
/// - `let row = Row::new(vec![Value::Timestamp(0), Value::Int(10), Value::Null]);`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Row {
    pub values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Row::new(values)
    }
}

/// Fully materialized query result: column labels plus rows in scan order.
///
/// Row order is significant; positional assertions index into it with
/// zero-based (row, column) coordinates.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column count, falling back to the first row's width when the engine
    /// returned no labels.
    pub fn width(&self) -> usize {
        if self.columns.is_empty() {
            self.rows.first().map_or(0, |r| r.values.len())
        } else {
            self.columns.len()
        }
    }

    /// Positional cell access; `None` when either index is out of bounds.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.values.get(col))
    }
}

/// The specific way an observed result diverged from its expectation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckFailure {
    #[error("row count mismatch: expected {expected} got {actual}")]
    RowCount { expected: usize, actual: usize },
    #[error("cell ({row}, {col}) mismatch: expected {expected:?} got {actual:?}")]
    Cell {
        row: usize,
        col: usize,
        expected: Value,
        actual: Value,
    },
    #[error("cell ({row}, {col}) out of bounds for {rows} row(s) of {cols} column(s)")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error("no result set held: assertions require a preceding query")]
    NoResultSet,
}

/// Canonical error type shared across harness subsystems.
///
/// Every variant is fatal to the current test case; the harness never retries
/// or downgrades. The registry layer alone turns these into pass/fail
/// bookkeeping.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// The engine rejected a statement (syntax, semantics, missing object).
    #[error("execution failed for `{statement}`: {message}")]
    Execution { statement: String, message: String },
    /// An observed result diverged from the expected literal.
    #[error("assertion failed for `{statement}`: {failure}")]
    Assertion {
        statement: String,
        failure: CheckFailure,
    },
    /// Session establishment or teardown failed.
    #[error("connection: {0}")]
    Connection(String),
    /// A test case was driven through an illegal lifecycle transition.
    #[error("lifecycle: {0}")]
    Lifecycle(String),
}

impl HarnessError {
    pub fn is_execution(&self) -> bool {
        matches!(self, HarnessError::Execution { .. })
    }

    pub fn is_assertion(&self) -> bool {
        matches!(self, HarnessError::Assertion { .. })
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, HarnessError::Connection(_))
    }

    /// The statement that produced this error, when one is attached.
    pub fn statement(&self) -> Option<&str> {
        match self {
            HarnessError::Execution { statement, .. }
            | HarnessError::Assertion { statement, .. } => Some(statement),
            _ => None,
        }
    }
}

/// Result alias that carries a `HarnessError`.
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Runtime configuration for a conformance run.
///
/// # Example
/// ```
/// use common::Config;
///
/// let config = Config::builder()
///     .addr("127.0.0.1:6030".to_string())
///     .database("db".to_string())
///     .build();
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, bon::Builder)]
pub struct Config {
    /// Address of the engine under test.
    #[builder(default = String::from("127.0.0.1:6030"))]
    pub addr: String,
    /// Database (namespace) the conformance schema is created in.
    #[builder(default = String::from("db"))]
    pub database: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: String::from("127.0.0.1:6030"),
            database: String::from("db"),
        }
    }
}

/// Convenient re-exports for downstream crates.
pub mod prelude {
    pub use crate::{CheckFailure, Config, HarnessError, HarnessResult, ResultSet, Row};
    pub use types::{SqlType, Value};
}
