//! Scripts: ordered statements with their expectations attached.
//!
//! A [`Script`] is the explicit form of a conformance run. Every query step
//! carries the assertions that must hold for its result, so the
//! query-then-assert interleaving is structural rather than a calling
//! convention. Scripts are plain data with serde derives; they can be
//! logged, serialized, and replayed unchanged.

use crate::checker::Expectation;
use serde::{Deserialize, Serialize};

/// One step of a script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScriptStep {
    /// DDL/DML statement; success is an acknowledgement.
    Execute { sql: String },
    /// Read query; every expectation is checked against its result, in
    /// order, before the next step runs.
    Query {
        sql: String,
        expect: Vec<Expectation>,
    },
}

impl ScriptStep {
    pub fn sql(&self) -> &str {
        match self {
            ScriptStep::Execute { sql } => sql,
            ScriptStep::Query { sql, .. } => sql,
        }
    }

    pub fn is_query(&self) -> bool {
        matches!(self, ScriptStep::Query { .. })
    }
}

/// Ordered list of steps, built fluently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    steps: Vec<ScriptStep>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a DDL/DML statement.
    pub fn execute(mut self, sql: impl Into<String>) -> Self {
        self.steps.push(ScriptStep::Execute { sql: sql.into() });
        self
    }

    /// Append a query with its expectations.
    pub fn query(mut self, sql: impl Into<String>, expect: Vec<Expectation>) -> Self {
        self.steps.push(ScriptStep::Query {
            sql: sql.into(),
            expect,
        });
        self
    }

    /// Append a query asserting only its row count, the dominant pattern in
    /// the conformance content.
    pub fn query_rows(self, sql: impl Into<String>, rows: usize) -> Self {
        self.query(sql, vec![Expectation::rows(rows)])
    }

    pub fn push(&mut self, step: ScriptStep) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScriptStep> {
        self.steps.iter()
    }
}

impl<'a> IntoIterator for &'a Script {
    type Item = &'a ScriptStep;
    type IntoIter = std::slice::Iter<'a, ScriptStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
