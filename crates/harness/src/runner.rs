//! Statement execution with a held last result.
//!
//! [`SqlRunner`] owns the session for one test case. Queries replace the
//! held result set; assertion calls (`check_rows`, `check_cell`, `verify`)
//! read it without re-issuing the query, so one statement can feed several
//! independent assertions. Every failure names the statement that produced
//! the offending result.

use crate::checker::{self, Expectation};
use crate::script::{Script, ScriptStep};
use crate::session::BoxedSession;
use common::{pretty, CheckFailure, HarnessError, HarnessResult, ResultSet};
use types::Value;

struct HeldResult {
    sql: String,
    result: ResultSet,
}

/// Executes statements sequentially and asserts on the most recent result.
pub struct SqlRunner {
    session: BoxedSession,
    last: Option<HeldResult>,
}

impl SqlRunner {
    pub fn new(session: BoxedSession) -> Self {
        Self {
            session,
            last: None,
        }
    }

    /// Send a DDL/DML statement. Leaves any held query result in place.
    pub async fn execute(&mut self, sql: &str) -> HarnessResult<u64> {
        log::debug!("execute: {}", sql);
        self.session.execute(sql).await
    }

    /// Send a read query, hold its fully materialized result, and return
    /// the row count.
    pub async fn query(&mut self, sql: &str) -> HarnessResult<usize> {
        log::debug!("query: {}", sql);
        let result = self.session.query(sql).await?;
        let rows = result.row_count();
        self.last = Some(HeldResult {
            sql: sql.to_string(),
            result,
        });
        Ok(rows)
    }

    /// Assert the held result's row count.
    pub fn check_rows(&self, expected: usize) -> HarnessResult<()> {
        self.verify(&Expectation::rows(expected))
    }

    /// Assert one cell of the held result, zero-based (row, column).
    pub fn check_cell(&self, row: usize, col: usize, value: Value) -> HarnessResult<()> {
        self.verify(&Expectation::cell(row, col, value))
    }

    /// Check one expectation against the held result.
    pub fn verify(&self, expectation: &Expectation) -> HarnessResult<()> {
        let held = self.last.as_ref().ok_or_else(|| HarnessError::Assertion {
            statement: "<no query>".to_string(),
            failure: CheckFailure::NoResultSet,
        })?;
        checker::check(&held.result, expectation).map_err(|failure| {
            log::debug!(
                "divergent result for `{}`:\n{}",
                held.sql,
                pretty::render_result_set(&held.result, pretty::TableStyleKind::Ascii)
            );
            HarnessError::Assertion {
                statement: held.sql.clone(),
                failure,
            }
        })
    }

    /// The most recent query result, if any.
    pub fn last_result(&self) -> Option<&ResultSet> {
        self.last.as_ref().map(|h| &h.result)
    }

    /// The statement that produced the held result.
    pub fn last_sql(&self) -> Option<&str> {
        self.last.as_ref().map(|h| h.sql.as_str())
    }

    /// Run a script step by step. Each query's expectations are verified
    /// before the next statement is dispatched; the first failure aborts.
    pub async fn run_script(&mut self, script: &Script) -> HarnessResult<()> {
        for step in script {
            match step {
                ScriptStep::Execute { sql } => {
                    self.execute(sql).await?;
                }
                ScriptStep::Query { sql, expect } => {
                    self.query(sql).await?;
                    for expectation in expect {
                        self.verify(expectation)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Close the underlying session.
    pub async fn close(&mut self) -> HarnessResult<()> {
        self.session.close().await
    }
}
