//! Database session capability.
//!
//! The harness never touches a concrete driver type. Everything it needs
//! from a database is captured by [`Session`]: run a statement, run a query,
//! close. [`TcpSessionFactory`] provides the real implementation over the
//! wire protocol; `testing` provides scripted ones.

use async_trait::async_trait;
use client::{Client, ClientError, QueryReply};
use common::{Config, HarnessError, HarnessResult, ResultSet};

/// One live database session.
///
/// `execute` is for DDL/DML and returns the engine's affected-row count.
/// `query` is for reads and materializes the full result set before
/// returning. Both attribute engine rejections to the offending statement.
#[async_trait]
pub trait Session: Send {
    async fn execute(&mut self, sql: &str) -> HarnessResult<u64>;

    async fn query(&mut self, sql: &str) -> HarnessResult<ResultSet>;

    async fn close(&mut self) -> HarnessResult<()>;
}

/// Owned, driver-erased session handle.
pub type BoxedSession = Box<dyn Session>;

/// Produces sessions on demand; one per test-case lifetime.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self, config: &Config) -> HarnessResult<BoxedSession>;
}

fn statement_error(sql: &str, err: ClientError) -> HarnessError {
    match err {
        ClientError::Engine { code, message } => HarnessError::Execution {
            statement: sql.to_string(),
            message: format!("{} ({})", message, code),
        },
        other => HarnessError::Connection(other.to_string()),
    }
}

#[async_trait]
impl Session for Client {
    async fn execute(&mut self, sql: &str) -> HarnessResult<u64> {
        let reply = Client::execute(self, sql)
            .await
            .map_err(|e| statement_error(sql, e))?;
        Ok(reply.affected_count())
    }

    async fn query(&mut self, sql: &str) -> HarnessResult<ResultSet> {
        let reply = Client::execute(self, sql)
            .await
            .map_err(|e| statement_error(sql, e))?;
        match reply {
            QueryReply::Rows { columns, rows } => Ok(ResultSet::new(columns, rows)),
            QueryReply::Ack { .. } => Err(HarnessError::Execution {
                statement: sql.to_string(),
                message: "statement did not produce a result set".to_string(),
            }),
        }
    }

    async fn close(&mut self) -> HarnessResult<()> {
        Client::close(self)
            .await
            .map_err(|e| HarnessError::Connection(e.to_string()))
    }
}

/// Opens TCP sessions against the engine named in [`Config`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpSessionFactory;

impl TcpSessionFactory {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SessionFactory for TcpSessionFactory {
    async fn open(&self, config: &Config) -> HarnessResult<BoxedSession> {
        let client = Client::connect(&config.addr)
            .await
            .map_err(|e| HarnessError::Connection(e.to_string()))?;
        Ok(Box::new(client))
    }
}
