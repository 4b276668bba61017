//! Async driver for the time-series engine under test.
//!
//! The harness talks to the engine through this crate. One statement in,
//! one reply out, over a single TCP session.
//!
//! # Example
//!
//! ```no_run
//! use client::Client;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut client = Client::connect("localhost:6030").await?;
//!
//!     client.execute("create database if not exists db").await?;
//!     client.execute("use db").await?;
//!
//!     let reply = client.execute("select now() from ntb").await?;
//!     if let Some((columns, rows)) = reply.rows() {
//!         println!("Columns: {:?}", columns);
//!         println!("Rows: {}", rows.len());
//!     }
//!
//!     client.close().await?;
//!     Ok(())
//! }
//! ```

mod error;

pub use error::{ClientError, Result};

use common::Row;
use protocol::{ClientRequest, ServerResponse, frame};
use tokio::net::TcpStream;

/// Session with the engine under test.
pub struct Client {
    socket: TcpStream,
}

/// Reply to a single executed statement.
#[derive(Debug, Clone)]
pub enum QueryReply {
    /// The statement was a query and produced rows
    Rows { columns: Vec<String>, rows: Vec<Row> },
    /// The statement succeeded without producing rows
    Ack { affected: u64 },
}

impl QueryReply {
    /// Returns the number of affected rows, or 0 for row-producing replies.
    pub fn affected_count(&self) -> u64 {
        match self {
            QueryReply::Ack { affected } => *affected,
            _ => 0,
        }
    }

    /// Returns the columns and rows if this reply carries them, None otherwise.
    pub fn rows(&self) -> Option<(&Vec<String>, &Vec<Row>)> {
        match self {
            QueryReply::Rows { columns, rows } => Some((columns, rows)),
            _ => None,
        }
    }
}

impl Client {
    /// Connect to the engine at the given address.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use client::Client;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = Client::connect("localhost:6030").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(addr: &str) -> Result<Self> {
        let socket = TcpStream::connect(addr)
            .await
            .map_err(ClientError::Connection)?;

        Ok(Self { socket })
    }

    /// Execute one SQL statement and return the engine's reply.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use client::Client;
    /// # async fn example() -> anyhow::Result<()> {
    /// # let mut client = Client::connect("localhost:6030").await?;
    /// let reply = client.execute("select now() from ntb").await?;
    /// if let Some((_, rows)) = reply.rows() {
    ///     println!("Got {} rows", rows.len());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn execute(&mut self, sql: &str) -> Result<QueryReply> {
        let request = ClientRequest::Execute {
            sql: sql.to_string(),
        };
        frame::write_message_async(&mut self.socket, &request)
            .await
            .map_err(ClientError::Protocol)?;

        let response: ServerResponse = frame::read_message_async(&mut self.socket)
            .await
            .map_err(ClientError::Protocol)?;

        match response {
            ServerResponse::Rows { columns, rows } => Ok(QueryReply::Rows { columns, rows }),
            ServerResponse::Ack { affected } => Ok(QueryReply::Ack { affected }),
            ServerResponse::Error { code, message } => Err(ClientError::Engine { code, message }),
        }
    }

    /// Close the session gracefully.
    pub async fn close(&mut self) -> Result<()> {
        let request = ClientRequest::Close;
        frame::write_message_async(&mut self.socket, &request)
            .await
            .map_err(ClientError::Protocol)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::Value;

    #[test]
    fn test_query_reply_affected_count() {
        let ack = QueryReply::Ack { affected: 2 };
        assert_eq!(ack.affected_count(), 2);

        let rows = QueryReply::Rows {
            columns: vec![],
            rows: vec![],
        };
        assert_eq!(rows.affected_count(), 0);
    }

    #[test]
    fn test_query_reply_rows() {
        let reply = QueryReply::Rows {
            columns: vec!["ts".to_string(), "c1".to_string()],
            rows: vec![
                Row::new(vec![Value::Timestamp(0), Value::Int(10)]),
                Row::new(vec![Value::Timestamp(1), Value::Int(3)]),
            ],
        };
        let (columns, rows) = reply.rows().expect("expected rows");
        assert_eq!(columns.len(), 2);
        assert_eq!(rows[1].values[1], Value::Int(3));

        let ack = QueryReply::Ack { affected: 1 };
        assert!(ack.rows().is_none());
    }
}
