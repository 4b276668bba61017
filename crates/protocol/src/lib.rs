//! Wire protocol between the harness and the engine under test.
//!
//! Requests and responses travel as length-prefixed bincode frames. The
//! frame layer comes in sync and async flavors so the stub engine used in
//! tests and the tokio-based client share one format.

use common::Row;
use serde::{Deserialize, Serialize};

/// Request message sent from the harness to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClientRequest {
    /// Run a SQL statement. The engine decides whether it yields rows.
    Execute { sql: String },
    /// Close the session gracefully.
    Close,
}

/// Response message sent from the engine to the harness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ServerResponse {
    /// A query produced a result set.
    Rows { columns: Vec<String>, rows: Vec<Row> },
    /// A DDL or DML statement succeeded without producing rows.
    Ack { affected: u64 },
    /// The engine rejected the statement.
    Error { code: ErrorCode, message: String },
}

/// Coarse classification of engine-side failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// The statement did not parse.
    Syntax,
    /// The statement parsed but is not meaningful (bad interval unit,
    /// mismatched types, and so on).
    Semantic,
    /// A referenced database or table does not exist.
    MissingObject,
    /// The engine failed internally while executing.
    Internal,
    /// Anything the engine could not classify.
    Unknown,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorCode::Syntax => "syntax",
            ErrorCode::Semantic => "semantic",
            ErrorCode::MissingObject => "missing object",
            ErrorCode::Internal => "internal",
            ErrorCode::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Frame format: [u32 length (little-endian)][bincode payload]
pub mod frame {
    use super::*;
    use bincode::config;
    use std::io::{self, Read, Write};
    use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

    const MAX_FRAME_SIZE: u32 = 64 * 1024 * 1024; // 64 MB

    fn encode<T: Serialize>(message: &T) -> io::Result<Vec<u8>> {
        let encoded = bincode::serde::encode_to_vec(message, config::standard())
            .map_err(|e| io::Error::other(format!("bincode encoding failed: {}", e)))?;
        if encoded.len() as u32 > MAX_FRAME_SIZE {
            return Err(io::Error::other(format!(
                "message too large: {} bytes (max {})",
                encoded.len(),
                MAX_FRAME_SIZE
            )));
        }
        Ok(encoded)
    }

    fn decode<T: for<'de> Deserialize<'de>>(payload: &[u8]) -> io::Result<T> {
        let (message, _) = bincode::serde::decode_from_slice(payload, config::standard())
            .map_err(|e| io::Error::other(format!("bincode decoding failed: {}", e)))?;
        Ok(message)
    }

    fn check_len(len: u32) -> io::Result<()> {
        if len > MAX_FRAME_SIZE {
            return Err(io::Error::other(format!(
                "message too large: {} bytes (max {})",
                len, MAX_FRAME_SIZE
            )));
        }
        Ok(())
    }

    /// Write a framed message to a blocking writer.
    pub fn write_message<W, T>(writer: &mut W, message: &T) -> io::Result<()>
    where
        W: Write,
        T: Serialize,
    {
        let encoded = encode(message)?;
        writer.write_all(&(encoded.len() as u32).to_le_bytes())?;
        writer.write_all(&encoded)?;
        Ok(())
    }

    /// Read a framed message from a blocking reader.
    pub fn read_message<R, T>(reader: &mut R) -> io::Result<T>
    where
        R: Read,
        T: for<'de> Deserialize<'de>,
    {
        let mut len_buf = [0u8; 4];
        reader.read_exact(&mut len_buf)?;
        let len = u32::from_le_bytes(len_buf);
        check_len(len)?;

        let mut payload = vec![0u8; len as usize];
        reader.read_exact(&mut payload)?;
        decode(&payload)
    }

    /// Write a framed message to an async writer.
    pub async fn write_message_async<W, T>(writer: &mut W, message: &T) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
        T: Serialize,
    {
        let encoded = encode(message)?;
        writer.write_all(&(encoded.len() as u32).to_le_bytes()).await?;
        writer.write_all(&encoded).await?;
        writer.flush().await?;
        Ok(())
    }

    /// Read a framed message from an async reader.
    pub async fn read_message_async<R, T>(reader: &mut R) -> io::Result<T>
    where
        R: AsyncRead + Unpin,
        T: for<'de> Deserialize<'de>,
    {
        let mut len_buf = [0u8; 4];
        reader.read_exact(&mut len_buf).await?;
        let len = u32::from_le_bytes(len_buf);
        check_len(len)?;

        let mut payload = vec![0u8; len as usize];
        reader.read_exact(&mut payload).await?;
        decode(&payload)
    }
}
