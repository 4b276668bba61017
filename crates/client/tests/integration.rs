//! Integration tests for the driver.
//!
//! These tests run a canned engine in the background that answers a small
//! fixed set of statements, and connect to it with the client.

use anyhow::Result;
use client::Client;
use common::Row;
use protocol::{ClientRequest, ErrorCode, ServerResponse, frame};
use std::future::Future;
use tokio::net::{TcpListener, TcpStream};
use types::Value;

/// Helper to run a test against a canned engine.
async fn with_canned_engine<F, Fut>(f: F) -> Result<()>
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?.to_string();

    let server_task = tokio::spawn(run_engine(listener));

    let result = f(addr).await;

    server_task.abort();

    result
}

/// Accept loop for the canned engine.
async fn run_engine(listener: TcpListener) -> Result<()> {
    loop {
        let (socket, _addr) = listener.accept().await?;
        tokio::spawn(async move {
            let _ = handle_session(socket).await;
        });
    }
}

/// Handle a single session against the canned engine.
async fn handle_session(mut socket: TcpStream) -> Result<()> {
    loop {
        let request: ClientRequest = match frame::read_message_async(&mut socket).await {
            Ok(req) => req,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        };

        match request {
            ClientRequest::Execute { sql } => {
                let response = respond(&sql);
                frame::write_message_async(&mut socket, &response).await?;
            }
            ClientRequest::Close => break,
        }
    }
    Ok(())
}

/// The canned engine understands just enough SQL for these tests.
fn respond(sql: &str) -> ServerResponse {
    let sql = sql.trim();
    if sql.starts_with("create") || sql.starts_with("use") || sql.starts_with("drop") {
        return ServerResponse::Ack { affected: 0 };
    }
    if sql.starts_with("insert") {
        return ServerResponse::Ack { affected: 1 };
    }
    if sql == "select now() from ntb" {
        return ServerResponse::Rows {
            columns: vec!["now()".to_string()],
            rows: vec![
                Row::new(vec![Value::Timestamp(1_700_000_000_000_000)]),
                Row::new(vec![Value::Timestamp(1_700_000_000_000_000)]),
                Row::new(vec![Value::Timestamp(1_700_000_000_000_000)]),
            ],
        };
    }
    if sql == "select * from ntb where ts < now()" {
        return ServerResponse::Rows {
            columns: vec!["ts".to_string(), "c1".to_string()],
            rows: vec![
                Row::new(vec![Value::Timestamp(0), Value::Int(10)]),
                Row::new(vec![Value::Timestamp(1), Value::Int(3)]),
                Row::new(vec![Value::Timestamp(2), Value::Int(1)]),
            ],
        };
    }
    ServerResponse::Error {
        code: ErrorCode::MissingObject,
        message: format!("cannot resolve `{}`", sql),
    }
}

#[tokio::test]
async fn test_connect_and_close() {
    with_canned_engine(|addr| async move {
        let mut client = Client::connect(&addr).await?;
        client.close().await?;
        Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_ddl_acknowledged_without_rows() {
    with_canned_engine(|addr| async move {
        let mut client = Client::connect(&addr).await?;

        let reply = client
            .execute("create table ntb (ts timestamp, c1 int)")
            .await?;
        assert!(reply.rows().is_none());
        assert_eq!(reply.affected_count(), 0);

        client.close().await?;
        Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_insert_reports_affected_rows() {
    with_canned_engine(|addr| async move {
        let mut client = Client::connect(&addr).await?;

        let reply = client.execute("insert into ntb values (now, 1)").await?;
        assert_eq!(reply.affected_count(), 1);

        client.close().await?;
        Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_query_returns_rows_and_columns() {
    with_canned_engine(|addr| async move {
        let mut client = Client::connect(&addr).await?;

        let reply = client.execute("select * from ntb where ts < now()").await?;
        let (columns, rows) = reply.rows().expect("expected rows");
        assert_eq!(columns, &vec!["ts".to_string(), "c1".to_string()]);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].values[1], Value::Int(3));

        client.close().await?;
        Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_engine_error_surfaces_with_code() {
    with_canned_engine(|addr| async move {
        let mut client = Client::connect(&addr).await?;

        let result = client.execute("select c1 from nonexistent").await;
        assert!(result.is_err());

        let err = result.unwrap_err();
        assert!(err.is_engine_error());
        assert_eq!(err.error_code(), Some(ErrorCode::MissingObject));
        assert!(err.to_string().contains("nonexistent"));

        client.close().await?;
        Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_session_reuse_across_statements() {
    with_canned_engine(|addr| async move {
        let mut client = Client::connect(&addr).await?;

        client.execute("create database if not exists db").await?;
        client.execute("use db").await?;
        for _ in 0..5 {
            let reply = client.execute("insert into ntb values (now, 1)").await?;
            assert_eq!(reply.affected_count(), 1);
        }

        let reply = client.execute("select now() from ntb").await?;
        let (_, rows) = reply.rows().expect("expected rows");
        assert_eq!(rows.len(), 3);

        client.close().await?;
        Ok(())
    })
    .await
    .unwrap();
}
