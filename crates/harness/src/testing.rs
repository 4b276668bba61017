//! Test doubles for the harness's own test suites.
//!
//! [`ScriptedSession`] replays a fixed reply sequence; [`FnSession`] answers
//! from a closure, which is enough to emulate an engine over the whole
//! conformance script. Both record every received statement in a shared
//! [`SessionJournal`] so tests can assert dispatch order and fail-fast
//! behavior. [`StubServer`] runs the same closure behind a real TCP
//! listener speaking the wire protocol, for end-to-end driver coverage; it
//! shuts down when dropped.

use crate::session::{BoxedSession, Session, SessionFactory};
use anyhow::Result;
use async_trait::async_trait;
use common::{Config, HarnessError, HarnessResult, ResultSet};
use protocol::{frame, ClientRequest, ServerResponse};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// One canned reply for a scripted or closure-driven session.
#[derive(Debug, Clone)]
pub enum CannedReply {
    /// Acknowledge with an affected-row count.
    Ack(u64),
    /// Answer with a result set.
    Rows(ResultSet),
    /// Reject the statement with this message.
    Fail(String),
}

/// Shared record of everything a test session saw.
#[derive(Debug, Clone, Default)]
pub struct SessionJournal {
    statements: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

impl SessionJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.statements.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last(&self) -> Option<String> {
        self.statements.lock().ok().and_then(|s| s.last().cloned())
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn record(&self, sql: &str) {
        if let Ok(mut statements) = self.statements.lock() {
            statements.push(sql.to_string());
        }
    }

    fn mark_closed(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

fn reply_to_execute(sql: &str, reply: CannedReply) -> HarnessResult<u64> {
    match reply {
        CannedReply::Ack(affected) => Ok(affected),
        CannedReply::Rows(_) => Ok(0),
        CannedReply::Fail(message) => Err(HarnessError::Execution {
            statement: sql.to_string(),
            message,
        }),
    }
}

fn reply_to_query(sql: &str, reply: CannedReply) -> HarnessResult<ResultSet> {
    match reply {
        CannedReply::Rows(result) => Ok(result),
        CannedReply::Ack(_) => Err(HarnessError::Execution {
            statement: sql.to_string(),
            message: "statement did not produce a result set".to_string(),
        }),
        CannedReply::Fail(message) => Err(HarnessError::Execution {
            statement: sql.to_string(),
            message,
        }),
    }
}

/// Session replaying a fixed sequence of replies, in order.
///
/// Dispatching past the end of the sequence is an execution error, which
/// makes over-dispatch visible in fail-fast tests.
pub struct ScriptedSession {
    replies: VecDeque<CannedReply>,
    journal: SessionJournal,
}

impl ScriptedSession {
    pub fn new(replies: Vec<CannedReply>) -> Self {
        Self {
            replies: replies.into(),
            journal: SessionJournal::new(),
        }
    }

    /// Handle to the shared journal.
    pub fn journal(&self) -> SessionJournal {
        self.journal.clone()
    }

    fn next_reply(&mut self, sql: &str) -> HarnessResult<CannedReply> {
        self.journal.record(sql);
        self.replies.pop_front().ok_or_else(|| HarnessError::Execution {
            statement: sql.to_string(),
            message: "scripted session exhausted".to_string(),
        })
    }
}

#[async_trait]
impl Session for ScriptedSession {
    async fn execute(&mut self, sql: &str) -> HarnessResult<u64> {
        let reply = self.next_reply(sql)?;
        reply_to_execute(sql, reply)
    }

    async fn query(&mut self, sql: &str) -> HarnessResult<ResultSet> {
        let reply = self.next_reply(sql)?;
        reply_to_query(sql, reply)
    }

    async fn close(&mut self) -> HarnessResult<()> {
        self.journal.mark_closed();
        Ok(())
    }
}

/// Session answering every statement through a closure.
pub struct FnSession<F> {
    respond: F,
    journal: SessionJournal,
}

impl<F> FnSession<F>
where
    F: FnMut(&str) -> CannedReply + Send,
{
    pub fn new(respond: F) -> Self {
        Self::with_journal(respond, SessionJournal::new())
    }

    pub fn with_journal(respond: F, journal: SessionJournal) -> Self {
        Self { respond, journal }
    }

    pub fn journal(&self) -> SessionJournal {
        self.journal.clone()
    }
}

#[async_trait]
impl<F> Session for FnSession<F>
where
    F: FnMut(&str) -> CannedReply + Send,
{
    async fn execute(&mut self, sql: &str) -> HarnessResult<u64> {
        self.journal.record(sql);
        let reply = (self.respond)(sql);
        reply_to_execute(sql, reply)
    }

    async fn query(&mut self, sql: &str) -> HarnessResult<ResultSet> {
        self.journal.record(sql);
        let reply = (self.respond)(sql);
        reply_to_query(sql, reply)
    }

    async fn close(&mut self) -> HarnessResult<()> {
        self.journal.mark_closed();
        Ok(())
    }
}

/// Factory handing out closure-driven sessions that share one journal.
pub struct FnSessionFactory<F> {
    respond: Arc<F>,
    journal: SessionJournal,
}

impl<F> FnSessionFactory<F>
where
    F: Fn(&str) -> CannedReply + Send + Sync + 'static,
{
    pub fn new(respond: F) -> Self {
        Self {
            respond: Arc::new(respond),
            journal: SessionJournal::new(),
        }
    }

    pub fn journal(&self) -> SessionJournal {
        self.journal.clone()
    }
}

#[async_trait]
impl<F> SessionFactory for FnSessionFactory<F>
where
    F: Fn(&str) -> CannedReply + Send + Sync + 'static,
{
    async fn open(&self, _config: &Config) -> HarnessResult<BoxedSession> {
        let respond = self.respond.clone();
        let session = FnSession::with_journal(
            move |sql: &str| (respond)(sql),
            self.journal.clone(),
        );
        Ok(Box::new(session))
    }
}

/// In-process TCP engine for end-to-end tests.
///
/// Answers every `Execute` request through the supplied closure and shuts
/// itself down when dropped.
pub struct StubServer {
    address: String,
    task: JoinHandle<()>,
}

impl StubServer {
    /// Start a stub engine bound to `127.0.0.1` on a random port.
    pub async fn start<F>(respond: F) -> Result<Self>
    where
        F: Fn(&str) -> ServerResponse + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?.to_string();
        let respond = Arc::new(respond);

        let task = tokio::spawn(async move {
            if let Err(e) = accept_loop(listener, respond).await {
                eprintln!("stub engine error: {e:?}");
            }
        });

        Ok(Self { address, task })
    }

    /// The socket address sessions should dial.
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn accept_loop<F>(listener: TcpListener, respond: Arc<F>) -> Result<()>
where
    F: Fn(&str) -> ServerResponse + Send + Sync + 'static,
{
    loop {
        let (socket, _) = listener.accept().await?;
        let respond = respond.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_session(socket, respond).await {
                eprintln!("stub engine session error: {e:?}");
            }
        });
    }
}

async fn handle_session<F>(mut socket: TcpStream, respond: Arc<F>) -> Result<()>
where
    F: Fn(&str) -> ServerResponse + Send + Sync,
{
    loop {
        let request: ClientRequest = match frame::read_message_async(&mut socket).await {
            Ok(req) => req,
            Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(err) => return Err(err.into()),
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
