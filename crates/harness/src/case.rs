//! Test-case lifecycle.
//!
//! A [`TestCase`] owns one script and walks the state machine
//! `Uninitialized -> Initialized -> Running -> Stopped`. `init` acquires a
//! session and fixes the logical "today" reference for the whole run;
//! `run` executes the script; `stop` is legal from any state and always
//! releases the session. Failures inside `run` propagate untouched; the
//! registry layer does the pass/fail bookkeeping.

use crate::runner::SqlRunner;
use crate::script::Script;
use crate::session::SessionFactory;
use chrono::{DateTime, NaiveTime, Utc};
use common::{Config, HarnessError, HarnessResult};

/// Lifecycle states, in transition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseState {
    Uninitialized,
    Initialized,
    Running,
    Stopped,
}

impl CaseState {
    fn as_str(self) -> &'static str {
        match self {
            CaseState::Uninitialized => "uninitialized",
            CaseState::Initialized => "initialized",
            CaseState::Running => "running",
            CaseState::Stopped => "stopped",
        }
    }
}

/// One named conformance case: a script plus the session that runs it.
pub struct TestCase {
    name: String,
    script: Script,
    state: CaseState,
    runner: Option<SqlRunner>,
    today: Option<DateTime<Utc>>,
}

impl TestCase {
    pub fn new(name: impl Into<String>, script: Script) -> Self {
        Self {
            name: name.into(),
            script,
            state: CaseState::Uninitialized,
            runner: None,
            today: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> CaseState {
        self.state
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    /// The day-truncated reference captured at `init`; `None` before then.
    pub fn today(&self) -> Option<DateTime<Utc>> {
        self.today
    }

    /// Acquire a session and move to `Initialized`.
    ///
    /// The "today" checkpoint is captured exactly once here, at day
    /// granularity, and never recomputed during the run.
    pub async fn init(
        &mut self,
        factory: &dyn SessionFactory,
        config: &Config,
    ) -> HarnessResult<()> {
        if self.state != CaseState::Uninitialized {
            return Err(HarnessError::Lifecycle(format!(
                "init called on {} case `{}`",
                self.state.as_str(),
                self.name
            )));
        }
        let session = factory.open(config).await?;
        self.runner = Some(SqlRunner::new(session));
        let today = today_reference();
        self.today = Some(today);
        self.state = CaseState::Initialized;
        log::info!(
            "case `{}` initialized (today reference {})",
            self.name,
            today.format("%Y-%m-%d")
        );
        Ok(())
    }

    /// Execute the script. Requires `Initialized`; consumes the transition
    /// to `Running`.
    pub async fn run(&mut self) -> HarnessResult<()> {
        if self.state != CaseState::Initialized {
            return Err(HarnessError::Lifecycle(format!(
                "run requires an initialized case, `{}` is {}",
                self.name,
                self.state.as_str()
            )));
        }
        self.state = CaseState::Running;
        let runner = self
            .runner
            .as_mut()
            .ok_or_else(|| HarnessError::Lifecycle(format!("case `{}` has no session", self.name)))?;
        runner.run_script(&self.script).await?;
        log::info!("case `{}` completed all {} steps", self.name, self.script.len());
        Ok(())
    }

    /// Release the session and move to `Stopped`. Legal from any state, so
    /// a failed `run` still gets its teardown.
    pub async fn stop(&mut self) -> HarnessResult<()> {
        self.state = CaseState::Stopped;
        if let Some(mut runner) = self.runner.take() {
            runner.close().await?;
            log::info!("case `{}` stopped", self.name);
        }
        Ok(())
    }
}

/// Drive one case through its full lifecycle. `stop` runs on every exit
/// path; a `run` failure takes precedence over a teardown failure.
pub async fn drive(
    case: &mut TestCase,
    factory: &dyn SessionFactory,
    config: &Config,
) -> HarnessResult<()> {
    let outcome = async {
        case.init(factory, config).await?;
        case.run().await
    }
    .await;
    let teardown = case.stop().await;
    outcome.and(teardown)
}

fn today_reference() -> DateTime<Utc> {
    Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CannedReply, FnSessionFactory, ScriptedSession};
    use crate::session::{BoxedSession, Session, SessionFactory};
    use async_trait::async_trait;
    use chrono::Timelike;
    use common::ResultSet;
    use pretty_assertions::assert_eq;

    struct OneShotFactory;

    #[async_trait]
    impl SessionFactory for OneShotFactory {
        async fn open(&self, _config: &Config) -> HarnessResult<BoxedSession> {
            Ok(Box::new(ScriptedSession::new(vec![CannedReply::Ack(0)])))
        }
    }

    fn config() -> Config {
        Config::builder().build()
    }

    #[tokio::test]
    async fn test_lifecycle_happy_path() {
        let mut case = TestCase::new("demo", Script::new().execute("use db"));
        assert_eq!(case.state(), CaseState::Uninitialized);
        assert!(case.today().is_none());

        case.init(&OneShotFactory, &config()).await.unwrap();
        assert_eq!(case.state(), CaseState::Initialized);
        let today = case.today().unwrap();
        assert_eq!(today.hour(), 0);
        assert_eq!(today.minute(), 0);
        assert_eq!(today.second(), 0);

        case.run().await.unwrap();
        assert_eq!(case.state(), CaseState::Running);

        case.stop().await.unwrap();
        assert_eq!(case.state(), CaseState::Stopped);
    }

    #[tokio::test]
    async fn test_run_before_init_is_a_lifecycle_error() {
        let mut case = TestCase::new("demo", Script::new());
        let err = case.run().await.unwrap_err();
        assert!(matches!(err, HarnessError::Lifecycle(_)));
        assert!(err.to_string().contains("uninitialized"));
    }

    #[tokio::test]
    async fn test_double_init_is_a_lifecycle_error() {
        let mut case = TestCase::new("demo", Script::new());
        case.init(&OneShotFactory, &config()).await.unwrap();
        let err = case.init(&OneShotFactory, &config()).await.unwrap_err();
        assert!(matches!(err, HarnessError::Lifecycle(_)));
    }

    #[tokio::test]
    async fn test_run_after_stop_is_a_lifecycle_error() {
        let mut case = TestCase::new("demo", Script::new());
        case.init(&OneShotFactory, &config()).await.unwrap();
        case.stop().await.unwrap();
        let err = case.run().await.unwrap_err();
        assert!(matches!(err, HarnessError::Lifecycle(_)));
    }

    #[tokio::test]
    async fn test_stop_is_legal_before_init() {
        let mut case = TestCase::new("demo", Script::new());
        case.stop().await.unwrap();
        assert_eq!(case.state(), CaseState::Stopped);
    }

    #[tokio::test]
    async fn test_drive_stops_the_case_when_run_fails() {
        let factory = FnSessionFactory::new(|sql: &str| {
            if sql.starts_with("select") {
                // Empty result set; the row-count check will fail.
                CannedReply::Rows(ResultSet::empty())
            } else {
                CannedReply::Ack(0)
            }
        });
        let journal = factory.journal();

        let script = Script::new()
            .execute("use db")
            .query_rows("select now() from ntb", 3)
            .execute("never dispatched");
        let mut case = TestCase::new("failing", script);

        let err = drive(&mut case, &factory, &config()).await.unwrap_err();
        assert!(err.is_assertion());
        assert_eq!(case.state(), CaseState::Stopped);
        assert!(journal.is_closed());
        assert_eq!(journal.statements(), vec!["use db", "select now() from ntb"]);
    }
}
