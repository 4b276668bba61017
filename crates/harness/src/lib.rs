//! Conformance-test harness for temporal SQL semantics.
//!
//! This crate drives a live time-series engine through scripted SQL and
//! asserts the shape and content of every result:
//! - a [`Session`](session::Session) capability trait over any driver
//! - a [`SqlRunner`](runner::SqlRunner) that executes statements and holds
//!   the last result set for positional assertions
//! - [`Script`](script::Script) values pairing each query with its
//!   expectations, serializable and replayable
//! - a [`TestCase`](case::TestCase) lifecycle (init, run, stop) and a
//!   [`Registry`](registry::Registry) that drives cases per platform
//! - the `now()`/`today()` conformance script itself under [`cases`]
//!
//! # Example Usage
//!
//! ```no_run
//! use harness::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::builder().build();
//!     let mut registry = Registry::new();
//!     harness::cases::register_cases(&mut registry, &config.database);
//!
//!     let factory = TcpSessionFactory::new();
//!     let outcomes = registry.run_platform(Platform::Linux, &factory, &config).await;
//!     for outcome in &outcomes {
//!         println!("{}: {}", outcome.name, if outcome.passed { "pass" } else { "FAIL" });
//!     }
//!     Ok(())
//! }
//! ```

pub mod case;
pub mod cases;
pub mod checker;
pub mod proptest_generators;
pub mod registry;
pub mod runner;
pub mod script;
pub mod session;
pub mod testing;

/// Convenient re-exports for driving the harness.
pub mod prelude {
    pub use crate::case::{CaseState, TestCase};
    pub use crate::checker::Expectation;
    pub use crate::registry::{CaseOutcome, Platform, Registry};
    pub use crate::runner::SqlRunner;
    pub use crate::script::{Script, ScriptStep};
    pub use crate::session::{BoxedSession, Session, SessionFactory, TcpSessionFactory};
    pub use common::prelude::*;
}
