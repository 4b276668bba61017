//! Explicit case registration and sequential driving.
//!
//! Cases are registered once per target platform family from a bootstrap
//! routine; nothing registers itself through global state. The registry
//! drives each case init -> run -> stop in order, records one
//! [`CaseOutcome`] per case, and keeps going past failures: the case
//! itself fails fast, the registry never does.

use crate::case::{self, TestCase};
use crate::script::Script;
use crate::session::SessionFactory;
use common::Config;
use std::fmt;
use std::time::{Duration, Instant};

/// Target platform family a case is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Linux,
    Windows,
}

impl Platform {
    /// The platform family this binary is running on, when supported.
    pub fn current() -> Option<Platform> {
        if cfg!(target_os = "linux") {
            Some(Platform::Linux)
        } else if cfg!(target_os = "windows") {
            Some(Platform::Windows)
        } else {
            None
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Linux => f.write_str("linux"),
            Platform::Windows => f.write_str("windows"),
        }
    }
}

/// Result of driving one case on one platform.
#[derive(Debug, Clone)]
pub struct CaseOutcome {
    pub name: String,
    pub platform: Platform,
    pub passed: bool,
    /// The failure rendered for diagnosis; `None` on pass.
    pub detail: Option<String>,
    pub elapsed: Duration,
}

struct RegisteredCase {
    name: String,
    platforms: Vec<Platform>,
    script: Script,
}

/// Ordered collection of registered cases.
#[derive(Default)]
pub struct Registry {
    cases: Vec<RegisteredCase>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a case for a set of platform families.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        platforms: &[Platform],
        script: Script,
    ) {
        self.cases.push(RegisteredCase {
            name: name.into(),
            platforms: platforms.to_vec(),
            script,
        });
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cases.iter().map(|c| c.name.as_str())
    }

    /// Drive every case registered for `platform`, one after another, each
    /// with a fresh session from the factory. Failures are recorded, never
    /// propagated; later cases still run.
    pub async fn run_platform(
        &self,
        platform: Platform,
        factory: &dyn SessionFactory,
        config: &Config,
    ) -> Vec<CaseOutcome> {
        let mut outcomes = Vec::new();

        for registered in self
            .cases
            .iter()
            .filter(|c| c.platforms.contains(&platform))
        {
            log::info!("running case `{}` on {}", registered.name, platform);
            let start = Instant::now();

            let mut case = TestCase::new(registered.name.clone(), registered.script.clone());
            let result = case::drive(&mut case, factory, config).await;
            let elapsed = start.elapsed();

            let outcome = match result {
                Ok(()) => {
                    log::info!("case `{}` passed in {:?}", registered.name, elapsed);
                    CaseOutcome {
                        name: registered.name.clone(),
                        platform,
                        passed: true,
                        detail: None,
                        elapsed,
                    }
                }
                Err(err) => {
                    log::error!("case `{}` failed: {}", registered.name, err);
                    CaseOutcome {
                        name: registered.name.clone(),
                        platform,
                        passed: false,
                        detail: Some(err.to_string()),
                        elapsed,
                    }
                }
            };
            outcomes.push(outcome);
        }

        outcomes
    }
}
