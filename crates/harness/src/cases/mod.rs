//! The conformance scripts shipped with the harness.

pub mod now;

pub use now::{now_case, now_script, NowCaseOptions};

use crate::registry::Registry;

/// Register every shipped case, once per supported platform family.
pub fn register_cases(registry: &mut Registry, database: &str) {
    now::register(registry, database);
}
