//! Temporal conformance script: `now()`, `today()`, interval offsets, and
//! time predicates across three table topologies.
//!
//! The script is pure data built from constant tables. It prepares a fresh
//! database, creates a plain table `ntb`, a super table `stb`, and the
//! sub-table `stb_1` bound to it, inserts the three fixture rows, and then
//! walks every topology through the same query ladder:
//! projection of `now()` alone, `now()` offset by one of each interval
//! unit in both directions (against bare and database-qualified names),
//! the five time predicates against `ts`, and the `ts=today()` equality.

use crate::case::TestCase;
use crate::checker::Expectation;
use crate::registry::{Platform, Registry};
use crate::script::Script;
use types::Value;

/// Name the case is registered under.
pub const CASE_NAME: &str = "query/now";

/// Interval-unit ladder exercised against `now()`: the single-character
/// units (year, month, week, day, hour, minute, second, millisecond,
/// microsecond, nanosecond) plus the long-form subsecond spellings.
pub const INTERVAL_UNITS: [&str; 13] = [
    "y", "n", "w", "d", "h", "m", "s", "a", "u", "b", "ms", "us", "ns",
];

/// Fixed past instant, about one calendar epoch behind any run of the
/// suite, so `ts<now()` always includes its row.
pub const PAST_TIMESTAMP: &str = "2020-1-1 00:00:00";

/// Rows each populated table holds.
const FIXTURE_ROWS: usize = 3;

const TABLES: [&str; 3] = ["ntb", "stb", "stb_1"];

/// Knobs for script generation.
#[derive(Debug, Clone)]
pub struct NowCaseOptions {
    /// Include the range predicates (`<`, `<=`, `>=`, `>`) against the
    /// super table. Engines have historically restricted these; the
    /// default exercises them so the restriction is observed rather than
    /// silently skipped. `ts=now()` and `ts=today()` are always included.
    pub super_table_range_predicates: bool,
}

impl Default for NowCaseOptions {
    fn default() -> Self {
        Self {
            super_table_range_predicates: true,
        }
    }
}

/// Build the full conformance script against `database`.
pub fn now_script(database: &str, options: &NowCaseOptions) -> Script {
    let mut script = Script::new()
        .execute(format!("drop database if exists {database}"))
        .execute(format!("create database {database}"))
        .execute(format!("use {database}"))
        .execute(
            "create table if not exists ntb \
             (ts timestamp, c1 int, c2 float, c3 double, c4 timestamp)",
        )
        .execute(
            "create table if not exists stb \
             (ts timestamp, c1 int, c2 float, c3 double, c4 timestamp) tags(t0 int)",
        )
        .execute("create table if not exists stb_1 using stb tags(100)")
        .execute(fixture_insert("ntb"))
        .execute(fixture_insert("stb_1"));

    for table in TABLES {
        script = offset_ladder(script, database, table);
        script = predicates(script, table, options);
    }

    script
}

/// `TestCase` wrapping the default script.
pub fn now_case(database: &str) -> TestCase {
    TestCase::new(CASE_NAME, now_script(database, &NowCaseOptions::default()))
}

/// Register the case for both supported platform families.
pub fn register(registry: &mut Registry, database: &str) {
    let script = now_script(database, &NowCaseOptions::default());
    registry.register(
        CASE_NAME,
        &[Platform::Linux, Platform::Windows],
        script,
    );
}

/// One multi-record insert covering "now", the fixed past instant, and
/// "today". In timestamp order the table then reads: past row (c1=10),
/// today row (c1=3), now row (c1=1).
fn fixture_insert(table: &str) -> String {
    format!(
        "insert into {table} values\
         (now,1,1.55,100.555555,today())\
         (\"{PAST_TIMESTAMP}\",10,11.11,99.999999,now())\
         (today(),3,3.333,333.333333,now())"
    )
}

/// `select now()` alone, then offset by every unit in both directions,
/// against the bare and the database-qualified table name.
fn offset_ladder(mut script: Script, database: &str, table: &str) -> Script {
    script = script.query_rows(format!("select now() from {table}"), FIXTURE_ROWS);
    for sign in ["+", "-"] {
        for unit in INTERVAL_UNITS {
            script = script
                .query_rows(
                    format!("select now() {sign}1{unit} from {table}"),
                    FIXTURE_ROWS,
                )
                .query_rows(
                    format!("select now() {sign}1{unit} from {database}.{table}"),
                    FIXTURE_ROWS,
                );
        }
    }
    script
}

/// The five `ts` predicates against `now()`, then the `today()` equality.
///
/// Under the fixture, `<` and `<=` see all three rows: scan order puts the
/// today row at index 1 (c1=3) and the now row at index 2 (c1=1). The
/// strict and inclusive future predicates see nothing because no stored
/// timestamp re-evaluates as "now". Exactly one row lands on today's
/// midnight, so `ts=today()` returns it alone.
fn predicates(mut script: Script, table: &str, options: &NowCaseOptions) -> Script {
    let range = table != "stb" || options.super_table_range_predicates;

    if range {
        script = script
            .query(
                format!("select * from {table} where ts<now()"),
                vec![
                    Expectation::rows(FIXTURE_ROWS),
                    Expectation::cell(1, 1, Value::Int(3)),
                ],
            )
            .query(
                format!("select * from {table} where ts<=now()"),
                vec![
                    Expectation::rows(FIXTURE_ROWS),
                    Expectation::cell(2, 1, Value::Int(1)),
                ],
            );
    }
    script = script.query_rows(format!("select c1 from {table} where ts=now()"), 0);
    if range {
        script = script
            .query_rows(format!("select * from {table} where ts>=now()"), 0)
            .query_rows(format!("select * from {table} where ts>now()"), 0);
    }
    script.query_rows(format!("select now() from {table} where ts=today()"), 1)
}
