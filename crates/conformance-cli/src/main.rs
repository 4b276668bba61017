//! Command-line runner for the temporal conformance suite.
//!
//! Connects to the engine under test over TCP, drives every case registered
//! for this platform, and prints a one-line-per-case summary table. Exits
//! nonzero if any case failed.

use anyhow::{Context, Result};
use clap::Parser;
use common::pretty::{self, TableStyleKind};
use common::Config;
use harness::cases::{self, NowCaseOptions};
use harness::registry::{CaseOutcome, Platform, Registry};
use harness::session::TcpSessionFactory;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 6030;
const DEFAULT_DATABASE: &str = "db";

#[derive(Parser, Debug)]
#[command(name = "conformance", about = "Temporal SQL conformance runner")]
struct Args {
    /// Host address of the engine under test
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Port of the engine under test
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Database the conformance schema is created in (dropped and recreated)
    #[arg(long, default_value = DEFAULT_DATABASE)]
    database: String,

    /// Skip range predicates against the super table
    #[arg(long)]
    no_super_table_range: bool,

    /// List registered cases and exit without connecting
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut registry = Registry::new();
    register(&mut registry, &args);

    if args.list {
        for name in registry.names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let platform =
        Platform::current().context("no cases are registered for this platform family")?;

    let config = Config::builder()
        .addr(format!("{}:{}", args.host, args.port))
        .database(args.database.clone())
        .build();

    log::info!(
        "running {} case(s) against {} (platform {}, database `{}`)",
        registry.len(),
        config.addr,
        platform,
        config.database
    );

    let factory = TcpSessionFactory::new();
    let outcomes = registry.run_platform(platform, &factory, &config).await;

    println!("{}", render_summary(&outcomes));

    let failed = outcomes.iter().filter(|o| !o.passed).count();
    if failed > 0 {
        anyhow::bail!("{} of {} case(s) failed", failed, outcomes.len());
    }
    Ok(())
}

fn register(registry: &mut Registry, args: &Args) {
    if args.no_super_table_range {
        let options = NowCaseOptions {
            super_table_range_predicates: false,
        };
        registry.register(
            "query/now",
            &[Platform::Linux, Platform::Windows],
            cases::now_script(&args.database, &options),
        );
    } else {
        cases::register_cases(registry, &args.database);
    }
}

fn render_summary(outcomes: &[CaseOutcome]) -> String {
    let rows = outcomes
        .iter()
        .map(|outcome| {
            vec![
                outcome.name.clone(),
                outcome.platform.to_string(),
                if outcome.passed { "pass" } else { "FAIL" }.to_string(),
                format!("{:.2?}", outcome.elapsed),
                outcome.detail.clone().unwrap_or_default(),
            ]
        })
        .collect();

    pretty::render_string_table(
        &["case", "platform", "status", "elapsed", "detail"],
        rows,
        TableStyleKind::Modern,
    )
}
