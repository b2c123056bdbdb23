use anyhow::Result;
use happiness_etl::{handoff::RunStore, load::DbConfig, pipeline};
use reqwest::Client;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Destination table, overridable for side-by-side test loads.
const DEFAULT_TABLE: &str = "etl";

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) resolve config ───────────────────────────────────────────
    let cfg = DbConfig::from_env()?;
    let table_name = std::env::var("ETL_TABLE").unwrap_or_else(|_| DEFAULT_TABLE.to_string());
    let runs_root = std::env::var("ETL_RUNS_DIR").unwrap_or_else(|_| "runs".to_string());

    // ─── 3) one full run ─────────────────────────────────────────────
    let client = Client::new();
    let store = RunStore::create(runs_root)?;
    info!(run_dir = %store.run_dir().display(), "run started");

    let written = pipeline::run(&client, &cfg, &store, &table_name).await?;
    info!(written, table = %table_name, "run complete");
    Ok(())
}
