// src/load.rs

use std::env;

use anyhow::{bail, Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, instrument};

use crate::model::JoinedRecord;

/// Connection parameters, resolved once per run from the environment. The
/// credential store itself (Airflow connections, vaults, ...) is the
/// orchestrator's concern; we only consume what it injects.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Target schema for the destination table.
    pub schema: String,
}

impl DbConfig {
    pub fn from_env() -> Result<Self> {
        Ok(DbConfig {
            host: require("ETL_DB_HOST")?,
            port: require("ETL_DB_PORT")?
                .parse()
                .context("ETL_DB_PORT is not a valid port number")?,
            user: require("ETL_DB_USER")?,
            password: require("ETL_DB_PASSWORD")?,
            database: require("ETL_DB_NAME")?,
            schema: env::var("ETL_DB_SCHEMA").unwrap_or_else(|_| "public".to_string()),
        })
    }

    /// Field-by-field connect options. Credentials are passed verbatim, so
    /// passwords with URL metacharacters need no escaping.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }
}

fn require(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("missing environment variable {}", key))
}

/// Replace the contents of `<schema>.<table_name>` with `rows`: drop,
/// recreate with the explicit column types, insert, all in one transaction.
/// Returns the number of rows written. Database errors propagate so the
/// scheduler sees a failed step, never a silent half-load.
#[instrument(level = "info", skip(cfg, rows), fields(table = table_name, rows = rows.len()))]
pub async fn load(cfg: &DbConfig, table_name: &str, rows: &[JoinedRecord]) -> Result<u64> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_with(cfg.connect_options())
        .await
        .with_context(|| format!("connecting to postgres at {}:{}", cfg.host, cfg.port))?;

    let written = replace_table(&pool, &cfg.schema, table_name, rows).await?;
    info!(written, "load committed");
    Ok(written)
}

pub async fn replace_table(
    pool: &PgPool,
    schema: &str,
    table_name: &str,
    rows: &[JoinedRecord],
) -> Result<u64> {
    let target = qualified_name(schema, table_name)?;

    let mut tx: Transaction<'_, Postgres> =
        pool.begin().await.context("opening load transaction")?;

    sqlx::query(&format!("DROP TABLE IF EXISTS {}", target))
        .execute(&mut *tx)
        .await
        .with_context(|| format!("dropping {}", target))?;

    sqlx::query(&format!(
        "CREATE TABLE {} (\
             overall_rank INTEGER, \
             country VARCHAR(100), \
             score DOUBLE PRECISION, \
             gdp_per_capita DOUBLE PRECISION, \
             social_support DOUBLE PRECISION, \
             healthy_life_expectancy DOUBLE PRECISION, \
             freedom_to_make_life_choices DOUBLE PRECISION, \
             generosity DOUBLE PRECISION, \
             perceptions_of_corruption DOUBLE PRECISION, \
             continent VARCHAR(100))",
        target
    ))
    .execute(&mut *tx)
    .await
    .with_context(|| format!("creating {}", target))?;

    let insert = format!(
        "INSERT INTO {} (overall_rank, country, score, gdp_per_capita, \
         social_support, healthy_life_expectancy, freedom_to_make_life_choices, \
         generosity, perceptions_of_corruption, continent) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        target
    );
    for row in rows {
        sqlx::query(&insert)
            .bind(row.overall_rank)
            .bind(&row.country)
            .bind(row.score)
            .bind(row.gdp_per_capita)
            .bind(row.social_support)
            .bind(row.healthy_life_expectancy)
            .bind(row.freedom_to_make_life_choices)
            .bind(row.generosity)
            .bind(row.perceptions_of_corruption)
            .bind(&row.continent)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("inserting row for {}", row.country))?;
    }

    tx.commit().await.context("committing load transaction")?;
    Ok(rows.len() as u64)
}

/// Quote a schema-qualified table name, refusing anything that is not a
/// bare identifier. DDL cannot take bind parameters, so this is the only
/// guard between a config value and the statement text.
fn qualified_name(schema: &str, table: &str) -> Result<String> {
    for part in [schema, table] {
        let mut chars = part.chars();
        let ok = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !ok {
            bail!("\"{}\" is not a valid SQL identifier", part);
        }
    }
    Ok(format!("\"{}\".\"{}\"", schema, table))
}
