// src/pipeline.rs

use anyhow::Result;
use reqwest::Client;
use tracing::{info, warn};

use crate::extract;
use crate::handoff::RunStore;
use crate::load::{self, DbConfig};
use crate::model::JoinedRecord;
use crate::table::RawTable;
use crate::transform;

/// Hand-off keys, one per step output.
pub const KEY_COUNTRIES: &str = "countries";
pub const KEY_HAPPINESS: &str = "happiness";
pub const KEY_JOINED: &str = "joined";

/// Step 1a: scrape the country/continent page.
pub async fn extract_countries_step(client: &Client, store: &RunStore) -> Result<()> {
    let table = extract::countries::extract_countries(client).await?;
    store.put(KEY_COUNTRIES, &table)
}

/// Step 1b: scrape the happiness ranking. Independent of step 1a.
pub async fn extract_happiness_step(client: &Client, store: &RunStore) -> Result<()> {
    let table = extract::happiness::extract_happiness(client).await?;
    store.put(KEY_HAPPINESS, &table)
}

/// Step 2: rename, type, and join both extracts. Dropped rows are reported
/// here rather than inside the pure transform.
pub fn transform_step(store: &RunStore) -> Result<()> {
    let happiness: RawTable = store.take(KEY_HAPPINESS)?;
    let countries: RawTable = store.take(KEY_COUNTRIES)?;
    let out = transform::transform(&happiness, &countries)?;
    if out.dropped_happiness > 0 || out.dropped_countries > 0 {
        warn!(
            dropped_happiness = out.dropped_happiness,
            dropped_countries = out.dropped_countries,
            "inner join dropped unmatched countries"
        );
    }
    info!(rows = out.rows.len(), "transform complete");
    store.put(KEY_JOINED, &out.rows)
}

/// Step 3: replace the destination table with the joined rows.
pub async fn load_step(cfg: &DbConfig, store: &RunStore, table_name: &str) -> Result<u64> {
    let rows: Vec<JoinedRecord> = store.take(KEY_JOINED)?;
    load::load(cfg, table_name, &rows).await
}

/// One full run: the two extracts in parallel (they share nothing), then
/// transform, then load. Any step error fails the run.
pub async fn run(
    client: &Client,
    cfg: &DbConfig,
    store: &RunStore,
    table_name: &str,
) -> Result<u64> {
    tokio::try_join!(
        extract_countries_step(client, store),
        extract_happiness_step(client, store),
    )?;
    transform_step(store)?;
    load_step(cfg, store, table_name).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seeded_store() -> (TempDir, RunStore) {
        let tmp = TempDir::new().unwrap();
        let store = RunStore::create(tmp.path()).unwrap();

        let mut happiness = RawTable::new(
            [
                "Overall rank",
                "Country or region",
                "Score",
                "GDP per capita",
                "Social support",
                "Healthy life expectancy",
                "Freedom to make life choices",
                "Generosity",
                "Perceptions of corruption",
            ]
            .map(String::from)
            .to_vec(),
        );
        happiness
            .push_row(
                ["1", "France", "7.0", "1.3", "1.5", "1.0", "0.6", "0.2", "0.3"]
                    .map(String::from)
                    .to_vec(),
            )
            .unwrap();

        let mut countries = RawTable::new(vec!["Country".into(), "Continent".into()]);
        countries
            .push_row(vec!["France".into(), "Europe".into()])
            .unwrap();

        store.put(KEY_HAPPINESS, &happiness).unwrap();
        store.put(KEY_COUNTRIES, &countries).unwrap();
        (tmp, store)
    }

    #[test]
    fn transform_step_consumes_extracts_and_stores_join() {
        let (_tmp, store) = seeded_store();
        transform_step(&store).unwrap();

        // Inputs are consumed, output is available exactly once.
        assert!(store.take::<RawTable>(KEY_HAPPINESS).is_err());
        assert!(store.take::<RawTable>(KEY_COUNTRIES).is_err());
        let joined: Vec<JoinedRecord> = store.take(KEY_JOINED).unwrap();
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].country, "France");
        assert_eq!(joined[0].continent, "Europe");
    }

    #[test]
    fn transform_step_fails_without_upstream_outputs() {
        let tmp = TempDir::new().unwrap();
        let store = RunStore::create(tmp.path()).unwrap();
        assert!(transform_step(&store).is_err());
    }
}
