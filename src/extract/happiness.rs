// src/extract/happiness.rs

use anyhow::{bail, Context, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{info, instrument};

use crate::table::RawTable;

pub const HAPPINESS_URL: &str = "https://en.wikipedia.org/wiki/World_Happiness_Report";

/// Which `table.wikitable` on the page holds the per-country ranking.
/// Positional selection is inherently brittle; the transform step's header
/// check is what catches the page drifting under us.
const TABLE_ORDINAL: usize = 4;

/// Fetch the happiness report page and pull out the ranking table.
#[instrument(level = "info", skip(client))]
pub async fn extract_happiness(client: &Client) -> Result<RawTable> {
    let body = super::get_text(client, HAPPINESS_URL).await?;
    let table = parse_happiness(&body)?;
    info!(rows = table.rows.len(), "extracted happiness scores");
    Ok(table)
}

/// Parse the table at `TABLE_ORDINAL` among all `table.wikitable` elements.
/// The first row supplies headers; every following row must have the same
/// width. Fewer qualifying tables than the ordinal is fatal.
pub fn parse_happiness(html: &str) -> Result<RawTable> {
    let doc = Html::parse_document(html);
    let table_sel = Selector::parse("table.wikitable").unwrap();
    let tr_sel = Selector::parse("tr").unwrap();
    let cell_sel = Selector::parse("th, td").unwrap();

    let found = doc.select(&table_sel).count();
    let table_el = doc.select(&table_sel).nth(TABLE_ORDINAL).with_context(|| {
        format!(
            "expected wikitable at position {} but page has only {}",
            TABLE_ORDINAL, found
        )
    })?;

    let mut rows = table_el.select(&tr_sel);
    let header_row = rows.next().context("ranking table has no rows")?;
    let headers: Vec<String> = header_row
        .select(&cell_sel)
        .map(|c| c.text().collect::<String>().trim().to_string())
        .collect();
    if headers.is_empty() {
        bail!("ranking table header row is empty");
    }

    let mut table = RawTable::new(headers);
    for tr in rows {
        let cells: Vec<String> = tr
            .select(&cell_sel)
            .map(|c| c.text().collect::<String>().trim().to_string())
            .collect();
        table
            .push_row(cells)
            .context("ranking table row width drifted from its header")?;
    }
    Ok(table)
}
