// src/extract/countries.rs

use anyhow::{bail, Result};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, instrument};

use crate::table::RawTable;

pub const COUNTRIES_URL: &str = "https://kids.kiddle.co/List_of_countries_by_continents";

/// Continent groupings on the page that are not country lists we want.
const EXCLUDED_CONTINENTS: &[&str] = &["Antarctica"];

pub const COUNTRY_HEADER: &str = "Country";
pub const CONTINENT_HEADER: &str = "Continent";

/// Fetch the continents page and flatten it into one (Country, Continent)
/// row per country.
#[instrument(level = "info", skip(client))]
pub async fn extract_countries(client: &Client) -> Result<RawTable> {
    let body = super::get_text(client, COUNTRIES_URL).await?;
    let table = parse_countries(&body)?;
    info!(rows = table.rows.len(), "extracted countries");
    Ok(table)
}

/// Parse the continents page: `h2 span.mw-headline` section headings paired
/// positionally with the `<ol>` country lists below them. Lists are
/// recognized by their `<li>` items carrying no class/id attribute, which
/// separates them from the page's other ordered lists. A heading/list count
/// mismatch means the page layout changed, and we refuse to guess which
/// heading a list belongs to.
pub fn parse_countries(html: &str) -> Result<RawTable> {
    let doc = Html::parse_document(html);
    let heading_sel = Selector::parse("h2 span.mw-headline").unwrap();
    let ol_sel = Selector::parse("ol").unwrap();
    let li_sel = Selector::parse("li").unwrap();
    let a_sel = Selector::parse("a").unwrap();

    let continents: Vec<String> = doc
        .select(&heading_sel)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|name| !EXCLUDED_CONTINENTS.contains(&name.as_str()))
        .collect();

    let mut country_lists: Vec<Vec<String>> = Vec::new();
    for ol in doc.select(&ol_sel) {
        let items: Vec<ElementRef> = ol
            .select(&li_sel)
            .filter(|li| {
                li.value().attr("class").is_none() && li.value().attr("id").is_none()
            })
            .collect();
        if items.is_empty() {
            continue;
        }
        country_lists.push(
            items
                .iter()
                .filter_map(|li| link_text(li, &a_sel))
                .collect(),
        );
    }

    if continents.is_empty() {
        bail!("no continent headings found; page structure changed?");
    }
    if continents.len() != country_lists.len() {
        bail!(
            "found {} continent headings but {} country lists; refusing misaligned pairing",
            continents.len(),
            country_lists.len()
        );
    }

    let mut table = RawTable::new(vec![COUNTRY_HEADER.into(), CONTINENT_HEADER.into()]);
    for (continent, countries) in continents.iter().zip(&country_lists) {
        for country in countries {
            table.push_row(vec![country.clone(), continent.clone()])?;
        }
    }
    Ok(table)
}

/// Text of the first `<a>` inside a list item, if any. Items without a link
/// are decorative and yield no country.
fn link_text(li: &ElementRef, a_sel: &Selector) -> Option<String> {
    li.select(a_sel)
        .next()
        .map(|a| a.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}
