// src/transform.rs

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};

use crate::model::{CountryRecord, HappinessRecord, JoinedRecord};
use crate::table::RawTable;

/// Source page header → canonical column name for the happiness table.
/// Matching is case- and whitespace-insensitive (see `table::normalize_header`),
/// but an entirely absent header fails the run rather than misassigning data.
const HAPPINESS_RENAMES: &[(&str, &str)] = &[
    ("Overall rank", "overall_rank"),
    ("Country or region", "country"),
    ("Score", "score"),
    ("GDP per capita", "gdp_per_capita"),
    ("Social support", "social_support"),
    ("Healthy life expectancy", "healthy_life_expectancy"),
    ("Freedom to make life choices", "freedom_to_make_life_choices"),
    ("Generosity", "generosity"),
    ("Perceptions of corruption", "perceptions_of_corruption"),
];

const COUNTRY_RENAMES: &[(&str, &str)] = &[("Country", "country"), ("Continent", "continent")];

#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutput {
    pub rows: Vec<JoinedRecord>,
    /// Happiness rows whose country has no continent entry.
    pub dropped_happiness: usize,
    /// Countries that matched no happiness row.
    pub dropped_countries: usize,
}

/// Rename both tables to canonical columns, type the cells, and inner-join
/// on country. Pure: no I/O, identical inputs give identical output. Rows
/// come out in happiness-table order. Unmatched rows on either side are
/// dropped, with counts reported so the caller can surface the loss.
pub fn transform(happiness: &RawTable, countries: &RawTable) -> Result<TransformOutput> {
    let h_cols = resolve_columns(happiness, HAPPINESS_RENAMES)
        .context("happiness table headers do not match the expected schema")?;
    let c_cols = resolve_columns(countries, COUNTRY_RENAMES)
        .context("countries table headers do not match the expected schema")?;

    let records = typed_happiness(happiness, &h_cols)?;
    let country_records = typed_countries(countries, &c_cols);

    let continent_by_country: HashMap<&str, &str> = country_records
        .iter()
        .map(|r| (r.country.as_str(), r.continent.as_str()))
        .collect();

    let mut rows = Vec::new();
    let mut matched: HashSet<&str> = HashSet::new();
    let mut dropped_happiness = 0;
    for rec in records {
        match continent_by_country.get_key_value(rec.country.as_str()) {
            Some((key, continent)) => {
                matched.insert(*key);
                rows.push(JoinedRecord::from_parts(rec, (*continent).to_string()));
            }
            None => dropped_happiness += 1,
        }
    }
    let dropped_countries = continent_by_country.len() - matched.len();

    Ok(TransformOutput {
        rows,
        dropped_happiness,
        dropped_countries,
    })
}

/// Map every (source header, canonical name) pair to a column index, failing
/// on the first header the table does not carry.
fn resolve_columns(
    table: &RawTable,
    renames: &[(&str, &'static str)],
) -> Result<HashMap<&'static str, usize>> {
    let mut cols = HashMap::new();
    for (source, canonical) in renames {
        let idx = table.column(source).with_context(|| {
            format!(
                "missing expected column \"{}\" (have: {:?})",
                source, table.headers
            )
        })?;
        cols.insert(*canonical, idx);
    }
    Ok(cols)
}

fn typed_countries(table: &RawTable, cols: &HashMap<&'static str, usize>) -> Vec<CountryRecord> {
    table
        .rows
        .iter()
        .map(|row| CountryRecord {
            country: cell(row, cols["country"]).to_string(),
            continent: cell(row, cols["continent"]).to_string(),
        })
        .collect()
}

fn typed_happiness(
    table: &RawTable,
    cols: &HashMap<&'static str, usize>,
) -> Result<Vec<HappinessRecord>> {
    let mut out = Vec::with_capacity(table.rows.len());
    for (i, row) in table.rows.iter().enumerate() {
        let rec = (|| -> Result<HappinessRecord> {
            Ok(HappinessRecord {
                overall_rank: cell(row, cols["overall_rank"]).parse()?,
                country: cell(row, cols["country"]).to_string(),
                score: cell(row, cols["score"]).parse()?,
                gdp_per_capita: cell(row, cols["gdp_per_capita"]).parse()?,
                social_support: cell(row, cols["social_support"]).parse()?,
                healthy_life_expectancy: cell(row, cols["healthy_life_expectancy"]).parse()?,
                freedom_to_make_life_choices: cell(row, cols["freedom_to_make_life_choices"])
                    .parse()?,
                generosity: cell(row, cols["generosity"]).parse()?,
                perceptions_of_corruption: cell(row, cols["perceptions_of_corruption"]).parse()?,
            })
        })()
        .with_context(|| format!("happiness row {} failed to parse", i + 1))?;
        out.push(rec);
    }
    Ok(out)
}

fn cell(row: &[String], idx: usize) -> &str {
    row[idx].trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn happiness_table(rows: Vec<Vec<&str>>) -> RawTable {
        let mut t = RawTable::new(
            HAPPINESS_RENAMES
                .iter()
                .map(|(src, _)| src.to_string())
                .collect(),
        );
        for r in rows {
            t.push_row(r.into_iter().map(String::from).collect()).unwrap();
        }
        t
    }

    fn countries_table(rows: Vec<(&str, &str)>) -> RawTable {
        let mut t = RawTable::new(vec!["Country".into(), "Continent".into()]);
        for (country, continent) in rows {
            t.push_row(vec![country.into(), continent.into()]).unwrap();
        }
        t
    }

    #[test]
    fn inner_join_keeps_only_countries_in_both() {
        let happiness = happiness_table(vec![
            vec!["1", "France", "7.0", "1.3", "1.5", "1.0", "0.6", "0.2", "0.3"],
            vec!["2", "Germany", "6.9", "1.4", "1.5", "0.9", "0.6", "0.3", "0.2"],
        ]);
        let countries = countries_table(vec![("France", "Europe"), ("Japan", "Asia")]);

        let out = transform(&happiness, &countries).unwrap();
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].country, "France");
        assert_eq!(out.rows[0].continent, "Europe");
        assert_eq!(out.rows[0].overall_rank, 1);
        assert_eq!(out.rows[0].score, 7.0);
        assert_eq!(out.dropped_happiness, 1); // Germany
        assert_eq!(out.dropped_countries, 1); // Japan
    }

    #[test]
    fn countries_rows_become_typed_records() {
        let countries = countries_table(vec![(" France ", "Europe"), ("Japan", " Asia ")]);
        let cols = resolve_columns(&countries, COUNTRY_RENAMES).unwrap();
        assert_eq!(
            typed_countries(&countries, &cols),
            vec![
                CountryRecord {
                    country: "France".into(),
                    continent: "Europe".into(),
                },
                CountryRecord {
                    country: "Japan".into(),
                    continent: "Asia".into(),
                },
            ]
        );
    }

    #[test]
    fn is_deterministic_across_calls() {
        let happiness = happiness_table(vec![vec![
            "1", "France", "7.0", "1.3", "1.5", "1.0", "0.6", "0.2", "0.3",
        ]]);
        let countries = countries_table(vec![("France", "Europe")]);
        let a = transform(&happiness, &countries).unwrap();
        let b = transform(&happiness, &countries).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rename_tolerates_header_casing_and_spacing() {
        let mut happiness = happiness_table(vec![]);
        happiness.headers = vec![
            "overall  RANK".into(),
            " Country or Region".into(),
            "SCORE".into(),
            "gdp PER capita".into(),
            "Social support".into(),
            "Healthy life expectancy".into(),
            "Freedom to make life choices".into(),
            "Generosity".into(),
            "Perceptions of corruption".into(),
        ];
        happiness
            .push_row(
                vec!["3", "Japan", "5.9", "1.3", "1.4", "1.0", "0.5", "0.1", "0.2"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            )
            .unwrap();
        let countries = countries_table(vec![("Japan", "Asia")]);

        let out = transform(&happiness, &countries).unwrap();
        assert_eq!(out.rows[0].country, "Japan");
        assert_eq!(out.rows[0].continent, "Asia");
    }

    #[test]
    fn missing_expected_header_is_fatal() {
        let mut happiness = happiness_table(vec![]);
        happiness.headers[2] = "Happiness score".into(); // page drifted
        let countries = countries_table(vec![("Japan", "Asia")]);
        let err = transform(&happiness, &countries).unwrap_err();
        assert!(format!("{:#}", err).contains("Score"));
    }

    #[test]
    fn unparseable_cell_is_fatal() {
        let happiness = happiness_table(vec![vec![
            "1", "France", "N/A", "1.3", "1.5", "1.0", "0.6", "0.2", "0.3",
        ]]);
        let countries = countries_table(vec![("France", "Europe")]);
        assert!(transform(&happiness, &countries).is_err());
    }
}
