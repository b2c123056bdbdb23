// src/model.rs

use serde::{Deserialize, Serialize};

/// One country under its continent grouping, as scraped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub country: String,
    pub continent: String,
}

/// One row of the happiness ranking, typed and under canonical names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HappinessRecord {
    pub overall_rank: i32,
    pub country: String,
    pub score: f64,
    pub gdp_per_capita: f64,
    pub social_support: f64,
    pub healthy_life_expectancy: f64,
    pub freedom_to_make_life_choices: f64,
    pub generosity: f64,
    pub perceptions_of_corruption: f64,
}

/// A happiness row matched with its continent. Only countries present in
/// both sources make it here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedRecord {
    pub overall_rank: i32,
    pub country: String,
    pub score: f64,
    pub gdp_per_capita: f64,
    pub social_support: f64,
    pub healthy_life_expectancy: f64,
    pub freedom_to_make_life_choices: f64,
    pub generosity: f64,
    pub perceptions_of_corruption: f64,
    pub continent: String,
}

impl JoinedRecord {
    pub fn from_parts(h: HappinessRecord, continent: String) -> Self {
        JoinedRecord {
            overall_rank: h.overall_rank,
            country: h.country,
            score: h.score,
            gdp_per_capita: h.gdp_per_capita,
            social_support: h.social_support,
            healthy_life_expectancy: h.healthy_life_expectancy,
            freedom_to_make_life_choices: h.freedom_to_make_life_choices,
            generosity: h.generosity,
            perceptions_of_corruption: h.perceptions_of_corruption,
            continent,
        }
    }
}
