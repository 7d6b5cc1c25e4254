use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel shown first in the continent selector; selecting it disables
/// continent filtering.
pub const ALL_CONTINENTS: &str = "All";

// ---------------------------------------------------------------------------
// Column names as they appear in the source file
// ---------------------------------------------------------------------------

pub const COL_COUNTRY: &str = "Country or region";
pub const COL_CONTINENT: &str = "Continent";
pub const COL_RANK: &str = "Overall rank";

/// Every column the loader insists on, in display order.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    COL_RANK,
    COL_COUNTRY,
    COL_CONTINENT,
    "Score",
    "GDP per capita",
    "Social support",
    "Healthy life expectancy",
    "Freedom to make life choices",
    "Generosity",
    "Perceptions of corruption",
];

// ---------------------------------------------------------------------------
// Indicator – the seven numeric columns
// ---------------------------------------------------------------------------

/// One of the seven numeric happiness indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Indicator {
    Score,
    GdpPerCapita,
    SocialSupport,
    HealthyLifeExpectancy,
    Freedom,
    Generosity,
    Corruption,
}

impl Indicator {
    /// Fixed indicator set used by the melt, radar and correlation views.
    pub const ALL: [Indicator; 7] = [
        Indicator::Score,
        Indicator::GdpPerCapita,
        Indicator::SocialSupport,
        Indicator::HealthyLifeExpectancy,
        Indicator::Freedom,
        Indicator::Generosity,
        Indicator::Corruption,
    ];

    /// Column header in the source file.
    pub fn column(self) -> &'static str {
        match self {
            Indicator::Score => "Score",
            Indicator::GdpPerCapita => "GDP per capita",
            Indicator::SocialSupport => "Social support",
            Indicator::HealthyLifeExpectancy => "Healthy life expectancy",
            Indicator::Freedom => "Freedom to make life choices",
            Indicator::Generosity => "Generosity",
            Indicator::Corruption => "Perceptions of corruption",
        }
    }

    /// Compact label for axes where the full header does not fit.
    pub fn short_label(self) -> &'static str {
        match self {
            Indicator::Score => "Score",
            Indicator::GdpPerCapita => "GDP",
            Indicator::SocialSupport => "Social",
            Indicator::HealthyLifeExpectancy => "Life exp.",
            Indicator::Freedom => "Freedom",
            Indicator::Generosity => "Generosity",
            Indicator::Corruption => "Corruption",
        }
    }

    pub fn value(self, record: &Record) -> f64 {
        match self {
            Indicator::Score => record.score,
            Indicator::GdpPerCapita => record.gdp_per_capita,
            Indicator::SocialSupport => record.social_support,
            Indicator::HealthyLifeExpectancy => record.healthy_life_expectancy,
            Indicator::Freedom => record.freedom,
            Indicator::Generosity => record.generosity,
            Indicator::Corruption => record.corruption,
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the source table
// ---------------------------------------------------------------------------

/// One country's happiness observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Overall rank")]
    pub overall_rank: u32,
    #[serde(rename = "Country or region")]
    pub country: String,
    #[serde(rename = "Continent")]
    pub continent: String,
    #[serde(rename = "Score")]
    pub score: f64,
    #[serde(rename = "GDP per capita")]
    pub gdp_per_capita: f64,
    #[serde(rename = "Social support")]
    pub social_support: f64,
    #[serde(rename = "Healthy life expectancy")]
    pub healthy_life_expectancy: f64,
    #[serde(rename = "Freedom to make life choices")]
    pub freedom: f64,
    #[serde(rename = "Generosity")]
    pub generosity: f64,
    #[serde(rename = "Perceptions of corruption")]
    pub corruption: f64,
}

impl Record {
    /// First field that would let a NaN or an empty label reach a chart.
    pub fn first_invalid_field(&self) -> Option<(&'static str, String)> {
        if self.country.trim().is_empty() {
            return Some((COL_COUNTRY, "empty value".to_string()));
        }
        if self.continent.trim().is_empty() {
            return Some((COL_CONTINENT, "empty value".to_string()));
        }
        if self.overall_rank == 0 {
            return Some((COL_RANK, "rank must be at least 1".to_string()));
        }
        Indicator::ALL.iter().find_map(|ind| {
            let v = ind.value(self);
            (!v.is_finite()).then(|| (ind.column(), format!("{v} is not a finite number")))
        })
    }
}

// ---------------------------------------------------------------------------
// Dataset – the immutable, loaded table
// ---------------------------------------------------------------------------

/// The full dataset plus the summaries the sidebar controls are built from.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
    /// Distinct continents in order of first appearance.
    continents: Vec<String>,
    /// Distinct countries in order of first appearance.
    countries: Vec<String>,
    score_bounds: (f64, f64),
}

impl Dataset {
    /// Build the column summaries from already validated records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut seen_continents = BTreeSet::new();
        let mut seen_countries = BTreeSet::new();
        let mut continents = Vec::new();
        let mut countries = Vec::new();
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;

        for r in &records {
            if seen_continents.insert(r.continent.as_str()) {
                continents.push(r.continent.clone());
            }
            if seen_countries.insert(r.country.as_str()) {
                countries.push(r.country.clone());
            }
            lo = lo.min(r.score);
            hi = hi.max(r.score);
        }

        let score_bounds = if records.is_empty() { (0.0, 0.0) } else { (lo, hi) };

        Dataset {
            records,
            continents,
            countries,
            score_bounds,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Borrowed view over every record, the unfiltered derivation.
    pub fn rows(&self) -> Vec<&Record> {
        self.records.iter().collect()
    }

    pub fn continents(&self) -> &[String] {
        &self.continents
    }

    /// Continent selector options: the `"All"` sentinel followed by every
    /// distinct continent.
    pub fn continent_options(&self) -> Vec<String> {
        std::iter::once(ALL_CONTINENTS.to_string())
            .chain(self.continents.iter().cloned())
            .collect()
    }

    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    /// `(min, max)` of `score` over all records.
    pub fn score_bounds(&self) -> (f64, f64) {
        self.score_bounds
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(country: &str, continent: &str, rank: u32, score: f64) -> Record {
        Record {
            overall_rank: rank,
            country: country.to_string(),
            continent: continent.to_string(),
            score,
            gdp_per_capita: score / 5.0,
            social_support: 1.2,
            healthy_life_expectancy: score / 8.0,
            freedom: 0.5,
            generosity: 0.1 + score / 100.0,
            corruption: 0.3,
        }
    }

    /// Finland, Denmark, Brazil.
    pub(crate) fn three_countries() -> Dataset {
        Dataset::from_records(vec![
            record("Finland", "Europe", 1, 7.8),
            record("Denmark", "Europe", 2, 7.6),
            record("Brazil", "South America", 30, 6.3),
        ])
    }

    #[test]
    fn summaries_follow_first_appearance() {
        let ds = three_countries();
        assert_eq!(ds.continents(), ["Europe", "South America"]);
        assert_eq!(ds.countries(), ["Finland", "Denmark", "Brazil"]);
        assert_eq!(
            ds.continent_options(),
            vec!["All", "Europe", "South America"]
        );
        assert_eq!(ds.score_bounds(), (6.3, 7.8));
    }

    #[test]
    fn invalid_fields_are_reported() {
        let mut r = record("Chad", "Africa", 140, 4.3);
        assert!(r.first_invalid_field().is_none());
        r.generosity = f64::NAN;
        assert_eq!(r.first_invalid_field().map(|(c, _)| c), Some("Generosity"));
        r.generosity = 0.1;
        r.continent = "  ".to_string();
        assert_eq!(r.first_invalid_field().map(|(c, _)| c), Some(COL_CONTINENT));
    }
}
