use std::collections::BTreeSet;

use super::aggregate::smallest_by;
use super::model::{Dataset, Record};

/// Size of the "top countries" cut.
pub const TOP_N: usize = 10;

// ---------------------------------------------------------------------------
// Filter predicate: a snapshot of every sidebar control
// ---------------------------------------------------------------------------

/// Continent selector value.
/// An empty `Only` set behaves like `All` (no continent filtering).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContinentSelection {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl ContinentSelection {
    pub fn admits(&self, continent: &str) -> bool {
        match self {
            ContinentSelection::All => true,
            ContinentSelection::Only(set) => set.is_empty() || set.contains(continent),
        }
    }

    pub fn is_all(&self) -> bool {
        match self {
            ContinentSelection::All => true,
            ContinentSelection::Only(set) => set.is_empty(),
        }
    }
}

/// Inclusive score window; `min <= max` always holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
}

impl ScoreRange {
    /// Build a range, swapping the ends if they arrive reversed.
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            ScoreRange { min: a, max: b }
        } else {
            ScoreRange { min: b, max: a }
        }
    }

    /// Clamp both ends into `bounds`.
    pub fn clamped(self, bounds: (f64, f64)) -> Self {
        ScoreRange::new(
            self.min.clamp(bounds.0, bounds.1),
            self.max.clamp(bounds.0, bounds.1),
        )
    }

    pub fn contains(&self, score: f64) -> bool {
        self.min <= score && score <= self.max
    }
}

/// The value of every sidebar control at one point in time.
///
/// A fresh snapshot is threaded through the pipeline on every rerun; nothing
/// downstream mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub continents: ContinentSelection,
    pub score_range: ScoreRange,
    pub top10_only: bool,
    /// Countries compared in the grouped bar view.
    pub comparison_countries: BTreeSet<String>,
    /// Countries drawn in the radar view, independent of the comparison set.
    pub radar_countries: BTreeSet<String>,
}

impl FilterState {
    /// Defaults: every continent, the full score range, no top-10 cut, no
    /// countries selected.
    pub fn for_dataset(dataset: &Dataset) -> Self {
        let (lo, hi) = dataset.score_bounds();
        FilterState {
            continents: ContinentSelection::All,
            score_range: ScoreRange::new(lo, hi),
            top10_only: false,
            comparison_countries: BTreeSet::new(),
            radar_countries: BTreeSet::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Derivations
// ---------------------------------------------------------------------------

/// Rows derived from the dataset by a predicate; borrowed, in dataset order.
pub type FilteredDataset<'a> = Vec<&'a Record>;

/// Continent and score filtering only.
///
/// This is the secondary derivation consumed by the GDP, map, radar and
/// correlation views.
pub fn apply_base_filters<'a>(dataset: &'a Dataset, filter: &FilterState) -> FilteredDataset<'a> {
    dataset
        .records()
        .iter()
        .filter(|r| filter.continents.admits(&r.continent))
        .filter(|r| filter.score_range.contains(r.score))
        .collect()
}

/// Continent, score and top-10 filtering.
///
/// This is the primary derivation behind the data table, the score bar
/// chart and the scatter plot. With fewer than [`TOP_N`] candidates the
/// top-10 cut keeps all of them.
pub fn apply_filters<'a>(dataset: &'a Dataset, filter: &FilterState) -> FilteredDataset<'a> {
    let base = apply_base_filters(dataset, filter);
    if filter.top10_only {
        smallest_by(&base, TOP_N, |r| r.overall_rank)
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::{record, three_countries};

    fn countries(rows: &[&Record]) -> Vec<String> {
        rows.iter().map(|r| r.country.clone()).collect()
    }

    fn twenty_countries() -> Dataset {
        // Ranks deliberately out of file order.
        let records = (0..20u32)
            .map(|i| {
                let rank = (i * 7) % 20 + 1;
                let continent = if i % 2 == 0 { "Europe" } else { "Asia" };
                record(&format!("C{i}"), continent, rank, 3.0 + i as f64 * 0.2)
            })
            .collect();
        Dataset::from_records(records)
    }

    #[test]
    fn all_continents_is_identity() {
        let ds = twenty_countries();
        let filter = FilterState::for_dataset(&ds);
        let out = apply_filters(&ds, &filter);
        assert_eq!(out, ds.rows());
    }

    #[test]
    fn empty_continent_set_is_identity() {
        let ds = three_countries();
        let filter = FilterState {
            continents: ContinentSelection::Only(BTreeSet::new()),
            ..FilterState::for_dataset(&ds)
        };
        assert_eq!(apply_filters(&ds, &filter), ds.rows());
    }

    #[test]
    fn europe_within_score_window_keeps_order() {
        let ds = three_countries();
        let filter = FilterState {
            continents: ContinentSelection::Only(BTreeSet::from(["Europe".to_string()])),
            score_range: ScoreRange::new(7.0, 8.0),
            ..FilterState::for_dataset(&ds)
        };
        assert_eq!(countries(&apply_filters(&ds, &filter)), ["Finland", "Denmark"]);
    }

    #[test]
    fn score_range_is_inclusive_at_both_ends() {
        let ds = twenty_countries();
        let (lo, hi) = (ds.records()[3].score, ds.records()[9].score);
        let filter = FilterState {
            score_range: ScoreRange::new(lo, hi),
            ..FilterState::for_dataset(&ds)
        };
        let out = apply_filters(&ds, &filter);

        assert!(out.iter().all(|r| lo <= r.score && r.score <= hi));
        let expected = ds
            .records()
            .iter()
            .filter(|r| lo <= r.score && r.score <= hi)
            .count();
        assert_eq!(out.len(), expected);
        assert!(out.iter().any(|r| r.score == lo));
        assert!(out.iter().any(|r| r.score == hi));
    }

    #[test]
    fn top10_with_few_candidates_returns_all() {
        let ds = three_countries();
        let filter = FilterState {
            top10_only: true,
            ..FilterState::for_dataset(&ds)
        };
        assert_eq!(apply_filters(&ds, &filter), ds.rows());
    }

    #[test]
    fn top10_keeps_ten_smallest_ranks() {
        let ds = twenty_countries();
        let filter = FilterState {
            top10_only: true,
            ..FilterState::for_dataset(&ds)
        };
        let out = apply_filters(&ds, &filter);
        assert_eq!(out.len(), TOP_N);

        let mut ranks: Vec<u32> = ds.records().iter().map(|r| r.overall_rank).collect();
        ranks.sort_unstable();
        let eleventh = ranks[TOP_N];
        assert!(out.iter().all(|r| r.overall_rank <= eleventh));
        assert!(out.iter().all(|r| r.overall_rank <= 10));
    }

    #[test]
    fn top10_applies_after_continent_filter() {
        let ds = twenty_countries();
        let filter = FilterState {
            continents: ContinentSelection::Only(BTreeSet::from(["Asia".to_string()])),
            top10_only: true,
            ..FilterState::for_dataset(&ds)
        };
        let out = apply_filters(&ds, &filter);
        assert_eq!(out.len(), 10);
        assert!(out.iter().all(|r| r.continent == "Asia"));
    }

    #[test]
    fn base_filters_ignore_top10() {
        let ds = twenty_countries();
        let filter = FilterState {
            top10_only: true,
            ..FilterState::for_dataset(&ds)
        };
        assert_eq!(apply_base_filters(&ds, &filter).len(), 20);
        assert_eq!(apply_filters(&ds, &filter).len(), 10);
    }

    #[test]
    fn unknown_continent_yields_empty_result() {
        let ds = three_countries();
        let filter = FilterState {
            continents: ContinentSelection::Only(BTreeSet::from(["Antarctica".to_string()])),
            ..FilterState::for_dataset(&ds)
        };
        assert!(apply_filters(&ds, &filter).is_empty());
    }

    #[test]
    fn score_range_normalises_and_clamps() {
        let r = ScoreRange::new(8.0, 2.0);
        assert_eq!((r.min, r.max), (2.0, 8.0));
        let c = ScoreRange::new(1.0, 9.5).clamped((2.85, 7.77));
        assert_eq!((c.min, c.max), (2.85, 7.77));
    }
}
