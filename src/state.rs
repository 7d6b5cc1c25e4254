use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::color::ColorMap;
use crate::dashboard::Dashboard;
use crate::data::filter::{ContinentSelection, FilterState, ScoreRange};
use crate::data::loader::load_file;
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which of the two independent country pickers a change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountryPicker {
    Comparison,
    Radar,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until a file loads successfully).
    pub dataset: Option<Arc<Dataset>>,

    /// Path the current dataset was read from.
    pub source_path: Option<PathBuf>,

    /// Live sidebar controls; cloned into a snapshot for every rerun.
    pub filters: FilterState,

    /// Output of the last rerun.
    pub dashboard: Option<Dashboard>,

    /// Snapshot the cached dashboard was built from.
    built_from: Option<FilterState>,

    /// Stable continent colours, shared by every view.
    pub continent_colors: Option<ColorMap>,

    /// Fatal load failure shown instead of the dashboard.
    pub load_error: Option<String>,

    /// Search text of the two country pickers.
    pub comparison_search: String,
    pub radar_search: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            source_path: None,
            filters: FilterState {
                continents: ContinentSelection::All,
                score_range: ScoreRange::new(0.0, 0.0),
                top10_only: false,
                comparison_countries: BTreeSet::new(),
                radar_countries: BTreeSet::new(),
            },
            dashboard: None,
            built_from: None,
            continent_colors: None,
            load_error: None,
            comparison_search: String::new(),
            radar_search: String::new(),
        }
    }
}

impl AppState {
    /// Read `path` and install it, or record the failure.
    pub fn load(&mut self, path: &Path) {
        match load_file(path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} countries from {} (continents {:?}, score range {:?})",
                    dataset.len(),
                    path.display(),
                    dataset.continents(),
                    dataset.score_bounds()
                );
                self.set_dataset(dataset, Some(path.to_path_buf()));
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                self.load_error = Some(format!("Failed to load {}: {e:#}", path.display()));
                self.dataset = None;
                self.dashboard = None;
                self.built_from = None;
            }
        }
    }

    /// Ingest a newly loaded dataset and reset every control to its default.
    pub fn set_dataset(&mut self, dataset: Dataset, source: Option<PathBuf>) {
        self.filters = FilterState::for_dataset(&dataset);
        self.continent_colors = Some(ColorMap::new(dataset.continents()));
        self.dataset = Some(Arc::new(dataset));
        self.source_path = source;
        self.dashboard = None;
        self.built_from = None;
        self.load_error = None;
        self.comparison_search.clear();
        self.radar_search.clear();
    }

    /// Rerun the pipeline if any control changed since the last run.
    pub fn rerun(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        if self.built_from.as_ref() == Some(&self.filters) && self.dashboard.is_some() {
            return;
        }
        let snapshot = self.filters.clone();
        self.dashboard = Some(Dashboard::build(dataset, &snapshot));
        self.built_from = Some(snapshot);
    }

    // -- Continent selector --

    pub fn select_all_continents(&mut self) {
        self.filters.continents = ContinentSelection::All;
    }

    /// Toggle one continent. Picking a continent while "All" is active
    /// narrows the selection to just that continent.
    pub fn toggle_continent(&mut self, continent: &str) {
        match &mut self.filters.continents {
            ContinentSelection::All => {
                self.filters.continents =
                    ContinentSelection::Only(BTreeSet::from([continent.to_string()]));
            }
            ContinentSelection::Only(set) => {
                if !set.remove(continent) {
                    set.insert(continent.to_string());
                }
            }
        }
    }

    pub fn continent_checked(&self, continent: &str) -> bool {
        match &self.filters.continents {
            ContinentSelection::All => false,
            ContinentSelection::Only(set) => set.contains(continent),
        }
    }

    // -- Score slider --

    /// Move one end of the score range; the other end follows if crossed.
    pub fn set_score_min(&mut self, value: f64) {
        let bounds = self.score_bounds();
        let max = self.filters.score_range.max.max(value);
        self.filters.score_range = ScoreRange::new(value, max).clamped(bounds);
    }

    pub fn set_score_max(&mut self, value: f64) {
        let bounds = self.score_bounds();
        let min = self.filters.score_range.min.min(value);
        self.filters.score_range = ScoreRange::new(min, value).clamped(bounds);
    }

    pub fn score_bounds(&self) -> (f64, f64) {
        self.dataset
            .as_ref()
            .map(|ds| ds.score_bounds())
            .unwrap_or((0.0, 0.0))
    }

    // -- Country pickers --

    pub fn countries_mut(&mut self, picker: CountryPicker) -> &mut BTreeSet<String> {
        match picker {
            CountryPicker::Comparison => &mut self.filters.comparison_countries,
            CountryPicker::Radar => &mut self.filters.radar_countries,
        }
    }

    pub fn toggle_country(&mut self, picker: CountryPicker, country: &str) {
        let set = self.countries_mut(picker);
        if !set.remove(country) {
            set.insert(country.to_string());
        }
    }

    pub fn clear_countries(&mut self, picker: CountryPicker) {
        self.countries_mut(picker).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::three_countries;

    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.set_dataset(three_countries(), None);
        state
    }

    #[test]
    fn continent_toggle_narrows_from_all() {
        let mut state = loaded();
        state.toggle_continent("Europe");
        assert!(state.continent_checked("Europe"));
        assert!(!state.filters.continents.is_all());

        state.toggle_continent("Europe");
        assert!(state.filters.continents.is_all());

        state.toggle_continent("Europe");
        state.select_all_continents();
        assert_eq!(state.filters.continents, ContinentSelection::All);
    }

    #[test]
    fn score_ends_stay_ordered_and_in_bounds() {
        let mut state = loaded();
        state.set_score_max(7.0);
        state.set_score_min(7.5);
        let r = state.filters.score_range;
        assert_eq!((r.min, r.max), (7.5, 7.5));

        state.set_score_max(99.0);
        assert_eq!(state.filters.score_range.max, 7.8);
    }

    #[test]
    fn pickers_are_independent() {
        let mut state = loaded();
        state.toggle_country(CountryPicker::Comparison, "Finland");
        state.toggle_country(CountryPicker::Radar, "Brazil");
        assert_eq!(
            state.filters.comparison_countries,
            BTreeSet::from(["Finland".to_string()])
        );
        assert_eq!(
            state.filters.radar_countries,
            BTreeSet::from(["Brazil".to_string()])
        );
        state.clear_countries(CountryPicker::Radar);
        assert!(state.filters.radar_countries.is_empty());
        assert_eq!(state.filters.comparison_countries.len(), 1);
    }

    #[test]
    fn rerun_rebuilds_only_on_change() {
        let mut state = loaded();
        state.rerun();
        assert_eq!(state.dashboard.as_ref().map(|d| d.table.len()), Some(3));

        state.toggle_continent("South America");
        state.rerun();
        assert_eq!(state.dashboard.as_ref().map(|d| d.table.len()), Some(1));
        assert_eq!(state.built_from.as_ref(), Some(&state.filters));
    }

    #[test]
    fn failed_load_clears_dataset() {
        let mut state = loaded();
        state.load(Path::new("/no/such/happiness.csv"));
        assert!(state.dataset.is_none());
        assert!(state
            .load_error
            .as_deref()
            .is_some_and(|e| e.contains("not found")));
        state.rerun();
        assert!(state.dashboard.is_none());
    }
}
