use crate::charts::{views, View, ViewKind};
use crate::data::filter::{apply_base_filters, apply_filters, FilterState};
use crate::data::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// One full pipeline run: dataset + control snapshot → table + eight views
// ---------------------------------------------------------------------------

/// Everything the central panel shows for one control snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    /// Rows of the data table (the primary derivation).
    pub table: Vec<Record>,
    /// Row count of the continent + score derivation.
    pub secondary_len: usize,
    pub views: Vec<View>,
}

impl Dashboard {
    /// Recompute every view from scratch.
    ///
    /// Two derivations coexist: `primary_filtered` (continent,
    /// score, top-10) feeds the table, the score bars and the scatter plot;
    /// `secondary_filtered` (continent, score) feeds the GDP bars, the map,
    /// the radar and the heatmap. The pie always sees every row, and the
    /// comparison view sees every row restricted to its own selection.
    pub fn build(dataset: &Dataset, filter: &FilterState) -> Self {
        let all_rows = dataset.rows();
        let primary_filtered = apply_filters(dataset, filter);
        let secondary_filtered = apply_base_filters(dataset, filter);

        log::debug!(
            "rebuilding dashboard: {} rows, {} primary, {} secondary",
            all_rows.len(),
            primary_filtered.len(),
            secondary_filtered.len()
        );

        let views = ViewKind::ALL
            .iter()
            .map(|&kind| {
                let result = match kind {
                    ViewKind::ScoreBar => views::score_bar(&primary_filtered),
                    ViewKind::ContinentPie => views::continent_pie(&all_rows),
                    ViewKind::LifeExpectancyScatter => {
                        views::life_expectancy_scatter(&primary_filtered)
                    }
                    ViewKind::GdpBar => views::gdp_bar(&secondary_filtered),
                    ViewKind::GenerosityMap => views::generosity_map(&secondary_filtered),
                    ViewKind::IndicatorComparison => {
                        views::indicator_comparison(&all_rows, &filter.comparison_countries)
                    }
                    ViewKind::IndicatorRadar => {
                        views::indicator_radar(&secondary_filtered, &filter.radar_countries)
                    }
                    ViewKind::CorrelationHeatmap => {
                        views::correlation_heatmap(&secondary_filtered)
                    }
                };
                View::from_result(kind, result)
            })
            .collect();

        Dashboard {
            table: primary_filtered.into_iter().cloned().collect(),
            secondary_len: secondary_filtered.len(),
            views,
        }
    }

    pub fn view(&self, kind: ViewKind) -> Option<&View> {
        self.views.iter().find(|v| v.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::charts::{ChartSpec, RenderError, ViewContent};
    use crate::data::filter::{ContinentSelection, ScoreRange};
    use crate::data::model::tests::{record, three_countries};

    #[test]
    fn views_come_in_fixed_order() {
        let ds = three_countries();
        let dash = Dashboard::build(&ds, &FilterState::for_dataset(&ds));
        let kinds: Vec<ViewKind> = dash.views.iter().map(|v| v.kind).collect();
        assert_eq!(kinds, ViewKind::ALL.to_vec());
        assert_eq!(dash.table.len(), 3);
    }

    #[test]
    fn pie_ignores_filters() {
        let ds = three_countries();
        let filter = FilterState {
            continents: ContinentSelection::Only(BTreeSet::from(["South America".to_string()])),
            ..FilterState::for_dataset(&ds)
        };
        let dash = Dashboard::build(&ds, &filter);
        assert_eq!(dash.table.len(), 1);

        let pie = dash.view(ViewKind::ContinentPie).and_then(|v| v.content.chart());
        let Some(ChartSpec::Pie(spec)) = pie else {
            panic!("expected a pie chart");
        };
        assert_eq!(spec.slices.len(), 2);
        let total: f64 = spec.slices.iter().map(|s| s.value).sum();
        let overall: f64 = ds.records().iter().map(|r| r.score).sum();
        assert!((total - overall).abs() < 1e-9);
    }

    #[test]
    fn top10_only_touches_the_primary_derivation() {
        let records = (1..=15u32)
            .map(|rank| record(&format!("C{rank}"), "Europe", rank, 8.0 - rank as f64 * 0.1))
            .collect();
        let ds = Dataset::from_records(records);
        let filter = FilterState {
            top10_only: true,
            ..FilterState::for_dataset(&ds)
        };
        let dash = Dashboard::build(&ds, &filter);
        assert_eq!(dash.table.len(), 10);
        assert_eq!(dash.secondary_len, 15);

        let Some(ChartSpec::Bar(gdp)) = dash.view(ViewKind::GdpBar).and_then(|v| v.content.chart())
        else {
            panic!("expected GDP bars");
        };
        assert_eq!(gdp.bars.len(), 15);
    }

    #[test]
    fn country_selections_stay_independent() {
        let ds = three_countries();
        let filter = FilterState {
            comparison_countries: BTreeSet::from(["Brazil".to_string()]),
            ..FilterState::for_dataset(&ds)
        };
        let dash = Dashboard::build(&ds, &filter);

        let comparison = dash.view(ViewKind::IndicatorComparison).map(|v| &v.content);
        assert!(matches!(comparison, Some(ViewContent::Chart(ChartSpec::GroupedBar(_)))));
        let radar = dash.view(ViewKind::IndicatorRadar).map(|v| &v.content);
        assert_eq!(radar, Some(&ViewContent::placeholder(ViewKind::IndicatorRadar)));
    }

    #[test]
    fn comparison_ignores_continent_and_score_filters() {
        let ds = three_countries();
        let filter = FilterState {
            continents: ContinentSelection::Only(BTreeSet::from(["Europe".to_string()])),
            score_range: ScoreRange::new(7.0, 8.0),
            comparison_countries: BTreeSet::from(["Brazil".to_string()]),
            ..FilterState::for_dataset(&ds)
        };
        let dash = Dashboard::build(&ds, &filter);
        let content = dash.view(ViewKind::IndicatorComparison).and_then(|v| v.content.chart());
        let Some(ChartSpec::GroupedBar(spec)) = content else {
            panic!("expected grouped bars");
        };
        assert_eq!(spec.groups[0].name, "Brazil");
    }

    #[test]
    fn one_failing_view_leaves_the_rest() {
        // A single surviving row breaks the correlation view only.
        let ds = three_countries();
        let filter = FilterState {
            score_range: ScoreRange::new(6.0, 6.5),
            ..FilterState::for_dataset(&ds)
        };
        let dash = Dashboard::build(&ds, &filter);

        let heatmap = dash.view(ViewKind::CorrelationHeatmap).map(|v| &v.content);
        assert_eq!(
            heatmap,
            Some(&ViewContent::Failed(RenderError::InsufficientRows { needed: 2, found: 1 }))
        );
        let charts = dash.views.iter().filter(|v| v.content.chart().is_some()).count();
        assert_eq!(charts, 5);
    }

    #[test]
    fn empty_filter_result_renders_placeholders() {
        let ds = three_countries();
        let filter = FilterState {
            continents: ContinentSelection::Only(BTreeSet::from(["Oceania".to_string()])),
            ..FilterState::for_dataset(&ds)
        };
        let dash = Dashboard::build(&ds, &filter);
        assert!(dash.table.is_empty());
        for kind in [
            ViewKind::ScoreBar,
            ViewKind::LifeExpectancyScatter,
            ViewKind::GdpBar,
            ViewKind::GenerosityMap,
            ViewKind::CorrelationHeatmap,
        ] {
            assert_eq!(
                dash.view(kind).map(|v| &v.content),
                Some(&ViewContent::placeholder(kind))
            );
        }
    }
}
