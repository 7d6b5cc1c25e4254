use std::collections::BTreeSet;

use super::spec::*;
use super::{ensure_finite, ChartSpec, RenderError, ViewContent, ViewKind};
use crate::color::ContinuousScale;
use crate::data::aggregate::{correlation_matrix, mean_by_country, melt_indicators, sum_by_continent};
use crate::data::model::{Indicator, Record};

const LABEL_ANGLE_DEG: f32 = 45.0;
const GDP_BAR_RGB: [u8; 3] = [0xff, 0xa5, 0x00];
const PIE_START_ANGLE_DEG: f64 = 140.0;

/// Shown when radar countries are selected but none survive the filters.
pub const RADAR_FILTERED_OUT: &str =
    "None of the selected countries pass the current continent and score filters.";

type ViewResult = Result<ViewContent, RenderError>;

// ---------------------------------------------------------------------------
// 1. Score per country
// ---------------------------------------------------------------------------

pub fn score_bar(primary: &[&Record]) -> ViewResult {
    if primary.is_empty() {
        return Ok(ViewContent::placeholder(ViewKind::ScoreBar));
    }
    let bars = primary
        .iter()
        .map(|r| Bar {
            label: r.country.clone(),
            value: r.score,
        })
        .collect();

    Ok(ViewContent::Chart(ChartSpec::Bar(BarChartSpec {
        x_label: "Country".to_string(),
        y_label: "Happiness Score".to_string(),
        bars,
        fill: BarFill::Gradient(ContinuousScale::Viridis),
        label_angle_deg: LABEL_ANGLE_DEG,
    })))
}

// ---------------------------------------------------------------------------
// 2. Continent share of the global score total
// ---------------------------------------------------------------------------

/// Always aggregates the unfiltered dataset: the pie shows global
/// composition, not the composition of the current selection.
pub fn continent_pie(all_rows: &[&Record]) -> ViewResult {
    if all_rows.is_empty() {
        return Ok(ViewContent::placeholder(ViewKind::ContinentPie));
    }
    let totals = sum_by_continent(all_rows);
    let grand_total = ensure_finite(totals.values().sum(), || "total score".to_string())?;
    if grand_total <= 0.0 {
        return Err(RenderError::DegenerateTotal);
    }

    let slices = totals
        .into_iter()
        .map(|(label, value)| {
            let value = ensure_finite(value, || format!("score total of {label}"))?;
            Ok(PieSlice {
                fraction: value / grand_total,
                label,
                value,
            })
        })
        .collect::<Result<Vec<_>, RenderError>>()?;

    Ok(ViewContent::Chart(ChartSpec::Pie(PieChartSpec {
        slices,
        start_angle_deg: PIE_START_ANGLE_DEG,
    })))
}

// ---------------------------------------------------------------------------
// 3. Life expectancy vs score
// ---------------------------------------------------------------------------

pub fn life_expectancy_scatter(primary: &[&Record]) -> ViewResult {
    if primary.is_empty() {
        return Ok(ViewContent::placeholder(ViewKind::LifeExpectancyScatter));
    }

    let mut series: Vec<ScatterSeries> = Vec::new();
    for r in primary {
        let point = ScatterPoint {
            label: r.country.clone(),
            x: r.healthy_life_expectancy,
            y: r.score,
        };
        match series.iter_mut().find(|s| s.name == r.continent) {
            Some(s) => s.points.push(point),
            None => series.push(ScatterSeries {
                name: r.continent.clone(),
                points: vec![point],
            }),
        }
    }

    Ok(ViewContent::Chart(ChartSpec::Scatter(ScatterSpec {
        x_label: "Healthy Life Expectancy".to_string(),
        y_label: "Happiness Score".to_string(),
        series,
    })))
}

// ---------------------------------------------------------------------------
// 4. Mean GDP per capita
// ---------------------------------------------------------------------------

pub fn gdp_bar(secondary: &[&Record]) -> ViewResult {
    if secondary.is_empty() {
        return Ok(ViewContent::placeholder(ViewKind::GdpBar));
    }
    let bars = mean_by_country(secondary, Indicator::GdpPerCapita)
        .into_iter()
        .map(|(label, value)| {
            let value = ensure_finite(value, || format!("mean GDP of {label}"))?;
            Ok(Bar { label, value })
        })
        .collect::<Result<Vec<_>, RenderError>>()?;

    Ok(ViewContent::Chart(ChartSpec::Bar(BarChartSpec {
        x_label: "Country".to_string(),
        y_label: "Average GDP per Capita".to_string(),
        bars,
        fill: BarFill::Solid(GDP_BAR_RGB),
        label_angle_deg: LABEL_ANGLE_DEG,
    })))
}

// ---------------------------------------------------------------------------
// 5. Generosity map
// ---------------------------------------------------------------------------

pub fn generosity_map(secondary: &[&Record]) -> ViewResult {
    if secondary.is_empty() {
        return Ok(ViewContent::placeholder(ViewKind::GenerosityMap));
    }
    let metric = Indicator::Generosity;
    let regions: Vec<Region> = secondary
        .iter()
        .map(|r| Region {
            country: r.country.clone(),
            continent: r.continent.clone(),
            value: metric.value(r),
        })
        .collect();

    let domain = regions.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
        (lo.min(r.value), hi.max(r.value))
    });

    Ok(ViewContent::Chart(ChartSpec::Choropleth(ChoroplethSpec {
        metric,
        scale: ContinuousScale::Plasma,
        domain,
        regions,
    })))
}

// ---------------------------------------------------------------------------
// 6. Indicator comparison (grouped bars)
// ---------------------------------------------------------------------------

/// Compares the selected countries over the whole dataset; no sidebar
/// filter other than the selection itself applies.
pub fn indicator_comparison(all_rows: &[&Record], selected: &BTreeSet<String>) -> ViewResult {
    if selected.is_empty() {
        return Ok(ViewContent::placeholder(ViewKind::IndicatorComparison));
    }
    let chosen: Vec<&Record> = all_rows
        .iter()
        .copied()
        .filter(|r| selected.contains(&r.country))
        .collect();
    if chosen.is_empty() {
        return Ok(ViewContent::placeholder(ViewKind::IndicatorComparison));
    }

    let indicators = Indicator::ALL.to_vec();
    let groups = group_melted(&chosen, &indicators)
        .into_iter()
        .map(|(name, values)| BarGroup { name, values })
        .collect();

    Ok(ViewContent::Chart(ChartSpec::GroupedBar(GroupedBarSpec {
        title: "Comparison of Key Indicators".to_string(),
        indicators,
        groups,
        label_angle_deg: LABEL_ANGLE_DEG,
    })))
}

// ---------------------------------------------------------------------------
// 7. Indicator radar
// ---------------------------------------------------------------------------

pub fn indicator_radar(secondary: &[&Record], selected: &BTreeSet<String>) -> ViewResult {
    if selected.is_empty() {
        return Ok(ViewContent::placeholder(ViewKind::IndicatorRadar));
    }
    let chosen: Vec<&Record> = secondary
        .iter()
        .copied()
        .filter(|r| selected.contains(&r.country))
        .collect();
    if chosen.is_empty() {
        return Ok(ViewContent::Placeholder(RADAR_FILTERED_OUT.to_string()));
    }

    let axes = Indicator::ALL.to_vec();
    let traces = group_melted(&chosen, &axes)
        .into_iter()
        .map(|(name, values)| RadarTrace { name, values })
        .collect();

    Ok(ViewContent::Chart(ChartSpec::Radar(RadarSpec {
        axes,
        traces,
        closed: true,
    })))
}

/// Melt `rows` to long form and regroup per country, averaging duplicate
/// (country, indicator) pairs. Countries keep their first-appearance order.
fn group_melted(rows: &[&Record], indicators: &[Indicator]) -> Vec<(String, Vec<f64>)> {
    let long = melt_indicators(rows, |r| r.country.as_str(), indicators);

    let mut groups: Vec<(String, Vec<(f64, usize)>)> = Vec::new();
    for row in long {
        let slot = indicators
            .iter()
            .position(|i| *i == row.indicator)
            .unwrap_or_default();
        let idx = match groups.iter().position(|(name, _)| *name == row.id) {
            Some(idx) => idx,
            None => {
                groups.push((row.id, vec![(0.0, 0); indicators.len()]));
                groups.len() - 1
            }
        };
        let cell = &mut groups[idx].1[slot];
        cell.0 += row.value;
        cell.1 += 1;
    }

    groups
        .into_iter()
        .map(|(name, cells)| {
            let values = cells
                .into_iter()
                .map(|(sum, n)| if n == 0 { 0.0 } else { sum / n as f64 })
                .collect();
            (name, values)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// 8. Correlation heatmap
// ---------------------------------------------------------------------------

pub fn correlation_heatmap(secondary: &[&Record]) -> ViewResult {
    if secondary.is_empty() {
        return Ok(ViewContent::placeholder(ViewKind::CorrelationHeatmap));
    }
    let matrix = correlation_matrix(secondary, &Indicator::ALL)?;

    Ok(ViewContent::Chart(ChartSpec::Heatmap(HeatmapSpec {
        labels: matrix.labels,
        cells: matrix.cells,
        scale: ContinuousScale::Coolwarm,
        domain: (-1.0, 1.0),
        precision: 2,
    })))
}
