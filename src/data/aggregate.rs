use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::model::{Indicator, Record};
use crate::charts::RenderError;

// ---------------------------------------------------------------------------
// Group-by reductions
// ---------------------------------------------------------------------------

/// Total score per continent, keyed in sorted continent order.
pub fn sum_by_continent(rows: &[&Record]) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for r in rows {
        *totals.entry(r.continent.clone()).or_default() += r.score;
    }
    totals
}

/// Mean of `metric` per country, highest first.
///
/// Countries tie-break alphabetically, the order they are grouped in.
pub fn mean_by_country(rows: &[&Record], metric: Indicator) -> Vec<(String, f64)> {
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for r in rows {
        let entry = groups.entry(r.country.as_str()).or_default();
        entry.0 += metric.value(r);
        entry.1 += 1;
    }

    let mut means: Vec<(String, f64)> = groups
        .into_iter()
        .map(|(country, (sum, n))| (country.to_string(), sum / n as f64))
        .collect();
    means.sort_by(|a, b| b.1.total_cmp(&a.1));
    means
}

/// The `n` rows with the smallest key.
///
/// Ties resolve in favour of earlier rows, and the survivors keep their
/// original relative order. With `n` or fewer rows the input comes back
/// unchanged.
pub fn smallest_by<'a, K, F>(rows: &[&'a Record], n: usize, key: F) -> Vec<&'a Record>
where
    K: PartialOrd,
    F: Fn(&Record) -> K,
{
    if rows.len() <= n {
        return rows.to_vec();
    }

    let mut order: Vec<usize> = (0..rows.len()).collect();
    // `sort_by` is stable, so equal keys stay in row order.
    order.sort_by(|&a, &b| {
        key(rows[a])
            .partial_cmp(&key(rows[b]))
            .unwrap_or(Ordering::Equal)
    });
    order.truncate(n);
    order.sort_unstable();
    order.into_iter().map(|i| rows[i]).collect()
}

// ---------------------------------------------------------------------------
// Melt: wide → long
// ---------------------------------------------------------------------------

/// One (record, indicator) pair of a melted table.
#[derive(Debug, Clone, PartialEq)]
pub struct MeltedRow {
    pub id: String,
    pub indicator: Indicator,
    pub value: f64,
}

/// Reshape `rows` into one output row per (record, indicator) pair.
///
/// Output is grouped by indicator in `indicators` order, records in input
/// order within each group.
pub fn melt_indicators<F>(rows: &[&Record], id: F, indicators: &[Indicator]) -> Vec<MeltedRow>
where
    F: Fn(&Record) -> &str,
{
    indicators
        .iter()
        .flat_map(|&indicator| {
            let id = &id;
            rows.iter().map(move |r| MeltedRow {
                id: id(*r).to_string(),
                indicator,
                value: indicator.value(r),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pairwise Pearson coefficients; symmetric, indexed by `labels` on both axes.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<Indicator>,
    /// `None` where a column is constant and the coefficient is undefined.
    /// The diagonal is always `Some(1.0)`.
    pub cells: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.cells.get(i)?.get(j).copied().flatten()
    }
}

/// Compute the Pearson correlation matrix of `columns` over `rows`.
pub fn correlation_matrix(
    rows: &[&Record],
    columns: &[Indicator],
) -> Result<CorrelationMatrix, RenderError> {
    if rows.len() < 2 {
        return Err(RenderError::InsufficientRows {
            needed: 2,
            found: rows.len(),
        });
    }

    let series: Vec<Vec<f64>> = columns
        .iter()
        .map(|ind| rows.iter().map(|r| ind.value(r)).collect())
        .collect();

    let n = columns.len();
    let mut cells = vec![vec![None; n]; n];
    for i in 0..n {
        cells[i][i] = Some(1.0);
        for j in (i + 1)..n {
            let r = pearson(&series[i], &series[j]);
            cells[i][j] = r;
            cells[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        labels: columns.to_vec(),
        cells,
    })
}

fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let cov: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - mean_a) * (y - mean_b))
        .sum();
    let var_a: f64 = a.iter().map(|x| (x - mean_a).powi(2)).sum();
    let var_b: f64 = b.iter().map(|y| (y - mean_b).powi(2)).sum();

    if var_a == 0.0 || var_b == 0.0 {
        return None;
    }
    let r = cov / (var_a.sqrt() * var_b.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::{record, three_countries};
    use crate::data::model::Dataset;

    fn varied() -> Dataset {
        let mut records = Vec::new();
        for (i, (country, continent)) in [
            ("Finland", "Europe"),
            ("Kenya", "Africa"),
            ("Japan", "Asia"),
            ("Chile", "South America"),
            ("Norway", "Europe"),
            ("Ghana", "Africa"),
        ]
        .into_iter()
        .enumerate()
        {
            let mut r = record(country, continent, i as u32 + 1, 7.5 - i as f64 * 0.6);
            r.social_support = 1.0 + ((i * 5) % 7) as f64 / 10.0;
            r.freedom = 0.2 + ((i * 3) % 4) as f64 / 10.0;
            r.corruption = 0.05 * (i % 3) as f64;
            records.push(r);
        }
        Dataset::from_records(records)
    }

    #[test]
    fn continent_totals_match_overall_total() {
        let ds = varied();
        let totals = sum_by_continent(&ds.rows());
        let overall: f64 = ds.records().iter().map(|r| r.score).sum();
        let summed: f64 = totals.values().sum();
        assert!((overall - summed).abs() < 1e-9);
        assert_eq!(
            totals.keys().collect::<Vec<_>>(),
            ["Africa", "Asia", "Europe", "South America"]
        );
    }

    #[test]
    fn gdp_means_sorted_descending() {
        let ds = three_countries();
        let means = mean_by_country(&ds.rows(), Indicator::GdpPerCapita);
        let names: Vec<&str> = means.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(names, ["Finland", "Denmark", "Brazil"]);
        assert!(means.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn duplicate_countries_are_averaged() {
        let mut a = record("Chad", "Africa", 1, 4.0);
        let mut b = record("Chad", "Africa", 2, 4.0);
        a.gdp_per_capita = 0.2;
        b.gdp_per_capita = 0.4;
        let ds = Dataset::from_records(vec![a, b]);
        let means = mean_by_country(&ds.rows(), Indicator::GdpPerCapita);
        assert_eq!(means.len(), 1);
        assert!((means[0].1 - 0.3).abs() < 1e-12);
    }

    #[test]
    fn melt_single_record_yields_seven_rows() {
        let ds = Dataset::from_records(vec![record("Iceland", "Europe", 4, 7.494)]);
        let long = melt_indicators(&ds.rows(), |r| r.country.as_str(), &Indicator::ALL);

        assert_eq!(long.len(), 7);
        assert!(long.iter().all(|m| m.id == "Iceland"));
        for (row, ind) in long.iter().zip(Indicator::ALL) {
            assert_eq!(row.indicator, ind);
            assert_eq!(row.value, ind.value(&ds.records()[0]));
        }
    }

    #[test]
    fn melt_groups_by_indicator() {
        let ds = three_countries();
        let long = melt_indicators(
            &ds.rows(),
            |r| r.country.as_str(),
            &[Indicator::Score, Indicator::Generosity],
        );
        let ids: Vec<&str> = long.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["Finland", "Denmark", "Brazil", "Finland", "Denmark", "Brazil"]);
        assert_eq!(long[3].indicator, Indicator::Generosity);
    }

    #[test]
    fn correlation_diagonal_and_symmetry() {
        let ds = varied();
        let m = correlation_matrix(&ds.rows(), &Indicator::ALL).unwrap();
        for i in 0..7 {
            assert_eq!(m.get(i, i), Some(1.0));
            for j in 0..7 {
                match (m.get(i, j), m.get(j, i)) {
                    (Some(a), Some(b)) => {
                        assert!((a - b).abs() < 1e-9);
                        assert!((-1.0..=1.0).contains(&a));
                    }
                    (None, None) => {}
                    other => panic!("asymmetric cell ({i}, {j}): {other:?}"),
                }
            }
        }
    }

    #[test]
    fn linear_columns_correlate_perfectly() {
        // In the fixture, GDP and life expectancy are both linear in score.
        let ds = varied();
        let m = correlation_matrix(
            &ds.rows(),
            &[Indicator::Score, Indicator::GdpPerCapita, Indicator::HealthyLifeExpectancy],
        )
        .unwrap();
        assert!((m.get(0, 1).unwrap() - 1.0).abs() < 1e-9);
        assert!((m.get(1, 2).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn constant_column_is_undefined_off_diagonal() {
        let ds = three_countries();
        // social_support is constant in the three-country fixture
        let m = correlation_matrix(&ds.rows(), &[Indicator::Score, Indicator::SocialSupport])
            .unwrap();
        assert_eq!(m.get(0, 1), None);
        assert_eq!(m.get(1, 1), Some(1.0));
    }

    #[test]
    fn correlation_needs_two_rows() {
        let ds = Dataset::from_records(vec![record("Iceland", "Europe", 4, 7.494)]);
        let err = correlation_matrix(&ds.rows(), &Indicator::ALL).unwrap_err();
        assert!(matches!(err, RenderError::InsufficientRows { needed: 2, found: 1 }));
    }

    #[test]
    fn smallest_by_breaks_ties_by_row_order() {
        let ds = Dataset::from_records(vec![
            record("A", "X", 5, 1.0),
            record("B", "X", 2, 1.0),
            record("C", "X", 2, 1.0),
            record("D", "X", 1, 1.0),
        ]);
        let out = smallest_by(&ds.rows(), 2, |r| r.overall_rank);
        let names: Vec<&str> = out.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(names, ["B", "D"]);

        let out = smallest_by(&ds.rows(), 3, |r| r.overall_rank);
        let names: Vec<&str> = out.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(names, ["B", "C", "D"]);
    }
}
