use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

const CSV_PATH: &str = "happiness_converted.csv";
const PARQUET_PATH: &str = "happiness_converted.parquet";

const COUNTRIES: [(&str, &str); 40] = [
    ("Finland", "Europe"),
    ("Denmark", "Europe"),
    ("Norway", "Europe"),
    ("Iceland", "Europe"),
    ("Netherlands", "Europe"),
    ("Switzerland", "Europe"),
    ("Sweden", "Europe"),
    ("Austria", "Europe"),
    ("Germany", "Europe"),
    ("Spain", "Europe"),
    ("Poland", "Europe"),
    ("Greece", "Europe"),
    ("Canada", "North America"),
    ("United States", "North America"),
    ("Mexico", "North America"),
    ("Costa Rica", "North America"),
    ("Guatemala", "North America"),
    ("Brazil", "South America"),
    ("Chile", "South America"),
    ("Argentina", "South America"),
    ("Colombia", "South America"),
    ("Peru", "South America"),
    ("Australia", "Oceania"),
    ("New Zealand", "Oceania"),
    ("Israel", "Asia"),
    ("Japan", "Asia"),
    ("South Korea", "Asia"),
    ("Thailand", "Asia"),
    ("Vietnam", "Asia"),
    ("India", "Asia"),
    ("Nepal", "Asia"),
    ("Indonesia", "Asia"),
    ("Mauritius", "Africa"),
    ("Ghana", "Africa"),
    ("Nigeria", "Africa"),
    ("Kenya", "Africa"),
    ("Ethiopia", "Africa"),
    ("Uganda", "Africa"),
    ("Malawi", "Africa"),
    ("Rwanda", "Africa"),
];

/// One output row, with the column names the dashboard expects.
#[derive(Debug, Serialize)]
struct Row {
    #[serde(rename = "Overall rank")]
    overall_rank: i64,
    #[serde(rename = "Country or region")]
    country: String,
    #[serde(rename = "Continent")]
    continent: String,
    #[serde(rename = "Score")]
    score: f64,
    #[serde(rename = "GDP per capita")]
    gdp_per_capita: f64,
    #[serde(rename = "Social support")]
    social_support: f64,
    #[serde(rename = "Healthy life expectancy")]
    healthy_life_expectancy: f64,
    #[serde(rename = "Freedom to make life choices")]
    freedom: f64,
    #[serde(rename = "Generosity")]
    generosity: f64,
    #[serde(rename = "Perceptions of corruption")]
    corruption: f64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// Indicators loosely track the score, the way they do in the real report.
fn generate_rows(rng: &mut SimpleRng) -> Vec<Row> {
    let n = COUNTRIES.len() as f64;
    let mut rows: Vec<Row> = COUNTRIES
        .iter()
        .enumerate()
        .map(|(i, &(country, continent))| {
            let base = 7.8 - 4.0 * i as f64 / (n - 1.0);
            let score = (base + rng.gauss(0.0, 0.15)).clamp(2.5, 8.0);
            let t = (score - 2.5) / 5.5;
            Row {
                overall_rank: 0,
                country: country.to_string(),
                continent: continent.to_string(),
                score: round3(score),
                gdp_per_capita: round3((0.3 + 1.3 * t + rng.gauss(0.0, 0.1)).max(0.0)),
                social_support: round3((0.6 + 1.0 * t + rng.gauss(0.0, 0.08)).max(0.0)),
                healthy_life_expectancy: round3((0.2 + 0.85 * t + rng.gauss(0.0, 0.07)).max(0.0)),
                freedom: round3((0.2 + 0.4 * t + rng.gauss(0.0, 0.06)).max(0.0)),
                generosity: round3((0.15 + rng.gauss(0.0, 0.08)).max(0.0)),
                corruption: round3((0.02 + 0.35 * t.powi(2) + rng.gauss(0.0, 0.04)).max(0.0)),
            }
        })
        .collect();

    rows.sort_by(|a, b| b.score.total_cmp(&a.score));
    for (i, row) in rows.iter_mut().enumerate() {
        row.overall_rank = i as i64 + 1;
    }
    rows
}

fn write_csv(rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(CSV_PATH).with_context(|| format!("creating {CSV_PATH}"))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(rows: &[Row]) -> Result<()> {
    let f64_column = |name: &str, get: fn(&Row) -> f64| {
        (
            Field::new(name, DataType::Float64, false),
            Arc::new(Float64Array::from(rows.iter().map(get).collect::<Vec<_>>()))
                as arrow::array::ArrayRef,
        )
    };

    let mut columns = vec![
        (
            Field::new("Overall rank", DataType::Int64, false),
            Arc::new(Int64Array::from(
                rows.iter().map(|r| r.overall_rank).collect::<Vec<_>>(),
            )) as arrow::array::ArrayRef,
        ),
        (
            Field::new("Country or region", DataType::Utf8, false),
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.country.as_str()).collect::<Vec<_>>(),
            )),
        ),
        (
            Field::new("Continent", DataType::Utf8, false),
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.continent.as_str()).collect::<Vec<_>>(),
            )),
        ),
    ];
    columns.push(f64_column("Score", |r| r.score));
    columns.push(f64_column("GDP per capita", |r| r.gdp_per_capita));
    columns.push(f64_column("Social support", |r| r.social_support));
    columns.push(f64_column("Healthy life expectancy", |r| r.healthy_life_expectancy));
    columns.push(f64_column("Freedom to make life choices", |r| r.freedom));
    columns.push(f64_column("Generosity", |r| r.generosity));
    columns.push(f64_column("Perceptions of corruption", |r| r.corruption));

    let (fields, arrays): (Vec<Field>, Vec<arrow::array::ArrayRef>) = columns.into_iter().unzip();
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(PARQUET_PATH).with_context(|| format!("creating {PARQUET_PATH}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(&mut rng);

    write_csv(&rows)?;
    write_parquet(&rows)?;

    println!(
        "Wrote {} countries to {CSV_PATH} and {PARQUET_PATH}",
        rows.len()
    );
    Ok(())
}
