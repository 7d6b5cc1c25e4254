use crate::color::ContinuousScale;
use crate::data::model::Indicator;

/// A fully computed chart, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartSpec {
    Bar(BarChartSpec),
    Pie(PieChartSpec),
    Scatter(ScatterSpec),
    Choropleth(ChoroplethSpec),
    GroupedBar(GroupedBarSpec),
    Radar(RadarSpec),
    Heatmap(HeatmapSpec),
}

// ---------------------------------------------------------------------------
// Bar
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BarFill {
    /// Colour each bar by its position along the scale.
    Gradient(ContinuousScale),
    Solid([u8; 3]),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChartSpec {
    pub x_label: String,
    pub y_label: String,
    pub bars: Vec<Bar>,
    pub fill: BarFill,
    /// Rotation of the category labels, in degrees.
    pub label_angle_deg: f32,
}

// ---------------------------------------------------------------------------
// Pie
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    /// Share of the total, in `[0, 1]`.
    pub fraction: f64,
}

impl PieSlice {
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.fraction * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieChartSpec {
    pub slices: Vec<PieSlice>,
    /// Angle of the first slice edge, counter-clockwise from three o'clock.
    pub start_angle_deg: f64,
}

// ---------------------------------------------------------------------------
// Scatter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub label: String,
    pub x: f64,
    pub y: f64,
}

/// Points sharing one colour (one continent).
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub name: String,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSpec {
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<ScatterSeries>,
}

// ---------------------------------------------------------------------------
// Choropleth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub country: String,
    pub continent: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChoroplethSpec {
    pub metric: Indicator,
    pub scale: ContinuousScale,
    /// `(min, max)` of `value` over `regions`.
    pub domain: (f64, f64),
    pub regions: Vec<Region>,
}

// ---------------------------------------------------------------------------
// Grouped bar
// ---------------------------------------------------------------------------

/// One hue group: a country's value for every indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct BarGroup {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupedBarSpec {
    pub title: String,
    pub indicators: Vec<Indicator>,
    pub groups: Vec<BarGroup>,
    pub label_angle_deg: f32,
}

// ---------------------------------------------------------------------------
// Radar
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RadarTrace {
    pub name: String,
    /// One value per axis, in axis order.
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadarSpec {
    pub axes: Vec<Indicator>,
    pub traces: Vec<RadarTrace>,
    /// Join the last vertex back to the first.
    pub closed: bool,
}

impl RadarSpec {
    /// Largest value over every trace, the outer ring of the chart.
    pub fn max_value(&self) -> f64 {
        self.traces
            .iter()
            .flat_map(|t| t.values.iter().copied())
            .fold(0.0, f64::max)
    }
}

// ---------------------------------------------------------------------------
// Heatmap
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapSpec {
    pub labels: Vec<Indicator>,
    /// Row-major; `None` is drawn as an undefined cell.
    pub cells: Vec<Vec<Option<f64>>>,
    pub scale: ContinuousScale,
    pub domain: (f64, f64),
    /// Decimal places in the cell annotations.
    pub precision: usize,
}
