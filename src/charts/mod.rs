/// Chart layer: toolkit-independent chart specifications and the eight
/// view builders that produce them.
///
/// ```text
///   filtered rows ──► views::* ──► ViewContent
///                                   ├─ Chart(ChartSpec)   drawn by ui::plot
///                                   ├─ Placeholder(msg)   empty input
///                                   └─ Failed(RenderError)
/// ```
pub mod spec;
pub mod views;

use thiserror::Error;

pub use spec::ChartSpec;

/// A view failed on non-empty input. Caught per view so the others still
/// render.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("needs at least {needed} rows, got {found}")]
    InsufficientRows { needed: usize, found: usize },
    #[error("total score is not positive, proportions are undefined")]
    DegenerateTotal,
    #[error("{what} is not a finite number")]
    NonFinite { what: String },
}

/// The eight views, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    ScoreBar,
    ContinentPie,
    LifeExpectancyScatter,
    GdpBar,
    GenerosityMap,
    IndicatorComparison,
    IndicatorRadar,
    CorrelationHeatmap,
}

impl ViewKind {
    pub const ALL: [ViewKind; 8] = [
        ViewKind::ScoreBar,
        ViewKind::ContinentPie,
        ViewKind::LifeExpectancyScatter,
        ViewKind::GdpBar,
        ViewKind::GenerosityMap,
        ViewKind::IndicatorComparison,
        ViewKind::IndicatorRadar,
        ViewKind::CorrelationHeatmap,
    ];

    /// Caption shown above the view.
    pub fn caption(self) -> &'static str {
        match self {
            ViewKind::ScoreBar => "Happiness Score by Country",
            ViewKind::ContinentPie => "Happiness Score Ratio by Continents",
            ViewKind::LifeExpectancyScatter => {
                "Happiness Score and Healthy Life Expectancy Relationship"
            }
            ViewKind::GdpBar => "Average GDP per Capita by Country",
            ViewKind::GenerosityMap => "Generosity by Country",
            ViewKind::IndicatorComparison => "Key Indicators for Selected Countries",
            ViewKind::IndicatorRadar => "Comparison of Key Indicators for Selected Countries",
            ViewKind::CorrelationHeatmap => "Correlation Matrix of Selected Indicators",
        }
    }

    /// Message shown instead of the chart when the view's input is empty.
    pub fn placeholder(self) -> &'static str {
        match self {
            ViewKind::ScoreBar | ViewKind::LifeExpectancyScatter => {
                "No countries match the current filters."
            }
            ViewKind::ContinentPie => "The dataset has no rows to summarise.",
            ViewKind::GdpBar => "Select at least one continent to display the bar plot.",
            ViewKind::GenerosityMap => "Select 'All' from the sidebar to display the map.",
            ViewKind::IndicatorComparison => {
                "Please select at least one country to view the bar plot."
            }
            ViewKind::IndicatorRadar => {
                "Please select at least one country from the radar filter to compare."
            }
            ViewKind::CorrelationHeatmap => {
                "Select at least one continent to display the matrix."
            }
        }
    }
}

/// What a view shows this rerun.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewContent {
    Chart(ChartSpec),
    Placeholder(String),
    Failed(RenderError),
}

impl ViewContent {
    pub fn placeholder(kind: ViewKind) -> Self {
        ViewContent::Placeholder(kind.placeholder().to_string())
    }

    pub fn chart(&self) -> Option<&ChartSpec> {
        match self {
            ViewContent::Chart(spec) => Some(spec),
            _ => None,
        }
    }
}

/// One captioned view of the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub kind: ViewKind,
    pub content: ViewContent,
}

impl View {
    /// Fold a builder result into a view, isolating the failure to this view.
    pub fn from_result(kind: ViewKind, result: Result<ViewContent, RenderError>) -> Self {
        let content = result.unwrap_or_else(|e| {
            log::warn!("view '{}' failed: {e}", kind.caption());
            ViewContent::Failed(e)
        });
        View { kind, content }
    }

    pub fn caption(&self) -> &'static str {
        self.kind.caption()
    }
}

/// Reject a NaN or infinite aggregate before it reaches a chart.
pub(crate) fn ensure_finite(value: f64, what: impl FnOnce() -> String) -> Result<f64, RenderError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RenderError::NonFinite { what: what() })
    }
}
