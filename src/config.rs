use std::path::PathBuf;

/// Dataset read at startup when no other file has been opened.
pub const DEFAULT_DATASET: &str = "happiness_converted.csv";

/// Fixed application settings. There are no flags or environment variables;
/// logging alone is tuned through `RUST_LOG`.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub dataset_path: PathBuf,
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
    pub sidebar_width: f32,
    pub chart_height: f32,
    pub table_height: f32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET),
            window_size: [1280.0, 900.0],
            min_window_size: [700.0, 450.0],
            sidebar_width: 260.0,
            chart_height: 380.0,
            table_height: 300.0,
        }
    }
}
