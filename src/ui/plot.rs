use std::f64::consts::{FRAC_PI_2, FRAC_PI_3, TAU};

use eframe::egui::{self, Color32, FontId, RichText, ScrollArea, Sense, Stroke, Ui, pos2, vec2};
use eframe::epaint::TextShape;
use egui_plot::{
    Bar, BarChart, GridMark, Legend, Line, MarkerShape, Plot, PlotPoint, PlotTransform, Points,
    Polygon, Text,
};

use crate::charts::spec::{
    BarChartSpec, BarFill, ChoroplethSpec, GroupedBarSpec, HeatmapSpec, PieChartSpec, RadarSpec,
    ScatterSpec,
};
use crate::charts::{ChartSpec, View, ViewContent};
use crate::color::{contrasting_text, generate_palette, ColorMap, ContinuousScale};
use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::table;

const TITLE: &str = "World Happiness Dashboard";
const LABEL_FONT_SIZE: f32 = 11.0;

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render the data table followed by the eight views.
pub fn dashboard_panel(ui: &mut Ui, state: &AppState, config: &DashboardConfig) {
    if let Some(err) = &state.load_error {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading(RichText::new(err).color(Color32::RED));
        });
        return;
    }

    let (Some(dashboard), Some(colors)) = (&state.dashboard, &state.continent_colors) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to explore the happiness report  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(TITLE);
            ui.label(
                "Explore insights from the World Happiness Report dataset with interactive charts.",
            );
            ui.add_space(8.0);

            ui.heading("Data");
            table::data_table(ui, &dashboard.table, config.table_height);

            for view in &dashboard.views {
                ui.add_space(12.0);
                ui.separator();
                ui.strong(RichText::new(view.caption()).size(16.0));
                view_content(ui, view, colors, config.chart_height);
            }
        });
}

/// Draw one view: its chart, its placeholder, or its failure.
pub fn view_content(ui: &mut Ui, view: &View, colors: &ColorMap, height: f32) {
    let id = view.caption();
    match &view.content {
        ViewContent::Placeholder(msg) => {
            ui.label(RichText::new(msg).italics());
        }
        ViewContent::Failed(e) => {
            ui.label(RichText::new(format!("Could not render this view: {e}")).color(Color32::RED));
        }
        ViewContent::Chart(spec) => match spec {
            ChartSpec::Bar(s) => bar_chart(ui, id, s, height),
            ChartSpec::Pie(s) => pie_chart(ui, id, s, colors, height),
            ChartSpec::Scatter(s) => scatter_plot(ui, id, s, colors, height),
            ChartSpec::Choropleth(s) => tile_map(ui, s),
            ChartSpec::GroupedBar(s) => grouped_bar_chart(ui, id, s, height),
            ChartSpec::Radar(s) => radar_chart(ui, id, s, height),
            ChartSpec::Heatmap(s) => heatmap(ui, id, s, height),
        },
    }
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

fn bar_chart(ui: &mut Ui, id: &str, spec: &BarChartSpec, height: f32) {
    let n = spec.bars.len();
    let bars: Vec<Bar> = spec
        .bars
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let fill = match spec.fill {
                BarFill::Gradient(scale) => {
                    scale.sample(if n > 1 { i as f64 / (n - 1) as f64 } else { 0.5 })
                }
                BarFill::Solid([r, g, b]) => Color32::from_rgb(r, g, b),
            };
            Bar::new(i as f64, b.value).name(&b.label).fill(fill).width(0.8)
        })
        .collect();

    let response = Plot::new(id)
        .height(height)
        .x_axis_label(&spec.x_label)
        .y_axis_label(&spec.y_label)
        .x_axis_formatter(|_: GridMark, _: &std::ops::RangeInclusive<f64>| String::new())
        .include_y(0.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });

    let labels: Vec<&str> = spec.bars.iter().map(|b| b.label.as_str()).collect();
    rotated_labels(ui, &response.transform, &labels, spec.label_angle_deg);
}

fn grouped_bar_chart(ui: &mut Ui, id: &str, spec: &GroupedBarSpec, height: f32) {
    let n = spec.groups.len().max(1);
    let width = 0.8 / n as f64;
    let palette = generate_palette(spec.groups.len());

    let response = Plot::new(id)
        .height(height)
        .legend(Legend::default())
        .x_axis_label("Indicator")
        .y_axis_label("Value")
        .x_axis_formatter(|_: GridMark, _: &std::ops::RangeInclusive<f64>| String::new())
        .include_y(0.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (j, (group, color)) in spec.groups.iter().zip(&palette).enumerate() {
                let offset = (j as f64 - (n - 1) as f64 / 2.0) * width;
                let bars = group
                    .values
                    .iter()
                    .zip(&spec.indicators)
                    .enumerate()
                    .map(|(i, (v, ind))| {
                        Bar::new(i as f64 + offset, *v)
                            .name(format!("{} – {}", group.name, ind))
                            .width(width)
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).name(&group.name).color(*color));
            }
        });

    let labels: Vec<&str> = spec.indicators.iter().map(|i| i.column()).collect();
    rotated_labels(ui, &response.transform, &labels, spec.label_angle_deg);
}

/// Category labels under a plot, rotated so that each ends at its tick.
/// Labels closer than a few pixels to the previous one are skipped.
fn rotated_labels(ui: &mut Ui, transform: &PlotTransform, labels: &[&str], angle_deg: f32) {
    let font = FontId::proportional(LABEL_FONT_SIZE);
    let color = ui.visuals().text_color();
    let angle = angle_deg.to_radians();

    let longest = labels
        .iter()
        .map(|l| {
            ui.painter()
                .layout_no_wrap(l.to_string(), font.clone(), color)
                .size()
                .x
        })
        .fold(0.0, f32::max);
    let strip_height = (longest * angle.sin() + 2.0 * LABEL_FONT_SIZE).min(180.0);

    let (rect, _) = ui.allocate_exact_size(vec2(ui.available_width(), strip_height), Sense::hover());
    let painter = ui.painter_at(rect);
    let reading_dir = vec2(angle.cos(), -angle.sin());

    let mut last_x = f32::NEG_INFINITY;
    for (i, label) in labels.iter().enumerate() {
        let tick = transform.position_from_point(&PlotPoint::new(i as f64, 0.0));
        if tick.x < rect.left() || tick.x > rect.right() || tick.x - last_x < LABEL_FONT_SIZE {
            continue;
        }
        last_x = tick.x;

        let galley = painter.layout_no_wrap(label.to_string(), font.clone(), color);
        let end = pos2(tick.x, rect.top() + 2.0);
        let start = end - reading_dir * galley.size().x;
        painter.add(TextShape::new(start, galley, color).with_angle(-angle));
    }
}

// ---------------------------------------------------------------------------
// Pie
// ---------------------------------------------------------------------------

fn pie_chart(ui: &mut Ui, id: &str, spec: &PieChartSpec, colors: &ColorMap, height: f32) {
    Plot::new(id)
        .height(height)
        .data_aspect(1.0)
        .legend(Legend::default())
        .show_axes(false)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .include_x(-1.5)
        .include_x(1.5)
        .include_y(-1.3)
        .include_y(1.3)
        .show(ui, |plot_ui| {
            let mut start = spec.start_angle_deg.to_radians();
            for slice in &spec.slices {
                let sweep = slice.fraction * TAU;
                let color = colors.color_for(&slice.label);

                for piece in sector_pieces(start, sweep) {
                    plot_ui.polygon(
                        Polygon::new(piece)
                            .name(&slice.label)
                            .fill_color(color)
                            .stroke(Stroke::new(1.0, Color32::WHITE)),
                    );
                }

                let mid = start + sweep / 2.0;
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(0.65 * mid.cos(), 0.65 * mid.sin()),
                        RichText::new(slice.percent_label()).strong(),
                    )
                    .color(contrasting_text(color)),
                );
                plot_ui.text(Text::new(
                    PlotPoint::new(1.15 * mid.cos(), 1.15 * mid.sin()),
                    slice.label.clone(),
                ));
                start += sweep;
            }
        });
}

/// Split a unit-circle sector into convex pieces no wider than 60°.
fn sector_pieces(start: f64, sweep: f64) -> Vec<Vec<[f64; 2]>> {
    const ARC_STEPS: usize = 12;
    if sweep <= 0.0 {
        return Vec::new();
    }
    let pieces = (sweep / FRAC_PI_3).ceil().max(1.0) as usize;
    let piece_sweep = sweep / pieces as f64;

    (0..pieces)
        .map(|p| {
            let a0 = start + p as f64 * piece_sweep;
            std::iter::once([0.0, 0.0])
                .chain((0..=ARC_STEPS).map(|k| {
                    let a = a0 + piece_sweep * k as f64 / ARC_STEPS as f64;
                    [a.cos(), a.sin()]
                }))
                .collect()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Scatter
// ---------------------------------------------------------------------------

fn scatter_plot(ui: &mut Ui, id: &str, spec: &ScatterSpec, colors: &ColorMap, height: f32) {
    // Owned copy for the hover label, which outlives this borrow of `spec`.
    let lookup: Vec<(String, String, f64, f64)> = spec
        .series
        .iter()
        .flat_map(|s| {
            s.points
                .iter()
                .map(move |p| (s.name.clone(), p.label.clone(), p.x, p.y))
        })
        .collect();
    let (x_label, y_label) = (spec.x_label.clone(), spec.y_label.clone());

    Plot::new(id)
        .height(height)
        .legend(Legend::default())
        .x_axis_label(&spec.x_label)
        .y_axis_label(&spec.y_label)
        .allow_scroll(false)
        .label_formatter(move |name, value| {
            let nearest = lookup
                .iter()
                .filter(|(series, ..)| series == name)
                .min_by(|a, b| {
                    let da = (a.2 - value.x).powi(2) + (a.3 - value.y).powi(2);
                    let db = (b.2 - value.x).powi(2) + (b.3 - value.y).powi(2);
                    da.total_cmp(&db)
                });
            match nearest {
                Some((_, country, x, y)) => {
                    format!("{country}\n{x_label}: {x:.3}\n{y_label}: {y:.3}")
                }
                None => format!("{x_label}: {:.3}\n{y_label}: {:.3}", value.x, value.y),
            }
        })
        .show(ui, |plot_ui| {
            for series in &spec.series {
                let points: Vec<[f64; 2]> = series.points.iter().map(|p| [p.x, p.y]).collect();
                plot_ui.points(
                    Points::new(points)
                        .name(&series.name)
                        .color(colors.color_for(&series.name))
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(5.0),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Map
// ---------------------------------------------------------------------------

/// One tile per country, grouped by continent, filled on the continuous scale.
fn tile_map(ui: &mut Ui, spec: &ChoroplethSpec) {
    color_legend(ui, spec.scale, spec.domain, spec.metric.column());
    ui.add_space(4.0);

    let mut continents: Vec<&str> = Vec::new();
    for region in &spec.regions {
        if !continents.contains(&region.continent.as_str()) {
            continents.push(&region.continent);
        }
    }

    for continent in continents {
        ui.label(RichText::new(continent).strong());
        ui.horizontal_wrapped(|ui: &mut Ui| {
            for region in spec.regions.iter().filter(|r| r.continent == continent) {
                let fill = spec.scale.map(region.value, spec.domain.0, spec.domain.1);
                egui::Frame::default()
                    .fill(fill)
                    .inner_margin(egui::Margin::same(4))
                    .show(ui, |ui: &mut Ui| {
                        ui.label(
                            RichText::new(&region.country)
                                .color(contrasting_text(fill))
                                .size(LABEL_FONT_SIZE),
                        );
                    })
                    .response
                    .on_hover_text(format!(
                        "{}\n{}: {:.3}",
                        region.country, spec.metric, region.value
                    ));
            }
        });
    }
}

/// A horizontal gradient strip with the domain ends labelled.
fn color_legend(ui: &mut Ui, scale: ContinuousScale, domain: (f64, f64), title: &str) {
    const STEPS: usize = 48;
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("{title}: {:.2}", domain.0));
        let (rect, _) = ui.allocate_exact_size(vec2(200.0, 12.0), Sense::hover());
        let step_width = rect.width() / STEPS as f32;
        for k in 0..STEPS {
            let left = rect.left() + k as f32 * step_width;
            let cell = egui::Rect::from_min_max(
                pos2(left, rect.top()),
                pos2(left + step_width, rect.bottom()),
            );
            let color = scale.sample((k as f64 + 0.5) / STEPS as f64);
            ui.painter().rect_filled(cell, 0.0, color);
        }
        ui.label(format!("{:.2}", domain.1));
    });
}

// ---------------------------------------------------------------------------
// Radar
// ---------------------------------------------------------------------------

fn radar_chart(ui: &mut Ui, id: &str, spec: &RadarSpec, height: f32) {
    const RINGS: usize = 5;
    let m = spec.axes.len();
    if m == 0 {
        return;
    }
    let r_max = spec.max_value().max(f64::EPSILON);
    // First axis at twelve o'clock, then clockwise.
    let axis_angle = |k: usize| FRAC_PI_2 - TAU * k as f64 / m as f64;
    let polar = |r: f64, k: usize| [r * axis_angle(k).cos(), r * axis_angle(k).sin()];
    let palette = generate_palette(spec.traces.len());
    let grid = Color32::from_gray(140);

    Plot::new(id)
        .height(height)
        .data_aspect(1.0)
        .legend(Legend::default())
        .show_axes(false)
        .show_grid(false)
        .allow_scroll(false)
        .include_x(-1.3 * r_max)
        .include_x(1.3 * r_max)
        .include_y(-1.2 * r_max)
        .include_y(1.2 * r_max)
        .show(ui, |plot_ui| {
            for ring in 1..=RINGS {
                let r = r_max * ring as f64 / RINGS as f64;
                let points: Vec<[f64; 2]> = (0..=m).map(|k| polar(r, k % m)).collect();
                plot_ui.line(Line::new(points).color(grid).width(0.5));
            }
            for (k, axis) in spec.axes.iter().enumerate() {
                plot_ui.line(Line::new(vec![[0.0, 0.0], polar(r_max, k)]).color(grid).width(0.5));
                let [x, y] = polar(1.12 * r_max, k);
                plot_ui.text(Text::new(PlotPoint::new(x, y), axis.column()));
            }

            for (trace, color) in spec.traces.iter().zip(&palette) {
                let mut points: Vec<[f64; 2]> = trace
                    .values
                    .iter()
                    .enumerate()
                    .map(|(k, v)| polar(*v, k))
                    .collect();
                if spec.closed {
                    if let Some(first) = points.first().copied() {
                        points.push(first);
                    }
                }
                plot_ui.line(Line::new(points).name(&trace.name).color(*color).width(2.0));
            }
        });
}

// ---------------------------------------------------------------------------
// Heatmap
// ---------------------------------------------------------------------------

fn heatmap(ui: &mut Ui, id: &str, spec: &HeatmapSpec, height: f32) {
    let m = spec.labels.len();
    let x_labels: Vec<&'static str> = spec.labels.iter().map(|l| l.short_label()).collect();
    let y_labels: Vec<&'static str> = spec.labels.iter().rev().map(|l| l.short_label()).collect();
    let undefined = Color32::from_gray(90);

    color_legend(ui, spec.scale, spec.domain, "Pearson r");

    Plot::new(id)
        .height(height)
        .data_aspect(1.0)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show_x(false)
        .show_y(false)
        .x_axis_formatter(move |mark: GridMark, _: &std::ops::RangeInclusive<f64>| {
            category_at(&x_labels, mark.value)
        })
        .y_axis_formatter(move |mark: GridMark, _: &std::ops::RangeInclusive<f64>| {
            category_at(&y_labels, mark.value)
        })
        .include_x(-0.5)
        .include_x(m as f64 - 0.5)
        .include_y(-0.5)
        .include_y(m as f64 - 0.5)
        .show(ui, |plot_ui| {
            for (i, row) in spec.cells.iter().enumerate() {
                // Row 0 at the top.
                let y = (m - 1 - i) as f64;
                for (j, cell) in row.iter().enumerate() {
                    let x = j as f64;
                    let fill = match cell {
                        Some(v) => spec.scale.map(*v, spec.domain.0, spec.domain.1),
                        None => undefined,
                    };
                    let square = vec![
                        [x - 0.5, y - 0.5],
                        [x + 0.5, y - 0.5],
                        [x + 0.5, y + 0.5],
                        [x - 0.5, y + 0.5],
                    ];
                    plot_ui.polygon(
                        Polygon::new(square)
                            .fill_color(fill)
                            .stroke(Stroke::new(1.0, Color32::WHITE)),
                    );
                    let annotation = match cell {
                        Some(v) => format!("{v:.prec$}", prec = spec.precision),
                        None => "n/a".to_string(),
                    };
                    plot_ui.text(
                        Text::new(PlotPoint::new(x, y), annotation).color(contrasting_text(fill)),
                    );
                }
            }
        });
}

/// Label for a grid mark that falls on a category index, else nothing.
fn category_at(labels: &[&str], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels
        .get(idx as usize)
        .map(|l| l.to_string())
        .unwrap_or_default()
}
