use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::{AppState, CountryPicker};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => ds.clone(),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    ScrollArea::vertical()
        .id_salt("filters_scroll")
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Continent checklist ----
            ui.strong("Select Continent");
            for option in dataset.continent_options() {
                if option == crate::data::model::ALL_CONTINENTS {
                    let mut all = state.filters.continents.is_all();
                    if ui.checkbox(&mut all, option.as_str()).changed() && all {
                        state.select_all_continents();
                    }
                    continue;
                }
                let mut checked = state.continent_checked(&option);
                let text = match &state.continent_colors {
                    Some(cm) => RichText::new(&option).color(cm.color_for(&option)),
                    None => RichText::new(&option),
                };
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_continent(&option);
                }
            }
            ui.separator();

            // ---- Score range ----
            ui.strong("Select Happiness Score Range");
            let (lo, hi) = dataset.score_bounds();
            let mut min = state.filters.score_range.min;
            let mut max = state.filters.score_range.max;
            if ui
                .add(egui::Slider::new(&mut min, lo..=hi).text("min").max_decimals(3))
                .changed()
            {
                state.set_score_min(min);
            }
            if ui
                .add(egui::Slider::new(&mut max, lo..=hi).text("max").max_decimals(3))
                .changed()
            {
                state.set_score_max(max);
            }
            ui.separator();

            ui.checkbox(&mut state.filters.top10_only, "Show Top 10 Countries");
            ui.separator();

            // ---- Country pickers ----
            country_picker(ui, state, dataset.countries(), CountryPicker::Comparison);
            country_picker(ui, state, dataset.countries(), CountryPicker::Radar);
        });
}

/// A collapsible, searchable multi-select over every country.
fn country_picker(ui: &mut Ui, state: &mut AppState, countries: &[String], picker: CountryPicker) {
    let (title, salt) = match picker {
        CountryPicker::Comparison => ("Select Countries", "comparison_picker"),
        CountryPicker::Radar => ("Radar Filter", "radar_picker"),
    };
    let n_selected = state.countries_mut(picker).len();

    egui::CollapsingHeader::new(RichText::new(format!("{title}  ({n_selected})")).strong())
        .id_salt(salt)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                let search = match picker {
                    CountryPicker::Comparison => &mut state.comparison_search,
                    CountryPicker::Radar => &mut state.radar_search,
                };
                ui.add(egui::TextEdit::singleline(search).hint_text("Search…"));
                if ui.small_button("Clear").clicked() {
                    state.clear_countries(picker);
                }
            });

            let needle = match picker {
                CountryPicker::Comparison => state.comparison_search.to_lowercase(),
                CountryPicker::Radar => state.radar_search.to_lowercase(),
            };
            ScrollArea::vertical()
                .id_salt(salt)
                .max_height(200.0)
                .show(ui, |ui: &mut Ui| {
                    for country in countries
                        .iter()
                        .filter(|c| c.to_lowercase().contains(&needle))
                    {
                        let mut checked = state.countries_mut(picker).contains(country);
                        if ui.checkbox(&mut checked, country.as_str()).changed() {
                            state.toggle_country(picker, country);
                        }
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(dashboard)) = (&state.dataset, &state.dashboard) {
            ui.label(format!(
                "{} countries loaded, {} shown",
                ds.len(),
                dashboard.table.len()
            ))
            .on_hover_text(format!(
                "{} countries pass the continent and score filters",
                dashboard.secondary_len
            ));
        }

        if let Some(path) = &state.source_path {
            ui.separator();
            ui.label(RichText::new(path.display().to_string()).weak());
        }

        if let Some(msg) = &state.load_error {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open happiness report")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load(&path);
    }
}
