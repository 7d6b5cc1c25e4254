use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{Indicator, Record, REQUIRED_COLUMNS};

// ---------------------------------------------------------------------------
// Data table (primary derivation)
// ---------------------------------------------------------------------------

/// Render `rows` as a striped, scrollable table with every required column.
pub fn data_table(ui: &mut Ui, rows: &[Record], max_height: f32) {
    ui.label(format!("{} rows", rows.len()));

    let text_height = egui::TextStyle::Body.resolve(ui.style()).size + 4.0;

    TableBuilder::new(ui)
        .id_salt("data_table")
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::auto().at_least(48.0))
        .column(Column::auto().at_least(140.0))
        .column(Column::auto().at_least(100.0))
        .columns(Column::auto().at_least(70.0), Indicator::ALL.len())
        .min_scrolled_height(0.0)
        .max_scroll_height(max_height)
        .header(text_height + 6.0, |mut header| {
            for title in REQUIRED_COLUMNS {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(text_height, rows.len(), |mut row| {
                let r = &rows[row.index()];
                row.col(|ui: &mut Ui| {
                    ui.label(r.overall_rank.to_string());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(&r.country);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(&r.continent);
                });
                for ind in Indicator::ALL {
                    row.col(|ui: &mut Ui| {
                        ui.label(format!("{:.3}", ind.value(r)));
                    });
                }
            });
        });
}
