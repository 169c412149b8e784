use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::state::{chart_title, AppState};

// ---------------------------------------------------------------------------
// Left side panel – chart visibility
// ---------------------------------------------------------------------------

/// Render the left panel listing every chart with a visibility toggle.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Charts");
    ui.separator();

    if state.charts.is_empty() {
        ui.label("No charts requested.");
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.show_all();
        }
        if ui.small_button("None").clicked() {
            state.show_none();
        }
    });

    let titles: Vec<String> = state.charts.iter().map(chart_title).collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (shown, title) in state.visible.iter_mut().zip(&titles) {
                ui.checkbox(shown, title.as_str());
            }

            ui.separator();
            ui.strong("Legend");
            for label in state.colors.labels() {
                let text = RichText::new(label).color(state.colors.color_for(label));
                ui.label(text);
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.label(format!(
            "{} charts, {} visible",
            state.charts.len(),
            state.visible_indices().len()
        ));

        ui.separator();

        if ui
            .selectable_label(state.show_error_bars, "Std. deviation")
            .clicked()
        {
            state.show_error_bars = !state.show_error_bars;
        }

        if ui.selectable_label(state.show_means, "Means").clicked() {
            state.show_means = !state.show_means;
        }
    });
}
