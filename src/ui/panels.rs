use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::data::model::Dimension;
use crate::render::{Clustering, DisplayMode};
use crate::state::{AppState, ViewRequest};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// What the user did inside one multi-select this frame.
enum SelectionChange {
    All,
    None,
    Toggle(String),
}

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Name search ----
            ui.strong("🔍 Search point name");
            let mut search = state.criteria.search.clone();
            if ui.text_edit_singleline(&mut search).changed() {
                state.set_search(search);
            }
            ui.separator();

            multi_select(ui, state, Dimension::Company, "🏢");

            // ---- Map display ----
            ui.separator();
            ui.strong("👁 Show on map");
            let mut mode = state.options.mode;
            for m in DisplayMode::ALL {
                ui.radio_value(&mut mode, m, m.label());
            }
            state.set_mode(mode);

            ui.add_space(4.0);
            ui.strong("📍 Group pins automatically?");
            let mut clustering = state.options.clustering;
            for c in [Clustering::Cluster, Clustering::Individual] {
                ui.radio_value(&mut clustering, c, c.label());
            }
            state.set_clustering(clustering);
            ui.separator();

            multi_select(ui, state, Dimension::Category, "📦");
            multi_select(ui, state, Dimension::Neighborhood, "🏘");
        });
}

/// Collapsible checkbox list for one dimension, with All / None shortcuts.
fn multi_select(ui: &mut Ui, state: &mut AppState, dim: Dimension, icon: &str) {
    let all_values = state.context.table.distinct(dim);
    let selected = state.criteria.selected(dim);
    let n_selected = selected.map_or(0, |s| s.len());
    let header_text = format!("{icon} {}  ({n_selected}/{})", dim.label(), all_values.len());

    let mut change = None;
    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(dim.label())
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    change = Some(SelectionChange::All);
                }
                if ui.small_button("None").clicked() {
                    change = Some(SelectionChange::None);
                }
            });

            for value in all_values {
                let mut checked = selected.is_some_and(|s| s.contains(value));

                // Companies show their fallback pin colour.
                let mut text = RichText::new(value);
                if dim == Dimension::Company {
                    text = text.color(
                        state
                            .context
                            .company_colors
                            .color_for(Some(value.as_str()))
                            .color32(),
                    );
                }

                if ui.checkbox(&mut checked, text).changed() {
                    change = Some(SelectionChange::Toggle(value.clone()));
                }
            }
        });

    match change {
        Some(SelectionChange::All) => state.select_all(dim),
        Some(SelectionChange::None) => state.select_none(dim),
        Some(SelectionChange::Toggle(value)) => state.toggle_filter_value(dim, &value),
        None => {}
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / status bar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("View", |ui: &mut Ui| {
            if ui.button("Reset map view").clicked() {
                state.view = ViewRequest::Reset;
                ui.close_menu();
            }
            if ui.button("Clear all filters").clicked() {
                state.criteria.search.clear();
                for dim in Dimension::ALL {
                    state.select_all(dim);
                }
                ui.close_menu();
            }
        });

        ui.separator();
        ui.heading("📌 Interactive Points Map");
        ui.separator();

        ui.label(format!(
            "{} points loaded, {} visible",
            state.context.table.len(),
            state.visible_count()
        ));
    });
}
