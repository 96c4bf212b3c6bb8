use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::charts::Tab;
use crate::color;
use crate::state::AppState;

/// Observations shown under the header.
const INSIGHTS: [&str; 4] = [
    "Month-to-month contracts show significantly higher churn risk.",
    "Customers with low tenure churn disproportionately within the first year.",
    "Electronic check users churn more than other payment methods.",
    "Higher monthly charges correlate with early churn behavior.",
];

// ---------------------------------------------------------------------------
// Left side panel – header and global filter
// ---------------------------------------------------------------------------

/// Render the left panel: brand, headline, insights and the contract filter.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.label(RichText::new("Cyber Hybrid").heading().strong().color(color::text()));
            ui.add_space(8.0);
            ui.label(
                RichText::new("Telecom Customer Retention Insights")
                    .size(20.0)
                    .strong()
                    .color(color::text()),
            );
            ui.label(
                RichText::new("Deep dive analysis into customer churn patterns and behavioral drivers.")
                    .color(color::muted()),
            );
            ui.add_space(6.0);

            for insight in INSIGHTS {
                ui.horizontal_wrapped(|ui: &mut Ui| {
                    ui.label("•");
                    ui.label(RichText::new(insight).size(13.0));
                });
            }
            ui.separator();

            contract_filter(ui, state);
        });
}

/// Multi-select over the dataset's contract types.
fn contract_filter(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Global Contract Filter:");

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the loop.
    let contracts = dataset.contracts().to_vec();

    ui.horizontal(|ui: &mut Ui| {
        let n_selected = state.filter.allowed.len();
        let summary = if n_selected == 0 {
            "Filter by Contract Type".to_string()
        } else {
            format!("{n_selected}/{} selected", contracts.len())
        };
        ui.label(RichText::new(summary).italics().color(color::muted()));
        if ui
            .add_enabled(n_selected > 0, egui::Button::new("Clear").small())
            .clicked()
        {
            state.clear_filter();
        }
    });

    for contract in &contracts {
        let mut checked = state.filter.contains(contract);
        if ui.checkbox(&mut checked, contract.as_str()).changed() {
            state.toggle_filter_value(contract);
        }
    }
}

// ---------------------------------------------------------------------------
// Tab bar
// ---------------------------------------------------------------------------

pub fn tab_bar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            let selected = state.active_tab == tab;
            let text = RichText::new(tab.label()).size(15.0);
            let text = if selected { text.strong() } else { text };
            if ui.selectable_label(selected, text).clicked() {
                state.set_tab(tab);
            }
        }
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
            if ui
                .add_enabled(state.dataset.is_some(), egui::Button::new("Export view…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            let summary = ds.summary();
            ui.label(format!(
                "{} customers loaded · {} churned overall · {} average tenure",
                summary.customers_label(),
                summary.churn_label(),
                summary.tenure_label(),
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open customer data")
        .add_filter("Supported files", &["csv", "parquet", "pq", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} customers from {} ({} contract types)",
                    dataset.len(),
                    path.display(),
                    dataset.contracts().len()
                );
                state.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export dashboard view")
        .add_filter("JSON", &["json"])
        .set_file_name(format!("churn-{}.json", state.active_tab.id()))
        .save_file();

    if let Some(path) = file {
        if let Err(e) = crate::export::export_to_file(state, &path) {
            log::error!("Failed to export view: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
