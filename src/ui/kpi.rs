use eframe::egui::{self, Color32, RichText, Ui};

use crate::color;
use crate::data::model::Churn;
use crate::data::stats::Kpis;

/// Four KPI cards side by side.
pub fn kpi_row(ui: &mut Ui, kpis: &Kpis) {
    let cards = [
        (kpis.customers_label(), "Customers", color::text()),
        (kpis.churn_label(), "Churn Rate", color::churn_color(Churn::Yes)),
        (kpis.tenure_label(), "Avg Tenure", color::text()),
        (kpis.bill_label(), "Avg Bill", color::text()),
    ];
    ui.columns(cards.len(), |columns: &mut [Ui]| {
        for (ui, (value, caption, value_color)) in columns.iter_mut().zip(cards) {
            kpi_card(ui, &value, caption, value_color);
        }
    });
}

fn kpi_card(ui: &mut Ui, value: &str, caption: &str, value_color: Color32) {
    egui::Frame::group(ui.style())
        .fill(Color32::WHITE)
        .show(ui, |ui: &mut Ui| {
            ui.vertical_centered(|ui: &mut Ui| {
                ui.label(RichText::new(value).size(22.0).strong().color(value_color));
                ui.label(RichText::new(caption).color(color::muted()));
            });
        });
}
