use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::charts::GroupedBar;
use crate::data::stats::group_thousands;

/// Collapsible No/Yes/total table under a grouped bar chart.
pub fn group_table(ui: &mut Ui, chart: &GroupedBar) {
    if chart.groups.is_empty() {
        return;
    }
    egui::CollapsingHeader::new("Summary table")
        .id_salt(&chart.title)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .column(Column::auto().at_least(120.0))
                .columns(Column::auto().at_least(56.0), 4)
                .header(20.0, |mut header| {
                    for name in [chart.x_label.as_str(), "No", "Yes", "Total", "Churn %"] {
                        header.col(|ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|mut body| {
                    for group in &chart.groups {
                        body.row(18.0, |mut row| {
                            let cells = [
                                group.category.clone(),
                                group_thousands(group.no),
                                group_thousands(group.yes),
                                group_thousands(group.total()),
                                format!("{:.1}%", group.churn_rate()),
                            ];
                            for cell in cells {
                                row.col(|ui| {
                                    ui.label(cell);
                                });
                            }
                        });
                    }
                });
        });
}
