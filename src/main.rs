mod app;
mod charts;
mod cli;
mod color;
mod data;
mod export;
mod state;
mod ui;

use anyhow::Result;
use app::ChurnInsightsApp;
use clap::Parser;
use eframe::egui;
use state::AppState;

fn main() -> Result<()> {
    let args = cli::Args::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if args.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    let mut state = AppState::new(args.tab, args.filter());

    match data::loader::load_file(&args.data) {
        Ok(dataset) => {
            log::info!(
                "Loaded {} customers from {} ({} contract types)",
                dataset.len(),
                args.data.display(),
                dataset.contracts().len()
            );
            if dataset.is_empty() {
                log::warn!("{} contains no customers", args.data.display());
            }
            state.set_dataset(dataset);
        }
        // Headless runs have nothing to show without data.
        Err(e) if args.export.is_some() => return Err(e),
        Err(e) => {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }

    if let Some(path) = &args.export {
        return export::export_to_file(&state, path);
    }

    run_dashboard(state)
}

fn run_dashboard(state: AppState) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Telecom Customer Retention Insights",
        options,
        Box::new(move |cc| Ok(Box::new(ChurnInsightsApp::new(cc, state)))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard: {e}"))
}
