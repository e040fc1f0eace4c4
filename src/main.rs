mod app;
mod color;
mod config;
mod context;
mod data;
mod render;
mod state;
mod ui;

use anyhow::Context as _;
use app::PointsDashboardApp;
use clap::Parser;
use config::{Cli, DashboardConfig, DataConfig};
use context::DashboardContext;
use eframe::egui;
use state::AppState;

const SUPPORTED_EXTENSIONS: [&str; 8] = ["xlsx", "xlsm", "xls", "ods", "csv", "json", "parquet", "pq"];

/// Ask for any dataset whose configured path does not exist.
///
/// A cancelled dialog keeps the configured path, so loading then reports it.
fn pick_missing_sources(data: &mut DataConfig) {
    for (label, path) in [
        ("points", &mut data.points_path),
        ("coordinates", &mut data.coords_path),
    ] {
        if path.exists() {
            continue;
        }
        log::warn!("The {label} dataset {} was not found", path.display());
        if let Some(picked) = rfd::FileDialog::new()
            .set_title(format!("Open {label} dataset"))
            .add_filter("Supported files", &SUPPORTED_EXTENSIONS)
            .pick_file()
        {
            *path = picked;
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = DashboardConfig::resolve(&cli)?;
    pick_missing_sources(&mut config.data);

    let context = DashboardContext::load(&config)
        .inspect_err(|e| log::error!("Failed to load datasets: {e}"))
        .context("loading datasets")?;
    log::info!(
        "Loaded {} points from {} companies",
        context.table.len(),
        context.table.distinct(data::model::Dimension::Company).len()
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Points Dashboard – Interactive Map",
        options,
        Box::new(move |cc| {
            // Install image loaders so popups can show company logos.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(PointsDashboardApp::new(AppState::new(context))))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
