// GUI-subsystem binary: no console window is ever allocated by Windows.
#![windows_subsystem = "windows"]

use eframe::egui;
use planfe::app::PlanFEApp;
use planfe::{i18n, logger};

fn main() -> Result<(), eframe::Error> {
    // Initialize session log (overwrites previous session log)
    logger::init();

    // Initialize the internationalization system
    i18n::init();

    // Application icon (window title bar, taskbar, Alt+Tab), rasterized
    // at startup so no binary assets ship with the crate.
    let icon = load_app_icon();

    // Define the native window options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 600.0])
            .with_min_inner_size([360.0, 300.0])
            .with_title("PlanFE")
            .with_icon(std::sync::Arc::new(icon)),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "PlanFE",
        options,
        Box::new(|cc| Box::new(PlanFEApp::new(cc))),
    )
}

/// Rasterize the app mark into raw RGBA for the egui viewport.
fn load_app_icon() -> egui::viewport::IconData {
    const ICON_DIM: usize = 64;
    egui::viewport::IconData {
        rgba: planfe::assets::app_icon_rgba(ICON_DIM),
        width: ICON_DIM as u32,
        height: ICON_DIM as u32,
    }
}
