#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use eframe::egui;
use egui_dockstat::app::EguiDockstat;
use tr::{tr, tr_init};

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(tr!("Docker Status"))
            .with_inner_size([900.0, 600.0])
            .with_resizable(true),
        renderer: eframe::Renderer::Wgpu,
        ..Default::default()
    };

    tr_init!("./locales");

    eframe::run_native(
        "egui_dockstat",
        options,
        Box::new(|cc| Ok(Box::new(EguiDockstat::new(cc)))),
    )
}
