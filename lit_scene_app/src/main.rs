//! Lit scene demo
//!
//! Fly around a lit room with WASD and the mouse; scroll to zoom, Escape to quit.

mod app;
mod scene;

use raster_engine::config::{Config, SceneConfig};
use raster_engine::foundation::logging;

use crate::app::LitSceneApp;

const CONFIG_PATH: &str = "res/config.toml";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("PANIC occurred: {}", panic_info);
    }));

    logging::init();
    log::info!("Starting lit scene demo");
    if let Ok(cwd) = std::env::current_dir() {
        log::debug!("Current working directory: {:?}", cwd);
    }

    let config = SceneConfig::load_or_default(CONFIG_PATH)?;

    let mut app = LitSceneApp::new(&config).map_err(|e| {
        log::error!("Startup failed: {}", e);
        e
    })?;
    app.run();

    log::info!("Lit scene demo finished");
    Ok(())
}
