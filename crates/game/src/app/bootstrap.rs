use std::process::ExitCode;

use platformer_engine::{resolve_app_paths, LoopConfig, Scene};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use super::level::LevelScene;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
}

pub(crate) fn build_app() -> Result<AppWiring, ExitCode> {
    init_tracing();
    info!("=== Platformer Startup ===");

    let paths = resolve_app_paths().map_err(|err| {
        error!(error = %err, "startup_failed");
        ExitCode::FAILURE
    })?;
    info!(root = %paths.root.display(), "project_root_resolved");

    let config = LoopConfig::default();
    let scene = LevelScene::new(paths, (config.display_width, config.display_height));
    Ok(AppWiring {
        config,
        scene: Box::new(scene),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
