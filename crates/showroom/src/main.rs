//! Furniture showroom
//!
//! Loads the furniture catalog, opens an AR placement session against a
//! simulated tracking session and plays the scripted demo through it.
//!
//! ```text
//! showroom [config.toml | config.ron]
//! ```

mod assets;
mod config;
mod renderer;
mod script;
mod simulation;

use ar_placement::catalog::{AssetError, Catalog};
use ar_placement::config::{Config, ConfigError};
use ar_placement::events::SessionEventKind;
use ar_placement::foundation::logging;
use ar_placement::{ArSession, SessionError};
use thiserror::Error;

use crate::config::ShowroomConfig;
use crate::renderer::LogRenderer;
use crate::script::{ScriptRunner, StatusLine};
use crate::simulation::SimulatedTracking;

/// Showroom errors
#[derive(Error, Debug)]
enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("No catalog item could be loaded ({} failures)", .0.len())]
    EmptyCatalog(Vec<AssetError>),
}

fn load_config() -> Result<ShowroomConfig, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => ShowroomConfig::load_from_file(&path),
        None => Ok(ShowroomConfig::default()),
    }
}

fn main() -> Result<(), AppError> {
    let config = load_config()?;
    logging::init_with_filter(&config.session.logging.filter);
    config.validate()?;

    log::info!("Starting furniture showroom");

    let loader = config.assets.loader()?;
    log::info!("Loading {} catalog items from {}", config.catalog.len(), config.assets.root.display());
    let (catalog, failures) = Catalog::load(&config.catalog, &loader, &config.assets.root);
    if catalog.is_empty() {
        return Err(AppError::EmptyCatalog(failures));
    }

    let mut session = ArSession::new(config.session.clone())?;
    session.register_handler(SessionEventKind::StatusChanged, Box::new(StatusLine));
    let mut tracking = SimulatedTracking::new(&config.simulation);
    let mut renderer = LogRenderer::new();

    let steps = script::demo(&catalog);
    let report = ScriptRunner::new(&mut session, &mut tracking, &mut renderer, &catalog).run(&steps)?;

    log::info!(
        "Showroom finished: {} steps, {} frames, {} objects placed, {} notifications",
        report.steps,
        report.frames,
        report.placed,
        report.events
    );
    log::info!(
        "Tracking answered {} hit-test frames; viewer ended at {:?}",
        tracking.frames(),
        tracking.viewer().position
    );
    if let Some(summary) = renderer.last_summary() {
        log::info!("Last frame showed [{}]", summary.objects.join(", "));
    }
    for (id, object) in session.placed_objects() {
        let (yaw, _, _) = object.pose.yaw_pitch_roll();
        log::info!(
            "  {id:?} {} at ({:.2}, {:.2}, {:.2}) yaw {yaw:.2} scale {:.2}",
            object.item(),
            object.pose.position.x,
            object.pose.position.y,
            object.pose.position.z,
            object.scale()
        );
    }
    Ok(())
}
