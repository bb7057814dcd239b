//! Shader-toy task shells.
//!
//! Each task renders a compute-generated procedural texture composited with a
//! static image, keeping a configurable number of frames in flight.

pub mod app;
pub mod app_loop;
pub mod backend;
pub mod config;
pub mod params;
pub mod sequencer;
pub mod shaders;

#[cfg(test)]
pub(crate) mod testing;

use anyhow::Result;

use kiln_engine::logging::{init_logging, LoggingConfig};
use kiln_engine::window::Runtime;

pub use app::ToyApp;
pub use config::TaskConfig;

/// Initializes logging and runs `config` until its window closes.
pub fn run(config: TaskConfig) -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = config.with_env_overrides()?;
    log::debug!("{config:?}");

    Runtime::run(config.runtime_config(), config.gpu_init(), ToyApp::new(config))
}
