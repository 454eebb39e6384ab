//! # Portal Demo
//!
//! Animated shader plane with an optional OBJ model and environment map.
//!
//! ## Usage:
//! ```bash
//! cargo run --example portal -- [scene.toml]
//! ```
//!
//! Drag to orbit, shift-drag to pan, scroll to zoom, Escape to quit.

use anyhow::Context;
use vitrine::{
    logging::{init_logging, LoggingConfig},
    SceneConfig, VitrineApp,
};

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let config = match std::env::args().nth(1) {
        Some(path) => SceneConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => SceneConfig::default(),
    };

    VitrineApp::new(config)?.run()?;
    Ok(())
}
