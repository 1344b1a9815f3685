//! Basic pipeline usage example
//!
//! Builds a console + file pipeline from a configuration, logs at the
//! different severities, and changes the threshold at runtime.
//!
//! Run with: cargo run --example basic_usage

use fanlog::prelude::*;
use fanlog::{fields, info, warn};

fn main() -> Result<()> {
    let config = PipelineConfig {
        level: "debug".to_string(),
        add_caller: true,
        console: ConsoleConfig {
            enable: true,
            encoder: None,
        },
        file: FileConfig {
            enable: true,
            rotate: FileRotateConfig {
                dir: "./logs".to_string(),
                name: "demo.log".to_string(),
                max_size: 10,
                max_backup: 3,
                ..Default::default()
            },
            encoder: None,
        },
        ..Default::default()
    };

    let logger = config.build()?;

    logger.debug("starting up")?;
    info!(logger, "listening on port {}", 8080)?;
    warn!(logger, "connection pool at {}%", 85)?;
    logger.log(
        Severity::Error,
        "request failed",
        fields! { "status" => 502, "path" => "/api/items" },
    )?;

    // Raise the threshold: debug and info stop flowing everywhere at once
    logger.set_level(Severity::Warn);
    logger.debug("now invisible")?;
    logger.warn("still visible")?;

    // An independent copy can stay chatty while the original is quiet
    let verbose = logger.clone_with_level()?;
    verbose.set_level(Severity::Debug);
    verbose.debug("clone sees everything again")?;

    logger.flush()?;
    Ok(())
}
