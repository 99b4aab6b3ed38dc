//! File logging example
//!
//! Demonstrates plain, size-rotated and daily file sinks on one logger.
//!
//! Run with: cargo run --example file_logging

use std::time::Duration;
use tiny_logger::prelude::*;

fn main() -> Result<()> {
    println!("=== Tiny Logger - File Logging Example ===\n");

    let logger = Logger::builder("files")
        .auto_flush_level(LogLevel::Error)
        .flush_interval(Duration::from_millis(250))
        .sink(FileSink::new("logs/application.log")?.into_sink())
        .sink(RotatingFileSink::with_limits("logs/rotating.log", 4 * 1024, 3)?.into_sink())
        .sink(DailyFileSink::new("logs/daily.log", 0, 0, 0)?.into_sink())
        .build_async()?;

    println!("1. Logging to three file sinks:");
    logger.info("Application started");
    logger.debug("Loading configuration...");
    logger.warning("Using default settings for some options");
    logger.error("Failed to load optional plugin");

    println!("\n2. Filling the rotating file:");
    for i in 1..=200 {
        logger.info(format!("Processing item {}/200", i));
    }

    logger.flush()?;
    logger.wait();

    println!("\n=== Example completed successfully! ===");
    println!("Check the 'logs' directory; rotating.log.1 .. rotating.log.3 hold older output");

    Ok(())
}
