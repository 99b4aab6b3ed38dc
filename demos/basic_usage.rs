//! Basic logger usage example
//!
//! Demonstrates a synchronous logger writing to the console at different levels.
//!
//! Run with: cargo run --example basic_usage

use tiny_logger::prelude::*;
use tiny_logger::{info, warn};

fn main() -> Result<()> {
    println!("=== Tiny Logger - Basic Usage Example ===\n");

    let logger = Logger::builder("basic")
        .pattern("%T.%f [%L] %v")
        .sink(ConsoleSink::stdout().into_sink())
        .build_sync();

    println!("1. Logging at different levels:");
    logger.trace("This is a trace message");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.warning("This is a warning message");
    logger.error("This is an error message");
    logger.critical("This is a critical message");
    logger.fatal("This is a fatal message");

    println!("\n2. Raising the threshold to INFO:");
    logger.set_level(LogLevel::Info);
    logger.debug("Debug message (hidden)");
    info!(logger, "Info message with argument {}", 42);
    warn!(logger, "Warning message (visible)");

    println!("\n3. Changing the pattern at runtime:");
    logger.set_pattern("%+");
    logger.info("Default pattern");

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
