//! Async logging example
//!
//! Demonstrates a queued logger fed by several threads, with a registry
//! handing out named loggers.
//!
//! Run with: cargo run --example async_logging

use std::sync::Arc;
use std::thread;
use tiny_logger::prelude::*;

fn main() -> Result<()> {
    println!("=== Tiny Logger - Async Logging Example ===\n");

    let registry = LoggerRegistry::new("demo");
    let logger = registry.register(
        LoggerKind::Async,
        "worker",
        ConsoleSink::stdout().into_sink(),
    )?;
    registry.file_logger(LoggerKind::Async, "worker", "async_test.log")?;
    registry.set_pattern("%T [%N] [%t] %v");

    println!("1. High-throughput async logging:");
    for i in 0..100 {
        logger.info(format!("Message #{}", i));
    }
    logger.wait();
    println!("   Logged 100 messages asynchronously");

    println!("\n2. Multi-threaded logging:");
    let handles: Vec<_> = (0..5)
        .map(|thread_id| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..20 {
                    logger.info(format!("Thread {} - Message {}", thread_id, i));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("producer thread panicked");
    }
    println!("   5 threads logged 20 messages each");

    println!("\n3. Child logger sharing the parent's kind:");
    let child = registry.get_child(&logger, "io")?;
    child.add_sink(ConsoleSink::stdout().into_sink());
    child.warning("Child logger online");

    logger.flush()?;
    logger.wait();
    child.wait();

    let metrics = logger.metrics();
    println!(
        "\nLogged: {}, dropped: {}",
        metrics.total_logged(),
        metrics.dropped_count()
    );

    println!("\n=== Example completed successfully! ===");
    println!("Check 'async_test.log' for file output");

    Ok(())
}
