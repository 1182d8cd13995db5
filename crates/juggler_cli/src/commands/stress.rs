//! Stress command implementation.

use juggler_testkit::{stress_chain, StressConfig, StressTestResult};
use std::time::Duration;

/// Runs the chain stress test and prints its report.
pub fn run(
    workers: usize,
    resources: u32,
    with_limited: bool,
    jitter_ms: u64,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if resources == 0 || resources > 63 {
        return Err(format!("resources must be between 1 and 63, got {resources}").into());
    }

    let config = StressConfig {
        workers,
        resources,
        with_limited,
        max_jitter: Duration::from_millis(jitter_ms),
    };
    tracing::info!(workers, resources, with_limited, jitter_ms, "starting chain stress");

    let result = stress_chain(&config)?;
    tracing::info!(
        committed = result.committed,
        retries = result.retries,
        "chain verified"
    );

    match format {
        "json" => print_json(&result)?,
        _ => result.print_summary("Chain stress"),
    }
    Ok(())
}

fn print_json(result: &StressTestResult) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}
