use anyhow::Result;
use colored::Colorize;
use std::time::Instant;

use crate::step::{self, cargo, OnFailure};

pub fn run(unit_only: bool, integration_only: bool) -> Result<()> {
    println!();
    println!("{}", "🧪 Running tests...".cyan().bold());
    println!();

    let total_start = Instant::now();

    let run_unit = !integration_only;
    let run_integration = !unit_only;

    if run_unit {
        if let Some(out) = step::run(
            "Unit tests",
            &mut cargo(&["test", "--lib", "--workspace"]),
            OnFailure::Abort,
        )? {
            println!("    {}", step::test_summary(&String::from_utf8_lossy(&out.stdout)).dimmed());
        }
    }

    // tests/ directories: power-cycle scenarios, architecture boundaries,
    // proptest properties for the counter engine.
    if run_integration {
        if let Some(out) = step::run(
            "Integration and property tests",
            &mut cargo(&["test", "--workspace", "--tests", "--exclude", "xtask"]),
            OnFailure::Abort,
        )? {
            println!("    {}", step::test_summary(&String::from_utf8_lossy(&out.stdout)).dimmed());
        }
    }

    step::run(
        "Doc tests",
        &mut cargo(&["test", "--doc", "--workspace"]),
        OnFailure::Warn,
    )?;

    println!(
        "{}",
        format!(
            "✓ All tests completed in {:.2}s",
            total_start.elapsed().as_secs_f64()
        )
        .green()
        .bold()
    );
    println!();

    Ok(())
}
