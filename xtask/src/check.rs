use anyhow::Result;
use colored::Colorize;
use std::time::Instant;

use crate::step::{self, cargo, OnFailure};

const TARGET: &str = "thumbv7em-none-eabihf";

pub fn run() -> Result<()> {
    println!();
    println!("{}", "🔍 Checking builds...".cyan().bold());
    println!();

    let total_start = Instant::now();

    // The engine and the HAL must build bare-metal without the firmware.
    step::run(
        "Checking counter crate (no_std)",
        &mut cargo(&["check", "-p", "counter", "--target", TARGET]),
        OnFailure::Abort,
    )?;
    step::run(
        "Checking platform crate (no_std)",
        &mut cargo(&["check", "-p", "platform", "--target", TARGET, "--no-default-features"]),
        OnFailure::Abort,
    )?;
    step::run(
        "Checking hardware target (STM32H7)",
        &mut cargo(&["check", "-p", "firmware", "--target", TARGET, "--features", "hardware"]),
        OnFailure::Abort,
    )?;
    step::run(
        "Checking simulator (host)",
        &mut cargo(&["check", "-p", "firmware", "--features", "emulator", "--examples"]),
        OnFailure::Abort,
    )?;

    // Host-side lints; hardware-only code is covered by the target check above.
    step::run(
        "Running clippy",
        &mut cargo(&["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"]),
        OnFailure::Warn,
    )?;
    if step::run(
        "Checking code formatting",
        &mut cargo(&["fmt", "--all", "--check"]),
        OnFailure::Warn,
    )?
    .is_none()
    {
        eprintln!("     Run 'cargo fmt --all' to fix");
    }

    println!(
        "{}",
        format!(
            "✓ All checks completed in {:.2}s",
            total_start.elapsed().as_secs_f64()
        )
        .green()
        .bold()
    );
    println!();

    Ok(())
}
