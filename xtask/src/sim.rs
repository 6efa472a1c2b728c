use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;

/// Run the simulator in the foreground so its tracing output streams live.
pub fn run(pulses: u16, log: &str) -> Result<()> {
    println!();
    println!(
        "{}",
        format!("▶ Simulating {pulses} pulses across three power cycles")
            .cyan()
            .bold()
    );
    println!();

    let status = Command::new("cargo")
        .args([
            "run",
            "-p",
            "firmware",
            "--example",
            "counter_simulator",
            "--features",
            "emulator",
            "--",
        ])
        .arg(pulses.to_string())
        .env("RUST_LOG", log)
        .status()
        .context("Failed to run the simulator")?;

    if !status.success() {
        anyhow::bail!("Simulator exited with {status}");
    }

    println!();
    println!("{}", "✓ Simulation finished".green());
    Ok(())
}
