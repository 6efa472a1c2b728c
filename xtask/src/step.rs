//! One cargo (or tool) invocation with timed, colored progress output.

use anyhow::{Context, Result};
use colored::Colorize;
use std::process::{Command, Output};
use std::time::Instant;

/// What a failing step does to the overall task.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    /// Print the output and abort the task
    Abort,
    /// Print the output as a warning and keep going
    Warn,
}

/// Run `cmd`, report under `label`, and return its output on success.
///
/// With [`OnFailure::Warn`] a failed step returns `Ok(None)`.
pub fn run(label: &str, cmd: &mut Command, on_failure: OnFailure) -> Result<Option<Output>> {
    println!("{}", format!("  {label}...").cyan());
    let start = Instant::now();

    let output = cmd
        .output()
        .with_context(|| format!("Failed to spawn step: {label}"))?;

    if output.status.success() {
        println!(
            "{}",
            format!("  ✓ {label} passed in {:.2}s", start.elapsed().as_secs_f64()).green()
        );
        println!();
        return Ok(Some(output));
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    match on_failure {
        OnFailure::Abort => {
            eprintln!("{}", format!("  ✗ {label} failed").red().bold());
            eprintln!();
            for line in stdout.lines().chain(stderr.lines()) {
                eprintln!("  {line}");
            }
            anyhow::bail!("{label} failed");
        }
        OnFailure::Warn => {
            eprintln!("{}", format!("  ⚠ {label} reported problems").yellow().bold());
            eprintln!();
            eprintln!("{stderr}");
            println!();
            Ok(None)
        }
    }
}

/// `cargo <args>`
pub fn cargo(args: &[&str]) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(args);
    cmd
}

/// Pull the pass counts out of libtest output, summed over every test
/// binary in the run.
pub fn test_summary(stdout: &str) -> String {
    let (mut passed, mut binaries) = (0u64, 0u64);
    for line in stdout.lines().filter(|l| l.contains("test result:")) {
        binaries = binaries.saturating_add(1);
        let words: Vec<&str> = line.split_whitespace().collect();
        let count = words
            .iter()
            .position(|w| w.starts_with("passed"))
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| words.get(i))
            .and_then(|n| n.parse::<u64>().ok())
            .unwrap_or(0);
        passed = passed.saturating_add(count);
    }
    if binaries == 0 {
        "(summary not available)".to_string()
    } else {
        format!("({passed} passed across {binaries} test binaries)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_sums_binaries() {
        let out = "test result: ok. 5 passed; 0 failed; 0 ignored; 0 measured; 0 filtered out\n\
                   noise\n\
                   test result: ok. 12 passed; 0 failed; 0 ignored; 0 measured; 0 filtered out\n";
        assert_eq!(test_summary(out), "(17 passed across 2 test binaries)");
    }

    #[test]
    fn test_summary_missing() {
        assert_eq!(test_summary("nothing here"), "(summary not available)");
    }
}
