//! Build the hardware image and write it to the board with probe-rs.

use anyhow::Result;
use colored::Colorize;
use std::process::Command;

use crate::step::{self, cargo, OnFailure};

const TARGET: &str = "thumbv7em-none-eabihf";
const CHIP: &str = "STM32H743ZITx";

pub fn run(release: bool) -> Result<()> {
    let mut build = cargo(&[
        "build",
        "-p",
        "firmware",
        "--target",
        TARGET,
        "--features",
        "hardware",
    ]);
    if release {
        build.arg("--release");
    }
    step::run("Building firmware", &mut build, OnFailure::Abort)?;

    let image = binary_path(release);
    let mut download = Command::new("probe-rs");
    download.args(["download", "--chip", CHIP, image.as_str()]);
    step::run("Flashing", &mut download, OnFailure::Abort)?;

    let mut reset = Command::new("probe-rs");
    reset.args(["reset", "--chip", CHIP]);
    step::run("Resetting board", &mut reset, OnFailure::Warn)?;

    println!(
        "   {}",
        format!("probe-rs attach --chip {CHIP} {image}  # RTT logs").dimmed()
    );
    Ok(())
}

fn binary_path(release: bool) -> String {
    let profile = if release { "release" } else { "debug" };
    format!("target/{TARGET}/{profile}/firmware")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_path_follows_profile() {
        assert_eq!(
            binary_path(true),
            "target/thumbv7em-none-eabihf/release/firmware"
        );
        assert_eq!(
            binary_path(false),
            "target/thumbv7em-none-eabihf/debug/firmware"
        );
    }
}
