//! CLI argument parsing for regrow.

use crate::config::{GrowpartConfig, Mode, DEFAULT_CONFIG_PATH};
use crate::module::GROWROOT_DISABLED;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "regrow")]
#[command(version)]
#[command(about = "Grow partitions into newly available disk space")]
#[command(long_about = "Grow partitions into newly available disk space.\n\n\
    Each device entry (a mount point or a /dev path) is mapped to its disk and partition\n\
    index and grown with growpart (Linux) or gpart (FreeBSD/DragonFly).")]
pub struct Cli {
    /// Config file with a [growpart] table
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Resize mode: auto, off, growpart or gpart (overrides the config file)
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Device entry to grow (repeatable; replaces the configured list)
    #[arg(short, long = "device")]
    pub devices: Vec<String>,

    /// Run even if the growroot-disabled sentinel exists
    #[arg(long)]
    pub ignore_growroot_disabled: bool,

    /// Sentinel file that disables growpart
    #[arg(long, default_value = GROWROOT_DISABLED)]
    pub sentinel: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Overlay command-line overrides onto the configured values.
    pub fn apply_overrides(&self, mut cfg: GrowpartConfig) -> GrowpartConfig {
        if let Some(mode) = &self.mode {
            cfg.mode = Mode::parse(mode);
        }
        if !self.devices.is_empty() {
            cfg.devices = self.devices.clone();
        }
        if self.ignore_growroot_disabled {
            cfg.ignore_growroot_disabled = true;
        }
        cfg
    }
}
