//! Config-driven growpart run: the policy around the orchestrator.

use crate::backend::default_scratch_base;
use crate::config::GrowpartConfig;
use crate::errors::SelectError;
use crate::orchestrator::resize_devices;
use crate::report::{ResizeAction, ResizeReport};
use crate::resolver::DeviceResolver;
use crate::selector::BackendSelector;
use regrow_hal::RegrowHal;
use std::path::PathBuf;
use std::time::Instant;

/// Presence of this file disables growpart unless `ignore_growroot_disabled` is set.
pub const GROWROOT_DISABLED: &str = "/etc/growroot-disabled";

/// Host locations the run depends on.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub sentinel: PathBuf,
    pub scratch_base: PathBuf,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            sentinel: PathBuf::from(GROWROOT_DISABLED),
            scratch_base: default_scratch_base(),
        }
    }
}

/// How a run ended when it did not fail outright.
#[derive(Debug)]
pub enum RunDisposition {
    /// Switched off by mode or sentinel.
    Disabled(String),
    NoDevices,
    /// Auto mode found no usable resizer.
    NoBackend(SelectError),
    Completed(ResizeReport),
}

/// Run growpart for `cfg`. Selection errors in an explicit mode are returned as errors;
/// in auto mode they end the run quietly.
pub fn handle<H: RegrowHal + ?Sized>(
    cfg: &GrowpartConfig,
    hal: &H,
    opts: &RunOptions,
) -> anyhow::Result<RunDisposition> {
    let Some(mode) = cfg.mode.selector_mode() else {
        log::debug!("growpart disabled: mode={}", cfg.mode);
        return Ok(RunDisposition::Disabled(format!("mode={}", cfg.mode)));
    };

    if !cfg.ignore_growroot_disabled && hal.is_regular_file(&opts.sentinel) {
        log::debug!("growpart disabled: {} exists", opts.sentinel.display());
        log::debug!("use ignore_growroot_disabled to ignore");
        return Ok(RunDisposition::Disabled(format!(
            "{} exists",
            opts.sentinel.display()
        )));
    }

    if cfg.devices.is_empty() {
        log::debug!("growpart: empty device list");
        return Ok(RunDisposition::NoDevices);
    }

    let timeouts = cfg.timeouts();
    let selector = BackendSelector::standard(hal, timeouts, opts.scratch_base.clone());
    let backend = match selector.select(mode) {
        Ok(backend) => backend,
        Err(err) => {
            log::debug!("growpart unable to find resizer for '{}': {}", mode, err);
            if cfg.mode.is_auto() && err.is_no_backend() {
                return Ok(RunDisposition::NoBackend(err));
            }
            return Err(err.into());
        }
    };
    log::debug!("using resizer {}", backend.name());

    let resolver = DeviceResolver::for_host(hal, timeouts.probe)?;

    let started = Instant::now();
    let report = resize_devices(&resolver, backend, &cfg.devices);
    log::debug!(
        "resize_devices took {:.3} seconds",
        started.elapsed().as_secs_f64()
    );

    for entry in &report.entries {
        if entry.outcome.action == ResizeAction::Changed {
            log::info!("'{}' resized: {}", entry.entry, entry.outcome.message);
        } else {
            log::debug!(
                "'{}' {}: {}",
                entry.entry,
                entry.outcome.action,
                entry.outcome.message
            );
        }
    }

    Ok(RunDisposition::Completed(report))
}
