//! Backend selection by resize mode.

use crate::backend::{BackendKind, GpartBackend, GrowpartBackend, ResizeBackend, Timeouts};
use crate::errors::SelectError;
use regrow_hal::RegrowHal;
use std::path::PathBuf;

/// Mode value that probes every backend in priority order.
pub const AUTO_MODE: &str = "auto";

/// Ordered, immutable set of backends to choose from.
pub struct BackendSelector<'a> {
    backends: Vec<Box<dyn ResizeBackend + 'a>>,
}

impl<'a> BackendSelector<'a> {
    pub fn new(backends: Vec<Box<dyn ResizeBackend + 'a>>) -> Self {
        Self { backends }
    }

    /// growpart first, then gpart.
    pub fn standard<H: RegrowHal + ?Sized>(
        hal: &'a H,
        timeouts: Timeouts,
        scratch_base: PathBuf,
    ) -> Self {
        let backends = BackendKind::ALL
            .into_iter()
            .map(|kind| -> Box<dyn ResizeBackend + 'a> {
                match kind {
                    BackendKind::Growpart => {
                        Box::new(GrowpartBackend::new(hal, timeouts, scratch_base.clone()))
                    }
                    BackendKind::Gpart => Box::new(GpartBackend::new(hal, timeouts)),
                }
            })
            .collect();
        Self::new(backends)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Pick a backend for `mode`. `auto` returns the first available backend; any other
    /// value must name a registered backend, which must then be available.
    pub fn select(&self, mode: &str) -> Result<&(dyn ResizeBackend + 'a), SelectError> {
        if mode == AUTO_MODE {
            return self
                .backends
                .iter()
                .find(|b| {
                    let available = b.available();
                    log::debug!("resizer {} available: {}", b.name(), available);
                    available
                })
                .map(|b| b.as_ref())
                .ok_or(SelectError::NoBackendAvailable);
        }

        let backend = self
            .backends
            .iter()
            .find(|b| b.name() == mode)
            .ok_or_else(|| SelectError::UnknownMode(mode.to_string()))?;
        if !backend.available() {
            return Err(SelectError::ModeUnavailable(mode.to_string()));
        }
        Ok(backend.as_ref())
    }
}
