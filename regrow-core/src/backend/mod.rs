//! Resize backends: external tools that grow a partition in place.

pub mod gpart;
pub mod growpart;

use crate::errors::ResizeError;
use std::fmt;
use std::path::Path;
use std::time::Duration;

pub use gpart::GpartBackend;
pub use growpart::{default_scratch_base, DryRunVerdict, GrowpartBackend};

/// Forced locale so probe output can be pattern-matched.
pub(crate) const C_LOCALE: (&str, &str) = ("LANG", "C");

/// A partition resize tool.
pub trait ResizeBackend {
    fn kind(&self) -> BackendKind;

    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Whether the tool is installed and supports what we need. Never fails; re-probes on
    /// every call.
    fn available(&self) -> bool;

    /// Grow partition `partition` of `disk` and return `(before, after)` sizes in bytes of
    /// `partition_device`.
    fn resize(
        &self,
        disk: &Path,
        partition: &str,
        partition_device: &Path,
    ) -> Result<(u64, u64), ResizeError>;
}

/// The registered backend implementations, in auto-probe priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Growpart,
    Gpart,
}

impl BackendKind {
    pub const ALL: [BackendKind; 2] = [BackendKind::Growpart, BackendKind::Gpart];

    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Growpart => "growpart",
            BackendKind::Gpart => "gpart",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Timeouts for external commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Availability probes and lookups (`--help`, `glabel`, `mount -p`).
    pub probe: Duration,
    /// Dry-runs, recovery and the resize itself.
    pub resize: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            probe: Duration::from_secs(10),
            resize: Duration::from_secs(300),
        }
    }
}

pub(crate) fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_order_is_growpart_first() {
        assert_eq!(BackendKind::ALL[0], BackendKind::Growpart);
    }

    #[test]
    fn command_line_joins_args() {
        assert_eq!(
            command_line("gpart", &["resize", "-i", "2", "/dev/vtbd0"]),
            "gpart resize -i 2 /dev/vtbd0"
        );
    }
}
