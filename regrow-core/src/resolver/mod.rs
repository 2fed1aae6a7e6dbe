//! Device entry resolution.
//!
//! A device entry (mount point or `/dev` path) is turned into the partition device node, its
//! parent disk and the partition index. The platform-specific half of that mapping lives
//! behind [`PartitionTopology`], chosen once per host and injected into [`DeviceResolver`].

pub mod bsd;
pub mod linux;

use crate::errors::ResolveError;
use crate::platform::Platform;
use crate::report::ResolvedDevice;
use anyhow::anyhow;
use regrow_hal::procfs::cmdline::root_device_from_cmdline;
use regrow_hal::RegrowHal;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use bsd::{BsdFlavor, BsdTopology};
pub use linux::SysfsTopology;

/// Mount source the kernel reports when it mounted `/` itself.
pub const ROOT_PLACEHOLDER: &str = "/dev/root";

/// Anything that can turn a device entry into a [`ResolvedDevice`].
pub trait Resolve {
    fn resolve(&self, entry: &str) -> Result<ResolvedDevice, ResolveError>;
}

/// Platform strategy for mount-table lookup and partition topology.
pub trait PartitionTopology {
    fn name(&self) -> &'static str;

    /// Source device of the mount containing `path`, if any.
    fn mount_source(&self, path: &Path) -> Result<Option<String>, String>;

    /// Map a canonical partition device onto `(disk, partition index)`.
    fn partition_info(&self, device: &Path) -> Result<(PathBuf, String), ResolveError>;
}

pub struct DeviceResolver<'a, H: RegrowHal + ?Sized> {
    hal: &'a H,
    topology: Box<dyn PartitionTopology + 'a>,
}

impl<'a, H: RegrowHal + ?Sized> DeviceResolver<'a, H> {
    pub fn new(hal: &'a H, topology: Box<dyn PartitionTopology + 'a>) -> Self {
        Self { hal, topology }
    }

    pub fn for_platform(hal: &'a H, platform: Platform, probe_timeout: Duration) -> Self {
        let topology: Box<dyn PartitionTopology + 'a> = match platform {
            Platform::Linux => Box::new(SysfsTopology::new(hal)),
            Platform::FreeBsd => Box::new(BsdTopology::new(hal, BsdFlavor::FreeBsd, probe_timeout)),
            Platform::DragonFly => {
                Box::new(BsdTopology::new(hal, BsdFlavor::DragonFly, probe_timeout))
            }
        };
        log::debug!("device resolver using {} topology", topology.name());
        Self::new(hal, topology)
    }

    /// Pick the topology from the platform the HAL reports.
    pub fn for_host(hal: &'a H, probe_timeout: Duration) -> anyhow::Result<Self> {
        let name = hal.platform_name();
        let platform = Platform::from_os_name(&name)
            .ok_or_else(|| anyhow!("unsupported platform for partition resolution: {}", name))?;
        Ok(Self::for_platform(hal, platform, probe_timeout))
    }

    /// Map an entry onto a device path: `/dev/...` entries pass through, anything else is
    /// looked up in the mount table.
    pub fn device_path(&self, entry: &str) -> Result<String, ResolveError> {
        if entry.starts_with("/dev/") {
            return Ok(entry.to_string());
        }

        if !self.hal.path_exists(Path::new(entry)) {
            return Err(ResolveError::Unresolvable {
                entry: entry.to_string(),
                reason: format!("'{}' does not exist", entry),
            });
        }

        let source = self
            .topology
            .mount_source(Path::new(entry))
            .map_err(|reason| ResolveError::Unresolvable {
                entry: entry.to_string(),
                reason,
            })?
            .ok_or_else(|| ResolveError::Unresolvable {
                entry: entry.to_string(),
                reason: format!("could not determine device of '{}'", entry),
            })?;

        if source == ROOT_PLACEHOLDER && !self.hal.is_container() {
            return self.resolve_root_placeholder(entry);
        }
        Ok(source)
    }

    /// `/dev/root` usually does not exist as a node; the real device comes from `root=`.
    /// If the command line has no `root=` but `/dev/root` happens to exist, use it as-is.
    fn resolve_root_placeholder(&self, entry: &str) -> Result<String, ResolveError> {
        let cmdline = match self.hal.proc_cmdline() {
            Ok(c) => c,
            Err(err) => {
                log::debug!("unable to read kernel command line: {}", err);
                String::new()
            }
        };
        if let Some(dev) = root_device_from_cmdline(&cmdline) {
            log::debug!("{} resolved to {} via kernel command line", ROOT_PLACEHOLDER, dev);
            return Ok(dev);
        }
        if self.hal.path_exists(Path::new(ROOT_PLACEHOLDER)) {
            return Ok(ROOT_PLACEHOLDER.to_string());
        }
        Err(ResolveError::Unresolvable {
            entry: entry.to_string(),
            reason: format!("Unable to find device '{}'", ROOT_PLACEHOLDER),
        })
    }
}

impl<'a, H: RegrowHal + ?Sized> Resolve for DeviceResolver<'a, H> {
    fn resolve(&self, entry: &str) -> Result<ResolvedDevice, ResolveError> {
        let dev = PathBuf::from(self.device_path(entry)?);

        let block_device = self
            .hal
            .canonicalize(&dev)
            .map_err(|source| ResolveError::StatFailed {
                path: dev.clone(),
                source,
            })?;
        let kind = self
            .hal
            .device_kind(&block_device)
            .map_err(|source| ResolveError::StatFailed {
                path: block_device.clone(),
                source,
            })?;
        if !kind.is_device() {
            return Err(ResolveError::NotABlockDevice { path: block_device });
        }

        let (disk, partition) = self.topology.partition_info(&block_device)?;
        Ok(ResolvedDevice {
            block_device,
            disk,
            partition,
        })
    }
}
