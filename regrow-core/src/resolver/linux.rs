//! Linux topology: mount table from `/proc/self/mountinfo`, partitions from sysfs.

use super::PartitionTopology;
use crate::errors::ResolveError;
use regrow_hal::procfs::mountinfo::{mount_containing, parse_mountinfo};
use regrow_hal::sysfs::block::{
    device_basename, parse_major_minor, parse_partition_number, SysfsLayout,
};
use regrow_hal::RegrowHal;
use std::path::{Path, PathBuf};

pub struct SysfsTopology<'a, H: RegrowHal + ?Sized> {
    hal: &'a H,
    layout: SysfsLayout,
}

impl<'a, H: RegrowHal + ?Sized> SysfsTopology<'a, H> {
    pub fn new(hal: &'a H) -> Self {
        Self::with_layout(hal, SysfsLayout::default())
    }

    pub fn with_layout(hal: &'a H, layout: SysfsLayout) -> Self {
        Self { hal, layout }
    }
}

fn topology_err(path: &Path, reason: impl ToString) -> ResolveError {
    ResolveError::Topology {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

impl<'a, H: RegrowHal + ?Sized> PartitionTopology for SysfsTopology<'a, H> {
    fn name(&self) -> &'static str {
        "sysfs"
    }

    fn mount_source(&self, path: &Path) -> Result<Option<String>, String> {
        let content = self
            .hal
            .proc_mountinfo()
            .map_err(|e| format!("unable to read mountinfo: {}", e))?;
        let entries = parse_mountinfo(&content);
        Ok(mount_containing(&entries, path).map(|m| m.source.clone()))
    }

    fn partition_info(&self, device: &Path) -> Result<(PathBuf, String), ResolveError> {
        let name = device_basename(device).map_err(|e| topology_err(device, e))?;

        let syspath = self.layout.class_entry(&name);
        if !self.hal.path_exists(&syspath) {
            return Err(ResolveError::NotAPartition {
                path: device.to_path_buf(),
                reason: format!("{} had no syspath ({})", device.display(), syspath.display()),
            });
        }

        let ptpath = syspath.join("partition");
        if !self.hal.path_exists(&ptpath) {
            return Err(ResolveError::NotAPartition {
                path: device.to_path_buf(),
                reason: format!("{} not a partition", device.display()),
            });
        }
        let raw = self
            .hal
            .read_attribute(&ptpath)
            .map_err(|e| topology_err(device, e))?;
        let partition = parse_partition_number(&raw).map_err(|e| topology_err(device, e))?;

        // For a partition the real sysfs path is .../block/<disk>/<partition>.
        let real_syspath = self
            .hal
            .canonicalize(&syspath)
            .map_err(|e| topology_err(device, e))?;
        let disk_syspath = real_syspath
            .parent()
            .ok_or_else(|| topology_err(device, "partition sysfs entry has no parent"))?;

        let dev_attr = self
            .hal
            .read_attribute(&disk_syspath.join("dev"))
            .map_err(|e| topology_err(device, e))?;
        let (major, minor) = parse_major_minor(&dev_attr).map_err(|e| topology_err(device, e))?;

        // udev keeps /dev/block/<major>:<minor> pointing at the disk node.
        let disk = self
            .hal
            .canonicalize(&self.layout.dev_node(major, minor))
            .map_err(|e| topology_err(device, e))?;

        Ok((disk, partition))
    }
}
