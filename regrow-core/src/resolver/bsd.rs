//! BSD topology: no sysfs, so the partition index is parsed out of the device name.

use super::PartitionTopology;
use crate::errors::ResolveError;
use once_cell::sync::Lazy;
use regex::Regex;
use regrow_hal::procfs::mountinfo::{mount_containing, MountInfo};
use regrow_hal::RegrowHal;
use std::path::{Path, PathBuf};
use std::time::Duration;

static FREEBSD_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(/dev/.+)p([0-9]+)$").expect("valid FreeBSD partition regex"));
static DRAGONFLY_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(/dev/.+)s([0-9]+)$").expect("valid DragonFly partition regex"));

/// GEOM label classes that name a partition indirectly.
const LABEL_CLASSES: [&str; 3] = ["label", "gpt", "ufs"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BsdFlavor {
    /// `vtbd0p2`: GPT partitions with a `p` separator.
    FreeBsd,
    /// `vbd0s1`: slices with an `s` separator.
    DragonFly,
}

impl BsdFlavor {
    fn pattern(self) -> &'static Regex {
        match self {
            BsdFlavor::FreeBsd => &FREEBSD_PART,
            BsdFlavor::DragonFly => &DRAGONFLY_PART,
        }
    }
}

pub struct BsdTopology<'a, H: RegrowHal + ?Sized> {
    hal: &'a H,
    flavor: BsdFlavor,
    timeout: Duration,
}

impl<'a, H: RegrowHal + ?Sized> BsdTopology<'a, H> {
    pub fn new(hal: &'a H, flavor: BsdFlavor, timeout: Duration) -> Self {
        Self {
            hal,
            flavor,
            timeout,
        }
    }

    /// Device name below `/dev/`, translating GEOM labels (`gpt/rootfs`) to their provider
    /// (`vtbd0p2`) on FreeBSD.
    fn provider_name(&self, device: &str) -> Result<String, String> {
        let rest = device
            .strip_prefix("/dev/")
            .ok_or_else(|| format!("unexpected device path {}", device))?;
        let parts: Vec<&str> = rest.split('/').collect();
        if parts.len() == 1 {
            return Ok(rest.to_string());
        }
        if self.flavor == BsdFlavor::FreeBsd && LABEL_CLASSES.contains(&parts[0]) {
            return self.glabel_provider(rest);
        }
        Err(format!("unexpected device path {}", device))
    }

    fn glabel_provider(&self, label: &str) -> Result<String, String> {
        let output = self
            .hal
            .command_output("glabel", &["status", "-s"], self.timeout)
            .map_err(|e| format!("glabel status failed: {}", e))?;
        if !output.status.success() {
            return Err(format!(
                "glabel status failed (exit={:?})",
                output.status.code()
            ));
        }
        parse_glabel_status(&String::from_utf8_lossy(&output.stdout), label)
            .ok_or_else(|| format!("no provider found for label {}", label))
    }
}

/// Find the provider of `label` in `glabel status -s` output
/// (`<label> <status> <provider>` per line).
pub fn parse_glabel_status(output: &str, label: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let items: Vec<&str> = line.split_whitespace().collect();
        match items.as_slice() {
            [name, _, provider, ..] if *name == label => Some(provider.to_string()),
            _ => None,
        }
    })
}

/// Parse `mount -p` output (fstab format: `<device> <mount point> <fstype> <options> ...`).
pub fn parse_mount_p(output: &str) -> Vec<MountInfo> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let source = fields.next()?.to_string();
            let mount_point = PathBuf::from(fields.next()?);
            let fstype = fields.next().unwrap_or_default().to_string();
            Some(MountInfo {
                mount_point,
                fstype,
                source,
            })
        })
        .collect()
}

impl<'a, H: RegrowHal + ?Sized> PartitionTopology for BsdTopology<'a, H> {
    fn name(&self) -> &'static str {
        match self.flavor {
            BsdFlavor::FreeBsd => "freebsd",
            BsdFlavor::DragonFly => "dragonfly",
        }
    }

    fn mount_source(&self, path: &Path) -> Result<Option<String>, String> {
        let output = self
            .hal
            .command_output("mount", &["-p"], self.timeout)
            .map_err(|e| format!("mount -p failed: {}", e))?;
        // mount(8) exits 1 when some filesystems could not be listed; the rest is still usable.
        if !matches!(output.status.code(), Some(0) | Some(1)) {
            return Err(format!("mount -p failed (exit={:?})", output.status.code()));
        }
        let entries = parse_mount_p(&String::from_utf8_lossy(&output.stdout));
        Ok(mount_containing(&entries, path).map(|m| m.source.clone()))
    }

    fn partition_info(&self, device: &Path) -> Result<(PathBuf, String), ResolveError> {
        let device_str = device.to_string_lossy();
        let provider =
            self.provider_name(&device_str)
                .map_err(|reason| ResolveError::NotAPartition {
                    path: device.to_path_buf(),
                    reason,
                })?;
        let full = format!("/dev/{}", provider);
        let pattern = self.flavor.pattern();
        let caps = pattern
            .captures(&full)
            .ok_or_else(|| ResolveError::NotAPartition {
                path: device.to_path_buf(),
                reason: format!("{} does not match {}", full, pattern.as_str()),
            })?;
        Ok((PathBuf::from(&caps[1]), caps[2].to_string()))
    }
}
