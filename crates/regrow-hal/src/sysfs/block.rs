//! Helpers related to block devices in sysfs.

use crate::{HalError, HalResult};
use std::path::{Path, PathBuf};

pub const SYS_CLASS_BLOCK: &str = "/sys/class/block";
pub const DEV_BLOCK: &str = "/dev/block";

pub fn device_basename(path: &Path) -> HalResult<String> {
    let name = path
        .file_name()
        .ok_or_else(|| HalError::Parse(format!("invalid device path {}", path.display())))?
        .to_string_lossy()
        .to_string();
    Ok(name)
}

/// Where the sysfs class tree and the udev `major:minor` links live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysfsLayout {
    pub class_block: PathBuf,
    pub dev_block: PathBuf,
}

impl Default for SysfsLayout {
    fn default() -> Self {
        Self {
            class_block: PathBuf::from(SYS_CLASS_BLOCK),
            dev_block: PathBuf::from(DEV_BLOCK),
        }
    }
}

impl SysfsLayout {
    /// `/sys/class/block/<name>`
    pub fn class_entry(&self, name: &str) -> PathBuf {
        self.class_block.join(name)
    }

    /// `/dev/block/<major>:<minor>`
    pub fn dev_node(&self, major: u32, minor: u32) -> PathBuf {
        self.dev_block.join(format!("{}:{}", major, minor))
    }
}

/// Parse the content of a sysfs `partition` attribute (a 1-based decimal number).
pub fn parse_partition_number(raw: &str) -> HalResult<String> {
    let value = raw.trim_end();
    match value.parse::<u32>() {
        Ok(n) if n >= 1 => Ok(value.to_string()),
        _ => Err(HalError::Parse(format!(
            "invalid partition number {:?}",
            value
        ))),
    }
}

/// Parse the content of a sysfs `dev` attribute (`major:minor`).
pub fn parse_major_minor(raw: &str) -> HalResult<(u32, u32)> {
    let value = raw.trim();
    let (major, minor) = value
        .split_once(':')
        .ok_or_else(|| HalError::Parse(format!("invalid device number {:?}", value)))?;
    let major = major
        .parse::<u32>()
        .map_err(|_| HalError::Parse(format!("invalid major number {:?}", major)))?;
    let minor = minor
        .parse::<u32>()
        .map_err(|_| HalError::Parse(format!("invalid minor number {:?}", minor)))?;
    Ok((major, minor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_basename_extracts_filename() {
        assert_eq!(
            device_basename(Path::new("/dev/nvme0n1p2")).unwrap(),
            "nvme0n1p2".to_string()
        );
        assert!(device_basename(Path::new("/")).is_err());
    }

    #[test]
    fn layout_builds_paths() {
        let layout = SysfsLayout::default();
        assert_eq!(
            layout.class_entry("sdb1"),
            PathBuf::from("/sys/class/block/sdb1")
        );
        assert_eq!(layout.dev_node(8, 16), PathBuf::from("/dev/block/8:16"));
    }

    #[test]
    fn partition_number_parsing() {
        assert_eq!(parse_partition_number("1\n").unwrap(), "1");
        assert_eq!(parse_partition_number("15").unwrap(), "15");
        assert!(parse_partition_number("0\n").is_err());
        assert!(parse_partition_number("").is_err());
        assert!(parse_partition_number("p1").is_err());
    }

    #[test]
    fn major_minor_parsing() {
        assert_eq!(parse_major_minor("253:0\n").unwrap(), (253, 0));
        assert!(parse_major_minor("253").is_err());
        assert!(parse_major_minor("x:1").is_err());
    }
}
