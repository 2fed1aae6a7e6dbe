//! Device node and sysfs inspection.

use crate::HalResult;
use std::path::{Path, PathBuf};

/// File type of a path as far as partition resolution cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Block,
    Char,
    Directory,
    Other,
}

impl DeviceKind {
    /// Block and character special files are both accepted as devices (BSDs expose disks
    /// as character devices).
    pub fn is_device(self) -> bool {
        matches!(self, DeviceKind::Block | DeviceKind::Char)
    }
}

pub trait DeviceOps {
    /// Resolve every symlink in `path`, like `realpath(3)`.
    fn canonicalize(&self, path: &Path) -> HalResult<PathBuf>;

    /// `stat(2)` the path (following symlinks) and classify it.
    fn device_kind(&self, path: &Path) -> HalResult<DeviceKind>;

    fn path_exists(&self, path: &Path) -> bool;

    fn is_regular_file(&self, path: &Path) -> bool;

    /// Read a small text attribute such as `/sys/class/block/sda1/partition`.
    fn read_attribute(&self, path: &Path) -> HalResult<String>;

    /// Current extent of a device in bytes, found by seeking to its end.
    fn device_size(&self, path: &Path) -> HalResult<u64>;
}
