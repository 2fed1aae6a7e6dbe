//! Host information (read-only).
//!
//! This is "world-touching" (reads `/proc`, `/run`) and belongs in the HAL.

use crate::HalResult;

pub trait HostInfoOps {
    /// Operating system name as reported by the build target (`linux`, `freebsd`, ...).
    fn platform_name(&self) -> String;

    /// Whether we are running inside a container (no real root block device).
    fn is_container(&self) -> bool;

    fn proc_cmdline(&self) -> HalResult<String>;
    fn proc_mountinfo(&self) -> HalResult<String>;
}
