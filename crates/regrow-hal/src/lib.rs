//! regrow host abstraction layer (HAL).
//!
//! Everything that touches the running system (spawning tools, reading `/proc` and `/sys`,
//! stat'ing device nodes) lives behind the traits in [`hal`], so the resize logic in
//! `regrow-core` can be exercised against [`FakeHal`] without root or real disks.

pub mod error;
pub mod hal;
pub mod procfs;
pub mod sysfs;

pub use error::{HalError, HalResult};
pub use hal::{
    DeviceKind, DeviceOps, FakeCommand, FakeHal, HostHal, HostInfoOps, Operation, ProcessOps,
    RegrowHal, ScratchDir,
};
