//! HAL trait definitions and implementations.
//!
//! This module defines the traits for world-touching operations and provides
//! both a real (HostHal) and a fake (FakeHal) implementation.

pub mod device_ops;
pub mod fake_hal;
pub mod guards;
pub mod host_hal;
pub mod host_info_ops;
pub mod process_ops;

pub use device_ops::{DeviceKind, DeviceOps};
pub use fake_hal::{FakeCommand, FakeHal, Operation};
pub use guards::ScratchDir;
pub use host_hal::HostHal;
pub use host_info_ops::HostInfoOps;
pub use process_ops::ProcessOps;

/// Complete HAL combining all host operation traits.
pub trait RegrowHal: ProcessOps + HostInfoOps + DeviceOps + Send + Sync {}

/// Automatically implement RegrowHal for any type implementing all required traits.
impl<T> RegrowHal for T where T: ProcessOps + HostInfoOps + DeviceOps + Send + Sync {}
