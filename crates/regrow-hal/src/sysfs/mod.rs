//! Helpers for the sysfs block device tree.

pub mod block;
