//! Host platform detection.

/// Platforms with a known way to map a partition device onto its parent disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Topology read from sysfs.
    Linux,
    /// `<disk>p<N>` device names.
    FreeBsd,
    /// `<disk>s<N>` device names.
    DragonFly,
}

impl Platform {
    /// Map an OS name as reported by `std::env::consts::OS`.
    pub fn from_os_name(name: &str) -> Option<Self> {
        match name {
            "linux" | "android" => Some(Platform::Linux),
            "freebsd" => Some(Platform::FreeBsd),
            "dragonfly" => Some(Platform::DragonFly),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_os_name_maps_known_platforms() {
        assert_eq!(Platform::from_os_name("linux"), Some(Platform::Linux));
        assert_eq!(Platform::from_os_name("freebsd"), Some(Platform::FreeBsd));
        assert_eq!(
            Platform::from_os_name("dragonfly"),
            Some(Platform::DragonFly)
        );
        assert_eq!(Platform::from_os_name("macos"), None);
    }
}
