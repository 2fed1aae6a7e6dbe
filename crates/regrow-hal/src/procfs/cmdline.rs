//! Kernel command line helpers (`/proc/cmdline`).

/// Map the `root=` token of a kernel command line to a device path.
///
/// `LABEL=`, `UUID=` and `PARTUUID=` forms are mapped onto the udev `/dev/disk/by-*` links
/// (UUIDs lowercased); a bare name such as `vda1` becomes `/dev/vda1`. Returns `None` when
/// there is no `root=` token.
pub fn root_device_from_cmdline(cmdline: &str) -> Option<String> {
    let found = cmdline
        .split_whitespace()
        .find_map(|tok| tok.strip_prefix("root="))?;

    if found.starts_with("/dev/") {
        return Some(found.to_string());
    }
    if let Some(label) = found.strip_prefix("LABEL=") {
        return Some(format!("/dev/disk/by-label/{}", label));
    }
    if let Some(uuid) = found.strip_prefix("UUID=") {
        return Some(format!("/dev/disk/by-uuid/{}", uuid.to_lowercase()));
    }
    if let Some(partuuid) = found.strip_prefix("PARTUUID=") {
        return Some(format!(
            "/dev/disk/by-partuuid/{}",
            partuuid.to_lowercase()
        ));
    }
    Some(format!("/dev/{}", found))
}
