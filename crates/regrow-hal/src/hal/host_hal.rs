//! HAL implementation backed by the running host.

use super::{DeviceKind, DeviceOps, HostInfoOps, ProcessOps};
use crate::{HalError, HalResult};
use nix::sys::stat::{stat, SFlag};
use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

const PROC_CMDLINE: &str = "/proc/cmdline";
const PROC_MOUNTINFO: &str = "/proc/self/mountinfo";
const SYSTEMD_CONTAINER: &str = "/run/systemd/container";
const PROC_1_ENVIRON: &str = "/proc/1/environ";

/// Real HAL implementation for the current host.
#[derive(Debug, Clone, Default)]
pub struct HostHal;

impl HostHal {
    pub fn new() -> Self {
        Self
    }
}

fn map_command_err(program: &str, err: std::io::Error) -> HalError {
    if err.kind() == std::io::ErrorKind::NotFound {
        return HalError::CommandNotFound(program.to_string());
    }
    HalError::Io(err)
}

fn map_nix_err(path: &Path, err: nix::errno::Errno) -> HalError {
    use nix::errno::Errno;
    match err {
        Errno::ENOENT => HalError::NotFound(path.display().to_string()),
        Errno::EACCES | Errno::EPERM => HalError::PermissionDenied,
        other => HalError::Nix(other),
    }
}

fn output_with_timeout(program: &str, cmd: &mut Command, timeout: Duration) -> HalResult<Output> {
    // Avoid commands hanging waiting for input.
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = cmd.spawn().map_err(|e| map_command_err(program, e))?;

    let mut stdout = child.stdout.take();
    let mut stderr = child.stderr.take();

    // Drain pipes concurrently to avoid deadlocks on large output.
    let stdout_handle = std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut out) = stdout.take() {
            let _ = out.read_to_end(&mut buf);
        }
        buf
    });
    let stderr_handle = std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut err) = stderr.take() {
            let _ = err.read_to_end(&mut buf);
        }
        buf
    });

    let status = match child.wait_timeout(timeout).map_err(HalError::Io)? {
        Some(status) => status,
        None => {
            let _ = child.kill();
            let _ = child.wait();
            let _ = stdout_handle.join();
            let _ = stderr_handle.join();
            return Err(HalError::CommandTimeout {
                program: program.to_string(),
                timeout_secs: timeout.as_secs(),
            });
        }
    };

    let stdout = stdout_handle.join().unwrap_or_default();
    let stderr = stderr_handle.join().unwrap_or_default();
    Ok(Output {
        status,
        stdout,
        stderr,
    })
}

impl ProcessOps for HostHal {
    fn command_output_with_env(
        &self,
        program: &str,
        args: &[&str],
        env: &[(&str, &str)],
        timeout: Duration,
    ) -> HalResult<Output> {
        log::debug!("exec: {} {}", program, args.join(" "));
        let mut cmd = Command::new(program);
        cmd.args(args);
        for (key, value) in env {
            cmd.env(key, value);
        }
        output_with_timeout(program, &mut cmd, timeout)
    }
}

impl HostInfoOps for HostHal {
    fn platform_name(&self) -> String {
        std::env::consts::OS.to_string()
    }

    fn is_container(&self) -> bool {
        if Path::new(SYSTEMD_CONTAINER).exists() {
            return true;
        }
        // PID 1's environment carries `container=<runtime>` under most runtimes.
        fs::read(PROC_1_ENVIRON)
            .map(|raw| environ_declares_container(&raw))
            .unwrap_or(false)
    }

    fn proc_cmdline(&self) -> HalResult<String> {
        Ok(fs::read_to_string(PROC_CMDLINE)?)
    }

    fn proc_mountinfo(&self) -> HalResult<String> {
        Ok(fs::read_to_string(PROC_MOUNTINFO)?)
    }
}

fn environ_declares_container(raw: &[u8]) -> bool {
    raw.split(|b| *b == 0)
        .any(|entry| entry.starts_with(b"container=") && entry.len() > "container=".len())
}

impl DeviceOps for HostHal {
    fn canonicalize(&self, path: &Path) -> HalResult<PathBuf> {
        fs::canonicalize(path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                HalError::NotFound(path.display().to_string())
            } else {
                HalError::Io(err)
            }
        })
    }

    fn device_kind(&self, path: &Path) -> HalResult<DeviceKind> {
        let st = stat(path).map_err(|e| map_nix_err(path, e))?;
        let fmt = SFlag::from_bits_truncate(st.st_mode) & SFlag::S_IFMT;
        let kind = if fmt == SFlag::S_IFBLK {
            DeviceKind::Block
        } else if fmt == SFlag::S_IFCHR {
            DeviceKind::Char
        } else if fmt == SFlag::S_IFDIR {
            DeviceKind::Directory
        } else {
            DeviceKind::Other
        };
        Ok(kind)
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_regular_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_attribute(&self, path: &Path) -> HalResult<String> {
        fs::read_to_string(path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                HalError::NotFound(path.display().to_string())
            } else {
                HalError::Io(err)
            }
        })
    }

    fn device_size(&self, path: &Path) -> HalResult<u64> {
        let mut file = fs::File::open(path)?;
        Ok(file.seek(SeekFrom::End(0))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn device_size_seeks_to_end() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("disk.img");
        fs::write(&image, vec![0u8; 4096]).unwrap();

        let hal = HostHal::new();
        assert_eq!(hal.device_size(&image).unwrap(), 4096);
    }

    #[test]
    fn device_kind_classifies_regular_files_and_dirs() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plain");
        fs::write(&file, b"x").unwrap();

        let hal = HostHal::new();
        assert_eq!(hal.device_kind(&file).unwrap(), DeviceKind::Other);
        assert_eq!(hal.device_kind(dir.path()).unwrap(), DeviceKind::Directory);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn device_kind_sees_dev_null_as_char_device() {
        let hal = HostHal::new();
        assert_eq!(
            hal.device_kind(Path::new("/dev/null")).unwrap(),
            DeviceKind::Char
        );
    }

    #[test]
    fn device_kind_missing_path_is_not_found() {
        let dir = tempdir().unwrap();
        let hal = HostHal::new();
        let err = hal.device_kind(&dir.path().join("missing")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn canonicalize_follows_symlinks() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("sdb1");
        fs::write(&target, b"").unwrap();
        let link = dir.path().join("by-label");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let hal = HostHal::new();
        assert_eq!(
            hal.canonicalize(&link).unwrap(),
            fs::canonicalize(&target).unwrap()
        );
    }

    #[test]
    fn read_attribute_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let hal = HostHal::new();
        let err = hal
            .read_attribute(&dir.path().join("partition"))
            .unwrap_err();
        assert!(matches!(err, HalError::NotFound(_)));
    }

    #[test]
    fn missing_program_maps_to_command_not_found() {
        let hal = HostHal::new();
        let err = hal
            .command_output(
                "regrow-definitely-not-a-real-tool",
                &["--help"],
                Duration::from_secs(5),
            )
            .unwrap_err();
        assert!(matches!(err, HalError::CommandNotFound(_)));
    }

    #[test]
    fn command_output_passes_env_and_keeps_nonzero_status() {
        let hal = HostHal::new();
        let out = hal
            .command_output_with_env(
                "sh",
                &["-c", "printf %s \"$LANG\"; exit 3"],
                &[("LANG", "C")],
                Duration::from_secs(10),
            )
            .unwrap();
        assert_eq!(out.status.code(), Some(3));
        assert_eq!(String::from_utf8_lossy(&out.stdout), "C");
    }

    #[test]
    fn command_times_out() {
        let hal = HostHal::new();
        let err = hal
            .command_output("sleep", &["5"], Duration::from_millis(200))
            .unwrap_err();
        assert!(matches!(err, HalError::CommandTimeout { .. }));
    }

    #[test]
    fn environ_container_detection() {
        assert!(environ_declares_container(b"HOME=/\0container=podman\0"));
        assert!(!environ_declares_container(b"HOME=/\0TERM=linux\0"));
        assert!(!environ_declares_container(b"container=\0"));
    }
}
