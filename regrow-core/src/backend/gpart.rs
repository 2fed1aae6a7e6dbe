//! FreeBSD/DragonFly `gpart` backend.

use super::{command_line, BackendKind, ResizeBackend, Timeouts, C_LOCALE};
use crate::errors::ResizeError;
use regrow_hal::RegrowHal;
use std::path::Path;

const PROGRAM: &str = "gpart";
const RECOVER_USAGE: &str = "gpart recover ";

pub struct GpartBackend<'a, H: RegrowHal + ?Sized> {
    hal: &'a H,
    timeouts: Timeouts,
}

impl<'a, H: RegrowHal + ?Sized> GpartBackend<'a, H> {
    pub fn new(hal: &'a H, timeouts: Timeouts) -> Self {
        Self { hal, timeouts }
    }

    fn size_of(&self, path: &Path) -> Result<u64, ResizeError> {
        self.hal
            .device_size(path)
            .map_err(|source| ResizeError::Size {
                path: path.to_path_buf(),
                source,
            })
    }

    fn run(&self, args: &[&str]) -> Result<(), ResizeError> {
        self.hal
            .command_status_with_env(PROGRAM, args, &[C_LOCALE], self.timeouts.resize)
            .map_err(|source| ResizeError::Command {
                command: command_line(PROGRAM, args),
                source,
            })
    }
}

impl<'a, H: RegrowHal + ?Sized> ResizeBackend for GpartBackend<'a, H> {
    fn kind(&self) -> BackendKind {
        BackendKind::Gpart
    }

    /// `gpart help` prints its usage (exit 1 on most releases); a gpart new enough to resize
    /// also knows `recover`.
    fn available(&self) -> bool {
        match self
            .hal
            .command_output_with_env(PROGRAM, &["help"], &[C_LOCALE], self.timeouts.probe)
        {
            Ok(output) if matches!(output.status.code(), Some(0) | Some(1)) => {
                String::from_utf8_lossy(&output.stderr).contains(RECOVER_USAGE)
                    || String::from_utf8_lossy(&output.stdout).contains(RECOVER_USAGE)
            }
            Ok(output) => {
                log::debug!("gpart help exited with {:?}", output.status.code());
                false
            }
            Err(err) => {
                log::debug!("gpart not usable: {}", err);
                false
            }
        }
    }

    fn resize(
        &self,
        disk: &Path,
        partition: &str,
        partition_device: &Path,
    ) -> Result<(u64, u64), ResizeError> {
        let disk_arg = disk.to_string_lossy().into_owned();

        // A grown virtual disk leaves the GPT backup header in the middle; fix it first.
        self.run(&["recover", disk_arg.as_str()]).map_err(|err| {
            log::warn!("Failed: gpart recover {}: {}", disk_arg, err);
            err
        })?;

        let before = self.size_of(partition_device)?;
        self.run(&["resize", "-i", partition, disk_arg.as_str()])
            .map_err(|err| {
                log::warn!("Failed: gpart resize -i {} {}: {}", partition, disk_arg, err);
                err
            })?;
        let after = self.size_of(partition_device)?;
        Ok((before, after))
    }
}
