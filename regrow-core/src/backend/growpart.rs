//! `growpart` (cloud-utils) backend.

use super::{command_line, BackendKind, ResizeBackend, Timeouts, C_LOCALE};
use crate::errors::ResizeError;
use once_cell::sync::Lazy;
use nix::unistd::Uid;
use regex::Regex;
use regrow_hal::hal::process_ops::output_failed;
use regrow_hal::{HalError, RegrowHal, ScratchDir};
use std::path::{Path, PathBuf};

const PROGRAM: &str = "growpart";
/// growpart's documented "nothing to grow" exit code.
const NOCHANGE_EXIT: i32 = 1;
const ROOT_SCRATCH_BASE: &str = "/var/tmp/regrow";

static UPDATE_FLAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"--update\s+").expect("valid growpart help regex"));

/// Where per-call scratch directories are created. As root we stay off `/tmp`, which may
/// be `noexec` and is swept by tmpfiles cleaners.
pub fn default_scratch_base() -> PathBuf {
    scratch_base_for(Uid::effective(), &std::env::temp_dir())
}

/// Other users get a private `regrow-<uid>` base, since the base is created 0700.
fn scratch_base_for(uid: Uid, tmp: &Path) -> PathBuf {
    if uid.is_root() {
        PathBuf::from(ROOT_SCRATCH_BASE)
    } else {
        tmp.join(format!("regrow-{}", uid))
    }
}

/// Result of `growpart --dry-run`.
#[derive(Debug)]
pub enum DryRunVerdict {
    /// Partition already fills the available space.
    NoChangeNeeded,
    /// A real run would grow the partition.
    WouldResize,
    Failed(HalError),
}

pub struct GrowpartBackend<'a, H: RegrowHal + ?Sized> {
    hal: &'a H,
    timeouts: Timeouts,
    scratch_base: PathBuf,
}

impl<'a, H: RegrowHal + ?Sized> GrowpartBackend<'a, H> {
    pub fn new(hal: &'a H, timeouts: Timeouts, scratch_base: PathBuf) -> Self {
        Self {
            hal,
            timeouts,
            scratch_base,
        }
    }

    pub fn dry_run(&self, disk: &str, partition: &str, env: &[(&str, &str)]) -> DryRunVerdict {
        let args = ["--dry-run", disk, partition];
        let output =
            match self
                .hal
                .command_output_with_env(PROGRAM, &args, env, self.timeouts.resize)
            {
                Ok(output) => output,
                Err(err) => return DryRunVerdict::Failed(err),
            };
        match output.status.code() {
            Some(0) => DryRunVerdict::WouldResize,
            Some(NOCHANGE_EXIT) => DryRunVerdict::NoChangeNeeded,
            _ => DryRunVerdict::Failed(output_failed(PROGRAM, &output)),
        }
    }

    fn size_of(&self, path: &Path) -> Result<u64, ResizeError> {
        self.hal
            .device_size(path)
            .map_err(|source| ResizeError::Size {
                path: path.to_path_buf(),
                source,
            })
    }
}

impl<'a, H: RegrowHal + ?Sized> ResizeBackend for GrowpartBackend<'a, H> {
    fn kind(&self) -> BackendKind {
        BackendKind::Growpart
    }

    fn available(&self) -> bool {
        match self
            .hal
            .command_output_with_env(PROGRAM, &["--help"], &[C_LOCALE], self.timeouts.probe)
        {
            Ok(output) if output.status.success() => {
                UPDATE_FLAG.is_match(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(output) => {
                log::debug!("growpart --help exited with {:?}", output.status.code());
                false
            }
            Err(err) => {
                log::debug!("growpart not usable: {}", err);
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
        let before = self.size_of(partition_device)?;
        let disk_arg = disk.to_string_lossy().into_owned();

        {
            let scratch = ScratchDir::create_in(&self.scratch_base, PROGRAM)
                .map_err(ResizeError::Scratch)?;
            let tmpdir = scratch.path().to_string_lossy().to_string();
            let env = [C_LOCALE, ("TMPDIR", tmpdir.as_str())];

            match self.dry_run(&disk_arg, partition, &env) {
                DryRunVerdict::NoChangeNeeded => {
                    log::debug!("growpart: no change needed for ({}, {})", disk_arg, partition);
                    return Ok((before, before));
                }
                DryRunVerdict::WouldResize => {}
                DryRunVerdict::Failed(source) => {
                    log::warn!(
                        "Failed growpart --dry-run for ({}, {}): {}",
                        disk_arg,
                        partition,
                        source
                    );
                    return Err(ResizeError::Command {
                        command: command_line(PROGRAM, &["--dry-run", disk_arg.as_str(), partition]),
                        source,
                    });
                }
            }

            let args = [disk_arg.as_str(), partition];
            self.hal
                .command_status_with_env(PROGRAM, &args, &env, self.timeouts.resize)
                .map_err(|source| {
                    log::warn!("Failed: growpart {} {}: {}", disk_arg, partition, source);
                    ResizeError::Command {
                        command: command_line(PROGRAM, &args),
                        source,
                    }
                })?;
        }

        let after = self.size_of(partition_device)?;
        Ok((before, after))
    }
}
