//! Fake HAL implementation for testing.
//!
//! Commands are answered from a script instead of being executed and the device tree
//! (symlinks, device nodes, sysfs attributes, device sizes) is modelled in memory, so
//! resolution and resize flows can be tested without root or real disks.

use super::{DeviceKind, DeviceOps, HostInfoOps, ProcessOps};
use crate::{HalError, HalResult};
use std::collections::{HashMap, HashSet, VecDeque};
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

const MAX_LINK_HOPS: usize = 40;

/// Operation records for testing and verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Command {
        program: String,
        args: Vec<String>,
        env: Vec<(String, String)>,
        timeout_secs: u64,
        /// Whether the `TMPDIR` handed to the command existed while it ran.
        tmpdir_existed: Option<bool>,
    },
    DeviceSize {
        path: PathBuf,
    },
}

impl Operation {
    /// True for a recorded command whose program and leading args match.
    pub fn is_command(&self, want_program: &str, want_args: &[&str]) -> bool {
        match self {
            Operation::Command { program, args, .. } => {
                program == want_program
                    && args.len() >= want_args.len()
                    && args.iter().zip(want_args).all(|(a, b)| a == b)
            }
            _ => false,
        }
    }
}

/// Scripted answer for a fake command invocation.
#[derive(Debug, Clone, Default)]
pub struct FakeCommand {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
    pub hang: bool,
}

impl FakeCommand {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn exit(code: i32) -> Self {
        Self {
            code,
            ..Self::default()
        }
    }

    /// Simulate a tool that never returns (reported as a timeout).
    pub fn hang() -> Self {
        Self {
            hang: true,
            ..Self::default()
        }
    }

    pub fn with_stdout(mut self, stdout: &str) -> Self {
        self.stdout = stdout.to_string();
        self
    }

    pub fn with_stderr(mut self, stderr: &str) -> Self {
        self.stderr = stderr.to_string();
        self
    }
}

#[derive(Debug, Clone)]
struct ScriptedCommand {
    program: String,
    args_prefix: Vec<String>,
    response: FakeCommand,
}

/// Shared state for FakeHal operations.
#[derive(Debug, Clone, Default)]
struct FakeHalState {
    operations: Vec<Operation>,
    scripts: Vec<ScriptedCommand>,
    missing_programs: HashSet<String>,
    links: HashMap<PathBuf, PathBuf>,
    kinds: HashMap<PathBuf, DeviceKind>,
    attributes: HashMap<PathBuf, String>,
    /// Successive answers for `device_size`; the last one sticks.
    sizes: HashMap<PathBuf, VecDeque<u64>>,
    platform: Option<String>,
    container: bool,
    cmdline: String,
    mountinfo: String,
}

impl FakeHalState {
    /// Resolve symlinks component by component. Link targets must be absolute.
    fn resolve(&self, path: &Path) -> PathBuf {
        let mut current = path.to_path_buf();
        for _ in 0..MAX_LINK_HOPS {
            let mut rebuilt = PathBuf::new();
            let mut changed = false;
            for component in current.components() {
                rebuilt.push(component);
                if let Some(target) = self.links.get(&rebuilt) {
                    rebuilt = target.clone();
                    changed = true;
                }
            }
            if !changed {
                return rebuilt;
            }
            current = rebuilt;
        }
        current
    }

    fn known(&self, resolved: &Path) -> bool {
        let exact = self.kinds.contains_key(resolved)
            || self.attributes.contains_key(resolved)
            || self.sizes.contains_key(resolved);
        if exact {
            return true;
        }
        // Any ancestor of a known path exists as a directory.
        self.kinds
            .keys()
            .chain(self.attributes.keys())
            .chain(self.sizes.keys())
            .any(|p| p != resolved && p.starts_with(resolved))
    }
}

/// Fake HAL implementation that answers from an in-memory model.
#[derive(Debug, Clone, Default)]
pub struct FakeHal {
    state: Arc<Mutex<FakeHalState>>,
}

impl FakeHal {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeHalState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, FakeHalState> {
        match self.state.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<Operation> {
        self.state().operations.clone()
    }

    /// Check if a specific operation was recorded.
    pub fn has_operation(&self, check: impl Fn(&Operation) -> bool) -> bool {
        self.state().operations.iter().any(check)
    }

    /// Number of recorded commands matching `program` and leading `args`.
    pub fn command_count(&self, program: &str, args: &[&str]) -> usize {
        self.state()
            .operations
            .iter()
            .filter(|op| op.is_command(program, args))
            .count()
    }

    /// Clear all recorded operations (the model is kept).
    pub fn clear(&self) {
        self.state().operations.clear();
    }

    /// Answer `program args_prefix...` with `response`. The longest matching prefix wins.
    pub fn script_command(&self, program: &str, args_prefix: &[&str], response: FakeCommand) {
        self.state().scripts.push(ScriptedCommand {
            program: program.to_string(),
            args_prefix: args_prefix.iter().map(|s| s.to_string()).collect(),
            response,
        });
    }

    /// Make `program` behave as if it were not installed.
    pub fn remove_program(&self, program: &str) {
        self.state().missing_programs.insert(program.to_string());
    }

    pub fn add_symlink(&self, link: impl Into<PathBuf>, target: impl Into<PathBuf>) {
        self.state().links.insert(link.into(), target.into());
    }

    pub fn add_device(&self, path: impl Into<PathBuf>, kind: DeviceKind) {
        self.state().kinds.insert(path.into(), kind);
    }

    pub fn add_attribute(&self, path: impl Into<PathBuf>, content: &str) {
        self.state()
            .attributes
            .insert(path.into(), content.to_string());
    }

    /// Regular file with empty content (e.g. a sentinel file).
    pub fn add_file(&self, path: impl Into<PathBuf>) {
        self.add_attribute(path, "");
    }

    /// Queue successive sizes reported for `path`.
    pub fn set_device_sizes(&self, path: impl Into<PathBuf>, sizes: &[u64]) {
        self.state()
            .sizes
            .insert(path.into(), sizes.iter().copied().collect());
    }

    pub fn set_platform(&self, platform: &str) {
        self.state().platform = Some(platform.to_string());
    }

    pub fn set_container(&self, container: bool) {
        self.state().container = container;
    }

    pub fn set_cmdline(&self, cmdline: &str) {
        self.state().cmdline = cmdline.to_string();
    }

    pub fn set_mountinfo(&self, mountinfo: &str) {
        self.state().mountinfo = mountinfo.to_string();
    }

    fn record_operation(&self, op: Operation) {
        self.state().operations.push(op);
    }

    fn scripted_response(&self, program: &str, args: &[&str]) -> FakeCommand {
        let state = self.state();
        state
            .scripts
            .iter()
            .filter(|s| {
                s.program == program
                    && s.args_prefix.len() <= args.len()
                    && s.args_prefix.iter().zip(args).all(|(a, b)| a == b)
            })
            .max_by_key(|s| s.args_prefix.len())
            .map(|s| s.response.clone())
            .unwrap_or_default()
    }
}

fn exit_status(code: i32) -> std::process::ExitStatus {
    std::process::ExitStatus::from_raw((code & 0xff) << 8)
}

impl ProcessOps for FakeHal {
    fn command_output_with_env(
        &self,
        program: &str,
        args: &[&str],
        env: &[(&str, &str)],
        timeout: Duration,
    ) -> HalResult<Output> {
        let tmpdir_existed = env
            .iter()
            .find(|(k, _)| *k == "TMPDIR")
            .map(|(_, v)| Path::new(v).is_dir());
        self.record_operation(Operation::Command {
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            env: env
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            timeout_secs: timeout.as_secs(),
            tmpdir_existed,
        });
        log::info!("FAKE HAL: {} {}", program, args.join(" "));

        if self.state().missing_programs.contains(program) {
            return Err(HalError::CommandNotFound(program.to_string()));
        }

        let response = self.scripted_response(program, args);
        if response.hang {
            return Err(HalError::CommandTimeout {
                program: program.to_string(),
                timeout_secs: timeout.as_secs(),
            });
        }

        Ok(Output {
            status: exit_status(response.code),
            stdout: response.stdout.into_bytes(),
            stderr: response.stderr.into_bytes(),
        })
    }
}

impl HostInfoOps for FakeHal {
    fn platform_name(&self) -> String {
        self.state()
            .platform
            .clone()
            .unwrap_or_else(|| "linux".to_string())
    }

    fn is_container(&self) -> bool {
        self.state().container
    }

    fn proc_cmdline(&self) -> HalResult<String> {
        Ok(self.state().cmdline.clone())
    }

    fn proc_mountinfo(&self) -> HalResult<String> {
        Ok(self.state().mountinfo.clone())
    }
}

impl DeviceOps for FakeHal {
    fn canonicalize(&self, path: &Path) -> HalResult<PathBuf> {
        let state = self.state();
        let resolved = state.resolve(path);
        if state.known(&resolved) {
            Ok(resolved)
        } else {
            Err(HalError::NotFound(path.display().to_string()))
        }
    }

    fn device_kind(&self, path: &Path) -> HalResult<DeviceKind> {
        let state = self.state();
        let resolved = state.resolve(path);
        if let Some(kind) = state.kinds.get(&resolved) {
            return Ok(*kind);
        }
        if state.attributes.contains_key(&resolved) || state.sizes.contains_key(&resolved) {
            return Ok(DeviceKind::Other);
        }
        if state.known(&resolved) {
            return Ok(DeviceKind::Directory);
        }
        Err(HalError::NotFound(path.display().to_string()))
    }

    fn path_exists(&self, path: &Path) -> bool {
        let state = self.state();
        let resolved = state.resolve(path);
        state.known(&resolved)
    }

    fn is_regular_file(&self, path: &Path) -> bool {
        let state = self.state();
        let resolved = state.resolve(path);
        state.attributes.contains_key(&resolved)
    }

    fn read_attribute(&self, path: &Path) -> HalResult<String> {
        let state = self.state();
        let resolved = state.resolve(path);
        state
            .attributes
            .get(&resolved)
            .cloned()
            .ok_or_else(|| HalError::NotFound(path.display().to_string()))
    }

    fn device_size(&self, path: &Path) -> HalResult<u64> {
        self.record_operation(Operation::DeviceSize {
            path: path.to_path_buf(),
        });
        let mut state = self.state();
        let resolved = state.resolve(path);
        let queue = state
            .sizes
            .get_mut(&resolved)
            .ok_or_else(|| HalError::NotFound(path.display().to_string()))?;
        let size = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().copied()
        };
        size.ok_or_else(|| HalError::Other(format!("no size queued for {}", path.display())))
    }
}
