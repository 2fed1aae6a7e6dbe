//! Process execution helpers.
//!
//! External commands are considered "world-touching" and must go through the HAL so we can
//! test resize flows without spawning real partitioning tools.

use crate::{HalError, HalResult};
use std::process::Output;
use std::time::Duration;

/// Process execution trait (external command runner).
///
/// Implementations return the captured [`Output`] for any exit code; only spawn failures and
/// timeouts are errors. Callers decide which exit codes are acceptable.
pub trait ProcessOps {
    fn command_output_with_env(
        &self,
        program: &str,
        args: &[&str],
        env: &[(&str, &str)],
        timeout: Duration,
    ) -> HalResult<Output>;

    fn command_output(&self, program: &str, args: &[&str], timeout: Duration) -> HalResult<Output> {
        self.command_output_with_env(program, args, &[], timeout)
    }

    /// Run a command and require a zero exit status.
    fn command_status_with_env(
        &self,
        program: &str,
        args: &[&str],
        env: &[(&str, &str)],
        timeout: Duration,
    ) -> HalResult<()> {
        let output = self.command_output_with_env(program, args, env, timeout)?;
        if !output.status.success() {
            return Err(output_failed(program, &output));
        }
        Ok(())
    }
}

pub fn output_failed(program: &str, output: &Output) -> HalError {
    HalError::CommandFailed {
        program: program.to_string(),
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}
