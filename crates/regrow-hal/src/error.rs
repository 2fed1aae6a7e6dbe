use thiserror::Error;

pub type HalResult<T> = std::result::Result<T, HalError>;

#[derive(Error, Debug)]
pub enum HalError {
    #[error("Permission denied")]
    PermissionDenied,

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Command failed: {program} (exit={code:?}): {stderr}")]
    CommandFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Command timed out: {program} after {timeout_secs}s")]
    CommandTimeout { program: String, timeout_secs: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("nix errno: {0}")]
    Nix(#[from] nix::errno::Errno),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    Other(String),
}

impl HalError {
    /// True when the error means "the path does not exist" rather than a real I/O failure.
    pub fn is_not_found(&self) -> bool {
        match self {
            HalError::NotFound(_) => true,
            HalError::Io(err) => err.kind() == std::io::ErrorKind::NotFound,
            HalError::Nix(errno) => *errno == nix::errno::Errno::ENOENT,
            _ => false,
        }
    }
}
