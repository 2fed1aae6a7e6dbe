//! TOML configuration.
//!
//! ```toml
//! [growpart]
//! mode = "auto"
//! devices = ["/"]
//! ignore_growroot_disabled = false
//! ```

use crate::backend::Timeouts;
use crate::selector::AUTO_MODE;
use anyhow::Context;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/regrow/regrow.toml";

/// Values that switch growpart off. Anything but `off` itself is deprecated.
const FALSE_STRINGS: [&str; 4] = ["off", "0", "no", "false"];

/// Resize mode: probe, disabled, or a named backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawMode")]
pub enum Mode {
    #[default]
    Auto,
    Off,
    Named(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMode {
    Flag(bool),
    Name(String),
}

impl From<RawMode> for Mode {
    fn from(raw: RawMode) -> Self {
        match raw {
            RawMode::Flag(true) => Mode::parse("true"),
            RawMode::Flag(false) => Mode::parse("false"),
            RawMode::Name(name) => Mode::parse(&name),
        }
    }
}

impl Mode {
    pub fn parse(value: &str) -> Self {
        let lowered = value.trim().to_ascii_lowercase();
        if FALSE_STRINGS.contains(&lowered.as_str()) {
            if value != "off" {
                log::warn!(
                    "DEPRECATED: growpart mode '{}' is deprecated. Use 'off' instead.",
                    value
                );
            }
            return Mode::Off;
        }
        if value == AUTO_MODE {
            Mode::Auto
        } else {
            Mode::Named(value.to_string())
        }
    }

    /// Mode string for the backend selector, `None` when off.
    pub fn selector_mode(&self) -> Option<&str> {
        match self {
            Mode::Auto => Some(AUTO_MODE),
            Mode::Off => None,
            Mode::Named(name) => Some(name.as_str()),
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Mode::Auto)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector_mode().unwrap_or("off"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrowpartConfig {
    pub mode: Mode,
    pub devices: Vec<String>,
    pub ignore_growroot_disabled: bool,
    pub probe_timeout_secs: u64,
    pub resize_timeout_secs: u64,
}

impl Default for GrowpartConfig {
    fn default() -> Self {
        let timeouts = Timeouts::default();
        Self {
            mode: Mode::Auto,
            devices: vec!["/".to_string()],
            ignore_growroot_disabled: false,
            probe_timeout_secs: timeouts.probe.as_secs(),
            resize_timeout_secs: timeouts.resize.as_secs(),
        }
    }
}

impl GrowpartConfig {
    /// Reject values that would make every command fail.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.probe_timeout_secs == 0 {
            anyhow::bail!("probe_timeout_secs must be greater than zero");
        }
        if self.resize_timeout_secs == 0 {
            anyhow::bail!("resize_timeout_secs must be greater than zero");
        }
        Ok(())
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            probe: Duration::from_secs(self.probe_timeout_secs),
            resize: Duration::from_secs(self.resize_timeout_secs),
        }
    }
}

/// A `growpart` key that is present but not a table fails the load instead of being
/// skipped with a warning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RegrowConfig {
    pub growpart: Option<GrowpartConfig>,
}

impl RegrowConfig {
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content).context("failed to parse regrow config")?;
        if let Some(growpart) = &config.growpart {
            growpart.validate().context("invalid [growpart] table")?;
        }
        Ok(config)
    }

    /// Load `path`; a missing file means defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            log::debug!("config {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    /// The `[growpart]` table, or defaults when the table is absent.
    pub fn growpart(&self) -> GrowpartConfig {
        match &self.growpart {
            Some(cfg) => cfg.clone(),
            None => {
                let cfg = GrowpartConfig::default();
                log::debug!("No 'growpart' entry in config. Using default: {:?}", cfg);
                cfg
            }
        }
    }
}
