//! Per-device resize outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A device as seen by a resize backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDevice {
    /// Canonical partition device node (e.g. `/dev/sdb1`).
    pub block_device: PathBuf,
    /// Parent disk device node (e.g. `/dev/sdb`).
    pub disk: PathBuf,
    /// 1-based partition index as a decimal string.
    pub partition: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResizeAction {
    Skipped,
    NoChange,
    Changed,
    Failed,
}

impl fmt::Display for ResizeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResizeAction::Skipped => write!(f, "SKIPPED"),
            ResizeAction::NoChange => write!(f, "NOCHANGE"),
            ResizeAction::Changed => write!(f, "CHANGED"),
            ResizeAction::Failed => write!(f, "FAILED"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeChange {
    pub before: u64,
    pub after: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeOutcome {
    pub action: ResizeAction,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizes: Option<SizeChange>,
}

impl ResizeOutcome {
    pub fn skipped(message: impl Into<String>) -> Self {
        Self {
            action: ResizeAction::Skipped,
            message: message.into(),
            sizes: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            action: ResizeAction::Failed,
            message: message.into(),
            sizes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub entry: String,
    #[serde(flatten)]
    pub outcome: ResizeOutcome,
}

/// One outcome per input device entry, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeReport {
    pub entries: Vec<ReportEntry>,
}

impl ResizeReport {
    pub fn push(&mut self, entry: &str, outcome: ResizeOutcome) {
        self.entries.push(ReportEntry {
            entry: entry.to_string(),
            outcome,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn actions(&self) -> Vec<ResizeAction> {
        self.entries.iter().map(|e| e.outcome.action).collect()
    }

    /// Aligned plain-text table for terminal output.
    pub fn render_table(&self) -> String {
        let width = self
            .entries
            .iter()
            .map(|e| e.entry.len())
            .max()
            .unwrap_or(0)
            .max("DEVICE".len());
        let mut out = format!("{:<width$}  {:<8}  MESSAGE\n", "DEVICE", "ACTION");
        for e in &self.entries {
            out.push_str(&format!(
                "{:<width$}  {:<8}  {}\n",
                e.entry,
                e.outcome.action.to_string(),
                e.outcome.message
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_serializes_uppercase_actions_flat() {
        let mut report = ResizeReport::default();
        report.push(
            "/",
            ResizeOutcome {
                action: ResizeAction::Changed,
                message: "changed (/dev/vda, 1) from 1 to 2".to_string(),
                sizes: Some(SizeChange {
                    before: 1,
                    after: 2,
                }),
            },
        );
        report.push("/srv", ResizeOutcome::skipped("nope"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["entries"][0]["entry"], "/");
        assert_eq!(json["entries"][0]["action"], "CHANGED");
        assert_eq!(json["entries"][0]["sizes"]["after"], 2);
        assert_eq!(json["entries"][1]["action"], "SKIPPED");
        assert!(json["entries"][1].get("sizes").is_none());
    }

    #[test]
    fn render_table_aligns_columns() {
        let mut report = ResizeReport::default();
        report.push("/", ResizeOutcome::skipped("a"));
        report.push("/var/lib/data", ResizeOutcome::failed("b"));

        let table = report.render_table();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("DEVICE"));
        assert!(lines[1].starts_with("/              SKIPPED"));
        assert!(lines[2].starts_with("/var/lib/data  FAILED"));
    }
}
