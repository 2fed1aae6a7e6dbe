//! Parsing helpers for `/proc/self/mountinfo` (and similar mountinfo files).

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountInfo {
    pub mount_point: PathBuf,
    pub fstype: String,
    /// Mount source, usually a device node such as `/dev/sda1` (or `/dev/root`).
    pub source: String,
}

pub fn parse_mountinfo(content: &str) -> Vec<MountInfo> {
    content
        .lines()
        .filter_map(|line| {
            // mountinfo format:
            //   <id> <parent> <maj:min> <root> <mount point> <opts> [optional...] - <fstype> <source> <superopts>
            let (pre, post) = line.split_once(" - ")?;
            let pre_fields: Vec<&str> = pre.split_whitespace().collect();
            if pre_fields.len() < 5 {
                return None;
            }
            let mut post_fields = post.split_whitespace();
            let fstype = post_fields.next()?.to_string();
            let source = unescape_mount_path(post_fields.next()?);
            Some(MountInfo {
                mount_point: PathBuf::from(unescape_mount_path(pre_fields[4])),
                fstype,
                source,
            })
        })
        .collect()
}

/// Find the mount that contains `path`: the deepest mount point that is a path prefix of it.
///
/// When the same mount point appears more than once (over-mounts) the last entry wins, since
/// it is the one visible to lookups.
pub fn mount_containing<'a>(entries: &'a [MountInfo], path: &Path) -> Option<&'a MountInfo> {
    let target = PathBuf::from(normalize_path(path));
    let mut best: Option<&MountInfo> = None;
    for entry in entries {
        let mount_point = PathBuf::from(normalize_path(&entry.mount_point));
        if !target.starts_with(&mount_point) {
            continue;
        }
        let depth = mount_point.components().count();
        match best {
            Some(current)
                if PathBuf::from(normalize_path(&current.mount_point))
                    .components()
                    .count()
                    > depth => {}
            _ => best = Some(entry),
        }
    }
    best
}

pub fn unescape_mount_path(raw: &str) -> String {
    raw.replace("\\040", " ")
        .replace("\\011", "\t")
        .replace("\\012", "\n")
        .replace("\\134", "\\")
}

fn normalize_path(path: &Path) -> String {
    let s = path.to_string_lossy();
    if s.len() > 1 && s.ends_with('/') {
        s.trim_end_matches('/').to_string()
    } else {
        s.to_string()
    }
}
