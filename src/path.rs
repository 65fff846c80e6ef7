//! Mapping between entry names and paths under an input/output folder.
//!
//! Entry names may use `/` or `\` as separators.  Absolute names and names
//! with `..` components are refused so extraction stays inside the folder.

use std::path::{Component, Path, PathBuf};

/// Resolve `name` under `root`, or `None` when it would escape `root`.
pub fn entry_path(root: &Path, name: &str) -> Option<PathBuf> {
    let mut out = root.to_path_buf();
    let mut pushed = false;
    for part in name.split(['/', '\\']) {
        match part {
            "" | "." => continue,
            ".." => return None,
            _ => {}
        }
        let comp = Path::new(part);
        if !matches!(comp.components().next(), Some(Component::Normal(_))) || comp.components().count() != 1 {
            return None;
        }
        out.push(part);
        pushed = true;
    }
    pushed.then_some(out)
}

/// Relative path of `file` under `root`, joined with `/`.
pub fn normalize_rel_path(root: &Path, file: &Path) -> Option<String> {
    let rel = file.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}
