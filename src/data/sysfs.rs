//! Read-only access to the kernel's pseudo filesystems.
//!
//! Every probe resolves its `/sys` and `/proc` paths through a [`SysRoot`], so
//! a fixture tree built in a temp dir can stand in for the live machine.

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct SysRoot {
    root: PathBuf,
}

impl Default for SysRoot {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/"),
        }
    }
}

impl SysRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map an absolute kernel path such as `/sys/class/drm` under this root.
    pub fn path(&self, absolute: &str) -> PathBuf {
        self.root.join(absolute.trim_start_matches('/'))
    }

    pub fn read_to_string(&self, absolute: &str) -> Option<String> {
        fs::read_to_string(self.path(absolute)).ok()
    }

    pub fn entries(&self, absolute: &str) -> Vec<PathBuf> {
        list_dir_entries(&self.path(absolute))
    }
}

/// First line of a file, trimmed.
pub fn read_first_line(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    let line = content.lines().next().unwrap_or("");
    Some(line.trim().to_string())
}

pub fn read_i64(path: &Path) -> Option<i64> {
    read_first_line(path)?.parse::<i64>().ok()
}

pub fn read_first_existing_i64(candidates: &[PathBuf]) -> Option<i64> {
    candidates.iter().find_map(|path| read_i64(path))
}

/// Directory entries sorted by path, empty when the directory is missing.
pub fn list_dir_entries(dir: &Path) -> Vec<PathBuf> {
    let Ok(read_dir) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut entries: Vec<PathBuf> = read_dir
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .collect();
    entries.sort();
    entries
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `cpu0`, `cpu17`, but not `cpufreq` or `cpuidle`.
pub fn is_cpu_directory_name(name: &str) -> bool {
    name.strip_prefix("cpu")
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
pub(crate) mod fixture {
    //! Helpers for building fake kernel trees in tests.
    use std::fs;
    use std::path::Path;

    pub fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative.trim_start_matches('/'));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    pub fn mkdir(root: &Path, relative: &str) {
        fs::create_dir_all(root.join(relative.trim_start_matches('/'))).unwrap();
    }

    #[cfg(unix)]
    pub fn symlink(root: &Path, target: &str, relative: &str) {
        let path = root.join(relative.trim_start_matches('/'));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        std::os::unix::fs::symlink(target, path).unwrap();
    }
}
