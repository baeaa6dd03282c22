//! File logging. The terminal belongs to the dashboard, so log records go to
//! a file, and only when asked for.

use crate::error::AppError;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

pub const LOG_ENV: &str = "HWTOP_LOG";
const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTarget {
    pub path: PathBuf,
    pub filter: String,
}

/// Where to log and at which filter. `--log-file` alone enables logging at
/// `info`; the environment variable alone logs to the cache directory.
pub fn resolve_target(
    log_file: Option<&Path>,
    env_filter: Option<String>,
    cache_dir: Option<PathBuf>,
) -> Option<LogTarget> {
    let env_filter = env_filter.filter(|filter| !filter.trim().is_empty());
    let path = match log_file {
        Some(path) => path.to_path_buf(),
        None => {
            env_filter.as_ref()?;
            cache_dir?.join("hwtop").join("hwtop.log")
        }
    };
    Some(LogTarget {
        path,
        filter: env_filter.unwrap_or_else(|| DEFAULT_FILTER.to_string()),
    })
}

pub fn init(log_file: Option<&Path>) -> Result<(), AppError> {
    let env_filter = std::env::var(LOG_ENV).ok();
    let Some(target) = resolve_target(log_file, env_filter, dirs::cache_dir()) else {
        return Ok(());
    };
    if let Some(parent) = target.path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&target.path)?;

    env_logger::Builder::new()
        .parse_filters(&target.filter)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .map_err(|err| AppError::Logger(err.to_string()))?;
    log::info!("logging to {} at {}", target.path.display(), target.filter);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_without_flag_or_env() {
        assert_eq!(resolve_target(None, None, Some("/tmp".into())), None);
        assert_eq!(resolve_target(None, Some("  ".into()), Some("/tmp".into())), None);
    }

    #[test]
    fn explicit_file_defaults_to_info() {
        let target = resolve_target(Some(Path::new("/var/tmp/h.log")), None, None).unwrap();
        assert_eq!(target.path, PathBuf::from("/var/tmp/h.log"));
        assert_eq!(target.filter, "info");
    }

    #[test]
    fn env_filter_logs_to_cache_dir() {
        let target = resolve_target(None, Some("hwtop=debug".into()), Some("/home/u/.cache".into()))
            .unwrap();
        assert_eq!(target.path, PathBuf::from("/home/u/.cache/hwtop/hwtop.log"));
        assert_eq!(target.filter, "hwtop=debug");
    }
}
