use crate::config::AppConfig;
use crate::theme::ColorScheme;
use clap::Parser;
use std::path::PathBuf;

/// Terminal dashboard for CPU, GPU, memory and disk telemetry.
#[derive(Debug, Parser)]
#[command(name = "hwtop")]
#[command(version)]
pub struct Cli {
    /// Milliseconds between polls
    #[arg(long, value_parser = clap::value_parser!(u64).range(100..))]
    pub interval_ms: Option<u64>,

    /// Samples kept per trend series
    #[arg(long)]
    pub history: Option<usize>,

    /// Mount point shown in the Disk panel
    #[arg(long)]
    pub mount: Option<String>,

    /// Rows in the top-process table
    #[arg(long)]
    pub processes: Option<usize>,

    #[arg(long, value_enum)]
    pub theme: Option<ColorScheme>,

    /// Write log output to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Read /sys and /proc below this directory instead of /
    #[arg(long, default_value = "/")]
    pub sysfs_root: PathBuf,
}

impl Cli {
    /// Command-line values win over the saved config.
    pub fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(interval) = self.interval_ms {
            config.refresh_interval_ms = interval;
        }
        if let Some(history) = self.history {
            config.history_points = history;
        }
        if let Some(mount) = &self.mount {
            config.disk_mount = mount.clone();
        }
        if let Some(rows) = self.processes {
            config.process_rows = rows;
        }
        if let Some(theme) = self.theme {
            config.color_scheme = theme;
        }
        config
    }
}
