use app::App;
use clap::Parser;
use cli::Cli;
use config::AppConfig;
use data::collector::{CollectorSettings, DataCollector};
use data::command::TokioCommandRunner;
use data::sysfs::SysRoot;
use data::DataManager;
use error::AppError;
use std::time::Duration;
use theme::Theme;

mod action;
mod app;
mod cli;
mod components;
mod config;
mod data;
mod error;
mod layout;
mod logging;
mod theme;
mod tui;
mod utils;
mod widgets;

/// External tools never run more often than this, whatever the config says.
const MIN_COMMAND_CACHE_MS: u64 = 900;

fn main() -> Result<(), AppError> {
    // Setup panic handler
    std::panic::set_hook(Box::new(|panic_info| {
        tui::restore();
        eprintln!("{}", panic_info);
    }));

    let cli = Cli::parse();
    logging::init(cli.log_file.as_deref())?;

    let saved_config = AppConfig::load();
    let config = cli.apply(saved_config.clone());
    log::info!("starting with {:?}", config);

    let runner = TokioCommandRunner::new(Duration::from_millis(config.command_timeout_ms))?;
    let settings = CollectorSettings {
        mount_point: config.disk_mount.clone(),
        process_rows: config.process_rows,
        command_cache: Duration::from_millis(config.command_cache_ms.max(MIN_COMMAND_CACHE_MS)),
    };
    let collector = DataCollector::new(
        SysRoot::new(cli.sysfs_root.clone()),
        Box::new(runner),
        settings,
    );
    let manager = DataManager::new(collector, config.history_points);

    let tui = tui::Tui::new()?;
    let mut app = App::new(
        tui,
        manager,
        Theme::new(config.color_scheme),
        saved_config,
        data::system::hostname(),
        Duration::from_millis(config.refresh_interval_ms.max(100)),
    );
    app.run()
}
