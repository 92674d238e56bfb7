use std::fs::{self, Permissions};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter, Registry};

pub const LOG_FILE_PREFIX: &str = "fmcd-dashboard.log";

pub struct LoggingConfig {
    pub level: String,
    pub console_output: bool,
    pub file_output: bool,
    pub log_dir: PathBuf,
    pub rotation: Rotation,
    pub max_log_files: Option<usize>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: true,
            log_dir: PathBuf::from("./logs"),
            rotation: Rotation::DAILY,
            max_log_files: Some(30),
        }
    }
}

pub fn init_logging(config: LoggingConfig) -> anyhow::Result<()> {
    if !config.console_output && !config.file_output {
        return Err(anyhow::anyhow!(
            "At least one output (console or file) must be enabled"
        ));
    }

    if config.file_output {
        prepare_log_dir(&config.log_dir, config.max_log_files)?;
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let file_layer = config.file_output.then(|| {
        let file_appender =
            RollingFileAppender::new(config.rotation.clone(), &config.log_dir, LOG_FILE_PREFIX);
        fmt::layer()
            .json()
            .with_writer(file_appender)
            .with_current_span(true)
            .with_span_list(true)
    });

    let console_layer = config.console_output.then(|| {
        fmt::layer()
            .pretty()
            .with_thread_ids(true)
            .with_target(true)
    });

    Registry::default()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()?;

    Ok(())
}

/// Create the log directory owner/group-only and apply the retention policy
fn prepare_log_dir(log_dir: &Path, max_log_files: Option<usize>) -> anyhow::Result<()> {
    fs::create_dir_all(log_dir)?;
    fs::set_permissions(log_dir, Permissions::from_mode(0o750))?;

    if let Some(max_files) = max_log_files {
        cleanup_old_log_files(log_dir, max_files)?;
    }

    Ok(())
}

/// Remove the oldest rotated log files beyond `max_files`
pub fn cleanup_old_log_files(log_dir: &Path, max_files: usize) -> anyhow::Result<usize> {
    let mut log_files: Vec<_> = fs::read_dir(log_dir)?
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let path = entry.path();
            let is_log = path
                .file_name()
                .and_then(|name| name.to_str())
                .map_or(false, |name| name.starts_with(LOG_FILE_PREFIX));

            if path.is_file() && is_log {
                let modified = entry.metadata().ok()?.modified().ok()?;
                Some((path, modified))
            } else {
                None
            }
        })
        .collect();

    // Newest first
    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    let mut removed = 0;
    for (path, _) in log_files.iter().skip(max_files) {
        match fs::remove_file(path) {
            Ok(()) => removed += 1,
            Err(e) => eprintln!("Failed to remove old log file {:?}: {}", path, e),
        }
    }

    Ok(removed)
}
