use std::path::{Path, PathBuf};

use tracing::{debug, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::{overwrite_str, Error, TrialAppConfig};

const TRIAL_APPS_CONFIG_ENV_NAME: &str = "TRIAL_APPS_CONFIG_PATH";
const DEFAULT_LOG_FILTER: &str =
    "motion_trial=info,trial_apps=info,trial_controller=info,trial_base=info,trial_ros2=info";

/// Get trial config path from input or env TRIAL_APPS_CONFIG_PATH
pub fn get_apps_config_path(config: Option<PathBuf>) -> Option<PathBuf> {
    if config.is_some() {
        config
    } else {
        std::env::var(TRIAL_APPS_CONFIG_ENV_NAME)
            .map(|s| {
                warn!("### ENV VAR {s} is used ###");
                PathBuf::from(s)
            })
            .ok()
    }
}

/// Loads the config file, if any, and applies `overwrite` scripts on top.
pub fn resolve_config(
    config_path: Option<&Path>,
    overwrite: Option<&str>,
) -> Result<TrialAppConfig, Error> {
    match (config_path, overwrite) {
        (Some(config_path), Some(overwrite)) => {
            let s = &fs_err::read_to_string(config_path)
                .map_err(|e| Error::NoFile(config_path.to_owned(), e))?;
            let s = &overwrite_str(s, overwrite)?;
            TrialAppConfig::from_str(s, config_path)
        }
        (Some(config_path), None) => TrialAppConfig::new(config_path),
        (None, overwrite) => {
            let mut config = TrialAppConfig::default();
            if let Some(overwrite) = overwrite {
                let s = &toml::to_string(&config)
                    .map_err(|e| Error::InvalidConfig(e.to_string()))?;
                let s = &overwrite_str(s, overwrite)?;
                config = TrialAppConfig::from_str(s, "")?;
            }
            Ok(config)
        }
    }
}

/// Human readable logs go to stderr, filtered by `RUST_LOG`.
///
/// With `trace_log_dir`, the `trial_tracing` command/pose log is also written
/// there as daily rotated JSON. Keep the returned guard alive until exit.
pub fn init_tracing(trace_log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(env_filter);

    let (file_layer, guard) = match trace_log_dir {
        Some(dir) => {
            let file = tracing_appender::rolling::daily(dir, "trace");
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .with_current_span(false)
                .with_filter(Targets::new().with_target("trial_tracing", Level::TRACE));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();
    if let Some(dir) = trace_log_dir {
        debug!("writing trace log to {}", dir.display());
    }
    guard
}
