use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};
use trial_apps::{utils, BackendKind, TrialAppConfig};

/// Runs timed open-loop motion trials and records the robot pose.
#[derive(Parser, Debug)]
#[clap(name = env!("CARGO_BIN_NAME"))]
struct Args {
    /// Path to the setting file.
    #[clap(short, long, value_parser)]
    config_path: Option<PathBuf>,
    /// Set options from command line. These settings take priority over the
    /// setting file specified by --config-path.
    #[clap(long)]
    config: Option<String>,
    /// 0: slow, 1: fast.
    #[clap(short, long)]
    speed_state: Option<u8>,
    /// 1: 1 m, 2: 5 m, 3: 10 deg, 4: 180 deg, 5: 360 deg.
    #[clap(short, long)]
    trial_type: Option<u8>,
    /// Directory of the output records.
    #[clap(short, long, value_parser)]
    output_dir: Option<PathBuf>,
    /// Number of trials to run back to back.
    #[clap(short, long)]
    repeat: Option<u32>,
    #[clap(long, value_enum)]
    backend: Option<BackendKind>,
    /// Prints the default setting as TOML.
    #[clap(long)]
    show_default_config: bool,
    /// Prints the JSON schema of the setting file.
    #[clap(long)]
    show_schema: bool,
}

impl Args {
    fn apply(&self, config: &mut TrialAppConfig) {
        if let Some(speed_state) = self.speed_state {
            config.speed_state = speed_state;
        }
        if let Some(trial_type) = self.trial_type {
            config.trial_type = trial_type;
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = Some(output_dir.clone());
        }
        if let Some(repeat) = self.repeat {
            config.repeat = repeat;
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.show_default_config {
        print!("{}", toml::to_string(&TrialAppConfig::default())?);
        return Ok(());
    }
    if args.show_schema {
        let schema = schemars::schema_for!(TrialAppConfig);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let config_path = utils::get_apps_config_path(args.config_path.clone());
    let mut config = utils::resolve_config(config_path.as_deref(), args.config.as_deref())?;
    args.apply(&mut config);

    let _guard = utils::init_tracing(config.trace_log_dir.as_deref());
    debug!("args: {args:?}");
    debug!("config: {config:?}");

    let summaries = trial_apps::run(&config).await?;
    for summary in &summaries {
        info!(
            samples = summary.samples,
            elapsed = ?summary.elapsed,
            "{}",
            summary.path.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = Args::parse_from([
            env!("CARGO_BIN_NAME"),
            "--config-path",
            "trial.toml",
            "--config",
            "sim.pose_rate_hz = 10.0",
            "-s",
            "0",
            "-t",
            "4",
            "--repeat",
            "3",
            "--backend",
            "sim",
        ]);
        assert_eq!(args.config_path, Some(PathBuf::from("trial.toml")));
        assert_eq!(args.config.as_deref(), Some("sim.pose_rate_hz = 10.0"));

        let mut config = TrialAppConfig::default();
        args.apply(&mut config);
        assert_eq!(config.speed_state, 0);
        assert_eq!(config.trial_type, 4);
        assert_eq!(config.repeat, 3);
        assert_eq!(config.backend, BackendKind::Sim);
        assert_eq!(config.output_dir, None);
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
