use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use trial_base::SimulatedBaseConfig;
use trial_controller::{RunOptions, SpeedTable, TrialConfig, DEFAULT_TICK_INTERVAL};

use crate::Error;

/// Which output folder a trial belongs to when no `output_dir` is given.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DataSet {
    /// `sim_data/`
    #[default]
    Sim,
    /// `lab_data/`
    Lab,
}

impl DataSet {
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Sim => "sim_data",
            Self::Lab => "lab_data",
        }
    }
}

#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, JsonSchema, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// In-process simulated base.
    #[default]
    Sim,
    /// ROS2 `cmd_vel` / `odom` topics. Requires the `ros2` feature.
    Ros2,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Ros2BackendConfig {
    #[serde(default = "default_node_name")]
    pub node_name: String,
    #[serde(default)]
    pub namespace: String,
    /// Topic name for geometry_msgs/Twist.
    #[serde(default = "default_cmd_vel_topic")]
    pub cmd_vel_topic: String,
    /// Topic name for nav_msgs/Odometry.
    #[serde(default = "default_odom_topic")]
    pub odom_topic: String,
}

fn default_node_name() -> String {
    "motion_trial".into()
}

fn default_cmd_vel_topic() -> String {
    "cmd_vel".into()
}

fn default_odom_topic() -> String {
    "/odom".into()
}

impl Default for Ros2BackendConfig {
    fn default() -> Self {
        Self {
            node_name: default_node_name(),
            namespace: String::new(),
            cmd_vel_topic: default_cmd_vel_topic(),
            odom_topic: default_odom_topic(),
        }
    }
}

/// Startup configuration of the `motion_trial` tool.
///
/// Plain values come before tables so the default can be printed as TOML.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TrialAppConfig {
    /// 0: slow speed level, 1: fast speed level.
    #[serde(default = "default_speed_state")]
    pub speed_state: u8,
    /// 1: 1 m straight, 2: 5 m straight, 3: 10 deg, 4: 180 deg, 5: 360 deg.
    #[serde(default = "default_trial_type")]
    pub trial_type: u8,
    #[serde(default)]
    pub data_set: DataSet,
    /// Directory of the output records. Overrides `data_set`. Relative paths
    /// are resolved against the config file.
    pub output_dir: Option<PathBuf>,
    /// `sync_data` the record after every sample.
    #[serde(default)]
    pub fsync_each_sample: bool,
    /// Motion command re-emission period [ms].
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Fail if no pose arrives within this time [s].
    pub start_timeout_secs: Option<f64>,
    /// Number of trials to run back to back.
    #[serde(default = "default_repeat")]
    pub repeat: u32,
    /// Pause between repeated trials [s].
    #[serde(default = "default_repeat_delay_secs")]
    pub repeat_delay_secs: f64,
    #[serde(default)]
    pub backend: BackendKind,
    /// Write `trace` level JSON logs of the command/pose boundary here.
    pub trace_log_dir: Option<PathBuf>,
    #[serde(default)]
    pub speed_table: SpeedTable,
    #[serde(default)]
    pub sim: SimulatedBaseConfig,
    #[serde(default)]
    pub ros2: Ros2BackendConfig,
}

fn default_speed_state() -> u8 {
    1
}

fn default_trial_type() -> u8 {
    5
}

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL.as_millis() as u64
}

fn default_repeat() -> u32 {
    1
}

fn default_repeat_delay_secs() -> f64 {
    1.0
}

impl Default for TrialAppConfig {
    fn default() -> Self {
        Self {
            speed_state: default_speed_state(),
            trial_type: default_trial_type(),
            data_set: DataSet::default(),
            output_dir: None,
            fsync_each_sample: false,
            tick_interval_ms: default_tick_interval_ms(),
            start_timeout_secs: None,
            repeat: default_repeat(),
            repeat_delay_secs: default_repeat_delay_secs(),
            backend: BackendKind::default(),
            trace_log_dir: None,
            speed_table: SpeedTable::default(),
            sim: SimulatedBaseConfig::default(),
            ros2: Ros2BackendConfig::default(),
        }
    }
}

impl TrialAppConfig {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::from_str(
            &fs_err::read_to_string(&path)
                .map_err(|e| Error::NoFile(path.as_ref().to_owned(), e))?,
            path,
        )
    }

    pub fn from_str<P: AsRef<Path>>(s: &str, path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let mut config: TrialAppConfig =
            toml::from_str(s).map_err(|e| Error::TomlParseFailure(path.to_owned(), e))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        for dir in [&mut config.output_dir, &mut config.trace_log_dir]
            .into_iter()
            .flatten()
        {
            if dir.is_relative() {
                *dir = base_dir.join(&*dir);
            }
        }
        Ok(config)
    }

    /// Validates the trial selection and speed table.
    pub fn trial_config(&self) -> Result<TrialConfig, Error> {
        Ok(TrialConfig::new(
            self.speed_state,
            self.trial_type,
            self.speed_table,
        )?)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.data_set.dir_name()))
    }

    pub fn run_options(&self) -> Result<RunOptions, Error> {
        if self.tick_interval_ms == 0 {
            return Err(Error::InvalidConfig(
                "tick_interval_ms must be positive".into(),
            ));
        }
        let start_timeout = self
            .start_timeout_secs
            .map(|secs| {
                Duration::try_from_secs_f64(secs)
                    .map_err(|e| Error::InvalidConfig(format!("start_timeout_secs: {e}")))
            })
            .transpose()?;
        Ok(RunOptions {
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            start_timeout,
        })
    }

    pub fn repeat_delay(&self) -> Result<Duration, Error> {
        Duration::try_from_secs_f64(self.repeat_delay_secs)
            .map_err(|e| Error::InvalidConfig(format!("repeat_delay_secs: {e}")))
    }

    /// Checks everything that can be checked before touching the robot.
    pub fn validate(&self) -> Result<(), Error> {
        self.trial_config()?;
        self.run_options()?;
        self.repeat_delay()?;
        if self.repeat == 0 {
            return Err(Error::InvalidConfig("repeat must be at least 1".into()));
        }
        Ok(())
    }
}
