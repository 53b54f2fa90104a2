use std::{sync::Arc, time::Duration};

use futures::stream::{self, StreamExt};
use nalgebra::Isometry2;
use parking_lot::Mutex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::debug;
use trial_arci::{BaseVelocity, MoveBase, PoseSample, PoseSource, PoseStream};

use crate::{Error, Odometry};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SimulatedBaseConfig {
    /// Rate of published pose samples [Hz].
    #[serde(default = "default_pose_rate_hz")]
    pub pose_rate_hz: f64,
    /// The base halts when no command arrived for this long [s]. `0` disables
    /// the watchdog.
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: f64,
}

fn default_pose_rate_hz() -> f64 {
    30.0
}

fn default_command_timeout_secs() -> f64 {
    0.5
}

impl Default for SimulatedBaseConfig {
    fn default() -> Self {
        Self {
            pose_rate_hz: default_pose_rate_hz(),
            command_timeout_secs: default_command_timeout_secs(),
        }
    }
}

/// In-process differential base: accepts velocity commands and publishes the
/// dead-reckoned pose at a fixed rate.
#[derive(Debug, Clone)]
pub struct SimulatedBase {
    odometry: Arc<Mutex<Odometry>>,
    pose_period: Duration,
}

impl SimulatedBase {
    pub fn new(config: &SimulatedBaseConfig) -> Result<Self, Error> {
        if !(config.pose_rate_hz.is_finite() && config.pose_rate_hz > 0.0) {
            return Err(Error::InvalidPoseRate(config.pose_rate_hz));
        }
        if !(config.command_timeout_secs.is_finite() && config.command_timeout_secs >= 0.0) {
            return Err(Error::InvalidCommandTimeout(config.command_timeout_secs));
        }
        Ok(Self {
            odometry: Arc::new(Mutex::new(Odometry::new(
                Isometry2::identity(),
                Duration::from_secs_f64(config.command_timeout_secs),
                Instant::now(),
            ))),
            pose_period: Duration::from_secs_f64(1.0 / config.pose_rate_hz),
        })
    }

    pub fn current_pose(&self) -> Isometry2<f64> {
        self.odometry.lock().update(Instant::now())
    }
}

impl MoveBase for SimulatedBase {
    fn send_velocity(&self, velocity: &BaseVelocity) -> Result<(), trial_arci::Error> {
        self.odometry.lock().command(velocity, Instant::now());
        Ok(())
    }

    fn current_velocity(&self) -> Result<BaseVelocity, trial_arci::Error> {
        Ok(self.odometry.lock().effective_velocity(Instant::now()))
    }
}

impl PoseSource for SimulatedBase {
    fn subscribe(&self) -> trial_arci::Result<PoseStream> {
        let odometry = self.odometry.clone();
        let period = self.pose_period;
        // The interval is created on first poll, inside the runtime.
        let ticker: Option<Interval> = None;
        Ok(stream::unfold((odometry, ticker), move |(odometry, ticker)| async move {
            let mut ticker = ticker.unwrap_or_else(|| {
                let mut ticker = time::interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                ticker
            });
            ticker.tick().await;
            let pose = odometry.lock().update(Instant::now());
            debug!(x = pose.translation.x, y = pose.translation.y, theta = pose.rotation.angle());
            Some((PoseSample::from(pose), (odometry, Some(ticker))))
        })
        .boxed())
    }
}
