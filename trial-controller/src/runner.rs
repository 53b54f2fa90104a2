use std::time::Duration;

use futures::StreamExt;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};
use trial_arci::{MoveBase, PoseStream};

use crate::{Error, Result, TrialController, TrialEvent, TrialSummary};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Period of motion command re-emission once the trial has started.
    pub tick_interval: Duration,
    /// Give up if no pose arrives within this time. `None` waits forever.
    pub start_timeout: Option<Duration>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            start_timeout: None,
        }
    }
}

/// Drives `controller` from `poses` until the trial finishes.
///
/// Pose updates and ticks are handled on the current task, one at a time.
/// The ticker only exists between the first pose and teardown. On any error
/// the robot is sent a zero velocity before the error is returned.
pub async fn run_trial<M>(
    mut controller: TrialController<M>,
    mut poses: PoseStream,
    options: &RunOptions,
) -> Result<TrialSummary>
where
    M: MoveBase,
{
    let mut ticker: Option<Interval> = None;
    let start_deadline = options.start_timeout.map(|t| (Instant::now() + t, t));

    loop {
        tokio::select! {
            pose = poses.next() => {
                let Some(pose) = pose else {
                    controller.abort();
                    return Err(Error::PoseStreamClosed);
                };
                match controller.on_pose_update(&pose, Instant::now()) {
                    Ok(TrialEvent::Started(_)) => {
                        ticker = Some(new_ticker(options.tick_interval));
                    }
                    Ok(TrialEvent::Recorded) => {}
                    Ok(TrialEvent::Finished) => {
                        let summary = controller.finish()?;
                        info!(
                            samples = summary.samples,
                            "trial finished, recorded in {}",
                            summary.path.display()
                        );
                        return Ok(summary);
                    }
                    Err(e) => {
                        controller.abort();
                        return Err(e);
                    }
                }
            }
            _ = tick(&mut ticker) => controller.on_tick(),
            timeout = wait_deadline(start_deadline), if controller.start_time().is_none() => {
                controller.abort();
                return Err(Error::NoPoseReceived(timeout));
            }
        }
    }
}

fn new_ticker(period: Duration) -> Interval {
    // The motion command was just sent, so the first tick is one period out.
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    debug!(?period, "ticker armed");
    ticker
}

async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn wait_deadline(deadline: Option<(Instant, Duration)>) -> Duration {
    match deadline {
        Some((deadline, timeout)) => {
            time::sleep_until(deadline).await;
            timeout
        }
        None => std::future::pending().await,
    }
}
