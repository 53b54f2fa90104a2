use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use trial_arci::{BaseVelocity, MoveBase, PoseSample};

use crate::{compute_motion_profile, MotionProfile, Result, TrialConfig, TrialRecord};

/// What a pose update did to the trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrialEvent {
    /// First pose: motion command sent and re-emission ticker armed.
    Started(MotionProfile),
    /// Pose recorded, trial still running.
    Recorded,
    /// Expected duration exceeded: zero velocity sent. The owner should tear
    /// the controller down with [`TrialController::finish`].
    Finished,
}

/// Outcome of a torn-down trial.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialSummary {
    pub path: PathBuf,
    pub sequence_number: u64,
    pub samples: usize,
    pub profile: Option<MotionProfile>,
    /// Time from the first pose to the pose that stopped the trial.
    pub elapsed: Option<Duration>,
    pub completed: bool,
}

/// State machine of one open-loop, time-gated trial.
///
/// Pose updates and ticks must be fed from a single task; nothing here is
/// shared.
#[derive(Debug)]
pub struct TrialController<M>
where
    M: MoveBase,
{
    config: TrialConfig,
    move_base: M,
    record: TrialRecord,
    profile: Option<MotionProfile>,
    start_time: Option<Instant>,
    stop_time: Option<Instant>,
    stopped: bool,
    ticker_armed: bool,
}

impl<M> TrialController<M>
where
    M: MoveBase,
{
    /// `record` must have been created for the same speed state and trial
    /// type as `config`.
    pub fn new(config: TrialConfig, move_base: M, record: TrialRecord) -> Self {
        debug_assert_eq!(
            (record.speed_state(), record.trial_type()),
            (config.speed_state(), config.trial_type()),
            "record {} does not belong to this trial",
            record.path().display()
        );
        info!(
            speed_state = %config.speed_state(),
            trial_type = %config.trial_type(),
            linear_speed = config.linear_speed(),
            angular_speed = config.angular_speed(),
            "trial controller ready, recording to {}",
            record.path().display()
        );
        Self {
            config,
            move_base,
            record,
            profile: None,
            start_time: None,
            stop_time: None,
            stopped: false,
            ticker_armed: false,
        }
    }

    /// Allocates the next record for this configuration in `output_dir` and
    /// builds a controller writing to it.
    pub fn create(config: TrialConfig, move_base: M, output_dir: impl AsRef<Path>) -> Result<Self> {
        let record = TrialRecord::create(output_dir, config.speed_state(), config.trial_type())?;
        Ok(Self::new(config, move_base, record))
    }

    pub fn config(&self) -> &TrialConfig {
        &self.config
    }

    pub fn move_base(&self) -> &M {
        &self.move_base
    }

    pub fn record_path(&self) -> &Path {
        self.record.path()
    }

    /// `None` until the first pose update.
    pub fn profile(&self) -> Option<&MotionProfile> {
        self.profile.as_ref()
    }

    pub fn start_time(&self) -> Option<Instant> {
        self.start_time
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn is_ticker_armed(&self) -> bool {
        self.ticker_armed
    }

    pub fn on_pose_update(&mut self, sample: &PoseSample, now: Instant) -> Result<TrialEvent> {
        self.record.append(sample)?;

        if self.stopped {
            // Late update before teardown: still recorded, and the robot is
            // told to stop again.
            self.send(&BaseVelocity::default());
            return Ok(TrialEvent::Finished);
        }

        match (self.start_time, self.profile) {
            (Some(start), Some(profile)) => {
                let elapsed = now.saturating_duration_since(start);
                if elapsed > profile.expected_duration {
                    self.stopped = true;
                    self.stop_time = Some(now);
                    self.send(&BaseVelocity::default());
                    info!(
                        elapsed_secs = elapsed.as_secs_f64(),
                        expected_secs = profile.expected_duration_secs(),
                        samples = self.record.samples_written(),
                        "trial complete"
                    );
                    Ok(TrialEvent::Finished)
                } else {
                    Ok(TrialEvent::Recorded)
                }
            }
            _ => {
                let profile = compute_motion_profile(&self.config);
                self.profile = Some(profile);
                self.send(&profile.command());
                self.start_time = Some(now);
                self.ticker_armed = true;
                info!(
                    linear_velocity = profile.linear_velocity,
                    angular_velocity = profile.angular_velocity,
                    expected_secs = profile.expected_duration_secs(),
                    "trial started"
                );
                Ok(TrialEvent::Started(profile))
            }
        }
    }

    /// Re-emits the motion command. No-op before the first pose and after
    /// stop.
    pub fn on_tick(&mut self) {
        if self.stopped || !self.ticker_armed {
            return;
        }
        if let Some(profile) = self.profile {
            debug!("tick");
            self.send(&profile.command());
        }
    }

    /// Tears down the trial and closes the record.
    pub fn finish(self) -> Result<TrialSummary> {
        let summary = self.summary();
        self.record.close()?;
        Ok(summary)
    }

    /// Tears down an unfinished trial: stops the robot, then closes the
    /// record as far as it got.
    pub fn abort(mut self) -> TrialSummary {
        warn!("aborting trial, recorded in {}", self.record.path().display());
        self.stopped = true;
        self.ticker_armed = false;
        self.send(&BaseVelocity::default());
        let summary = self.summary();
        if let Err(e) = self.record.close() {
            error!("failed to close {}: {e}", summary.path.display());
        }
        summary
    }

    fn summary(&self) -> TrialSummary {
        TrialSummary {
            path: self.record.path().to_owned(),
            sequence_number: self.record.sequence_number(),
            samples: self.record.samples_written(),
            profile: self.profile,
            elapsed: self
                .start_time
                .zip(self.stop_time)
                .map(|(start, stop)| stop.saturating_duration_since(start)),
            completed: self.stop_time.is_some(),
        }
    }

    /// Commands are fire-and-forget; a failed send is reported and the next
    /// tick sends again.
    fn send(&self, velocity: &BaseVelocity) {
        if let Err(e) = self.move_base.send_velocity(velocity) {
            if velocity.is_zero() {
                error!("failed to send stop command: {e}");
            } else {
                warn!("failed to send velocity {velocity:?}: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use assert_approx_eq::assert_approx_eq;
    use fs_err as fs;
    use trial_arci::DummyMoveBase;

    use super::*;
    use crate::SpeedTable;

    fn controller(
        dir: &Path,
        speed_state: u8,
        trial_type: u8,
    ) -> (TrialController<Rc<DummyMoveBase>>, Rc<DummyMoveBase>) {
        let config = TrialConfig::new(speed_state, trial_type, SpeedTable::default()).unwrap();
        let base = Rc::new(DummyMoveBase::new());
        let controller = TrialController::create(config, base.clone(), dir).unwrap();
        (controller, base)
    }

    fn secs(start: Instant, secs: f64) -> Instant {
        start + Duration::from_secs_f64(secs)
    }

    #[test]
    fn test_arming_on_first_update() {
        let dir = tempfile::tempdir().unwrap();
        let (mut c, base) = controller(dir.path(), 0, 1);
        assert!(!c.is_ticker_armed());
        assert!(c.profile().is_none());

        // ticks before the first pose do nothing
        c.on_tick();
        assert!(base.sent_velocities().is_empty());

        let t0 = Instant::now();
        let event = c.on_pose_update(&PoseSample::default(), t0).unwrap();
        let TrialEvent::Started(profile) = event else {
            panic!("unexpected {event:?}");
        };
        assert!(c.is_ticker_armed());
        assert_eq!(c.start_time(), Some(t0));
        assert_approx_eq!(profile.linear_velocity, 0.075);
        assert_eq!(base.sent_velocities(), vec![BaseVelocity::planar(0.075, 0.0)]);

        // armed only once
        assert_eq!(
            c.on_pose_update(&PoseSample::default(), secs(t0, 0.1)).unwrap(),
            TrialEvent::Recorded
        );
        assert_eq!(c.start_time(), Some(t0));
        assert_eq!(base.sent_velocities().len(), 1);

        c.on_tick();
        c.on_tick();
        assert_eq!(base.sent_velocities().len(), 3);
        assert!(base.sent_velocities().iter().all(|v| *v == profile.command()));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic = "does not belong to this trial"]
    fn test_record_of_other_trial() {
        let dir = tempfile::tempdir().unwrap();
        let record = TrialRecord::create(
            dir.path(),
            crate::SpeedState::Slow,
            crate::TrialType::RotateHalfTurn,
        )
        .unwrap();
        let config = TrialConfig::new(1, 4, SpeedTable::default()).unwrap();
        let _ = TrialController::new(config, DummyMoveBase::new(), record);
    }

    #[test]
    fn test_duration_boundary_is_strict() {
        let dir = tempfile::tempdir().unwrap();
        let (mut c, _base) = controller(dir.path(), 1, 3);
        let t0 = Instant::now();
        c.on_pose_update(&PoseSample::default(), t0).unwrap();
        let expected = c.profile().unwrap().expected_duration;

        let event = c.on_pose_update(&PoseSample::default(), t0 + expected).unwrap();
        assert_eq!(event, TrialEvent::Recorded);
        assert!(!c.is_stopped());

        let event = c
            .on_pose_update(
                &PoseSample::default(),
                t0 + expected + Duration::from_nanos(1),
            )
            .unwrap();
        assert_eq!(event, TrialEvent::Finished);
        assert!(c.is_stopped());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let (mut c, base) = controller(dir.path(), 0, 3);
        let t0 = Instant::now();
        c.on_pose_update(&PoseSample::default(), t0).unwrap();
        assert_eq!(
            c.on_pose_update(&PoseSample::default(), secs(t0, 10.0)).unwrap(),
            TrialEvent::Finished
        );
        let sent_at_stop = base.sent_velocities().len();
        assert!(base.sent_velocities().last().unwrap().is_zero());

        c.on_tick();
        c.on_tick();
        for i in 0..3 {
            assert_eq!(
                c.on_pose_update(&PoseSample::default(), secs(t0, 11.0 + i as f64))
                    .unwrap(),
                TrialEvent::Finished
            );
            c.on_tick();
        }
        assert!(c.is_stopped());
        let sent = base.sent_velocities();
        assert!(sent[sent_at_stop..].iter().all(BaseVelocity::is_zero));
        assert!(sent[sent_at_stop - 1].is_zero());

        // all late samples are still recorded
        let summary = c.finish().unwrap();
        assert_eq!(summary.samples, 5);
        assert!(summary.completed);
        assert_eq!(summary.elapsed, Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_full_turn_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let (mut c, base) = controller(dir.path(), 1, 5);
        let t0 = Instant::now();

        let event = c.on_pose_update(&PoseSample::default(), t0).unwrap();
        let TrialEvent::Started(profile) = event else {
            panic!("unexpected {event:?}");
        };
        assert_approx_eq!(profile.angular_velocity, 120_f64.to_radians());
        assert_approx_eq!(profile.expected_duration_secs(), 3.0);
        assert_eq!(base.sent_velocities().last().unwrap().x, 0.0);

        for t in [1.0, 2.0] {
            assert_eq!(
                c.on_pose_update(&PoseSample::default(), secs(t0, t)).unwrap(),
                TrialEvent::Recorded
            );
        }
        assert_eq!(
            c.on_pose_update(&PoseSample::default(), secs(t0, 3.5)).unwrap(),
            TrialEvent::Finished
        );
        assert!(base.current_velocity().unwrap().is_zero());

        let summary = c.finish().unwrap();
        assert_eq!(summary.samples, 4);
        let contents = fs::read_to_string(&summary.path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "x y z x_rot y_rot z_rot w_rot");
        assert!(lines[1..]
            .iter()
            .all(|l| l.split(' ').map(|v| v.parse::<f64>().unwrap()).count() == 7));
        assert!(contents.ends_with('\n'));
    }

    #[test]
    fn test_send_failure_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let (mut c, base) = controller(dir.path(), 0, 1);
        base.set_fail_sends(true);
        let t0 = Instant::now();
        assert!(matches!(
            c.on_pose_update(&PoseSample::default(), t0).unwrap(),
            TrialEvent::Started(_)
        ));
        assert!(base.sent_velocities().is_empty());

        // transport recovers, next tick delivers the motion command
        base.set_fail_sends(false);
        c.on_tick();
        assert_eq!(base.sent_velocities(), vec![BaseVelocity::planar(0.075, 0.0)]);
    }

    #[test]
    fn test_abort_stops_robot() {
        let dir = tempfile::tempdir().unwrap();
        let (mut c, base) = controller(dir.path(), 1, 2);
        c.on_pose_update(&PoseSample::default(), Instant::now())
            .unwrap();
        let summary = c.abort();
        assert!(!summary.completed);
        assert_eq!(summary.samples, 1);
        assert!(base.current_velocity().unwrap().is_zero());
    }

    #[test]
    fn test_records_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let (first, _) = controller(dir.path(), 1, 5);
        let (second, _) = controller(dir.path(), 1, 5);
        let (other, _) = controller(dir.path(), 0, 5);
        assert!(first.record_path().ends_with("speed_1_trial_5_num_0.txt"));
        assert!(second.record_path().ends_with("speed_1_trial_5_num_1.txt"));
        assert!(other.record_path().ends_with("speed_0_trial_5_num_0.txt"));
    }
}
