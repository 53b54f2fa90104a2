use std::time::Duration;

use trial_arci::BaseVelocity;

use crate::TrialConfig;

/// Motion kind and magnitude of a trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// Drive straight ahead for `distance` meters.
    Straight { distance: f64 },
    /// Turn in place by `angle` radians.
    Rotate { angle: f64 },
}

/// Velocities to hold and how long to hold them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionProfile {
    /// [m/s]
    pub linear_velocity: f64,
    /// [rad/s]
    pub angular_velocity: f64,
    pub expected_duration: Duration,
}

impl MotionProfile {
    pub fn command(&self) -> BaseVelocity {
        BaseVelocity::planar(self.linear_velocity, self.angular_velocity)
    }

    pub fn expected_duration_secs(&self) -> f64 {
        self.expected_duration.as_secs_f64()
    }
}

/// Derives the profile kinematically: magnitude / speed, assuming no
/// acceleration phase and no slip.
pub fn compute_motion_profile(config: &TrialConfig) -> MotionProfile {
    match config.trial_type().motion() {
        Motion::Straight { distance } => {
            let speed = config.linear_speed();
            MotionProfile {
                linear_velocity: speed,
                angular_velocity: 0.0,
                expected_duration: Duration::from_secs_f64(distance / speed),
            }
        }
        Motion::Rotate { angle } => {
            let speed = config.angular_speed();
            MotionProfile {
                linear_velocity: 0.0,
                angular_velocity: speed,
                expected_duration: Duration::from_secs_f64(angle / speed),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;
    use crate::{SpeedTable, TrialType};

    #[test]
    fn test_exactly_one_velocity_component() {
        for speed_state in 0..=1 {
            for trial_type in 1..=5 {
                let config = TrialConfig::new(speed_state, trial_type, SpeedTable::default())
                    .unwrap();
                let profile = compute_motion_profile(&config);
                let linear = profile.linear_velocity != 0.0;
                let angular = profile.angular_velocity != 0.0;
                assert!(linear ^ angular, "{config:?} -> {profile:?}");
                assert!(profile.expected_duration > Duration::ZERO);
                assert!(!profile.command().is_zero());
            }
        }
    }

    #[test]
    fn test_policy_table() {
        let table = SpeedTable::default();
        let profile = |s, t| compute_motion_profile(&TrialConfig::new(s, t, table).unwrap());

        let p = profile(0, 1);
        assert_approx_eq!(p.linear_velocity, 0.075);
        assert_approx_eq!(p.expected_duration_secs(), 1.0 / 0.075);

        let p = profile(1, 2);
        assert_approx_eq!(p.linear_velocity, 0.15);
        assert_approx_eq!(p.expected_duration_secs(), 5.0 / 0.15);

        let p = profile(0, 3);
        assert_approx_eq!(p.angular_velocity, 30_f64.to_radians());
        assert_approx_eq!(p.expected_duration_secs(), 10.0 / 30.0);

        let p = profile(0, 4);
        assert_approx_eq!(p.expected_duration_secs(), 6.0);

        let p = profile(1, 5);
        assert_approx_eq!(p.linear_velocity, 0.0);
        assert_approx_eq!(p.angular_velocity, 120_f64.to_radians());
        assert_approx_eq!(p.expected_duration_secs(), 3.0);
    }

    #[test]
    fn test_motion_magnitudes() {
        assert_eq!(
            TrialType::StraightFiveMeters.motion(),
            Motion::Straight { distance: 5.0 }
        );
        match TrialType::RotateHalfTurn.motion() {
            Motion::Rotate { angle } => assert_approx_eq!(angle, std::f64::consts::PI),
            m => panic!("unexpected {m:?}"),
        }
    }
}
