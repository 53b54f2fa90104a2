use std::time::Duration;

use nalgebra::{Isometry2, Vector2};
use tokio::time::Instant;
use trial_arci::BaseVelocity;

/// Dead-reckoned pose of a base driven by velocity commands.
///
/// A command stays in effect for `command_timeout` after it was sent, then
/// the base coasts to a halt, as a real base does when its `cmd_vel`
/// watchdog fires. A zero timeout keeps commands in effect forever.
#[derive(Debug, Clone)]
pub struct Odometry {
    pose: Isometry2<f64>,
    velocity: BaseVelocity,
    last_command: Option<Instant>,
    last_update: Instant,
    command_timeout: Duration,
}

impl Odometry {
    pub fn new(pose: Isometry2<f64>, command_timeout: Duration, now: Instant) -> Self {
        Self {
            pose,
            velocity: BaseVelocity::default(),
            last_command: None,
            last_update: now,
            command_timeout,
        }
    }

    /// Integrates up to `now`, then switches to `velocity`.
    pub fn command(&mut self, velocity: &BaseVelocity, now: Instant) {
        self.update(now);
        self.velocity = *velocity;
        self.last_command = Some(now);
    }

    /// Integrates the commanded velocity from the last update to `now` and
    /// returns the new pose.
    pub fn update(&mut self, now: Instant) -> Isometry2<f64> {
        let dt = now.saturating_duration_since(self.last_update);
        let moving = match self.last_command {
            None => Duration::ZERO,
            Some(_) if self.command_timeout.is_zero() => dt,
            Some(sent) => (sent + self.command_timeout)
                .saturating_duration_since(self.last_update)
                .min(dt),
        };
        let dt = moving.as_secs_f64();
        if dt > 0.0 {
            let delta = Isometry2::new(
                Vector2::new(self.velocity.x * dt, self.velocity.y * dt),
                self.velocity.theta * dt,
            );
            self.pose = self.pose * delta;
        }
        self.last_update = self.last_update.max(now);
        self.pose
    }

    pub fn pose(&self) -> Isometry2<f64> {
        self.pose
    }

    /// Velocity the base is actually moving with at `now`.
    pub fn effective_velocity(&self, now: Instant) -> BaseVelocity {
        match self.last_command {
            Some(sent)
                if self.command_timeout.is_zero()
                    || now.saturating_duration_since(sent) <= self.command_timeout =>
            {
                self.velocity
            }
            _ => BaseVelocity::default(),
        }
    }
}

#[cfg(test)]
mod test {
    use std::f64::consts::FRAC_PI_2;

    use assert_approx_eq::assert_approx_eq;

    use super::*;

    #[test]
    fn test_integrate_straight_and_turn() {
        let t0 = Instant::now();
        let mut odom = Odometry::new(Isometry2::identity(), Duration::ZERO, t0);
        odom.command(&BaseVelocity::planar(0.5, 0.0), t0);
        let pose = odom.update(t0 + Duration::from_secs(2));
        assert_approx_eq!(pose.translation.x, 1.0);
        assert_approx_eq!(pose.translation.y, 0.0);

        odom.command(&BaseVelocity::planar(0.0, FRAC_PI_2), t0 + Duration::from_secs(2));
        let pose = odom.update(t0 + Duration::from_secs(3));
        assert_approx_eq!(pose.translation.x, 1.0);
        assert_approx_eq!(pose.rotation.angle(), FRAC_PI_2);

        // heading now +y
        odom.command(&BaseVelocity::planar(1.0, 0.0), t0 + Duration::from_secs(3));
        let pose = odom.update(t0 + Duration::from_secs(4));
        assert_approx_eq!(pose.translation.x, 1.0);
        assert_approx_eq!(pose.translation.y, 1.0);
    }

    #[test]
    fn test_command_timeout() {
        let t0 = Instant::now();
        let mut odom = Odometry::new(Isometry2::identity(), Duration::from_millis(500), t0);
        assert!(odom.effective_velocity(t0).is_zero());

        odom.command(&BaseVelocity::planar(1.0, 0.0), t0);
        assert!(!odom.effective_velocity(t0 + Duration::from_millis(400)).is_zero());
        assert!(odom.effective_velocity(t0 + Duration::from_millis(600)).is_zero());

        // only the first 0.5 s of the 2 s window moves the base
        let pose = odom.update(t0 + Duration::from_secs(2));
        assert_approx_eq!(pose.translation.x, 0.5);

        // a refreshed command keeps it going
        odom.command(&BaseVelocity::planar(1.0, 0.0), t0 + Duration::from_secs(2));
        odom.command(&BaseVelocity::planar(1.0, 0.0), t0 + Duration::from_millis(2400));
        let pose = odom.update(t0 + Duration::from_secs(3));
        assert_approx_eq!(pose.translation.x, 1.4);
    }

    #[test]
    fn test_no_command_no_motion() {
        let t0 = Instant::now();
        let mut odom = Odometry::new(Isometry2::identity(), Duration::ZERO, t0);
        let pose = odom.update(t0 + Duration::from_secs(10));
        assert_eq!(pose, Isometry2::identity());
    }
}
