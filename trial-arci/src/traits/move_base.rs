use auto_impl::auto_impl;

use crate::error::Error;

/// Planar base velocity. `x`/`y` in m/s, `theta` (yaw rate) in rad/s.
#[derive(Clone, Debug, Default, Copy, PartialEq)]
pub struct BaseVelocity {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

impl BaseVelocity {
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self { x, y, theta }
    }

    /// Velocity with only a forward and a yaw component, as a differential
    /// base is commanded.
    pub fn planar(linear: f64, angular: f64) -> Self {
        Self::new(linear, 0.0, angular)
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.theta == 0.0
    }
}

/// Multiply scalar value for velocity
///
/// # Example
///
/// ```
/// use assert_approx_eq::assert_approx_eq;
/// use trial_arci::BaseVelocity;
///
/// let vel = BaseVelocity::new(0.1, -0.2, 1.0);
/// let twice = vel * 2.0;
/// assert_approx_eq!(twice.x, 0.2);
/// assert_approx_eq!(twice.y, -0.4);
/// assert_approx_eq!(twice.theta, 2.0);
/// ```
impl std::ops::Mul<f64> for BaseVelocity {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
            theta: self.theta * rhs,
        }
    }
}

/// Sink for velocity commands.
///
/// Delivery is fire-and-forget: `Ok` means the command was handed to the
/// transport, not that the robot acted on it.
#[auto_impl(Box, Rc, Arc)]
pub trait MoveBase {
    fn send_velocity(&self, velocity: &BaseVelocity) -> Result<(), Error>;
    fn current_velocity(&self) -> Result<BaseVelocity, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planar() {
        let vel = BaseVelocity::planar(0.15, -0.5);
        assert_eq!(vel, BaseVelocity::new(0.15, 0.0, -0.5));
        assert!(!vel.is_zero());
        assert!(BaseVelocity::default().is_zero());
    }
}
