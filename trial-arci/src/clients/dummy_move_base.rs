use std::cell::{Cell, RefCell};

use crate::{
    error::Error,
    traits::{BaseVelocity, MoveBase},
};

/// Dummy MoveBase for debug or tests. Remembers every command it was sent.
#[derive(Clone, Debug, Default)]
pub struct DummyMoveBase {
    pub current_velocity: RefCell<BaseVelocity>,
    sent_velocities: RefCell<Vec<BaseVelocity>>,
    fail_sends: Cell<bool>,
}

impl DummyMoveBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// All commands accepted so far, oldest first.
    pub fn sent_velocities(&self) -> Vec<BaseVelocity> {
        self.sent_velocities.borrow().clone()
    }

    /// Makes subsequent `send_velocity` calls fail as a broken transport would.
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.set(fail);
    }
}

impl MoveBase for DummyMoveBase {
    fn send_velocity(&self, velocity: &BaseVelocity) -> Result<(), Error> {
        if self.fail_sends.get() {
            return Err(Error::Connection {
                message: "DummyMoveBase is set to fail".to_owned(),
            });
        }
        self.current_velocity.replace(velocity.to_owned());
        self.sent_velocities.borrow_mut().push(velocity.to_owned());
        Ok(())
    }

    fn current_velocity(&self) -> Result<BaseVelocity, Error> {
        Ok(self.current_velocity.borrow().to_owned())
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    #[test]
    fn test_set_get() {
        let base = DummyMoveBase::new();
        let vel = base.current_velocity().unwrap();
        assert_approx_eq!(vel.x, 0.0);
        assert_approx_eq!(vel.y, 0.0);
        assert_approx_eq!(vel.theta, 0.0);
        base.send_velocity(&BaseVelocity::new(0.1, 0.2, -3.0))
            .unwrap();
        let vel2 = base.current_velocity().unwrap();
        assert_approx_eq!(vel2.x, 0.1);
        assert_approx_eq!(vel2.y, 0.2);
        assert_approx_eq!(vel2.theta, -3.0);
        assert_eq!(base.sent_velocities().len(), 1);
    }

    #[test]
    fn test_fail_sends() {
        let base = DummyMoveBase::new();
        base.set_fail_sends(true);
        assert!(base.send_velocity(&BaseVelocity::planar(1.0, 0.0)).is_err());
        assert!(base.sent_velocities().is_empty());
        base.set_fail_sends(false);
        base.send_velocity(&BaseVelocity::planar(1.0, 0.0)).unwrap();
        assert_eq!(base.sent_velocities(), vec![BaseVelocity::planar(1.0, 0.0)]);
    }
}
