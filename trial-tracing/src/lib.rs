//! `trace!` events at the transport boundary of a motion trial.
//!
//! Wrap a command sink or pose source in [`Tracing`] and every velocity sent
//! and every pose delivered is emitted as a structured event with a `method`
//! field, ready for a JSON subscriber.

#![warn(rust_2018_idioms)]

use futures::StreamExt;
use tracing::trace;

#[derive(Debug)]
pub struct Tracing<T>(T);

impl<T> Tracing<T> {
    pub fn new(v: T) -> Self {
        Self(v)
    }

    pub fn get_ref(&self) -> &T {
        &self.0
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Tracing<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: trial_arci::MoveBase> trial_arci::MoveBase for Tracing<T> {
    fn send_velocity(&self, velocity: &trial_arci::BaseVelocity) -> Result<(), trial_arci::Error> {
        trace!(
            method = "trial_arci::MoveBase::send_velocity",
            velocity_x = velocity.x,
            velocity_y = velocity.y,
            velocity_theta = velocity.theta
        );
        self.0.send_velocity(velocity)
    }

    fn current_velocity(&self) -> Result<trial_arci::BaseVelocity, trial_arci::Error> {
        let velocity = self.0.current_velocity()?;
        trace!(
            method = "trial_arci::MoveBase::current_velocity",
            velocity_x = velocity.x,
            velocity_y = velocity.y,
            velocity_theta = velocity.theta
        );
        Ok(velocity)
    }
}

impl<T: trial_arci::PoseSource> trial_arci::PoseSource for Tracing<T> {
    fn subscribe(&self) -> trial_arci::Result<trial_arci::PoseStream> {
        trace!(method = "trial_arci::PoseSource::subscribe");
        let poses = self.0.subscribe()?;
        Ok(poses
            .inspect(|pose| {
                trace!(
                    method = "trial_arci::PoseSource::next",
                    position_x = pose.position.x,
                    position_y = pose.position.y,
                    position_z = pose.position.z,
                    orientation_x = pose.orientation.x,
                    orientation_y = pose.orientation.y,
                    orientation_z = pose.orientation.z,
                    orientation_w = pose.orientation.w,
                );
            })
            .boxed())
    }
}
