use auto_impl::auto_impl;
use futures::stream::BoxStream;
use nalgebra::{Isometry2, Isometry3, UnitQuaternion};
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Orientation quaternion exactly as reported by the robot. It is not
/// renormalized.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Orientation {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }
}

/// One reported pose.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseSample {
    pub position: Position,
    pub orientation: Orientation,
}

impl PoseSample {
    pub fn new(position: Position, orientation: Orientation) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// `[x, y, z, x_rot, y_rot, z_rot, w_rot]`
    pub fn values(&self) -> [f64; 7] {
        [
            self.position.x,
            self.position.y,
            self.position.z,
            self.orientation.x,
            self.orientation.y,
            self.orientation.z,
            self.orientation.w,
        ]
    }
}

impl From<Isometry3<f64>> for PoseSample {
    fn from(pose: Isometry3<f64>) -> Self {
        let q = pose.rotation.quaternion();
        Self {
            position: Position {
                x: pose.translation.x,
                y: pose.translation.y,
                z: pose.translation.z,
            },
            orientation: Orientation {
                x: q.i,
                y: q.j,
                z: q.k,
                w: q.w,
            },
        }
    }
}

impl From<Isometry2<f64>> for PoseSample {
    fn from(pose: Isometry2<f64>) -> Self {
        let rotation = UnitQuaternion::from_euler_angles(0.0, 0.0, pose.rotation.angle());
        Isometry3::from_parts(
            nalgebra::Translation3::new(pose.translation.x, pose.translation.y, 0.0),
            rotation,
        )
        .into()
    }
}

/// Stream of pose samples in arrival order.
pub type PoseStream = BoxStream<'static, PoseSample>;

/// Source of pose telemetry.
///
/// The cadence is decided by the source. Consumers must not assume ordering
/// or delivery guarantees beyond "roughly periodic".
#[auto_impl(Box, Arc)]
pub trait PoseSource: Send + Sync {
    fn subscribe(&self) -> Result<PoseStream>;
}
