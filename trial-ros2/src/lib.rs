//! [`trial_arci`] implementation using ROS2.
#![cfg(feature = "ros2")]
#![warn(missing_docs)]

mod cmd_vel_move_base;
mod node;
mod odom_pose_source;

pub use cmd_vel_move_base::*;
pub use node::*;
pub use odom_pose_source::*;
// re-export
pub use r2r;
