use futures::StreamExt;
use r2r::{nav_msgs::msg::Odometry, QosProfile};
use tracing::debug;
use trial_arci::{Orientation, PoseSample, PoseSource, PoseStream, Position, Result};

use crate::Node;

/// `trial_arci::PoseSource` subscribing nav_msgs/Odometry.
///
/// The subscription is best-effort, as odometry from a mobile base usually
/// is; lost messages are simply not recorded.
pub struct Ros2OdomPoseSource {
    odom_topic_name: String,
    node: Node,
}

impl Ros2OdomPoseSource {
    /// Creates a new `Ros2OdomPoseSource` from nav_msgs/Odometry topic name.
    pub fn new(node: Node, odom_topic_name: &str) -> Self {
        Self {
            odom_topic_name: odom_topic_name.to_owned(),
            node,
        }
    }
}

/// Converts the pose part of an odometry message without renormalizing.
pub fn odometry_to_pose_sample(msg: &Odometry) -> PoseSample {
    let pose = &msg.pose.pose;
    PoseSample {
        position: Position {
            x: pose.position.x,
            y: pose.position.y,
            z: pose.position.z,
        },
        orientation: Orientation {
            x: pose.orientation.x,
            y: pose.orientation.y,
            z: pose.orientation.z,
            w: pose.orientation.w,
        },
    }
}

impl PoseSource for Ros2OdomPoseSource {
    fn subscribe(&self) -> Result<PoseStream> {
        let subscriber = self
            .node
            .r2r()
            .subscribe::<Odometry>(
                &self.odom_topic_name,
                QosProfile::default().best_effort().keep_last(10),
            )
            .map_err(|e| trial_arci::Error::Connection {
                message: format!("failed to subscribe {}: {e:?}", self.odom_topic_name),
            })?;
        debug!("subscribed nav_msgs/Odometry on {}", self.odom_topic_name);
        Ok(subscriber
            .map(|msg| odometry_to_pose_sample(&msg))
            .boxed())
    }
}
