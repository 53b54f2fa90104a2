use parking_lot::Mutex;
use r2r::{geometry_msgs::msg::Twist, QosProfile};
use tracing::debug;
use trial_arci::{BaseVelocity, Error, MoveBase};

use crate::Node;

/// `trial_arci::MoveBase` publishing geometry_msgs/Twist.
pub struct Ros2CmdVelMoveBase {
    vel_publisher: Mutex<r2r::Publisher<Twist>>,
    last_velocity: Mutex<BaseVelocity>,
    // keep not to be dropped
    _node: Node,
}

impl Ros2CmdVelMoveBase {
    /// Creates a new `Ros2CmdVelMoveBase` from geometry_msgs/Twist topic name.
    pub fn new(node: Node, cmd_topic_name: &str) -> Result<Self, Error> {
        let vel_publisher = node
            .r2r()
            .create_publisher(cmd_topic_name, QosProfile::default().keep_last(10))
            .map_err(anyhow::Error::from)?;
        debug!("publishing geometry_msgs/Twist on {cmd_topic_name}");
        Ok(Self {
            vel_publisher: Mutex::new(vel_publisher),
            last_velocity: Mutex::new(BaseVelocity::default()),
            _node: node,
        })
    }
}

impl MoveBase for Ros2CmdVelMoveBase {
    fn send_velocity(&self, velocity: &BaseVelocity) -> Result<(), Error> {
        let mut twist_msg = Twist::default();
        twist_msg.linear.x = velocity.x;
        twist_msg.linear.y = velocity.y;
        twist_msg.angular.z = velocity.theta;
        self.vel_publisher
            .lock()
            .publish(&twist_msg)
            .map_err(|e| Error::Connection {
                message: format!("r2r publish error: {e:?}"),
            })?;
        debug!(x = velocity.x, y = velocity.y, theta = velocity.theta, "published cmd_vel");
        *self.last_velocity.lock() = *velocity;
        Ok(())
    }

    /// Last velocity handed to the publisher; there is no feedback on
    /// `cmd_vel`.
    fn current_velocity(&self) -> Result<BaseVelocity, Error> {
        Ok(*self.last_velocity.lock())
    }
}
