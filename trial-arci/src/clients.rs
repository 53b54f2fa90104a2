mod dummy_move_base;
mod dummy_pose_source;

pub use dummy_move_base::*;
pub use dummy_pose_source::*;
