mod move_base;
mod pose_source;

pub use move_base::*;
pub use pose_source::*;
