mod error;
mod odometry;
mod simulated_base;

pub use error::*;
pub use odometry::*;
pub use simulated_base::*;
