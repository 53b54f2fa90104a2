//! Abstract interface between a motion trial and the robot it drives.
//!
//! [`MoveBase`] accepts velocity commands and [`PoseSource`] delivers pose
//! telemetry. Transports implement these traits; the trial logic only ever
//! sees the traits.

mod clients;
mod error;
mod traits;

pub use clients::*;
pub use error::*;
pub use traits::*;

// re-export
pub use futures::stream::{BoxStream, StreamExt};
pub use nalgebra::{self, Isometry2, Isometry3};
