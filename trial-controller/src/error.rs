use std::{path::PathBuf, time::Duration};

use thiserror::Error;

use crate::SpeedState;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("trial-controller: Invalid speed state {} (expected 0 or 1).", .0)]
    InvalidSpeedState(u8),
    #[error("trial-controller: Invalid trial type {} (expected 1 to 5).", .0)]
    InvalidTrialType(u8),
    #[error(
        "trial-controller: Invalid speed for {:?}: linear={}, angular={} (must be finite and positive).",
        state,
        linear_speed,
        angular_speed
    )]
    InvalidSpeed {
        state: SpeedState,
        linear_speed: f64,
        angular_speed: f64,
    },
    #[error("trial-controller: Output record error ({}).", .0)]
    Record(#[from] std::io::Error),
    #[error("trial-controller: Sequence number of {:?} cannot be incremented.", .0)]
    SequenceNumberOverflow(PathBuf),
    #[error("trial-controller: Pose stream closed before the trial finished.")]
    PoseStreamClosed,
    #[error("trial-controller: No pose received within {:?}.", .0)]
    NoPoseReceived(Duration),
    #[error("trial-controller: trial-arci: {:?}", .0)]
    Arci(#[from] trial_arci::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
