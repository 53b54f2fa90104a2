use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("trial-base: Invalid pose rate {} Hz.", .0)]
    InvalidPoseRate(f64),
    #[error("trial-base: Invalid command timeout {} s.", .0)]
    InvalidCommandTimeout(f64),
}
