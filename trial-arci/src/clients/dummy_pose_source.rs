use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::{
    error::Result,
    traits::{PoseSample, PoseSource, PoseStream},
};

/// Dummy PoseSource for debug or tests.
///
/// Every subscription replays the same samples. With an interval set, the
/// first sample is delivered immediately and each following one after
/// sleeping for the interval.
#[derive(Clone, Debug, Default)]
pub struct DummyPoseSource {
    pub samples: Vec<PoseSample>,
    pub interval: Option<Duration>,
}

impl DummyPoseSource {
    pub fn new(samples: Vec<PoseSample>) -> Self {
        Self {
            samples,
            interval: None,
        }
    }

    pub fn with_interval(samples: Vec<PoseSample>, interval: Duration) -> Self {
        Self {
            samples,
            interval: Some(interval),
        }
    }
}

impl PoseSource for DummyPoseSource {
    fn subscribe(&self) -> Result<PoseStream> {
        let samples = self.samples.clone().into_iter().enumerate();
        Ok(match self.interval {
            None => stream::iter(samples.map(|(_, sample)| sample)).boxed(),
            Some(interval) => stream::iter(samples)
                .then(move |(i, sample)| async move {
                    if i > 0 {
                        tokio::time::sleep(interval).await;
                    }
                    sample
                })
                .boxed(),
        })
    }
}
