use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use parking_lot::{Mutex, MutexGuard};
use tracing::debug;

/// Handle to the ROS2 node shared by the command publisher and the odometry
/// subscriber of a trial. Cheap to clone.
#[derive(Clone)]
pub struct Node {
    node: Arc<Mutex<r2r::Node>>,
    spinner_started: Arc<AtomicBool>,
    name: Arc<str>,
}

impl Node {
    /// Creates the node `name` in `namespace` on a fresh `r2r::Context`.
    pub fn new(name: &str, namespace: &str) -> Result<Self, trial_arci::Error> {
        let ctx = r2r::Context::create().map_err(anyhow::Error::from)?;
        let node = r2r::Node::create(ctx, name, namespace).map_err(anyhow::Error::from)?;
        debug!(name, namespace, "created ros2 node");
        Ok(Self {
            node: Arc::new(Mutex::new(node)),
            spinner_started: Arc::new(AtomicBool::new(false)),
            name: name.into(),
        })
    }

    /// Locks the underlying `r2r::Node` to create publishers and
    /// subscriptions.
    pub fn r2r(&self) -> MutexGuard<'_, r2r::Node> {
        self.node.lock()
    }

    /// Spawns a task processing callbacks every `period`. Only the first call
    /// spawns; the task ends once it holds the last handle to the node.
    pub fn spawn_spinner(&self, period: Duration) {
        if self.spinner_started.swap(true, Ordering::Relaxed) {
            return;
        }
        debug!(name = &*self.name, ?period, "spinning ros2 node");
        let node = self.clone();
        tokio::spawn(async move {
            while Arc::strong_count(&node.node) > 1 {
                node.spin_once(period).await;
            }
            debug!(name = &*node.name, "ros2 node spinner stopped");
        });
    }

    /// Processes pending callbacks without blocking, then sleeps for the rest
    /// of `period`. The lock is not held while sleeping.
    pub async fn spin_once(&self, period: Duration) {
        let started = std::time::Instant::now();
        self.r2r().spin_once(Duration::ZERO);
        tokio::time::sleep(period.saturating_sub(started.elapsed())).await;
    }
}
