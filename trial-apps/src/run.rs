use std::{future::Future, sync::Arc};

use tracing::{error, info, warn};
use trial_arci::{BaseVelocity, MoveBase, PoseSource};
use trial_controller::{run_trial, TrialConfig, TrialController, TrialRecord, TrialSummary};
use trial_tracing::Tracing;

use crate::{BackendKind, Error, TrialAppConfig};

/// Runs `config.repeat` trials on the configured backend.
pub async fn run(config: &TrialAppConfig) -> Result<Vec<TrialSummary>, Error> {
    config.validate()?;
    let trial_config = config.trial_config()?;
    match config.backend {
        BackendKind::Sim => {
            let base = Arc::new(Tracing::new(trial_base::SimulatedBase::new(&config.sim)?));
            run_trials(config, trial_config, base.clone(), base).await
        }
        #[cfg(feature = "ros2")]
        BackendKind::Ros2 => {
            let ros2 = &config.ros2;
            let node = trial_ros2::Node::new(&ros2.node_name, &ros2.namespace)?;
            node.spawn_spinner(std::time::Duration::from_millis(10));
            let move_base = Arc::new(Tracing::new(trial_ros2::Ros2CmdVelMoveBase::new(
                node.clone(),
                &ros2.cmd_vel_topic,
            )?));
            let pose_source = Tracing::new(trial_ros2::Ros2OdomPoseSource::new(
                node,
                &ros2.odom_topic,
            ));
            run_trials(config, trial_config, move_base, pose_source).await
        }
        #[cfg(not(feature = "ros2"))]
        BackendKind::Ros2 => Err(Error::BackendUnavailable("ros2".into())),
    }
}

/// Runs trials one after another with a fresh record and controller each.
/// `move_base` is usually a shared handle such as `Arc`.
///
/// Ctrl-C stops the robot and aborts the remaining trials.
pub async fn run_trials<M, P>(
    config: &TrialAppConfig,
    trial_config: TrialConfig,
    move_base: M,
    pose_source: P,
) -> Result<Vec<TrialSummary>, Error>
where
    M: MoveBase + Clone,
    P: PoseSource,
{
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("received ctrl-c"),
            Err(e) => {
                warn!("failed to listen for ctrl-c: {e}");
                std::future::pending::<()>().await;
            }
        }
    };
    run_trials_until(config, trial_config, move_base, pose_source, ctrl_c).await
}

/// Same as [`run_trials`], interrupted when `interrupt` completes instead of
/// on Ctrl-C.
///
/// `interrupt` is polled during the trials and the pauses between them. On
/// interruption the robot is sent a zero velocity and
/// [`Error::Interrupted`] is returned.
pub async fn run_trials_until<M, P, F>(
    config: &TrialAppConfig,
    trial_config: TrialConfig,
    move_base: M,
    pose_source: P,
    interrupt: F,
) -> Result<Vec<TrialSummary>, Error>
where
    M: MoveBase + Clone,
    P: PoseSource,
    F: Future<Output = ()>,
{
    let options = config.run_options()?;
    let repeat_delay = config.repeat_delay()?;
    let output_dir = config.output_dir();
    let mut summaries = Vec::with_capacity(config.repeat as usize);
    tokio::pin!(interrupt);

    for i in 0..config.repeat {
        if i > 0 {
            tokio::select! {
                () = tokio::time::sleep(repeat_delay) => {}
                () = &mut interrupt => return Err(interrupted(&move_base)),
            }
        }
        let record = TrialRecord::create(
            &output_dir,
            trial_config.speed_state(),
            trial_config.trial_type(),
        )?
        .with_fsync_each_sample(config.fsync_each_sample);
        info!(
            "trial {}/{}: {}",
            i + 1,
            config.repeat,
            record.path().display()
        );
        let controller = TrialController::new(trial_config, move_base.clone(), record);
        let poses = pose_source.subscribe()?;

        let summary = tokio::select! {
            result = run_trial(controller, poses, &options) => result?,
            // The controller is dropped mid-trial.
            () = &mut interrupt => return Err(interrupted(&move_base)),
        };
        summaries.push(summary);
    }
    Ok(summaries)
}

fn interrupted<M: MoveBase>(move_base: &M) -> Error {
    if let Err(e) = move_base.send_velocity(&BaseVelocity::default()) {
        error!("failed to stop the robot: {e}");
    }
    Error::Interrupted
}
