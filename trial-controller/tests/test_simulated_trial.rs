use std::time::Duration;

use trial_arci::{MoveBase, PoseSource};
use trial_base::{SimulatedBase, SimulatedBaseConfig};
use trial_controller::*;

fn read_lines(path: &std::path::Path) -> Vec<String> {
    fs_err::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_owned)
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_full_turn_on_simulated_base() {
    let dir = tempfile::tempdir().unwrap();
    let base = SimulatedBase::new(&SimulatedBaseConfig::default()).unwrap();
    let config = TrialConfig::new(1, 5, SpeedTable::default()).unwrap();
    let controller = TrialController::create(config, base.clone(), dir.path()).unwrap();
    assert!(controller
        .record_path()
        .ends_with("speed_1_trial_5_num_0.txt"));

    let summary = run_trial(controller, base.subscribe().unwrap(), &RunOptions::default())
        .await
        .unwrap();

    assert!(summary.completed);
    let profile = summary.profile.unwrap();
    assert!((profile.expected_duration_secs() - 3.0).abs() < 1e-6);
    let elapsed = summary.elapsed.unwrap();
    // the first pose past 3 s at 30 Hz
    assert!(elapsed > Duration::from_secs(3), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(3040), "{elapsed:?}");
    assert!((91..=93).contains(&summary.samples), "{}", summary.samples);
    assert!(base.current_velocity().unwrap().is_zero());

    let lines = read_lines(&summary.path);
    assert_eq!(lines[0], RECORD_HEADER);
    assert_eq!(lines.len(), summary.samples + 1);
    for line in &lines[1..] {
        assert_eq!(line.split(' ').count(), 7, "{line}");
    }
    // identity pose before any motion
    assert_eq!(lines[1], "0.0 0.0 0.0 0.0 0.0 0.0 1.0");
}

#[tokio::test(start_paused = true)]
async fn test_sequence_numbers_across_trials() {
    let dir = tempfile::tempdir().unwrap();
    let base = SimulatedBase::new(&SimulatedBaseConfig::default()).unwrap();
    let config = TrialConfig::new(0, 3, SpeedTable::default()).unwrap();

    for expected in 0..3 {
        let controller = TrialController::create(config, base.clone(), dir.path()).unwrap();
        let summary = run_trial(controller, base.subscribe().unwrap(), &RunOptions::default())
            .await
            .unwrap();
        assert_eq!(summary.sequence_number, expected);
        assert!(summary.completed);
    }
    // a foreign pair does not shift the numbering
    fs_err::write(dir.path().join("speed_1_trial_3_num_7.txt"), "").unwrap();
    assert_eq!(
        next_sequence_number(dir.path(), SpeedState::Slow, TrialType::RotateTenDegrees).unwrap(),
        3
    );
}

#[tokio::test(start_paused = true)]
async fn test_straight_line_distance() {
    let dir = tempfile::tempdir().unwrap();
    let base = SimulatedBase::new(&SimulatedBaseConfig {
        pose_rate_hz: 50.0,
        ..Default::default()
    })
    .unwrap();
    // 1 m at 0.15 m/s
    let config = TrialConfig::new(1, 1, SpeedTable::default()).unwrap();
    let controller = TrialController::create(config, base.clone(), dir.path()).unwrap();
    let summary = run_trial(controller, base.subscribe().unwrap(), &RunOptions::default())
        .await
        .unwrap();
    assert!(summary.completed);

    let pose = base.current_pose();
    // open loop overshoot is bounded by one pose period
    assert!(pose.translation.x > 1.0, "{}", pose.translation.x);
    assert!(pose.translation.x < 1.0 + 0.15 * 0.02 + 1e-6, "{}", pose.translation.x);
    assert!(pose.translation.y.abs() < 1e-9);
}
