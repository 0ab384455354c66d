//! Integration tests for full housekeeping cycles

mod common;

use common::{gps_fix, mock_platform, test_config, Event, MockOptions};
use std::sync::Arc;
use tallykeeper_domain::{
    DetectionSource, LogicalChannel, PrivacySalt, RuntimeMode, TaskId, TimeSource,
};
use tallykeeper_housekeeper::{
    HealthState, Housekeeper, HousekeeperConfig, SyncOutcome, WatchdogOutcome,
};

const HOUR_MS: u32 = 3_600_000;

fn housekeeper_with(
    config: HousekeeperConfig,
    options: MockOptions,
) -> (Housekeeper, common::Handles, Arc<HealthState>) {
    let state = Arc::new(HealthState::new(PrivacySalt(0xAAAA)));
    let (platform, handles) = mock_platform(options);
    let housekeeper = Housekeeper::new(config, Arc::clone(&state), platform).unwrap();
    (housekeeper, handles, state)
}

fn seed_detections(state: &HealthState) {
    state.record_detection(1, DetectionSource::Wifi);
    state.record_detection(2, DetectionSource::Wifi);
    state.record_detection(3, DetectionSource::Ble);
}

#[test]
fn test_healthy_cycle_runs_steps_in_order() {
    let options = MockOptions {
        sensor: true,
        battery_mv: Some(3_950),
        ..Default::default()
    };
    let (mut housekeeper, handles, state) = housekeeper_with(test_config(), options);
    handles.set_clock(1_000);

    let report = housekeeper.run_cycle();

    assert_eq!(
        handles.recorder.events(),
        vec![
            Event::Peripherals,
            Event::TransportHousekeeping,
            Event::NetworkRequest,
            Event::Sensor,
            Event::Stack(TaskId::WifiSwitch),
            Event::Stack(TaskId::IrqHandler),
            Event::Battery,
        ]
    );
    assert_eq!(report.uptime_ms, 1_000);
    assert!(!report.restarted);
    assert_eq!(report.sync, Some(SyncOutcome::NetworkRequested));
    assert_eq!(report.battery_mv, Some(3_950));
    assert_eq!(report.watchdog, Some(WatchdogOutcome::Healthy));
    assert_eq!(state.uptime_ms(), 1_000);
    assert_eq!(state.battery_millivolts(), Some(3_950));
}

#[test]
fn test_every_monitored_task_is_queried_once() {
    let config = HousekeeperConfig {
        monitored_tasks: HousekeeperConfig::diagnostic().monitored_tasks,
        ..test_config()
    };
    let options = MockOptions {
        sensor: true,
        battery_mv: Some(4_000),
        ..Default::default()
    };
    let (mut housekeeper, handles, _) = housekeeper_with(config, options);

    housekeeper.run_cycle();

    let events = handles.recorder.events();
    let stacks: Vec<Event> = events
        .iter()
        .filter(|e| matches!(e, Event::Stack(_)))
        .cloned()
        .collect();
    assert_eq!(
        stacks,
        vec![
            Event::Stack(TaskId::WifiSwitch),
            Event::Stack(TaskId::IrqHandler),
            Event::Stack(TaskId::Gps),
            Event::Stack(TaskId::Led),
        ]
    );

    let sensor = events.iter().position(|e| *e == Event::Sensor).unwrap();
    let first_stack = events.iter().position(|e| matches!(e, Event::Stack(_))).unwrap();
    let last_stack = events.iter().rposition(|e| matches!(e, Event::Stack(_))).unwrap();
    let battery = events.iter().position(|e| *e == Event::Battery).unwrap();
    assert!(sensor < first_stack);
    assert!(last_stack < battery);
}

#[test]
fn test_no_monitored_tasks_queries_nothing() {
    let config = HousekeeperConfig {
        monitored_tasks: Vec::new(),
        ..test_config()
    };
    let (mut housekeeper, handles, _) = housekeeper_with(config, MockOptions::default());

    housekeeper.run_cycle();

    assert_eq!(handles.recorder.count(|e| matches!(e, Event::Stack(_))), 0);
}

#[test]
fn test_forced_restart_ends_cycle() {
    let options = MockOptions {
        sensor: true,
        battery_mv: Some(3_950),
        ..Default::default()
    };
    let (mut housekeeper, handles, state) = housekeeper_with(test_config(), options);
    handles.set_clock(500);
    state.set_mode(RuntimeMode::ForcedRestart);

    let report = housekeeper.run_cycle();

    assert_eq!(handles.recorder.events(), vec![Event::Restart]);
    assert!(report.restarted);
    assert_eq!(report.uptime_ms, 500);
    assert_eq!(report.sync, None);
    assert_eq!(report.watchdog, None);
    assert_eq!(housekeeper.metrics().restarts, 1);
}

#[test]
fn test_low_memory_recovers_without_restart() {
    let (mut housekeeper, handles, state) = housekeeper_with(test_config(), MockOptions::default());
    seed_detections(&state);
    handles.set_min_free_heap(5_000);
    handles.set_heap_after_reset(15_000);

    let report = housekeeper.run_cycle();

    let flushes: Vec<Event> = handles
        .recorder
        .events()
        .into_iter()
        .filter(|e| matches!(e, Event::Flush(..)))
        .collect();
    assert_eq!(flushes.len(), 1);
    match &flushes[0] {
        Event::Flush(channel, snapshot) => {
            assert_eq!(*channel, LogicalChannel::COUNTERS);
            assert_eq!(snapshot.wifi, 2);
            assert_eq!(snapshot.ble, 1);
            assert_eq!(snapshot.total, 3);
        }
        other => panic!("unexpected event {:?}", other),
    }

    assert!(state.counters().is_empty());
    assert_eq!(state.snapshot().total, 0);
    assert_ne!(state.salt(), PrivacySalt(0xAAAA));
    assert_eq!(handles.recorder.count(|e| *e == Event::Restart), 0);
    assert_eq!(report.watchdog, Some(WatchdogOutcome::Recovered));
    assert!(!report.restarted);
}

#[test]
fn test_persistent_low_memory_restarts_once() {
    let (mut housekeeper, handles, state) = housekeeper_with(test_config(), MockOptions::default());
    seed_detections(&state);
    handles.set_min_free_heap(5_000);
    handles.set_heap_after_reset(5_000);

    let report = housekeeper.run_cycle();

    assert_eq!(handles.recorder.count(|e| matches!(e, Event::Flush(..))), 1);
    assert_eq!(handles.recorder.count(|e| *e == Event::Salt), 1);
    assert_eq!(handles.recorder.count(|e| *e == Event::Restart), 1);
    assert_eq!(report.watchdog, Some(WatchdogOutcome::Restarted));
    assert!(report.restarted);

    let metrics = housekeeper.metrics();
    assert_eq!(metrics.low_memory_events, 1);
    assert_eq!(metrics.flushes, 1);
    assert_eq!(metrics.counter_resets, 1);
    assert_eq!(metrics.restarts, 1);
}

#[test]
fn test_recovery_order_is_flush_reset_restart() {
    let (mut housekeeper, handles, state) = housekeeper_with(test_config(), MockOptions::default());
    seed_detections(&state);
    handles.set_min_free_heap(2_000);

    housekeeper.run_cycle();

    let tail: Vec<Event> = handles
        .recorder
        .events()
        .into_iter()
        .skip_while(|e| !matches!(e, Event::Flush(..)))
        .collect();
    assert_eq!(tail.len(), 3);
    assert!(matches!(tail[0], Event::Flush(..)));
    assert_eq!(tail[1], Event::Salt);
    assert_eq!(tail[2], Event::Restart);
}

#[test]
fn test_memory_above_threshold_does_nothing() {
    let (mut housekeeper, handles, state) = housekeeper_with(test_config(), MockOptions::default());
    seed_detections(&state);
    handles.set_min_free_heap(10_001);

    housekeeper.run_cycle();

    assert_eq!(handles.recorder.count(|e| matches!(e, Event::Flush(..))), 0);
    assert_eq!(handles.recorder.count(|e| *e == Event::Salt), 0);
    assert_eq!(handles.recorder.count(|e| *e == Event::Restart), 0);
    assert_eq!(state.snapshot().total, 3);
    assert_eq!(state.salt(), PrivacySalt(0xAAAA));
}

#[test]
fn test_time_sync_disabled() {
    let config = HousekeeperConfig {
        time_sync_interval_minutes: None,
        ..test_config()
    };
    let (mut housekeeper, handles, _) = housekeeper_with(config, MockOptions::default());

    let report = housekeeper.run_cycle();

    assert_eq!(report.sync, None);
    assert_eq!(housekeeper.next_sync_deadline(), None);
    assert_eq!(handles.recorder.count(|e| *e == Event::NetworkRequest), 0);
}

#[test]
fn test_gps_fix_sets_clock_without_network_request() {
    let options = MockOptions {
        gps: true,
        ..Default::default()
    };
    let (mut housekeeper, handles, state) = housekeeper_with(test_config(), options);
    handles.set_gps_fix(Some(gps_fix()));

    let report = housekeeper.run_cycle();

    assert_eq!(report.sync, Some(SyncOutcome::Gps(1_710_505_845)));
    assert_eq!(state.utc_time(), Some(1_710_505_845));
    assert_eq!(handles.recorder.count(|e| *e == Event::NetworkRequest), 0);
    assert_eq!(housekeeper.metrics().time_syncs.get(&TimeSource::Gps), Some(&1));
}

#[test]
fn test_gps_without_fix_requests_network_time() {
    let options = MockOptions {
        gps: true,
        ..Default::default()
    };
    let (mut housekeeper, handles, state) = housekeeper_with(test_config(), options);

    let report = housekeeper.run_cycle();

    assert_eq!(report.sync, Some(SyncOutcome::NetworkRequested));
    assert_eq!(state.utc_time(), None);
    assert_eq!(handles.recorder.count(|e| *e == Event::NetworkRequest), 1);
}

#[test]
fn test_network_answer_applied_next_cycle() {
    let (mut housekeeper, handles, state) = housekeeper_with(test_config(), MockOptions::default());
    handles.set_clock(0);
    housekeeper.run_cycle();

    handles.answer_network_time(1_700_000_000);
    assert_eq!(state.utc_time(), None);

    handles.set_clock(30_000);
    let report = housekeeper.run_cycle();

    assert_eq!(report.network_time, Some(1_700_000_000));
    assert_eq!(report.sync, Some(SyncOutcome::NotDue));
    assert_eq!(state.utc_time(), Some(1_700_000_000));
    assert_eq!(
        housekeeper.metrics().time_syncs.get(&TimeSource::Network),
        Some(&1)
    );
    assert_eq!(housekeeper.metrics().network_requests, 1);
}

#[test]
fn test_sync_repeats_after_interval() {
    let (mut housekeeper, handles, _) = housekeeper_with(test_config(), MockOptions::default());

    handles.set_clock(0);
    housekeeper.run_cycle();
    assert_eq!(housekeeper.next_sync_deadline(), Some(u64::from(HOUR_MS)));

    handles.set_clock(HOUR_MS - 1);
    assert_eq!(housekeeper.run_cycle().sync, Some(SyncOutcome::NotDue));

    handles.set_clock(HOUR_MS);
    assert_eq!(
        housekeeper.run_cycle().sync,
        Some(SyncOutcome::NetworkRequested)
    );
    assert_eq!(housekeeper.next_sync_deadline(), Some(2 * u64::from(HOUR_MS)));
    assert_eq!(handles.recorder.count(|e| *e == Event::NetworkRequest), 2);
}

#[test]
fn test_uptime_survives_clock_wrap() {
    let (mut housekeeper, handles, state) = housekeeper_with(test_config(), MockOptions::default());

    handles.set_clock(u32::MAX - 100);
    let before = housekeeper.run_cycle().uptime_ms;

    handles.set_clock(50);
    let after = housekeeper.run_cycle().uptime_ms;

    assert_eq!(before, u64::from(u32::MAX - 100));
    assert_eq!(after, (1u64 << 32) + 50);
    assert_eq!(state.uptime_ms(), after);
}

#[test]
fn test_disabled_steps_are_skipped() {
    let config = HousekeeperConfig {
        read_environment: false,
        probe_battery: false,
        ..test_config()
    };
    let options = MockOptions {
        sensor: true,
        battery_mv: Some(4_100),
        ..Default::default()
    };
    let (mut housekeeper, handles, state) = housekeeper_with(config, options);

    let report = housekeeper.run_cycle();

    assert_eq!(handles.recorder.count(|e| *e == Event::Sensor), 0);
    assert_eq!(handles.recorder.count(|e| *e == Event::Battery), 0);
    assert_eq!(report.battery_mv, None);
    assert_eq!(state.battery_millivolts(), None);
}

#[test]
fn test_absent_capabilities_are_skipped() {
    let (mut housekeeper, handles, _) = housekeeper_with(test_config(), MockOptions::default());

    let report = housekeeper.run_cycle();

    assert_eq!(handles.recorder.count(|e| *e == Event::Sensor), 0);
    assert_eq!(handles.recorder.count(|e| *e == Event::Battery), 0);
    assert_eq!(report.battery_mv, None);
}

#[test]
fn test_invalid_config_is_rejected() {
    let state = Arc::new(HealthState::default());
    let (platform, _) = mock_platform(MockOptions::default());
    let config = HousekeeperConfig {
        monitored_tasks: vec!["display".to_string()],
        ..test_config()
    };

    assert!(Housekeeper::new(config, state, platform).is_err());
}
