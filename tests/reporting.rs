//! Integration tests for windowed topology reporting.
//!
//! These tests verify the reporter schedule, the topology log format, file
//! destinations, and the setup-fault policy.

use linkscope::{
    Address, AddressRegistry, CorrelatorConfig, CorrelatorConfigBuilder, Direction, LogVocabulary,
    RawPacketEvent, SetupError, TraceCorrelator,
};

// ============================================================================
// Helpers
// ============================================================================

fn addr(last: u8) -> Address {
    Address::from([10, 0, 0, last])
}

fn registry(nodes: u32) -> AddressRegistry {
    AddressRegistry::from_assignments((0..nodes).map(|i| (addr(i as u8 + 1), i))).unwrap()
}

/// An outbound data observation from `node` to the node owning `peer`.
fn tx_data(time: f64, node: u32, peer: Address) -> RawPacketEvent {
    RawPacketEvent::endpoints(
        time,
        node,
        Direction::Outbound,
        addr(node as u8 + 1),
        peer,
        512,
        false,
    )
}

fn topology_lines(correlator: &TraceCorrelator<Vec<u8>, Vec<u8>>) -> Vec<String> {
    String::from_utf8(correlator.topology_log().clone())
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Report content
// ============================================================================

#[test]
fn scenario_b_untouched_window_reports_none() {
    let mut correlator = TraceCorrelator::new(
        CorrelatorConfig::default(),
        registry(8),
        Vec::new(),
        Vec::new(),
    )
    .unwrap();

    correlator.report_window(5);

    assert_eq!(topology_lines(&correlator), vec!["50-60s: none"]);
}

#[test]
fn full_run_reports_windows_in_increasing_order() {
    let mut correlator = TraceCorrelator::new(
        CorrelatorConfig::default(),
        registry(8),
        Vec::new(),
        Vec::new(),
    )
    .unwrap();

    // Traffic in windows 0, 2, and 9; everything else stays quiet.
    let events = [
        tx_data(2.0, 1, addr(5)),
        tx_data(7.0, 4, addr(2)),
        tx_data(23.0, 0, addr(3)),
        tx_data(24.0, 2, addr(6)),
        tx_data(95.0, 6, addr(8)),
    ];

    // The engine interleaves packet callbacks and reporter firings in time
    // order; with all events before 100s and firings at 10s, 20s, ... the
    // interleaving below is equivalent.
    let schedule = correlator.reporter_schedule();
    let mut remaining = events.iter().peekable();
    for (fire_time, index) in schedule {
        while let Some(event) = remaining.peek() {
            if event.time < fire_time {
                correlator.handle_packet(event);
                remaining.next();
            } else {
                break;
            }
        }
        correlator.report_window(index);
    }

    assert_eq!(
        topology_lines(&correlator),
        vec![
            "0-10s: Node1-Node4",
            "10-20s: none",
            "20-30s: Node0-Node2, Node2-Node5",
            "30-40s: none",
            "40-50s: none",
            "50-60s: none",
            "60-70s: none",
            "70-80s: none",
            "80-90s: none",
            "90-100s: Node6-Node7",
        ]
    );
    assert_eq!(correlator.stats().windows_reported, 10);
}

#[test]
fn report_reflects_only_its_own_window() {
    let mut correlator = TraceCorrelator::new(
        CorrelatorConfig::default(),
        registry(8),
        Vec::new(),
        Vec::new(),
    )
    .unwrap();

    correlator.handle_packet(&tx_data(2.0, 1, addr(5)));
    correlator.report_window(0);
    // Same pair again, next window: the earlier report must not bleed in.
    correlator.handle_packet(&tx_data(12.0, 1, addr(5)));
    correlator.report_window(1);

    assert_eq!(
        topology_lines(&correlator),
        vec!["0-10s: Node1-Node4", "10-20s: Node1-Node4"]
    );
}

#[test]
fn custom_window_length_shapes_bounds_and_schedule() {
    let config = CorrelatorConfigBuilder::new()
        .window_length_secs(5.0)
        .window_count(4)
        .build()
        .unwrap();
    let mut correlator =
        TraceCorrelator::new(config, registry(4), Vec::new(), Vec::new()).unwrap();

    assert_eq!(
        correlator.reporter_schedule(),
        vec![(5.0, 0), (10.0, 1), (15.0, 2), (20.0, 3)]
    );

    correlator.handle_packet(&tx_data(6.0, 0, addr(2)));
    correlator.report_window(1);

    assert_eq!(topology_lines(&correlator), vec!["5-10s: Node0-Node1"]);
}

#[test]
fn compact_vocabulary_changes_transmission_labels_only() {
    let config = CorrelatorConfigBuilder::new()
        .vocabulary(LogVocabulary::Compact)
        .build()
        .unwrap();
    let mut correlator =
        TraceCorrelator::new(config, registry(4), Vec::new(), Vec::new()).unwrap();

    correlator.handle_packet(&tx_data(1.0, 0, addr(2)));
    correlator.handle_packet(&RawPacketEvent::endpoints(
        1.5,
        0,
        Direction::Inbound,
        addr(2),
        addr(1),
        0,
        true,
    ));
    correlator.report_window(0);

    let transmissions = String::from_utf8(correlator.transmission_log().clone()).unwrap();
    assert_eq!(
        transmissions.lines().collect::<Vec<_>>(),
        vec!["1.000s Node0 DATA", "1.500s Node0 ACK_RECEIVED"]
    );
    assert_eq!(topology_lines(&correlator), vec!["0-10s: Node0-Node1"]);
}

// ============================================================================
// File destinations and setup faults
// ============================================================================

#[test]
fn file_destinations_receive_both_logs() {
    let dir = std::env::temp_dir().join("linkscope-reporting-test");
    std::fs::create_dir_all(&dir).unwrap();
    let transmission_path = dir.join("node-transmissions.txt");
    let topology_path = dir.join("topology-changes.txt");

    let mut correlator = TraceCorrelator::open(
        CorrelatorConfig::default(),
        registry(8),
        &transmission_path,
        &topology_path,
    )
    .unwrap();

    correlator.handle_packet(&tx_data(2.0, 1, addr(5)));
    correlator.report_window(0);
    correlator.flush().unwrap();

    let transmissions = std::fs::read_to_string(&transmission_path).unwrap();
    let topology = std::fs::read_to_string(&topology_path).unwrap();
    assert_eq!(transmissions, "2.000s Node1 Tx Data\n");
    assert_eq!(topology, "0-10s: Node1-Node4\n");

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn unopenable_destination_aborts_startup() {
    let result = TraceCorrelator::open(
        CorrelatorConfig::default(),
        registry(2),
        "/linkscope-no-such-dir/transmissions.txt",
        "/linkscope-no-such-dir/topology.txt",
    );

    assert!(matches!(result, Err(SetupError::Io(_))));
}

#[test]
fn conflicting_address_assignment_aborts_startup() {
    let result = AddressRegistry::from_assignments([(addr(1), 0), (addr(2), 1), (addr(1), 2)]);

    assert!(result.is_err());
}
