//! Replays a canned packet-event stream through the correlator.
//!
//! This is the "driver" role the library leaves to the surrounding code: it
//! owns the correlator context, feeds it packet observations in time order,
//! fires the scheduled topology reports, and prints both logs.
//!
//! Run with: `cargo run --example replay`

use linkscope::{
    Address, AddressRegistry, CorrelatorConfigBuilder, Direction, RawPacketEvent, TraceCorrelator,
};

fn addr(last: u8) -> Address {
    Address::from([10, 0, 0, last])
}

/// Builds a minimal IPv4+TCP packet buffer.
fn tcp_packet(source: Address, destination: Address, payload_len: usize, ack: bool) -> Vec<u8> {
    let mut buf = vec![0u8; 40 + payload_len];
    buf[0] = 0x45;
    buf[9] = 6;
    buf[12..16].copy_from_slice(&source.raw().to_be_bytes());
    buf[16..20].copy_from_slice(&destination.raw().to_be_bytes());
    buf[32] = 0x50;
    if ack {
        buf[33] = 0x10;
    }
    buf
}

fn tx(time: f64, node: u32, peer: u32, payload: usize, ack: bool) -> RawPacketEvent {
    let buffer = tcp_packet(addr(node as u8 + 1), addr(peer as u8 + 1), payload, ack);
    RawPacketEvent::headers(time, node, Direction::Outbound, buffer)
}

fn rx(time: f64, node: u32, source: u32, payload: usize, ack: bool) -> RawPacketEvent {
    let buffer = tcp_packet(addr(source as u8 + 1), addr(node as u8 + 1), payload, ack);
    RawPacketEvent::headers(time, node, Direction::Inbound, buffer)
}

fn main() {
    let config = CorrelatorConfigBuilder::new()
        .window_length_secs(10.0)
        .window_count(5)
        .build()
        .expect("invalid configuration");
    linkscope::init_logging(&config.log_level);

    // Six nodes, addresses assigned 10.0.0.1 .. 10.0.0.6 by the "engine".
    let registry = AddressRegistry::from_assignments((0..6).map(|i| (addr(i as u8 + 1), i)))
        .expect("conflicting address assignment");

    let mut correlator: TraceCorrelator<Vec<u8>, Vec<u8>> =
        TraceCorrelator::new(config, registry, Vec::new(), Vec::new())
            .expect("correlator setup failed");

    // A canned stream, in non-decreasing time order: TCP sessions between a
    // few node pairs, a handshake that classification drops, and one packet
    // addressed outside the registry.
    let events = vec![
        tx(1.2, 0, 3, 0, false), // SYN, discarded
        tx(1.3, 0, 3, 512, true),
        rx(1.4, 3, 0, 512, true),
        tx(1.5, 3, 0, 0, true), // pure ack back
        tx(8.9, 2, 5, 512, true),
        tx(14.0, 1, 4, 512, true),
        rx(14.1, 4, 1, 512, true),
        RawPacketEvent::headers(
            // Destination 10.0.0.99 is not in the registry: logged, no link.
            22.5,
            2,
            Direction::Outbound,
            tcp_packet(addr(3), addr(99), 512, true),
        ),
        tx(31.0, 4, 5, 512, true),
        tx(36.5, 5, 4, 512, true),
    ];

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

    println!("--- transmission log ---");
    print!("{}", String::from_utf8_lossy(correlator.transmission_log()));
    println!("--- topology log ---");
    print!("{}", String::from_utf8_lossy(correlator.topology_log()));
    println!("--- stats ---");
    println!("{}", correlator.export_stats());
}
