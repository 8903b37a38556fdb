use std::net::IpAddr;
use std::sync::Once;
use std::time::Duration;

use more_asserts as ma;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use pinger::{DgramSocket, PingError, Pinger, Prober};

static SETUP: Once = Once::new();

fn setup() {
    SETUP.call_once(|| {
        let subscriber = FmtSubscriber::builder().with_max_level(Level::ERROR).finish();
        tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
    });
}

// Dgram ICMP sockets are gated by net.ipv4.ping_group_range; not every
// environment permits them.
fn permitted(result: &Result<pinger::Pong, PingError>) -> bool {
    if let Err(PingError::Open(e)) = result {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            eprintln!("skipping: dgram icmp sockets not permitted here");
            return false;
        }
    }
    true
}

#[test]
fn test_ping_to_localhost_with_dgram_socket() {
    setup();

    let mut prober = Prober::<DgramSocket>::new("0.0.0.0").unwrap();
    let result = prober.ping("127.0.0.1");
    if !permitted(&result) {
        return;
    }

    let pong = result.unwrap();
    assert_eq!(pong.peer, "127.0.0.1".parse::<IpAddr>().unwrap());
    assert_eq!(pong.sequence_number, 0);
    ma::assert_gt!(pong.size, 0);
    ma::assert_lt!(pong.rtt, Duration::from_secs(2));
}

#[test]
fn test_sequence_numbers_across_calls_with_dgram_socket() {
    setup();

    let mut prober = Prober::<DgramSocket>::new("0.0.0.0").unwrap();
    prober.set_timeout(Duration::from_secs(1));

    let frst = prober.ping("127.0.0.1");
    if !permitted(&frst) {
        return;
    }
    let scnd = prober.ping("127.0.0.1");

    assert_eq!(frst.unwrap().sequence_number, 0);
    assert_eq!(scnd.unwrap().sequence_number, 1);

    prober.reset_counter();
    let after_reset = prober.ping("127.0.0.1");
    assert_eq!(after_reset.unwrap().sequence_number, 0);
}

#[test]
fn test_ping_to_hostname_with_dgram_socket() {
    setup();

    let mut prober = Prober::<DgramSocket>::new("0.0.0.0").unwrap();
    let result = prober.ping("localhost");
    if !permitted(&result) {
        return;
    }

    let pong = result.unwrap();
    assert!(pong.peer.is_ipv4());
    ma::assert_gt!(pong.size, 0);
}
