use std::sync::Once;
use std::time::{Duration, Instant};

use more_asserts as ma;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use pinger::{new_pinger, PingError, Pinger};

static SETUP: Once = Once::new();

fn setup() {
    SETUP.call_once(|| {
        let subscriber = FmtSubscriber::builder().with_max_level(Level::ERROR).finish();
        tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
    });
}

// 192.0.2.1 is TEST-NET-1 (RFC 5737), reserved for documentation. Nothing
// answers there.
const BLACKHOLE: &str = "192.0.2.1";

// Whichever transport can actually blackhole here: socket permitted and the
// probe goes out unanswered. None when no transport qualifies.
fn any_pinger() -> Option<Box<dyn Pinger>> {
    for network in ["udp-echo", "raw-echo"] {
        let mut pinger = new_pinger(network, "0.0.0.0").unwrap();
        pinger.set_timeout(Duration::from_millis(10));
        if matches!(pinger.ping(BLACKHOLE), Err(PingError::Timeout)) {
            pinger.reset_counter();
            return Some(pinger);
        }
    }
    eprintln!("skipping: no icmp socket type can reach a blackhole from here");
    None
}

#[test]
fn test_timeout_is_respected_on_a_blackholed_address() {
    setup();

    let Some(mut pinger) = any_pinger() else {
        return;
    };
    let timeout = Duration::from_millis(200);
    pinger.set_timeout(timeout);

    let before = Instant::now();
    let result = pinger.ping(BLACKHOLE);
    let elapsed = before.elapsed();

    assert!(matches!(result, Err(PingError::Timeout)));
    ma::assert_ge!(elapsed, timeout);
    ma::assert_lt!(elapsed, timeout + Duration::from_millis(500));
}

#[test]
fn test_transport_handle_is_not_leaked_across_calls() {
    setup();

    let Some(mut pinger) = any_pinger() else {
        return;
    };
    pinger.set_timeout(Duration::from_millis(100));

    // Every call opens and releases its own handle; repeated timeouts and a
    // second pinger on the same local address must keep working.
    for _ in 0..5 {
        assert!(matches!(pinger.ping(BLACKHOLE), Err(PingError::Timeout)));
    }

    let Some(mut second) = any_pinger() else {
        return;
    };
    second.set_timeout(Duration::from_millis(100));
    assert!(matches!(second.ping(BLACKHOLE), Err(PingError::Timeout)));
}
