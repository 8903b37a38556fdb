use std::io;
use std::time::Duration;

use pinger::{new_pinger, PingError, Pinger};

#[derive(argh::FromArgs)]
/// ping - send ICMP ECHO_REQUEST to a remote host, once per second
struct Args {
    #[argh(positional)]
    /// remote host address
    host: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::WARN)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let args: Args = argh::from_env();

    let mut pinger = new_pinger("raw-echo", "0.0.0.0")?;
    let mut raw = true;

    loop {
        std::thread::sleep(Duration::from_secs(1));
        match pinger.ping(&args.host) {
            Ok(pong) => println!(
                "{} Bytes from {}: icmp_seq={} time={:.6}",
                pong.size,
                pong.peer,
                pong.sequence_number,
                pong.rtt.as_secs_f64()
            ),
            // Raw sockets need CAP_NET_RAW; retry unprivileged over dgram.
            Err(PingError::Open(e)) if raw && e.kind() == io::ErrorKind::PermissionDenied => {
                eprintln!("raw socket not permitted, falling back to udp-echo");
                pinger = new_pinger("udp-echo", "0.0.0.0")?;
                raw = false;
            }
            Err(e) => eprintln!("{e}"),
        }
    }
}
