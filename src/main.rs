//! TrigIO daemon entry point

use log::{error, info, warn};
use std::env;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::process;
use trigio::config::Config;
use trigio::drivers::DriverRegistry;
use trigio::protocol::MASK_QUIT;
use trigio::service::Service;

/// Let SIGINT/SIGTERM request the same clean cascade as a client shutdown
/// packet: a handler thread injects one into the service's own socket.
fn setup_signal_handler(service_addr: SocketAddr) {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let target = SocketAddr::new(Ipv4Addr::LOCALHOST.into(), service_addr.port());

    let spawned = std::thread::Builder::new()
        .name("signal-handler".to_string())
        .spawn(move || {
            let mut signals = match Signals::new([SIGINT, SIGTERM]) {
                Ok(signals) => signals,
                Err(e) => {
                    warn!("failed to register signal handlers: {}", e);
                    return;
                }
            };

            if let Some(sig) = signals.forever().next() {
                info!("received signal {}, requesting shutdown", sig);
                let shutdown = || -> std::io::Result<()> {
                    let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0))?;
                    socket.send_to(&[0x00, MASK_QUIT], target)?;
                    Ok(())
                };
                if let Err(e) = shutdown() {
                    error!("could not deliver the shutdown packet: {}", e);
                }
            }
        });

    if let Err(e) = spawned {
        warn!("failed to spawn the signal handler thread: {}", e);
    }
}

fn run() -> i32 {
    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "trigio".to_string());
    let config_path = match args.next() {
        Some(path) => path,
        None => {
            error!("usage: {} <config file path>", program);
            return 1;
        }
    };

    info!("config file --> {}", config_path);
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("failed to load config file: {}", e);
            return 1;
        }
    };

    let registry = DriverRegistry::with_builtins();

    let service = match Service::configure(&registry, &config) {
        Ok(service) => service,
        Err(e) => {
            error!("failed to set up the service: {}", e);
            return 1;
        }
    };

    match service.local_addr() {
        Ok(addr) => setup_signal_handler(addr),
        Err(e) => warn!("no signal handling, local address unknown: {}", e),
    }

    match service.run() {
        Ok(()) => 0,
        Err(e) => {
            error!("service error: {}", e);
            1
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    process::exit(run());
}
