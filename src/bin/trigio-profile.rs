//! Direct driver latency profiler
//!
//! Bypasses the network pipeline entirely: builds the configured output
//! driver and toggles the event bit for a fixed number of transactions,
//! recording a timestamp before and after each update. The per-transaction
//! send/receive timestamps are written to stdout as CSV for offline
//! analysis of the serial round-trip latency distribution.

use log::{error, info, warn};
use std::env;
use std::process;
use std::time::Instant;
use trigio::config::Config;
use trigio::drivers::{DriverRegistry, DummyDriver, OutputDriver};
use trigio::protocol::MASK_EVENT;

const NUM_TRANSACTIONS: usize = 10_000;

fn run() -> i32 {
    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "trigio-profile".to_string());
    let config_path = match args.next() {
        Some(path) => path,
        None => {
            error!("usage: {} <config file path>", program);
            return 1;
        }
    };

    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("failed to load config file: {}", e);
            return 1;
        }
    };
    info!("driver={}", config.driver);

    let registry = DriverRegistry::with_builtins();
    let mut driver: Box<dyn OutputDriver> = match registry.create(&config.driver, &config.options)
    {
        Ok(driver) => driver,
        Err(e) => {
            warn!(
                "failed to initialize the output driver: {}; \
                 falling back to using a dummy output driver",
                e
            );
            Box::new(DummyDriver::new())
        }
    };

    info!("sending {} test commands...", NUM_TRANSACTIONS);
    let origin = Instant::now();
    let mut sent = Vec::with_capacity(NUM_TRANSACTIONS);
    let mut received = Vec::with_capacity(NUM_TRANSACTIONS);
    let mut event = true;

    for _ in 0..NUM_TRANSACTIONS {
        event = !event;
        let cmd = if event { MASK_EVENT } else { 0 };
        sent.push(origin.elapsed().as_nanos());
        driver.update(cmd);
        received.push(origin.elapsed().as_nanos());
    }

    println!("Sent,Received");
    for (s, r) in sent.iter().zip(received.iter()) {
        println!("{},{}", s, r);
    }

    driver.shutdown();
    info!("done");
    0
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    process::exit(run());
}
