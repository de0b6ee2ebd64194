//! Trigger output drivers
//!
//! An [`OutputDriver`] turns decoded command bits into hardware output state.
//! Drivers handle their own I/O failures: a failed update closes the driver
//! and later updates become no-ops, so the pipeline stage never has to retry.

mod arduino;
mod dummy;

pub use arduino::ArduinoDriver;
pub use dummy::{DummyDriver, VerboseDummyDriver};

use crate::config::DriverOptions;
use crate::error::{Error, Result};
use crate::transport::SerialTransport;
use std::collections::HashMap;

const DEFAULT_BAUD: u32 = 115_200;

/// Trigger output driver interface
pub trait OutputDriver: Send {
    /// Apply a masked command byte to the hardware output
    fn update(&mut self, cmd: u8);

    /// Shut the driver down; idempotent, best-effort
    fn shutdown(&mut self);
}

type DriverFactory = fn(&DriverOptions) -> Result<Box<dyn OutputDriver>>;

/// Registry of the built-in output driver kinds
///
/// Constructed once at startup and passed by reference; read-only thereafter.
pub struct DriverRegistry {
    factories: HashMap<&'static str, DriverFactory>,
}

impl DriverRegistry {
    /// Build a registry containing every built-in driver
    pub fn with_builtins() -> Self {
        let mut registry = DriverRegistry {
            factories: HashMap::new(),
        };
        registry.register("dummy", |_| Ok(Box::new(DummyDriver::new())));
        registry.register("verbose-dummy", |_| Ok(Box::new(VerboseDummyDriver::new())));
        registry.register("leonardo", |options| {
            Ok(Box::new(ArduinoDriver::leonardo(open_serial(options)?)))
        });
        registry.register("uno", |options| {
            Ok(Box::new(ArduinoDriver::uno(open_serial(options)?)))
        });
        registry
    }

    /// Add a name→factory mapping; startup only, before any lookup
    pub fn register(&mut self, name: &'static str, factory: DriverFactory) {
        self.factories.insert(name, factory);
    }

    /// Construct the driver registered under `name`
    ///
    /// Returns [`Error::UnknownDriver`] on a miss; hardware open failures are
    /// propagated from the factory. Callers fall back to [`DummyDriver`].
    pub fn create(&self, name: &str, options: &DriverOptions) -> Result<Box<dyn OutputDriver>> {
        match self.factories.get(name) {
            Some(factory) => factory(options),
            None => Err(Error::UnknownDriver(name.to_string())),
        }
    }
}

fn open_serial(options: &DriverOptions) -> Result<SerialTransport> {
    let path = options.get("port").ok_or(Error::MissingOption("port"))?;
    let baud = match options.get("baud") {
        Some(value) => value.parse().map_err(|_| Error::InvalidOption {
            key: "baud",
            value: value.clone(),
        })?,
        None => DEFAULT_BAUD,
    };
    SerialTransport::open(path, baud)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_known_driver() {
        let registry = DriverRegistry::with_builtins();
        let options = DriverOptions::new();
        assert!(registry.create("dummy", &options).is_ok());
        assert!(registry.create("verbose-dummy", &options).is_ok());
    }

    #[test]
    fn test_create_unknown_driver() {
        let registry = DriverRegistry::with_builtins();
        let result = registry.create("nonexistent", &DriverOptions::new());
        assert!(matches!(result, Err(Error::UnknownDriver(name)) if name == "nonexistent"));
    }

    #[test]
    fn test_serial_driver_requires_port_option() {
        let registry = DriverRegistry::with_builtins();
        let result = registry.create("leonardo", &DriverOptions::new());
        assert!(matches!(result, Err(Error::MissingOption("port"))));
    }

    #[test]
    fn test_bad_baud_is_rejected() {
        let registry = DriverRegistry::with_builtins();
        let mut options = DriverOptions::new();
        options.insert("port".to_string(), "/dev/null".to_string());
        options.insert("baud".to_string(), "fast".to_string());
        let result = registry.create("uno", &options);
        assert!(matches!(result, Err(Error::InvalidOption { key: "baud", .. })));
    }
}
