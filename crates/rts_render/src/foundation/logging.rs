//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system, ignoring repeat initialization
///
/// Tests and embedded hosts may race to initialize; the second caller wins
/// nothing and loses nothing.
pub fn try_init() {
    let _ = env_logger::try_init();
}
