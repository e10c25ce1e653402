// blinx shared library
// Ambient pieces used by every extractor binary: logging and configuration

pub mod config;
pub mod log;

/// Default configuration file name
pub const DEFAULT_CONFIG: &str = "extractor.conf";

/// Prefix for environment variable overrides of configuration keys
pub const CONFIG_ENV_PREFIX: &str = "Extractor_";
