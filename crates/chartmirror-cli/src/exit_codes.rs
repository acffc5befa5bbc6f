//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Input error - unreadable values, bad --set syntax, missing destination
pub const INPUT_ERROR: i32 = 2;

/// Scan error - chart rendering failed where no fallback was allowed
pub const SCAN_ERROR: i32 = 3;

/// Config error - the configuration file could not be loaded
pub const CONFIG_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;
