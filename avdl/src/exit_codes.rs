//! Stable exit codes for `avdl` commands.

/// Command succeeded, whether or not any file was generated.
pub const OK: i32 = 0;
/// Validation, configuration, or compilation failed.
pub const FAILED: i32 = 1;
