//! Avro IDL to protocol generation step.
//!
//! Discovers `.avdl` sources, compiles each through an external IDL compiler,
//! and writes the pretty-printed protocol JSON as `<name>.avpr`.
//!
//! - **[`core`]**: Pure logic (source selection, host version rules).
//! - **[`io`]**: Filesystem, configuration, and child process access. The
//!   compiler sits behind a trait so tests can script it.
//!
//! [`generate`] wires the two together for the `avdl generate` command.

pub mod core;
pub mod exit_codes;
pub mod generate;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
