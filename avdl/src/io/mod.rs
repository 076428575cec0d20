//! I/O helpers for protocol generation.

pub mod classpath;
pub mod compiler;
pub mod config;
pub mod output;
pub mod process;
pub mod sources;
