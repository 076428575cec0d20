//! Deterministic, pure logic for protocol generation.
//!
//! Core modules must be free of I/O side effects so they can be tested on
//! in-memory values alone.

pub mod sources;
pub mod version;
