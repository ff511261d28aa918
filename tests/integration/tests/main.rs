//! End-to-End Integration Tests
//!
//! These tests drive the token engine through its public API against the
//! certificate store fixtures in `tests/fixtures/store`.

mod common;
mod configuration;
mod round_trip;
mod tampering;
