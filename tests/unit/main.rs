//! Unit tests for the safebox-host driver.
//!
//! These tests use mocked dependencies and run fast without external I/O.

mod architecture;
mod mocks;
