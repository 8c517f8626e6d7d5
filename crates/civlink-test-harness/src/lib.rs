//! civlink-test-harness: Test utilities for civlink.
//!
//! This crate provides [`MockBus`], an in-memory CI-V bus for deterministic
//! unit testing of the protocol engine without real radio hardware.

pub mod mock_bus;

pub use mock_bus::MockBus;
