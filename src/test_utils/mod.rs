//! Test utilities for integration testing.
//!
//! This module provides:
//! - Test data factories for creating valid test fixtures
//! - In-memory port implementations for mocking persistence and the provider
//! - A builder for constructing an app state with test dependencies

mod app_state_builder;
mod domain_mocks;
mod factories;

pub use app_state_builder::*;
pub use domain_mocks::*;
pub use factories::*;
