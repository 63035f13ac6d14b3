//! Integration Tests Module
//!
//! End-to-end batches through the public crate APIs with in-process test
//! doubles. No network calls are made.

// Shared mocks and fixtures
mod support;

// Batch scenarios: partial fetch failure, framework comparison, recommendations
mod scenario_test;

// Recovery pipeline against realistic model output
mod recovery_test;

// File-backed store, resource directory and config wiring
mod store_test;
