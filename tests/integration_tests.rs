//! Integration Tests Entry Point
//!
//! Tests are organized by module:
//! - `routing/` - End-to-end command-pipeline and delivery scenarios
//! - `common/` - Shared test fixtures

mod common;
mod routing;
