//! Tests for pipeline execution
//!
//! Organized by component

mod engine_tests;
mod graph_tests;
