//! Common types and utilities for the shapecheck engine.
//!
//! This crate provides foundational pieces used across all shapecheck crates:
//! - Centralized recursion limits
//! - Engine configuration (`CheckerOptions`)
//! - Tracing subscriber setup

// Centralized limits and thresholds
pub mod limits;

// Engine configuration, deserializable from JSON
pub mod options;
pub use options::{CheckerOptions, OptionsError, ParameterVariance};

// Opt-in tracing subscriber
pub mod tracing_config;
