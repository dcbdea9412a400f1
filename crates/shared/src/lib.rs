//! Shared utilities and common types for the Events Manager backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Page-number pagination math and response envelopes
//! - Common validation helpers

pub mod pagination;
pub mod validation;
