//! Property-based tests using proptest
//!
//! Tests aggregation, encoding and dispatch invariants.

pub mod dispatch_tests;
