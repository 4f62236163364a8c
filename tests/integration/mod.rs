//! Integration tests of the public API.
//!
//! Scenarios run against the RFC 7643 example resources in
//! [`crate::common::fixtures`].

pub mod filters;
pub mod patch;
pub mod properties;
pub mod schema_factory;
