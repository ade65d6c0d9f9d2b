//! # cdl-common
//!
//! Shared types, error definitions, configuration, and grammar constants
//! used across the CDL workspace.
//!
//! This crate is the leaf of the dependency graph: it depends on no other
//! internal crate and provides the primitives the parser builds upon.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
