//! # cdl-parser
//!
//! Parser and resolver for the `.ctn` container definition language.
//!
//! Handles:
//! - **Parser**: Lexing, AST construction, and validation of CDL sources.
//! - **Graph**: Service dependency graph and topological ordering.
//! - **Resolver**: Parameter substitution and deferred service lookups for
//!   binding runtimes.

pub mod graph;
pub mod parser;
pub mod resolver;
