//! Grammar constants and defaults.

/// Sigil introducing a service name or service reference (`@logger`).
pub const SERVICE_SIGIL: char = '@';

/// Sigil introducing a parameter reference (`:db.host`), also used as the
/// separator between a definition's name and its value.
pub const PARAMETER_SIGIL: char = ':';

/// Namespace separator inside class paths (`Acme\Log`).
pub const NAMESPACE_SEPARATOR: char = '\\';

/// Suffix turning an identifier into a class-name string literal.
pub const CLASS_SUFFIX: &str = "::class";

/// Prefix of a line comment.
pub const COMMENT_PREFIX: &str = "//";

/// Default limit on literal array nesting.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 64;
