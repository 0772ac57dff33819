//! Centralized limits and thresholds for the completion engine.
//!
//! Recursion depths and walk budgets used by the parser, binder and solver.
//! Exceeding a limit never panics: the operation degrades to an error type or
//! an empty result, which downstream treats as a malformed receiver.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum nesting depth the parser accepts for expressions and statements.
///
/// Deeper input is parsed as a missing expression rather than overflowing
/// the stack:
///
/// ```csharp
/// var x = ((((((((((((((((((((1))))))))))))))))))));
/// ```
pub const MAX_PARSE_DEPTH: u32 = 256;

/// Maximum depth when computing the static type of an expression.
///
/// Covers receiver chains (`a.b().c().d()`), `var` locals initialized from
/// other `var` locals, and lambda parameters inferred from enclosing calls.
pub const MAX_EXPRESSION_DEPTH: u32 = 128;

/// Maximum depth of structural recursion in type relations and unification.
///
/// Guards against self-referential generic hierarchies such as
/// `class Node<T> : IComparable<Node<Node<T>>>`.
pub const MAX_INFERENCE_DEPTH: u32 = 32;

// =============================================================================
// Operation Counts
// =============================================================================

/// Maximum number of supertypes collected when walking a type's base chain
/// and interface set.
pub const MAX_SUPERTYPE_WALK: usize = 512;

/// Number of candidates processed between two cancellation checks in the
/// filtering stage.
pub const CANCELLATION_CHECK_INTERVAL: usize = 64;

/// Maximum number of base-list hops when resolving nested types through
/// inherited members.
pub const MAX_BASE_CHAIN: usize = 64;
