//! Common types and utilities for the isx completion engine.
//!
//! This crate provides foundational types used across all isx crates:
//! - String interning (`Atom`, `ShardedInterner`)
//! - Source spans and file handles (`Span`, `FileId`)
//! - Position/line-map types for line/column conversion
//! - Cooperative cancellation (`CancellationToken`)
//! - Engine limits and thresholds

// String interning for identifier deduplication
pub mod interner;
pub use interner::{Atom, ShardedInterner};

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::{FileId, Span};

// Position/line-map types for line/column source locations
pub mod position;
pub use position::{LineMap, Position};

// Cooperative cancellation shared between host and engine
pub mod cancellation;
pub use cancellation::{CancellationToken, Cancelled};

// Centralized limits and thresholds
pub mod limits;
