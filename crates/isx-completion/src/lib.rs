//! Extension method completion for the isx completion engine.
//!
//! At a member access such as `list.` or `obj?.Som`, offers every extension
//! method of the program and its references that applies to the receiver,
//! whether or not its namespace is imported yet. Accepting an item inserts
//! the name and, through an `ImportInserter`, the missing `using`.
//!
//! This crate provides:
//! - `context` - Caret classification into a `ReceiverContext`
//! - `candidate` - `ExtensionCandidate`, the `SymbolSpace` and its `SurfaceCache`
//! - `filter` - Deprecation, accessibility and receiver applicability
//! - `items` - `CompletionItem` construction, deduplication and ordering
//! - `import` - Commit actions and the `ImportInserter` seam
//! - `provider` - The extension method provider and the aggregator

pub mod error;
pub use error::{CompletionError, ImportError};

pub mod options;
pub use options::CompletionOptions;

pub mod context;
pub use context::{ReceiverContext, classify_receiver, receiver_context};

pub mod candidate;
pub use candidate::{
    CandidateAccessibility, ExtensionCandidate, LibrarySurface, SurfaceCache, SymbolSpace,
};

pub mod filter;
pub use filter::{ApplicabilityFilter, Rejection};

pub mod items;
pub use items::{
    CommitAction, CompletionItem, CompletionTag, ItemBuilder, matches_prefix, sort_priority,
};

pub mod import;
pub use import::{CommittedText, ImportInserter};

pub mod provider;
pub use provider::{
    AggregateCompletionProvider, CompletionProvider, CompletionRequest,
    ExtensionMethodCompletionProvider,
};
