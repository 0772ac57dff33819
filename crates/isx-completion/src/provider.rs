//! Completion providers.
//!
//! `ExtensionMethodCompletionProvider` runs the extension method pipeline:
//! classify the caret, enumerate the symbol space, filter, build items.
//! `AggregateCompletionProvider` merges the output of several providers.

use crate::candidate::{SurfaceCache, SymbolSpace};
use crate::context::classify_receiver;
use crate::error::CompletionError;
use crate::filter::ApplicabilityFilter;
use crate::import::{CommittedText, ImportInserter};
use crate::items::{CompletionItem, ItemBuilder, compare_items};
use crate::options::CompletionOptions;
use isx_binder::Compilation;
use isx_common::{CancellationToken, FileId};
use rustc_hash::FxHashSet;
use std::sync::Arc;
use tracing::{debug, debug_span, trace};

/// One completion invocation.
#[derive(Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub compilation: &'a Compilation,
    pub file: FileId,
    pub offset: u32,
    pub cancellation: &'a CancellationToken,
}

pub trait CompletionProvider: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    fn provide(&self, request: &CompletionRequest<'_>)
    -> Result<Vec<CompletionItem>, CompletionError>;
}

// =============================================================================
// Extension methods
// =============================================================================

pub struct ExtensionMethodCompletionProvider {
    options: CompletionOptions,
    surfaces: Arc<SurfaceCache>,
    inserter: Option<Arc<dyn ImportInserter>>,
}

impl ExtensionMethodCompletionProvider {
    /// A provider over the process-wide surface cache, without an import
    /// inserter.
    pub fn new(options: CompletionOptions) -> Self {
        ExtensionMethodCompletionProvider {
            options,
            surfaces: SurfaceCache::global(),
            inserter: None,
        }
    }

    pub fn with_surface_cache(mut self, surfaces: Arc<SurfaceCache>) -> Self {
        self.surfaces = surfaces;
        self
    }

    pub fn with_import_inserter(mut self, inserter: Arc<dyn ImportInserter>) -> Self {
        self.inserter = Some(inserter);
        self
    }

    pub fn options(&self) -> &CompletionOptions {
        &self.options
    }

    /// Extension method items at the request's caret.
    pub fn complete(
        &self,
        request: &CompletionRequest<'_>,
    ) -> Result<Vec<CompletionItem>, CompletionError> {
        let span = debug_span!("extension_completions", offset = request.offset);
        let _guard = span.enter();

        let result = self.complete_inner(request);
        if let Err(CompletionError::Cancelled) = &result {
            debug!("cancelled");
        }
        result
    }

    fn complete_inner(
        &self,
        request: &CompletionRequest<'_>,
    ) -> Result<Vec<CompletionItem>, CompletionError> {
        if !self.options.suggest_extension_methods {
            return Ok(Vec::new());
        }
        let CompletionRequest {
            compilation,
            file,
            offset,
            cancellation,
        } = *request;
        cancellation.check()?;

        let model = compilation.semantic_model(file).ok_or_else(|| {
            CompletionError::MalformedProgramState(format!("no document {}", file.0))
        })?;
        let Some(context) = classify_receiver(&model, offset) else {
            return Ok(Vec::new());
        };
        cancellation.check()?;

        let space = SymbolSpace::new(
            compilation,
            &self.surfaces,
            self.options.user_code_only,
            cancellation,
        )?;
        let imported = compilation.imported_namespaces_at(file, context.insertion_location);
        let filter = ApplicabilityFilter::new(compilation);
        let mut builder = ItemBuilder::new(compilation.db(), &context, &self.options, &imported);

        let mut considered = 0usize;
        for candidate in space.candidates(cancellation) {
            let candidate = candidate?;
            if !builder.matches_prefix(&candidate) {
                continue;
            }
            considered += 1;
            match filter.check(&candidate, &context) {
                Ok(subst) => builder.add(&candidate, &subst),
                Err(rejection) => trace!(
                    method = %candidate.name,
                    namespace = %candidate.declaring_namespace,
                    %rejection,
                    "rejected"
                ),
            }
        }
        debug!(
            considered,
            items = builder.len(),
            null_conditional = context.is_null_conditional,
            "extension completions"
        );
        Ok(builder.finish())
    }

    /// Accept `item` in the request's document.
    pub fn commit(
        &self,
        request: &CompletionRequest<'_>,
        item: &CompletionItem,
    ) -> Result<CommittedText, CompletionError> {
        item.commit
            .apply(request.compilation, request.file, self.inserter.as_deref())
    }
}

impl CompletionProvider for ExtensionMethodCompletionProvider {
    fn name(&self) -> &str {
        "extension-methods"
    }

    fn provide(
        &self,
        request: &CompletionRequest<'_>,
    ) -> Result<Vec<CompletionItem>, CompletionError> {
        self.complete(request)
    }
}

// =============================================================================
// Aggregation
// =============================================================================

/// Runs providers in order and merges their items.
///
/// Items are deduplicated by `(label, origin namespace, detail)`, first
/// provider wins, then sorted by sort text. Cancellation aborts the whole
/// request; any other provider failure only drops that provider's items.
#[derive(Default)]
pub struct AggregateCompletionProvider {
    providers: Vec<Arc<dyn CompletionProvider>>,
}

impl AggregateCompletionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn providers(&self) -> &[Arc<dyn CompletionProvider>] {
        &self.providers
    }

    pub fn complete(
        &self,
        request: &CompletionRequest<'_>,
    ) -> Result<Vec<CompletionItem>, CompletionError> {
        let mut seen = FxHashSet::default();
        let mut merged = Vec::new();
        for provider in &self.providers {
            request.cancellation.check()?;
            let items = match provider.provide(request) {
                Ok(items) => items,
                Err(CompletionError::Cancelled) => return Err(CompletionError::Cancelled),
                Err(error @ CompletionError::MalformedProgramState(_)) => {
                    trace!(provider = provider.name(), %error, "provider skipped");
                    continue;
                }
            };
            for item in items {
                let key = (
                    item.label.clone(),
                    item.origin_namespace.clone(),
                    item.detail.clone(),
                );
                if seen.insert(key) {
                    merged.push(item);
                }
            }
        }
        merged.sort_by(compare_items);
        Ok(merged)
    }
}

impl CompletionProvider for AggregateCompletionProvider {
    fn name(&self) -> &str {
        "aggregate"
    }

    fn provide(
        &self,
        request: &CompletionRequest<'_>,
    ) -> Result<Vec<CompletionItem>, CompletionError> {
        self.complete(request)
    }
}
