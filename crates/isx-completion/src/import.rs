//! Accepting an item: text insertion, then the optional `using`.
//!
//! Adding the directive is delegated to an `ImportInserter` supplied by the
//! host. Whatever goes wrong there (an error, no inserter at all, or a panic
//! inside it) the accepted text stays and the failure is only logged.

use crate::error::{CompletionError, ImportError};
use crate::items::CommitAction;
use isx_binder::Compilation;
use isx_common::FileId;
use isx_parser::SyntaxTree;
use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::debug;

/// Host service that adds namespace imports to a parsed document.
pub trait ImportInserter: Send + Sync {
    /// Return the full text of `root` with `using` directives for
    /// `namespaces` in scope at `context_location`.
    fn add_imports(
        &self,
        compilation: &Compilation,
        root: &SyntaxTree,
        context_location: u32,
        namespaces: &[String],
        place_system_namespace_first: bool,
    ) -> Result<String, ImportError>;
}

/// Document text after an item was accepted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommittedText {
    pub text: String,
    pub import_added: bool,
}

impl CommitAction {
    /// Apply the action to document `file` of `compilation`.
    pub fn apply(
        &self,
        compilation: &Compilation,
        file: FileId,
        inserter: Option<&dyn ImportInserter>,
    ) -> Result<CommittedText, CompletionError> {
        let tree = compilation.file(file).ok_or_else(|| {
            CompletionError::MalformedProgramState(format!("no document {}", file.0))
        })?;
        let span = self.replacement_span;
        let (Some(before), Some(after)) = (
            tree.text.get(..span.start as usize),
            tree.text.get(span.end as usize..),
        ) else {
            return Err(CompletionError::MalformedProgramState(format!(
                "replacement span {}..{} outside {}",
                span.start, span.end, tree.file_name
            )));
        };
        let text = format!("{before}{}{after}", self.insert_text);

        let Some(namespace) = &self.import_namespace else {
            return Ok(CommittedText {
                text,
                import_added: false,
            });
        };

        let root = isx_parser::parse_source_file(&tree.file_name, &text);
        let context_location = span.start + self.insert_text.len() as u32;
        let result = add_imports_guarded(
            inserter,
            compilation,
            &root,
            context_location,
            std::slice::from_ref(namespace),
            self.place_system_namespace_first,
        );
        match result {
            Ok(imported) => Ok(CommittedText {
                text: imported,
                import_added: true,
            }),
            Err(error) => {
                debug!(%namespace, %error, "import not added");
                Ok(CommittedText {
                    text,
                    import_added: false,
                })
            }
        }
    }
}

fn add_imports_guarded(
    inserter: Option<&dyn ImportInserter>,
    compilation: &Compilation,
    root: &SyntaxTree,
    context_location: u32,
    namespaces: &[String],
    place_system_namespace_first: bool,
) -> Result<String, ImportError> {
    let inserter = inserter.ok_or(ImportError::Unavailable)?;
    panic::catch_unwind(AssertUnwindSafe(|| {
        inserter.add_imports(
            compilation,
            root,
            context_location,
            namespaces,
            place_system_namespace_first,
        )
    }))
    .unwrap_or_else(|payload| Err(ImportError::Panicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
