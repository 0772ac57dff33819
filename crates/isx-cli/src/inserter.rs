//! `using` directive insertion for the CLI host.
//!
//! The directive goes into the innermost namespace enclosing the caret that
//! already has usings, otherwise into the compilation unit after any
//! `extern alias`. Within that block it is placed in sorted position, with
//! `System` namespaces first when requested.

use isx_binder::Compilation;
use isx_completion::{ImportError, ImportInserter};
use isx_parser::{NodeIndex, NodeKind, SyntaxTree, node_flags};
use tracing::debug;

#[derive(Debug, Default, Clone, Copy)]
pub struct UsingDirectiveInserter;

impl UsingDirectiveInserter {
    pub fn new() -> Self {
        UsingDirectiveInserter
    }
}

impl ImportInserter for UsingDirectiveInserter {
    fn add_imports(
        &self,
        _compilation: &Compilation,
        root: &SyntaxTree,
        context_location: u32,
        namespaces: &[String],
        place_system_namespace_first: bool,
    ) -> Result<String, ImportError> {
        let mut text = root.text.to_string();
        let mut location = context_location;
        for namespace in namespaces {
            if namespace.is_empty() {
                return Err(ImportError::Rejected {
                    namespace: namespace.clone(),
                    reason: "the global namespace cannot be imported".to_string(),
                });
            }
            let tree = isx_parser::parse_source_file(&root.file_name, &text);
            let Some((offset, directive)) =
                plan_insertion(&tree, location, namespace, place_system_namespace_first)
            else {
                debug!(%namespace, "already imported");
                continue;
            };
            text.insert_str(offset as usize, &directive);
            if offset <= location {
                location += directive.len() as u32;
            }
        }
        Ok(text)
    }
}

/// A block of using directives: the compilation unit or a namespace body.
struct UsingBlock {
    usings: Vec<NodeIndex>,
    externs: Vec<NodeIndex>,
}

/// Where to insert `using {namespace};` and the exact text, or `None` when
/// the namespace is already imported at `location`.
fn plan_insertion(
    tree: &SyntaxTree,
    location: u32,
    namespace: &str,
    system_first: bool,
) -> Option<(u32, String)> {
    let blocks = enclosing_blocks(tree, location);
    let already = blocks
        .iter()
        .flat_map(|block| &block.usings)
        .any(|&using| imported_name(tree, using).as_deref() == Some(namespace));
    if already {
        return None;
    }

    let target = blocks
        .iter()
        .rev()
        .find(|block| !block.usings.is_empty())
        .or_else(|| blocks.first())?;
    let text: &str = &tree.text;
    let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };

    let key = |name: &str| (system_first && !is_system(name), name.to_string());
    let new_key = key(namespace);
    let before = target.usings.iter().copied().find(|&using| {
        imported_name(tree, using).is_some_and(|existing| key(&existing) > new_key)
    });

    if let Some(anchor) = before {
        let pos = tree.span(anchor).start;
        let start = line_start(text, pos);
        let indent = indentation(text, start, pos);
        return Some((start, format!("{indent}using {namespace};{newline}")));
    }
    if let Some(&last) = target.usings.last() {
        let pos = tree.span(last).start;
        let indent = indentation(text, line_start(text, pos), pos);
        return Some(after_line(text, tree.span(last).end, indent, namespace, newline));
    }
    if let Some(&last) = target.externs.last() {
        let pos = tree.span(last).start;
        let indent = indentation(text, line_start(text, pos), pos);
        return Some(after_line(text, tree.span(last).end, indent, namespace, newline));
    }

    let separator = if text.starts_with(['\r', '\n']) || text.is_empty() {
        ""
    } else {
        newline
    };
    Some((0, format!("using {namespace};{newline}{separator}")))
}

/// Compilation unit first, then each namespace enclosing `location`.
fn enclosing_blocks(tree: &SyntaxTree, location: u32) -> Vec<UsingBlock> {
    let mut blocks = Vec::new();
    let Some(unit) = tree.node(tree.root).and_then(|n| tree.arena.get_source_file(n)) else {
        return blocks;
    };
    blocks.push(UsingBlock {
        usings: plain_usings(tree, &unit.usings),
        externs: unit.externs.clone(),
    });

    let mut members = unit.members.clone();
    loop {
        let inner = members.iter().copied().find(|&member| {
            tree.kind(member) == Some(NodeKind::NamespaceDeclaration)
                && tree
                    .node(member)
                    .is_some_and(|n| contains(n.pos, n.end, n.flags, location))
        });
        let Some(namespace) = inner else {
            break;
        };
        let Some(data) = tree
            .node(namespace)
            .and_then(|n| tree.arena.get_namespace(n))
        else {
            break;
        };
        blocks.push(UsingBlock {
            usings: plain_usings(tree, &data.usings),
            externs: data.externs.clone(),
        });
        members = data.members.clone();
    }
    blocks
}

fn contains(pos: u32, end: u32, flags: u16, location: u32) -> bool {
    pos <= location && (location <= end || flags & node_flags::FILE_SCOPED != 0)
}

/// `using N;` directives, without aliases, `using static` or `global using`.
fn plain_usings(tree: &SyntaxTree, usings: &[NodeIndex]) -> Vec<NodeIndex> {
    usings
        .iter()
        .copied()
        .filter(|&using| {
            tree.node(using)
                .and_then(|n| tree.arena.get_using(n))
                .is_some_and(|data| !data.is_global && !data.is_static && data.alias.is_none())
        })
        .collect()
}

fn imported_name(tree: &SyntaxTree, using: NodeIndex) -> Option<String> {
    let data = tree.node(using).and_then(|n| tree.arena.get_using(n))?;
    tree.dotted_name(data.name)
}

fn is_system(namespace: &str) -> bool {
    namespace == "System" || namespace.starts_with("System.")
}

fn line_start(text: &str, pos: u32) -> u32 {
    text.get(..pos as usize)
        .and_then(|head| head.rfind('\n'))
        .map_or(0, |i| i as u32 + 1)
}

fn indentation(text: &str, line_start: u32, pos: u32) -> String {
    text.get(line_start as usize..pos as usize)
        .filter(|prefix| prefix.chars().all(|c| c == ' ' || c == '\t'))
        .unwrap_or_default()
        .to_string()
}

/// Insert a directive on its own line after the line ending at or after `end`.
fn after_line(
    text: &str,
    end: u32,
    indent: String,
    namespace: &str,
    newline: &str,
) -> (u32, String) {
    match text.get(end as usize..).and_then(|rest| rest.find('\n')) {
        Some(i) => (
            end + i as u32 + 1,
            format!("{indent}using {namespace};{newline}"),
        ),
        None => (
            text.len() as u32,
            format!("{newline}{indent}using {namespace};"),
        ),
    }
}

#[cfg(test)]
#[path = "tests/inserter_tests.rs"]
mod inserter_tests;
