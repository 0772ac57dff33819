//! The `complete` command: build a program, run completion, render output.

use crate::args::{CompleteArgs, OutputFormat};
use crate::config::{ProjectConfig, find_project_config, load_project_config};
use crate::inserter::UsingDirectiveInserter;
use anyhow::{Context, Result, anyhow, bail};
use isx_binder::{Compilation, Library, Program};
use isx_common::{CancellationToken, LineMap, Position};
use isx_completion::{
    CompletionItem, CompletionRequest, ExtensionMethodCompletionProvider,
};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const DEFAULT_ASSEMBLY_NAME: &str = "Project";

/// Run `isx complete` and return what goes to stdout.
pub fn run_complete(args: &CompleteArgs, cwd: &Path) -> Result<String> {
    let file = absolute(cwd, &args.file);
    let config_path = match &args.config {
        Some(path) => Some(absolute(cwd, path)),
        None => find_project_config(&file),
    };
    let config = match &config_path {
        Some(path) => load_project_config(path)?,
        None => ProjectConfig::default(),
    };
    if let Some(path) = &config_path {
        debug!(config = %path.display(), "loaded project file");
    }

    let text = read_source(&file)?;
    let offset = caret_offset(args, &text)?;
    let references: Vec<PathBuf> = args.references.iter().map(|r| absolute(cwd, r)).collect();
    let program = build_program(&config, &file, &text, &references)?;
    let compilation = Compilation::new(&program);
    let file_id = compilation
        .file_by_name(&display_name(&file))
        .ok_or_else(|| anyhow!("{} is not part of the program", file.display()))?;

    let provider = ExtensionMethodCompletionProvider::new(config.completion.clone())
        .with_import_inserter(Arc::new(UsingDirectiveInserter::new()));
    let token = CancellationToken::new();
    let request = CompletionRequest {
        compilation: &compilation,
        file: file_id,
        offset,
        cancellation: &token,
    };
    let items = provider
        .complete(&request)
        .with_context(|| format!("completion failed at offset {offset}"))?;
    info!(file = %file.display(), offset, items = items.len(), "completed");

    match &args.commit {
        Some(label) => {
            let item = items
                .iter()
                .find(|item| &item.label == label)
                .ok_or_else(|| anyhow!("no completion item labelled `{label}`"))?;
            let committed = provider.commit(&request, item)?;
            match args.format {
                OutputFormat::Text => Ok(committed.text),
                OutputFormat::Json => Ok(serde_json::to_string_pretty(&committed)?),
            }
        }
        None => match args.format {
            OutputFormat::Text => Ok(render_text(&items)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&items)?),
        },
    }
}

/// The program for `file`: project documents, the file itself, configured
/// libraries and one library per `--reference` file.
pub fn build_program(
    config: &ProjectConfig,
    file: &Path,
    text: &str,
    references: &[PathBuf],
) -> Result<Program> {
    let assembly_name = config
        .assembly_name
        .clone()
        .unwrap_or_else(|| DEFAULT_ASSEMBLY_NAME.to_string());
    let mut program = Program::new(assembly_name);
    if config.no_core_library {
        program = program.without_core_library();
    }

    for document in &config.files {
        if same_file(document, file) {
            continue;
        }
        program = program.with_document(display_name(document), read_source(document)?);
    }
    program = program.with_document(display_name(file), text);

    for reference in &config.references {
        let mut library = Library::new(&reference.name, &reference.version);
        for path in &reference.files {
            library = library.with_file(display_name(path), read_source(path)?);
        }
        program = program.with_reference(library);
    }
    for path in references {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow!("reference has no file name: {}", path.display()))?;
        let library = Library::new(name, "0.0.0").with_file(display_name(path), read_source(path)?);
        program = program.with_reference(library);
    }
    Ok(program)
}

/// Byte offset of the caret described by `--offset`, `--line`/`--column`
/// or `--after`.
pub fn caret_offset(args: &CompleteArgs, text: &str) -> Result<u32> {
    if let Some(offset) = args.offset {
        if offset as usize > text.len() || !text.is_char_boundary(offset as usize) {
            bail!("offset {offset} is outside the file ({} bytes)", text.len());
        }
        return Ok(offset);
    }
    if let (Some(line), Some(column)) = (args.line, args.column) {
        if line == 0 || column == 0 {
            bail!("--line and --column are 1-based");
        }
        let line_map = LineMap::build(text);
        return line_map
            .position_to_offset(Position::new(line - 1, column - 1), text)
            .ok_or_else(|| anyhow!("line {line} is outside the file"));
    }
    if let Some(marker) = &args.after {
        let start = text
            .find(marker.as_str())
            .ok_or_else(|| anyhow!("`{marker}` does not occur in the file"))?;
        return Ok((start + marker.len()) as u32);
    }
    bail!("no caret position given")
}

/// One item per line: label, origin namespace, detail, and a marker when
/// accepting the item adds a `using`.
pub fn render_text(items: &[CompletionItem]) -> String {
    let mut out = String::new();
    for item in items {
        let _ = write!(out, "{}\t{}\t{}", item.label, item.origin_namespace, item.detail);
        if item.requires_import() {
            out.push_str("\t+using");
        }
        out.push('\n');
    }
    out
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read source file: {}", path.display()))
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

fn display_name(path: &Path) -> String {
    path.display().to_string()
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
