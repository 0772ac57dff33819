//! The `isx.json` project file.

use anyhow::{Context, Result, anyhow};
use isx_completion::CompletionOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const PROJECT_FILE_NAME: &str = "isx.json";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(default)]
    pub assembly_name: Option<String>,
    /// Documents of the program besides the one being completed.
    #[serde(default)]
    pub files: Vec<PathBuf>,
    #[serde(default)]
    pub references: Vec<ReferenceConfig>,
    /// Leave out the embedded `System.Runtime` and `System.Linq` libraries.
    #[serde(default)]
    pub no_core_library: bool,
    #[serde(default)]
    pub completion: CompletionOptions,
}

/// A referenced library: declaration-only C# sources.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceConfig {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

pub fn parse_project_config(source: &str) -> Result<ProjectConfig> {
    let config = serde_json::from_str(source).context("failed to parse project JSON")?;
    Ok(config)
}

/// Load `path`, resolving `files` and reference files against its directory.
pub fn load_project_config(path: &Path) -> Result<ProjectConfig> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read project file: {}", path.display()))?;
    let mut config = parse_project_config(&source)
        .with_context(|| format!("failed to parse project file: {}", path.display()))?;

    let base_dir = path
        .parent()
        .ok_or_else(|| anyhow!("project file has no parent directory"))?;
    resolve_paths(&mut config.files, base_dir);
    for reference in &mut config.references {
        resolve_paths(&mut reference.files, base_dir);
    }
    Ok(config)
}

fn resolve_paths(paths: &mut [PathBuf], base_dir: &Path) {
    for path in paths {
        if path.is_relative() {
            *path = base_dir.join(&*path);
        }
    }
}

/// `isx.json` in the directory of `file`, if there is one.
pub fn find_project_config(file: &Path) -> Option<PathBuf> {
    let candidate = file.parent()?.join(PROJECT_FILE_NAME);
    candidate.is_file().then_some(candidate)
}
