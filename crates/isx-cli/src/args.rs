use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the isx binary.
#[derive(Parser, Debug)]
#[command(
    name = "isx",
    version,
    about = "Extension method completion for C# sources"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List extension method completions at a caret position.
    Complete(CompleteArgs),
}

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("caret")
        .required(true)
        .args(["offset", "line", "after"])
))]
pub struct CompleteArgs {
    /// Source file containing the caret.
    pub file: PathBuf,

    /// Caret as a byte offset into the file.
    #[arg(long)]
    pub offset: Option<u32>,

    /// Caret line (1-based); requires --column.
    #[arg(long, requires = "column")]
    pub line: Option<u32>,

    /// Caret column (1-based, UTF-16 code units).
    #[arg(long, requires = "line")]
    pub column: Option<u32>,

    /// Place the caret right after the first occurrence of this text.
    #[arg(long)]
    pub after: Option<String>,

    /// Project file. Defaults to `isx.json` next to the source file, if any.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Extra declaration file to reference, as a library of its own.
    #[arg(short = 'r', long = "reference")]
    pub references: Vec<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, ignore_case = true)]
    pub format: OutputFormat,

    /// Accept the first item with this label and print the resulting document.
    #[arg(long)]
    pub commit: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}
