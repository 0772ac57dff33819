use clap::Parser;

use super::args::{CliArgs, Command, OutputFormat};

fn complete_args(argv: &[&str]) -> super::args::CompleteArgs {
    let args = CliArgs::try_parse_from(argv).expect("args should parse");
    match args.command {
        Command::Complete(complete) => complete,
    }
}

#[test]
fn parses_offset_caret() {
    let args = complete_args(&["isx", "complete", "Program.cs", "--offset", "42"]);
    assert_eq!(args.file, std::path::PathBuf::from("Program.cs"));
    assert_eq!(args.offset, Some(42));
    assert_eq!(args.format, OutputFormat::Text);
    assert!(args.config.is_none());
    assert!(args.references.is_empty());
    assert!(args.commit.is_none());
}

#[test]
fn parses_all_flags() {
    let args = complete_args(&[
        "isx",
        "complete",
        "src/Program.cs",
        "--line",
        "3",
        "--column",
        "14",
        "--config",
        "isx.json",
        "-r",
        "A.cs",
        "--reference",
        "B.cs",
        "--format",
        "JSON",
        "--commit",
        "Select<>",
    ]);
    assert_eq!(args.line, Some(3));
    assert_eq!(args.column, Some(14));
    assert_eq!(args.config.as_deref(), Some(std::path::Path::new("isx.json")));
    assert_eq!(args.references.len(), 2);
    assert_eq!(args.format, OutputFormat::Json);
    assert_eq!(args.commit.as_deref(), Some("Select<>"));
}

#[test]
fn requires_exactly_one_caret() {
    assert!(CliArgs::try_parse_from(["isx", "complete", "Program.cs"]).is_err());
    assert!(
        CliArgs::try_parse_from([
            "isx", "complete", "Program.cs", "--offset", "1", "--after", "list."
        ])
        .is_err()
    );
    assert!(CliArgs::try_parse_from(["isx", "complete", "Program.cs", "--line", "1"]).is_err());
}
