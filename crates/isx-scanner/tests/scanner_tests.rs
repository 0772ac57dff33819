use super::*;

fn kinds(text: &str) -> Vec<SyntaxKind> {
    scan(text).tokens.iter().map(|t| t.kind).collect()
}

#[test]
fn test_member_access_tokens() {
    assert_eq!(
        kinds("list.Select"),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::DotToken,
            SyntaxKind::Identifier,
            SyntaxKind::EndOfFileToken,
        ]
    );
}

#[test]
fn test_null_conditional_access() {
    assert_eq!(
        kinds("list?.Count"),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::QuestionDotToken,
            SyntaxKind::Identifier,
            SyntaxKind::EndOfFileToken,
        ]
    );
}

#[test]
fn test_conditional_with_real_literal_is_not_null_conditional() {
    let k = kinds("a?.5:b");
    assert_eq!(k[1], SyntaxKind::QuestionToken);
    assert_eq!(k[2], SyntaxKind::NumericLiteral);
}

#[test]
fn test_integer_followed_by_dot_is_two_tokens() {
    let result = scan("111.");
    assert_eq!(result.tokens[0].kind, SyntaxKind::NumericLiteral);
    assert_eq!(result.tokens[0].end, 3);
    assert_eq!(result.tokens[1].kind, SyntaxKind::DotToken);
}

#[test]
fn test_numeric_suffixes() {
    let text = "1L 2UL 1.5f 3m 0x1F 1e10";
    let result = scan(text);
    let texts: Vec<&str> = result
        .tokens
        .iter()
        .filter(|t| t.kind == SyntaxKind::NumericLiteral)
        .map(|t| &text[t.start as usize..t.end as usize])
        .collect();
    assert_eq!(texts, vec!["1L", "2UL", "1.5f", "3m", "0x1F", "1e10"]);
}

#[test]
fn test_keywords_and_contextual_identifiers() {
    assert_eq!(
        kinds("public static var where"),
        vec![
            SyntaxKind::PublicKeyword,
            SyntaxKind::StaticKeyword,
            SyntaxKind::Identifier,
            SyntaxKind::Identifier,
            SyntaxKind::EndOfFileToken,
        ]
    );
}

#[test]
fn test_verbatim_identifier() {
    let result = scan("@class");
    assert_eq!(result.tokens[0].kind, SyntaxKind::Identifier);
    assert!(result.tokens[0].flags.contains(TokenFlags::VERBATIM));
}

#[test]
fn test_strings() {
    let text = r#""a\"b" @"c""d" $"x{y}z" 'q'"#;
    let result = scan(text);
    let k: Vec<SyntaxKind> = result.tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        k,
        vec![
            SyntaxKind::StringLiteral,
            SyntaxKind::StringLiteral,
            SyntaxKind::StringLiteral,
            SyntaxKind::CharacterLiteral,
            SyntaxKind::EndOfFileToken,
        ]
    );
    assert!(result.tokens.iter().all(|t| !t.is_unterminated()));
}

#[test]
fn test_unterminated_string_stops_at_line_end() {
    let result = scan("\"abc\nx");
    assert!(result.tokens[0].is_unterminated());
    assert_eq!(result.tokens[1].kind, SyntaxKind::Identifier);
    assert!(result.tokens[1].has_preceding_line_break());
}

#[test]
fn test_comments_are_trivia() {
    let text = "a // line\n/* block */ b /// doc\n#region x\nc";
    let result = scan(text);
    assert_eq!(
        result.tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::Identifier,
            SyntaxKind::Identifier,
            SyntaxKind::EndOfFileToken,
        ]
    );
    let comment_kinds: Vec<CommentKind> = result.comments.iter().map(|c| c.kind).collect();
    assert_eq!(
        comment_kinds,
        vec![
            CommentKind::Line,
            CommentKind::Block,
            CommentKind::Documentation,
            CommentKind::Directive,
        ]
    );
}

#[test]
fn test_comment_caret_containment() {
    let text = "x // list.\ny";
    let result = scan(text);
    let comment = result.comments[0];
    assert!(comment.contains_caret(text.find("list.").unwrap() as u32 + 5));
    assert!(!comment.contains_caret(comment.span.start));

    let block = scan("/* a */").comments[0];
    assert!(block.contains_caret(3));
    assert!(!block.contains_caret(7));
}

#[test]
fn test_generic_closers_are_separate_tokens() {
    let k = kinds("List<List<int>>");
    assert_eq!(k[5], SyntaxKind::GreaterThanToken);
    assert_eq!(k[6], SyntaxKind::GreaterThanToken);
}

#[test]
fn test_keyword_table_roundtrip() {
    assert_eq!(text_to_keyword("foreach"), Some(SyntaxKind::ForEachKeyword));
    assert_eq!(keyword_kind(SyntaxKind::ObjectKeyword), Some("object"));
    assert_eq!(text_to_keyword("var"), None);
    assert!(SyntaxKind::IntKeyword.is_predefined_type());
    assert!(!SyntaxKind::Identifier.is_keyword());
}
