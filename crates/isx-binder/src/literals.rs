//! Types of literal tokens.

use isx_scanner::SyntaxKind;
use isx_solver::{SpecialType, TypeDatabase, TypeId};

/// Static type of a literal with token kind `token` and source `text`.
pub fn literal_type(db: &dyn TypeDatabase, token: SyntaxKind, text: &str) -> TypeId {
    match token {
        SyntaxKind::NumericLiteral => db.special(numeric_literal_type(text)),
        SyntaxKind::StringLiteral => db.special(SpecialType::String),
        SyntaxKind::CharacterLiteral => db.special(SpecialType::Char),
        SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword => db.special(SpecialType::Boolean),
        SyntaxKind::NullKeyword => TypeId::NULL,
        _ => TypeId::ERROR,
    }
}

/// `1` int, `1L` long, `1u` uint, `1.5` double, `1f` float, `1m` decimal.
/// Unsuffixed integers take the first of int, uint, long, ulong that holds
/// the value.
pub fn numeric_literal_type(text: &str) -> SpecialType {
    let lower = text.replace('_', "").to_ascii_lowercase();
    let (digits, radix) = if let Some(hex) = lower.strip_prefix("0x") {
        (hex, 16)
    } else if let Some(binary) = lower.strip_prefix("0b") {
        (binary, 2)
    } else {
        (lower.as_str(), 10)
    };

    if radix == 10 {
        match digits.chars().last() {
            Some('f') => return SpecialType::Single,
            Some('d') => return SpecialType::Double,
            Some('m') => return SpecialType::Decimal,
            _ => {}
        }
        if digits.contains('.') || digits.contains('e') {
            return SpecialType::Double;
        }
    }

    let (body, unsigned, long) = if let Some(body) = digits
        .strip_suffix("ul")
        .or_else(|| digits.strip_suffix("lu"))
    {
        (body, true, true)
    } else if let Some(body) = digits.strip_suffix('u') {
        (body, true, false)
    } else if let Some(body) = digits.strip_suffix('l') {
        (body, false, true)
    } else {
        (digits, false, false)
    };
    let value = u64::from_str_radix(body, radix).unwrap_or(u64::MAX);

    match (unsigned, long) {
        (false, false) if value <= i32::MAX as u64 => SpecialType::Int32,
        (false, false) | (true, false) if value <= u32::MAX as u64 => SpecialType::UInt32,
        (false, false) | (false, true) if value <= i64::MAX as u64 => SpecialType::Int64,
        _ => SpecialType::UInt64,
    }
}
