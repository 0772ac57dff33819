use super::*;

#[test]
fn test_line_map_simple() {
    let source = "line1\nline2\nline3";
    let map = LineMap::build(source);

    assert_eq!(map.line_count(), 3);
    assert_eq!(map.offset_to_position(0, source), Position::new(0, 0));
    assert_eq!(map.offset_to_position(4, source), Position::new(0, 4));
    assert_eq!(map.offset_to_position(6, source), Position::new(1, 0));
    assert_eq!(map.offset_to_position(12, source), Position::new(2, 0));
}

#[test]
fn test_line_map_windows_line_endings() {
    let source = "line1\r\nline2\r\nline3";
    let map = LineMap::build(source);

    assert_eq!(map.line_count(), 3);
    assert_eq!(map.offset_to_position(7, source), Position::new(1, 0));
    assert_eq!(map.position_to_offset(Position::new(2, 2), source), Some(16));
}

#[test]
fn test_position_to_offset_roundtrip() {
    let source = "var x = 1;\nlist.Select(s => s);\n";
    let map = LineMap::build(source);

    for offset in [0u32, 5, 11, 16, 20] {
        let pos = map.offset_to_position(offset, source);
        assert_eq!(map.position_to_offset(pos, source), Some(offset));
    }
}

#[test]
fn test_position_past_line_end_clamps() {
    let source = "ab\ncd";
    let map = LineMap::build(source);
    assert_eq!(map.position_to_offset(Position::new(0, 10), source), Some(2));
    assert_eq!(map.position_to_offset(Position::new(5, 0), source), None);
}
