/// Renders the line of `source` holding `offset`, framed by `-` rules, with a
/// caret under the offending character:
///
/// ```text
/// -----
/// 1 + )
///     ^
/// -----
/// ```
///
/// `offset` is a byte offset as reported by the tokenizer, parser and
/// evaluator. Offsets past the end of the source point just after the last
/// character.
pub fn render_error_context(source: &str, offset: usize) -> String {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }

    let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line_end = source[offset..]
        .find('\n')
        .map_or(source.len(), |i| offset + i);
    let line = source[line_start..line_end].trim_end_matches('\r');

    let width = line.chars().count();
    let column = source[line_start..offset].chars().count().min(width);

    let rule = "-".repeat(width);
    format!("{rule}\n{line}\n{}^\n{rule}\n", " ".repeat(column))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caret_under_offset() {
        let rendered = render_error_context("1 + )", 4);
        assert_eq!(rendered, "-----\n1 + )\n    ^\n-----\n");
    }

    #[test]
    fn test_caret_at_start() {
        let rendered = render_error_context("@12", 0);
        assert_eq!(rendered, "---\n@12\n^\n---\n");
    }

    #[test]
    fn test_offset_past_end_is_clamped() {
        let rendered = render_error_context("1 +", 10);
        assert_eq!(rendered, "---\n1 +\n   ^\n---\n");
    }

    #[test]
    fn test_only_offending_line_is_shown() {
        let source = "1 +\n2 * )\n3";
        let rendered = render_error_context(source, 8);
        assert_eq!(rendered, "-----\n2 * )\n    ^\n-----\n");
    }

    #[test]
    fn test_columns_count_characters() {
        // 'é' is two bytes; the caret must still land under the '$'.
        let source = "é + $";
        let offset = source.find('$').unwrap();
        let rendered = render_error_context(source, offset);
        assert_eq!(rendered, "-----\né + $\n    ^\n-----\n");
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(render_error_context("", 0), "\n\n^\n\n");
    }
}
