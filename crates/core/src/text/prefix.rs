use super::clamp_column;

fn is_prefix_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '.' | '$' | '(' | ')')
}

/// The expression text that completion should extend: everything left of
/// `column` made of name characters, dots and balanced call parentheses.
///
/// Inside a `)...(` pair any character is accepted so call arguments stay
/// attached to their callee; an unmatched `(` ends the prefix.
pub fn compute_prefix(line: &str, column: usize) -> &str {
    let end = clamp_column(line, column);
    let mut start = end;
    let mut depth = 0usize;

    for (idx, ch) in line[..end].char_indices().rev() {
        if depth == 0 && !is_prefix_char(ch) {
            break;
        }
        match ch {
            '(' if depth == 0 => break,
            '(' => depth -= 1,
            ')' => depth += 1,
            _ => {}
        }
        start = idx;
    }

    &line[start..end]
}
