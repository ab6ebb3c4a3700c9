//! Cleanup of user queries before they are embedded in a model prompt.

/// Longest query, in characters, that reaches the prompt.
pub const MAX_QUERY_CHARS: usize = 100;

fn is_stripped_control(c: char) -> bool {
    matches!(c, '\u{0000}'..='\u{001F}' | '\u{007F}'..='\u{009F}')
}

/// Removes control characters, neutralizes backticks and braces, and caps the length.
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !is_stripped_control(*c))
        .map(|c| match c {
            '`' => '\'',
            '{' => '(',
            '}' => ')',
            other => other,
        })
        .take(MAX_QUERY_CHARS)
        .collect()
}
