//! Text folding and the fixed-width line fitting used on labels.

use unicode_normalization::UnicodeNormalization;

/// Characters per product-name line.
pub const NAME_LINE_CHARS: usize = 35;
/// Product-name lines printed on a label.
pub const NAME_MAX_LINES: usize = 2;
/// Notes longer than this are cut and suffixed with [`ELLIPSIS`].
pub const NOTES_MAX_CHARS: usize = 100;
/// Characters per notes line.
pub const NOTES_LINE_CHARS: usize = 45;
/// Notes lines printed on a label.
pub const NOTES_MAX_LINES: usize = 5;
pub const ELLIPSIS: &str = "...";

/// Fold text for searching: NFKD, drop everything outside ASCII, lowercase, trim.
///
/// Applying it twice yields the same string.
pub fn normalize_text(s: &str) -> String {
    let ascii: String = s.nfkd().filter(char::is_ascii).collect();
    ascii.to_lowercase().trim().to_string()
}

/// Fold a single character to its ASCII base letter, if it has one.
///
/// `é` folds to `e`, `œ` has no single-letter decomposition and yields `None`.
pub fn ascii_base(c: char) -> Option<char> {
    if c.is_ascii() {
        return Some(c);
    }
    let mut it = c.nfkd().filter(char::is_ascii);
    match (it.next(), it.next()) {
        (Some(b), None) => Some(b),
        _ => None,
    }
}

/// Split a product name into hard 35-character chunks, keeping the first two.
///
/// Characters past the second chunk are dropped.
pub fn wrap_product_name(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.trim().chars().collect();
    let lines: Vec<String> = chars
        .chunks(NAME_LINE_CHARS)
        .take(NAME_MAX_LINES)
        .map(|c| c.iter().collect())
        .collect();
    if chars.len() > NAME_LINE_CHARS * NAME_MAX_LINES {
        tracing::debug!(
            chars = chars.len(),
            "product name truncated to {} characters",
            NAME_LINE_CHARS * NAME_MAX_LINES
        );
    }
    lines
}

/// Trim notes and cut them to 100 characters plus an ellipsis.
pub fn truncate_notes(notes: &str) -> String {
    let t = notes.trim();
    if t.chars().count() > NOTES_MAX_CHARS {
        tracing::debug!("additional notes truncated to {NOTES_MAX_CHARS} characters");
        let mut out: String = t.chars().take(NOTES_MAX_CHARS).collect();
        out.push_str(ELLIPSIS);
        out
    } else {
        t.to_string()
    }
}

/// Greedy word wrap on whitespace.
///
/// A word longer than `width` is kept whole on its own line.
pub fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
        } else if line.chars().count() + 1 + word.chars().count() <= width {
            line.push(' ');
            line.push_str(word);
        } else {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Notes as printed: truncated, wrapped at 45 characters, at most 5 lines.
pub fn notes_lines(notes: &str) -> Vec<String> {
    let mut lines = wrap_words(&truncate_notes(notes), NOTES_LINE_CHARS);
    lines.truncate(NOTES_MAX_LINES);
    lines
}
