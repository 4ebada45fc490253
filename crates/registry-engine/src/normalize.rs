//! Whitespace normalization for OCR text
//!
//! Every whitespace run (newlines, tabs, NBSP, ideographic space) becomes a
//! single ASCII space and the ends are trimmed. Full-width digits and
//! separators are folded to ASCII and zero-width characters are dropped.
//! The function is idempotent and keeps every digit and Hangul syllable.

/// Collapse whitespace and fold OCR width variants
pub fn normalize(text: &str) -> String {
    let folded: String = text.chars().filter_map(fold_char).collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// [`normalize`], also returning the byte offset in the output where each
/// non-blank input line begins
pub fn normalize_lines(text: &str) -> (String, Vec<usize>) {
    let mut out = String::with_capacity(text.len());
    let mut line_starts = Vec::new();
    for line in text.lines() {
        let line = normalize(line);
        if line.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        line_starts.push(out.len());
        out.push_str(&line);
    }
    (out, line_starts)
}

fn fold_char(c: char) -> Option<char> {
    match c {
        '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}' => None,
        '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32),
        '，' => Some(','),
        '．' => Some('.'),
        '－' | '‐' | '‑' | '–' => Some('-'),
        '（' => Some('('),
        '）' => Some(')'),
        _ => Some(c),
    }
}
