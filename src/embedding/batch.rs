//! Input preparation and request planning.

use std::ops::Range;

/// Trims `text` and keeps at most `max_chars` characters.
///
/// Counts Unicode scalar values, so a code point is never split.
pub fn prepare_text(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((cut, _)) => trimmed[..cut].to_string(),
        None => trimmed.to_string(),
    }
}

/// Splits `texts` into consecutive request ranges under a character budget.
///
/// Greedy: a text that would push the running total over the budget starts a
/// new range. A text larger than the whole budget gets a range of its own.
pub fn plan_batches<S: AsRef<str>>(texts: &[S], max_chars_per_batch: usize) -> Vec<Range<usize>> {
    let mut batches = Vec::new();
    let mut start = 0;
    let mut current_chars = 0usize;

    for (i, text) in texts.iter().enumerate() {
        let chars = text.as_ref().chars().count();
        if i > start && current_chars + chars > max_chars_per_batch {
            batches.push(start..i);
            start = i;
            current_chars = 0;
        }
        current_chars += chars;
    }

    if start < texts.len() {
        batches.push(start..texts.len());
    }

    batches
}
