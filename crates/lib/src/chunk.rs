//! Splitting long text into chat-sized messages.

use std::mem;

/// Splits `text` into chunks of at most `limit` characters.
///
/// Chunks are assembled from whole lines (each keeping its `\n`), so joining the
/// chunks gives back `text` exactly. A line longer than `limit` on its own is the
/// only thing ever cut, at character boundaries.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();

        if line_len > limit {
            if !current.is_empty() {
                chunks.push(mem::take(&mut current));
            }
            current_len = 0;
            for ch in line.chars() {
                if current_len == limit {
                    chunks.push(mem::take(&mut current));
                    current_len = 0;
                }
                current.push(ch);
                current_len += 1;
            }
            continue;
        }

        if current_len + line_len > limit {
            chunks.push(mem::take(&mut current));
            current_len = 0;
        }
        current.push_str(line);
        current_len += line_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
