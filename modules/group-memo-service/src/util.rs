//! Shared helpers for chat delivery.

/// Split a message into chunks respecting a platform's character limit.
/// Splits on line boundaries; lines exceeding `max_len` bytes are hard-split
/// on the nearest char boundary.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        if current.len() + line.len() + 1 > max_len {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            if line.len() > max_len {
                let mut remaining = line;
                while remaining.len() > max_len {
                    let cut = floor_char_boundary(remaining, max_len);
                    chunks.push(remaining[..cut].to_string());
                    remaining = &remaining[cut..];
                }
                current = remaining.to_string();
            } else {
                current = line.to_string();
            }
        } else {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

fn floor_char_boundary(s: &str, index: usize) -> usize {
    let mut i = index.min(s.len());
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    // A single char wider than the limit still has to go somewhere
    if i == 0 {
        s.char_indices().nth(1).map(|(j, _)| j).unwrap_or(s.len())
    } else {
        i
    }
}
