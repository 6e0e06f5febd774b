/// Hard ceiling on a single outbound message, in bytes.
pub const MAX_MESSAGE_LEN: usize = 4096;

/// Splits `text` into word-preserving chunks of at most `max_len` bytes.
///
/// Text that already fits comes back unchanged as a single chunk. Longer text
/// is split on whitespace and greedily repacked with single spaces, so the
/// original whitespace runs (including newlines) are not preserved on this
/// path. A single word longer than `max_len` is emitted as its own oversized
/// chunk rather than split mid-word. Lengths are byte lengths.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        // The overflow check always budgets for a joining space, even when
        // the buffer is empty; an empty buffer is never sealed.
        if current.len() + word.len() + 1 > max_len && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_passes_through_unchanged() {
        let text = "hello there\n\nkeep my   spacing";
        assert_eq!(split_message(text, 4096), vec![text.to_string()]);
    }

    #[test]
    fn test_exact_limit_is_a_single_chunk() {
        let text = "a".repeat(4096);
        let chunks = split_message(&text, 4096);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 4096);
    }

    #[test]
    fn test_long_text_chunks_stay_within_limit() {
        let text = "word ".repeat(2000);
        let chunks = split_message(&text, 100);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= 100, "chunk of {} bytes", chunk.len());
        }
    }

    #[test]
    fn test_no_word_is_split_across_chunks() {
        let text = (0..500)
            .map(|i| format!("item{i}"))
            .collect::<Vec<_>>()
            .join(" ");
        let chunks = split_message(&text, 64);
        let rejoined = chunks.join(" ");
        let expected = text.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(rejoined, expected);
    }

    #[test]
    fn test_oversized_word_is_emitted_whole() {
        let giant = "x".repeat(50);
        let text = format!("before {giant} after more words to push past the limit");
        let chunks = split_message(&text, 10);
        assert!(chunks.iter().any(|c| c == &giant));
        for chunk in &chunks {
            assert!(chunk.len() <= 10 || chunk == &giant);
        }
    }

    #[test]
    fn test_lengths_are_bytes_not_chars() {
        // Each word is 12 bytes of UTF-8, far more than its 6 chars.
        let text = "привет ".repeat(100);
        let chunks = split_message(&text, 25);
        for chunk in &chunks {
            assert!(chunk.len() <= 25);
            for word in chunk.split(' ') {
                assert_eq!(word, "привет");
            }
        }
    }

    #[test]
    fn test_whitespace_only_long_text_yields_no_chunks() {
        let text = " ".repeat(5000);
        assert!(split_message(&text, 4096).is_empty());
    }
}
