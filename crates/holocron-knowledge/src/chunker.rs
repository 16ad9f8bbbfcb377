//! Document chunking — split text into overlapping character windows.

/// Split text into chunks of at most `chunk_size` characters, each starting
/// `overlap` characters before the previous one ended. Windows end on
/// whitespace when one is available in the back half of the window.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.trim().chars().collect();
    if chars.is_empty() || chunk_size == 0 {
        return Vec::new();
    }
    if chars.len() <= chunk_size {
        return vec![chars.iter().collect()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        let chunk_end = if end < chars.len() {
            find_break(&chars[start..end])
                .map(|offset| start + offset)
                .unwrap_or(end)
        } else {
            end
        };

        let chunk: String = chars[start..chunk_end].iter().collect();
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }
        if chunk_end >= chars.len() {
            break;
        }

        let step = chunk_end - start;
        start = if step <= overlap {
            chunk_end
        } else {
            chunk_end - overlap
        };
        // Do not start a window mid-word.
        while start < chunk_end && start > 0 && !chars[start - 1].is_whitespace() {
            start += 1;
        }
    }
    chunks
}

/// Position just past the last whitespace in the back half of `window`.
fn find_break(window: &[char]) -> Option<usize> {
    let min = window.len() / 2;
    window
        .iter()
        .rposition(|c| c.is_whitespace())
        .filter(|&pos| pos >= min)
        .map(|pos| pos + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_text_single_chunk() {
        assert_eq!(chunk_text("  Hello there  ", 1024, 200), vec!["Hello there"]);
        assert!(chunk_text("   ", 1024, 200).is_empty());
    }

    #[test]
    fn test_chunks_respect_size_and_overlap() {
        let text = "The dark side of the Force is a pathway to many abilities. ".repeat(60);
        let chunks = chunk_text(&text, 200, 50);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(!chunk.is_empty());
            assert!(chunk.chars().count() <= 200);
        }
        // Consecutive chunks share text.
        let tail: String = chunks[0].chars().rev().take(20).collect::<Vec<_>>().into_iter().rev().collect();
        assert!(chunks[1].contains(tail.trim()));
    }

    #[test]
    fn test_multibyte_text() {
        let text = "Dathomir Nightsister ā ö ü — ".repeat(80);
        let chunks = chunk_text(&text, 100, 20);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 100));
    }

    #[test]
    fn test_unbroken_text_terminates() {
        let text = "x".repeat(1000);
        let chunks = chunk_text(&text, 100, 200);
        assert_eq!(chunks.len(), 10);
    }
}
