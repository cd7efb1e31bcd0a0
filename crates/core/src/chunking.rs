pub const DEFAULT_CHUNK_SIZE: usize = 100;

pub const PARAGRAPH_DELIMITER: &str = "\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

pub fn split_paragraphs(text: &str) -> Vec<String> {
    text.split(PARAGRAPH_DELIMITER).map(str::to_string).collect()
}

// Strides count chars, not bytes. A zero chunk size is treated as one.
pub fn chunk_paragraphs<S: AsRef<str>>(paragraphs: &[S], chunk_size: usize) -> Vec<String> {
    let stride = chunk_size.max(1);
    let mut chunks = Vec::new();

    for paragraph in paragraphs {
        let mut rest = paragraph.as_ref();
        while !rest.is_empty() {
            let split_at = rest
                .char_indices()
                .nth(stride)
                .map(|(offset, _)| offset)
                .unwrap_or(rest.len());
            let (head, tail) = rest.split_at(split_at);
            chunks.push(head.to_string());
            rest = tail;
        }
    }

    chunks
}

pub fn chunk_with_config<S: AsRef<str>>(paragraphs: &[S], config: ChunkingConfig) -> Vec<String> {
    chunk_paragraphs(paragraphs, config.chunk_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_reconstruct_the_paragraph() {
        let paragraph = "The hydraulic pump must be primed before the first start. ".repeat(7);
        for size in [1, 3, 10, 64, 100, 1_000] {
            let chunks = chunk_paragraphs(&[paragraph.as_str()], size);
            assert_eq!(chunks.concat(), paragraph, "chunk_size={size}");
        }
    }

    #[test]
    fn chunk_count_is_ceiling_of_length_over_size() {
        let paragraph = "a".repeat(250);
        assert_eq!(chunk_paragraphs(&[paragraph.as_str()], 100).len(), 3);
        assert_eq!(chunk_paragraphs(&[paragraph.as_str()], 50).len(), 5);
        assert_eq!(chunk_paragraphs(&[paragraph.as_str()], 251).len(), 1);
    }

    #[test]
    fn short_paragraph_is_a_single_chunk() {
        let chunks = chunk_paragraphs(&["short text"], DEFAULT_CHUNK_SIZE);
        assert_eq!(chunks, vec!["short text".to_string()]);
    }

    #[test]
    fn empty_paragraphs_and_inputs_yield_nothing() {
        let empty: [&str; 0] = [];
        assert!(chunk_paragraphs(&empty, 10).is_empty());
        assert!(chunk_paragraphs(&["", ""], 10).is_empty());

        let chunks = chunk_paragraphs(&["", "abcdef", ""], 4);
        assert_eq!(chunks, vec!["abcd".to_string(), "ef".to_string()]);
    }

    #[test]
    fn chunks_keep_paragraph_then_offset_order() {
        let chunks = chunk_paragraphs(&["abcde", "xyz"], 2);
        assert_eq!(chunks, vec!["ab", "cd", "e", "xy", "z"]);
        assert!(chunks.iter().all(|chunk| !chunk.is_empty()));
    }

    #[test]
    fn multibyte_text_is_split_on_characters() {
        let paragraph = "über straße café";
        let chunks = chunk_paragraphs(&[paragraph], 5);
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0], "über ");
        assert_eq!(chunks.concat(), paragraph);
        assert!(chunks.iter().all(|chunk| chunk.chars().count() <= 5));
    }

    #[test]
    fn zero_chunk_size_falls_back_to_single_characters() {
        let chunks = chunk_paragraphs(&["abc"], 0);
        assert_eq!(chunks, vec!["a", "b", "c"]);
    }

    #[test]
    fn paragraphs_split_on_blank_lines() {
        let paragraphs = split_paragraphs("first\n\nsecond line\nstill second\n\n\n\nlast");
        assert_eq!(
            paragraphs,
            vec!["first", "second line\nstill second", "", "last"]
        );
    }

    #[test]
    fn config_defaults_to_hundred_characters() {
        let paragraph = "x".repeat(201);
        let chunks = chunk_with_config(&[paragraph], ChunkingConfig::default());
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2], "x");
    }
}
