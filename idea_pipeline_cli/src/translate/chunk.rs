//! Size-bounded splitting of text for the translation endpoint.
//!
//! Text is split on paragraphs first, then sentences, then hard character
//! boundaries, and neighbouring pieces are packed back together up to the
//! bound. Bounds are in characters, so a split never lands inside a code
//! point.

pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Greedily packs pieces into chunks no longer than `max_chars`.
struct Packer<'a> {
    max_chars: usize,
    separator: &'a str,
    current: Option<String>,
    chunks: Vec<String>,
}

impl<'a> Packer<'a> {
    fn new(max_chars: usize, separator: &'a str) -> Self {
        Self {
            max_chars,
            separator,
            current: None,
            chunks: Vec::new(),
        }
    }

    fn push(&mut self, piece: &str) {
        match self.current.as_mut() {
            Some(current)
                if char_len(current) + char_len(self.separator) + char_len(piece) <= self.max_chars =>
            {
                current.push_str(self.separator);
                current.push_str(piece);
            }
            _ => {
                self.flush();
                self.current = Some(piece.to_string());
            }
        }
    }

    fn push_chunk(&mut self, chunk: String) {
        self.flush();
        self.chunks.push(chunk);
    }

    fn flush(&mut self) {
        if let Some(current) = self.current.take() {
            self.chunks.push(current);
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.chunks
    }
}

/// Splits after `.`, `!` or `?` when followed by whitespace; the whitespace stays with the sentence.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let mut end = i + c.len_utf8();
        let mut saw_space = false;
        while let Some(&(j, next)) = chars.peek() {
            if !next.is_whitespace() {
                break;
            }
            saw_space = true;
            end = j + next.len_utf8();
            chars.next();
        }
        if saw_space || end == text.len() {
            sentences.push(&text[start..end]);
            start = end;
        }
    }

    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

fn hard_split(text: &str, max_chars: usize) -> Vec<String> {
    text.chars()
        .collect::<Vec<_>>()
        .chunks(max_chars)
        .map(|c| c.iter().collect())
        .collect()
}

fn split_paragraph(paragraph: &str, max_chars: usize) -> Vec<String> {
    let mut packer = Packer::new(max_chars, "");
    for sentence in split_sentences(paragraph) {
        if char_len(sentence) <= max_chars {
            packer.push(sentence);
        } else {
            for piece in hard_split(sentence, max_chars) {
                packer.push_chunk(piece);
            }
        }
    }
    packer.finish()
}

/// Splits `text` into chunks of at most `max_chars` characters.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    if char_len(text) <= max_chars {
        return vec![text.to_string()];
    }

    let mut packer = Packer::new(max_chars, PARAGRAPH_SEPARATOR);
    for paragraph in text.split(PARAGRAPH_SEPARATOR) {
        if char_len(paragraph) <= max_chars {
            packer.push(paragraph);
        } else {
            for piece in split_paragraph(paragraph, max_chars) {
                packer.push_chunk(piece);
            }
        }
    }
    packer.finish()
}

pub fn join_chunks<S: AsRef<str>>(chunks: &[S]) -> String {
    chunks
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<_>>()
        .join(PARAGRAPH_SEPARATOR)
}
