use std::fmt;

/// The reference text for one round. Indexed by character, not byte.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Paragraph {
    chars: Vec<char>,
}

impl Paragraph {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<char> {
        self.chars.get(idx).copied()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn word_count(&self) -> usize {
        self.to_string().split_whitespace().count()
    }
}

impl From<String> for Paragraph {
    fn from(text: String) -> Self {
        Self::new(&text)
    }
}

impl From<&str> for Paragraph {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl fmt::Display for Paragraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.chars.iter().try_for_each(|c| write!(f, "{c}"))
    }
}
