//! Position-seekable buffer shared by the tokenizer (over characters)
//! and the parser (over tokens).
//!
//! All lookahead is expressed as save/compare/restore of [`TokenBuffer::position`];
//! the buffer holds no other mutable state.

/// Reading past the last item of a [`TokenBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Unexpected end of input at position {position}")]
pub struct EndOfInput {
    pub position: usize,
}

/// Random-access view over a sequence of items with a movable cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenBuffer<T> {
    items: Vec<T>,
    position: usize,
}

impl<T: Clone> TokenBuffer<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items, position: 0 }
    }

    /// Return the item under the cursor and advance past it.
    pub fn get(&mut self) -> Result<T, EndOfInput> {
        let item = self
            .items
            .get(self.position)
            .cloned()
            .ok_or(EndOfInput {
                position: self.position,
            })?;
        self.position += 1;
        Ok(item)
    }

    /// Peek at an absolute position without moving the cursor.
    pub fn get_at(&self, position: usize) -> Option<&T> {
        self.items.get(position)
    }

    pub fn peek(&self) -> Option<&T> {
        self.get_at(self.position)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Move the cursor. Positions past the end are clamped to the end.
    pub fn set_position(&mut self, position: usize) {
        self.position = position.min(self.items.len());
    }

    /// True when no item is left after the cursor.
    pub fn is_empty(&self) -> bool {
        self.position >= self.items.len()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }
}

impl TokenBuffer<char> {
    pub fn from_source(source: &str) -> Self {
        Self::new(source.chars().collect())
    }

    /// True when the characters at the cursor spell `prefix`.
    pub fn starts_with(&self, prefix: &str) -> bool {
        prefix
            .chars()
            .enumerate()
            .all(|(offset, ch)| self.get_at(self.position + offset) == Some(&ch))
    }

    /// Collect the characters in `start..end` into a string.
    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.items.len());
        let start = start.min(end);
        self.items[start..end].iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_get_advances() {
        let mut buffer = TokenBuffer::from_source("ab");
        assert_eq!(buffer.get(), Ok('a'));
        assert_eq!(buffer.position(), 1);
        assert_eq!(buffer.get(), Ok('b'));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_get_past_end() {
        let mut buffer = TokenBuffer::from_source("a");
        buffer.get().unwrap();
        assert_eq!(buffer.get(), Err(EndOfInput { position: 1 }));
        // A failed read leaves the cursor where it was.
        assert_eq!(buffer.position(), 1);
    }

    #[test]
    fn test_peek_does_not_advance() {
        let buffer = TokenBuffer::from_source("xyz");
        assert_eq!(buffer.get_at(2), Some(&'z'));
        assert_eq!(buffer.peek(), Some(&'x'));
        assert_eq!(buffer.position(), 0);
        assert_eq!(buffer.get_at(3), None);
    }

    #[test]
    fn test_save_and_restore() {
        let mut buffer = TokenBuffer::from_source("hello");
        let saved = buffer.position();
        buffer.get().unwrap();
        buffer.get().unwrap();
        buffer.set_position(saved);
        assert_eq!(buffer.get(), Ok('h'));
    }

    #[test]
    fn test_set_position_clamps() {
        let mut buffer = TokenBuffer::from_source("ab");
        buffer.set_position(10);
        assert_eq!(buffer.position(), 2);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_starts_with() {
        let mut buffer = TokenBuffer::from_source("0x1F");
        assert!(buffer.starts_with("0x"));
        assert!(!buffer.starts_with("0b"));
        buffer.set_position(3);
        assert!(!buffer.starts_with("FF"));
    }

    #[test]
    fn test_buffer_over_arbitrary_items() {
        let mut buffer = TokenBuffer::new(vec![1, 2, 3]);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.get(), Ok(1));
        assert_eq!(buffer.peek(), Some(&2));
    }
}
