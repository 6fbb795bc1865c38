use thiserror::Error;

/// The cursor was asked to move past the last character.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("no more characters at index {index}")]
pub struct EndOfInput {
    /// The character index that was requested.
    pub index: usize,
}

/// A read cursor over the characters of a string.
///
/// The cursor starts *before* the first character, so the first call to
/// [`next`](Self::next) yields the character at index 0.
///
/// [`current`](Self::current) is lenient on a fresh cursor: it advances
/// once first, so calling it before any `next` yields the first character
/// and moves the cursor onto it.
///
/// # Examples
///
/// ```
/// use uri_template::template::CharCursor;
///
/// let mut cursor = CharCursor::new("ab");
/// assert_eq!(cursor.current(), Ok('a'));
/// assert_eq!(cursor.peek(), Ok('b'));
/// assert_eq!(cursor.next(), Ok('b'));
/// assert!(!cursor.has_next());
/// assert!(cursor.next().is_err());
/// ```
#[derive(Clone, Debug)]
pub struct CharCursor {
    chars: Vec<char>,
    // `None` before the first advance.
    pos: Option<usize>,
}

impl CharCursor {
    /// Creates a cursor positioned before the first character of `s`.
    #[must_use]
    pub fn new(s: &str) -> Self {
        Self {
            chars: s.chars().collect(),
            pos: None,
        }
    }

    fn next_index(&self) -> usize {
        self.pos.map_or(0, |i| i + 1)
    }

    /// Checks whether a character follows the current position.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.next_index() < self.chars.len()
    }

    /// Advances the cursor and returns the character it lands on.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the cursor is already at the last character.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<char, EndOfInput> {
        let index = self.next_index();
        let ch = *self.chars.get(index).ok_or(EndOfInput { index })?;
        self.pos = Some(index);
        Ok(ch)
    }

    /// Returns the character after the current position without advancing.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the cursor is already at the last character.
    pub fn peek(&self) -> Result<char, EndOfInput> {
        let index = self.next_index();
        self.chars.get(index).copied().ok_or(EndOfInput { index })
    }

    /// Returns the character at the cursor, advancing first on a fresh cursor.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the string is empty.
    pub fn current(&mut self) -> Result<char, EndOfInput> {
        match self.pos {
            Some(i) => Ok(self.chars[i]),
            None => self.next(),
        }
    }

    /// Returns the index of the character at the cursor, or `None` on a fresh cursor.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        self.pos
    }

    /// Moves the cursor onto the character at index `pos`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `pos` is not the index of a character.
    pub fn set_position(&mut self, pos: usize) -> Result<(), EndOfInput> {
        if pos >= self.chars.len() {
            return Err(EndOfInput { index: pos });
        }
        self.pos = Some(pos);
        Ok(())
    }

    /// Returns the number of characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Checks whether the string has no characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Collects the characters in `start..end` into a string.
    pub(crate) fn slice(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk() {
        let mut c = CharCursor::new("xyz");
        assert_eq!(c.position(), None);
        assert!(c.has_next());
        assert_eq!(c.peek(), Ok('x'));
        assert_eq!(c.next(), Ok('x'));
        assert_eq!(c.position(), Some(0));
        assert_eq!(c.next(), Ok('y'));
        assert_eq!(c.next(), Ok('z'));
        assert!(!c.has_next());
        assert_eq!(c.peek(), Err(EndOfInput { index: 3 }));
        assert_eq!(c.next(), Err(EndOfInput { index: 3 }));
        // A failed advance leaves the cursor in place.
        assert_eq!(c.current(), Ok('z'));
    }

    #[test]
    fn current_primes_fresh_cursor() {
        let mut c = CharCursor::new("ab");
        assert_eq!(c.current(), Ok('a'));
        assert_eq!(c.position(), Some(0));
        // Only the first call advances.
        assert_eq!(c.current(), Ok('a'));
        assert_eq!(c.next(), Ok('b'));

        let mut empty = CharCursor::new("");
        assert!(empty.is_empty());
        assert_eq!(empty.current(), Err(EndOfInput { index: 0 }));
        assert!(!empty.has_next());
    }

    #[test]
    fn set_position_bounds() {
        let mut c = CharCursor::new("äbc");
        assert_eq!(c.len(), 3);
        assert_eq!(c.set_position(2), Ok(()));
        assert_eq!(c.current(), Ok('c'));
        assert_eq!(c.set_position(3), Err(EndOfInput { index: 3 }));
        assert_eq!(c.position(), Some(2));
        c.set_position(0).unwrap();
        assert_eq!(c.next(), Ok('b'));
        assert_eq!(c.slice(0, 2), "äb");
    }
}
