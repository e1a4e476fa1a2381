//! Cursor editing for single-line form inputs.
//!
//! The value itself lives in `FormValues`; this type only tracks where the
//! cursor sits, counted in grapheme clusters, and edits the borrowed string.

use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldCursor {
    cursor: usize,
}

impl FieldCursor {
    /// Cursor placed after the last grapheme of `text`.
    #[must_use]
    pub fn at_end(text: &str) -> Self {
        Self {
            cursor: grapheme_count(text),
        }
    }

    #[must_use]
    pub fn position(self) -> usize {
        self.cursor
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self, text: &str) {
        self.cursor = self.cursor.saturating_add(1).min(grapheme_count(text));
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self, text: &str) {
        self.cursor = grapheme_count(text);
    }

    pub fn insert_char(&mut self, text: &mut String, c: char) {
        let before = grapheme_count(text);
        let index = byte_index_at(text, self.cursor);
        text.insert(index, c);
        // A combining mark merges into the previous grapheme.
        if grapheme_count(text) > before {
            self.cursor += 1;
        }
    }

    /// Delete the grapheme before the cursor.
    pub fn delete_char(&mut self, text: &mut String) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let start = byte_index_at(text, self.cursor - 1);
        let end = byte_index_at(text, self.cursor);
        text.replace_range(start..end, "");
        self.move_left();
        true
    }

    /// Delete the grapheme under the cursor.
    pub fn delete_char_forward(&mut self, text: &mut String) -> bool {
        if self.cursor >= grapheme_count(text) {
            return false;
        }
        let start = byte_index_at(text, self.cursor);
        let end = byte_index_at(text, self.cursor + 1);
        text.replace_range(start..end, "");
        true
    }

    pub fn delete_word_backwards(&mut self, text: &mut String) -> bool {
        let start = self.cursor;
        while self.cursor > 0 && grapheme_is_whitespace(text, self.cursor - 1) {
            self.delete_char(text);
        }
        while self.cursor > 0 && !grapheme_is_whitespace(text, self.cursor - 1) {
            self.delete_char(text);
        }
        self.cursor != start
    }

    /// Keep the cursor inside `text` after an external change.
    pub fn clamp(&mut self, text: &str) {
        self.cursor = self.cursor.min(grapheme_count(text));
    }
}

#[must_use]
pub fn grapheme_count(text: &str) -> usize {
    text.graphemes(true).count()
}

fn grapheme_is_whitespace(text: &str, index: usize) -> bool {
    text.graphemes(true)
        .nth(index)
        .is_some_and(|grapheme| grapheme.chars().all(char::is_whitespace))
}

fn byte_index_at(text: &str, grapheme_index: usize) -> usize {
    text.grapheme_indices(true)
        .nth(grapheme_index)
        .map_or(text.len(), |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::FieldCursor;

    #[test]
    fn insert_and_delete_in_the_middle() {
        let mut text = "Mara".to_string();
        let mut cursor = FieldCursor::at_end(&text);
        cursor.move_left();
        cursor.move_left();
        cursor.insert_char(&mut text, 'r');
        assert_eq!(text, "Marra");
        assert_eq!(cursor.position(), 3);

        assert!(cursor.delete_char(&mut text));
        assert_eq!(text, "Mara");
        assert!(cursor.delete_char_forward(&mut text));
        assert_eq!(text, "Maa");
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn cursor_counts_graphemes() {
        let mut text = "Jos\u{e9}".to_string();
        let mut cursor = FieldCursor::at_end(&text);
        assert_eq!(cursor.position(), 4);
        cursor.move_right(&text);
        assert_eq!(cursor.position(), 4);

        // "e" followed by a combining acute accent stays one grapheme.
        let mut text2 = "Jose".to_string();
        let mut cursor2 = FieldCursor::at_end(&text2);
        cursor2.insert_char(&mut text2, '\u{301}');
        assert_eq!(cursor2.position(), 4);
        assert!(cursor2.delete_char(&mut text2));
        assert_eq!(text2, "Jos");

        cursor.move_home();
        assert!(!cursor.delete_char(&mut text));
    }

    #[test]
    fn delete_word_backwards_skips_trailing_space() {
        let mut text = "Rua das Flores  ".to_string();
        let mut cursor = FieldCursor::at_end(&text);
        assert!(cursor.delete_word_backwards(&mut text));
        assert_eq!(text, "Rua das ");
        assert!(cursor.delete_word_backwards(&mut text));
        assert_eq!(text, "Rua ");
    }

    #[test]
    fn clamp_after_external_reset() {
        let mut text = "abc".to_string();
        let mut cursor = FieldCursor::at_end(&text);
        text.clear();
        cursor.clamp(&text);
        assert_eq!(cursor.position(), 0);
    }
}
