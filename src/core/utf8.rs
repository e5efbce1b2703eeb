//! Grapheme and column arithmetic shared by the cursor model and the screen.

use unicode_segmentation::UnicodeSegmentation;

/// Number of user-perceived characters in `text`
pub fn grapheme_count(text: &str) -> usize {
    text.graphemes(true).count()
}

/// Byte offset where grapheme `n` starts, if `text` has that many
pub fn grapheme_byte_index(text: &str, n: usize) -> Option<usize> {
    text.grapheme_indices(true).nth(n).map(|(idx, _)| idx)
}

/// Terminal columns taken by `c`; control characters take none
pub fn char_width(c: char) -> usize {
    unicode_width::UnicodeWidthChar::width(c).unwrap_or(0)
}

pub fn grapheme_width(g: &str) -> usize {
    g.chars().map(char_width).sum()
}

/// Screen column reached by the text before `byte_offset` on one line.
///
/// Tabs advance to the next multiple of `tab_width`.
pub fn visual_width_up_to(text: &str, byte_offset: usize, tab_width: usize) -> usize {
    let tab_width = tab_width.max(1);
    let mut col = 0;
    for (idx, grapheme) in text.grapheme_indices(true) {
        if idx >= byte_offset {
            break;
        }
        if grapheme == "\t" {
            col = (col / tab_width + 1) * tab_width;
        } else {
            col += grapheme_width(grapheme);
        }
    }
    col
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emoji_graphemes() {
        assert_eq!(grapheme_count("👋🌍"), 2);
        // Family emoji: Man + ZWJ + Woman + ZWJ + Boy
        assert_eq!(grapheme_count("👨‍👩‍👦"), 1);
        // "e" + acute accent
        assert_eq!(grapheme_count("e\u{0301}"), 1);
    }

    #[test]
    fn test_grapheme_byte_index() {
        let text = "A👋B";
        assert_eq!(grapheme_byte_index(text, 0), Some(0));
        assert_eq!(grapheme_byte_index(text, 1), Some(1));
        assert_eq!(grapheme_byte_index(text, 2), Some(5));
        assert_eq!(grapheme_byte_index(text, 3), None);
    }

    #[test]
    fn test_visual_width_with_tabs_and_wide_chars() {
        assert_eq!(visual_width_up_to("a\tb", 2, 4), 4);
        assert_eq!(visual_width_up_to("A👋B", 5, 4), 3);
        assert_eq!(visual_width_up_to("abc", 99, 4), 3);
    }
}
