//! Auto-pairing of brackets and quotes.
//!
//! Typing an opener inserts its closer as well, or wraps the selection. With
//! `pair_delete` on, backspace between an empty pair removes both halves.
//! Only the characters directly around the cursor are looked at; there is no
//! balance tracking.

use thiserror::Error;

use crate::core::session::Session;

/// Opener/closer table
pub const PAIRS: [(char, char); 5] = [('"', '"'), ('\'', '\''), ('(', ')'), ('[', ']'), ('{', '}')];

/// Closer for an opener, if `ch` is one
pub fn closer_for(ch: char) -> Option<char> {
    PAIRS.iter().find(|(open, _)| *open == ch).map(|(_, close)| *close)
}

fn is_empty_pair(before: char, after: char) -> bool {
    PAIRS.iter().any(|&(open, close)| open == before && close == after)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AutoPairError {
    #[error("cursor {cursor} is past the end of the buffer ({len} bytes)")]
    CursorOutOfRange { cursor: usize, len: usize },

    #[error("cursor {0} is not on a character boundary")]
    NotCharBoundary(usize),

    #[error("selection {start}..{end} does not fit the buffer")]
    BadSelection { start: usize, end: usize },
}

/// The pairing rules currently in force
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoPair {
    pub enabled: bool,
    pub pair_delete: bool,
}

impl Default for AutoPair {
    fn default() -> Self {
        Self {
            enabled: true,
            pair_delete: true,
        }
    }
}

impl AutoPair {
    pub fn new(enabled: bool, pair_delete: bool) -> Self {
        Self {
            enabled,
            pair_delete,
        }
    }

    /// Handle a typed character.
    ///
    /// Returns `Ok(true)` when the keystroke was consumed, `Ok(false)` when the
    /// character is not an opener (or pairing is off) and should be inserted
    /// normally.
    pub fn handle_char(&self, session: &mut Session, ch: char) -> Result<bool, AutoPairError> {
        if !self.enabled {
            return Ok(false);
        }
        let Some(close) = closer_for(ch) else {
            return Ok(false);
        };
        check_cursor(session)?;

        match session.selection() {
            Some((start, end)) => {
                if !session.buffer.is_char_boundary(start) || !session.buffer.is_char_boundary(end) {
                    return Err(AutoPairError::BadSelection { start, end });
                }
                session.buffer.group(|buf| {
                    buf.insert_char(end, close);
                    buf.insert_char(start, ch);
                });
                session.cursor = end + ch.len_utf8() + close.len_utf8();
                session.anchor = None;
            }
            None => {
                let cursor = session.cursor;
                session.buffer.group(|buf| {
                    buf.insert_char(cursor, ch);
                    buf.insert_char(cursor + ch.len_utf8(), close);
                });
                session.cursor = cursor + ch.len_utf8();
            }
        }
        session.goal_column = None;
        Ok(true)
    }

    /// Handle backspace. Returns `Ok(true)` when an empty pair was removed.
    pub fn handle_backspace(&self, session: &mut Session) -> Result<bool, AutoPairError> {
        if !self.enabled || !self.pair_delete || session.selection().is_some() {
            return Ok(false);
        }
        check_cursor(session)?;

        let cursor = session.cursor;
        let (Some(before), Some(after)) = (
            session.buffer.char_before(cursor),
            session.buffer.char_at(cursor),
        ) else {
            return Ok(false);
        };
        if !is_empty_pair(before, after) {
            return Ok(false);
        }

        let start = cursor - before.len_utf8();
        session
            .buffer
            .group(|buf| buf.delete(start, before.len_utf8() + after.len_utf8()));
        session.cursor = start;
        session.goal_column = None;
        Ok(true)
    }
}

fn check_cursor(session: &Session) -> Result<(), AutoPairError> {
    let len = session.buffer.len();
    if session.cursor > len {
        return Err(AutoPairError::CursorOutOfRange {
            cursor: session.cursor,
            len,
        });
    }
    if !session.buffer.is_char_boundary(session.cursor) {
        return Err(AutoPairError::NotCharBoundary(session.cursor));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::id::SessionId;

    fn session(text: &str, cursor: usize) -> Session {
        let mut s = Session::new(SessionId(0));
        s.insert_str(text);
        s.buffer.break_undo_group();
        s.cursor = cursor;
        s
    }

    #[test]
    fn test_opener_inserts_pair_and_centres_cursor() {
        let pair = AutoPair::default();
        let mut s = session("", 0);
        assert_eq!(pair.handle_char(&mut s, '('), Ok(true));
        assert_eq!(s.text(), "()");
        assert_eq!(s.cursor, 1);
    }

    #[test]
    fn test_every_opener_has_its_closer() {
        let pair = AutoPair::default();
        for (open, close) in PAIRS {
            let mut s = session("x", 1);
            assert_eq!(pair.handle_char(&mut s, open), Ok(true));
            assert_eq!(s.text(), format!("x{open}{close}"));
            assert_eq!(s.cursor, 2);
        }
    }

    #[test]
    fn test_non_opener_is_not_consumed() {
        let pair = AutoPair::default();
        let mut s = session("", 0);
        assert_eq!(pair.handle_char(&mut s, ')'), Ok(false));
        assert_eq!(pair.handle_char(&mut s, 'a'), Ok(false));
        assert_eq!(s.text(), "");
    }

    #[test]
    fn test_wraps_selection() {
        let pair = AutoPair::default();
        let mut s = session("abc", 0);
        s.set_mark();
        s.cursor = 3;
        assert_eq!(pair.handle_char(&mut s, '"'), Ok(true));
        assert_eq!(s.text(), "\"abc\"");
        assert_eq!(s.cursor, 5);
        assert!(s.selection().is_none());
    }

    #[test]
    fn test_wrap_with_reversed_selection_is_one_undo_step() {
        let pair = AutoPair::default();
        let mut s = session("say hi", 6);
        s.set_mark();
        s.cursor = 4;
        pair.handle_char(&mut s, '[').unwrap();
        assert_eq!(s.text(), "say [hi]");
        assert_eq!(s.cursor, 8);
        s.undo();
        assert_eq!(s.text(), "say hi");
    }

    #[test]
    fn test_backspace_removes_empty_pair() {
        let pair = AutoPair::default();
        let mut s = session("{}", 1);
        assert_eq!(pair.handle_backspace(&mut s), Ok(true));
        assert_eq!(s.text(), "");
        assert_eq!(s.cursor, 0);
        s.undo();
        assert_eq!(s.text(), "{}");
    }

    #[test]
    fn test_backspace_ignores_mismatched_pair() {
        let pair = AutoPair::default();
        let mut s = session("(]", 1);
        assert_eq!(pair.handle_backspace(&mut s), Ok(false));
        assert_eq!(s.text(), "(]");
    }

    #[test]
    fn test_backspace_fast_path_can_be_disabled() {
        let pair = AutoPair::new(true, false);
        let mut s = session("''", 1);
        assert_eq!(pair.handle_backspace(&mut s), Ok(false));
    }

    #[test]
    fn test_disabled_engine_consumes_nothing() {
        let pair = AutoPair::new(false, true);
        let mut s = session("()", 1);
        assert_eq!(pair.handle_char(&mut s, '('), Ok(false));
        assert_eq!(pair.handle_backspace(&mut s), Ok(false));
    }

    #[test]
    fn test_faults_are_reported() {
        let pair = AutoPair::default();
        let mut s = session("é", 1);
        assert_eq!(
            pair.handle_char(&mut s, '('),
            Err(AutoPairError::NotCharBoundary(1))
        );
        s.cursor = 10;
        assert_eq!(
            pair.handle_backspace(&mut s),
            Err(AutoPairError::CursorOutOfRange { cursor: 10, len: 2 })
        );
        assert_eq!(s.text(), "é");
    }
}
