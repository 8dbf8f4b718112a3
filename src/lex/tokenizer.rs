//! The tokenizer loop.
//!
//! Repeatedly asks the active context for its next match. Text between
//! matches becomes a filler token of the context's default kind, and every
//! token's transition is applied to the state right before the token is
//! handed out, so a consumer always observes the state *after* the token.
//!
//! Fallthrough contexts only try to match at the current position; when
//! nothing matches they leave (or replace themselves) and the new top
//! context gets the same position. At the end of the text a fallthrough
//! context stays on the stack, so optional trailing structure can continue
//! on the next line.

use super::compiled::{Match, compiled};
use super::{Caps, Category, State, TokenKind};
use std::collections::VecDeque;

/// A recognized piece of text. Offsets are byte offsets into the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'t> {
    pub start: usize,
    pub end: usize,
    pub text: &'t str,
    pub kind: TokenKind,
}

impl<'t> Token<'t> {
    pub fn caps(&self) -> Caps {
        self.kind.caps()
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    pub fn matchname(&self) -> Option<&'static str> {
        self.kind.matchname()
    }
}

/// Iterator over the tokens of one text; see [`State::tokens`].
pub struct Tokens<'s, 't> {
    state: &'s mut State,
    text: &'t str,
    pos: usize,
    pending: VecDeque<Token<'t>>,
    finished: bool,
}

impl<'s, 't> Tokens<'s, 't> {
    pub(crate) fn new(state: &'s mut State, text: &'t str, start: usize) -> Self {
        // a start inside a character moves on to the next one
        let mut pos = start.min(text.len());
        while !text.is_char_boundary(pos) {
            pos += 1;
        }
        Tokens { state, text, pos, pending: VecDeque::new(), finished: false }
    }

    /// The state after the most recently returned token.
    pub fn state(&self) -> &State {
        self.state
    }

    fn token(&self, start: usize, end: usize, kind: TokenKind) -> Token<'t> {
        Token { start, end, text: &self.text[start..end], kind }
    }

    fn emit(&mut self, token: Token<'t>) -> Token<'t> {
        self.state.apply(token.kind, token.text);
        token
    }

    fn queue_match(&mut self, m: Match, default: Option<TokenKind>) {
        if let Some(default) = default.filter(|_| self.pos < m.start) {
            let filler = self.token(self.pos, m.start, default);
            self.pending.push_back(filler);
        }
        let token = self.token(m.start, m.end, m.kind);
        self.pending.push_back(token);
        self.pos = m.end;

        if m.end == m.start {
            // zero-width: step over one character, flagged
            if let Some(c) = self.text[m.end..].chars().next() {
                let end = m.end + c.len_utf8();
                let error = self.token(m.end, end, TokenKind::Error);
                self.pending.push_back(error);
                self.pos = end;
            } else {
                self.finished = true;
            }
        }
    }
}

impl<'s, 't> Iterator for Tokens<'s, 't> {
    type Item = Token<'t>;

    fn next(&mut self) -> Option<Token<'t>> {
        if let Some(token) = self.pending.pop_front() {
            return Some(self.emit(token));
        }
        if self.finished {
            return None;
        }
        loop {
            let ctx = compiled(self.state.top());
            let found = match ctx.spec.fallthrough {
                Some(_) => ctx.match_at(self.text, self.pos),
                None => ctx.search(self.text, self.pos),
            };
            if let Some(m) = found {
                self.queue_match(m, ctx.spec.default);
                let token = self.pending.pop_front()?;
                return Some(self.emit(token));
            }
            match ctx.spec.fallthrough {
                Some(action) if self.pos < self.text.len() => self.state.fallthrough(action),
                _ => break,
            }
        }

        self.finished = true;
        let ctx = compiled(self.state.top());
        match ctx.spec.default {
            Some(default) if self.pos < self.text.len() => {
                let token = self.token(self.pos, self.text.len(), default);
                self.pos = self.text.len();
                Some(self.emit(token))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::Mode;

    fn kinds(mode: Mode, text: &str) -> Vec<(String, &str)> {
        let mut state = State::for_mode(mode);
        state.tokens(text, 0).map(|t| (t.kind.name().to_string(), t.text)).collect()
    }

    #[test]
    fn filler_and_matches_cover_the_text() {
        let text = "\\version \"2.24.0\"\n{ c'4 d8. e16 }";
        let mut state = State::for_mode(Mode::LilyPond);
        let joined: String = state.tokens(text, 0).map(|t| t.text).collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn start_offset_is_honored() {
        let mut state = State::for_mode(Mode::LilyPond);
        let first = state.tokens("  { c }", 2).next().map(|t| (t.start, t.text));
        assert_eq!(first, Some((2, "{")));
    }

    #[test]
    fn fallthrough_leaves_before_parent_match() {
        let toks = kinds(Mode::LilyPond, "{ c4 d }");
        let names: Vec<&str> = toks.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["SequentialStart", "Space", "Note", "Length", "Space", "Note", "Space", "SequentialEnd"]);
    }
}
