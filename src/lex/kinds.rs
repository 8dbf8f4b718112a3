//! Token kinds, capability tags and transition effects.
//!
//! A kind is pure data: a coarse pattern, an optional refinement step, a set
//! of capability tags and one transition effect. The dialect modules own the
//! tables; this module only dispatches into them.
//!
//! ## Two-phase matching
//!
//! The `regex` crate has no lookaround, so every pattern here is *coarse*: it
//! may accept slightly more than the construct it stands for. After the
//! coarse pattern matched at some offset, [`TokenKind::refine`] gets the span
//! and either confirms it (possibly with a different end), or rejects it so
//! the next candidate kind is tried at the same offset. Word-table kinds
//! (keywords, context names, grob names, ...) are resolved entirely in the
//! refinement step.

use super::ContextId;
use super::State;
use super::docbook::DocBookKind;
use super::html::HtmlKind;
use super::latex::LatexKind;
use super::lilypond::LyKind;
use super::scheme::SchemeKind;
use super::texinfo::TexinfoKind;
use std::collections::HashSet;

bitflags::bitflags! {
    /// Capability tags carried by a token kind.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Caps: u8 {
        /// Consumes one pending argument slot.
        const ITEM        = 1 << 0;
        /// Pops its context on recognition.
        const LEAVER      = 1 << 1;
        const MATCH_START = 1 << 2;
        const MATCH_END   = 1 << 3;
        const INDENT      = 1 << 4;
        const DEDENT      = 1 << 5;
    }
}

bitflags::bitflags! {
    /// Broad token families, used by consumers that only care whether a
    /// token is whitespace, part of a comment or part of a string.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Category: u16 {
        const SPACE        = 1 << 0;
        const COMMENT      = 1 << 1;
        const STRING       = 1 << 2;
        const STRING_START = 1 << 3;
        const STRING_END   = 1 << 4;
        const CHARACTER    = 1 << 5;
        const NUMERIC      = 1 << 6;
        const ERROR        = 1 << 7;
    }
}

/// What recognizing a token does to the [`State`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    /// Ask the active context (its hook decides).
    Hook,
    EndArgument,
    Leave,
    Enter(ContextId),
    EnterArgs(ContextId, u32),
    Replace(ContextId),
    /// Closing delimiters: leave the inner context, then count as an argument.
    LeaveEndArgument,
    /// Kind-specific code in the dialect module.
    Custom,
}

/// Every token kind of every dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenKind {
    /// Text no candidate of a default-less context claimed.
    Unparsed,
    Space,
    /// Locally invalid input (also used for forced advances).
    Error,
    LilyPond(LyKind),
    Scheme(SchemeKind),
    Html(HtmlKind),
    Latex(LatexKind),
    Texinfo(TexinfoKind),
    DocBook(DocBookKind),
}

impl TokenKind {
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Unparsed => "Unparsed",
            TokenKind::Space => "Space",
            TokenKind::Error => "Error",
            TokenKind::LilyPond(k) => k.name(),
            TokenKind::Scheme(k) => k.name(),
            TokenKind::Html(k) => k.name(),
            TokenKind::Latex(k) => k.name(),
            TokenKind::Texinfo(k) => k.name(),
            TokenKind::DocBook(k) => k.name(),
        }
    }

    /// Coarse pattern. Never contains capture groups.
    pub(crate) fn pattern(self) -> &'static str {
        match self {
            TokenKind::Unparsed | TokenKind::Error => r"[^\s\S]",
            TokenKind::Space => r"\s+",
            TokenKind::LilyPond(k) => k.pattern(),
            TokenKind::Scheme(k) => k.pattern(),
            TokenKind::Html(k) => k.pattern(),
            TokenKind::Latex(k) => k.pattern(),
            TokenKind::Texinfo(k) => k.pattern(),
            TokenKind::DocBook(k) => k.pattern(),
        }
    }

    /// Confirms (and possibly shortens) a coarse match `start..end`.
    pub(crate) fn refine(self, text: &str, start: usize, end: usize) -> Option<usize> {
        match self {
            TokenKind::Unparsed | TokenKind::Space | TokenKind::Error => Some(end),
            TokenKind::LilyPond(k) => k.refine(text, start, end),
            TokenKind::Scheme(k) => k.refine(text, start, end),
            TokenKind::Html(k) => k.refine(text, start, end),
            TokenKind::Latex(k) => k.refine(text, start, end),
            TokenKind::Texinfo(k) => k.refine(text, start, end),
            TokenKind::DocBook(k) => k.refine(text, start, end),
        }
    }

    pub fn caps(self) -> Caps {
        match self {
            TokenKind::Unparsed | TokenKind::Space | TokenKind::Error => Caps::empty(),
            TokenKind::LilyPond(k) => k.caps(),
            TokenKind::Scheme(k) => k.caps(),
            TokenKind::Html(k) => k.caps(),
            TokenKind::Latex(k) => k.caps(),
            TokenKind::Texinfo(k) => k.caps(),
            TokenKind::DocBook(k) => k.caps(),
        }
    }

    pub fn category(self) -> Category {
        match self {
            TokenKind::Unparsed => Category::empty(),
            TokenKind::Space => Category::SPACE,
            TokenKind::Error => Category::ERROR,
            TokenKind::LilyPond(k) => k.category(),
            TokenKind::Scheme(k) => k.category(),
            TokenKind::Html(k) => k.category(),
            TokenKind::Latex(k) => k.category(),
            TokenKind::Texinfo(k) => k.category(),
            TokenKind::DocBook(k) => k.category(),
        }
    }

    /// Bracket family used for balance checking, if any.
    pub fn matchname(self) -> Option<&'static str> {
        match self {
            TokenKind::LilyPond(k) => k.matchname(),
            TokenKind::Scheme(k) => k.matchname(),
            _ => None,
        }
    }

    pub(crate) fn transition(self) -> Transition {
        match self {
            TokenKind::Unparsed | TokenKind::Space | TokenKind::Error => Transition::Hook,
            TokenKind::LilyPond(k) => k.transition(),
            TokenKind::Scheme(k) => k.transition(),
            TokenKind::Html(k) => k.transition(),
            TokenKind::Latex(k) => k.transition(),
            TokenKind::Texinfo(k) => k.transition(),
            TokenKind::DocBook(k) => k.transition(),
        }
    }

    pub(crate) fn custom(self, text: &str, state: &mut State) {
        if let TokenKind::LilyPond(k) = self {
            k.custom(text, state)
        }
    }

    pub fn is_space(self) -> bool {
        self.category().contains(Category::SPACE)
    }

    pub fn is_comment(self) -> bool {
        self.category().contains(Category::COMMENT)
    }

    pub fn as_lilypond(self) -> Option<LyKind> {
        match self {
            TokenKind::LilyPond(k) => Some(k),
            _ => None,
        }
    }

    pub fn as_scheme(self) -> Option<SchemeKind> {
        match self {
            TokenKind::Scheme(k) => Some(k),
            _ => None,
        }
    }
}

// --- Refinement helpers -----------------------------------------------------

pub(crate) fn char_after(text: &str, pos: usize) -> Option<char> {
    text.get(pos..).and_then(|s| s.chars().next())
}

pub(crate) fn char_before(text: &str, pos: usize) -> Option<char> {
    text.get(..pos).and_then(|s| s.chars().next_back())
}

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// `(?![A-Za-z])` at `pos`.
pub(crate) fn not_alpha_at(text: &str, pos: usize) -> bool {
    !char_after(text, pos).is_some_and(|c| c.is_ascii_alphabetic())
}

/// `(?!\d)` at `pos`.
pub(crate) fn not_digit_at(text: &str, pos: usize) -> bool {
    !char_after(text, pos).is_some_and(|c| c.is_ascii_digit())
}

/// `\b` at `pos`.
pub(crate) fn word_boundary(text: &str, pos: usize) -> bool {
    let before = char_before(text, pos).is_some_and(is_word_char);
    let after = char_after(text, pos).is_some_and(is_word_char);
    before != after
}

/// How a word-table entry must end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WordEnd {
    /// `(?![A-Za-z])`
    NotAlpha,
    /// `\b`
    Boundary,
}

/// Longest entry of `table` that starts at `from` (after any prefix the
/// coarse pattern consumed) and ends at a legal position no further than `end`.
pub(crate) fn word_in(
    text: &str,
    from: usize,
    end: usize,
    table: &HashSet<&'static str>,
    word_end: WordEnd,
) -> Option<usize> {
    let run = text.get(from..end)?;
    let mut stops: Vec<usize> = run
        .char_indices()
        .map(|(i, c)| from + i + c.len_utf8())
        .filter(|&p| match word_end {
            WordEnd::NotAlpha => not_alpha_at(text, p),
            WordEnd::Boundary => !char_after(text, p).is_some_and(is_word_char),
        })
        .collect();
    stops.reverse();
    stops.into_iter().find(|&p| table.contains(&text[from..p]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_in_prefers_the_longest_entry() {
        let table: HashSet<&'static str> = ["staff", "staff-space"].into_iter().collect();
        let text = "staff-space 1";
        assert_eq!(word_in(text, 0, 11, &table, WordEnd::NotAlpha), Some(11));
        let text = "staff-x";
        assert_eq!(word_in(text, 0, 7, &table, WordEnd::NotAlpha), Some(5));
    }

    #[test]
    fn word_in_respects_boundaries() {
        let table: HashSet<&'static str> = ["Staff"].into_iter().collect();
        assert_eq!(word_in("Staff2", 0, 6, &table, WordEnd::Boundary), None);
        assert_eq!(word_in("Staff.x", 0, 5, &table, WordEnd::Boundary), Some(5));
        assert!(word_boundary("a b", 2));
        assert!(!word_boundary("ab", 1));
    }
}
