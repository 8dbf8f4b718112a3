//! Parser contexts: the set of token kinds legal at one nesting point.
//!
//! Contexts are identified by a small `Copy` id; the full description
//! ([`ContextSpec`]) is produced by the owning dialect module and compiled
//! once (see `compiled.rs`). Context *behavior* (what happens when one of
//! its tokens has no transition of its own) is the dialect's `hook`.

use super::docbook::{self, DocBookContext};
use super::html::{self, HtmlContext};
use super::latex::{self, LatexContext};
use super::lilypond::{self, LyContext};
use super::scheme::{self, SchemeContext};
use super::texinfo::{self, TexinfoContext};
use super::{Mode, State, TokenKind};

/// Identifies a parser context class across all dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContextId {
    LilyPond(LyContext),
    Scheme(SchemeContext),
    Html(HtmlContext),
    Latex(LatexContext),
    Texinfo(TexinfoContext),
    DocBook(DocBookContext),
}

/// What a fallthrough context does when none of its kinds matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fallthrough {
    Leave,
    Replace(ContextId),
}

/// Static description of a context.
#[derive(Debug, Clone)]
pub(crate) struct ContextSpec {
    /// Candidate kinds in priority order.
    pub items: Vec<TokenKind>,
    /// Kind for text between matches; `None` means such text is `Unparsed`.
    pub default: Option<TokenKind>,
    pub mode: Option<Mode>,
    pub argcount: u32,
    pub fallthrough: Option<Fallthrough>,
}

impl ContextSpec {
    pub(crate) fn new(items: Vec<TokenKind>) -> Self {
        ContextSpec { items, default: Some(TokenKind::Unparsed), mode: None, argcount: 0, fallthrough: None }
    }

    pub(crate) fn default_kind(mut self, kind: TokenKind) -> Self {
        self.default = Some(kind);
        self
    }

    pub(crate) fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub(crate) fn argcount(mut self, argcount: u32) -> Self {
        self.argcount = argcount;
        self
    }

    pub(crate) fn fallthrough(mut self, action: Fallthrough) -> Self {
        self.fallthrough = Some(action);
        self.default = None;
        self
    }
}

impl ContextId {
    pub fn name(self) -> &'static str {
        match self {
            ContextId::LilyPond(c) => c.name(),
            ContextId::Scheme(c) => c.name(),
            ContextId::Html(c) => c.name(),
            ContextId::Latex(c) => c.name(),
            ContextId::Texinfo(c) => c.name(),
            ContextId::DocBook(c) => c.name(),
        }
    }

    /// Every context of every dialect.
    pub fn all() -> impl Iterator<Item = ContextId> {
        LyContext::ALL
            .iter()
            .map(|&c| ContextId::LilyPond(c))
            .chain(SchemeContext::ALL.iter().map(|&c| ContextId::Scheme(c)))
            .chain(HtmlContext::ALL.iter().map(|&c| ContextId::Html(c)))
            .chain(LatexContext::ALL.iter().map(|&c| ContextId::Latex(c)))
            .chain(TexinfoContext::ALL.iter().map(|&c| ContextId::Texinfo(c)))
            .chain(DocBookContext::ALL.iter().map(|&c| ContextId::DocBook(c)))
    }

    pub(crate) fn spec(self) -> ContextSpec {
        match self {
            ContextId::LilyPond(c) => lilypond::spec(c),
            ContextId::Scheme(c) => scheme::spec(c),
            ContextId::Html(c) => html::spec(c),
            ContextId::Latex(c) => latex::spec(c),
            ContextId::Texinfo(c) => texinfo::spec(c),
            ContextId::DocBook(c) => docbook::spec(c),
        }
    }

    /// Default argument count of a fresh frame of this context.
    pub fn default_argcount(self) -> u32 {
        super::compiled::compiled(self).spec.argcount
    }

    pub fn is_fallthrough(self) -> bool {
        super::compiled::compiled(self).spec.fallthrough.is_some()
    }

    /// Context behavior for tokens without a transition of their own.
    pub(crate) fn hook(self, kind: TokenKind, text: &str, state: &mut State) {
        match self {
            ContextId::LilyPond(c) => lilypond::hook(c, kind, text, state),
            ContextId::Html(_) | ContextId::Scheme(_) => {}
            ContextId::Latex(c) => latex::hook(c, kind, text, state),
            ContextId::Texinfo(_) => {}
            ContextId::DocBook(c) => docbook::hook(c, kind, text, state),
        }
    }
}
