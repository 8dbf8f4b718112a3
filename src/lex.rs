//! Multi-mode lexer.
//!
//! The lexer turns text into a flat stream of [`Token`]s while maintaining a
//! stack of parser contexts ([`State`]). Each context admits a fixed, ordered
//! set of token kinds; recognizing a token may enter, leave or replace
//! contexts, so one state can carry a LilyPond file across Scheme
//! expressions, markup, strings and comments, or an HTML/LaTeX/Texinfo/DocBook
//! document across its embedded LilyPond fragments.
//!
//! ## How the parts work together
//!
//! ```text
//!  dialect modules (lilypond, scheme, html, latex, texinfo, docbook)
//!      │ kinds: pattern + refine + caps + transition
//!      │ contexts: ContextSpec (items, default, mode, argcount, fallthrough)
//!      v
//!  compiled.rs ── one combined regex per context, built once
//!      │
//!      v
//!  tokenizer.rs ── Tokens iterator: leftmost match, filler, fallthrough
//!      │ every token's transition is applied to the State
//!      v
//!  state.rs ── frame stack, end_argument, freeze/thaw, Fridge
//! ```
//!
//! ## Responsibilities by module
//!
//! - `kinds.rs`: the cross-dialect [`TokenKind`] with its capability tags.
//! - `context.rs`: [`ContextId`] and the static context description.
//! - `state.rs`: [`State`], [`FrozenState`] and [`Fridge`].
//! - `tokenizer.rs`: [`Token`] and the [`Tokens`] iterator.
//! - `mode.rs`: [`Mode`], its root contexts and the guesser.
//! - `words.rs`: word tables (keywords, commands, grobs, Scheme words, ...).
//!
//! Tokenizing never fails: text no context accepts becomes `Unparsed` filler
//! or an `Error` token, and the root context is never popped.

#[path = "lex/compiled.rs"]
mod compiled;
#[path = "lex/context.rs"]
mod context;
#[path = "lex/kinds.rs"]
mod kinds;
#[path = "lex/mode.rs"]
mod mode;
#[path = "lex/state.rs"]
mod state;
#[path = "lex/tokenizer.rs"]
mod tokenizer;
#[path = "lex/words.rs"]
mod words;

#[path = "lex/docbook.rs"]
pub mod docbook;
#[path = "lex/html.rs"]
pub mod html;
#[path = "lex/latex.rs"]
pub mod latex;
#[path = "lex/lilypond.rs"]
pub mod lilypond;
#[path = "lex/scheme.rs"]
pub mod scheme;
#[path = "lex/texinfo.rs"]
pub mod texinfo;

#[cfg(test)]
#[path = "lex/tests.rs"]
mod tests;

pub(crate) use context::{ContextSpec, Fallthrough};
pub use context::ContextId;
pub use kinds::{Caps, Category, TokenKind};
pub use mode::Mode;
pub use state::{Fridge, Frame, FrozenState, State};
pub use tokenizer::{Token, Tokens};

pub(crate) use words::markup_nargs;

/// Tokenizes a whole text in `mode`, one line at a time, and returns the
/// tokens with absolute offsets.
///
/// Lines are fed separately (as an editor would), so this also exercises the
/// stack carrying state across line ends.
pub fn tokenize(text: &str, mode: Mode) -> Vec<Token<'_>> {
    let mut state = State::for_mode(mode);
    let mut out = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        for token in state.tokens(line, 0) {
            let start = offset + token.start;
            let end = offset + token.end;
            out.push(Token { start, end, text: &text[start..end], kind: token.kind });
        }
        offset += line.len();
    }
    out
}
