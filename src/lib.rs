//! Lexing and reading LilyPond and the document formats that embed it.
//!
//! - [`lex`]: a context-stack lexer for LilyPond, Scheme, HTML, LaTeX,
//!   Texinfo and DocBook, with a state that can be frozen at line ends.
//! - [`music`]: the item tree of a LilyPond document, musical time in exact
//!   fractions and variable lookup across `\include`d files.
//!
//! The functions at the crate root are the usual entry points.

#[macro_use]
mod macros;
mod api;
mod error;

pub mod lex;
pub mod music;

pub use api::{
    FileLoader, Options, build_document, build_document_with, freeze, fs_loader, guess_state, load_document, scan,
    state_for, thaw,
};
pub use error::{Error, Result};
pub use lex::{FrozenState, Mode, State, Token, TokenKind, tokenize};
pub use music::{Document, Duration, Fraction, ItemId, ItemKind};
