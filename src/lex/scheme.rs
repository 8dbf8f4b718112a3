//! Scheme token kinds, for `.scm` files and the `#`/`$` expressions embedded
//! in LilyPond.
//!
//! An embedded expression is a `ParseScheme` frame with argcount 1: the
//! first complete atom or parenthesized list closes it again.

use super::kinds::{Transition, char_after, word_boundary};
use super::lilypond;
use super::words::{SCHEME_CONSTANTS, SCHEME_FUNCTIONS, SCHEME_KEYWORDS, SCHEME_VARIABLES};
use super::{Caps, Category, ContextId, ContextSpec, Mode, TokenKind};

crate::kind_enum! {
    pub enum SchemeKind {
        String, StringQuotedStart, StringQuotedEnd, StringQuoteEscape,
        Comment, LineComment, BlockCommentStart, BlockCommentEnd,
        OpenParen, CloseParen, VectorStart, Quote, Dot,
        Bool, Char, Number, Fraction, Float,
        Constant, Keyword, Function, Variable, Word,
        LilyPondStart, LilyPondEnd,
    }
}

crate::kind_enum! {
    pub enum SchemeContext {
        ParseScheme, ParseString, ParseBlockComment, ParseLilyPond,
    }
}

use SchemeContext as C;
use SchemeKind as K;

const WORD: &str = r#"[^()"{}\s]+"#;

impl SchemeKind {
    pub(crate) fn pattern(self) -> &'static str {
        match self {
            K::String | K::Comment => r"[^\s\S]",
            K::StringQuotedStart | K::StringQuotedEnd => "\"",
            K::StringQuoteEscape => r#"\\[\\"]"#,
            K::LineComment => ";.*",
            K::BlockCommentStart => "#!",
            K::BlockCommentEnd => "!#",
            K::OpenParen => r"\(",
            K::CloseParen => r"\)",
            K::VectorStart => r"#\(",
            K::Quote => "['`,]",
            K::Dot => r"\.",
            K::Bool => "#[tf]",
            K::Char => r"#\\(?:[a-z]+|.)",
            K::Number => r"-?\d+|#(?:b[0-1]+|o[0-7]+|x[0-9a-fA-F]+)|[-+]inf\.0|[-+]?nan\.0",
            K::Fraction => r"-?\d+/\d+",
            K::Float => r"-?(?:\d+\.\d*|\.\d+)(?:E\d+)?",
            K::Constant | K::Keyword | K::Function | K::Variable | K::Word => WORD,
            K::LilyPondStart => r"#\{",
            K::LilyPondEnd => r"#\}",
        }
    }

    pub(crate) fn refine(self, text: &str, start: usize, end: usize) -> Option<usize> {
        let word = &text[start..end];
        match self {
            K::Dot => char_after(text, end).is_none_or(char::is_whitespace).then_some(end),
            K::Bool => word_boundary(text, end).then_some(end),
            K::Number | K::Fraction | K::Float => {
                char_after(text, end).is_none_or(|c| c == ')' || c.is_whitespace()).then_some(end)
            }
            K::Constant => crate::words!(SCHEME_CONSTANTS).contains(word).then_some(end),
            K::Keyword => crate::words!(SCHEME_KEYWORDS).contains(word).then_some(end),
            K::Function => crate::words!(SCHEME_FUNCTIONS).contains(word).then_some(end),
            K::Variable => crate::words!(SCHEME_VARIABLES).contains(word).then_some(end),
            _ => Some(end),
        }
    }

    pub(crate) fn caps(self) -> Caps {
        match self {
            K::OpenParen | K::VectorStart | K::LilyPondStart => Caps::MATCH_START | Caps::INDENT,
            K::CloseParen => Caps::MATCH_END | Caps::DEDENT,
            K::LilyPondEnd => Caps::MATCH_END | Caps::DEDENT | Caps::LEAVER,
            K::BlockCommentEnd => Caps::LEAVER,
            K::Bool | K::Char | K::Number | K::Fraction | K::Float => Caps::ITEM,
            K::Constant | K::Keyword | K::Function | K::Variable | K::Word => Caps::ITEM,
            _ => Caps::empty(),
        }
    }

    pub(crate) fn category(self) -> Category {
        match self {
            K::String => Category::STRING,
            K::StringQuotedStart => Category::STRING | Category::STRING_START,
            K::StringQuotedEnd => Category::STRING | Category::STRING_END,
            K::StringQuoteEscape | K::Char => Category::CHARACTER,
            K::Comment | K::LineComment | K::BlockCommentStart | K::BlockCommentEnd => Category::COMMENT,
            K::Number | K::Fraction | K::Float => Category::NUMERIC,
            _ => Category::empty(),
        }
    }

    pub(crate) fn matchname(self) -> Option<&'static str> {
        match self {
            K::OpenParen | K::VectorStart | K::CloseParen => Some("schemeparen"),
            K::LilyPondStart | K::LilyPondEnd => Some("schemelily"),
            _ => None,
        }
    }

    pub(crate) fn transition(self) -> Transition {
        match self {
            K::StringQuotedStart => Transition::Enter(scheme(C::ParseString)),
            K::StringQuotedEnd | K::CloseParen | K::LilyPondEnd => Transition::LeaveEndArgument,
            K::BlockCommentStart => Transition::Enter(scheme(C::ParseBlockComment)),
            K::BlockCommentEnd => Transition::Leave,
            K::OpenParen | K::VectorStart => Transition::Enter(scheme(C::ParseScheme)),
            K::LilyPondStart => Transition::Enter(scheme(C::ParseLilyPond)),
            k if k.caps().contains(Caps::ITEM) => Transition::EndArgument,
            _ => Transition::Hook,
        }
    }

    /// Atoms the tree builder keeps as a single item.
    pub fn is_atom(self) -> bool {
        matches!(
            self,
            K::Dot
                | K::Bool
                | K::Char
                | K::Number
                | K::Fraction
                | K::Float
                | K::Constant
                | K::Keyword
                | K::Function
                | K::Variable
                | K::Word
        )
    }
}

fn scheme(ctx: SchemeContext) -> ContextId {
    ContextId::Scheme(ctx)
}

fn sk(kinds: &[SchemeKind]) -> Vec<TokenKind> {
    kinds.iter().map(|&k| TokenKind::Scheme(k)).collect()
}

pub(crate) fn spec(ctx: SchemeContext) -> ContextSpec {
    match ctx {
        C::ParseScheme => ContextSpec::new(
            [
                vec![TokenKind::Space],
                sk(&[
                    K::OpenParen,
                    K::CloseParen,
                    K::LineComment,
                    K::BlockCommentStart,
                    K::LilyPondStart,
                    K::VectorStart,
                    K::Dot,
                    K::Bool,
                    K::Char,
                    K::Quote,
                    K::Fraction,
                    K::Float,
                    K::Number,
                    K::Constant,
                    K::Keyword,
                    K::Function,
                    K::Variable,
                    K::Word,
                    K::StringQuotedStart,
                ]),
            ]
            .concat(),
        )
        .mode(Mode::Scheme),
        C::ParseString => {
            ContextSpec::new(sk(&[K::StringQuotedEnd, K::StringQuoteEscape])).default_kind(TokenKind::Scheme(K::String))
        }
        C::ParseBlockComment => ContextSpec::new(sk(&[K::BlockCommentEnd])).default_kind(TokenKind::Scheme(K::Comment)),
        C::ParseLilyPond => {
            ContextSpec::new([sk(&[K::LilyPondEnd]), lilypond::parse_music_items()].concat()).mode(Mode::LilyPond)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::State;

    fn kinds(text: &str) -> Vec<&'static str> {
        let mut state = State::for_mode(Mode::Scheme);
        state.tokens(text, 0).map(|t| t.kind.name()).filter(|k| *k != "Space").collect()
    }

    #[test]
    fn atoms_and_word_tables() {
        assert_eq!(
            kinds("(define x 1/2)"),
            ["OpenParen", "Keyword", "Word", "Fraction", "CloseParen"]
        );
        assert_eq!(kinds("(car '(#t 2.5 -3))"), ["OpenParen", "Function", "Quote", "OpenParen", "Bool", "Float", "Number", "CloseParen", "CloseParen"]);
        assert_eq!(kinds("#\\a \"s\\\"x\""), ["Char", "StringQuotedStart", "String", "StringQuoteEscape", "String", "StringQuotedEnd"]);
    }

    #[test]
    fn number_needs_a_delimiter() {
        assert_eq!(kinds("12abc"), ["Word"]);
        assert_eq!(kinds("(a . b)"), ["OpenParen", "Word", "Dot", "Word", "CloseParen"]);
    }

    #[test]
    fn block_comment_spans_lines() {
        let mut state = State::for_mode(Mode::Scheme);
        state.tokens("#! comment", 0).for_each(drop);
        assert_eq!(state.top(), scheme(C::ParseBlockComment));
        state.tokens("still !# x", 0).for_each(drop);
        assert_eq!(state.top(), scheme(C::ParseScheme));
    }

    #[test]
    fn embedded_expression_closes_after_one_form() {
        let mut state = State::new(ContextId::LilyPond(lilypond::LyContext::Global));
        state.enter_with(scheme(C::ParseScheme), 1);
        state.tokens("(list 1 2) ", 0).for_each(drop);
        assert_eq!(state.depth(), 1);
    }
}
