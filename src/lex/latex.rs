//! LaTeX with embedded LilyPond (`lilypond-book` style).
//!
//! ```text
//! \begin{lilypond}[opts] ... \end{lilypond}   whole file
//! \lilypond[opts]{ music }                    inline music
//! \lilypondfile[opts]{file.ly}                file reference
//! ```

use super::kinds::{Transition, not_alpha_at};
use super::lilypond;
use super::{Caps, Category, ContextId, ContextSpec, Fallthrough, Mode, State, TokenKind};

crate::kind_enum! {
    pub enum LatexKind {
        Comment, LineComment, CommentEnvStart, CommentEnvEnd,
        Verbatim, VerbatimStart, VerbatimEnd,
        Command, EscapedChar, OpenBrace, CloseBrace, Math,
        Option, OptionsStart, OptionsEnd,
        LilyPondEnvStart, LilyPondEnvEnd,
        LilyPondInline, LilyPondInlineStart, LilyPondInlineEnd,
        LilyPondFile, LilyPondFileStart, LilyPondFileName, LilyPondFileEnd,
        LilyPondVersion,
    }
}

crate::kind_enum! {
    pub enum LatexContext {
        ParseLatex, ParseGroup, ParseComment, ParseVerbatim, ParseOptions,
        ParseLilyPondEnvOptions, ParseLilyPondEnv,
        ParseLilyPondInlineOptions, ParseLilyPondInline,
        ParseLilyPondFileOptions, ParseLilyPondFile,
    }
}

use LatexContext as C;
use LatexKind as K;

impl LatexKind {
    pub(crate) fn pattern(self) -> &'static str {
        match self {
            K::Comment | K::Verbatim | K::Option | K::LilyPondFileName => r"[^\s\S]",
            K::LineComment => "%.*",
            K::CommentEnvStart => r"\\begin\s*\{comment\}",
            K::CommentEnvEnd => r"\\end\s*\{comment\}",
            K::VerbatimStart => r"\\begin\s*\{verbatim\*?\}",
            K::VerbatimEnd => r"\\end\s*\{verbatim\*?\}",
            K::Command => r"\\[A-Za-z]+\*?",
            K::EscapedChar => r"\\[^A-Za-z]",
            K::OpenBrace => r"\{",
            K::CloseBrace | K::LilyPondInlineEnd | K::LilyPondFileEnd => r"\}",
            K::Math => r"\$\$?",
            K::OptionsStart => r"\[",
            K::OptionsEnd => r"\]",
            K::LilyPondEnvStart => r"\\begin\s*\{lilypond\}",
            K::LilyPondEnvEnd => r"\\end\s*\{lilypond\}",
            K::LilyPondInline => r"\\lilypond",
            K::LilyPondFile => r"\\lilypondfile",
            K::LilyPondVersion => r"\\lilypondversion",
            K::LilyPondInlineStart | K::LilyPondFileStart => r"\{",
        }
    }

    pub(crate) fn refine(self, text: &str, _start: usize, end: usize) -> Option<usize> {
        match self {
            K::LilyPondInline | K::LilyPondFile | K::LilyPondVersion => not_alpha_at(text, end).then_some(end),
            _ => Some(end),
        }
    }

    pub(crate) fn caps(self) -> Caps {
        match self {
            K::CommentEnvEnd
            | K::VerbatimEnd
            | K::OptionsEnd
            | K::LilyPondEnvEnd
            | K::LilyPondInlineEnd
            | K::LilyPondFileEnd => Caps::LEAVER,
            _ => Caps::empty(),
        }
    }

    pub(crate) fn category(self) -> Category {
        match self {
            K::Comment | K::LineComment | K::CommentEnvStart | K::CommentEnvEnd => Category::COMMENT,
            K::EscapedChar => Category::CHARACTER,
            K::LilyPondFileName => Category::STRING,
            _ => Category::empty(),
        }
    }

    pub(crate) fn transition(self) -> Transition {
        match self {
            K::CommentEnvStart => Transition::Enter(latex(C::ParseComment)),
            K::VerbatimStart => Transition::Enter(latex(C::ParseVerbatim)),
            K::OptionsStart => Transition::Enter(latex(C::ParseOptions)),
            K::LilyPondEnvStart => Transition::Enter(latex(C::ParseLilyPondEnvOptions)),
            K::LilyPondInline => Transition::Enter(latex(C::ParseLilyPondInlineOptions)),
            K::LilyPondInlineStart => Transition::Replace(latex(C::ParseLilyPondInline)),
            K::LilyPondFile => Transition::Enter(latex(C::ParseLilyPondFileOptions)),
            K::LilyPondFileStart => Transition::Replace(latex(C::ParseLilyPondFile)),
            k if k.caps().contains(Caps::LEAVER) => Transition::Leave,
            _ => Transition::Hook,
        }
    }
}

fn latex(ctx: LatexContext) -> ContextId {
    ContextId::Latex(ctx)
}

fn lk(kinds: &[LatexKind]) -> Vec<TokenKind> {
    kinds.iter().map(|&k| TokenKind::Latex(k)).collect()
}

fn text_items() -> Vec<TokenKind> {
    lk(&[
        K::LineComment,
        K::CommentEnvStart,
        K::VerbatimStart,
        K::LilyPondEnvStart,
        K::LilyPondVersion,
        K::LilyPondFile,
        K::LilyPondInline,
        K::Command,
        K::EscapedChar,
        K::OpenBrace,
        K::CloseBrace,
        K::Math,
    ])
}

pub(crate) fn spec(ctx: LatexContext) -> ContextSpec {
    match ctx {
        C::ParseLatex => ContextSpec::new(text_items()).mode(Mode::Latex),
        C::ParseGroup => ContextSpec::new(text_items()),
        C::ParseComment => ContextSpec::new(lk(&[K::CommentEnvEnd])).default_kind(TokenKind::Latex(K::Comment)),
        C::ParseVerbatim => ContextSpec::new(lk(&[K::VerbatimEnd])).default_kind(TokenKind::Latex(K::Verbatim)),
        C::ParseOptions => ContextSpec::new(lk(&[K::OptionsEnd])).default_kind(TokenKind::Latex(K::Option)),
        C::ParseLilyPondEnvOptions => {
            ContextSpec::new(lk(&[K::OptionsStart])).fallthrough(Fallthrough::Replace(latex(C::ParseLilyPondEnv)))
        }
        C::ParseLilyPondEnv => {
            ContextSpec::new([lk(&[K::LilyPondEnvEnd]), lilypond::global_items()].concat()).mode(Mode::LilyPond)
        }
        C::ParseLilyPondInlineOptions => ContextSpec::new(lk(&[K::OptionsStart, K::LilyPondInlineStart])),
        C::ParseLilyPondInline => {
            ContextSpec::new([lk(&[K::LilyPondInlineEnd]), lilypond::parse_music_items()].concat())
                .mode(Mode::LilyPond)
        }
        C::ParseLilyPondFileOptions => ContextSpec::new(lk(&[K::OptionsStart, K::LilyPondFileStart])),
        C::ParseLilyPondFile => {
            ContextSpec::new(lk(&[K::LilyPondFileEnd])).default_kind(TokenKind::Latex(K::LilyPondFileName))
        }
    }
}

/// Plain braces group text; a stray closing brace at the top level is
/// ignored.
pub(crate) fn hook(ctx: LatexContext, kind: TokenKind, _text: &str, state: &mut State) {
    match (ctx, kind) {
        (C::ParseLatex | C::ParseGroup, TokenKind::Latex(K::OpenBrace)) => state.enter(latex(C::ParseGroup)),
        (C::ParseGroup, TokenKind::Latex(K::CloseBrace)) => state.leave(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(state: &mut State, text: &str) -> Vec<&'static str> {
        state.tokens(text, 0).map(|t| t.kind.name()).filter(|k| *k != "Space" && *k != "Unparsed").collect()
    }

    #[test]
    fn inline_music_and_file() {
        let mut state = State::for_mode(Mode::Latex);
        assert_eq!(
            names(&mut state, "see \\lilypond[staffsize=11]{ c' { d } } and \\lilypondfile{a.ly}"),
            [
                "LilyPondInline",
                "OptionsStart",
                "Option",
                "OptionsEnd",
                "LilyPondInlineStart",
                "Note",
                "Octave",
                "SequentialStart",
                "Note",
                "SequentialEnd",
                "LilyPondInlineEnd",
                "LilyPondFile",
                "LilyPondFileStart",
                "LilyPondFileName",
                "LilyPondFileEnd",
            ]
        );
        assert_eq!(state.depth(), 1);
    }

    #[test]
    fn environment_spans_lines() {
        let mut state = State::for_mode(Mode::Latex);
        names(&mut state, "\\begin{lilypond}");
        names(&mut state, "\\relative { c4 }");
        assert_eq!(state.mode(), Some(Mode::LilyPond));
        names(&mut state, "\\end{lilypond} % done");
        assert_eq!(state.depth(), 1);
        assert_eq!(state.mode(), Some(Mode::Latex));
    }

    #[test]
    fn braces_nest_and_verbatim_is_opaque() {
        let mut state = State::for_mode(Mode::Latex);
        names(&mut state, "\\textbf{a {b}");
        assert_eq!(state.top(), latex(C::ParseGroup));
        names(&mut state, "}}");
        assert_eq!(state.depth(), 1);
        assert_eq!(names(&mut state, "\\begin{verbatim}\\lilypond{c}\\end{verbatim}"), ["VerbatimStart", "Verbatim", "VerbatimEnd"]);
    }
}
