//! Texinfo with embedded LilyPond.

use super::kinds::{Transition, word_boundary};
use super::lilypond;
use super::{Caps, Category, ContextId, ContextSpec, Fallthrough, Mode, TokenKind};

crate::kind_enum! {
    pub enum TexinfoKind {
        Comment, LineComment, BlockCommentStart, BlockCommentEnd,
        Attribute, Keyword, BlockStart, BlockEnd, EscapeChar, Accent,
        Verbatim, VerbatimStart, VerbatimEnd,
        LilyPondBlockStart, LilyPondBlockStartBrace, LilyPondBlockEnd,
        LilyPondEnvStart, LilyPondEnvEnd,
        LilyPondFileStart, LilyPondFileStartBrace,
        LilyPondAttrStart, LilyPondAttrEnd,
    }
}

crate::kind_enum! {
    pub enum TexinfoContext {
        ParseTexinfo, ParseComment, ParseBlock, ParseVerbatim,
        ParseLilyPondBlockAttr, ParseLilyPondEnvAttr, ParseLilyPondAttr, ParseLilyPondFile,
        ParseLilyPondBlock, ParseLilyPondEnv,
    }
}

use TexinfoContext as C;
use TexinfoKind as K;

impl TexinfoKind {
    pub(crate) fn pattern(self) -> &'static str {
        match self {
            K::Comment | K::Attribute | K::Verbatim => r"[^\s\S]",
            K::LineComment => r"@c(?:[^\w\n].*)?",
            K::BlockCommentStart => "@ignore",
            K::BlockCommentEnd => r"@end\s+ignore",
            K::Keyword => "@[a-zA-Z]+",
            K::BlockStart => r"@[a-zA-Z]+\{",
            K::BlockEnd | K::LilyPondBlockEnd => r"\}",
            K::EscapeChar => "@[@{}]",
            K::Accent => r#"@['"',=^`~](?:\{[a-zA-Z]\}|[a-zA-Z])"#,
            K::VerbatimStart => "@verbatim",
            K::VerbatimEnd => r"@end\s+verbatim",
            K::LilyPondBlockStart | K::LilyPondEnvStart => "@lilypond",
            K::LilyPondEnvEnd => r"@end\s+lilypond",
            K::LilyPondFileStart => "@lilypondfile",
            K::LilyPondBlockStartBrace | K::LilyPondFileStartBrace => r"\{",
            K::LilyPondAttrStart => r"\[",
            K::LilyPondAttrEnd => r"\]",
        }
    }

    pub(crate) fn refine(self, text: &str, start: usize, end: usize) -> Option<usize> {
        match self {
            K::LineComment => word_boundary(text, start + 2).then_some(end),
            K::Accent => (text[..end].ends_with('}') || word_boundary(text, end)).then_some(end),
            K::BlockCommentStart
            | K::BlockCommentEnd
            | K::VerbatimStart
            | K::VerbatimEnd
            | K::LilyPondEnvStart
            | K::LilyPondEnvEnd
            | K::LilyPondFileStart => word_boundary(text, end).then_some(end),
            K::LilyPondBlockStart => {
                // only when a brace (after optional options) follows
                crate::regex!(r"\A(?:\[[a-zA-Z,=0-9\\\s]+\])?\{").is_match(&text[end..]).then_some(end)
            }
            _ => Some(end),
        }
    }

    pub(crate) fn caps(self) -> Caps {
        match self {
            K::BlockCommentEnd
            | K::BlockEnd
            | K::VerbatimEnd
            | K::LilyPondBlockEnd
            | K::LilyPondEnvEnd
            | K::LilyPondAttrEnd => Caps::LEAVER,
            _ => Caps::empty(),
        }
    }

    pub(crate) fn category(self) -> Category {
        match self {
            K::Comment | K::LineComment | K::BlockCommentStart | K::BlockCommentEnd => Category::COMMENT,
            K::EscapeChar | K::Accent => Category::CHARACTER,
            _ => Category::empty(),
        }
    }

    pub(crate) fn transition(self) -> Transition {
        match self {
            K::BlockCommentStart => Transition::Enter(texinfo(C::ParseComment)),
            K::BlockStart => Transition::Enter(texinfo(C::ParseBlock)),
            K::VerbatimStart => Transition::Enter(texinfo(C::ParseVerbatim)),
            K::LilyPondBlockStart => Transition::Enter(texinfo(C::ParseLilyPondBlockAttr)),
            K::LilyPondBlockStartBrace => Transition::Replace(texinfo(C::ParseLilyPondBlock)),
            K::LilyPondEnvStart => Transition::Enter(texinfo(C::ParseLilyPondEnvAttr)),
            K::LilyPondFileStart => Transition::Enter(texinfo(C::ParseLilyPondFile)),
            K::LilyPondFileStartBrace => Transition::Replace(texinfo(C::ParseBlock)),
            K::LilyPondAttrStart => Transition::Enter(texinfo(C::ParseLilyPondAttr)),
            k if k.caps().contains(Caps::LEAVER) => Transition::Leave,
            _ => Transition::Hook,
        }
    }
}

fn texinfo(ctx: TexinfoContext) -> ContextId {
    ContextId::Texinfo(ctx)
}

fn tk(kinds: &[TexinfoKind]) -> Vec<TokenKind> {
    kinds.iter().map(|&k| TokenKind::Texinfo(k)).collect()
}

pub(crate) fn spec(ctx: TexinfoContext) -> ContextSpec {
    match ctx {
        C::ParseTexinfo => ContextSpec::new(tk(&[
            K::LineComment,
            K::BlockCommentStart,
            K::Accent,
            K::EscapeChar,
            K::LilyPondBlockStart,
            K::LilyPondEnvStart,
            K::LilyPondFileStart,
            K::BlockStart,
            K::VerbatimStart,
            K::Keyword,
        ]))
        .mode(Mode::Texinfo),
        C::ParseComment => ContextSpec::new(tk(&[K::BlockCommentEnd])).default_kind(TokenKind::Texinfo(K::Comment)),
        C::ParseBlock => ContextSpec::new(tk(&[K::BlockEnd, K::Accent, K::EscapeChar, K::BlockStart, K::Keyword])),
        C::ParseVerbatim => ContextSpec::new(tk(&[K::VerbatimEnd])).default_kind(TokenKind::Texinfo(K::Verbatim)),
        C::ParseLilyPondBlockAttr => ContextSpec::new(tk(&[K::LilyPondAttrStart, K::LilyPondBlockStartBrace])),
        C::ParseLilyPondEnvAttr => ContextSpec::new(tk(&[K::LilyPondAttrStart]))
            .fallthrough(Fallthrough::Replace(texinfo(C::ParseLilyPondEnv))),
        C::ParseLilyPondAttr => {
            ContextSpec::new(tk(&[K::LilyPondAttrEnd])).default_kind(TokenKind::Texinfo(K::Attribute))
        }
        C::ParseLilyPondFile => ContextSpec::new(tk(&[K::LilyPondAttrStart, K::LilyPondFileStartBrace])),
        C::ParseLilyPondBlock => {
            ContextSpec::new([tk(&[K::LilyPondBlockEnd]), lilypond::global_items()].concat()).mode(Mode::LilyPond)
        }
        C::ParseLilyPondEnv => {
            ContextSpec::new([tk(&[K::LilyPondEnvEnd]), lilypond::global_items()].concat()).mode(Mode::LilyPond)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::State;

    fn names(state: &mut State, text: &str) -> Vec<&'static str> {
        state.tokens(text, 0).map(|t| t.kind.name()).filter(|k| *k != "Space" && *k != "Unparsed").collect()
    }

    #[test]
    fn inline_block_and_environment() {
        let mut state = State::for_mode(Mode::Texinfo);
        assert_eq!(
            names(&mut state, "@lilypond[fragment]{c d}"),
            ["LilyPondBlockStart", "LilyPondAttrStart", "Attribute", "LilyPondAttrEnd", "LilyPondBlockStartBrace", "Name", "Name", "LilyPondBlockEnd"]
        );
        assert_eq!(state.depth(), 1);

        let mut state = State::for_mode(Mode::Texinfo);
        names(&mut state, "@lilypond[verbatim]");
        assert_eq!(state.top(), texinfo(C::ParseLilyPondEnvAttr));
        names(&mut state, "\\score { }");
        assert_eq!(state.mode(), Some(Mode::LilyPond));
        names(&mut state, "@end lilypond");
        assert_eq!(state.depth(), 1);
    }

    #[test]
    fn comments() {
        let mut state = State::for_mode(Mode::Texinfo);
        assert_eq!(names(&mut state, "@c a remark"), ["LineComment"]);
        assert_eq!(names(&mut state, "@code{x}"), ["BlockStart", "BlockEnd"]);
    }
}
