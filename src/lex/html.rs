//! HTML with embedded LilyPond (`lilypond-book` style).
//!
//! `<lilypond>…</lilypond>` holds a whole LilyPond file, `<lilypond opts:
//! music/>` inline music, and `<lilypondfile>` names a file to include.

use super::kinds::{Transition, char_before, is_word_char, word_boundary};
use super::lilypond;
use super::{Caps, Category, ContextId, ContextSpec, Fallthrough, Mode, TokenKind};

crate::kind_enum! {
    pub enum HtmlKind {
        Comment, CommentStart, CommentEnd,
        String, StringDQStart, StringSQStart, StringDQEnd, StringSQEnd,
        TagStart, TagEnd, AttrName, EqualSign, Value, EntityRef,
        LilyPondVersionTag, LilyPondFileTag, LilyPondFileTagEnd,
        LilyPondInlineTag, LilyPondCloseTag, LilyPondTagEnd, LilyPondInlineTagEnd,
        SemiColon,
    }
}

crate::kind_enum! {
    pub enum HtmlContext {
        ParseHtml, ParseAttr, ParseStringDQ, ParseStringSQ, ParseComment, ParseValue,
        ParseLilyPondAttr, ParseLilyPondFileOptions, ParseLilyPond, ParseLilyPondInline,
    }
}

use HtmlContext as C;
use HtmlKind as K;

impl HtmlKind {
    pub(crate) fn pattern(self) -> &'static str {
        match self {
            K::Comment | K::String => r"[^\s\S]",
            K::CommentStart => "<!--",
            K::CommentEnd => "-->",
            K::StringDQStart | K::StringDQEnd => "\"",
            K::StringSQStart | K::StringSQEnd => "'",
            K::TagStart => r"</?\w[-_:\w]*",
            K::TagEnd | K::LilyPondFileTagEnd | K::LilyPondInlineTagEnd => "/?>",
            K::AttrName => r"\w+(?:[-_:]\w+)?",
            K::EqualSign => "=",
            K::Value => r"\w+",
            K::EntityRef => r"&(?:#\d+|#[xX][0-9A-Fa-f]+|[A-Za-z_:][\w.:_-]*);",
            K::LilyPondVersionTag => "<lilypondversion/?>",
            K::LilyPondFileTag => "</?lilypondfile",
            K::LilyPondInlineTag => "<lilypond",
            K::LilyPondCloseTag => "</lilypond>",
            K::LilyPondTagEnd => ">",
            K::SemiColon => ":",
        }
    }

    pub(crate) fn refine(self, text: &str, start: usize, end: usize) -> Option<usize> {
        match self {
            K::TagStart => {
                // the name ends on a word character
                let mut end = end;
                while end > start + 1 && !char_before(text, end).is_some_and(is_word_char) {
                    end -= 1;
                }
                char_before(text, end).is_some_and(is_word_char).then_some(end)
            }
            K::LilyPondFileTag | K::LilyPondInlineTag => word_boundary(text, end).then_some(end),
            _ => Some(end),
        }
    }

    pub(crate) fn caps(self) -> Caps {
        match self {
            K::CommentEnd
            | K::TagEnd
            | K::Value
            | K::StringDQEnd
            | K::StringSQEnd
            | K::LilyPondFileTagEnd
            | K::LilyPondCloseTag
            | K::LilyPondInlineTagEnd => Caps::LEAVER,
            _ => Caps::empty(),
        }
    }

    pub(crate) fn category(self) -> Category {
        match self {
            K::Comment | K::CommentStart | K::CommentEnd => Category::COMMENT,
            K::String => Category::STRING,
            K::StringDQStart | K::StringSQStart => Category::STRING | Category::STRING_START,
            K::StringDQEnd | K::StringSQEnd => Category::STRING | Category::STRING_END,
            K::EntityRef => Category::CHARACTER,
            _ => Category::empty(),
        }
    }

    pub(crate) fn transition(self) -> Transition {
        match self {
            K::CommentStart => Transition::Enter(html(C::ParseComment)),
            K::TagStart => Transition::Enter(html(C::ParseAttr)),
            K::EqualSign => Transition::Enter(html(C::ParseValue)),
            K::StringDQStart => Transition::Enter(html(C::ParseStringDQ)),
            K::StringSQStart => Transition::Enter(html(C::ParseStringSQ)),
            K::LilyPondFileTag => Transition::Enter(html(C::ParseLilyPondFileOptions)),
            K::LilyPondInlineTag => Transition::Enter(html(C::ParseLilyPondAttr)),
            K::LilyPondTagEnd => Transition::Replace(html(C::ParseLilyPond)),
            K::SemiColon => Transition::Replace(html(C::ParseLilyPondInline)),
            k if k.caps().contains(Caps::LEAVER) => Transition::Leave,
            _ => Transition::Hook,
        }
    }
}

fn html(ctx: HtmlContext) -> ContextId {
    ContextId::Html(ctx)
}

fn hk(kinds: &[HtmlKind]) -> Vec<TokenKind> {
    kinds.iter().map(|&k| TokenKind::Html(k)).collect()
}

fn with_space(kinds: &[HtmlKind]) -> Vec<TokenKind> {
    [vec![TokenKind::Space], hk(kinds)].concat()
}

pub(crate) fn spec(ctx: HtmlContext) -> ContextSpec {
    match ctx {
        C::ParseHtml => ContextSpec::new(with_space(&[
            K::LilyPondVersionTag,
            K::LilyPondFileTag,
            K::LilyPondInlineTag,
            K::CommentStart,
            K::TagStart,
            K::EntityRef,
        ]))
        .mode(Mode::Html),
        C::ParseAttr => ContextSpec::new(with_space(&[
            K::TagEnd,
            K::AttrName,
            K::EqualSign,
            K::StringDQStart,
            K::StringSQStart,
        ])),
        C::ParseStringDQ => {
            ContextSpec::new(hk(&[K::StringDQEnd, K::EntityRef])).default_kind(TokenKind::Html(K::String))
        }
        C::ParseStringSQ => {
            ContextSpec::new(hk(&[K::StringSQEnd, K::EntityRef])).default_kind(TokenKind::Html(K::String))
        }
        C::ParseComment => ContextSpec::new(hk(&[K::CommentEnd])).default_kind(TokenKind::Html(K::Comment)),
        C::ParseValue => ContextSpec::new(with_space(&[K::Value])).fallthrough(Fallthrough::Leave),
        C::ParseLilyPondAttr => ContextSpec::new(with_space(&[
            K::AttrName,
            K::EqualSign,
            K::StringDQStart,
            K::StringSQStart,
            K::LilyPondTagEnd,
            K::SemiColon,
        ])),
        C::ParseLilyPondFileOptions => ContextSpec::new(with_space(&[
            K::AttrName,
            K::EqualSign,
            K::StringDQStart,
            K::StringSQStart,
            K::LilyPondFileTagEnd,
        ])),
        C::ParseLilyPond => {
            ContextSpec::new([hk(&[K::LilyPondCloseTag]), lilypond::global_items()].concat()).mode(Mode::LilyPond)
        }
        C::ParseLilyPondInline => {
            ContextSpec::new([hk(&[K::LilyPondInlineTagEnd]), lilypond::parse_music_items()].concat())
                .mode(Mode::LilyPond)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::State;

    #[test]
    fn lilypond_block_switches_mode() {
        let mut state = State::for_mode(Mode::Html);
        let toks: Vec<_> = state.tokens("<p class=x>Hi &amp; <lilypond>{ c4 }", 0).collect();
        assert!(toks.iter().any(|t| t.kind == TokenKind::Html(K::EntityRef)));
        assert_eq!(state.mode(), Some(Mode::LilyPond));
        state.tokens("</lilypond>", 0).for_each(drop);
        assert_eq!(state.mode(), Some(Mode::Html));
        assert_eq!(state.depth(), 1);
    }

    #[test]
    fn inline_music_after_colon() {
        let mut state = State::for_mode(Mode::Html);
        let names: Vec<_> =
            state.tokens("<lilypond fragment: c d/>", 0).map(|t| t.kind.name()).filter(|k| *k != "Space").collect();
        assert_eq!(names, ["LilyPondInlineTag", "AttrName", "SemiColon", "Note", "Note", "LilyPondInlineTagEnd"]);
        assert_eq!(state.depth(), 1);
    }
}
