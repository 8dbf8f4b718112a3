//! DocBook XML with LilyPond in `<programlisting language="lilypond">`.
//!
//! The listing body may be wrapped in a CDATA section; inside a listing the
//! CDATA markers are plain delimiters and the LilyPond lexer sees the rest.

use super::kinds::{Transition, word_boundary};
use super::lilypond;
use super::{Caps, Category, ContextId, ContextSpec, Mode, State, TokenKind};

crate::kind_enum! {
    pub enum DocBookKind {
        Comment, CommentStart, CommentEnd,
        Declaration, DeclarationStart, DeclarationEnd, ProcessingInstruction,
        CData, CDataStart, CDataEnd,
        String, StringDQStart, StringSQStart, StringDQEnd, StringSQEnd,
        TagStart, TagEnd, AttrName, EqualSign, EntityRef,
        ListingStart, ListingTagEnd, ListingEnd,
    }
}

crate::kind_enum! {
    pub enum DocBookContext {
        ParseDocBook, ParseComment, ParseDeclaration, ParseCData,
        ParseStringDQ, ParseStringSQ, ParseAttr, ParseListingAttr, ParseLilyPond,
    }
}

use DocBookContext as C;
use DocBookKind as K;

impl DocBookKind {
    pub(crate) fn pattern(self) -> &'static str {
        match self {
            K::Comment | K::Declaration | K::CData | K::String => r"[^\s\S]",
            K::CommentStart => "<!--",
            K::CommentEnd => "-->",
            K::DeclarationStart => "<![A-Z]+",
            K::DeclarationEnd | K::TagEnd => "/?>",
            K::ProcessingInstruction => r"<\?[^?]*\?>",
            K::CDataStart => r"<!\[CDATA\[",
            K::CDataEnd => r"\]\]>",
            K::StringDQStart | K::StringDQEnd => "\"",
            K::StringSQStart | K::StringSQEnd => "'",
            K::TagStart => r"</?[A-Za-z_][-.:\w]*",
            K::AttrName => r"[A-Za-z_][-.:\w]*",
            K::EqualSign => "=",
            K::EntityRef => r"&(?:#\d+|#[xX][0-9A-Fa-f]+|[A-Za-z_:][\w.:_-]*);",
            K::ListingStart => "<programlisting",
            K::ListingTagEnd => ">",
            K::ListingEnd => "</programlisting>",
        }
    }

    pub(crate) fn refine(self, text: &str, _start: usize, end: usize) -> Option<usize> {
        match self {
            K::ListingStart => {
                // only listings declared as LilyPond
                let tag = crate::regex!(r#"\A[^>]*\blanguage\s*=\s*["']lilypond["'][^>]*>"#);
                (word_boundary(text, end) && tag.is_match(&text[end..])).then_some(end)
            }
            _ => Some(end),
        }
    }

    pub(crate) fn caps(self) -> Caps {
        match self {
            K::CommentEnd
            | K::DeclarationEnd
            | K::StringDQEnd
            | K::StringSQEnd
            | K::TagEnd
            | K::ListingEnd => Caps::LEAVER,
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
            K::CommentStart => Transition::Enter(docbook(C::ParseComment)),
            K::DeclarationStart => Transition::Enter(docbook(C::ParseDeclaration)),
            K::StringDQStart => Transition::Enter(docbook(C::ParseStringDQ)),
            K::StringSQStart => Transition::Enter(docbook(C::ParseStringSQ)),
            K::TagStart => Transition::Enter(docbook(C::ParseAttr)),
            K::ListingStart => Transition::Enter(docbook(C::ParseListingAttr)),
            K::ListingTagEnd => Transition::Replace(docbook(C::ParseLilyPond)),
            k if k.caps().contains(Caps::LEAVER) => Transition::Leave,
            _ => Transition::Hook,
        }
    }
}

fn docbook(ctx: DocBookContext) -> ContextId {
    ContextId::DocBook(ctx)
}

fn dk(kinds: &[DocBookKind]) -> Vec<TokenKind> {
    kinds.iter().map(|&k| TokenKind::DocBook(k)).collect()
}

fn attr_items(end: DocBookKind) -> Vec<TokenKind> {
    [vec![TokenKind::Space], dk(&[end, K::AttrName, K::EqualSign, K::StringDQStart, K::StringSQStart])].concat()
}

pub(crate) fn spec(ctx: DocBookContext) -> ContextSpec {
    match ctx {
        C::ParseDocBook => ContextSpec::new(dk(&[
            K::CommentStart,
            K::CDataStart,
            K::DeclarationStart,
            K::ProcessingInstruction,
            K::ListingStart,
            K::TagStart,
            K::EntityRef,
        ]))
        .mode(Mode::DocBook),
        C::ParseComment => ContextSpec::new(dk(&[K::CommentEnd])).default_kind(TokenKind::DocBook(K::Comment)),
        C::ParseDeclaration => {
            ContextSpec::new(dk(&[K::DeclarationEnd, K::StringDQStart, K::StringSQStart]))
                .default_kind(TokenKind::DocBook(K::Declaration))
        }
        C::ParseCData => ContextSpec::new(dk(&[K::CDataEnd])).default_kind(TokenKind::DocBook(K::CData)),
        C::ParseStringDQ => {
            ContextSpec::new(dk(&[K::StringDQEnd, K::EntityRef])).default_kind(TokenKind::DocBook(K::String))
        }
        C::ParseStringSQ => {
            ContextSpec::new(dk(&[K::StringSQEnd, K::EntityRef])).default_kind(TokenKind::DocBook(K::String))
        }
        C::ParseAttr => ContextSpec::new(attr_items(K::TagEnd)),
        C::ParseListingAttr => ContextSpec::new(attr_items(K::ListingTagEnd)),
        C::ParseLilyPond => {
            ContextSpec::new([dk(&[K::ListingEnd, K::CDataStart, K::CDataEnd]), lilypond::global_items()].concat())
                .mode(Mode::LilyPond)
        }
    }
}

/// Character data sections open a context in running text; inside a
/// listing their markers change nothing.
pub(crate) fn hook(ctx: DocBookContext, kind: TokenKind, _text: &str, state: &mut State) {
    match (ctx, kind) {
        (C::ParseDocBook, TokenKind::DocBook(K::CDataStart)) => state.enter(docbook(C::ParseCData)),
        (C::ParseCData, TokenKind::DocBook(K::CDataEnd)) => state.leave(),
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
    fn lilypond_listing() {
        let mut state = State::for_mode(Mode::DocBook);
        let text = "<para>x</para><programlisting language=\"lilypond\"><![CDATA[{ c }]]></programlisting>";
        assert_eq!(
            names(&mut state, text),
            [
                "TagStart",
                "TagEnd",
                "TagStart",
                "TagEnd",
                "ListingStart",
                "AttrName",
                "EqualSign",
                "StringDQStart",
                "String",
                "StringDQEnd",
                "ListingTagEnd",
                "CDataStart",
                "SequentialStart",
                "Note",
                "SequentialEnd",
                "CDataEnd",
                "ListingEnd",
            ]
        );
        assert_eq!(state.depth(), 1);
    }

    #[test]
    fn other_listings_stay_xml() {
        let mut state = State::for_mode(Mode::DocBook);
        names(&mut state, "<programlisting language=\"c\">");
        assert_eq!(state.depth(), 1);
        assert_eq!(state.mode(), Some(Mode::DocBook));
        assert_eq!(names(&mut state, "<![CDATA[<a>]]>"), ["CDataStart", "CData", "CDataEnd"]);
        assert_eq!(state.depth(), 1);
    }

    #[test]
    fn doctype_and_comment() {
        let mut state = State::for_mode(Mode::DocBook);
        assert_eq!(
            names(&mut state, "<!DOCTYPE book \"x\"><!-- note -->"),
            ["DeclarationStart", "Declaration", "StringDQStart", "String", "StringDQEnd", "DeclarationEnd", "CommentStart", "Comment", "CommentEnd"]
        );
        assert_eq!(state.depth(), 1);
    }
}
