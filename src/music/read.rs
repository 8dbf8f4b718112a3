//! The tree builder.
//!
//! The whole text is tokenized once in LilyPond mode, recording the lexer
//! depth and active context after every token. The reader then walks that
//! record with a one-token pushback cursor:
//!
//! ```text
//!   tokens ──> cursor ──┬── Free      every remaining token
//!              (pushback)└── Bounded   tokens until the lexer leaves the
//!                                      context that was active when the
//!                                      bound was opened
//! ```
//!
//! Each token kind that starts an item has a handler that creates the item
//! and reads the tokens and sub-items belonging to it. Tokens no handler
//! claims are skipped, so building never fails.

use super::values::{lexeme_text, number_value, scheme_fraction, scheme_pair_ints, string_value};
use super::{
    Attr, Duration, Fraction, ItemData, ItemId, ItemKind, Lexeme, Pitch, SpanEvent, Tree, pitch,
};
use crate::lex::lilypond::{LyContext, LyKind};
use crate::lex::scheme::SchemeKind;
use crate::api::Options;
use crate::lex::{ContextId, Mode, State, TokenKind, markup_nargs};
use tracing::{trace, warn};

use ItemKind as I;
use LyKind as K;

/// A token with the lexer state it left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Scanned {
    pub lexeme: Lexeme,
    pub depth: usize,
    pub context: ContextId,
}

/// Tokenizes `text` in LilyPond mode.
pub(crate) fn scan(text: &str) -> Vec<Scanned> {
    let mut state = State::for_mode(Mode::LilyPond);
    let mut tokens = state.tokens(text, 0);
    let mut out = Vec::new();
    while let Some(t) = tokens.next() {
        let lexeme = Lexeme { start: t.start, end: t.end, kind: t.kind };
        let after = tokens.state();
        out.push(Scanned { lexeme, depth: after.depth(), context: after.top() });
    }
    out
}

/// Builds the item tree of a scanned text.
pub(crate) fn build(text: &str, tokens: &[Scanned], options: &Options) -> Tree {
    let mut reader = Reader::new(text, tokens, &options.language, options.max_nesting_depth);
    let items = reader.read_all(&mut Source::Free);
    for item in items {
        reader.tree.append(ItemId::ROOT, item);
    }
    trace!(target: "lilyparse::music", items = reader.tree.len(), "built tree");
    reader.tree
}

// --- Token sources ----------------------------------------------------------

struct Bound {
    depth: usize,
    started: bool,
    finished: bool,
    last: Option<Lexeme>,
}

enum Source {
    Free,
    Bounded(Bound),
}

impl Source {
    /// The last token a bounded source yielded.
    fn last(&self) -> Option<Lexeme> {
        match self {
            Source::Free => None,
            Source::Bounded(b) => b.last,
        }
    }
}

fn ly(t: Lexeme) -> Option<LyKind> {
    t.kind.as_lilypond()
}

fn is(t: Lexeme, kind: LyKind) -> bool {
    t.kind == TokenKind::LilyPond(kind)
}

fn is_open_bracket(t: Lexeme) -> bool {
    matches!(ly(t), Some(K::OpenBracket | K::SequentialStart))
}

fn is_equal_sign(t: Lexeme) -> bool {
    matches!(ly(t), Some(K::EqualSign | K::EqualSignSetOverride))
}

const TAG_COMMANDS: &[&str] = &["\\tag", "\\keepWithTag", "\\removeWithTag", "\\appendToTag", "\\pushToTag"];
const GRACE_COMMANDS: &[&str] = &["\\grace", "\\acciaccatura", "\\appoggiatura", "\\slashedGrace"];

struct Reader<'a> {
    text: &'a str,
    tokens: &'a [Scanned],
    index: usize,
    pushed: bool,
    tree: Tree,
    language: String,
    in_chord: bool,
    prev_duration: Duration,
    nesting: usize,
    max_nesting: usize,
    skipped_deep: bool,
}

impl<'a> Reader<'a> {
    fn new(text: &'a str, tokens: &'a [Scanned], language: &str, max_nesting: usize) -> Self {
        Reader {
            text,
            tokens,
            index: 0,
            pushed: false,
            tree: Tree::new(),
            language: language.to_string(),
            in_chord: false,
            prev_duration: Duration::QUARTER,
            nesting: 0,
            max_nesting,
            skipped_deep: false,
        }
    }

    // --- Cursor -------------------------------------------------------------

    fn pull(&mut self) -> Option<Lexeme> {
        if self.pushed {
            self.pushed = false;
            return self.index.checked_sub(1).map(|i| self.tokens[i].lexeme);
        }
        let t = self.tokens.get(self.index)?;
        self.index += 1;
        Some(t.lexeme)
    }

    /// Yields the last token again on the next pull.
    fn pushback(&mut self) {
        if self.index > 0 {
            self.pushed = true;
        }
    }

    fn depth(&self) -> usize {
        self.index.checked_sub(1).map_or(1, |i| self.tokens[i].depth)
    }

    fn context(&self) -> Option<ContextId> {
        self.index.checked_sub(1).map(|i| self.tokens[i].context)
    }

    /// A source that ends when the lexer leaves the current context.
    fn consume(&self) -> Source {
        Source::Bounded(Bound { depth: self.depth(), started: false, finished: false, last: None })
    }

    fn next(&mut self, src: &mut Source) -> Option<Lexeme> {
        let Source::Bounded(bound) = src else { return self.pull() };
        if bound.finished {
            return None;
        }
        if bound.started && self.depth() < bound.depth && !self.pushed {
            bound.finished = true;
            return None;
        }
        match self.pull() {
            Some(t) => {
                bound.started = true;
                bound.last = Some(t);
                Some(t)
            }
            None => {
                bound.finished = true;
                None
            }
        }
    }

    /// Next token that is neither space nor comment.
    fn next_skip(&mut self, src: &mut Source) -> Option<Lexeme> {
        loop {
            let t = self.next(src)?;
            if !t.kind.is_space() && !t.kind.is_comment() {
                return Some(t);
            }
        }
    }

    fn text(&self, t: Lexeme) -> &'a str {
        lexeme_text(self.text, t)
    }

    // --- Tree helpers -------------------------------------------------------

    fn factory(&mut self, kind: ItemKind, t: Lexeme) -> ItemId {
        self.tree.add(kind, t.start, Some(t))
    }

    fn factory_at(&mut self, kind: ItemKind, position: usize) -> ItemId {
        self.tree.add(kind, position, None)
    }

    fn append(&mut self, parent: ItemId, child: Option<ItemId>) {
        if let Some(child) = child {
            self.tree.append(parent, child);
        }
    }

    fn extend(&mut self, parent: ItemId, children: Vec<ItemId>) {
        for child in children {
            self.tree.append(parent, child);
        }
    }

    fn set_data(&mut self, id: ItemId, data: ItemData) {
        self.tree.get_mut(id).data = data;
    }

    fn push_token(&mut self, id: ItemId, t: Option<Lexeme>) {
        if let Some(t) = t {
            self.tree.get_mut(id).tokens.push(t);
        }
    }

    /// Reads all remaining items of `src`.
    fn read_all(&mut self, src: &mut Source) -> Vec<ItemId> {
        let mut items = Vec::new();
        while let Some(t) = self.next_skip(src) {
            if let Some(item) = self.read_item(t, src) {
                items.push(item);
            }
        }
        items
    }

    /// Reads the next item of `src`, skipping tokens that start none.
    fn read_one(&mut self, src: &mut Source) -> Option<ItemId> {
        while let Some(t) = self.next_skip(src) {
            if let Some(item) = self.read_item(t, src) {
                return Some(item);
            }
        }
        None
    }

    /// Reads items of a fresh bound into `item`, keeping the closing token.
    fn read_bounded_into(&mut self, item: ItemId) {
        let mut inner = self.consume();
        let children = self.read_all(&mut inner);
        self.extend(item, children);
        self.push_token(item, inner.last());
    }

    /// Runs `read` one level deeper. Past the nesting limit nothing is
    /// read; the enclosing source then skips the deeper tokens.
    fn nested(&mut self, t: Lexeme, read: impl FnOnce(&mut Self) -> Option<ItemId>) -> Option<ItemId> {
        if self.nesting >= self.max_nesting {
            if !self.skipped_deep {
                warn!(target: "lilyparse::music", position = t.start, "input nested too deep, skipped");
                self.skipped_deep = true;
            }
            return None;
        }
        self.nesting += 1;
        let item = read(self);
        self.nesting -= 1;
        item
    }

    fn read_item(&mut self, t: Lexeme, src: &mut Source) -> Option<ItemId> {
        self.nested(t, |r| match t.kind {
            TokenKind::LilyPond(kind) => r.read_lilypond(kind, t, src),
            TokenKind::Scheme(SchemeKind::StringQuotedStart) => Some(r.read_string(t)),
            _ => None,
        })
    }

    fn read_lilypond(&mut self, kind: LyKind, t: Lexeme, src: &mut Source) -> Option<ItemId> {
        match kind {
            K::SchemeStart => Some(self.read_scheme_item(t)),
            K::StringQuotedStart => Some(self.read_string(t)),
            K::DecimalValue | K::IntegerValue | K::Fraction => Some(self.factory(I::Number, t)),
            K::Note | K::Rest | K::Skip | K::Spacer | K::Q => self.read_music_item(t, src),
            K::Length => {
                let item = self.factory_at(I::Unpitched, t.start);
                self.add_duration(item, Some(t), src);
                Some(item)
            }
            K::ChordStart => self.read_chord(t, src),
            K::OpenBracket
            | K::SequentialStart
            | K::OpenSimultaneous
            | K::SimultaneousStart
            | K::SimultaneousOrSequentialCommand => {
                let (item, inner) = self.test_music_list(t)?;
                if let Some(mut inner) = inner {
                    self.fill_music_list(item, &mut inner);
                }
                Some(item)
            }
            K::ChordSeparator => Some(self.read_chord_specifier(t)),
            K::TremoloColon => Some(self.read_tremolo(t)),
            K::Name | K::ContextProperty => self.read_assignment(t),
            K::PaperVariable | K::LayoutVariable | K::HeaderVariable => self.read_variable_assignment(t),
            K::VoiceSeparator => Some(self.factory(I::VoiceSeparator, t)),
            K::PipeSymbol => Some(self.factory(I::PipeSymbol, t)),
            K::Dynamic => Some(self.factory(I::Dynamic, t)),
            K::Tie => Some(self.factory(I::Tie, t)),
            K::Direction => Some(self.read_direction(t)),
            K::SlurStart | K::SlurEnd | K::PhrasingSlurStart | K::PhrasingSlurEnd => {
                let phrasing = matches!(kind, K::PhrasingSlurStart | K::PhrasingSlurEnd);
                let item = self.factory(if phrasing { I::PhrasingSlur } else { I::Slur }, t);
                let event = if self.text(t).ends_with('(') { SpanEvent::Start } else { SpanEvent::Stop };
                self.set_data(item, ItemData::Span(event));
                Some(item)
            }
            K::BeamStart | K::BeamEnd | K::LigatureStart | K::LigatureEnd => {
                let item = self.factory(I::Beam, t);
                let start = matches!(kind, K::BeamStart | K::LigatureStart);
                self.set_data(item, ItemData::Span(if start { SpanEvent::Start } else { SpanEvent::Stop }));
                Some(item)
            }
            K::Articulation | K::Fingering | K::StringNumber | K::ScriptAbbreviation => {
                Some(self.factory(I::Articulation, t))
            }
            K::Header
            | K::Score
            | K::BookPart
            | K::Book
            | K::Paper
            | K::Layout
            | K::Midi
            | K::With
            | K::LayoutContext => Some(self.read_block(kind, t, src)),
            K::Set => Some(self.read_set(t, src)),
            K::Unset => Some(self.read_unset(t)),
            K::Override => Some(self.read_override(t)),
            K::Revert => Some(self.read_revert(t)),
            K::Tweak => Some(self.read_tweak(t)),
            K::New | K::Context | K::Change => Some(self.read_translator(t, src)),
            K::Clef => Some(self.read_clef(t, src)),
            K::Tempo => Some(self.read_tempo(t)),
            K::Repeat => Some(self.read_repeat(t, src)),
            K::NoteMode | K::ChordMode | K::DrumMode | K::FigureMode => {
                let mode = match kind {
                    K::NoteMode => I::NoteMode,
                    K::ChordMode => I::ChordMode,
                    K::DrumMode => I::DrumMode,
                    _ => I::FigureMode,
                };
                let item = self.factory(mode, t);
                let child = self.read_one(&mut Source::Free);
                self.append(item, child);
                Some(item)
            }
            K::LyricMode => Some(self.read_lyric_mode(t, src)),
            K::Markup | K::MarkupLines | K::MarkupList => {
                let item = self.factory(I::Markup, t);
                self.add_markup_arguments(item);
                Some(item)
            }
            K::UserCommand if self.text(t) == "\\partcombine" => Some(self.read_partcombine(t)),
            K::UserCommand => Some(self.factory(I::UserCommand, t)),
            K::Command | K::PitchCommand | K::Keyword => Some(self.read_command(kind, t, src)),
            _ => None,
        }
    }

    // --- Music items --------------------------------------------------------

    fn read_music_item(&mut self, t: Lexeme, src: &mut Source) -> Option<ItemId> {
        let in_pitch_command = self.context() == Some(ContextId::LilyPond(LyContext::ParsePitchCommand));
        let item = if is(t, K::Note) {
            let (note, alter) = pitch::read_pitch_name(&self.language, self.text(t))?;
            let item = self.factory(I::Note, t);
            let mut pitch = Pitch::new(note, alter);
            let (mut octave, mut accidental, mut octave_check) = (None, None, None);
            while let Some(t) = self.next(src) {
                match ly(t) {
                    Some(K::Octave) => {
                        pitch.octave = pitch::octave_to_num(self.text(t));
                        octave = Some(t);
                    }
                    Some(K::AccidentalReminder | K::AccidentalCautionary) => {
                        pitch.accidental = self.text(t).to_string();
                        accidental = Some(t);
                    }
                    Some(K::OctaveCheck) => {
                        pitch.octave_check = Some(pitch::octave_to_num(self.text(t)));
                        octave_check = Some(t);
                        break;
                    }
                    _ if t.kind.is_space() => {}
                    _ => {
                        self.pushback();
                        break;
                    }
                }
            }
            self.set_data(item, ItemData::Note { pitch, octave, accidental, octave_check });
            item
        } else {
            let kind = match ly(t) {
                Some(K::Rest) => I::Rest,
                Some(K::Q) => I::Q,
                _ => I::Skip,
            };
            self.factory(kind, t)
        };
        if !self.in_chord && !in_pitch_command {
            self.add_duration(item, None, src);
        }
        Some(item)
    }

    /// Reads an optional written duration after `item`, or continues one that
    /// starts with `token`. Without one the previous duration carries over.
    fn add_duration(&mut self, item: ItemId, token: Option<Lexeme>, src: &mut Source) {
        let mut tokens = Vec::new();
        if token.is_none_or(|t| ly(t).is_some_and(LyKind::is_duration)) {
            tokens.extend(token);
            while let Some(t) = self.next(src) {
                if ly(t).is_some_and(LyKind::is_duration) {
                    if !tokens.is_empty() && is(t, K::Length) {
                        self.pushback();
                        break;
                    }
                    tokens.push(t);
                } else if !t.kind.is_space() {
                    self.pushback();
                    break;
                }
            }
        }
        if let Some((&first, rest)) = tokens.split_first() {
            let written = self.factory(I::WrittenDuration, first);
            self.tree.get_mut(written).tokens = rest.to_vec();
            self.tree.append(item, written);
            let text = self.text;
            let duration =
                Duration::from_parts(tokens.iter().map(|&t| lexeme_text(text, t))).unwrap_or(self.prev_duration);
            self.prev_duration = duration;
        }
        self.tree.get_mut(item).duration = Some(self.prev_duration);
    }

    fn read_chord(&mut self, t: Lexeme, src: &mut Source) -> Option<ItemId> {
        if self.in_chord {
            return None;
        }
        self.in_chord = true;
        let chord = self.factory(I::Chord, t);
        self.read_bounded_into(chord);
        self.in_chord = false;
        self.add_duration(chord, None, src);
        Some(chord)
    }

    /// Recognizes the start of a music list. A `\sequential` or
    /// `\simultaneous` not followed by a bracket is a plain keyword.
    fn test_music_list(&mut self, t: Lexeme) -> Option<(ItemId, Option<Source>)> {
        match ly(t)? {
            K::OpenBracket | K::SequentialStart | K::OpenSimultaneous | K::SimultaneousStart => {
                let simultaneous = self.text(t) == "<<";
                Some(self.make_music_list(t, simultaneous, None))
            }
            K::SimultaneousOrSequentialCommand => {
                let t1 = self.next_skip(&mut Source::Free)?;
                if matches!(ly(t1), Some(K::OpenBracket | K::SequentialStart | K::OpenSimultaneous | K::SimultaneousStart))
                {
                    let simultaneous = self.text(t) == "\\simultaneous" || self.text(t1) == "<<";
                    Some(self.make_music_list(t, simultaneous, Some(t1)))
                } else {
                    self.pushback();
                    Some((self.factory(I::Keyword, t), None))
                }
            }
            _ => None,
        }
    }

    fn make_music_list(&mut self, t: Lexeme, simultaneous: bool, bracket: Option<Lexeme>) -> (ItemId, Option<Source>) {
        let item = self.factory(I::MusicList, t);
        self.set_data(item, ItemData::MusicList { simultaneous });
        self.push_token(item, bracket);
        (item, Some(self.consume()))
    }

    fn fill_music_list(&mut self, item: ItemId, inner: &mut Source) {
        let children = self.read_all(inner);
        self.extend(item, children);
        self.push_token(item, inner.last());
    }

    fn read_chord_specifier(&mut self, t: Lexeme) -> ItemId {
        let item = self.factory_at(I::ChordSpecifier, t.start);
        let first = self.factory(I::ChordItem, t);
        self.tree.append(item, first);
        let mut src = self.consume();
        while let Some(t) = self.next(&mut src) {
            match ly(t) {
                Some(k) if k.is_chord_item() => {
                    let child = self.factory(I::ChordItem, t);
                    self.tree.append(item, child);
                }
                Some(K::Note) => {
                    if let Some((note, alter)) = pitch::read_pitch_name(&self.language, self.text(t)) {
                        let child = self.factory(I::Note, t);
                        let data =
                            ItemData::Note { pitch: Pitch::new(note, alter), octave: None, accidental: None, octave_check: None };
                        self.set_data(child, data);
                        self.tree.append(item, child);
                    }
                }
                _ => {}
            }
        }
        item
    }

    fn read_tremolo(&mut self, t: Lexeme) -> ItemId {
        let item = self.factory(I::Tremolo, t);
        if let Some(t) = self.next(&mut Source::Free) {
            if is(t, K::TremoloDuration) {
                let written = self.factory(I::WrittenDuration, t);
                self.tree.append(item, written);
                self.tree.get_mut(item).duration = Duration::parse(self.text(t));
            } else {
                self.pushback();
            }
        }
        item
    }

    fn read_direction(&mut self, t: Lexeme) -> ItemId {
        let item = self.factory(I::Postfix, t);
        let direction = match self.text(t).chars().next() {
            Some('_') => -1,
            Some('^') => 1,
            _ => 0,
        };
        self.set_data(item, ItemData::Direction(direction));
        if let Some(t) = self.next_skip(&mut Source::Free) {
            let follows = match ly(t) {
                Some(k) => {
                    k == K::StringQuotedStart
                        || k.is_markup_start()
                        || k.is_articulation()
                        || k.is_slur()
                        || k.is_beam()
                        || k == K::Dynamic
                        || k == K::Tweak
                        || (k == K::Command && self.text(t) == "\\tag")
                }
                None => false,
            };
            if follows {
                let child = self.read_item(t, &mut Source::Free);
                self.append(item, child);
            } else {
                self.pushback();
            }
        }
        item
    }

    // --- Assignments and blocks ---------------------------------------------

    fn read_assignment(&mut self, t: Lexeme) -> Option<ItemId> {
        let item = self.factory(I::Assignment, t);
        let mut free = Source::Free;
        while let Some(t) = self.next_skip(&mut free) {
            match ly(t) {
                Some(K::EqualSign) => {
                    self.tree.get_mut(item).tokens = vec![t];
                    let value = self.read_one(&mut Source::Free);
                    self.append(item, value);
                    return Some(item);
                }
                Some(K::SchemeStart) => {
                    // only one Scheme expression may name the variable
                    if let Some(scheme) = self.tree.find(item, I::Scheme) {
                        self.pushback();
                        return Some(scheme);
                    }
                    let scheme = self.read_scheme_item(t);
                    self.tree.append(item, scheme);
                }
                _ => {
                    self.pushback();
                    return None;
                }
            }
        }
        None
    }

    fn read_variable_assignment(&mut self, t: Lexeme) -> Option<ItemId> {
        let item = self.read_assignment(t)?;
        if let Some(t) = self.next_skip(&mut Source::Free) {
            if is(t, K::Unit) {
                let unit = self.factory(I::Command, t);
                self.tree.append(item, unit);
            } else {
                self.pushback();
            }
        }
        Some(item)
    }

    fn read_block(&mut self, kind: LyKind, t: Lexeme, src: &mut Source) -> ItemId {
        let item_kind = match kind {
            K::Header => I::Header,
            K::Score => I::Score,
            K::BookPart => I::BookPart,
            K::Book => I::Book,
            K::Paper => I::Paper,
            K::Layout => I::Layout,
            K::Midi => I::Midi,
            K::With => I::With,
            _ => I::LayoutContext,
        };
        let item = self.factory(item_kind, t);
        if !self.add_bracketed(item, src) && kind == K::With {
            // \with may also take a variable holding a block
            let value = self.read_one(src);
            self.append(item, value);
        }
        item
    }

    /// Reads a `{ ... }` block into `item`. Returns false without a bracket.
    fn add_bracketed(&mut self, item: ItemId, src: &mut Source) -> bool {
        while let Some(t) = self.next(src) {
            if is_open_bracket(t) {
                self.tree.get_mut(item).tokens = vec![t];
                self.read_bounded_into(item);
                return true;
            } else if !t.kind.is_space() {
                self.pushback();
                break;
            }
        }
        false
    }

    fn read_set(&mut self, t: Lexeme, src: &mut Source) -> ItemId {
        let item = self.factory(I::Set, t);
        let mut tokens = Vec::new();
        while let Some(t) = self.next_skip(src) {
            tokens.push(t);
            if is_equal_sign(t) {
                self.tree.get_mut(item).tokens = tokens;
                let value = self.read_one(src);
                self.append(item, value);
                break;
            }
        }
        item
    }

    fn read_unset(&mut self, t: Lexeme) -> ItemId {
        let item = self.factory(I::Unset, t);
        let mut src = self.consume();
        let mut tokens = Vec::new();
        while let Some(t) = self.next_skip(&mut src) {
            if !matches!(ly(t), Some(K::ContextName | K::DotSetOverride | K::ContextProperty | K::Name)) {
                self.pushback();
                break;
            }
            tokens.push(t);
        }
        self.tree.get_mut(item).tokens = tokens;
        item
    }

    fn read_override(&mut self, t: Lexeme) -> ItemId {
        let item = self.factory(I::Override, t);
        let mut src = self.consume();
        while let Some(t) = self.next_skip(&mut src) {
            if matches!(ly(t), Some(K::StringQuotedStart | K::SchemeStart)) {
                let child = self.read_item(t, &mut Source::Free);
                self.append(item, child);
            } else if is_equal_sign(t) {
                self.tree.get_mut(item).tokens = vec![t];
                let value = self.read_one(&mut Source::Free);
                self.append(item, value);
                break;
            } else {
                let path = self.factory(I::PathItem, t);
                self.tree.append(item, path);
            }
        }
        item
    }

    fn has_grob_property(&self, item: ItemId) -> bool {
        self.tree.children(item).iter().any(|&c| self.tree.item(c).token.is_some_and(|t| is(t, K::GrobProperty)))
    }

    fn read_revert(&mut self, t: Lexeme) -> ItemId {
        let item = self.factory(I::Revert, t);
        let mut src = self.consume();
        let mut stop = None;
        while let Some(t) = self.next_skip(&mut src) {
            if matches!(ly(t), Some(K::ContextName | K::DotSetOverride | K::GrobName | K::GrobProperty | K::Name)) {
                let path = self.factory(I::PathItem, t);
                self.tree.append(item, path);
            } else {
                stop = Some(t);
                break;
            }
        }
        match stop {
            Some(t) if is(t, K::SchemeStart) && !self.has_grob_property(item) => {
                let scheme = self.read_scheme_item(t);
                self.tree.append(item, scheme);
            }
            Some(_) => self.pushback(),
            None => {}
        }
        item
    }

    fn read_tweak(&mut self, t: Lexeme) -> ItemId {
        let item = self.factory(I::Tweak, t);
        let mut src = self.consume();
        while let Some(t) = self.next_skip(&mut src) {
            if matches!(ly(t), Some(K::GrobName | K::DotSetOverride | K::GrobProperty | K::Name)) {
                let path = self.factory(I::PathItem, t);
                self.tree.append(item, path);
                continue;
            }
            if is(t, K::SchemeStart) && self.tree.children(item).is_empty() {
                let scheme = self.read_scheme_item(t);
                self.tree.append(item, scheme);
            } else {
                self.pushback();
            }
            break;
        }
        let value = self.read_one(&mut Source::Free);
        self.append(item, value);
        item
    }

    // --- Commands -------------------------------------------------------------

    fn read_translator(&mut self, t: Lexeme, src: &mut Source) -> ItemId {
        let change = self.text(t) == "\\change";
        let item = self.factory(if change { I::Change } else { I::Context }, t);
        let (mut context, mut context_id) = (None, None);
        let mut inner = self.consume();
        if let Some(t) = self.next_skip(&mut inner) {
            if matches!(ly(t), Some(K::ContextName | K::Name)) {
                context = Some(t);
                while let Some(t) = self.next(&mut inner) {
                    if is(t, K::EqualSign) {
                        while let Some(t) = self.next(&mut inner) {
                            if is(t, K::StringQuotedStart) {
                                context_id = Some(Attr::Item(self.read_string(t)));
                                break;
                            } else if is(t, K::Name) {
                                context_id = Some(Attr::Token(t));
                                break;
                            } else if !t.kind.is_space() {
                                self.pushback();
                                break;
                            }
                        }
                    } else if !t.kind.is_space() {
                        self.pushback();
                        break;
                    }
                }
            } else {
                self.pushback();
            }
        }
        self.set_data(item, ItemData::Translator { context, context_id });
        if !change {
            while let Some(child) = self.read_one(src) {
                self.tree.append(item, child);
                if self.tree.kind(child) != I::With {
                    break;
                }
            }
        }
        item
    }

    fn read_clef(&mut self, t: Lexeme, src: &mut Source) -> ItemId {
        let item = self.factory(I::Clef, t);
        let mut specifier = None;
        if let Some(t) = self.next_skip(src) {
            if is(t, K::ClefSpecifier) {
                specifier = Some(Attr::Token(t));
            } else if is(t, K::StringQuotedStart) {
                specifier = Some(Attr::Item(self.read_string(t)));
            } else {
                self.pushback();
            }
        }
        self.set_data(item, ItemData::Clef { specifier });
        item
    }

    fn read_tempo(&mut self, t: Lexeme) -> ItemId {
        let item = self.factory(I::Tempo, t);
        let mut src = self.consume();
        let (mut equal_sign, mut text_seen) = (false, false);
        let mut last = None;
        while let Some(t) = self.next(&mut src) {
            last = Some(t);
            let kind = ly(t);
            if !equal_sign {
                let is_text = matches!(kind, Some(K::SchemeStart | K::StringQuotedStart))
                    || kind.is_some_and(LyKind::is_markup_start);
                if !text_seen && is_text {
                    let text = self.read_item(t, &mut Source::Free);
                    self.append(item, text);
                    text_seen = true;
                    last = None;
                } else if kind == Some(K::Length) {
                    self.add_duration(item, Some(t), &mut src);
                    last = None;
                } else if kind == Some(K::EqualSign) {
                    self.tree.get_mut(item).tokens = vec![t];
                    equal_sign = true;
                    last = None;
                }
            } else if matches!(kind, Some(K::IntegerValue | K::SchemeStart)) {
                let value = self.read_item(t, &mut Source::Free);
                self.append(item, value);
                last = None;
            } else if kind == Some(K::TempoSeparator) {
                self.tree.get_mut(item).tokens.push(t);
                last = None;
            }
        }
        if last.is_some_and(|t| !t.kind.is_space() && !t.kind.is_comment()) {
            self.pushback();
        }
        item
    }

    fn read_repeat(&mut self, t: Lexeme, src: &mut Source) -> ItemId {
        let item = self.factory(I::Repeat, t);
        let (mut specifier, mut count) = (None, None);
        while let Some(t) = self.next_skip(src) {
            match ly(t) {
                Some(K::RepeatSpecifier | K::RepeatStringSpecifier) => specifier = Some(Attr::Token(t)),
                Some(K::StringQuotedStart) if specifier.is_none() => {
                    specifier = Some(Attr::Item(self.read_string(t)));
                }
                Some(K::RepeatCount) => count = Some(Attr::Token(t)),
                Some(K::SchemeStart) => {
                    // #"volta" #2 or a computed count
                    let scheme = self.read_scheme_item(t);
                    if specifier.is_none() {
                        specifier = Some(Attr::Item(scheme));
                    } else if count.is_none() {
                        count = Some(Attr::Item(scheme));
                    } else {
                        self.tree.append(item, scheme);
                        break;
                    }
                }
                _ => {
                    self.pushback();
                    let body = self.read_one(src);
                    self.append(item, body);
                    if let Some(t) = self.next_skip(src) {
                        if ly(t).is_some_and(|k| k == K::Command) && self.text(t) == "\\alternative" {
                            let alternative = self.read_alternative(t, src);
                            self.tree.append(item, alternative);
                        } else {
                            self.pushback();
                        }
                    }
                    break;
                }
            }
        }
        self.set_data(item, ItemData::Repeat { specifier, count });
        item
    }

    fn read_alternative(&mut self, t: Lexeme, src: &mut Source) -> ItemId {
        let item = self.factory(I::Alternative, t);
        let endings = self.read_one(src);
        self.append(item, endings);
        item
    }

    fn read_lyric_mode(&mut self, t: Lexeme, src: &mut Source) -> ItemId {
        let lyricsto = self.text(t) == "\\lyricsto";
        let item = self.factory(if lyricsto { I::LyricsTo } else { I::LyricMode }, t);
        if lyricsto {
            let mut context_id = None;
            if let Some(t) = self.next_skip(src) {
                if is(t, K::Name) {
                    context_id = Some(Attr::Token(t));
                } else if matches!(ly(t), Some(K::StringQuotedStart | K::SchemeStart)) {
                    context_id = self.read_item(t, &mut Source::Free).map(Attr::Item);
                } else {
                    self.pushback();
                }
            }
            self.set_data(item, ItemData::Translator { context: None, context_id });
        }
        let mut inner = self.consume();
        if let Some(t) = self.next_skip(&mut inner) {
            let child = match self.read_lyric_item(t) {
                Some(child) => Some(child),
                None => self.read_item(t, &mut Source::Free),
            };
            self.append(item, child);
        }
        item
    }

    fn read_lyric_item(&mut self, t: Lexeme) -> Option<ItemId> {
        let kind = ly(t)?;
        if kind == K::StringQuotedStart || kind.is_markup_start() {
            let item = self.factory_at(I::LyricText, t.start);
            let text = self.read_item(t, &mut Source::Free);
            self.append(item, text);
            self.add_duration(item, None, &mut Source::Free);
            return Some(item);
        }
        match kind {
            K::LyricText => {
                let item = self.factory(I::LyricText, t);
                self.add_duration(item, None, &mut Source::Free);
                Some(item)
            }
            K::LyricHyphen | K::LyricExtender | K::LyricSkip | K::LyricTie => Some(self.factory(I::LyricItem, t)),
            _ => {
                let (item, inner) = self.test_music_list(t)?;
                if let Some(mut inner) = inner {
                    while let Some(t) = self.next_skip(&mut inner) {
                        let child = match self.read_lyric_item(t) {
                            Some(child) => Some(child),
                            None => self.read_item(t, &mut Source::Free),
                        };
                        self.append(item, child);
                    }
                    self.push_token(item, inner.last());
                }
                Some(item)
            }
        }
    }

    fn read_partcombine(&mut self, t: Lexeme) -> ItemId {
        let item = self.factory(I::PartCombine, t);
        for _ in 0..2 {
            let part = self.read_one(&mut Source::Free);
            self.append(item, part);
        }
        item
    }

    /// Commands and keywords dispatched on their name.
    fn read_command(&mut self, kind: LyKind, t: Lexeme, src: &mut Source) -> ItemId {
        let name = self.text(t);
        match name {
            "\\relative" => {
                let item = self.factory(I::Relative, t);
                let mut pitch_found = false;
                while let Some(child) = self.read_one(src) {
                    self.tree.append(item, child);
                    if !pitch_found && self.tree.kind(child) == I::Note {
                        pitch_found = true;
                        continue;
                    }
                    break;
                }
                item
            }
            "\\absolute" => self.read_arguments(I::Absolute, t, src, 1),
            "\\transpose" => {
                let item = self.factory(I::Transpose, t);
                let mut notes = 0;
                while let Some(child) = self.read_one(src) {
                    self.tree.append(item, child);
                    if notes < 2 && self.tree.kind(child) == I::Note {
                        notes += 1;
                        continue;
                    }
                    break;
                }
                item
            }
            "\\key" => self.read_arguments(I::KeySignature, t, src, 2),
            "\\times" | "\\tuplet" | "\\scaleDurations" => self.read_scaler(t, src),
            _ if TAG_COMMANDS.contains(&name) => {
                let count = if matches!(name, "\\appendToTag" | "\\pushToTag") { 3 } else { 2 };
                self.read_arguments(I::Tag, t, &mut Source::Free, count)
            }
            _ if GRACE_COMMANDS.contains(&name) => self.read_arguments(I::Grace, t, src, 1),
            "\\afterGrace" => {
                let item = self.read_arguments(I::AfterGrace, t, src, 2);
                if let [_, second] = self.tree.children(item)[..] {
                    let position = self.tree.item(second).position;
                    let grace = self.factory_at(I::Grace, position);
                    self.tree.append(grace, second);
                    self.tree.append(item, grace);
                }
                item
            }
            "\\alternative" => self.read_alternative(t, src),
            "\\time" => self.read_time_signature(t, src),
            "\\partial" => {
                let item = self.factory(I::Partial, t);
                self.add_duration(item, None, src);
                item
            }
            "\\stringTuning" => self.read_arguments(I::StringTuning, t, src, 1),
            "\\partCombine" | "\\partcombine" => self.read_partcombine(t),
            "\\language" => self.read_language(t, src),
            "\\include" => self.read_include(t, src),
            "\\version" => self.read_arguments(I::Version, t, src, 1),
            _ if kind == K::Keyword => self.factory(I::Keyword, t),
            _ => self.factory(I::Command, t),
        }
    }

    fn read_arguments(&mut self, kind: ItemKind, t: Lexeme, src: &mut Source, count: usize) -> ItemId {
        let item = self.factory(kind, t);
        for _ in 0..count {
            let Some(child) = self.read_one(src) else { break };
            self.tree.append(item, child);
        }
        item
    }

    fn read_scaler(&mut self, t: Lexeme, src: &mut Source) -> ItemId {
        let item = self.factory(I::Scaler, t);
        let (mut numerator, mut denominator) = (0, 0);
        let mut scaling = Fraction::from_integer(1);
        match self.text(t) {
            "\\scaleDurations" => {
                if let Some(value) = self.read_one(src) {
                    self.tree.append(item, value);
                    match self.tree.kind(value) {
                        I::Number => {
                            if let Some(f) = number_value(&self.tree, self.text, value).and_then(|n| n.as_fraction()) {
                                scaling = f;
                            }
                        }
                        I::Scheme => {
                            let pair = scheme_pair_ints(&self.tree, self.text, value)
                                .filter(|&(_, den)| den != 0)
                                .map(|(num, den)| Fraction::new(num, den));
                            if let Some(f) = pair.or_else(|| scheme_fraction(&self.tree, self.text, value)) {
                                scaling = f;
                            }
                        }
                        _ => {}
                    }
                }
            }
            name => {
                let tuplet = name == "\\tuplet";
                while let Some(t) = self.next(src) {
                    if is(t, K::Fraction) {
                        let number = self.factory(I::Number, t);
                        self.tree.append(item, number);
                        if let Some((num, den)) = parse_ints(self.text(t)) {
                            numerator = num;
                            denominator = den;
                            if num != 0 && den != 0 {
                                scaling = if tuplet { Fraction::new(den, num) } else { Fraction::new(num, den) };
                            }
                        }
                        if !tuplet {
                            break;
                        }
                    } else if tuplet && is(t, K::Length) {
                        // optional tuplet span duration
                        self.add_duration(item, Some(t), src);
                        break;
                    } else if !t.kind.is_space() {
                        self.pushback();
                        break;
                    }
                }
            }
        }
        self.set_data(item, ItemData::Scaler { numerator, denominator, scaling });
        let music = self.read_one(src);
        self.append(item, music);
        item
    }

    fn read_time_signature(&mut self, t: Lexeme, src: &mut Source) -> ItemId {
        let item = self.factory(I::TimeSignature, t);
        let mut numerator = 4;
        let mut fraction = Fraction::new(1, 4);
        let mut beat_structure = None;
        while let Some(t) = self.next_skip(src) {
            if is(t, K::SchemeStart) {
                beat_structure = Some(self.read_scheme_item(t));
                continue;
            }
            if is(t, K::Fraction) {
                if let Some((num, den)) = parse_ints(self.text(t)).filter(|&(_, den)| den != 0) {
                    numerator = num;
                    fraction = Fraction::new(1, den);
                }
            } else {
                self.pushback();
            }
            break;
        }
        self.set_data(item, ItemData::TimeSignature { numerator, fraction, beat_structure });
        item
    }

    fn read_language(&mut self, t: Lexeme, src: &mut Source) -> ItemId {
        let item = self.factory(I::Language, t);
        let mut language = None;
        if let Some(name) = self.read_one(src) {
            self.tree.append(item, name);
            if self.tree.kind(name) == I::String {
                let value = string_value(&self.tree, self.text, name);
                if pitch::is_language(&value) {
                    self.language = value.clone();
                } else {
                    warn!(target: "lilyparse::music", language = %value, "unknown pitch name language");
                }
                language = Some(value);
            }
        }
        self.set_data(item, ItemData::Language(language));
        item
    }

    /// `\include "deutsch.ly"` also switches the pitch name language.
    fn read_include(&mut self, t: Lexeme, src: &mut Source) -> ItemId {
        let name = self.read_one(src);
        if let Some(name) = name.filter(|&n| self.tree.kind(n) == I::String) {
            let value = string_value(&self.tree, self.text, name);
            if let Some(lang) = value.strip_suffix(".ly").filter(|l| pitch::is_language(l)) {
                let item = self.factory(I::Language, t);
                self.language = lang.to_string();
                self.set_data(item, ItemData::Language(Some(lang.to_string())));
                self.tree.append(item, name);
                return item;
            }
        }
        let item = self.factory(I::Include, t);
        self.append(item, name);
        item
    }

    // --- Markup -------------------------------------------------------------

    fn add_markup_arguments(&mut self, item: ItemId) {
        let mut src = self.consume();
        while let Some(t) = self.next(&mut src) {
            if let Some(child) = self.read_markup(t) {
                self.tree.append(item, child);
            } else if self.tree.kind(item) == I::MarkupList && is(t, K::CloseBracketMarkup) {
                self.tree.get_mut(item).tokens = vec![t];
            }
        }
    }

    fn read_markup(&mut self, t: Lexeme) -> Option<ItemId> {
        self.nested(t, |r| r.markup_item(t))
    }

    fn markup_item(&mut self, t: Lexeme) -> Option<ItemId> {
        match ly(t)? {
            K::SchemeStart => Some(self.read_scheme_item(t)),
            K::StringQuotedStart => Some(self.read_string(t)),
            K::MarkupScore => {
                let item = self.factory(I::MarkupScore, t);
                let mut src = self.consume();
                while let Some(t) = self.next(&mut src) {
                    if is_open_bracket(t) {
                        self.tree.get_mut(item).tokens = vec![t];
                        self.read_bounded_into(item);
                        break;
                    }
                }
                Some(item)
            }
            K::MarkupCommand => {
                let item = self.factory(I::MarkupCommand, t);
                if markup_nargs(self.text(t).get(1..).unwrap_or_default()) != Some(0) {
                    self.add_markup_arguments(item);
                }
                Some(item)
            }
            K::MarkupUserCommand => Some(self.factory(I::MarkupUserCommand, t)),
            K::OpenBracketMarkup => {
                let item = self.factory(I::MarkupList, t);
                self.add_markup_arguments(item);
                Some(item)
            }
            K::MarkupWord => Some(self.factory(I::MarkupWord, t)),
            _ => None,
        }
    }

    // --- Strings and Scheme -------------------------------------------------

    fn read_string(&mut self, t: Lexeme) -> ItemId {
        let item = self.factory(I::String, t);
        let mut src = self.consume();
        let mut tokens = Vec::new();
        while let Some(t) = self.next(&mut src) {
            tokens.push(t);
        }
        self.tree.get_mut(item).tokens = tokens;
        item
    }

    fn read_scheme_item(&mut self, t: Lexeme) -> ItemId {
        let item = self.factory(I::Scheme, t);
        let mut src = self.consume();
        while let Some(t) = self.next(&mut src) {
            if t.kind.is_space() {
                continue;
            }
            if let Some(child) = self.read_scheme(t) {
                self.tree.append(item, child);
                break;
            }
        }
        item
    }

    fn read_scheme(&mut self, t: Lexeme) -> Option<ItemId> {
        self.nested(t, |r| r.scheme_form(t))
    }

    fn scheme_form(&mut self, t: Lexeme) -> Option<ItemId> {
        let kind = t.kind.as_scheme()?;
        match kind {
            SchemeKind::Quote => {
                let item = self.factory(I::SchemeQuote, t);
                let mut src = self.consume();
                while let Some(t) = self.next(&mut src) {
                    if let Some(child) = self.read_scheme(t) {
                        self.tree.append(item, child);
                        break;
                    }
                }
                Some(item)
            }
            SchemeKind::OpenParen | SchemeKind::VectorStart => {
                let item = self.factory(I::SchemeList, t);
                let mut src = self.consume();
                while let Some(t) = self.next(&mut src) {
                    if let Some(child) = self.read_scheme(t) {
                        self.tree.append(item, child);
                    }
                }
                self.push_token(item, src.last());
                Some(item)
            }
            SchemeKind::StringQuotedStart => Some(self.read_string(t)),
            SchemeKind::LilyPondStart => {
                let item = self.factory(I::SchemeLily, t);
                self.read_bounded_into(item);
                Some(item)
            }
            k if k.is_atom() => Some(self.factory(I::SchemeItem, t)),
            _ => None,
        }
    }
}

fn parse_ints(text: &str) -> Option<(i64, i64)> {
    let (num, den) = text.split_once('/')?;
    Some((num.trim().parse().ok()?, den.trim().parse().ok()?))
}
