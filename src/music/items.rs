//! The item arena.
//!
//! Items live in one `Vec` owned by the [`Tree`] and refer to each other by
//! [`ItemId`]. The root (kind `Document`) is always at index 0. Items that
//! are only referenced as attributes of another item (a repeat specifier
//! string, a context id, a time signature's beat structure) are stored in
//! the arena without a structural parent.

use super::{Duration, Fraction, Pitch};
use crate::lex::TokenKind;

crate::kind_enum! {
    /// What an item stands for.
    pub enum ItemKind {
        Document,
        // durable leaves
        Note, Rest, Skip, Q, Chord, Unpitched, LyricText,
        WrittenDuration,
        // music expressions
        MusicList, Tag, Scaler, Grace, AfterGrace, PartCombine,
        Relative, Absolute, Transpose, Repeat, Alternative,
        NoteMode, ChordMode, DrumMode, FigureMode, LyricMode, LyricsTo,
        Context, UserCommand,
        // other music content
        LyricItem, ChordSpecifier, ChordItem, Tremolo, Change,
        Tempo, TimeSignature, Partial, Clef, KeySignature,
        PipeSymbol, VoiceSeparator, Postfix, Tie, Slur, PhrasingSlur, Beam,
        Dynamic, Articulation, StringTuning,
        Keyword, Command, Version, Include, Language,
        // markup
        Markup, MarkupCommand, MarkupUserCommand, MarkupScore, MarkupList, MarkupWord,
        // toplevel and blocks
        Assignment, Book, BookPart, Score, Header, Paper, Layout, Midi, LayoutContext, With,
        Set, Unset, Override, Revert, Tweak, PathItem,
        // values
        String, Number, Scheme, SchemeItem, SchemeList, SchemeQuote, SchemeLily,
    }
}

impl ItemKind {
    /// Music expressions: items whose children make up their time.
    pub fn is_music(self) -> bool {
        use ItemKind as I;
        matches!(
            self,
            I::MusicList
                | I::Tag
                | I::Scaler
                | I::Grace
                | I::AfterGrace
                | I::PartCombine
                | I::Relative
                | I::Absolute
                | I::Transpose
                | I::Repeat
                | I::Alternative
                | I::NoteMode
                | I::ChordMode
                | I::DrumMode
                | I::FigureMode
                | I::LyricMode
                | I::LyricsTo
                | I::Context
                | I::UserCommand
        )
    }

    /// Leaves that take time of their own.
    pub fn is_durable(self) -> bool {
        use ItemKind as I;
        matches!(self, I::Note | I::Rest | I::Skip | I::Q | I::Chord | I::Unpitched | I::LyricText)
    }

    pub fn is_input_mode(self) -> bool {
        use ItemKind as I;
        matches!(self, I::NoteMode | I::ChordMode | I::DrumMode | I::FigureMode | I::LyricMode | I::LyricsTo)
    }
}

/// Index of an item in its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub(crate) usize);

impl ItemId {
    pub const ROOT: ItemId = ItemId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// A token as the tree keeps it: a span of the document text and a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lexeme {
    pub start: usize,
    pub end: usize,
    pub kind: TokenKind,
}

/// An attribute that is either a bare token or an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attr {
    Token(Lexeme),
    Item(ItemId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanEvent {
    Start,
    Stop,
}

/// Per-kind data.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ItemData {
    #[default]
    None,
    Note {
        pitch: Pitch,
        octave: Option<Lexeme>,
        accidental: Option<Lexeme>,
        octave_check: Option<Lexeme>,
    },
    MusicList {
        simultaneous: bool,
    },
    Scaler {
        numerator: i64,
        denominator: i64,
        scaling: Fraction,
    },
    Repeat {
        specifier: Option<Attr>,
        count: Option<Attr>,
    },
    /// `\new`, `\context`, `\change` and `\lyricsto`.
    Translator {
        context: Option<Lexeme>,
        context_id: Option<Attr>,
    },
    Clef {
        specifier: Option<Attr>,
    },
    TimeSignature {
        numerator: i64,
        fraction: Fraction,
        beat_structure: Option<ItemId>,
    },
    Language(Option<String>),
    Span(SpanEvent),
    /// `-1` below (`_`), `0` neutral (`-`), `1` above (`^`).
    Direction(i8),
}

/// One node of the music tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub kind: ItemKind,
    /// Where the item starts in the document text.
    pub position: usize,
    /// The token that starts the item, if any.
    pub token: Option<Lexeme>,
    /// Other tokens that belong to the item (closing brackets, `=`, ...).
    pub tokens: Vec<Lexeme>,
    pub parent: Option<ItemId>,
    pub children: Vec<ItemId>,
    pub duration: Option<Duration>,
    pub data: ItemData,
}

impl Item {
    fn new(kind: ItemKind, position: usize, token: Option<Lexeme>) -> Self {
        Item {
            kind,
            position,
            token,
            tokens: Vec::new(),
            parent: None,
            children: Vec::new(),
            duration: None,
            data: ItemData::None,
        }
    }

    /// The duration pair, zero for items without one.
    pub fn duration_or_zero(&self) -> Duration {
        self.duration.unwrap_or(Duration::ZERO)
    }

    /// Items referenced as attributes rather than children.
    pub fn attribute_items(&self) -> Vec<ItemId> {
        let attr = |a: &Option<Attr>| match a {
            Some(Attr::Item(id)) => Some(*id),
            _ => None,
        };
        match &self.data {
            ItemData::Repeat { specifier, count } => [attr(specifier), attr(count)].into_iter().flatten().collect(),
            ItemData::Translator { context_id, .. } => attr(context_id).into_iter().collect(),
            ItemData::Clef { specifier } => attr(specifier).into_iter().collect(),
            ItemData::TimeSignature { beat_structure, .. } => beat_structure.iter().copied().collect(),
            _ => Vec::new(),
        }
    }

    fn attribute_tokens(&self) -> Vec<Lexeme> {
        let attr = |a: &Option<Attr>| match a {
            Some(Attr::Token(t)) => Some(*t),
            _ => None,
        };
        match &self.data {
            ItemData::Note { octave, accidental, octave_check, .. } => {
                [*octave, *accidental, *octave_check].into_iter().flatten().collect()
            }
            ItemData::Repeat { specifier, count } => [attr(specifier), attr(count)].into_iter().flatten().collect(),
            ItemData::Translator { context, context_id } => {
                [*context, attr(context_id)].into_iter().flatten().collect()
            }
            ItemData::Clef { specifier } => attr(specifier).into_iter().collect(),
            _ => Vec::new(),
        }
    }
}

/// The arena of items of one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    items: Vec<Item>,
}

impl Default for Tree {
    fn default() -> Self {
        Tree::new()
    }
}

impl Tree {
    pub fn new() -> Self {
        Tree { items: vec![Item::new(ItemKind::Document, 0, None)] }
    }

    pub(crate) fn add(&mut self, kind: ItemKind, position: usize, token: Option<Lexeme>) -> ItemId {
        self.items.push(Item::new(kind, position, token));
        ItemId(self.items.len() - 1)
    }

    /// Makes `child` the last child of `parent`, detaching it from a
    /// previous parent.
    pub(crate) fn append(&mut self, parent: ItemId, child: ItemId) {
        if let Some(old) = self.items[child.0].parent {
            self.items[old.0].children.retain(|&c| c != child);
        }
        self.items[child.0].parent = Some(parent);
        self.items[parent.0].children.push(child);
    }

    pub(crate) fn get_mut(&mut self, id: ItemId) -> &mut Item {
        &mut self.items[id.0]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.len() <= 1
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id.0)
    }

    pub fn item(&self, id: ItemId) -> &Item {
        &self.items[id.0]
    }

    pub fn kind(&self, id: ItemId) -> ItemKind {
        self.items[id.0].kind
    }

    pub fn children(&self, id: ItemId) -> &[ItemId] {
        &self.items[id.0].children
    }

    pub fn parent(&self, id: ItemId) -> Option<ItemId> {
        self.items[id.0].parent
    }

    /// Parent, grandparent, ... up to the root.
    pub fn ancestors(&self, id: ItemId) -> impl Iterator<Item = ItemId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// All descendants in document order (depth first, pre-order).
    pub fn descendants(&self, id: ItemId) -> Vec<ItemId> {
        let mut out = Vec::new();
        let mut stack: Vec<ItemId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// First descendant of `kind`, in document order.
    pub fn find(&self, id: ItemId, kind: ItemKind) -> Option<ItemId> {
        self.descendants(id).into_iter().find(|&d| self.kind(d) == kind)
    }

    pub fn index_in_parent(&self, id: ItemId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn next_sibling(&self, id: ItemId) -> Option<ItemId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    /// Where the item ends, including its children and attributes.
    pub fn end_position(&self, id: ItemId) -> usize {
        let item = self.item(id);
        let own = match (item.tokens.last(), item.token) {
            (Some(last), _) => last.end,
            (None, Some(token)) => token.end,
            (None, None) => item.position,
        };
        let last_child = item.children.last().map(|&c| self.end_position(c));
        let attr_items = item.attribute_items().into_iter().map(|a| self.end_position(a));
        let attr_tokens = item.attribute_tokens().into_iter().map(|t| t.end);
        std::iter::once(own).chain(last_child).chain(attr_items).chain(attr_tokens).max().unwrap_or(own)
    }

    /// The deepest node at or just before `position`, descending at most
    /// `depth` levels (`None` is unlimited).
    pub fn node(&self, position: usize, depth: Option<usize>) -> ItemId {
        let mut node = ItemId::ROOT;
        let mut depth = depth;
        loop {
            let children = self.children(node);
            if depth == Some(0) || children.is_empty() {
                return node;
            }
            // index of the first child starting after `position`
            let after = children.partition_point(|&c| self.item(c).position <= position);
            let Some(index) = after.checked_sub(1) else { return node };
            let child = children[index];
            if self.item(child).position == position {
                return child;
            }
            node = child;
            depth = depth.map(|d| d - 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(positions: &[usize]) -> Tree {
        let mut tree = Tree::new();
        for &p in positions {
            let id = tree.add(ItemKind::Note, p, None);
            tree.append(ItemId::ROOT, id);
        }
        tree
    }

    #[test]
    fn node_bisects_children() {
        let tree = tree(&[0, 10, 25]);
        assert_eq!(tree.item(tree.node(17, None)).position, 10);
        assert_eq!(tree.item(tree.node(25, None)).position, 25);
        assert_eq!(tree.item(tree.node(40, None)).position, 25);
        assert_eq!(tree.node(17, Some(0)), ItemId::ROOT);
    }

    #[test]
    fn node_descends_into_children() {
        let mut tree = tree(&[0, 10]);
        let inner = tree.add(ItemKind::Rest, 14, None);
        tree.append(ItemId(2), inner);
        assert_eq!(tree.node(15, None), inner);
        assert_eq!(tree.node(15, Some(1)), ItemId(2));
        assert_eq!(tree.node(12, None), ItemId(2));
    }

    #[test]
    fn append_moves_a_child() {
        let mut tree = tree(&[0, 10]);
        tree.append(ItemId(2), ItemId(1));
        assert_eq!(tree.children(ItemId::ROOT), [ItemId(2)]);
        assert_eq!(tree.parent(ItemId(1)), Some(ItemId(2)));
        assert_eq!(tree.ancestors(ItemId(1)).collect::<Vec<_>>(), [ItemId(2), ItemId::ROOT]);
    }

    #[test]
    fn descendants_in_document_order() {
        let mut tree = tree(&[0, 10]);
        let a = tree.add(ItemKind::Rest, 1, None);
        tree.append(ItemId(1), a);
        assert_eq!(tree.descendants(ItemId::ROOT), [ItemId(1), a, ItemId(2)]);
        assert_eq!(tree.find(ItemId::ROOT, ItemKind::Rest), Some(a));
    }
}
