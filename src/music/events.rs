//! Musical time.
//!
//! [`Events`] walks music items and adds up their durations:
//!
//! ```text
//!   durable leaf        time + base * scaling * ambient scaling
//!   { ... }             children in order
//!   << ... >>           max over the children, each from the same time
//!   \tuplet 3/2 { }     children with scaling * 2/3
//!   \grace { }          children with scaling 0
//!   \tag / \partCombine last child / max over both parts
//!   \repeat             count times (see below), or once for volta
//!   \name               the assigned value, resolved through the document
//! ```
//!
//! Cursor positions are turned into time by walking from the node at the
//! position up to the outermost music expression and collecting, per level,
//! the siblings that precede it in time.

use super::{Document, Fraction, ItemData, ItemId, ItemKind, Tree};
use crate::api::Options;
use num_traits::{CheckedAdd, CheckedMul, CheckedSub};
use std::sync::Arc;
use tracing::warn;

use ItemKind as I;

fn zero() -> Fraction {
    Fraction::from_integer(0)
}

fn one() -> Fraction {
    Fraction::from_integer(1)
}

/// A time walker with its repeat policy and depth guards.
///
/// Every item walked into counts one level of nesting; a variable reference
/// additionally counts towards `max_depth`. Past either bound the item is
/// counted as empty. Arithmetic that overflows marks the whole walk as
/// overflowed, and [`Events::read`] then returns `None`.
#[derive(Debug, Clone)]
pub struct Events {
    pub unfold_repeats: bool,
    pub max_depth: usize,
    pub max_nesting: usize,
    depth: usize,
    nesting: usize,
    overflowed: bool,
}

impl Events {
    pub fn new(options: &Options) -> Self {
        Events {
            unfold_repeats: options.unfold_repeats,
            max_depth: options.max_reference_depth,
            max_nesting: options.max_nesting_depth,
            depth: 0,
            nesting: 0,
            overflowed: false,
        }
    }

    /// The length of `id`, starting at time zero; `None` when it does not
    /// fit an `i64` fraction.
    pub fn read(&mut self, doc: &Arc<Document>, id: ItemId) -> Option<Fraction> {
        let time = self.traverse(doc, id, zero(), one());
        (!self.overflowed).then_some(time)
    }

    /// Whether some sum or product of this walk overflowed.
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    fn overflow(&mut self) {
        if !self.overflowed {
            warn!(target: "lilyparse::music", "musical time overflows, length unresolved");
        }
        self.overflowed = true;
    }

    /// `time + length * factor`, or `time` on overflow.
    fn advance(&mut self, time: Fraction, length: Fraction, factor: Fraction) -> Fraction {
        match length.checked_mul(&factor).and_then(|l| time.checked_add(&l)) {
            Some(time) => time,
            None => {
                self.overflow();
                time
            }
        }
    }

    /// `a * b`, or zero on overflow.
    fn scale(&mut self, a: Fraction, b: Fraction) -> Fraction {
        a.checked_mul(&b).unwrap_or_else(|| {
            self.overflow();
            zero()
        })
    }

    /// Returns the time after `id`, given the time before it and the
    /// scaling in effect.
    pub fn traverse(&mut self, doc: &Arc<Document>, id: ItemId, time: Fraction, scaling: Fraction) -> Fraction {
        if self.nesting >= self.max_nesting {
            warn!(
                target: "lilyparse::music",
                nesting = self.nesting,
                "music nested too deep, counted as empty"
            );
            return time;
        }
        self.nesting += 1;
        let time = self.walk(doc, id, time, scaling);
        self.nesting -= 1;
        time
    }

    fn walk(&mut self, doc: &Arc<Document>, id: ItemId, time: Fraction, scaling: Fraction) -> Fraction {
        let tree = doc.tree();
        let item = tree.item(id);
        if item.kind.is_durable() {
            return match item.duration_or_zero().checked_length() {
                Some(length) => self.advance(time, length, scaling),
                None => {
                    self.overflow();
                    time
                }
            };
        }
        if !item.kind.is_music() {
            return time;
        }
        match (&item.kind, &item.data) {
            (I::MusicList, ItemData::MusicList { simultaneous: true }) | (I::PartCombine, _) => {
                self.parallel(doc, id, time, scaling)
            }
            (I::Tag, _) => match tree.children(id).last() {
                Some(&last) => self.traverse(doc, last, time, scaling),
                None => time,
            },
            (I::Scaler, ItemData::Scaler { scaling: own, .. }) => {
                let scaling = self.scale(scaling, *own);
                self.sequence(doc, tree.children(id), time, scaling)
            }
            (I::Grace, _) => self.sequence(doc, tree.children(id), time, zero()),
            (I::Repeat, _) => self.repeat(doc, id, time, scaling),
            (I::UserCommand, _) => self.reference(doc, id, time, scaling),
            _ => self.sequence(doc, tree.children(id), time, scaling),
        }
    }

    fn sequence(&mut self, doc: &Arc<Document>, items: &[ItemId], time: Fraction, scaling: Fraction) -> Fraction {
        items.iter().fold(time, |time, &child| self.traverse(doc, child, time, scaling))
    }

    fn parallel(&mut self, doc: &Arc<Document>, id: ItemId, time: Fraction, scaling: Fraction) -> Fraction {
        let children = doc.tree().children(id);
        children.iter().map(|&child| self.traverse(doc, child, time, scaling)).max().unwrap_or(time)
    }

    /// With `count` repeats and fewer endings, the first ending is repeated
    /// in front until there is one ending per repeat.
    fn repeat(&mut self, doc: &Arc<Document>, id: ItemId, time: Fraction, scaling: Fraction) -> Fraction {
        let tree = doc.tree();
        let children = tree.children(id);
        let (body, alternative) = match children.split_last() {
            Some((&last, body)) if tree.kind(last) == I::Alternative => (body, Some(last)),
            _ => (children, None),
        };
        if !self.unfold_repeats && doc.repeat_specifier(id).as_deref() == Some("volta") {
            let time = self.sequence(doc, body, time, scaling);
            return match alternative {
                Some(alt) => self.traverse(doc, alt, time, scaling),
                None => time,
            };
        }
        // the body takes the same time on every pass
        let count = doc.repeat_count(id).max(1);
        let body_length = self.sequence(doc, body, zero(), scaling);
        let endings = alternative.and_then(|alt| tree.children(alt).first()).map(|&list| tree.children(list));
        let Some(endings) = endings.filter(|e| !e.is_empty()) else {
            return self.advance(time, body_length, Fraction::from_integer(count));
        };
        let taken = endings.len().min(usize::try_from(count).unwrap_or(usize::MAX).saturating_add(1));
        let endings = &endings[..taken];
        let pad = count.saturating_sub(taken as i64);
        let mut time = time;
        if pad > 0 {
            let first = self.traverse(doc, endings[0], body_length, scaling);
            time = self.advance(time, first, Fraction::from_integer(pad));
        }
        for &ending in endings {
            time = self.advance(time, body_length, one());
            time = self.traverse(doc, ending, time, scaling);
        }
        time
    }

    fn reference(&mut self, doc: &Arc<Document>, id: ItemId, time: Fraction, scaling: Fraction) -> Fraction {
        if self.depth >= self.max_depth {
            warn!(
                target: "lilyparse::music",
                name = doc.item_text(id),
                depth = self.depth,
                "variable reference nested too deep, counted as empty"
            );
            return time;
        }
        let Some((value_doc, value)) = doc.user_command_value(id) else { return time };
        self.depth += 1;
        let time = self.traverse(&value_doc, value, time, scaling);
        self.depth -= 1;
        time
    }
}

/// One level of the path from a position up to the outermost music: the
/// container, the items before the position in time and the container's
/// own scaling.
pub type EventLevel = (ItemId, Vec<ItemId>, Fraction);

/// Children of `parent` that come before `node` in time (all of them for
/// `None`), with the scaling `parent` applies.
pub fn preceding(doc: &Document, parent: ItemId, node: Option<ItemId>) -> (Vec<ItemId>, Fraction) {
    let tree = doc.tree();
    let item = tree.item(parent);
    let before = || {
        let children = tree.children(parent);
        let end = node.and_then(|n| children.iter().position(|&c| c == n)).unwrap_or(children.len());
        children[..end].to_vec()
    };
    match (&item.kind, &item.data) {
        (I::MusicList, ItemData::MusicList { simultaneous: true }) | (I::Tag, _) | (I::PartCombine, _) => {
            (Vec::new(), one())
        }
        (I::Scaler, ItemData::Scaler { scaling, .. }) => (before(), *scaling),
        (I::Grace, _) => (before(), zero()),
        _ => (before(), one()),
    }
}

fn is_timed(kind: ItemKind) -> bool {
    kind.is_music() || kind.is_durable()
}

/// The levels of music that lead to `position`, outermost first. Empty
/// when the position is not inside music.
pub fn music_events_til_position(doc: &Document, position: usize) -> Vec<EventLevel> {
    let tree = doc.tree();
    let mut node = tree.node(position, None);
    // an assignment of music at toplevel counts as music itself
    if tree.kind(node) == I::Assignment
        && tree.parent(node) == Some(ItemId::ROOT)
        && doc.assignment_value(node).is_some_and(|v| tree.kind(v).is_music())
    {
        return vec![(node, Vec::new(), one())];
    }
    if let Some(chord) = tree.parent(node).filter(|&p| tree.kind(p) == I::Chord) {
        node = chord;
    }

    let mut levels = Vec::new();
    let mut mus = is_timed(tree.kind(node));
    if mus {
        levels.push((node, Vec::new(), one()));
    }
    let ancestors: Vec<ItemId> = tree.ancestors(node).collect();
    for p in ancestors {
        let pmus = tree.kind(p).is_music();
        let end = tree.end_position(node);
        if pmus {
            if position > end {
                let (before, s) = preceding(doc, p, tree.next_sibling(node));
                levels = vec![(p, before, s)];
            } else if position == end {
                let (mut before, s) = preceding(doc, p, Some(node));
                before.push(node);
                levels = vec![(p, before, s)];
            } else {
                let (before, s) = preceding(doc, p, Some(node));
                levels.push((p, before, s));
            }
        } else if mus {
            // the outermost music expression
            if position > end {
                return Vec::new();
            } else if position == end {
                levels = vec![(p, vec![node], one())];
            } else {
                levels.push((p, Vec::new(), one()));
            }
            break;
        }
        node = p;
        mus = pmus;
    }
    levels.reverse();
    levels
}

pub fn time_position(doc: &Arc<Document>, position: usize) -> Option<Fraction> {
    let levels = music_events_til_position(doc, position);
    if levels.is_empty() {
        return None;
    }
    let mut events = Events::new(doc.options());
    let mut time = zero();
    for (n, scaling) in flatten(levels, &mut events) {
        time = events.traverse(doc, n, time, scaling);
    }
    (!events.overflowed()).then_some(time)
}

/// The outermost music expression around the node at `position`.
fn music_parent(tree: &Tree, position: usize) -> Option<ItemId> {
    let mut node = tree.node(position, None);
    let mut mus = tree.kind(node).is_music();
    for p in tree.ancestors(node) {
        let pmus = tree.kind(p).is_music();
        if mus && !pmus {
            return Some(node);
        }
        mus = pmus;
        node = p;
    }
    None
}

fn flatten(levels: Vec<EventLevel>, events: &mut Events) -> Vec<(ItemId, Fraction)> {
    let mut scaling = one();
    let mut out = Vec::new();
    for (_, nodes, s) in levels {
        scaling = events.scale(scaling, s);
        out.extend(nodes.into_iter().map(|n| (n, scaling)));
    }
    out
}

/// The time between two positions, when both are in the same outermost
/// music expression.
pub fn time_length(doc: &Arc<Document>, start: usize, end: usize) -> Option<Fraction> {
    let (start, end) = if start > end { (end, start) } else { (start, end) };
    let start_levels = music_events_til_position(doc, start);
    let end_levels = music_events_til_position(doc, end);
    if start_levels.first()?.0 != end_levels.first()?.0
        || music_parent(doc.tree(), start) != music_parent(doc.tree(), end)
    {
        return None;
    }
    let mut events = Events::new(doc.options());
    let start_events = flatten(start_levels, &mut events);
    let end_events = flatten(end_levels, &mut events);
    let common = start_events.iter().zip(&end_events).take_while(|(a, b)| a.0 == b.0).count();
    let mut time = zero();
    for &(n, s) in &start_events[..common] {
        time = events.traverse(doc, n, time, s);
    }
    let mut end_time = time;
    for &(n, s) in &start_events[common..] {
        time = events.traverse(doc, n, time, s);
    }
    for &(n, s) in &end_events[common..] {
        end_time = events.traverse(doc, n, end_time, s);
    }
    if events.overflowed() {
        return None;
    }
    end_time.checked_sub(&time)
}
