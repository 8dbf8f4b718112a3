//! A built document and the resolver that connects it to the files it
//! includes.
//!
//! ```text
//!   root.ly ──\include "a.ly"──> a.ly ──\include "b.ly"──> b.ly
//!      │                          │ include_node (weak)      │
//!      └── include cache <────────┴──────────────────────────┘
//!          (path -> Document, owned by the root)
//! ```
//!
//! Includes are resolved on first use and memoised per `Include` item.
//! Variable references look backwards through the toplevel items of their
//! document and then up the include chain.

use super::events::{self, Events};
use super::read::{self, Scanned};
use super::values::{self, NumberValue};
use super::{Attr, Duration, Fraction, ItemData, ItemId, ItemKind, Tree};
use crate::api::{FileLoader, Options};
use num_traits::CheckedMul;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

use ItemKind as I;

type IncludeCache = Mutex<HashMap<PathBuf, Arc<Document>>>;

/// One parsed text with its item tree.
///
/// Documents are always handed out as `Arc<Document>`; included documents
/// live as long as the root document that resolved them.
pub struct Document {
    text: String,
    filename: Option<PathBuf>,
    tokens: Vec<Scanned>,
    tree: Tree,
    options: Options,
    loader: Option<FileLoader>,
    this: Weak<Document>,
    /// The `Include` item this document was first resolved from.
    include_node: Option<(Weak<Document>, ItemId)>,
    /// Set on the root only; everyone else refers to it through `cache`.
    own_cache: Option<Arc<IncludeCache>>,
    cache: Weak<IncludeCache>,
    includes: Mutex<HashMap<ItemId, Weak<Document>>>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("filename", &self.filename)
            .field("tokens", &self.tokens.len())
            .field("items", &self.tree.len())
            .finish_non_exhaustive()
    }
}

impl Document {
    /// Tokenizes and reads `text`. Includes are resolved later, through
    /// `loader`; without one they stay unresolved.
    pub fn new(text: String, filename: Option<PathBuf>, options: Options, loader: Option<FileLoader>) -> Arc<Self> {
        Self::create(text, filename, options, loader, None, None)
    }

    fn create(
        text: String,
        filename: Option<PathBuf>,
        options: Options,
        loader: Option<FileLoader>,
        include_node: Option<(Weak<Document>, ItemId)>,
        cache: Option<Weak<IncludeCache>>,
    ) -> Arc<Self> {
        let tokens = read::scan(&text);
        let tree = read::build(&text, &tokens, &options);
        debug!(
            target: "lilyparse::music",
            filename = ?filename,
            tokens = tokens.len(),
            items = tree.len(),
            "built document"
        );
        let (own_cache, cache) = match cache {
            Some(cache) => (None, cache),
            None => {
                let own = Arc::new(IncludeCache::default());
                let weak = Arc::downgrade(&own);
                (Some(own), weak)
            }
        };
        Arc::new_cyclic(|this| Document {
            text,
            filename,
            tokens,
            tree,
            options,
            loader,
            this: this.clone(),
            include_node,
            own_cache,
            cache,
            includes: Mutex::new(HashMap::new()),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Whether this document is the root of its include cache.
    pub fn is_root(&self) -> bool {
        self.own_cache.is_some()
    }

    /// The tokens of the text with the lexer depth after each one.
    pub fn token_spans(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.tokens.iter().map(|s| (s.lexeme.start, s.lexeme.end, s.depth))
    }

    /// The text of the token that starts `id`.
    pub fn item_text(&self, id: ItemId) -> &str {
        values::token_text(&self.tree, &self.text, id)
    }

    /// The deepest node at or just before `position`.
    pub fn node(&self, position: usize, depth: Option<usize>) -> ItemId {
        self.tree.node(position, depth)
    }

    /// Musical time at a cursor position; `None` outside music.
    pub fn time_position(self: &Arc<Self>, position: usize) -> Option<Fraction> {
        events::time_position(self, position)
    }

    /// Musical time between two positions in the same music expression.
    pub fn time_length(self: &Arc<Self>, start: usize, end: usize) -> Option<Fraction> {
        events::time_length(self, start, end)
    }

    // --- Includes -----------------------------------------------------------

    /// The document that included this one, with the `Include` item.
    ///
    /// A file included from several places is built once; its parent is the
    /// `\include` it was first resolved from, and include chains (and the
    /// cyclic-include check) follow that first inclusion.
    pub fn include_parent(&self) -> Option<(Arc<Document>, ItemId)> {
        let (doc, id) = self.include_node.as_ref()?;
        Some((doc.upgrade()?, *id))
    }

    /// Filenames of this document and every document above it.
    fn include_chain(&self) -> Vec<PathBuf> {
        let mut chain: Vec<PathBuf> = self.filename.iter().cloned().collect();
        let mut next = self.include_parent();
        while let Some((doc, _)) = next {
            chain.extend(doc.filename.iter().cloned());
            next = doc.include_parent();
        }
        chain
    }

    /// Where a relative include is looked for: the document's own directory
    /// first, then the configured include path.
    fn candidates(&self, name: &str) -> Vec<PathBuf> {
        let path = Path::new(name);
        if path.is_absolute() {
            return vec![path.to_path_buf()];
        }
        let mut dirs = self.options.include_path.clone();
        if let Some(dir) = self.filename.as_deref().and_then(Path::parent) {
            dirs.retain(|d| d != dir);
            dirs.insert(0, dir.to_path_buf());
        }
        dirs.into_iter().map(|d| d.join(path)).collect()
    }

    fn cached(&self, path: &Path) -> Option<Arc<Document>> {
        self.cache.upgrade()?.lock().get(path).cloned()
    }

    fn load(&self, path: &Path) -> Option<String> {
        self.loader.as_deref().and_then(|load| load(path))
    }

    /// The first candidate path for `name` that is cached or can be loaded.
    pub fn resolve_filename(&self, name: &str) -> Option<PathBuf> {
        self.candidates(name).into_iter().find(|p| self.cached(p).is_some() || self.load(p).is_some())
    }

    /// The file named by an `Include` item.
    pub fn include_filename(&self, id: ItemId) -> Option<String> {
        self.tree.children(id).iter().find_map(|&c| match self.tree.kind(c) {
            I::String => Some(self.string_value(c)),
            I::Scheme => Some(self.scheme_string(c).unwrap_or_default()),
            _ => None,
        })
    }

    /// The document an `Include` item refers to, resolved on first use.
    pub fn included_document(&self, id: ItemId) -> Option<Arc<Document>> {
        if self.tree.get(id).is_none_or(|i| i.kind != I::Include) {
            return None;
        }
        if let Some(memo) = self.includes.lock().get(&id) {
            return memo.upgrade();
        }
        // the memo lock is not held while loading and building
        let resolved = self.resolve_include(id);
        let weak = resolved.as_ref().map(Arc::downgrade).unwrap_or_default();
        self.includes.lock().entry(id).or_insert(weak).upgrade()
    }

    fn resolve_include(&self, id: ItemId) -> Option<Arc<Document>> {
        let name = self.include_filename(id).filter(|n| !n.is_empty())?;
        let cache = self.cache.upgrade()?;
        let chain = self.include_chain();
        for path in self.candidates(&name) {
            if chain.contains(&path) {
                warn!(target: "lilyparse::music", path = %path.display(), "cyclic include ignored");
                return None;
            }
            if let Some(doc) = cache.lock().get(&path).cloned() {
                debug!(target: "lilyparse::music", path = %path.display(), "include served from cache");
                return Some(doc);
            }
            let Some(text) = self.load(&path) else { continue };
            let doc = Document::create(
                text,
                Some(path.clone()),
                self.options.clone(),
                self.loader.clone(),
                Some((self.this.clone(), id)),
                Some(self.cache.clone()),
            );
            debug!(target: "lilyparse::music", path = %path.display(), "resolved include");
            return Some(cache.lock().entry(path).or_insert(doc).clone());
        }
        warn!(target: "lilyparse::music", include = %name, "include target not found");
        None
    }

    // --- Toplevel walks -----------------------------------------------------

    /// The toplevel items before the one containing `id`, nearest first,
    /// followed by the items before the `\include` in each document up the
    /// include chain.
    pub fn iter_toplevel_items(&self, id: ItemId) -> Vec<(Arc<Document>, ItemId)> {
        let mut out = Vec::new();
        self.walk_toplevel::<()>(id, false, &mut |doc, item| {
            out.push((doc.clone(), item));
            None
        });
        out
    }

    /// Like [`Document::iter_toplevel_items`], with every `\include`
    /// replaced by the toplevel items of the included document.
    pub fn iter_toplevel_items_include(&self, id: ItemId) -> Vec<(Arc<Document>, ItemId)> {
        let mut out = Vec::new();
        self.walk_toplevel::<()>(id, true, &mut |doc, item| {
            out.push((doc.clone(), item));
            None
        });
        out
    }

    fn toplevel_ancestor(&self, id: ItemId) -> Option<ItemId> {
        std::iter::once(id).chain(self.tree.ancestors(id)).find(|&n| self.tree.parent(n) == Some(ItemId::ROOT))
    }

    /// Visits toplevel items the way [`Document::iter_toplevel_items`]
    /// lists them, stopping at the first `Some`.
    fn walk_toplevel<T>(
        &self,
        id: ItemId,
        include: bool,
        f: &mut dyn FnMut(&Arc<Document>, ItemId) -> Option<T>,
    ) -> Option<T> {
        let mut doc = self.this.upgrade()?;
        let mut node = self.toplevel_ancestor(id)?;
        let mut expanding = Vec::new();
        loop {
            expanding.push(doc.clone());
            let siblings = doc.tree.children(ItemId::ROOT);
            let end = siblings.iter().position(|&c| c == node).unwrap_or(siblings.len());
            for &item in siblings[..end].iter().rev() {
                if let Some(found) = Self::visit(&doc, item, include, &mut expanding, f) {
                    return Some(found);
                }
            }
            let Some((parent, include_item)) = doc.include_parent() else { return None };
            if parent.tree.parent(include_item) != Some(ItemId::ROOT) {
                return None;
            }
            doc = parent;
            node = include_item;
        }
    }

    fn visit<T>(
        doc: &Arc<Document>,
        item: ItemId,
        include: bool,
        expanding: &mut Vec<Arc<Document>>,
        f: &mut dyn FnMut(&Arc<Document>, ItemId) -> Option<T>,
    ) -> Option<T> {
        if !include || doc.tree.kind(item) != I::Include {
            return f(doc, item);
        }
        let included = doc.included_document(item)?;
        if expanding.iter().any(|d| Arc::ptr_eq(d, &included)) {
            return None;
        }
        expanding.push(included.clone());
        let found = included
            .tree
            .children(ItemId::ROOT)
            .iter()
            .rev()
            .find_map(|&child| Self::visit(&included, child, include, expanding, f));
        expanding.pop();
        found
    }

    // --- References ---------------------------------------------------------

    /// Finds the value assigned to the variable a `UserCommand` refers to,
    /// looking backwards through this and the including documents.
    pub fn user_command_value(&self, id: ItemId) -> Option<(Arc<Document>, ItemId)> {
        let name = self.item_text(id).get(1..)?;
        self.walk_toplevel(id, true, &mut |doc, item| {
            if doc.tree.kind(item) == I::Assignment && doc.assignment_name(item) == name {
                Some(doc.assignment_value(item).map(|value| (doc.clone(), value)))
            } else {
                None
            }
        })
        .flatten()
    }

    /// Finds what a `MarkupUserCommand` refers to: the value of an
    /// assignment, or the Scheme item that defines the markup command.
    pub fn markup_user_command_value(&self, id: ItemId) -> Option<(Arc<Document>, ItemId)> {
        let name = self.item_text(id).get(1..)?;
        self.walk_toplevel(id, true, &mut |doc, item| match doc.tree.kind(item) {
            I::Assignment if doc.assignment_name(item) == name => {
                Some(doc.assignment_value(item).map(|value| (doc.clone(), value)))
            }
            I::Scheme if doc.defines_markup_command(item, name) => Some(Some((doc.clone(), item))),
            _ => None,
        })
        .flatten()
    }

    /// `#(define-markup-command (name layout props ...) ...)`
    fn defines_markup_command(&self, scheme: ItemId, name: &str) -> bool {
        let tree = &self.tree;
        let first = |id: ItemId, kind: ItemKind| tree.children(id).first().copied().filter(|&c| tree.kind(c) == kind);
        let Some(list) = first(scheme, I::SchemeList) else { return false };
        let Some(head) = first(list, I::SchemeItem) else { return false };
        if self.item_text(head) != "define-markup-command" {
            return false;
        }
        let Some(&signature) = tree.children(list).get(1) else { return false };
        if tree.kind(signature) != I::SchemeList {
            return false;
        }
        first(signature, I::SchemeItem).is_some_and(|n| self.item_text(n) == name)
    }

    pub fn assignment_name(&self, id: ItemId) -> &str {
        self.item_text(id)
    }

    /// The assigned value: the last child of an `Assignment`.
    pub fn assignment_value(&self, id: ItemId) -> Option<ItemId> {
        self.tree.children(id).last().copied()
    }

    // --- Values -------------------------------------------------------------

    pub fn string_value(&self, id: ItemId) -> String {
        values::string_value(&self.tree, &self.text, id)
    }

    pub fn number_value(&self, id: ItemId) -> Option<NumberValue> {
        values::number_value(&self.tree, &self.text, id)
    }

    pub fn scheme_int(&self, id: ItemId) -> Option<i64> {
        values::scheme_int(&self.tree, &self.text, id)
    }

    pub fn scheme_string(&self, id: ItemId) -> Option<String> {
        values::scheme_string(&self.tree, &self.text, id)
    }

    pub fn scheme_fraction(&self, id: ItemId) -> Option<Fraction> {
        values::scheme_fraction(&self.tree, &self.text, id)
    }

    pub fn scheme_pair_ints(&self, id: ItemId) -> Option<(i64, i64)> {
        values::scheme_pair_ints(&self.tree, &self.text, id)
    }

    fn attr_text(&self, attr: Option<Attr>) -> Option<String> {
        match attr? {
            Attr::Token(t) => Some(values::lexeme_text(&self.text, t).to_string()),
            Attr::Item(id) => match self.tree.kind(id) {
                I::String => Some(self.string_value(id)),
                I::Scheme => self.scheme_string(id),
                _ => None,
            },
        }
    }

    /// The version string of a `\version` item.
    pub fn version_string(&self, id: ItemId) -> String {
        self.tree
            .children(id)
            .iter()
            .find_map(|&c| match self.tree.kind(c) {
                I::String => Some(self.string_value(c)),
                I::Scheme => Some(self.scheme_string(c).unwrap_or_default()),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// `\version "2.24.1"` gives `[2, 24, 1]`.
    pub fn version(&self, id: ItemId) -> Vec<u32> {
        crate::regex!(r"\d+").find_iter(&self.version_string(id)).filter_map(|m| m.as_str().parse().ok()).collect()
    }

    /// `volta`, `unfold`, ... without quotes.
    pub fn repeat_specifier(&self, id: ItemId) -> Option<String> {
        let ItemData::Repeat { specifier, .. } = self.tree.item(id).data else { return None };
        self.attr_text(specifier).map(|s| s.trim_matches('"').to_string())
    }

    /// The repeat count; missing or zero counts are 1.
    pub fn repeat_count(&self, id: ItemId) -> i64 {
        let ItemData::Repeat { count, .. } = self.tree.item(id).data else { return 1 };
        let count = match count {
            Some(Attr::Item(scheme)) => self.scheme_int(scheme).unwrap_or(1),
            Some(Attr::Token(t)) => values::lexeme_text(&self.text, t).parse().unwrap_or(1),
            None => 1,
        };
        if count == 0 { 1 } else { count }
    }

    /// The context name of `\new`, `\context` or `\change`.
    pub fn context_name(&self, id: ItemId) -> Option<&str> {
        let ItemData::Translator { context, .. } = self.tree.item(id).data else { return None };
        context.map(|t| values::lexeme_text(&self.text, t))
    }

    /// The context id given after `=`.
    pub fn context_id(&self, id: ItemId) -> Option<String> {
        let ItemData::Translator { context_id, .. } = self.tree.item(id).data else { return None };
        self.attr_text(context_id)
    }

    pub fn clef_specifier(&self, id: ItemId) -> Option<String> {
        let ItemData::Clef { specifier } = self.tree.item(id).data else { return None };
        self.attr_text(specifier)
    }

    /// The language a `Language` item switches to.
    pub fn language(&self, id: ItemId) -> Option<&str> {
        match &self.tree.item(id).data {
            ItemData::Language(language) => language.as_deref(),
            _ => None,
        }
    }

    /// The plain text of markup, strings and Scheme strings.
    pub fn markup_plaintext(&self, id: ItemId) -> String {
        let tree = &self.tree;
        let join = |items: &[ItemId], sep: &str| {
            items.iter().map(|&c| self.markup_plaintext(c)).collect::<Vec<_>>().join(sep)
        };
        match tree.kind(id) {
            I::Markup | I::MarkupList => join(tree.children(id), " "),
            I::MarkupCommand => {
                let sep = if self.item_text(id) == "\\concat" { "" } else { " " };
                match tree.children(id) {
                    [only] if tree.kind(*only) == I::MarkupList => join(tree.children(*only), sep),
                    children => join(children, sep),
                }
            }
            I::MarkupWord => self.item_text(id).to_string(),
            I::String => self.string_value(id),
            I::Scheme => self.scheme_string(id).unwrap_or_default(),
            _ => String::new(),
        }
    }

    /// Numerator times the lower number, e.g. `3/4` for `\time 3/4`.
    pub fn time_signature_measure_length(&self, id: ItemId) -> Option<Fraction> {
        match self.tree.item(id).data {
            ItemData::TimeSignature { numerator, fraction, .. } => {
                fraction.checked_mul(&Fraction::from_integer(numerator))
            }
            _ => None,
        }
    }

    /// The note value of a `\tempo`, zero when none is given.
    pub fn tempo_fraction(&self, id: ItemId) -> Fraction {
        self.tree.item(id).duration_or_zero().length()
    }

    /// The beats per minute of a `\tempo`, two values for a range.
    pub fn tempo_values(&self, id: ItemId) -> Vec<i64> {
        let item = self.tree.item(id);
        let Some(equal_sign) = item.tokens.first() else { return Vec::new() };
        item.children
            .iter()
            .filter(|&&c| self.tree.item(c).position > equal_sign.start)
            .filter_map(|&c| match self.tree.kind(c) {
                I::Number => match self.number_value(c)? {
                    NumberValue::Int(n) => Some(n),
                    _ => None,
                },
                I::Scheme => self.scheme_int(c),
                _ => None,
            })
            .collect()
    }

    /// The text of a `\tempo`: a string, markup or Scheme item.
    pub fn tempo_text(&self, id: ItemId) -> Option<ItemId> {
        self.tree
            .children(id)
            .first()
            .copied()
            .filter(|&c| matches!(self.tree.kind(c), I::String | I::Markup | I::Scheme))
    }

    pub fn partial_length(&self, id: ItemId) -> Fraction {
        self.tree.item(id).duration_or_zero().length()
    }

    /// The written duration of a durable item.
    pub fn duration(&self, id: ItemId) -> Option<Duration> {
        self.tree.item(id).duration
    }

    /// Musical length: the own duration of a leaf, the traversal length
    /// of music, zero for anything else. `None` when the length overflows.
    pub fn item_length(self: &Arc<Self>, id: ItemId) -> Option<Fraction> {
        let kind = self.tree.kind(id);
        if kind.is_durable() {
            self.tree.item(id).duration_or_zero().checked_length()
        } else if kind.is_music() {
            Events::new(&self.options).read(self, id)
        } else {
            Some(Fraction::from_integer(0))
        }
    }

    /// Whether LilyPond would produce output for `id` (usually the root or
    /// a book, bookpart or score): it has toplevel music or markup,
    /// possibly in an included file.
    pub fn has_output(&self, id: ItemId) -> bool {
        let mut seen = Vec::new();
        self.has_output_seen(id, &mut seen)
    }

    fn has_output_seen(&self, id: ItemId, seen: &mut Vec<*const Document>) -> bool {
        if id == ItemId::ROOT {
            seen.push(self as *const Document);
        }
        self.tree.children(id).iter().any(|&c| match self.tree.kind(c) {
            k if k.is_music() || k == I::Markup => true,
            I::Book | I::BookPart | I::Score => self.has_output_seen(c, seen),
            I::Include => match self.included_document(c) {
                Some(doc) if !seen.contains(&Arc::as_ptr(&doc)) => doc.has_output_seen(ItemId::ROOT, seen),
                _ => false,
            },
            _ => false,
        })
    }
}
