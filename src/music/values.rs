//! Values carried by items: string contents, numbers and the few Scheme
//! shapes the tree builder and the document understand.

use super::{Fraction, ItemId, ItemKind, Lexeme, Tree, parse_fraction};
use crate::lex::{Category, scheme::SchemeKind};

/// A parsed `Number` item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberValue {
    Int(i64),
    Decimal(f64),
    Fraction(Fraction),
}

impl NumberValue {
    /// The value as an exact fraction; decimals have none.
    pub fn as_fraction(self) -> Option<Fraction> {
        match self {
            NumberValue::Int(n) => Some(Fraction::from_integer(n)),
            NumberValue::Fraction(f) => Some(f),
            NumberValue::Decimal(_) => None,
        }
    }
}

pub(crate) fn lexeme_text(text: &str, lexeme: Lexeme) -> &str {
    text.get(lexeme.start..lexeme.end).unwrap_or_default()
}

/// Text of the token that starts `id`, empty for items without one.
pub(crate) fn token_text<'t>(tree: &Tree, text: &'t str, id: ItemId) -> &'t str {
    tree.item(id).token.map_or("", |t| lexeme_text(text, t))
}

/// Contents of a `String` item without the quotes; escapes are resolved.
pub(crate) fn string_value(tree: &Tree, text: &str, id: ItemId) -> String {
    let tokens = &tree.item(id).tokens;
    let inner = &tokens[..tokens.len().saturating_sub(1)];
    inner
        .iter()
        .map(|&t| {
            let s = lexeme_text(text, t);
            if t.kind.category().contains(Category::CHARACTER) {
                s.strip_prefix('\\').unwrap_or(s)
            } else {
                s
            }
        })
        .collect()
}

pub(crate) fn number_value(tree: &Tree, text: &str, id: ItemId) -> Option<NumberValue> {
    let s = token_text(tree, text, id);
    if s.contains('/') {
        parse_fraction(s).map(NumberValue::Fraction)
    } else if s.contains('.') {
        s.parse().ok().map(NumberValue::Decimal)
    } else {
        s.parse().ok().map(NumberValue::Int)
    }
}

fn scheme_items(tree: &Tree, id: ItemId) -> impl Iterator<Item = ItemId> + '_ {
    tree.descendants(id).into_iter().filter(move |&d| tree.kind(d) == ItemKind::SchemeItem)
}

fn digits(s: &str) -> Option<i64> {
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) { s.parse().ok() } else { None }
}

/// The first unsigned integer in a Scheme expression.
pub(crate) fn scheme_int(tree: &Tree, text: &str, id: ItemId) -> Option<i64> {
    scheme_items(tree, id).find_map(|i| digits(token_text(tree, text, i)))
}

/// The first integer or `n/m` fraction in a Scheme expression.
pub(crate) fn scheme_fraction(tree: &Tree, text: &str, id: ItemId) -> Option<Fraction> {
    scheme_items(tree, id).find_map(|i| {
        let s = token_text(tree, text, i);
        if let Some(n) = digits(s) {
            return Some(Fraction::from_integer(n));
        }
        let is_fraction = tree.item(i).token.is_some_and(|t| t.kind.as_scheme() == Some(SchemeKind::Fraction));
        if is_fraction { parse_fraction(s) } else { None }
    })
}

/// Two integers written as a pair, e.g. `'(3 . 4)` or `(cons 3 4)`.
pub(crate) fn scheme_pair_ints(tree: &Tree, text: &str, id: ItemId) -> Option<(i64, i64)> {
    let mut ints = scheme_items(tree, id).filter_map(|i| digits(token_text(tree, text, i)));
    Some((ints.next()?, ints.next()?))
}

/// All strings of a Scheme expression joined, `None` if it has none.
pub(crate) fn scheme_string(tree: &Tree, text: &str, id: ItemId) -> Option<String> {
    let strings: Vec<ItemId> =
        tree.descendants(id).into_iter().filter(|&d| tree.kind(d) == ItemKind::String).collect();
    if strings.is_empty() {
        return None;
    }
    Some(strings.into_iter().map(|s| string_value(tree, text, s)).collect())
}
