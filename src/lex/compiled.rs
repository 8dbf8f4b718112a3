//! Context compilation.
//!
//! Every context is compiled once into:
//!
//! - a *combined* regex, one capture group per candidate kind in priority
//!   order, used to find the leftmost offset where any kind might match;
//! - one anchored regex per kind, used to retry later candidates at that
//!   same offset when an earlier candidate's refinement rejected the span.
//!
//! ```text
//!  text ── combined.captures_at(pos) ──> (offset s, first group g)
//!                                          │
//!            for kind in items[g..]:       v
//!              anchored[kind] at s ──> refine(kind, s, end) ──> Match
//!                                          │ (none accepted)
//!                                          └─> search again from s + 1 char
//! ```
//!
//! The compiled table is built lazily for all contexts on first use and
//! shared by every tokenizer.

use super::{ContextId, ContextSpec, TokenKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// A token kind recognized at a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Match {
    pub start: usize,
    pub end: usize,
    pub kind: TokenKind,
}

#[derive(Debug)]
pub(crate) struct CompiledContext {
    pub spec: ContextSpec,
    combined: Option<Regex>,
    anchored: Vec<Option<Regex>>,
}

static COMPILED: Lazy<HashMap<ContextId, CompiledContext>> =
    Lazy::new(|| ContextId::all().map(|id| (id, CompiledContext::new(id.spec()))).collect());

/// The compiled form of `id`.
pub(crate) fn compiled(id: ContextId) -> &'static CompiledContext {
    // every ContextId is inserted when the table is built
    &COMPILED[&id]
}

impl CompiledContext {
    fn new(spec: ContextSpec) -> Self {
        let alternatives: Vec<String> = spec.items.iter().map(|k| format!("({})", k.pattern())).collect();
        let combined = if alternatives.is_empty() {
            None
        } else {
            build(&format!("(?m){}", alternatives.join("|")))
        };
        let anchored = spec.items.iter().map(|k| build(&format!(r"(?m)\A(?:{})", k.pattern()))).collect();
        CompiledContext { spec, combined, anchored }
    }

    /// Leftmost match at or after `pos`.
    pub(crate) fn search(&self, text: &str, mut pos: usize) -> Option<Match> {
        let combined = self.combined.as_ref()?;
        while pos <= text.len() {
            let caps = combined.captures_at(text, pos)?;
            let (group, m) = caps.iter().enumerate().skip(1).find_map(|(i, m)| m.map(|m| (i - 1, m)))?;
            if let Some(found) = self.resolve_at(text, m.start(), group, m.end()) {
                return Some(found);
            }
            pos = next_char(text, m.start())?;
        }
        None
    }

    /// Match starting exactly at `pos`.
    pub(crate) fn match_at(&self, text: &str, pos: usize) -> Option<Match> {
        let combined = self.combined.as_ref()?;
        let caps = combined.captures_at(text, pos)?;
        let (group, m) = caps.iter().enumerate().skip(1).find_map(|(i, m)| m.map(|m| (i - 1, m)))?;
        if m.start() != pos {
            return None;
        }
        self.resolve_at(text, pos, group, m.end())
    }

    fn resolve_at(&self, text: &str, start: usize, group: usize, group_end: usize) -> Option<Match> {
        for index in group..self.spec.items.len() {
            let kind = self.spec.items[index];
            let end = if index == group {
                group_end
            } else {
                let Some(re) = &self.anchored[index] else { continue };
                match re.find(&text[start..]) {
                    Some(m) => start + m.end(),
                    None => continue,
                }
            };
            if let Some(end) = kind.refine(text, start, end) {
                return Some(Match { start, end, kind });
            }
        }
        None
    }
}

fn build(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(err) => {
            tracing::warn!(target: "lilyparse::lex", %err, "invalid token pattern");
            None
        }
    }
}

fn next_char(text: &str, pos: usize) -> Option<usize> {
    let c = text.get(pos..)?.chars().next()?;
    Some(pos + c.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_context_compiles() {
        for id in ContextId::all() {
            let ctx = compiled(id);
            assert!(ctx.spec.items.is_empty() || ctx.combined.is_some(), "{} failed to compile", id.name());
            for (kind, re) in ctx.spec.items.iter().zip(&ctx.anchored) {
                assert!(re.is_some(), "{} in {} failed to compile", kind.name(), id.name());
            }
        }
    }
}
