//! The context stack and its frozen form.
//!
//! ```text
//!   top  ┌──────────────────────────┐
//!        │ ParseMarkup   argcount 1 │  <- auto-closes after one argument
//!        │ ParseMusic    argcount 0 │  <- closes only on a Leaver
//!        │ Global        argcount 0 │  <- root, never popped
//! bottom └──────────────────────────┘
//! ```
//!
//! A frame is a context id plus its live argument count, so a frozen state
//! is just the list of frames and can be hashed, compared and sent across
//! threads.

use super::compiled::compiled;
use super::kinds::Transition;
use super::{ContextId, Fallthrough, Mode, Token, TokenKind, Tokens};
use std::collections::HashMap;

/// One active context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame {
    pub context: ContextId,
    pub argcount: u32,
}

/// The stack of active contexts while tokenizing one text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct State {
    frames: Vec<Frame>,
}

/// Compact, comparable snapshot of a [`State`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrozenState(Vec<Frame>);

impl FrozenState {
    pub fn frames(&self) -> &[Frame] {
        &self.0
    }
}

impl State {
    /// A state holding only `root`.
    pub fn new(root: ContextId) -> Self {
        State { frames: vec![Frame { context: root, argcount: root.default_argcount() }] }
    }

    pub fn for_mode(mode: Mode) -> Self {
        State::new(mode.root_context())
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn top(&self) -> ContextId {
        self.top_frame().context
    }

    pub fn argcount(&self) -> u32 {
        self.top_frame().argcount
    }

    fn top_frame(&self) -> &Frame {
        // the root frame is never popped
        &self.frames[self.frames.len() - 1]
    }

    pub(crate) fn set_argcount(&mut self, argcount: u32) {
        let last = self.frames.len() - 1;
        self.frames[last].argcount = argcount;
    }

    pub fn enter(&mut self, context: ContextId) {
        self.enter_with(context, context.default_argcount());
    }

    pub fn enter_with(&mut self, context: ContextId, argcount: u32) {
        self.frames.push(Frame { context, argcount });
    }

    /// Pops the top frame; the root frame stays.
    pub fn leave(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Swaps the top frame for a fresh frame of `context`.
    pub fn replace(&mut self, context: ContextId) {
        let last = self.frames.len() - 1;
        self.frames[last] = Frame { context, argcount: context.default_argcount() };
    }

    /// Counts one argument against the top frame.
    ///
    /// A frame waiting for its last argument is left and the next frame is
    /// charged in turn; a frame with more arguments pending is decremented; a
    /// frame with argcount 0 ends the walk.
    pub fn end_argument(&mut self) {
        while self.depth() > 1 {
            let argcount = self.argcount();
            if argcount == 1 {
                self.leave();
            } else {
                if argcount > 0 {
                    self.set_argcount(argcount - 1);
                }
                return;
            }
        }
    }

    /// Mode of the innermost frame that declares one.
    pub fn mode(&self) -> Option<Mode> {
        self.frames.iter().rev().find_map(|f| compiled(f.context).spec.mode)
    }

    pub fn freeze(&self) -> FrozenState {
        FrozenState(self.frames.clone())
    }

    pub fn thaw(frozen: &FrozenState) -> State {
        State { frames: frozen.0.clone() }
    }

    /// Tokenizes `text` from byte offset `start`, updating `self` as tokens
    /// are produced.
    pub fn tokens<'s, 't>(&'s mut self, text: &'t str, start: usize) -> Tokens<'s, 't> {
        Tokens::new(self, text, start)
    }

    /// Updates the state as if `token` had just been produced by it.
    ///
    /// For tokens taken from a cache: fallthrough contexts that would not
    /// have produced the token are left (or replaced) first.
    pub fn follow(&mut self, token: &Token<'_>) {
        loop {
            let ctx = compiled(self.top());
            let Some(action) = ctx.spec.fallthrough else { break };
            if ctx.spec.items.contains(&token.kind) {
                break;
            }
            let before = (self.depth(), self.top());
            self.fallthrough(action);
            if (self.depth(), self.top()) == before {
                break;
            }
        }
        self.apply(token.kind, token.text);
    }

    pub(crate) fn fallthrough(&mut self, action: Fallthrough) {
        match action {
            Fallthrough::Leave => self.leave(),
            Fallthrough::Replace(context) => self.replace(context),
        }
    }

    /// Runs the transition effect of one recognized token.
    pub(crate) fn apply(&mut self, kind: TokenKind, text: &str) {
        match kind.transition() {
            Transition::Hook => self.top().hook(kind, text, self),
            Transition::EndArgument => self.end_argument(),
            Transition::Leave => self.leave(),
            Transition::Enter(context) => self.enter(context),
            Transition::EnterArgs(context, argcount) => self.enter_with(context, argcount),
            Transition::Replace(context) => self.replace(context),
            Transition::LeaveEndArgument => {
                self.leave();
                self.end_argument();
            }
            Transition::Custom => kind.custom(text, self),
        }
        tracing::trace!(
            target: "lilyparse::lex",
            kind = kind.name(),
            context = self.top().name(),
            depth = self.depth(),
            "transition"
        );
    }
}

/// Stores frozen states under small integers, e.g. one per editor line.
#[derive(Debug, Default, Clone)]
pub struct Fridge {
    ids: HashMap<FrozenState, usize>,
    states: Vec<FrozenState>,
}

impl Fridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `state` and returns its id; equal states share one id.
    pub fn freeze(&mut self, state: &State) -> usize {
        let frozen = state.freeze();
        if let Some(&id) = self.ids.get(&frozen) {
            return id;
        }
        let id = self.states.len();
        self.ids.insert(frozen.clone(), id);
        self.states.push(frozen);
        id
    }

    pub fn thaw(&self, id: usize) -> Option<State> {
        self.states.get(id).map(State::thaw)
    }

    pub fn count(&self) -> usize {
        self.states.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::lilypond::LyContext;

    fn ly(c: LyContext) -> ContextId {
        ContextId::LilyPond(c)
    }

    #[test]
    fn leave_never_pops_the_root() {
        let mut state = State::for_mode(Mode::LilyPond);
        state.leave();
        state.leave();
        assert_eq!(state.depth(), 1);
        assert_eq!(state.top(), ly(LyContext::Global));
    }

    #[test]
    fn end_argument_cascades_through_single_argument_frames() {
        let mut state = State::for_mode(Mode::LilyPond);
        state.enter(ly(LyContext::ParseMusic));
        state.enter_with(ly(LyContext::ParseMarkup), 1);
        state.enter_with(ly(LyContext::ParseMarkup), 1);
        state.end_argument();
        assert_eq!(state.depth(), 2);
        assert_eq!(state.top(), ly(LyContext::ParseMusic));
    }

    #[test]
    fn end_argument_decrements_and_stops() {
        let mut state = State::for_mode(Mode::LilyPond);
        state.enter_with(ly(LyContext::ParseMarkup), 3);
        state.end_argument();
        assert_eq!(state.depth(), 2);
        assert_eq!(state.argcount(), 2);
    }

    #[test]
    fn end_argument_stops_at_unbounded_frame() {
        let mut state = State::for_mode(Mode::LilyPond);
        state.enter_with(ly(LyContext::ParseMarkup), 1);
        state.enter(ly(LyContext::ParseMusic));
        state.end_argument();
        assert_eq!(state.depth(), 3);
    }

    #[test]
    fn replace_keeps_depth() {
        let mut state = State::for_mode(Mode::LilyPond);
        state.enter(ly(LyContext::ExpectHeader));
        state.replace(ly(LyContext::ParseHeader));
        assert_eq!(state.depth(), 2);
        assert_eq!(state.top(), ly(LyContext::ParseHeader));
    }

    #[test]
    fn fridge_shares_ids_for_equal_states() {
        let mut fridge = Fridge::new();
        let mut a = State::for_mode(Mode::LilyPond);
        let b = State::for_mode(Mode::LilyPond);
        let id_a = fridge.freeze(&a);
        assert_eq!(fridge.freeze(&b), id_a);
        a.enter(ly(LyContext::ParseMusic));
        let id_c = fridge.freeze(&a);
        assert_ne!(id_a, id_c);
        assert_eq!(fridge.thaw(id_c), Some(a));
        assert_eq!(fridge.count(), 2);
        assert!(fridge.thaw(7).is_none());
    }
}
