//! LilyPond token kinds and parser contexts.
//!
//! ```text
//!   Global ──\score──> ExpectScore ──{──> ParseScore ──}──> (leave)
//!     │
//!     └──{──> ParseMusic ──c4──> ParseDuration ──(no dot)──> ParseDurationScaling ──> (leave)
//!                 │
//!                 ├──\markup──> ParseMarkup(1) ──\bold──> ParseMarkup(1) ──word──> (both closed)
//!                 └──#──> scheme ParseScheme(1)
//! ```
//!
//! Item groups follow the grammar: `SPACE` kinds may appear anywhere, `BASE`
//! adds Scheme and strings, toplevel blocks take the command set, music
//! expressions take notes, durations and postfix events.

use super::kinds::{Transition, WordEnd, char_after, char_before, is_word_char, not_alpha_at, not_digit_at};
use super::kinds::{word_boundary, word_in};
use super::scheme::SchemeContext;
use super::words::{self, *};
use super::{Caps, Category, ContextId, ContextSpec, Fallthrough, Mode, State, TokenKind};
use std::collections::HashSet;

crate::kind_enum! {
    /// Token kinds of LilyPond music input.
    pub enum LyKind {
        // comments and strings
        Comment, BlockCommentStart, BlockCommentEnd, LineComment,
        String, StringQuotedStart, StringQuotedEnd, StringQuoteEscape,
        // music items
        Skip, Spacer, Rest, Q, Note, Octave, OctaveCheck, AccidentalReminder, AccidentalCautionary,
        Length, Dot, Scaling,
        // delimiters
        OpenBracket, CloseBracket, OpenSimultaneous, CloseSimultaneous,
        SequentialStart, SequentialEnd, SimultaneousStart, SimultaneousEnd,
        ChordStart, ChordEnd, ErrorInChord, PipeSymbol, VoiceSeparator,
        // values
        DecimalValue, IntegerValue, Fraction,
        // postfix events
        Dynamic, Articulation, Direction, ScriptAbbreviation, Fingering, StringNumber,
        SlurStart, SlurEnd, PhrasingSlurStart, PhrasingSlurEnd, Tie,
        BeamStart, BeamEnd, LigatureStart, LigatureEnd,
        TremoloColon, TremoloDuration,
        ChordModifier, ChordSeparator, ChordStepNumber, ChordDot,
        // keywords and commands
        Keyword, Command, UserCommand,
        Score, Book, BookPart, Paper, Header, Layout, Midi, With, LayoutContext,
        Markup, MarkupLines, MarkupList, MarkupCommand, MarkupUserCommand, MarkupScore, MarkupWord,
        OpenBracketMarkup, CloseBracketMarkup,
        Repeat, RepeatSpecifier, RepeatStringSpecifier, RepeatCount,
        Override, Set, Revert, Unset, Tweak, DotSetOverride, EqualSignSetOverride,
        New, Context, Change,
        Clef, ClefSpecifier,
        PitchCommand, Unit, Tempo, TempoSeparator, SimultaneousOrSequentialCommand,
        LyricMode, NoteMode, ChordMode, DrumMode, FigureMode,
        LyricText, LyricHyphen, LyricExtender, LyricSkip, LyricTie,
        SchemeStart,
        // names
        ContextName, BackSlashedContextName, GrobName, GrobProperty, ContextProperty,
        PaperVariable, HeaderVariable, LayoutVariable,
        Name, EqualSign,
    }
}

crate::kind_enum! {
    /// Parser contexts of LilyPond music input.
    pub enum LyContext {
        Global,
        ExpectScore, ParseScore, ExpectBook, ParseBook, ExpectBookPart, ParseBookPart,
        ExpectPaper, ParsePaper, ExpectHeader, ParseHeader, ExpectLayout, ParseLayout,
        ExpectMidi, ParseMidi, ExpectWith, ParseWith, ExpectContext, ParseContext,
        ParseMusic, ParseChord, ParseString, ParseBlockComment, ParseMarkup,
        ParseRepeat, ParseDuration, ParseDurationScaling,
        ParseOverride, ParseRevert, ParseSet, ParseUnset, ParseTweak,
        ParseTranslator, ExpectTranslatorId, ParseTranslatorId,
        ParseClef, ParseScriptAbbreviationOrFingering,
        ExpectLyricMode, ParseLyricMode, ExpectChordMode, ParseChordMode,
        ExpectNoteMode, ParseNoteMode, ExpectDrumMode, ParseDrumMode, ExpectFigureMode, ParseFigureMode,
        ParsePitchCommand, ParseTremolo, ParseChordItems, ParseTempo,
    }
}

use LyContext as C;
use LyKind as K;

// --- Patterns ---------------------------------------------------------------

const NEVER: &str = r"[^\s\S]";
const BACKSLASH_WORD: &str = r"\\[A-Za-z][-A-Za-z]*";
const WORD: &str = r"[A-Za-z][-A-Za-z0-9_]*";
const DURATION: &str = r"\\(?:maxima|longa|breve)|2048|1024|512|256|128|64|32|16|8|4|2|1";

const PITCH_COMMANDS: &[&str] = &["relative", "transpose", "transposition", "key", "octaveCheck"];
const UNITS: &[&str] = &["mm", "cm", "in", "pt"];
const LYRIC_MODES: &[&str] = &["lyricmode", "lyrics", "addlyrics", "oldaddlyrics", "lyricsto"];
const NOTE_MODES: &[&str] = &["notes", "notemode"];
const CHORD_MODES: &[&str] = &["chords", "chordmode"];
const DRUM_MODES: &[&str] = &["drums", "drummode"];
const FIGURE_MODES: &[&str] = &["figures", "figuremode"];
const DYNAMICS: &[&str] = &[
    "f", "ff", "fff", "ffff", "fffff", "p", "pp", "ppp", "pppp", "ppppp", "mf", "mp", "fp", "sp", "spp", "sf",
    "sff", "sfz", "rfz", "cresc", "decresc", "dim", "cr", "decr",
];

impl LyKind {
    pub(crate) fn pattern(self) -> &'static str {
        match self {
            K::Comment | K::String => NEVER,
            K::BlockCommentStart => r"%\{",
            K::BlockCommentEnd => r"%\}",
            K::LineComment => r"%.*",
            K::StringQuotedStart | K::StringQuotedEnd => "\"",
            K::StringQuoteEscape => r#"\\[\\"]"#,
            K::Skip => "s",
            K::Spacer => r"\\skip",
            K::Rest => "[Rr]",
            K::Q => "q",
            K::Note => "[a-x]+",
            K::Octave => ",+|'+",
            K::OctaveCheck => "=(?:,+|'+)?",
            K::AccidentalReminder => "!",
            K::AccidentalCautionary => r"\?",
            K::Length => DURATION,
            K::Dot | K::DotSetOverride | K::ChordDot => r"\.",
            K::Scaling => r"\*[\t ]*\d+(?:/\d+)?",
            K::OpenBracket | K::SequentialStart | K::OpenBracketMarkup => r"\{",
            K::CloseBracket | K::SequentialEnd | K::CloseBracketMarkup => r"\}",
            K::OpenSimultaneous | K::SimultaneousStart => "<<",
            K::CloseSimultaneous | K::SimultaneousEnd => ">>",
            K::ChordStart => "<",
            K::ChordEnd => ">",
            K::ErrorInChord => concat!(
                r"[-_^][_.>|+^-]|<<|>>|\\[\\\]\[()]|",
                r"\\(?:maxima|longa|breve)|2048|1024|512|256|128|64|32|16|8|4|2|1|",
                r"\*[\t ]*\d+(?:/\d+)?"
            ),
            K::PipeSymbol => r"\|",
            K::VoiceSeparator => r"\\\\",
            K::DecimalValue => r"-?\d+(?:\.\d+)?",
            K::IntegerValue | K::RepeatCount => r"\d+",
            K::Fraction => r"\d+/\d+",
            K::Dynamic => r"\\[<!>]|\\[A-Za-z][-A-Za-z]*",
            K::Articulation => BACKSLASH_WORD,
            K::Direction => "[-_^]",
            K::ScriptAbbreviation => r"[+|>._^-]",
            K::Fingering => r"\d",
            K::StringNumber => r"\\\d+",
            K::SlurStart => r"\(",
            K::SlurEnd => r"\)",
            K::PhrasingSlurStart => r"\\\(",
            K::PhrasingSlurEnd => r"\\\)",
            K::Tie | K::LyricTie => "~",
            K::BeamStart => r"\[",
            K::BeamEnd => r"\]",
            K::LigatureStart => r"\\\[",
            K::LigatureEnd => r"\\\]",
            K::TremoloColon => ":",
            K::TremoloDuration => "2048|1024|512|256|128|64|32|16|8",
            K::ChordModifier => "aug|dim|sus|min|maj|m",
            K::ChordSeparator => r":|\^|/\+?",
            K::ChordStepNumber => r"\d+[-+]?",
            K::Keyword | K::Command | K::PitchCommand | K::Unit | K::BackSlashedContextName => BACKSLASH_WORD,
            K::LyricMode | K::NoteMode | K::ChordMode | K::DrumMode | K::FigureMode => BACKSLASH_WORD,
            K::UserCommand => r"\\[A-Za-z]+",
            K::Score | K::MarkupScore => r"\\score",
            K::Book => r"\\book",
            K::BookPart => r"\\bookpart",
            K::Paper => r"\\paper",
            K::Header => r"\\header",
            K::Layout => r"\\layout",
            K::Midi => r"\\midi",
            K::With => r"\\with",
            K::LayoutContext | K::Context => r"\\context",
            K::Markup => r"\\markup",
            K::MarkupLines => r"\\markuplines",
            K::MarkupList => r"\\markuplist",
            K::MarkupCommand | K::MarkupUserCommand => r"\\[A-Za-z]+(?:-[A-Za-z]+)*",
            K::MarkupWord => r#"[^{}"\\\s#%]+"#,
            K::Repeat => r"\\repeat",
            K::RepeatSpecifier | K::ContextName | K::GrobName | K::ContextProperty => "[A-Za-z]+",
            K::RepeatStringSpecifier => r#""[A-Za-z]+""#,
            K::Override => r"\\override",
            K::Set => r"\\set",
            K::Revert => r"\\revert",
            K::Unset => r"\\unset",
            K::Tweak => r"\\tweak",
            K::EqualSignSetOverride | K::EqualSign => "=",
            K::New => r"\\new",
            K::Change => r"\\change",
            K::Clef => r"\\clef",
            K::ClefSpecifier | K::PaperVariable | K::HeaderVariable | K::LayoutVariable => WORD,
            K::Tempo => r"\\tempo",
            K::TempoSeparator => "-",
            K::SimultaneousOrSequentialCommand => r"\\simultaneous|\\sequential",
            K::LyricText => r#"[^\\\s\d~"]+"#,
            K::LyricHyphen => "--",
            K::LyricExtender => "__",
            K::LyricSkip => "_",
            K::SchemeStart => "[#$]",
            K::GrobProperty => "[a-z]+(?:-[a-z]+)*",
            K::Name => "[a-zA-Z]+",
        }
    }

    /// Confirms a coarse match; see the module docs of `kinds`.
    pub(crate) fn refine(self, text: &str, start: usize, end: usize) -> Option<usize> {
        match self {
            K::Skip | K::Rest | K::Q | K::Note | K::Markup | K::MarkupLines | K::MarkupList | K::Repeat => {
                not_alpha_at(text, end).then_some(end)
            }
            K::Spacer => not_alpha_at(text, end).then_some(end),
            K::Length | K::ErrorInChord => {
                if text[start..end].starts_with(|c: char| c.is_ascii_digit()) {
                    not_digit_at(text, end).then_some(end)
                } else if text[start..end].starts_with("\\") && text[start..end].len() > 2 {
                    word_end(text, end)
                } else {
                    Some(end)
                }
            }
            K::TremoloDuration => (word_start(text, start) && not_digit_at(text, end)).then_some(end),
            K::ChordModifier => {
                let lower = |c: Option<char>| c.is_some_and(|c| c.is_ascii_lowercase());
                (!lower(char_before(text, start)) && !lower(char_after(text, end))).then_some(end)
            }
            K::Dynamic => {
                if matches!(char_after(text, start + 1), Some('<' | '!' | '>')) {
                    Some(start + 2)
                } else {
                    word_in(text, start + 1, end, crate::words!(DYNAMICS), WordEnd::NotAlpha)
                }
            }
            K::Articulation => word_in(text, start + 1, end, crate::words!(ARTICULATIONS), WordEnd::NotAlpha),
            K::Keyword => word_in(text, start + 1, end, crate::words!(LILYPOND_KEYWORDS), WordEnd::NotAlpha),
            K::Command => word_in(text, start + 1, end, crate::words!(MUSIC_COMMANDS), WordEnd::NotAlpha),
            K::PitchCommand => backslashed(text, start, end, crate::words!(PITCH_COMMANDS)),
            K::Unit => backslashed(text, start, end, crate::words!(UNITS)),
            K::LyricMode => backslashed(text, start, end, crate::words!(LYRIC_MODES)),
            K::NoteMode => backslashed(text, start, end, crate::words!(NOTE_MODES)),
            K::ChordMode => backslashed(text, start, end, crate::words!(CHORD_MODES)),
            K::DrumMode => backslashed(text, start, end, crate::words!(DRUM_MODES)),
            K::FigureMode => backslashed(text, start, end, crate::words!(FIGURE_MODES)),
            K::BackSlashedContextName => backslashed(text, start, end, crate::words!(CONTEXTS)),
            K::Score
            | K::MarkupScore
            | K::Book
            | K::BookPart
            | K::Paper
            | K::Header
            | K::Layout
            | K::Midi
            | K::With
            | K::LayoutContext
            | K::Context
            | K::Override
            | K::Set
            | K::Revert
            | K::Unset
            | K::Tweak
            | K::New
            | K::Change
            | K::Clef
            | K::Tempo
            | K::SimultaneousOrSequentialCommand => word_end(text, end),
            K::MarkupCommand => words::is_markup_command(&text[start + 1..end]).then_some(end),
            K::RepeatSpecifier => bare(text, start, end, crate::words!(REPEAT_TYPES), WordEnd::NotAlpha),
            K::RepeatStringSpecifier => {
                crate::words!(REPEAT_TYPES).contains(&text[start + 1..end - 1]).then_some(end)
            }
            K::ContextName => bare(text, start, end, crate::words!(CONTEXTS), WordEnd::Boundary),
            K::GrobName => bare(text, start, end, crate::words!(GROBS), WordEnd::Boundary),
            K::ContextProperty => bare(text, start, end, crate::words!(CONTEXT_PROPERTIES), WordEnd::Boundary),
            K::ClefSpecifier => bare(text, start, end, crate::words!(CLEFS), WordEnd::Boundary),
            K::PaperVariable => bare(text, start, end, crate::words!(PAPER_VARIABLES), WordEnd::Boundary),
            K::HeaderVariable => bare(text, start, end, crate::words!(HEADER_VARIABLES), WordEnd::Boundary),
            K::LayoutVariable => bare(text, start, end, crate::words!(LAYOUT_VARIABLES), WordEnd::Boundary),
            K::SchemeStart => (!matches!(char_after(text, end), Some('{' | '}'))).then_some(end),
            _ => Some(end),
        }
    }

    pub(crate) fn caps(self) -> Caps {
        match self {
            K::BlockCommentStart => Caps::INDENT,
            K::BlockCommentEnd => Caps::LEAVER | Caps::DEDENT,
            K::OpenBracket
            | K::SequentialStart
            | K::OpenBracketMarkup
            | K::OpenSimultaneous
            | K::SimultaneousStart => Caps::MATCH_START | Caps::INDENT,
            K::CloseBracket
            | K::SequentialEnd
            | K::CloseBracketMarkup
            | K::CloseSimultaneous
            | K::SimultaneousEnd => Caps::MATCH_END | Caps::DEDENT,
            K::ChordStart | K::SlurStart | K::PhrasingSlurStart | K::BeamStart | K::LigatureStart => Caps::MATCH_START,
            K::ChordEnd => Caps::MATCH_END | Caps::LEAVER,
            K::SlurEnd | K::PhrasingSlurEnd | K::BeamEnd | K::LigatureEnd => Caps::MATCH_END,
            K::ScriptAbbreviation | K::Fingering | K::TremoloDuration => Caps::LEAVER,
            K::RepeatCount => Caps::ITEM | Caps::LEAVER,
            K::DecimalValue | K::IntegerValue | K::Fraction | K::MarkupWord | K::SchemeStart => Caps::ITEM,
            K::LyricText | K::LyricHyphen | K::LyricExtender | K::LyricSkip | K::LyricTie => Caps::ITEM,
            k if k.is_keyword() || k.is_command() => Caps::ITEM,
            _ => Caps::empty(),
        }
    }

    pub(crate) fn category(self) -> Category {
        match self {
            K::Comment | K::BlockCommentStart | K::BlockCommentEnd | K::LineComment => Category::COMMENT,
            K::String => Category::STRING,
            K::StringQuotedStart => Category::STRING | Category::STRING_START,
            K::StringQuotedEnd => Category::STRING | Category::STRING_END,
            K::StringQuoteEscape => Category::CHARACTER,
            K::RepeatStringSpecifier => Category::STRING,
            K::DecimalValue | K::IntegerValue | K::Fraction | K::RepeatCount => Category::NUMERIC,
            K::ErrorInChord => Category::ERROR,
            _ => Category::empty(),
        }
    }

    pub(crate) fn matchname(self) -> Option<&'static str> {
        match self {
            K::OpenBracket
            | K::CloseBracket
            | K::SequentialStart
            | K::SequentialEnd
            | K::OpenBracketMarkup
            | K::CloseBracketMarkup => Some("bracket"),
            K::OpenSimultaneous | K::CloseSimultaneous | K::SimultaneousStart | K::SimultaneousEnd => {
                Some("simultaneous")
            }
            K::ChordStart | K::ChordEnd => Some("chord"),
            K::SlurStart | K::SlurEnd => Some("slur"),
            K::PhrasingSlurStart | K::PhrasingSlurEnd => Some("phrasingslur"),
            K::BeamStart | K::BeamEnd => Some("beam"),
            K::LigatureStart | K::LigatureEnd => Some("ligature"),
            _ => None,
        }
    }

    pub(crate) fn transition(self) -> Transition {
        match self {
            K::BlockCommentStart => Transition::Enter(lily(C::ParseBlockComment)),
            K::BlockCommentEnd => Transition::Leave,
            K::StringQuotedStart => Transition::Enter(lily(C::ParseString)),
            K::StringQuotedEnd => Transition::LeaveEndArgument,
            K::Length => Transition::Enter(lily(C::ParseDuration)),
            K::SequentialStart | K::SimultaneousStart => Transition::Enter(lily(C::ParseMusic)),
            K::CloseBracket | K::SequentialEnd | K::CloseSimultaneous | K::SimultaneousEnd => {
                Transition::LeaveEndArgument
            }
            K::ChordStart => Transition::Enter(lily(C::ParseChord)),
            K::ChordEnd | K::ScriptAbbreviation | K::Fingering | K::TremoloDuration => Transition::Leave,
            K::RepeatCount | K::ClefSpecifier | K::EqualSignSetOverride => Transition::Leave,
            K::Direction => Transition::Enter(lily(C::ParseScriptAbbreviationOrFingering)),
            K::TremoloColon => Transition::Enter(lily(C::ParseTremolo)),
            K::Score | K::MarkupScore => Transition::Enter(lily(C::ExpectScore)),
            K::Book => Transition::Enter(lily(C::ExpectBook)),
            K::BookPart => Transition::Enter(lily(C::ExpectBookPart)),
            K::Paper => Transition::Enter(lily(C::ExpectPaper)),
            K::Header => Transition::Enter(lily(C::ExpectHeader)),
            K::Layout => Transition::Enter(lily(C::ExpectLayout)),
            K::Midi => Transition::Enter(lily(C::ExpectMidi)),
            K::With => Transition::Enter(lily(C::ExpectWith)),
            K::LayoutContext => Transition::Enter(lily(C::ExpectContext)),
            K::Markup | K::MarkupLines | K::MarkupList => Transition::EnterArgs(lily(C::ParseMarkup), 1),
            K::OpenBracketMarkup => Transition::EnterArgs(lily(C::ParseMarkup), 0),
            K::CloseBracketMarkup | K::MarkupCommand | K::PitchCommand => Transition::Custom,
            K::Repeat => Transition::Enter(lily(C::ParseRepeat)),
            K::Override => Transition::Enter(lily(C::ParseOverride)),
            K::Set => Transition::Enter(lily(C::ParseSet)),
            K::Revert => Transition::Enter(lily(C::ParseRevert)),
            K::Unset => Transition::Enter(lily(C::ParseUnset)),
            K::Tweak => Transition::Enter(lily(C::ParseTweak)),
            K::New | K::Context | K::Change => Transition::Enter(lily(C::ParseTranslator)),
            K::Clef => Transition::Enter(lily(C::ParseClef)),
            K::Tempo => Transition::Enter(lily(C::ParseTempo)),
            K::LyricMode => Transition::Enter(lily(C::ExpectLyricMode)),
            K::NoteMode => Transition::Enter(lily(C::ExpectNoteMode)),
            K::ChordMode => Transition::Enter(lily(C::ExpectChordMode)),
            K::DrumMode => Transition::Enter(lily(C::ExpectDrumMode)),
            K::FigureMode => Transition::Enter(lily(C::ExpectFigureMode)),
            K::SchemeStart => Transition::EnterArgs(ContextId::Scheme(SchemeContext::ParseScheme), 1),
            K::MarkupUserCommand => Transition::EndArgument,
            k if k.caps().contains(Caps::ITEM) => Transition::EndArgument,
            _ => Transition::Hook,
        }
    }

    /// Transitions that depend on the token text.
    pub(crate) fn custom(self, text: &str, state: &mut State) {
        match self {
            K::CloseBracketMarkup => {
                // back to the ParseMarkup frame opened by the bracket
                while state.depth() > 1 && state.argcount() > 0 {
                    state.leave();
                }
                state.leave();
                state.end_argument();
            }
            K::MarkupCommand => match words::markup_nargs(text.get(1..).unwrap_or_default()) {
                Some(0) => state.end_argument(),
                nargs => state.enter_with(lily(C::ParseMarkup), nargs.unwrap_or(1)),
            },
            K::PitchCommand => {
                let argcount = if text == "\\transpose" { 2 } else { 1 };
                state.enter_with(lily(C::ParsePitchCommand), argcount);
            }
            _ => {}
        }
    }

    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            K::Keyword
                | K::Score
                | K::Book
                | K::BookPart
                | K::Paper
                | K::Header
                | K::Layout
                | K::Midi
                | K::With
                | K::LayoutContext
                | K::Override
                | K::Set
                | K::Revert
                | K::Unset
                | K::Tweak
        )
    }

    pub fn is_command(self) -> bool {
        matches!(
            self,
            K::Command
                | K::Spacer
                | K::Markup
                | K::MarkupLines
                | K::MarkupList
                | K::MarkupCommand
                | K::MarkupScore
                | K::Repeat
                | K::New
                | K::Context
                | K::Change
                | K::Clef
                | K::PitchCommand
                | K::Unit
                | K::Tempo
                | K::LyricMode
                | K::NoteMode
                | K::ChordMode
                | K::DrumMode
                | K::FigureMode
        )
    }

    /// Durations: length, dots and scaling.
    pub fn is_duration(self) -> bool {
        matches!(self, K::Length | K::Dot | K::Scaling)
    }

    pub fn is_markup_start(self) -> bool {
        matches!(self, K::Markup | K::MarkupLines | K::MarkupList)
    }

    pub fn is_lyric(self) -> bool {
        matches!(self, K::LyricText | K::LyricHyphen | K::LyricExtender | K::LyricSkip | K::LyricTie)
    }

    pub fn is_slur(self) -> bool {
        matches!(self, K::SlurStart | K::SlurEnd | K::PhrasingSlurStart | K::PhrasingSlurEnd | K::Tie)
    }

    pub fn is_beam(self) -> bool {
        matches!(self, K::BeamStart | K::BeamEnd | K::LigatureStart | K::LigatureEnd)
    }

    pub fn is_chord_item(self) -> bool {
        matches!(self, K::ChordModifier | K::ChordSeparator | K::ChordStepNumber | K::ChordDot)
    }

    pub fn is_articulation(self) -> bool {
        matches!(self, K::Articulation | K::Direction | K::ScriptAbbreviation | K::Fingering | K::StringNumber)
    }
}

fn lily(ctx: LyContext) -> ContextId {
    ContextId::LilyPond(ctx)
}

/// `\b` after a backslashed name.
fn word_end(text: &str, end: usize) -> Option<usize> {
    word_boundary(text, end).then_some(end)
}

/// `\b` before a bare name.
fn word_start(text: &str, start: usize) -> bool {
    !char_before(text, start).is_some_and(is_word_char)
}

fn bare(text: &str, start: usize, end: usize, table: &HashSet<&'static str>, word_end: WordEnd) -> Option<usize> {
    if !word_start(text, start) {
        return None;
    }
    word_in(text, start, end, table, word_end)
}

fn backslashed(text: &str, start: usize, end: usize, table: &HashSet<&'static str>) -> Option<usize> {
    word_in(text, start + 1, end, table, WordEnd::Boundary)
}

// --- Contexts ---------------------------------------------------------------

const COMMAND_KINDS: &[LyKind] = &[
    K::Repeat,
    K::PitchCommand,
    K::Override,
    K::Revert,
    K::Set,
    K::Unset,
    K::Tweak,
    K::Tempo,
    K::New,
    K::Context,
    K::Change,
    K::With,
    K::Clef,
    K::ChordMode,
    K::DrumMode,
    K::FigureMode,
    K::LyricMode,
    K::NoteMode,
    K::Markup,
    K::MarkupLines,
    K::MarkupList,
    K::SimultaneousOrSequentialCommand,
    K::Spacer,
    K::Keyword,
    K::Command,
    K::UserCommand,
];

const MUSIC_KINDS: &[LyKind] = &[
    K::Dynamic,
    K::Skip,
    K::Rest,
    K::Q,
    K::Note,
    K::Fraction,
    K::Length,
    K::Octave,
    K::OctaveCheck,
    K::AccidentalCautionary,
    K::AccidentalReminder,
    K::PipeSymbol,
    K::VoiceSeparator,
    K::SequentialStart,
    K::SequentialEnd,
    K::SimultaneousStart,
    K::SimultaneousEnd,
    K::ChordStart,
    K::ContextName,
    K::GrobName,
    K::SlurStart,
    K::SlurEnd,
    K::PhrasingSlurStart,
    K::PhrasingSlurEnd,
    K::Tie,
    K::BeamStart,
    K::BeamEnd,
    K::LigatureStart,
    K::LigatureEnd,
    K::Direction,
    K::Articulation,
    K::StringNumber,
    K::IntegerValue,
];

fn ly(kinds: &[LyKind]) -> Vec<TokenKind> {
    kinds.iter().map(|&k| TokenKind::LilyPond(k)).collect()
}

fn space_items() -> Vec<TokenKind> {
    [vec![TokenKind::Space], ly(&[K::BlockCommentStart, K::LineComment])].concat()
}

fn base_items() -> Vec<TokenKind> {
    [space_items(), ly(&[K::SchemeStart, K::StringQuotedStart])].concat()
}

fn toplevel_base_items() -> Vec<TokenKind> {
    [base_items(), ly(&[K::Fraction, K::SequentialStart, K::SimultaneousStart]), ly(COMMAND_KINDS)].concat()
}

fn music_items() -> Vec<TokenKind> {
    [base_items(), ly(MUSIC_KINDS), ly(COMMAND_KINDS)].concat()
}

/// Items of a music expression; also used for LilyPond embedded in Scheme.
pub(crate) fn parse_music_items() -> Vec<TokenKind> {
    [music_items(), ly(&[K::TremoloColon])].concat()
}

/// Items of a whole LilyPond file; also used for LilyPond blocks in documents.
pub(crate) fn global_items() -> Vec<TokenKind> {
    [
        ly(&[K::Book, K::BookPart, K::Score]),
        ly(&MARKUPS),
        ly(&[K::Paper, K::Header, K::Layout]),
        toplevel_base_items(),
        ly(&[K::Name, K::EqualSign]),
    ]
    .concat()
}

fn expect_bracket() -> ContextSpec {
    ContextSpec::new([space_items(), ly(&[K::OpenBracket])].concat())
        .mode(Mode::LilyPond)
        .fallthrough(Fallthrough::Leave)
}

fn expect_music() -> ContextSpec {
    ContextSpec::new([space_items(), ly(&[K::OpenBracket, K::OpenSimultaneous])].concat())
        .fallthrough(Fallthrough::Leave)
}

fn block(kinds: &[LyKind], rest: Vec<TokenKind>) -> ContextSpec {
    ContextSpec::new([ly(kinds), rest].concat()).mode(Mode::LilyPond)
}

fn input_mode() -> ContextSpec {
    ContextSpec::new([ly(&[K::OpenBracket, K::OpenSimultaneous]), parse_music_items()].concat()).mode(Mode::LilyPond)
}

const MARKUPS: [LyKind; 3] = [K::Markup, K::MarkupLines, K::MarkupList];

pub(crate) fn spec(ctx: LyContext) -> ContextSpec {
    match ctx {
        C::Global => ContextSpec::new(global_items()).mode(Mode::LilyPond),
        C::ExpectScore
        | C::ExpectBook
        | C::ExpectBookPart
        | C::ExpectPaper
        | C::ExpectHeader
        | C::ExpectLayout
        | C::ExpectMidi
        | C::ExpectWith
        | C::ExpectContext => expect_bracket(),
        C::ParseScore => block(&[K::CloseBracket, K::Header, K::Layout, K::Midi, K::With], toplevel_base_items()),
        C::ParseBook => block(
            &[K::CloseBracket, K::Markup, K::MarkupLines, K::MarkupList, K::BookPart, K::Score, K::Paper, K::Header, K::Layout],
            toplevel_base_items(),
        ),
        C::ParseBookPart => block(
            &[K::CloseBracket, K::Markup, K::MarkupLines, K::MarkupList, K::Score, K::Paper, K::Header, K::Layout],
            toplevel_base_items(),
        ),
        C::ParsePaper => ContextSpec::new(
            [
                base_items(),
                ly(&[K::CloseBracket]),
                ly(&MARKUPS),
                ly(&[K::PaperVariable, K::EqualSign, K::DecimalValue, K::Unit]),
            ]
            .concat(),
        )
        .mode(Mode::LilyPond),
        C::ParseHeader => block(
            &[K::CloseBracket, K::Markup, K::MarkupLines, K::MarkupList, K::HeaderVariable, K::EqualSign],
            toplevel_base_items(),
        ),
        C::ParseLayout | C::ParseMidi => ContextSpec::new(
            [
                base_items(),
                ly(&[K::CloseBracket, K::LayoutContext, K::LayoutVariable, K::EqualSign, K::DecimalValue, K::Unit]),
            ]
            .concat(),
        )
        .mode(Mode::LilyPond),
        C::ParseWith => block(&[K::CloseBracket, K::ContextProperty, K::EqualSign], toplevel_base_items()),
        C::ParseContext => block(
            &[K::CloseBracket, K::BackSlashedContextName, K::ContextProperty, K::EqualSign],
            toplevel_base_items(),
        ),
        C::ParseMusic | C::ParseNoteMode => ContextSpec::new(parse_music_items()).mode(Mode::LilyPond),
        C::ParseChord => ContextSpec::new([ly(&[K::ErrorInChord, K::ChordEnd]), music_items()].concat()).mode(Mode::LilyPond),
        C::ParseString => {
            ContextSpec::new(ly(&[K::StringQuotedEnd, K::StringQuoteEscape])).default_kind(TokenKind::LilyPond(K::String))
        }
        C::ParseBlockComment => {
            ContextSpec::new(ly(&[K::BlockCommentEnd])).default_kind(TokenKind::LilyPond(K::Comment))
        }
        C::ParseMarkup => ContextSpec::new(
            [
                ly(&[
                    K::MarkupScore,
                    K::MarkupCommand,
                    K::MarkupUserCommand,
                    K::OpenBracketMarkup,
                    K::CloseBracketMarkup,
                    K::MarkupWord,
                ]),
                base_items(),
            ]
            .concat(),
        ),
        C::ParseRepeat => {
            ContextSpec::new([space_items(), ly(&[K::RepeatSpecifier, K::RepeatStringSpecifier, K::RepeatCount])].concat())
                .fallthrough(Fallthrough::Leave)
        }
        C::ParseDuration => ContextSpec::new([space_items(), ly(&[K::Dot])].concat())
            .fallthrough(Fallthrough::Replace(lily(C::ParseDurationScaling))),
        C::ParseDurationScaling => {
            ContextSpec::new([space_items(), ly(&[K::Scaling])].concat()).fallthrough(Fallthrough::Leave)
        }
        C::ParseOverride => ContextSpec::new(
            [
                ly(&[K::ContextName, K::DotSetOverride, K::GrobName, K::GrobProperty, K::EqualSignSetOverride, K::Name]),
                base_items(),
            ]
            .concat(),
        )
        .mode(Mode::LilyPond),
        C::ParseRevert => ContextSpec::new(
            [
                space_items(),
                ly(&[K::ContextName, K::DotSetOverride, K::GrobName, K::GrobProperty, K::Name, K::SchemeStart]),
            ]
            .concat(),
        )
        .fallthrough(Fallthrough::Leave),
        C::ParseSet => ContextSpec::new(
            [
                ly(&[K::ContextName, K::DotSetOverride, K::ContextProperty, K::EqualSignSetOverride, K::Name]),
                base_items(),
            ]
            .concat(),
        )
        .mode(Mode::LilyPond),
        C::ParseUnset => ContextSpec::new(
            [space_items(), ly(&[K::ContextName, K::DotSetOverride, K::ContextProperty, K::Name])].concat(),
        )
        .fallthrough(Fallthrough::Leave),
        C::ParseTweak => ContextSpec::new(
            [space_items(), ly(&[K::GrobName, K::DotSetOverride, K::GrobProperty, K::Name])].concat(),
        )
        .fallthrough(Fallthrough::Leave),
        C::ParseTranslator => ContextSpec::new([space_items(), ly(&[K::ContextName, K::Name])].concat())
            .fallthrough(Fallthrough::Leave),
        C::ExpectTranslatorId => {
            ContextSpec::new([space_items(), ly(&[K::EqualSign])].concat()).fallthrough(Fallthrough::Leave)
        }
        C::ParseTranslatorId => ContextSpec::new([space_items(), ly(&[K::Name, K::StringQuotedStart])].concat())
            .argcount(1)
            .fallthrough(Fallthrough::Leave),
        C::ParseClef => ContextSpec::new([space_items(), ly(&[K::ClefSpecifier, K::StringQuotedStart])].concat())
            .argcount(1)
            .fallthrough(Fallthrough::Leave),
        C::ParseScriptAbbreviationOrFingering => {
            ContextSpec::new([space_items(), ly(&[K::ScriptAbbreviation, K::Fingering])].concat())
                .argcount(1)
                .fallthrough(Fallthrough::Leave)
        }
        C::ExpectLyricMode => ContextSpec::new(
            [
                space_items(),
                ly(&[K::OpenBracket, K::OpenSimultaneous, K::SchemeStart, K::StringQuotedStart, K::Name]),
            ]
            .concat(),
        )
        .fallthrough(Fallthrough::Leave),
        C::ParseLyricMode => ContextSpec::new(
            [
                base_items(),
                ly(&[
                    K::CloseBracket,
                    K::CloseSimultaneous,
                    K::OpenBracket,
                    K::OpenSimultaneous,
                    K::PipeSymbol,
                    K::LyricHyphen,
                    K::LyricExtender,
                    K::LyricSkip,
                    K::LyricTie,
                    K::LyricText,
                    K::Dynamic,
                    K::Skip,
                    K::Length,
                ]),
                ly(&MARKUPS),
                ly(COMMAND_KINDS),
            ]
            .concat(),
        )
        .mode(Mode::LilyPond),
        C::ExpectChordMode | C::ExpectNoteMode | C::ExpectDrumMode | C::ExpectFigureMode => expect_music(),
        C::ParseChordMode => {
            let mut spec = input_mode();
            spec.items.push(TokenKind::LilyPond(K::ChordSeparator));
            spec
        }
        C::ParseDrumMode | C::ParseFigureMode => input_mode(),
        C::ParsePitchCommand => ContextSpec::new([space_items(), ly(&[K::Note, K::Octave])].concat())
            .argcount(1)
            .fallthrough(Fallthrough::Leave),
        C::ParseTremolo => ContextSpec::new(ly(&[K::TremoloDuration])).fallthrough(Fallthrough::Leave),
        C::ParseChordItems => ContextSpec::new(ly(&[
            K::ChordSeparator,
            K::ChordModifier,
            K::ChordStepNumber,
            K::ChordDot,
            K::Note,
        ]))
        .fallthrough(Fallthrough::Leave),
        C::ParseTempo => ContextSpec::new(
            [
                space_items(),
                ly(&MARKUPS),
                ly(&[K::StringQuotedStart, K::SchemeStart, K::Length, K::EqualSign, K::IntegerValue, K::TempoSeparator]),
            ]
            .concat(),
        )
        .fallthrough(Fallthrough::Leave),
    }
}

impl LyContext {
    /// The block context an expecting context turns into at its opening bracket.
    fn opened(self) -> Option<LyContext> {
        Some(match self {
            C::ExpectScore => C::ParseScore,
            C::ExpectBook => C::ParseBook,
            C::ExpectBookPart => C::ParseBookPart,
            C::ExpectPaper => C::ParsePaper,
            C::ExpectHeader => C::ParseHeader,
            C::ExpectLayout => C::ParseLayout,
            C::ExpectMidi => C::ParseMidi,
            C::ExpectWith => C::ParseWith,
            C::ExpectContext => C::ParseContext,
            C::ExpectLyricMode => C::ParseLyricMode,
            C::ExpectChordMode => C::ParseChordMode,
            C::ExpectNoteMode => C::ParseNoteMode,
            C::ExpectDrumMode => C::ParseDrumMode,
            C::ExpectFigureMode => C::ParseFigureMode,
            _ => return None,
        })
    }
}

/// Context behavior for tokens that carry no transition of their own.
pub(crate) fn hook(ctx: LyContext, kind: TokenKind, text: &str, state: &mut State) {
    let is = |k: LyKind| kind == TokenKind::LilyPond(k);
    let opens = is(K::OpenBracket) || is(K::OpenSimultaneous);
    match ctx {
        C::ExpectLyricMode | C::ExpectChordMode | C::ExpectNoteMode | C::ExpectDrumMode | C::ExpectFigureMode => {
            if let Some(next) = ctx.opened().filter(|_| opens) {
                state.replace(lily(next));
            }
        }
        C::ParseLyricMode | C::ParseDrumMode | C::ParseFigureMode if opens => state.enter(lily(ctx)),
        C::ParseChordMode => {
            if opens {
                state.enter(lily(ctx));
            } else if is(K::ChordSeparator) {
                state.enter(lily(C::ParseChordItems));
            }
        }
        C::ParseUnset => {
            if is(K::ContextProperty) || text.starts_with(|c: char| c.is_lowercase()) {
                state.leave();
            }
        }
        C::ParseTranslator => {
            if is(K::Name) || is(K::ContextName) {
                state.replace(lily(C::ExpectTranslatorId));
            }
        }
        C::ExpectTranslatorId => {
            if is(K::EqualSign) {
                state.replace(lily(C::ParseTranslatorId));
            }
        }
        C::ParseTranslatorId => {
            if is(K::Name) {
                state.leave();
            }
        }
        C::ParseRevert | C::ParseTweak => {
            if is(K::GrobProperty) || is(K::Name) {
                state.leave();
            }
        }
        C::ParsePitchCommand => {
            if is(K::Note) {
                state.set_argcount(state.argcount().saturating_sub(1));
            } else if kind == TokenKind::Space && state.argcount() == 0 {
                state.leave();
            }
        }
        _ => {
            if let Some(next) = ctx.opened().filter(|_| is(K::OpenBracket)) {
                state.replace(lily(next));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(text: &str) -> Vec<(&'static str, String)> {
        let mut state = State::for_mode(Mode::LilyPond);
        state.tokens(text, 0).map(|t| (t.kind.name(), t.text.to_string())).collect()
    }

    fn kind_of(text: &str, word: &str) -> Option<&'static str> {
        lex(text).into_iter().find(|(_, t)| t == word).map(|(k, _)| k)
    }

    #[test]
    fn word_tables_pick_the_kind() {
        assert_eq!(kind_of("{ c\\staccato }", "\\staccato"), Some("Articulation"));
        assert_eq!(kind_of("{ c\\sfz }", "\\sfz"), Some("Dynamic"));
        assert_eq!(kind_of("{ c\\< d\\! }", "\\<"), Some("Dynamic"));
        assert_eq!(kind_of("{ \\voiceOne c }", "\\voiceOne"), Some("Command"));
        assert_eq!(kind_of("{ \\myMusic }", "\\myMusic"), Some("UserCommand"));
        assert_eq!(kind_of("\\bookpart { }", "\\bookpart"), Some("BookPart"));
        assert_eq!(kind_of("{ \\transposition c }", "\\transposition"), Some("PitchCommand"));
    }

    #[test]
    fn notes_rests_and_skips() {
        assert_eq!(kind_of("{ s4 }", "s"), Some("Skip"));
        assert_eq!(kind_of("{ ses4 }", "ses"), Some("Note"));
        assert_eq!(kind_of("{ r }", "r"), Some("Rest"));
        assert_eq!(kind_of("{ <c e>4 q }", "q"), Some("Q"));
    }

    #[test]
    fn markup_arguments_close_their_frames() {
        let mut state = State::for_mode(Mode::LilyPond);
        state.tokens("{ c^\\markup \\bold \\italic x ", 0).for_each(drop);
        assert_eq!(state.top(), lily(C::ParseMusic));
        assert_eq!(state.depth(), 2);

        let mut state = State::for_mode(Mode::LilyPond);
        state.tokens("\\markup { a \\fontsize #2 b } ", 0).for_each(drop);
        assert_eq!(state.depth(), 1);
    }

    #[test]
    fn blocks_open_on_their_bracket() {
        let mut state = State::for_mode(Mode::LilyPond);
        state.tokens("\\header {", 0).for_each(drop);
        assert_eq!(state.top(), lily(C::ParseHeader));
        assert_eq!(kind_of("\\header { title = \"x\" }", "title"), Some("HeaderVariable"));
    }

    #[test]
    fn scheme_start_is_not_embedded_lilypond() {
        assert_eq!(kind_of("{ c-#'x }", "#"), Some("SchemeStart"));
        let toks = lex("#(list #{ c #})");
        assert!(toks.iter().any(|(k, t)| *k == "LilyPondStart" && t == "#{"));
        let mut state = State::for_mode(Mode::LilyPond);
        state.tokens("#(list #{ c #}) ", 0).for_each(drop);
        assert_eq!(state.depth(), 1);
    }

    #[test]
    fn pitch_command_takes_its_pitches() {
        let mut state = State::for_mode(Mode::LilyPond);
        state.tokens("{ \\transpose c d ", 0).for_each(drop);
        assert_eq!(state.top(), lily(C::ParseMusic));
        let toks = lex("{ \\relative c'' { d } }");
        let names: Vec<_> = toks.iter().map(|(k, _)| *k).filter(|k| *k != "Space").collect();
        assert_eq!(
            names,
            ["SequentialStart", "PitchCommand", "Note", "Octave", "SequentialStart", "Note", "SequentialEnd", "SequentialEnd"]
        );
    }

    #[test]
    fn override_path() {
        let toks = lex("{ \\override Staff.NoteHead.color = #red }");
        let names: Vec<_> = toks.iter().map(|(k, _)| *k).filter(|k| *k != "Space").collect();
        assert_eq!(
            &names[..7],
            ["SequentialStart", "Override", "ContextName", "DotSetOverride", "GrobName", "DotSetOverride", "GrobProperty"]
        );
        assert_eq!(names[7], "EqualSignSetOverride");
    }

    #[test]
    fn chord_rejects_durations() {
        assert_eq!(kind_of("{ <c 4 e> }", "4"), Some("ErrorInChord"));
        assert_eq!(kind_of("{ <c e>4 }", "4"), Some("Length"));
    }
}
