//! The music tree and musical time.
//!
//! A [`Document`] tokenizes its text once in LilyPond mode and reads the
//! tokens into a [`Tree`] of items:
//!
//! ```text
//!   text ──> read::scan ──> [Scanned] ──> read::build ──> Tree
//!                                                          │
//!   Document { text, tree, options, include resolver } <───┘
//!      │
//!      ├── node(pos)            deepest item at a position
//!      ├── time_position(pos)   Events walk up to a position
//!      └── user_command_value   \name -> assignment, across \include
//! ```
//!
//! ## Responsibilities by module
//!
//! - `duration.rs`: [`Fraction`], [`Duration`] and duration parsing.
//! - `pitch.rs`: note names in the supported pitch languages.
//! - `items.rs`: [`ItemKind`], [`Item`] and the [`Tree`] arena.
//! - `read.rs`: the token cursor and one handler per item-starting token.
//! - `values.rs`: strings, numbers and Scheme values of items.
//! - `events.rs`: [`Events`] and the position-to-time walk.
//! - `document.rs`: [`Document`], its accessors and the include resolver.

#[path = "music/document.rs"]
mod document;
#[path = "music/duration.rs"]
mod duration;
#[path = "music/events.rs"]
mod events;
#[path = "music/items.rs"]
mod items;
#[path = "music/pitch.rs"]
mod pitch;
#[path = "music/read.rs"]
mod read;
#[path = "music/values.rs"]
mod values;

#[cfg(test)]
#[path = "music/tests.rs"]
mod tests;

pub use document::Document;
pub use duration::{Duration, Fraction, base_value, parse_fraction};
pub use events::{EventLevel, Events, music_events_til_position, preceding};
pub use items::{Attr, Item, ItemData, ItemId, ItemKind, Lexeme, SpanEvent, Tree};
pub use pitch::{LANGUAGES, Pitch, octave_to_num, read_pitch_name};
pub use values::NumberValue;
