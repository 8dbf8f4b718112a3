use super::*;
use rstest::rstest;

const LILYPOND: &str = r#"\version "2.24.0"
\header { title = "Étude" composer = \markup \bold { J. S. Bach } }
%{ block
   comment %}
melody = \relative c'' {
  \clef "treble" \time 3/4 \key g \major
  \tuplet 3/2 { c8( d e) } f4.-> g8\p |
  <c e g>2 ~ <c e g>4 \times 2/3 { a8[ b c] }
  \repeat volta 2 { r4 s2 } \alternative { { c1 } { d1 } }
  \override Staff.TimeSignature.color = #(rgb-color 1 0 0)
  \set Staff.instrumentName = "Flute"
}
\score { \new Staff \with { \remove "Time_signature_engraver" } \melody \layout { } }
"#;

const SCHEME: &str = "; a comment\n(define (f x)\n  #! block !#\n  (* x 2.5 #t #\\a \"s\"))\n";
const HTML: &str = "<html><!-- c -->\n<p>Text &amp; <lilypond fragment: c' d/></p>\n<lilypond>\n{ c4 }\n</lilypond>\n";
const LATEX: &str = "\\documentclass{article}\n\\begin{document}\n\\lilypond[staffsize=11]{ c d }\n\\begin{lilypond}\n{ e4 }\n\\end{lilypond}\n\\end{document}\n";
const TEXINFO: &str = "@node Top\n@c comment\n@lilypond[fragment]{c d}\n@lilypond\n{ f4 }\n@end lilypond\n";
const DOCBOOK: &str = "<!DOCTYPE book>\n<book><programlisting language=\"lilypond\">\n{ g4 }\n</programlisting></book>\n";

fn sample(mode: Mode) -> &'static str {
    match mode {
        Mode::LilyPond => LILYPOND,
        Mode::Scheme => SCHEME,
        Mode::Html => HTML,
        Mode::Latex => LATEX,
        Mode::Texinfo => TEXINFO,
        Mode::DocBook => DOCBOOK,
    }
}

fn line_kinds(state: &mut State, line: &str) -> Vec<(usize, usize, TokenKind)> {
    state.tokens(line, 0).map(|t| (t.start, t.end, t.kind)).collect()
}

#[test]
fn tokens_cover_the_text_in_every_mode() {
    for mode in Mode::ALL {
        let text = sample(mode);
        let tokens = tokenize(text, mode);
        let mut pos = 0;
        for token in &tokens {
            assert_eq!(token.start, pos, "gap before {:?} in {mode}", token.text);
            pos = token.end;
        }
        assert_eq!(pos, text.len(), "{mode} did not reach the end");
        let joined: String = tokens.iter().map(|t| t.text).collect();
        assert_eq!(joined, text);
    }
}

#[test]
fn scanning_is_deterministic() {
    for mode in Mode::ALL {
        let a: Vec<_> = tokenize(sample(mode), mode).iter().map(|t| (t.start, t.kind)).collect();
        let b: Vec<_> = tokenize(sample(mode), mode).iter().map(|t| (t.start, t.kind)).collect();
        assert_eq!(a, b);
    }
}

#[test]
fn thawed_state_continues_like_the_original() {
    for mode in Mode::ALL {
        let lines: Vec<&str> = sample(mode).split_inclusive('\n').collect();
        let mut fridge = Fridge::new();
        let mut state = State::for_mode(mode);
        let mut ids = Vec::new();
        let mut expected = Vec::new();
        for line in &lines {
            ids.push(fridge.freeze(&state));
            expected.push(line_kinds(&mut state, line));
        }
        for (i, line) in lines.iter().enumerate() {
            let Some(mut thawed) = fridge.thaw(ids[i]) else { panic!("no state {}", ids[i]) };
            assert_eq!(line_kinds(&mut thawed, line), expected[i], "{mode} line {i}");
        }
    }
}

#[test]
fn follow_replays_cached_tokens() {
    let mut scanned = State::for_mode(Mode::LilyPond);
    let mut replayed = State::for_mode(Mode::LilyPond);
    for line in LILYPOND.split_inclusive('\n') {
        let tokens: Vec<Token<'_>> = scanned.tokens(line, 0).collect();
        for token in &tokens {
            replayed.follow(token);
        }
        assert_eq!(replayed.freeze(), scanned.freeze(), "after {line:?}");
    }
}

#[test]
fn brackets_balance_in_wellformed_input() {
    let mut open: Vec<&'static str> = Vec::new();
    for token in tokenize(LILYPOND, Mode::LilyPond) {
        let Some(name) = token.matchname() else { continue };
        if token.caps().contains(Caps::MATCH_START) {
            open.push(name);
        } else if token.caps().contains(Caps::MATCH_END) {
            assert_eq!(open.pop(), Some(name), "unmatched {} at {}", token.text, token.start);
        }
    }
    assert!(open.is_empty(), "unclosed: {open:?}");
}

#[test]
fn every_token_kind_has_a_name() {
    for id in ContextId::all() {
        assert!(!id.name().is_empty());
    }
    assert_eq!(TokenKind::Space.name(), "Space");
}

#[rstest]
#[case("\\version \"2.20\"", Mode::LilyPond)]
#[case("% comment\n\\relative { c }", Mode::LilyPond)]
#[case("\\documentclass{article}", Mode::Latex)]
#[case("\\begin{document}", Mode::Latex)]
#[case("\\markup { x }", Mode::LilyPond)]
#[case("<< { c } >>", Mode::LilyPond)]
#[case("<!DOCTYPE book>", Mode::DocBook)]
#[case("<article><programlisting>", Mode::DocBook)]
#[case("<html><body>", Mode::Html)]
#[case("(define x 1)", Mode::Scheme)]
#[case("; scheme", Mode::Scheme)]
#[case("#!/usr/bin/guile", Mode::Scheme)]
#[case("@node foo", Mode::Texinfo)]
#[case("  { c d e }", Mode::LilyPond)]
#[case("", Mode::LilyPond)]
fn guess_table(#[case] text: &str, #[case] expected: Mode) {
    assert_eq!(Mode::guess(text), expected);
}

#[rstest]
#[case("lilypond", ".ly")]
#[case("scheme", ".scm")]
#[case("html", ".html")]
#[case("latex", ".lytex")]
#[case("texinfo", ".texi")]
#[case("docbook", ".docbook")]
fn mode_names_and_extensions(#[case] name: &str, #[case] ext: &str) {
    let Ok(mode) = name.parse::<Mode>() else { panic!("unknown mode {name}") };
    assert_eq!(mode.extension(), ext);
    assert_eq!(Mode::from_extension(ext), Some(mode));
    assert_eq!(mode.to_string(), name);
}

#[test]
fn unknown_mode_name_is_an_error() {
    assert!(matches!("abc".parse::<Mode>(), Err(crate::Error::UnknownMode(name)) if name == "abc"));
}

#[test]
fn unterminated_constructs_carry_over() {
    let mut state = State::for_mode(Mode::LilyPond);
    line_kinds(&mut state, "x = \"multi");
    let kinds = line_kinds(&mut state, "line\" { c }");
    assert_eq!(kinds[0].2.name(), "String");
    assert_eq!(state.depth(), 1);
}

#[test]
fn stray_closers_never_pop_the_root() {
    for mode in Mode::ALL {
        let mut state = State::for_mode(mode);
        line_kinds(&mut state, "} } >> ) ] </x> @end x \\end{x}");
        assert!(state.depth() >= 1);
        assert_eq!(state.frames()[0].context, mode.root_context());
    }
}
