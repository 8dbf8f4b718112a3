use super::*;
use crate::api::{FileLoader, Options, build_document, build_document_with, fs_loader, load_document};
use rstest::rstest;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn f(n: i64, d: i64) -> Fraction {
    Fraction::new(n, d)
}

fn find(doc: &Document, kind: ItemKind) -> ItemId {
    doc.tree().find(ItemId::ROOT, kind).unwrap_or_else(|| panic!("no {} in {:?}", kind.name(), doc.text()))
}

fn toplevel(doc: &Document) -> Vec<ItemId> {
    doc.tree().children(ItemId::ROOT).to_vec()
}

/// The length of the last toplevel item.
fn length_with(text: &str, options: &Options) -> Fraction {
    let doc = build_document_with(text, None, options, None);
    let last = *toplevel(&doc).last().unwrap_or_else(|| panic!("nothing read from {text:?}"));
    doc.item_length(last).unwrap_or_else(|| panic!("length of {text:?} overflows"))
}

fn length(text: &str) -> Fraction {
    length_with(text, &Options::default())
}

fn unfolded() -> Options {
    Options { unfold_repeats: true, ..Options::default() }
}

/// Files kept in memory, keyed by absolute path.
fn memory_loader(files: &[(&str, &str)]) -> FileLoader {
    let files: HashMap<PathBuf, String> = files.iter().map(|(p, t)| (PathBuf::from(p), t.to_string())).collect();
    Arc::new(move |path: &Path| files.get(path).cloned())
}

fn with_files(text: &str, files: &[(&str, &str)]) -> Arc<Document> {
    build_document_with(text, Some(Path::new("/music/main.ly")), &Options::default(), Some(memory_loader(files)))
}

// --- Musical time -------------------------------------------------------------

#[rstest]
#[case("{ c4 d e f }", f(1, 1))]
#[case("{ c4. d8 }", f(1, 2))]
#[case("{ c4 d2 e }", f(5, 4))]
#[case(r"{ \tuplet 3/2 { c4 c4 c4 } }", f(1, 2))]
#[case(r"{ \times 2/3 { c8 c c } }", f(1, 4))]
#[case(r"{ \grace { c16 d } e4 }", f(1, 4))]
#[case(r"{ c2 \afterGrace d2 { e16 f } }", f(1, 1))]
#[case("<< { c2 } { d4 } >>", f(1, 2))]
#[case("{ <c e g>2 q }", f(1, 1))]
#[case("{ r4 s4 }", f(1, 2))]
#[case(r"{ \repeat unfold 2 { c4 d } }", f(1, 1))]
#[case(r"{ \repeat volta 2 { c4 } \alternative { { d4 } { e4 } } }", f(3, 4))]
#[case(r"{ \tag #'a { c4 } d4 }", f(1, 2))]
#[case(r"\new Staff { c2 }", f(1, 2))]
#[case(r"{ \partial 4 c4 \time 3/4 d2. }", f(1, 1))]
#[case(r"\lyricmode { Hel -- lo }", f(1, 2))]
fn music_lengths(#[case] text: &str, #[case] expected: Fraction) {
    assert_eq!(length(text), expected, "{text}");
}

#[rstest]
#[case(r"{ \repeat volta 3 { c4 } \alternative { { d4 } { e4 } } }", f(3, 2))]
#[case(r"{ \repeat volta 2 { c4 d } }", f(1, 1))]
#[case(r"{ \repeat volta 2 { c4 } \alternative { { d4 } { e4 } { f4 } } }", f(3, 2))]
fn unfolded_repeat_lengths(#[case] text: &str, #[case] expected: Fraction) {
    assert_eq!(length_with(text, &unfolded()), expected, "{text}");
}

#[test]
fn durations_carry_over() {
    let doc = build_document("{ c4. d e8 }");
    let notes: Vec<ItemId> =
        doc.tree().descendants(ItemId::ROOT).into_iter().filter(|&i| doc.tree().kind(i) == ItemKind::Note).collect();
    let lengths: Vec<Option<Fraction>> = notes.iter().map(|&n| doc.item_length(n)).collect();
    assert_eq!(lengths, [Some(f(3, 8)), Some(f(3, 8)), Some(f(1, 8))]);
    assert_eq!(doc.duration(notes[0]), Some(Duration::new(f(1, 4), f(3, 2))));
}

#[test]
fn time_position_inside_music() {
    // 0123456789012345
    // { c4 d8 e8 f2 }
    let doc = build_document("{ c4 d8 e8 f2 }");
    assert_eq!(doc.time_position(2), Some(f(0, 1)));
    assert_eq!(doc.time_position(8), Some(f(3, 8)));
    assert_eq!(doc.time_position(doc.text().len()), Some(f(1, 1)));
}

#[test]
fn time_position_outside_music() {
    let doc = build_document("\\header { title = \"x\" }\n{ c4 }");
    assert_eq!(doc.time_position(3), None);
}

#[test]
fn time_length_between_positions() {
    let doc = build_document("{ c4 d8 e8 f2 }");
    assert_eq!(doc.time_length(2, 11), Some(f(1, 2)));
    assert_eq!(doc.time_length(11, 2), Some(f(1, 2)));
    assert_eq!(doc.time_length(5, 5), Some(f(0, 1)));
}

#[test]
fn time_length_needs_one_expression() {
    let doc = build_document("{ c4 }\n{ d4 }");
    assert_eq!(doc.time_length(2, 9), None);
}

#[test]
fn events_walk_with_explicit_policy() {
    let doc = build_document(r"{ \repeat volta 2 { c4 d } }");
    let music = toplevel(&doc)[0];
    let mut events = Events::new(doc.options());
    assert_eq!(events.read(&doc, music), Some(f(1, 2)));
    events.unfold_repeats = true;
    assert_eq!(events.read(&doc, music), Some(f(1, 1)));
    assert_eq!(events.traverse(&doc, music, f(1, 1), f(1, 2)), f(3, 2));
}

// --- Variables ----------------------------------------------------------------

#[test]
fn variables_resolve_backwards() {
    let doc = build_document("melody = { c4 d }\n{ \\melody e2 }");
    let reference = find(&doc, ItemKind::UserCommand);
    let Some((value_doc, value)) = doc.user_command_value(reference) else { panic!("unresolved") };
    assert!(Arc::ptr_eq(&value_doc, &doc));
    assert_eq!(doc.tree().kind(value), ItemKind::MusicList);
    assert_eq!(length("melody = { c4 d }\n{ \\melody e2 }"), f(1, 1));
}

#[test]
fn unknown_and_later_variables_are_empty() {
    assert_eq!(length("{ \\nothing c4 }"), f(1, 4));
    let doc = build_document("{ \\later c4 }\nlater = { c1 }");
    assert_eq!(doc.item_length(toplevel(&doc)[0]), Some(f(1, 4)));
    assert_eq!(length("a = { \\a c4 }\n{ \\a }"), f(1, 4));
}

#[test]
fn reference_depth_is_bounded() {
    let text = "a = { c4 }\nb = \\a\nc = \\b\n{ \\c }";
    assert_eq!(length(text), f(1, 4));
    let shallow = Options { max_reference_depth: 2, ..Options::default() };
    assert_eq!(length_with(text, &shallow), f(0, 1));
}

// --- Limits -------------------------------------------------------------------

fn max_depth(doc: &Document) -> usize {
    let tree = doc.tree();
    tree.descendants(ItemId::ROOT).into_iter().map(|d| tree.ancestors(d).count()).max().unwrap_or(0)
}

#[rstest]
#[case("{ ", "c4", " }")]
#[case("#(", "x", ")")]
#[case("\\markup { ", "x", " }")]
fn deep_nesting_is_cut_off(#[case] open: &str, #[case] inner: &str, #[case] close: &str) {
    let n = 10_000;
    let text = format!("{}{inner}{}", open.repeat(n), close.repeat(n));
    let doc = build_document(&text);
    assert!(max_depth(&doc) <= Options::default().max_nesting_depth + 2, "{}", max_depth(&doc));
}

#[test]
fn deep_music_still_has_a_time() {
    let n = 10_000;
    let doc = build_document(&format!("{}c4{}", "{ ".repeat(n), " }".repeat(n)));
    assert_eq!(doc.time_position(doc.text().len()), Some(f(0, 1)));
}

#[test]
fn music_past_the_nesting_limit_is_skipped() {
    let text = "{ { { { c4 } } } d4 }";
    assert_eq!(length(text), f(1, 2));
    let shallow = Options { max_nesting_depth: 3, ..Options::default() };
    assert_eq!(length_with(text, &shallow), f(1, 4));
}

#[test]
fn overflowing_durations_fall_back() {
    let text = format!("{{ c2 d4{} }}", ".".repeat(62));
    assert_eq!(length(&text), f(1, 1));
}

#[test]
fn overflowing_sums_are_unresolved() {
    let doc = build_document("{ c1*4611686018427387904 c1*4611686018427387904 }");
    let music = toplevel(&doc)[0];
    assert_eq!(doc.item_length(music), None);
    assert_eq!(doc.time_position(doc.text().len()), None);
    let first = find(&doc, ItemKind::Note);
    assert_eq!(doc.item_length(first), Some(Fraction::from_integer(4611686018427387904)));
}

// --- Includes -----------------------------------------------------------------

#[test]
fn variables_resolve_across_includes() {
    let doc = with_files("\\include \"defs.ly\"\n{ \\foo c4 }", &[("/music/defs.ly", "foo = { c4 d4 }")]);
    let reference = find(&doc, ItemKind::UserCommand);
    let Some((defs, value)) = doc.user_command_value(reference) else { panic!("unresolved") };
    assert_eq!(defs.filename(), Some(Path::new("/music/defs.ly")));
    assert_eq!(defs.tree().kind(value), ItemKind::MusicList);
    assert_eq!(doc.item_length(toplevel(&doc)[1]), Some(f(3, 4)));
}

#[test]
fn include_path_is_searched() {
    let options = Options { include_path: vec![PathBuf::from("/lib")], ..Options::default() };
    let loader = memory_loader(&[("/lib/defs.ly", "foo = { c2 }")]);
    let doc = build_document_with("\\include \"defs.ly\"\n{ \\foo }", None, &options, Some(loader));
    assert_eq!(doc.resolve_filename("defs.ly"), Some(PathBuf::from("/lib/defs.ly")));
    assert_eq!(doc.item_length(toplevel(&doc)[1]), Some(f(1, 2)));
}

#[test]
fn own_directory_comes_first() {
    let options = Options { include_path: vec![PathBuf::from("/lib"), PathBuf::from("/music")], ..Options::default() };
    let loader = memory_loader(&[("/lib/defs.ly", "foo = { c2 }"), ("/music/defs.ly", "foo = { c4 }")]);
    let doc = build_document_with("\\include \"defs.ly\"", Some(Path::new("/music/main.ly")), &options, Some(loader));
    assert_eq!(doc.resolve_filename("defs.ly"), Some(PathBuf::from("/music/defs.ly")));
    assert_eq!(doc.resolve_filename("/lib/defs.ly"), Some(PathBuf::from("/lib/defs.ly")));
    assert_eq!(doc.resolve_filename("missing.ly"), None);
}

#[test]
fn included_documents_are_shared() {
    let doc = with_files("\\include \"defs.ly\"\n\\include \"defs.ly\"", &[("/music/defs.ly", "x = 1")]);
    let [first, second] = toplevel(&doc)[..] else { panic!("expected two includes") };
    assert_eq!(doc.include_filename(first).as_deref(), Some("defs.ly"));
    let (Some(a), Some(b)) = (doc.included_document(first), doc.included_document(second)) else {
        panic!("unresolved include")
    };
    assert!(Arc::ptr_eq(&a, &b));
    assert!(doc.is_root());
    assert!(!a.is_root());
    let Some((parent, include)) = a.include_parent() else { panic!("no include parent") };
    assert!(Arc::ptr_eq(&parent, &doc));
    assert_eq!(include, first);
}

#[test]
fn include_parent_is_the_first_resolution() {
    let doc = with_files("\\include \"defs.ly\"\n\\include \"defs.ly\"", &[("/music/defs.ly", "x = { c4 }")]);
    let [first, second] = toplevel(&doc)[..] else { panic!("expected two includes") };
    let Some(shared) = doc.included_document(second) else { panic!("unresolved include") };
    assert!(doc.included_document(first).is_some_and(|d| Arc::ptr_eq(&d, &shared)));
    let Some((_, include)) = shared.include_parent() else { panic!("no include parent") };
    assert_eq!(include, second);
}

#[test]
fn missing_includes_stay_unresolved() {
    let doc = with_files("\\include \"nope.ly\"\n{ \\foo c4 }", &[]);
    assert_eq!(doc.included_document(toplevel(&doc)[0]).map(|d| d.text().to_string()), None);
    assert_eq!(doc.item_length(toplevel(&doc)[1]), Some(f(1, 4)));

    let unloaded = build_document("\\include \"defs.ly\"");
    assert!(unloaded.included_document(toplevel(&unloaded)[0]).is_none());
}

#[test]
fn cyclic_includes_are_refused() {
    let doc = with_files("\\include \"b.ly\"", &[("/music/b.ly", "\\include \"main.ly\"\nx = 1")]);
    let Some(b) = doc.included_document(toplevel(&doc)[0]) else { panic!("b.ly unresolved") };
    let back = toplevel(&b)[0];
    assert_eq!(b.tree().kind(back), ItemKind::Include);
    assert!(b.included_document(back).is_none());
    assert!(!doc.has_output(ItemId::ROOT));
}

#[test]
fn reference_cycles_through_includes_terminate() {
    let root = "\\include \"x.ly\"\nb = \\a\n\\include \"x.ly\"\n{ \\b c4 }";
    let doc = with_files(root, &[("/music/x.ly", "a = \\b")]);
    let music = *toplevel(&doc).last().unwrap_or_else(|| panic!("empty"));
    assert_eq!(doc.item_length(music), Some(f(1, 4)));
}

#[test]
fn toplevel_items_nearest_first() {
    let root = "a = { c4 }\n\\include \"defs.ly\"\nb = { d4 }\n{ c4 }";
    let doc = with_files(root, &[("/music/defs.ly", "foo = { c4 }\nbar = { e4 }")]);
    let music = toplevel(&doc)[3];
    let names = |items: Vec<(Arc<Document>, ItemId)>| -> Vec<String> {
        items
            .iter()
            .map(|(d, i)| match d.tree().kind(*i) {
                ItemKind::Assignment => d.assignment_name(*i).to_string(),
                kind => kind.name().to_string(),
            })
            .collect()
    };
    assert_eq!(names(doc.iter_toplevel_items(music)), ["b", "Include", "a"]);
    assert_eq!(names(doc.iter_toplevel_items_include(music)), ["b", "bar", "foo", "a"]);

    let Some(defs) = doc.included_document(toplevel(&doc)[1]) else { panic!("defs.ly unresolved") };
    let bar = toplevel(&defs)[1];
    assert_eq!(names(defs.iter_toplevel_items(bar)), ["foo", "a"]);
}

#[test]
fn includes_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("defs.ly"), "theme = { c2 d2 }\n").unwrap();
    let main = dir.path().join("main.ly");
    std::fs::write(&main, "\\include \"defs.ly\"\n{ \\theme e1 }\n").unwrap();

    let doc = load_document(&main, &Options::default()).unwrap();
    assert_eq!(doc.item_length(toplevel(&doc)[1]), Some(f(2, 1)));
    assert!(doc.has_output(ItemId::ROOT));

    let text = std::fs::read_to_string(&main).unwrap();
    let same = build_document_with(&text, Some(&main), &Options::default(), Some(fs_loader()));
    assert_eq!(same.item_length(toplevel(&same)[1]), Some(f(2, 1)));
}

// --- Accessors ----------------------------------------------------------------

#[test]
fn version_numbers() {
    let doc = build_document("\\version \"2.24.1\"");
    let version = find(&doc, ItemKind::Version);
    assert_eq!(doc.version_string(version), "2.24.1");
    assert_eq!(doc.version(version), [2, 24, 1]);
}

#[test]
fn values_of_assignments() {
    let doc = build_document("\\paper { indent = 42 }\n\\header { title = \"Sonata\" }");
    let assignments: Vec<ItemId> = doc
        .tree()
        .descendants(ItemId::ROOT)
        .into_iter()
        .filter(|&i| doc.tree().kind(i) == ItemKind::Assignment)
        .collect();
    let [x, title] = assignments[..] else { panic!("expected two assignments") };
    assert_eq!(doc.assignment_name(x), "indent");
    assert_eq!(doc.assignment_name(title), "title");
    let Some(value) = doc.assignment_value(x) else { panic!("no value") };
    assert_eq!(doc.number_value(value), Some(NumberValue::Int(42)));
    let Some(value) = doc.assignment_value(title) else { panic!("no value") };
    assert_eq!(doc.string_value(value), "Sonata");
}

#[test]
fn scheme_values() {
    let doc = build_document("#(define y 12)\n#'(3 . 4)\n#\"abc\"");
    let [define, pair, string] = toplevel(&doc)[..] else { panic!("expected three Scheme items") };
    assert_eq!(doc.scheme_int(define), Some(12));
    assert_eq!(doc.scheme_fraction(define), Some(f(12, 1)));
    assert_eq!(doc.scheme_pair_ints(pair), Some((3, 4)));
    assert_eq!(doc.scheme_string(string).as_deref(), Some("abc"));
    assert_eq!(doc.scheme_string(define), None);
}

#[test]
fn markup_plaintext() {
    let doc = build_document("\\markup { \\bold Hello \\concat { A B } world }");
    assert_eq!(doc.markup_plaintext(find(&doc, ItemKind::Markup)), "Hello AB world");
    let doc = build_document("\\markup \"quoted text\"");
    assert_eq!(doc.markup_plaintext(find(&doc, ItemKind::Markup)), "quoted text");
}

#[test]
fn markup_user_commands() {
    let doc = build_document("smile = \\markup { x }\n\\markup \\smile");
    let command = find(&doc, ItemKind::MarkupUserCommand);
    let Some((_, value)) = doc.markup_user_command_value(command) else { panic!("unresolved") };
    assert_eq!(doc.tree().kind(value), ItemKind::Markup);

    let doc = build_document(
        "#(define-markup-command (smile layout props) () (interpret-markup layout props \"x\"))\n\\markup \\smile",
    );
    let command = find(&doc, ItemKind::MarkupUserCommand);
    let Some((_, value)) = doc.markup_user_command_value(command) else { panic!("unresolved") };
    assert_eq!(value, toplevel(&doc)[0]);
    assert_eq!(doc.tree().kind(value), ItemKind::Scheme);
}

#[test]
fn time_signature_tempo_and_partial() {
    let doc = build_document("{ \\time 3/4 \\tempo \"Allegro\" 4 = 60-70 \\partial 8 c8 }");
    assert_eq!(doc.time_signature_measure_length(find(&doc, ItemKind::TimeSignature)), Some(f(3, 4)));
    let tempo = find(&doc, ItemKind::Tempo);
    assert_eq!(doc.tempo_fraction(tempo), f(1, 4));
    assert_eq!(doc.tempo_values(tempo), [60, 70]);
    let Some(text) = doc.tempo_text(tempo) else { panic!("no tempo text") };
    assert_eq!(doc.string_value(text), "Allegro");
    assert_eq!(doc.partial_length(find(&doc, ItemKind::Partial)), f(1, 8));
}

#[test]
fn repeat_specifier_and_count() {
    let doc = build_document("{ \\repeat \"unfold\" 2 { c4 } \\repeat percent 0 { d4 } \\repeat tremolo 4 { e16 } }");
    let repeats: Vec<ItemId> =
        doc.tree().descendants(ItemId::ROOT).into_iter().filter(|&i| doc.tree().kind(i) == ItemKind::Repeat).collect();
    let specs: Vec<Option<String>> = repeats.iter().map(|&r| doc.repeat_specifier(r)).collect();
    assert_eq!(specs, [Some("unfold".to_string()), Some("percent".to_string()), Some("tremolo".to_string())]);
    let counts: Vec<i64> = repeats.iter().map(|&r| doc.repeat_count(r)).collect();
    assert_eq!(counts, [2, 1, 4]);
}

#[test]
fn contexts_and_clefs() {
    let doc = build_document("\\new Staff = \"upper\" { \\clef \"treble_8\" c4 \\clef bass d }");
    let staff = find(&doc, ItemKind::Context);
    assert_eq!(doc.context_name(staff), Some("Staff"));
    assert_eq!(doc.context_id(staff).as_deref(), Some("upper"));
    let clefs: Vec<Option<String>> = doc
        .tree()
        .descendants(ItemId::ROOT)
        .into_iter()
        .filter(|&i| doc.tree().kind(i) == ItemKind::Clef)
        .map(|c| doc.clef_specifier(c))
        .collect();
    assert_eq!(clefs, [Some("treble_8".to_string()), Some("bass".to_string())]);
}

#[rstest]
#[case("\\language \"english\"\n{ cs4 }", Some("english"), 0, f(1, 2))]
#[case("\\language \"deutsch\"\n{ b4 }", Some("deutsch"), 6, f(-1, 2))]
#[case("\\include \"italiano.ly\"\n{ sib4 }", Some("italiano"), 6, f(-1, 2))]
#[case("\\language \"klingon\"\n{ es4 }", Some("klingon"), 2, f(-1, 2))]
fn language_switches(
    #[case] text: &str,
    #[case] language: Option<&str>,
    #[case] note: u8,
    #[case] alter: Fraction,
) {
    let doc = build_document(text);
    assert_eq!(doc.language(find(&doc, ItemKind::Language)), language);
    let ItemData::Note { pitch, .. } = &doc.tree().item(find(&doc, ItemKind::Note)).data else {
        panic!("no pitch")
    };
    assert_eq!((pitch.note, pitch.alter), (note, alter));
}

#[test]
fn initial_language_comes_from_options() {
    let options = Options { language: "english".to_string(), ..Options::default() };
    let doc = build_document_with("{ bf4 }", None, &options, None);
    let ItemData::Note { pitch, .. } = &doc.tree().item(find(&doc, ItemKind::Note)).data else {
        panic!("no pitch")
    };
    assert_eq!((pitch.note, pitch.alter), (6, f(-1, 2)));
}

#[rstest]
#[case("{ c4 }", true)]
#[case("\\markup x", true)]
#[case("\\score { { c4 } \\layout { } }", true)]
#[case("\\header { title = \"x\" }", false)]
#[case("\\book { \\header { } }", false)]
#[case("x = { c4 }", false)]
fn output_detection(#[case] text: &str, #[case] expected: bool) {
    assert_eq!(build_document(text).has_output(ItemId::ROOT), expected, "{text}");
}

#[test]
fn node_lookup() {
    let doc = build_document("{ c4 d8 e8 }");
    let list = toplevel(&doc)[0];
    assert_eq!(doc.node(0, Some(0)), ItemId::ROOT);
    assert_eq!(doc.node(0, None), list);
    let d = doc.node(6, None);
    assert_eq!(doc.tree().kind(d), ItemKind::WrittenDuration);
    let d = doc.node(5, None);
    assert_eq!(doc.item_text(d), "d");
    assert_eq!(doc.tree().parent(d), Some(list));
}
