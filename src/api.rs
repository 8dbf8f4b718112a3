use crate::error::{Error, Result};
use crate::lex::{FrozenState, Mode, State, Tokens};
use crate::music::Document;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Reads the text of an included file; `None` when it does not exist or
/// cannot be read.
pub type FileLoader = Arc<dyn Fn(&Path) -> Option<String> + Send + Sync>;

/// Options that affect tree building and time computation.
///
/// Stored on the [`Document`] and inherited by every included document.
#[derive(Debug, Clone)]
pub struct Options {
    /// Pitch name language in effect before any `\language`.
    pub language: String,
    /// Directories searched for relative includes, after the including
    /// document's own directory.
    pub include_path: Vec<PathBuf>,
    /// Count every repeat `count` times, volta repeats included.
    pub unfold_repeats: bool,
    /// How deep variable references may nest before they count as
    /// unresolved.
    pub max_reference_depth: usize,
    /// How deep items may nest. Deeper input is skipped by the reader and
    /// deeper music counts as empty in time computations.
    pub max_nesting_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            language: "nederlands".to_string(),
            include_path: Vec::new(),
            unfold_repeats: false,
            max_reference_depth: 256,
            max_nesting_depth: 256,
        }
    }
}

/// A fresh state for the mode called `name` (`"lilypond"`, `"scheme"`,
/// `"html"`, `"latex"`, `"texinfo"` or `"docbook"`).
///
/// # Example
/// ```
/// let state = lilyparse::state_for("scheme").unwrap();
/// assert_eq!(state.mode(), Some(lilyparse::Mode::Scheme));
/// assert!(lilyparse::state_for("cobol").is_err());
/// ```
pub fn state_for(name: &str) -> Result<State> {
    let mode: Mode = name.parse()?;
    Ok(State::for_mode(mode))
}

/// A fresh state for the mode `text` most likely is in.
pub fn guess_state(text: &str) -> State {
    State::for_mode(Mode::guess(text))
}

/// Tokenizes `text` from byte offset `start`, carrying `state` along.
/// An offset inside a multi-byte character starts at the next character.
///
/// Feed the same state line after line to tokenize a document
/// incrementally; [`freeze`] it at line ends to resume later.
pub fn scan<'s, 't>(text: &'t str, start: usize, state: &'s mut State) -> Tokens<'s, 't> {
    state.tokens(text, start)
}

pub fn freeze(state: &State) -> FrozenState {
    state.freeze()
}

pub fn thaw(frozen: &FrozenState) -> State {
    State::thaw(frozen)
}

/// Builds the tree of a LilyPond text with default options and no file
/// access.
///
/// # Example
/// ```
/// use lilyparse::{Fraction, build_document};
///
/// let doc = build_document(r"{ \tuplet 3/2 { c4 d e } f }");
/// assert_eq!(doc.time_position(doc.text().len()), Some(Fraction::new(3, 4)));
/// ```
pub fn build_document(text: &str) -> Arc<Document> {
    Document::new(text.to_string(), None, Options::default(), None)
}

/// Builds the tree of a LilyPond text.
///
/// `filename` is where relative includes are first looked for; `loader`
/// reads included files. Without a loader includes stay unresolved.
pub fn build_document_with(
    text: &str,
    filename: Option<&Path>,
    options: &Options,
    loader: Option<FileLoader>,
) -> Arc<Document> {
    Document::new(text.to_string(), filename.map(Path::to_path_buf), options.clone(), loader)
}

/// Reads and builds a file from disk; its includes are read from disk too.
pub fn load_document(path: &Path, options: &Options) -> Result<Arc<Document>> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
    debug!(target: "lilyparse::music", path = %path.display(), bytes = text.len(), "loaded document");
    Ok(Document::new(text, Some(path.to_path_buf()), options.clone(), Some(fs_loader())))
}

/// A [`FileLoader`] that reads UTF-8 files from disk.
pub fn fs_loader() -> FileLoader {
    Arc::new(|path: &Path| match std::fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => {
            warn!(target: "lilyparse::music", path = %path.display(), error = %err, "cannot read include");
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::TokenKind;
    use crate::lex::scheme::SchemeKind;
    use std::io::Write;

    #[test]
    fn state_for_known_and_unknown_modes() {
        for mode in Mode::ALL {
            let state = state_for(mode.name()).unwrap();
            assert_eq!(state.mode(), Some(mode));
            assert_eq!(state.depth(), 1);
        }
        match state_for("markdown") {
            Err(Error::UnknownMode(name)) => assert_eq!(name, "markdown"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn guess_state_picks_the_mode() {
        assert_eq!(guess_state("  (define x 1)").mode(), Some(Mode::Scheme));
        assert_eq!(guess_state("@node Top").mode(), Some(Mode::Texinfo));
        assert_eq!(guess_state("{ c d e }").mode(), Some(Mode::LilyPond));
    }

    #[test]
    fn scan_resumes_from_a_frozen_state() {
        let mut state = state_for("scheme").unwrap();
        let first: Vec<TokenKind> = scan("(define (f x)", 0, &mut state).map(|t| t.kind).collect();
        assert!(first.contains(&TokenKind::Scheme(SchemeKind::OpenParen)));
        let frozen = freeze(&state);
        assert!(state.depth() > 1);

        let mut resumed = thaw(&frozen);
        let mut direct = state.clone();
        let a: Vec<_> = scan("  x))", 0, &mut resumed).map(|t| (t.start, t.kind)).collect();
        let b: Vec<_> = scan("  x))", 0, &mut direct).map(|t| (t.start, t.kind)).collect();
        assert_eq!(a, b);
        assert_eq!(resumed, direct);
        assert_eq!(resumed.depth(), 1);
    }

    #[test]
    fn scan_starts_at_an_offset() {
        let mut state = state_for("lilypond").unwrap();
        let tokens: Vec<_> = scan("xx c4", 3, &mut state).collect();
        assert_eq!(tokens.first().map(|t| (t.start, t.text)), Some((3, "c")));
    }

    #[test]
    fn scan_snaps_to_a_character_boundary() {
        let mut state = state_for("lilypond").unwrap();
        let tokens: Vec<_> = scan("é c4", 1, &mut state).collect();
        assert_eq!(tokens.first().map(|t| t.start), Some(2));
        assert_eq!(tokens.iter().map(|t| t.text).collect::<String>(), " c4");
    }

    #[test]
    fn default_options() {
        let options = Options::default();
        assert_eq!(options.language, "nederlands");
        assert!(options.include_path.is_empty());
        assert!(!options.unfold_repeats);
        assert_eq!(options.max_reference_depth, 256);
        assert_eq!(options.max_nesting_depth, 256);
    }

    #[test]
    fn load_document_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.ly");
        match load_document(&path, &Options::default()) {
            Err(Error::Io { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn load_document_reads_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".ly").tempfile().unwrap();
        write!(file, "{{ c4 d e f }}").unwrap();
        let doc = load_document(file.path(), &Options::default()).unwrap();
        assert_eq!(doc.filename(), Some(file.path()));
        assert_eq!(doc.text(), "{ c4 d e f }");
        assert_eq!(doc.time_position(doc.text().len()), Some(crate::Fraction::from_integer(1)));
    }

    #[test]
    fn fs_loader_returns_none_for_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let load = fs_loader();
        assert_eq!(load(&dir.path().join("nope.ly")), None);
        std::fs::write(dir.path().join("yes.ly"), "c4").unwrap();
        assert_eq!(load(&dir.path().join("yes.ly")).as_deref(), Some("c4"));
    }
}
