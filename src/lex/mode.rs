use super::docbook::DocBookContext;
use super::html::HtmlContext;
use super::latex::LatexContext;
use super::lilypond::LyContext;
use super::scheme::SchemeContext;
use super::texinfo::TexinfoContext;
use super::ContextId;
use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// One of the supported input dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mode {
    LilyPond,
    Scheme,
    Html,
    Latex,
    Texinfo,
    DocBook,
}

impl Mode {
    pub const ALL: [Mode; 6] = [Mode::LilyPond, Mode::Scheme, Mode::Html, Mode::Latex, Mode::Texinfo, Mode::DocBook];

    pub fn name(self) -> &'static str {
        match self {
            Mode::LilyPond => "lilypond",
            Mode::Scheme => "scheme",
            Mode::Html => "html",
            Mode::Latex => "latex",
            Mode::Texinfo => "texinfo",
            Mode::DocBook => "docbook",
        }
    }

    /// Default file extension, with the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Mode::LilyPond => ".ly",
            Mode::Scheme => ".scm",
            Mode::Html => ".html",
            Mode::Latex => ".lytex",
            Mode::Texinfo => ".texi",
            Mode::DocBook => ".docbook",
        }
    }

    /// Mode for a file extension (with or without the dot).
    pub fn from_extension(ext: &str) -> Option<Mode> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "ly" | "ily" | "lyi" => Some(Mode::LilyPond),
            "scm" => Some(Mode::Scheme),
            "html" | "htm" => Some(Mode::Html),
            "lytex" | "tex" | "latex" => Some(Mode::Latex),
            "texi" | "texinfo" | "itexi" | "tely" => Some(Mode::Texinfo),
            "docbook" | "lyxml" => Some(Mode::DocBook),
            _ => None,
        }
    }

    pub fn root_context(self) -> ContextId {
        match self {
            Mode::LilyPond => ContextId::LilyPond(LyContext::Global),
            Mode::Scheme => ContextId::Scheme(SchemeContext::ParseScheme),
            Mode::Html => ContextId::Html(HtmlContext::ParseHtml),
            Mode::Latex => ContextId::Latex(LatexContext::ParseLatex),
            Mode::Texinfo => ContextId::Texinfo(TexinfoContext::ParseTexinfo),
            Mode::DocBook => ContextId::DocBook(DocBookContext::ParseDocBook),
        }
    }

    /// Guesses the dialect of untyped text. Tests run in a fixed order and
    /// the first one that applies wins.
    pub fn guess(text: &str) -> Mode {
        let text = text.trim_start();
        if text.starts_with('%') || text.starts_with('\\') {
            if text.contains("\\version") || text.contains("\\relative") || text.contains("\\score") {
                return Mode::LilyPond;
            }
            if text.contains("\\documentclass") || text.contains("\\begin{document}") {
                return Mode::Latex;
            }
            return Mode::LilyPond;
        }
        if text.starts_with("<<") {
            return Mode::LilyPond;
        }
        if text.starts_with('<') {
            if text.contains("DOCTYPE book") || text.contains("<programlisting") {
                return Mode::DocBook;
            }
            return Mode::Html;
        }
        if text.starts_with("#!") || text.starts_with(';') || text.starts_with('(') {
            return Mode::Scheme;
        }
        if text.starts_with('@') {
            return Mode::Texinfo;
        }
        Mode::LilyPond
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Mode::ALL.into_iter().find(|m| m.name() == name).ok_or_else(|| Error::UnknownMode(name.to_string()))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
