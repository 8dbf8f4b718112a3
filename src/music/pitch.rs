//! Pitch names in the languages LilyPond knows.

use super::Fraction;

/// A pitch as written: note step, alteration and octave marks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pitch {
    /// Step from 0 (c) to 6 (b).
    pub note: u8,
    /// In whole tones: a sharp is `1/2`, a flat `-1/2`.
    pub alter: Fraction,
    /// `'` counts up, `,` counts down; `c` is octave 0.
    pub octave: i32,
    /// `""`, `"!"` or `"?"`.
    pub accidental: String,
    pub octave_check: Option<i32>,
}

impl Pitch {
    pub fn new(note: u8, alter: Fraction) -> Self {
        Pitch { note, alter, octave: 0, accidental: String::new(), octave_check: None }
    }
}

struct Language {
    names: [&'static str; 7],
    /// Accidentals from double flat to double sharp in quarter-tone steps;
    /// empty where the language has no name.
    accidentals: [&'static str; 9],
    /// `(spelled, written)` pairs: a written prefix stands for a regular
    /// spelling.
    replacements: &'static [(&'static str, &'static str)],
}

const DUTCH_ACCIDENTALS: [&str; 9] = ["eses", "eseh", "es", "eh", "", "ih", "is", "isih", "isis"];
const SOLFEGE: [&str; 7] = ["do", "re", "mi", "fa", "sol", "la", "si"];

const NEDERLANDS: Language = Language {
    names: ["c", "d", "e", "f", "g", "a", "b"],
    accidentals: DUTCH_ACCIDENTALS,
    replacements: &[("ees", "es"), ("aes", "as")],
};

const ENGLISH: Language = Language {
    names: ["c", "d", "e", "f", "g", "a", "b"],
    accidentals: ["ff", "tqf", "f", "qf", "", "qs", "s", "tqs", "ss"],
    replacements: &[],
};

const DEUTSCH: Language = Language {
    names: ["c", "d", "e", "f", "g", "a", "h"],
    accidentals: DUTCH_ACCIDENTALS,
    replacements: &[("ases", "asas"), ("ees", "es"), ("aes", "as"), ("heses", "heses"), ("hes", "b")],
};

const SVENSKA: Language = Language {
    names: ["c", "d", "e", "f", "g", "a", "h"],
    accidentals: ["essess", "", "ess", "", "", "", "iss", "", "ississ"],
    replacements: &[("ees", "es"), ("aes", "as"), ("hessess", "hessess"), ("hess", "b")],
};

const ITALIANO: Language = Language {
    names: SOLFEGE,
    accidentals: ["bb", "bsb", "b", "sb", "", "sd", "d", "dsd", "dd"],
    replacements: &[],
};

const ESPANOL: Language =
    Language { names: SOLFEGE, accidentals: ["bb", "", "b", "", "", "", "s", "", "ss"], replacements: &[] };

const PORTUGUES: Language = Language {
    names: SOLFEGE,
    accidentals: ["bb", "btqt", "b", "bqt", "", "sqt", "s", "stqt", "ss"],
    replacements: &[],
};

const VLAAMS: Language =
    Language { names: SOLFEGE, accidentals: ["bb", "", "b", "", "", "", "k", "", "kk"], replacements: &[] };

/// Names accepted by `\language`.
pub const LANGUAGES: &[&str] = &[
    "nederlands",
    "english",
    "deutsch",
    "norsk",
    "suomi",
    "svenska",
    "italiano",
    "catalan",
    "espanol",
    "portugues",
    "vlaams",
];

fn language(name: &str) -> Option<&'static Language> {
    Some(match name {
        "nederlands" => &NEDERLANDS,
        "english" => &ENGLISH,
        "deutsch" | "norsk" | "suomi" => &DEUTSCH,
        "svenska" => &SVENSKA,
        "italiano" | "catalan" => &ITALIANO,
        "espanol" => &ESPANOL,
        "portugues" => &PORTUGUES,
        "vlaams" => &VLAAMS,
        _ => return None,
    })
}

pub fn is_language(name: &str) -> bool {
    language(name).is_some()
}

/// Reads a note name in `lang`, returning step and alteration.
///
/// Long English names (`cflat`, `csharp`) are accepted as well.
pub fn read_pitch_name(lang: &str, text: &str) -> Option<(u8, Fraction)> {
    let lang = language(lang)?;
    let mut text = text.to_string();
    for (spelled, written) in lang.replacements {
        if let Some(rest) = text.strip_prefix(written) {
            text = format!("{spelled}{rest}");
        }
    }
    lang.split(&text).or_else(|| lang.split(&text.replace("flat", "f").replace("sharp", "s")))
}

impl Language {
    fn split(&self, text: &str) -> Option<(u8, Fraction)> {
        self.names.iter().enumerate().find_map(|(note, name)| {
            let acc = text.strip_prefix(name)?;
            if acc.is_empty() {
                return Some((note as u8, Fraction::from_integer(0)));
            }
            let index = self.accidentals.iter().position(|a| !a.is_empty() && *a == acc)?;
            Some((note as u8, Fraction::new(index as i64 - 4, 4)))
        })
    }
}

/// `'''` is 3, `,,` is -2.
pub fn octave_to_num(marks: &str) -> i32 {
    marks.chars().map(|c| match c {
        '\'' => 1,
        ',' => -1,
        _ => 0,
    }).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn f(n: i64, d: i64) -> Fraction {
        Fraction::new(n, d)
    }

    #[rstest]
    #[case("nederlands", "c", 0, f(0, 1))]
    #[case("nederlands", "cis", 0, f(1, 2))]
    #[case("nederlands", "es", 2, f(-1, 2))]
    #[case("nederlands", "as", 5, f(-1, 2))]
    #[case("nederlands", "beses", 6, f(-1, 1))]
    #[case("nederlands", "fisih", 3, f(3, 4))]
    #[case("english", "bf", 6, f(-1, 2))]
    #[case("english", "cflat", 0, f(-1, 2))]
    #[case("english", "fsharp", 3, f(1, 2))]
    #[case("deutsch", "h", 6, f(0, 1))]
    #[case("deutsch", "b", 6, f(-1, 2))]
    #[case("norsk", "b", 6, f(-1, 2))]
    #[case("svenska", "hess", 6, f(-1, 2))]
    #[case("italiano", "sol", 4, f(0, 1))]
    #[case("italiano", "sib", 6, f(-1, 2))]
    #[case("catalan", "fad", 3, f(1, 2))]
    #[case("espanol", "res", 1, f(1, 2))]
    #[case("vlaams", "dok", 0, f(1, 2))]
    #[case("portugues", "mibqt", 2, f(-1, 4))]
    fn pitch_names(#[case] lang: &str, #[case] text: &str, #[case] note: u8, #[case] alter: Fraction) {
        assert_eq!(read_pitch_name(lang, text), Some((note, alter)), "{lang} {text}");
    }

    #[test]
    fn unknown_names_and_languages() {
        assert_eq!(read_pitch_name("nederlands", "x"), None);
        assert_eq!(read_pitch_name("espanol", "reqs"), None);
        assert_eq!(read_pitch_name("klingon", "c"), None);
        assert!(is_language("suomi"));
        assert!(LANGUAGES.iter().all(|l| is_language(l)));
    }

    #[test]
    fn octaves() {
        assert_eq!(octave_to_num("'''"), 3);
        assert_eq!(octave_to_num(",,"), -2);
        assert_eq!(octave_to_num(""), 0);
    }
}
