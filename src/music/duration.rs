//! Written durations and exact musical time.
//!
//! ```text
//!   "4."      base 1/4   scaling 3/2      length 3/8
//!   "\breve"  base 2     scaling 1        length 2
//!   "8*2/3"   base 1/8   scaling 2/3      length 1/12
//! ```

use num_rational::Rational64;
use num_traits::{CheckedMul, CheckedSub};

/// Exact rational musical time.
pub type Fraction = Rational64;

/// A written duration: the undotted `base` and everything that scales it
/// (dots and `*n/m`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Duration {
    pub base: Fraction,
    pub scaling: Fraction,
}

impl Duration {
    /// The duration carried by items that have no written or implied one.
    pub const ZERO: Duration = Duration { base: Fraction::new_raw(0, 1), scaling: Fraction::new_raw(1, 1) };

    /// A quarter note, the duration in effect before anything is written.
    pub const QUARTER: Duration = Duration { base: Fraction::new_raw(1, 4), scaling: Fraction::new_raw(1, 1) };

    pub fn new(base: Fraction, scaling: Fraction) -> Self {
        Duration { base, scaling }
    }

    /// `base * scaling`. Durations read from text always have a
    /// representable length; see [`Duration::checked_length`] for others.
    pub fn length(self) -> Fraction {
        self.base * self.scaling
    }

    /// `base * scaling`, or `None` when it does not fit an `i64` fraction.
    pub fn checked_length(self) -> Option<Fraction> {
        self.base.checked_mul(&self.scaling)
    }

    /// Builds a duration from its token texts: one length, any number of
    /// dots and any number of scalings. Returns `None` without a length or
    /// when the length does not fit an `i64` fraction.
    pub fn from_parts<'a>(parts: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let mut base = None;
        let mut dots = 0u32;
        let mut scaling = Fraction::from_integer(1);
        for part in parts {
            let part = part.trim();
            if part == "." {
                dots += 1;
            } else if let Some(factor) = part.strip_prefix('*') {
                scaling = scaling.checked_mul(&parse_fraction(factor.trim())?)?;
            } else if base.is_none() {
                base = Some(base_value(part)?);
            }
        }
        let base = base?;
        if dots > 0 {
            // 2 - 1/2^dots
            let shift = dots.min(62);
            let dotted = Fraction::from_integer(2).checked_sub(&Fraction::new(1, 1i64 << shift))?;
            scaling = scaling.checked_mul(&dotted)?;
        }
        let duration = Duration { base, scaling };
        duration.checked_length()?;
        Some(duration)
    }

    /// Parses a compact duration string such as `"4."`, `"\breve"` or
    /// `"8*2/3"`; also used for tremolo durations.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (written, factors) = match text.find('*') {
            Some(i) => (&text[..i], &text[i..]),
            None => (text, ""),
        };
        let length = written.trim_end_matches('.');
        let dots = written.len() - length.len();
        let mut parts = vec![length];
        parts.extend(std::iter::repeat_n(".", dots));
        let factors: Vec<String> = factors.split('*').filter(|f| !f.trim().is_empty()).map(|f| format!("*{f}")).collect();
        parts.extend(factors.iter().map(String::as_str));
        Duration::from_parts(parts)
    }
}

impl Default for Duration {
    fn default() -> Self {
        Duration::ZERO
    }
}

/// Value of an undotted written length.
pub fn base_value(length: &str) -> Option<Fraction> {
    match length {
        "\\breve" => Some(Fraction::from_integer(2)),
        "\\longa" => Some(Fraction::from_integer(4)),
        "\\maxima" => Some(Fraction::from_integer(8)),
        _ => {
            let n: i64 = length.parse().ok()?;
            (n > 0).then(|| Fraction::new(1, n))
        }
    }
}

/// Parses `n` or `n/m`. A zero denominator gives `None`.
pub fn parse_fraction(text: &str) -> Option<Fraction> {
    let (num, den) = match text.split_once('/') {
        Some((num, den)) => (num.trim().parse().ok()?, den.trim().parse().ok()?),
        None => (text.trim().parse().ok()?, 1i64),
    };
    (den != 0).then(|| Fraction::new(num, den))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn f(n: i64, d: i64) -> Fraction {
        Fraction::new(n, d)
    }

    #[rstest]
    #[case("4", f(1, 4))]
    #[case("4.", f(3, 8))]
    #[case("4..", f(7, 16))]
    #[case("1", f(1, 1))]
    #[case("\\breve", f(2, 1))]
    #[case("\\longa.", f(6, 1))]
    #[case("\\maxima", f(8, 1))]
    #[case("8*2/3", f(1, 12))]
    #[case("2*3", f(3, 2))]
    #[case("16", f(1, 16))]
    fn written_lengths(#[case] text: &str, #[case] length: Fraction) {
        let Some(duration) = Duration::parse(text) else { panic!("no duration in {text:?}") };
        assert_eq!(duration.length(), length);
    }

    #[test]
    fn dots_scale_and_base_stays_written() {
        let Some(d) = Duration::from_parts(["4", ".", ".", "*2/3"]) else { panic!() };
        assert_eq!(d.base, f(1, 4));
        assert_eq!(d.scaling, f(7, 4) * f(2, 3));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(Duration::parse("x"), None);
        assert_eq!(Duration::parse("0"), None);
        assert_eq!(Duration::from_parts([".", "*2"]), None);
        assert_eq!(parse_fraction("3/0"), None);
    }

    #[test]
    fn lengths_that_overflow_are_rejected() {
        let many_dots = format!("4{}", ".".repeat(62));
        assert_eq!(Duration::parse(&many_dots), None);
        assert_eq!(Duration::parse("1*4611686018427387904*4"), None);
        let Some(d) = Duration::parse("1*4611686018427387904") else { panic!() };
        assert_eq!(d.checked_length(), Some(Fraction::from_integer(4611686018427387904)));
        let huge = Duration::new(Fraction::from_integer(i64::MAX), Fraction::from_integer(2));
        assert_eq!(huge.checked_length(), None);
    }

    #[test]
    fn constants() {
        assert_eq!(Duration::ZERO.length(), Fraction::from_integer(0));
        assert_eq!(Duration::QUARTER.length(), f(1, 4));
    }
}
