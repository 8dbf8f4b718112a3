/// Lazily compiled static `Regex` for a literal pattern.
#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Lazily built static word set, used for the two-phase word-table matches.
#[macro_export]
macro_rules! words {
    ($list:expr) => {{
        static SET: once_cell::sync::Lazy<std::collections::HashSet<&'static str>> =
            once_cell::sync::Lazy::new(|| $list.iter().copied().collect());
        &*SET
    }};
}

/// Declares a fieldless enum of token kinds or contexts together with its
/// variant table and stable names.
#[macro_export]
macro_rules! kind_enum {
    ($(#[$meta:meta])* $vis:vis enum $name:ident { $($variant:ident),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $($variant),*
        }

        impl $name {
            #[allow(dead_code)]
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),*
                }
            }
        }
    };
}
