use std::path::PathBuf;

/// Errors surfaced at the API boundary.
///
/// Tokenizing and tree building never fail; only inputs the caller names
/// explicitly (a mode name, a root file) can be rejected.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown mode `{0}`")]
    UnknownMode(String),

    #[error("cannot read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
