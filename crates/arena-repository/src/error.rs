use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// A single sink's failure. The composite repository isolates these per
/// child: one sink's `Io` error never prevents another from committing
/// (spec §4.7, §8 scenario 6).
#[derive(Debug)]
pub enum Error {
    Io { sink: String, source: std::io::Error },
    Encode { sink: String, message: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io { sink, source } => write!(f, "{sink} sink: I/O error: {source}"),
            Error::Encode { sink, message } => write!(f, "{sink} sink: encode error: {message}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            Error::Encode { .. } => None,
        }
    }
}
