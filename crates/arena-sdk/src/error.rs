use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Top-level facade errors. `Config` maps to the spec's `ConfigError`:
/// fatal, no runs executed (spec §7).
#[derive(Debug)]
pub enum Error {
    Config(String),
    Io(std::io::Error),
    Plan(arena_engine::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "configuration error: {msg}"),
            Error::Io(err) => write!(f, "I/O error: {err}"),
            Error::Plan(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Plan(err) => Some(err),
            Error::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<arena_engine::Error> for Error {
    fn from(err: arena_engine::Error) -> Self {
        Error::Plan(err)
    }
}
