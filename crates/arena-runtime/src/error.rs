use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the State Store and Scheduler. `Internal` maps to the
/// spec's `InternalInvariantError`: these indicate a bug, not a user error,
/// and callers are expected to treat them as fatal (spec §7).
#[derive(Debug)]
pub enum Error {
    /// `Create` called with a `RunID` already present in the store.
    DuplicateRun(String),
    /// A mutation was attempted against a run that already finalised.
    RunAlreadyTerminal(String),
    /// `Load`/`LoadMany` referenced a `RunID` the store has never seen.
    UnknownRun(String),
    Engine(arena_engine::Error),
    Internal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DuplicateRun(id) => write!(f, "run '{id}' already exists in the state store"),
            Error::RunAlreadyTerminal(id) => write!(f, "run '{id}' is already finalised"),
            Error::UnknownRun(id) => write!(f, "no such run '{id}' in the state store"),
            Error::Engine(err) => write!(f, "{err}"),
            Error::Internal(msg) => write!(f, "internal invariant violated: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Engine(err) => Some(err),
            _ => None,
        }
    }
}

impl From<arena_engine::Error> for Error {
    fn from(err: arena_engine::Error) -> Self {
        Error::Engine(err)
    }
}
