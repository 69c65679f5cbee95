use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors raised before or during run execution. `PlanError` and
/// `ConfigError` stop the whole process before scheduling; the rest
/// terminate a single run (spec §7).
#[derive(Debug)]
pub enum Error {
    /// Filtering left no (scenario, provider, region) triples to run.
    NoRuns,
    /// A scenario references a self-play role with no bound provider and
    /// no fallback authorised (spec §9 Open Question 3).
    UnboundSelfPlayRole { scenario: String, role: String },
    /// A run references a provider ID absent from the registry.
    UnknownProvider(String),
    Provider(arena_providers::Error),
    Internal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NoRuns => write!(f, "plan is empty after filtering: no scenario/provider/region combination matched"),
            Error::UnboundSelfPlayRole { scenario, role } => {
                write!(f, "scenario '{scenario}' references self-play role '{role}' with no bound provider")
            }
            Error::UnknownProvider(id) => write!(f, "unknown provider '{id}'"),
            Error::Provider(err) => write!(f, "{err}"),
            Error::Internal(msg) => write!(f, "internal invariant violated: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<arena_providers::Error> for Error {
    fn from(err: arena_providers::Error) -> Self {
        Error::Provider(err)
    }
}
