//! Provider Abstraction (spec C1): a uniform capability to generate an
//! assistant message from a message history, plus a deterministic
//! `MockProvider` for reproducible test runs.

pub mod error;
pub mod mock;
pub mod registry;
pub mod traits;

pub use error::{Error, Result};
pub use mock::{MockProvider, ScriptedReply, SCENARIO_HINT_KEY};
pub use registry::ProviderRegistry;
pub use traits::Provider;
