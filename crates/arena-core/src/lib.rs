pub mod backoff;
pub mod cancellation;
pub mod event_sink;
pub mod fingerprint;

pub use cancellation::CancellationToken;
pub use event_sink::{EventSink, NullEventSink};
