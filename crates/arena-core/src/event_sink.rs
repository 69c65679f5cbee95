use arena_types::Event;

/// Narrow publish interface the Conversation Runner depends on so it stays
/// decoupled from the Event Bus's transport (spec §9: "one publish channel
/// per subscriber; scheduler publishes by owner move"). `publish` itself is
/// synchronous — fan-out to subscriber queues happens inside the
/// implementation, never on the runner's call stack.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: Event);
}

/// Discards every event. Used by tests and standalone `arena-sdk` callers
/// that don't need observability.
#[derive(Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn publish(&self, _event: Event) {}
}
