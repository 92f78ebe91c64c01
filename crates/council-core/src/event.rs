//! Domain event abstractions.

/// Trait that all domain events implement.
///
/// Events carry no explicit sequence number: an event's position in its
/// stream is its identity, and the 1-indexed ordinal is computed at read
/// time.
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    /// Returns the event type name (the on-disk discriminant).
    fn event_type(&self) -> &'static str;

    /// Milliseconds since the Unix epoch at which the event was recorded.
    fn timestamp_millis(&self) -> i64;
}
