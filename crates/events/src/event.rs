use chrono::{DateTime, Utc};

/// A typed domain event.
///
/// Events are:
/// - **immutable** (treat them as facts)
/// - **categorized** by a coarse `event_type` (e.g. "coffee")
/// - **named** by a specific `name` (e.g. "recommend_coffee")
/// - designed to be **append-only**
///
/// The serialized form of the implementor becomes the stored payload.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Coarse category of the event (the `type` column).
    fn event_type(&self) -> &'static str;

    /// Specific event name, the primary lookup field.
    fn name(&self) -> &'static str;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}
