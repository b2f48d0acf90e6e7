//! Topic-based event bus for runtime events.
//!
//! Presentation layers subscribe to the topics they render: full session
//! snapshots on [`Topic::Session`], floating score and health feedback on
//! [`Topic::Feedback`].

mod bus;

pub use bus::{Event, EventBus, Topic};
