//! Runtime orchestration for the symptom-sprint game session.
//!
//! This crate wires together the round provider abstraction, the retry
//! policy, persistent storage, and the session worker into a cohesive
//! runtime API. Consumers embed [`Runtime`] to run a session, subscribe to
//! events, and issue commands through [`SessionHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`providers`] and [`store`] provide adapters for content and persistence
//! - [`workers`] keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod profile;
pub mod providers;
pub mod retry;
pub mod runtime;
pub mod store;

mod workers;

pub use api::{
    ProviderError, Result, RoundProvider, RoundRequest, RuntimeError, SessionHandle,
};
pub use events::{Event, EventBus, Topic};
pub use profile::PlayerProfile;
pub use providers::DeckRoundProvider;
pub use retry::RetryPolicy;
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use store::{FileStore, InMemoryStore, KeyValueStore, StoreError};
