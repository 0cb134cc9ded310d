//! Eventos de build y trait EventStore.

mod store;
mod types;

pub use store::{EventStore, InMemoryEventStore};
pub use types::{BuildEvent, BuildEventKind};
