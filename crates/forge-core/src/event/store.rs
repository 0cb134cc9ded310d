use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use super::{BuildEvent, BuildEventKind};

/// Almacenamiento de eventos append-only.
pub trait EventStore: Send {
    /// Agrega un evento a partir de su kind y devuelve el evento completo (con seq y ts).
    fn append_kind(&mut self, session_id: Uuid, kind: BuildEventKind) -> BuildEvent;
    /// Lista eventos de una sesión (orden ascendente por seq).
    fn list(&self, session_id: Uuid) -> Vec<BuildEvent>;
}

#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    inner: HashMap<Uuid, Vec<BuildEvent>>,
}

impl EventStore for InMemoryEventStore {
    fn append_kind(&mut self, session_id: Uuid, kind: BuildEventKind) -> BuildEvent {
        let events = self.inner.entry(session_id).or_default();
        let ev = BuildEvent { seq: events.len() as u64,
                              session_id,
                              kind,
                              ts: Utc::now() };
        events.push(ev.clone());
        ev
    }

    fn list(&self, session_id: Uuid) -> Vec<BuildEvent> {
        self.inner.get(&session_id).cloned().unwrap_or_default()
    }
}
