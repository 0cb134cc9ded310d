//! Registro con reproducción para suscriptores tardíos.
//!
//! Un suscriptor nuevo recibe de inmediato todos los elementos ya vistos y
//! luego cada elemento posterior, exactamente una vez cada uno.

use std::fmt;
use std::sync::{Arc, Mutex};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct State<T> {
    items: Vec<T>,
    subscribers: Vec<Callback<T>>,
}

pub struct ReplayRegistry<T> {
    state: Mutex<State<T>>,
}

impl<T: Clone> ReplayRegistry<T> {
    pub fn new() -> Self {
        Self { state: Mutex::new(State { items: Vec::new(),
                                         subscribers: Vec::new() }) }
    }

    /// Publica `item` y notifica a los suscriptores actuales. Las
    /// notificaciones se hacen fuera del lock, así que un callback puede
    /// publicar o suscribirse a su vez.
    pub fn add(&self, item: T) {
        let subscribers = {
            let mut state = self.lock();
            state.items.push(item.clone());
            state.subscribers.clone()
        };
        for callback in subscribers {
            callback(&item);
        }
    }

    /// Suscribe `callback`, reproduciendo primero los elementos ya vistos.
    pub fn subscribe<F>(&self, callback: F)
        where F: Fn(&T) + Send + Sync + 'static
    {
        let callback: Callback<T> = Arc::new(callback);
        let seen = {
            let mut state = self.lock();
            state.subscribers.push(Arc::clone(&callback));
            state.items.clone()
        };
        for item in &seen {
            callback(item);
        }
    }

    pub fn items(&self) -> Vec<T> {
        self.lock().items.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State<T>> {
        // Un callback que hace panic no corre bajo el lock; el estado
        // sigue siendo consistente aunque el mutex quede envenenado.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T: Clone> Default for ReplayRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for ReplayRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplayRegistry").field("items", &self.items()).finish()
    }
}
