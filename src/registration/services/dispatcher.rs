//! Fan-out of lifecycle events to application listeners.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, RwLock};

use crate::registration::{
    domain::PushEvent,
    ports::{EventListener, listener::deliver},
};

/// Ordered set of listeners receiving [`PushEvent`]s.
///
/// Listeners are invoked synchronously in registration order. A listener
/// that panics is logged and skipped; later listeners still receive the
/// event. Clones share the same listener set.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    listeners: Arc<RwLock<Vec<Arc<dyn EventListener>>>>,
}

impl EventDispatcher {
    /// Creates a dispatcher with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a listener.
    pub fn add_listener(&self, listener: Arc<dyn EventListener>) {
        match self.listeners.write() {
            Ok(mut listeners) => listeners.push(listener),
            Err(err) => tracing::error!(error = %err, "listener registry lock poisoned"),
        }
    }

    /// Removes a listener previously added with [`Self::add_listener`].
    ///
    /// Returns `true` when the listener was registered.
    pub fn remove_listener(&self, listener: &Arc<dyn EventListener>) -> bool {
        let Ok(mut listeners) = self.listeners.write() else {
            tracing::error!("listener registry lock poisoned");
            return false;
        };
        let before = listeners.len();
        listeners.retain(|existing| !Arc::ptr_eq(existing, listener));
        listeners.len() != before
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.read().map(|listeners| listeners.len()).unwrap_or(0)
    }

    /// Delivers `event` to every listener in registration order.
    pub fn dispatch(&self, event: &PushEvent) {
        let snapshot = match self.listeners.read() {
            Ok(listeners) => listeners.clone(),
            Err(err) => {
                tracing::error!(
                    error = %err,
                    event = event.kind(),
                    "listener registry lock poisoned"
                );
                return;
            }
        };
        tracing::debug!(event = event.kind(), listeners = snapshot.len(), "dispatching event");
        for (position, listener) in snapshot.iter().enumerate() {
            let outcome = catch_unwind(AssertUnwindSafe(|| deliver(event, listener.as_ref())));
            if let Err(payload) = outcome {
                tracing::error!(
                    event = event.kind(),
                    listener = position,
                    panic = panic_message(payload.as_ref()),
                    "listener panicked; continuing with remaining listeners"
                );
            }
        }
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
