use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type Listener = Rc<RefCell<dyn FnMut()>>;

#[derive(Default)]
struct Registry {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(u64, Listener)>>,
}

/// After-draw listener registry a host surface can embed to implement
/// [`HostSurface::on_after_draw`](crate::HostSurface::on_after_draw).
///
/// The host calls [`DrawNotifier::notify`] once it has finished a redraw. Listeners run
/// synchronously, in subscription order, on the calling thread.
#[derive(Default)]
pub struct DrawNotifier {
    registry: Rc<Registry>,
}

impl DrawNotifier {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`. It stays registered until the returned subscription is dropped.
    pub fn subscribe(&self, listener: impl FnMut() + 'static) -> DrawSubscription {
        let id = self.registry.next_id.get();
        self.registry.next_id.set(id.wrapping_add(1));
        let listener: Listener = Rc::new(RefCell::new(listener));
        self.registry.listeners.borrow_mut().push((id, listener));
        DrawSubscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Run every registered listener once.
    ///
    /// Listeners may subscribe or unsubscribe while being notified; changes apply from the next
    /// notification. A listener that is still running (re-entrant notify) is skipped.
    pub fn notify(&self) {
        let snapshot: Vec<Listener> = self
            .registry
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in snapshot {
            match listener.try_borrow_mut() {
                Ok(mut f) => (&mut *f)(),
                Err(_) => tracing::debug!("skipping re-entrant after-draw listener"),
            }
        }
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.registry.listeners.borrow().len()
    }
}

/// Handle for a registered after-draw listener; unsubscribes on drop.
#[must_use = "dropping the subscription unregisters the listener"]
pub struct DrawSubscription {
    id: u64,
    registry: Weak<Registry>,
}

impl DrawSubscription {
    /// A subscription that is not attached to any registry.
    ///
    /// Useful for hosts that drive capture manually and never notify.
    pub fn detached() -> Self {
        Self {
            id: 0,
            registry: Weak::new(),
        }
    }
}

impl Drop for DrawSubscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .listeners
                .borrow_mut()
                .retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for DrawSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawSubscription")
            .field("id", &self.id)
            .field("live", &(self.registry.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/notifier.rs"]
mod tests;
