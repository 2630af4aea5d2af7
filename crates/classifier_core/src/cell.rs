//! Single-threaded observable value holder.
//!
//! A cell stores the latest value and fans it out to every subscribed
//! observer, in subscription order, on each `set`. Observers run on the
//! caller's stack. A nested `set` issued from inside an observer completes
//! its own fan-out before the outer one resumes.

use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use classifier_logging::classifier_error;

type Observer<T> = Rc<dyn Fn(&T)>;

struct Slot<T> {
    id: u64,
    observer: Observer<T>,
}

struct Inner<T> {
    value: T,
    next_id: u64,
    observers: Vec<Slot<T>>,
}

/// Result of one notification fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Notified {
    /// Observers that returned normally.
    pub delivered: usize,
    /// Observers that panicked; their panic was caught and logged.
    pub failed: usize,
}

impl Notified {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    fn record(&mut self, ok: bool) {
        if ok {
            self.delivered += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Shared handle to an observable value. Clones share the same value and observers.
pub struct ObservableCell<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for ObservableCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ObservableCell")
            .field("value", &inner.value)
            .field("observers", &inner.observers.len())
            .finish()
    }
}

impl<T: Clone + 'static> ObservableCell<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value: initial,
                next_id: 0,
                observers: Vec::new(),
            })),
        }
    }

    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Replaces the value and notifies the observers subscribed at this moment.
    ///
    /// Observers removed while the fan-out is running are skipped if they
    /// have not been reached yet. Observers added during the fan-out only
    /// see later values.
    pub fn set(&self, value: T) -> Notified {
        let snapshot: Vec<(u64, Observer<T>)> = {
            let mut inner = self.inner.borrow_mut();
            inner.value = value.clone();
            inner
                .observers
                .iter()
                .map(|slot| (slot.id, Rc::clone(&slot.observer)))
                .collect()
        };

        let mut report = Notified::default();
        for (id, observer) in snapshot {
            if !self.is_subscribed(id) {
                continue;
            }
            report.record(notify(id, &observer, &value));
        }
        report
    }

    /// Computes the next value from the current one, then behaves as [`set`](Self::set).
    pub fn update(&self, f: impl FnOnce(&T) -> T) -> Notified {
        let current = self.get();
        self.set(f(&current))
    }

    /// Registers `observer` and invokes it once with the current value.
    pub fn subscribe(&self, observer: impl Fn(&T) + 'static) -> Unsubscribe {
        let observer: Observer<T> = Rc::new(observer);
        let (id, current) = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.observers.push(Slot {
                id,
                observer: Rc::clone(&observer),
            });
            (id, inner.value.clone())
        };

        notify(id, &observer, &current);

        let detach: Weak<dyn Detach> = Rc::downgrade(&self.inner) as Weak<dyn Detach>;
        Unsubscribe { cell: detach, id }
    }

    pub fn observer_count(&self) -> usize {
        self.inner.borrow().observers.len()
    }

    fn is_subscribed(&self, id: u64) -> bool {
        self.inner.borrow().observers.iter().any(|slot| slot.id == id)
    }
}

fn notify<T>(id: u64, observer: &Observer<T>, value: &T) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(|| (**observer)(value))) {
        Ok(()) => true,
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            classifier_error!("observer {} panicked during notification: {}", id, reason);
            false
        }
    }
}

trait Detach {
    fn detach(&self, id: u64);
}

impl<T> Detach for RefCell<Inner<T>> {
    fn detach(&self, id: u64) {
        self.borrow_mut().observers.retain(|slot| slot.id != id);
    }
}

/// Token returned by [`ObservableCell::subscribe`].
///
/// Dropping the token does not unsubscribe; call [`unsubscribe`](Self::unsubscribe).
/// Calling it more than once, or after the cell is gone, does nothing.
pub struct Unsubscribe {
    cell: Weak<dyn Detach>,
    id: u64,
}

impl Unsubscribe {
    pub fn unsubscribe(&self) {
        if let Some(cell) = self.cell.upgrade() {
            cell.detach(self.id);
        }
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe").field("id", &self.id).finish()
    }
}
