// ABOUTME: Single-threaded event emitters with scoped subscriptions.
// ABOUTME: Dropping a Subscription removes its listener.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

type Listener<T> = Box<dyn FnMut(&T)>;

struct Slots<T> {
    next_id: u64,
    listeners: Vec<(u64, Listener<T>)>,
    // Ids unsubscribed while their listener was taken out for an emit
    removed: Vec<u64>,
    emitting: bool,
    // Values emitted from inside a listener, delivered after the current one
    pending: VecDeque<T>,
}

/// Fan-out of values to listeners, in subscription order
pub struct Emitter<T> {
    slots: Rc<RefCell<Slots<T>>>,
}

impl<T: 'static> Emitter<T> {
    pub fn new() -> Self {
        Self {
            slots: Rc::new(RefCell::new(Slots {
                next_id: 0,
                listeners: Vec::new(),
                removed: Vec::new(),
                emitting: false,
                pending: VecDeque::new(),
            })),
        }
    }

    pub fn subscribe(&self, listener: impl FnMut(&T) + 'static) -> Subscription {
        let id = {
            let mut slots = self.slots.borrow_mut();
            let id = slots.next_id;
            slots.next_id += 1;
            slots.listeners.push((id, Box::new(listener)));
            id
        };

        let weak: Weak<RefCell<Slots<T>>> = Rc::downgrade(&self.slots);
        Subscription::new(move || {
            if let Some(slots) = weak.upgrade() {
                let mut slots = slots.borrow_mut();
                let before = slots.listeners.len();
                slots.listeners.retain(|(other, _)| *other != id);
                if slots.listeners.len() == before {
                    slots.removed.push(id);
                }
            }
        })
    }

    /// Call every listener with `value`. Listeners may subscribe,
    /// unsubscribe or emit again while being called; nested values are
    /// delivered in order once the current value has reached every listener.
    pub fn emit(&self, value: &T)
    where
        T: Clone,
    {
        {
            let mut slots = self.slots.borrow_mut();
            if slots.emitting {
                slots.pending.push_back(value.clone());
                return;
            }
            slots.emitting = true;
        }

        self.deliver(value);
        loop {
            let next = self.slots.borrow_mut().pending.pop_front();
            match next {
                Some(value) => self.deliver(&value),
                None => break,
            }
        }
        self.slots.borrow_mut().emitting = false;
    }

    fn deliver(&self, value: &T) {
        let mut listeners = std::mem::take(&mut self.slots.borrow_mut().listeners);
        for (_, listener) in listeners.iter_mut() {
            listener(value);
        }

        let mut slots = self.slots.borrow_mut();
        let removed = std::mem::take(&mut slots.removed);
        listeners.retain(|(id, _)| !removed.contains(id));
        listeners.append(&mut slots.listeners);
        slots.listeners = listeners;
    }

    /// Drop every listener; outstanding subscriptions become no-ops
    pub fn clear(&self) {
        let mut slots = self.slots.borrow_mut();
        slots.listeners.clear();
        slots.removed.clear();
        slots.pending.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.slots.borrow().listeners.len()
    }
}

impl<T: 'static> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard for a registered listener
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(unsubscribe: impl FnOnce() + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Unsubscribe now
    pub fn dispose(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn listeners_receive_values_in_order() {
        let emitter = Emitter::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let first = {
            let seen = Rc::clone(&seen);
            emitter.subscribe(move |v| seen.borrow_mut().push(("first", *v)))
        };
        let second = {
            let seen = Rc::clone(&seen);
            emitter.subscribe(move |v| seen.borrow_mut().push(("second", *v)))
        };

        emitter.emit(&7);
        assert_eq!(*seen.borrow(), vec![("first", 7), ("second", 7)]);

        drop(first);
        drop(second);
    }

    #[test]
    fn dropping_subscription_stops_delivery() {
        let emitter = Emitter::<()>::new();
        let count = Rc::new(Cell::new(0));

        let subscription = {
            let count = Rc::clone(&count);
            emitter.subscribe(move |_| count.set(count.get() + 1))
        };
        emitter.emit(&());
        drop(subscription);
        emitter.emit(&());

        assert_eq!(count.get(), 1);
        assert_eq!(emitter.listener_count(), 0);
    }

    #[test]
    fn listener_can_subscribe_during_emit() {
        let emitter = Rc::new(Emitter::<()>::new());
        let late_calls = Rc::new(Cell::new(0));
        let held = Rc::new(RefCell::new(Vec::new()));

        let _outer = {
            let emitter_ref = Rc::clone(&emitter);
            let late_calls = Rc::clone(&late_calls);
            let held = Rc::clone(&held);
            emitter.subscribe(move |_| {
                let late_calls = Rc::clone(&late_calls);
                let sub = emitter_ref.subscribe(move |_| late_calls.set(late_calls.get() + 1));
                held.borrow_mut().push(sub);
            })
        };

        emitter.emit(&());
        assert_eq!(late_calls.get(), 0);
        assert_eq!(emitter.listener_count(), 2);

        emitter.emit(&());
        assert_eq!(late_calls.get(), 1);

        held.borrow_mut().clear();
    }

    #[test]
    fn listener_can_unsubscribe_itself_during_emit() {
        let emitter = Emitter::<()>::new();
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let count = Rc::new(Cell::new(0));

        let subscription = {
            let slot = Rc::clone(&slot);
            let count = Rc::clone(&count);
            emitter.subscribe(move |_| {
                count.set(count.get() + 1);
                slot.borrow_mut().take();
            })
        };
        *slot.borrow_mut() = Some(subscription);

        emitter.emit(&());
        emitter.emit(&());

        assert_eq!(count.get(), 1);
        assert_eq!(emitter.listener_count(), 0);
    }

    #[test]
    fn emit_from_listener_is_delivered_after_current_value() {
        let emitter = Rc::new(Emitter::<u32>::new());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let _echo = {
            let emitter_ref = Rc::clone(&emitter);
            let seen = Rc::clone(&seen);
            emitter.subscribe(move |v| {
                seen.borrow_mut().push(("echo", *v));
                if *v == 1 {
                    emitter_ref.emit(&2);
                }
            })
        };
        let _tail = {
            let seen = Rc::clone(&seen);
            emitter.subscribe(move |v| seen.borrow_mut().push(("tail", *v)))
        };

        emitter.emit(&1);
        assert_eq!(
            *seen.borrow(),
            vec![("echo", 1), ("tail", 1), ("echo", 2), ("tail", 2)]
        );

        emitter.emit(&3);
        assert_eq!(seen.borrow().len(), 6);
    }

    #[test]
    fn subscription_outliving_emitter_is_harmless() {
        let emitter = Emitter::<()>::new();
        let subscription = emitter.subscribe(|_| {});
        drop(emitter);
        subscription.dispose();
    }
}
