use std::collections::VecDeque;

/// Asynchronous host input.
///
/// Positions and sizes are logical pixels. `Scroll` carries the absolute raw
/// scroll position of the document, not a delta.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum HostEvent {
    Scroll { position: f64 },
    Resize { width: f64, height: f64 },
    PointerMoved { x: f64, y: f64 },
    PointerLeft,
    Visibility { hidden: bool },
}

impl HostEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            HostEvent::Scroll { .. } => EventKind::Scroll,
            HostEvent::Resize { .. } => EventKind::Resize,
            HostEvent::PointerMoved { .. } | HostEvent::PointerLeft => EventKind::Pointer,
            HostEvent::Visibility { .. } => EventKind::Visibility,
        }
    }
}

/// Listener filter.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EventKind {
    Scroll,
    Resize,
    Pointer,
    Visibility,
}

/// Handle returned by [`EventQueue::subscribe`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SubscriptionId(u64);

struct Listener {
    id: SubscriptionId,
    kind: EventKind,
    callback: Box<dyn FnMut(&HostEvent)>,
}

/// Buffer between host callbacks and the tick loop.
///
/// Hosts [`push`](EventQueue::push) events whenever they occur; nothing is
/// applied until the loop calls [`drain`](EventQueue::drain) at the start of
/// a tick, which keeps every tick atomic with respect to host input.
/// Listeners are notified during the drain, in arrival order.
#[derive(Default)]
pub struct EventQueue {
    pending: VecDeque<HostEvent>,
    listeners: Vec<Listener>,
    next_id: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues an event for the next tick.
    pub fn push(&mut self, event: HostEvent) {
        self.pending.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Registers `callback` for events of `kind`.
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        callback: impl FnMut(&HostEvent) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.listeners.push(Listener {
            id,
            kind,
            callback: Box::new(callback),
        });
        id
    }

    /// Removes a listener. Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    /// Takes every pending event in arrival order, notifying listeners.
    pub fn drain(&mut self) -> Vec<HostEvent> {
        let events: Vec<HostEvent> = self.pending.drain(..).collect();
        for ev in &events {
            let kind = ev.kind();
            for listener in self.listeners.iter_mut().filter(|l| l.kind == kind) {
                (listener.callback)(ev);
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn drain_preserves_arrival_order() {
        let mut q = EventQueue::new();
        q.push(HostEvent::Scroll { position: 1.0 });
        q.push(HostEvent::Resize { width: 10.0, height: 20.0 });
        q.push(HostEvent::Scroll { position: 2.0 });

        let events = q.drain();
        assert_eq!(
            events,
            vec![
                HostEvent::Scroll { position: 1.0 },
                HostEvent::Resize { width: 10.0, height: 20.0 },
                HostEvent::Scroll { position: 2.0 },
            ]
        );
        assert!(q.is_empty());
    }

    #[test]
    fn listeners_only_see_their_kind() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut q = EventQueue::new();
        let sink = seen.clone();
        q.subscribe(EventKind::Resize, move |ev| sink.borrow_mut().push(*ev));

        q.push(HostEvent::Scroll { position: 5.0 });
        q.push(HostEvent::Resize { width: 1.0, height: 2.0 });
        q.drain();

        assert_eq!(*seen.borrow(), vec![HostEvent::Resize { width: 1.0, height: 2.0 }]);
    }

    #[test]
    fn listeners_are_not_called_before_drain() {
        let count = Rc::new(RefCell::new(0));
        let mut q = EventQueue::new();
        let c = count.clone();
        q.subscribe(EventKind::Pointer, move |_| *c.borrow_mut() += 1);

        q.push(HostEvent::PointerLeft);
        assert_eq!(*count.borrow(), 0);
        q.drain();
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let count = Rc::new(RefCell::new(0));
        let mut q = EventQueue::new();
        let c = count.clone();
        let id = q.subscribe(EventKind::Scroll, move |_| *c.borrow_mut() += 1);

        assert!(q.unsubscribe(id));
        assert!(!q.unsubscribe(id));

        q.push(HostEvent::Scroll { position: 1.0 });
        q.drain();
        assert_eq!(*count.borrow(), 0);
    }
}
