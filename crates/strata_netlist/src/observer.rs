//! Per-event subscriber lists for structural change notifications.
//!
//! Subscribers register a closure for one [`EventKind`] and receive the design
//! and the [`Event`] after (or before, for `Pre*` events) each matching
//! mutation. An event kind with no subscribers costs one empty-list check.
//!
//! Registration returns a [`Subscription`] guard that holds only a weak
//! reference to the registry. Dropping the guard unregisters the callback;
//! dropping the design fires [`Event::DesignDestruction`] and then
//! unregisters everyone, after which guards report
//! [`is_attached`](Subscription::is_attached) as `false`.

use crate::design::Design;
use crate::ids::{CellId, InstanceId, NetId, PinId};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use strata_library::LibraryCellId;

/// A structural change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// An instance was created.
    PostInstanceCreate {
        /// The new instance.
        instance: InstanceId,
    },
    /// An instance is about to be removed.
    PreInstanceRemove {
        /// The instance being removed.
        instance: InstanceId,
    },
    /// A net was created.
    PostNetCreate {
        /// The new net.
        net: NetId,
    },
    /// A net is about to be removed.
    PreNetRemove {
        /// The net being removed.
        net: NetId,
    },
    /// A cell was bound to another library cell.
    PostCellRemap {
        /// The remapped cell.
        cell: CellId,
        /// The library cell it was bound to before.
        previous: LibraryCellId,
    },
    /// A pin was connected to a net.
    PostPinConnect {
        /// The connected pin.
        pin: PinId,
        /// The net it joined.
        net: NetId,
    },
    /// A pin is about to be disconnected.
    PrePinDisconnect {
        /// The pin being disconnected.
        pin: PinId,
        /// The net it is leaving.
        net: NetId,
    },
    /// An instance is about to move.
    PreInstanceMove {
        /// The instance.
        instance: InstanceId,
    },
    /// An instance moved.
    PostInstanceMove {
        /// The instance.
        instance: InstanceId,
    },
    /// The design is being dropped.
    DesignDestruction,
}

/// The discriminant of an [`Event`], used to pick a subscriber list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum EventKind {
    PostInstanceCreate,
    PreInstanceRemove,
    PostNetCreate,
    PreNetRemove,
    PostCellRemap,
    PostPinConnect,
    PrePinDisconnect,
    PreInstanceMove,
    PostInstanceMove,
    DesignDestruction,
}

impl EventKind {
    const COUNT: usize = 10;

    fn index(self) -> usize {
        self as usize
    }
}

impl Event {
    /// Returns the kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::PostInstanceCreate { .. } => EventKind::PostInstanceCreate,
            Event::PreInstanceRemove { .. } => EventKind::PreInstanceRemove,
            Event::PostNetCreate { .. } => EventKind::PostNetCreate,
            Event::PreNetRemove { .. } => EventKind::PreNetRemove,
            Event::PostCellRemap { .. } => EventKind::PostCellRemap,
            Event::PostPinConnect { .. } => EventKind::PostPinConnect,
            Event::PrePinDisconnect { .. } => EventKind::PrePinDisconnect,
            Event::PreInstanceMove { .. } => EventKind::PreInstanceMove,
            Event::PostInstanceMove { .. } => EventKind::PostInstanceMove,
            Event::DesignDestruction => EventKind::DesignDestruction,
        }
    }
}

type Callback = Box<dyn FnMut(&Design, &Event)>;

struct Entry {
    id: u64,
    active: Cell<bool>,
    callback: RefCell<Callback>,
}

/// Subscriber lists, one per [`EventKind`].
pub struct ObserverRegistry {
    lists: [RefCell<Vec<Rc<Entry>>>; EventKind::COUNT],
    next_id: Cell<u64>,
}

impl ObserverRegistry {
    pub(crate) fn new() -> Self {
        Self {
            lists: Default::default(),
            next_id: Cell::new(0),
        }
    }

    /// Registers `callback` for every event of `kind`.
    ///
    /// Callbacks run in registration order. A callback registered while an
    /// event is being dispatched first sees the next event.
    pub fn subscribe(
        self: &Rc<Self>,
        kind: EventKind,
        callback: impl FnMut(&Design, &Event) + 'static,
    ) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.lists[kind.index()].borrow_mut().push(Rc::new(Entry {
            id,
            active: Cell::new(true),
            callback: RefCell::new(Box::new(callback)),
        }));
        tracing::trace!(?kind, id, "observer subscribed");
        Subscription {
            registry: Rc::downgrade(self),
            kind,
            id,
            detached: false,
        }
    }

    /// Returns the number of live subscribers for `kind`.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.lists[kind.index()].borrow().len()
    }

    fn unsubscribe(&self, kind: EventKind, id: u64) {
        let mut list = self.lists[kind.index()].borrow_mut();
        if let Some(pos) = list.iter().position(|e| e.id == id) {
            let entry = list.remove(pos);
            entry.active.set(false);
            tracing::trace!(?kind, id, "observer unsubscribed");
        }
    }

    pub(crate) fn dispatch(&self, design: &Design, event: &Event) {
        let list = &self.lists[event.kind().index()];
        if list.borrow().is_empty() {
            return;
        }
        // Snapshot so callbacks may subscribe or unsubscribe while we iterate.
        let snapshot: Vec<Rc<Entry>> = list.borrow().clone();
        for entry in snapshot {
            if !entry.active.get() {
                continue;
            }
            if let Ok(mut callback) = entry.callback.try_borrow_mut() {
                callback(design, event);
            }
        }
    }

    pub(crate) fn clear(&self) {
        for list in &self.lists {
            for entry in list.borrow_mut().drain(..) {
                entry.active.set(false);
            }
        }
    }

    /// Subscribes to [`Event::PostInstanceCreate`].
    pub fn on_post_instance_create(
        self: &Rc<Self>,
        mut f: impl FnMut(&Design, InstanceId) + 'static,
    ) -> Subscription {
        self.subscribe(EventKind::PostInstanceCreate, move |d, e| {
            if let Event::PostInstanceCreate { instance } = *e {
                f(d, instance);
            }
        })
    }

    /// Subscribes to [`Event::PreInstanceRemove`].
    pub fn on_pre_instance_remove(
        self: &Rc<Self>,
        mut f: impl FnMut(&Design, InstanceId) + 'static,
    ) -> Subscription {
        self.subscribe(EventKind::PreInstanceRemove, move |d, e| {
            if let Event::PreInstanceRemove { instance } = *e {
                f(d, instance);
            }
        })
    }

    /// Subscribes to [`Event::PostNetCreate`].
    pub fn on_post_net_create(
        self: &Rc<Self>,
        mut f: impl FnMut(&Design, NetId) + 'static,
    ) -> Subscription {
        self.subscribe(EventKind::PostNetCreate, move |d, e| {
            if let Event::PostNetCreate { net } = *e {
                f(d, net);
            }
        })
    }

    /// Subscribes to [`Event::PreNetRemove`].
    pub fn on_pre_net_remove(
        self: &Rc<Self>,
        mut f: impl FnMut(&Design, NetId) + 'static,
    ) -> Subscription {
        self.subscribe(EventKind::PreNetRemove, move |d, e| {
            if let Event::PreNetRemove { net } = *e {
                f(d, net);
            }
        })
    }

    /// Subscribes to [`Event::PostCellRemap`]; the callback gets the previous library cell.
    pub fn on_post_cell_remap(
        self: &Rc<Self>,
        mut f: impl FnMut(&Design, CellId, LibraryCellId) + 'static,
    ) -> Subscription {
        self.subscribe(EventKind::PostCellRemap, move |d, e| {
            if let Event::PostCellRemap { cell, previous } = *e {
                f(d, cell, previous);
            }
        })
    }

    /// Subscribes to [`Event::PostPinConnect`].
    pub fn on_post_pin_connect(
        self: &Rc<Self>,
        mut f: impl FnMut(&Design, PinId, NetId) + 'static,
    ) -> Subscription {
        self.subscribe(EventKind::PostPinConnect, move |d, e| {
            if let Event::PostPinConnect { pin, net } = *e {
                f(d, pin, net);
            }
        })
    }

    /// Subscribes to [`Event::PrePinDisconnect`].
    pub fn on_pre_pin_disconnect(
        self: &Rc<Self>,
        mut f: impl FnMut(&Design, PinId, NetId) + 'static,
    ) -> Subscription {
        self.subscribe(EventKind::PrePinDisconnect, move |d, e| {
            if let Event::PrePinDisconnect { pin, net } = *e {
                f(d, pin, net);
            }
        })
    }

    /// Subscribes to [`Event::PreInstanceMove`].
    pub fn on_pre_instance_move(
        self: &Rc<Self>,
        mut f: impl FnMut(&Design, InstanceId) + 'static,
    ) -> Subscription {
        self.subscribe(EventKind::PreInstanceMove, move |d, e| {
            if let Event::PreInstanceMove { instance } = *e {
                f(d, instance);
            }
        })
    }

    /// Subscribes to [`Event::PostInstanceMove`].
    pub fn on_post_instance_move(
        self: &Rc<Self>,
        mut f: impl FnMut(&Design, InstanceId) + 'static,
    ) -> Subscription {
        self.subscribe(EventKind::PostInstanceMove, move |d, e| {
            if let Event::PostInstanceMove { instance } = *e {
                f(d, instance);
            }
        })
    }

    /// Subscribes to [`Event::DesignDestruction`].
    pub fn on_design_destruction(
        self: &Rc<Self>,
        mut f: impl FnMut(&Design) + 'static,
    ) -> Subscription {
        self.subscribe(EventKind::DesignDestruction, move |d, _| f(d))
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total: usize = self.lists.iter().map(|l| l.borrow().len()).sum();
        f.debug_struct("ObserverRegistry")
            .field("subscribers", &total)
            .finish()
    }
}

/// Guard for one registered callback. Dropping it unregisters the callback.
#[must_use = "dropping a Subscription unregisters its callback"]
pub struct Subscription {
    registry: Weak<ObserverRegistry>,
    kind: EventKind,
    id: u64,
    detached: bool,
}

impl Subscription {
    /// Returns `true` while the design is alive and the callback registered.
    pub fn is_attached(&self) -> bool {
        self.registry.upgrade().is_some_and(|r| {
            r.lists[self.kind.index()]
                .borrow()
                .iter()
                .any(|e| e.id == self.id)
        })
    }

    /// Unregisters the callback now.
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Keeps the callback registered for the rest of the design's lifetime.
    pub fn detach(mut self) {
        self.detached = true;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.detached {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.unsubscribe(self.kind, self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_library::{LibraryCellDef, PinDirection};
    use test_log::test;

    fn design() -> (Design, LibraryCellId) {
        let mut d = Design::new("top");
        let inv = d
            .register_library_cell(
                &LibraryCellDef::new("INV")
                    .pin("A", PinDirection::Input)
                    .pin("Y", PinDirection::Output)
                    .arc("A", "Y"),
            )
            .unwrap();
        (d, inv)
    }

    #[test]
    fn event_kind_matches_variant() {
        let e = Event::PostNetCreate {
            net: NetId::from_raw(0),
        };
        assert_eq!(e.kind(), EventKind::PostNetCreate);
        assert_eq!(Event::DesignDestruction.kind(), EventKind::DesignDestruction);
    }

    #[test]
    fn dropping_guard_unsubscribes() {
        let (mut d, inv) = design();
        let top = d.top_module();
        let seen = Rc::new(Cell::new(0));
        let s = seen.clone();
        let sub = d
            .observers()
            .on_post_instance_create(move |_, _| s.set(s.get() + 1));
        assert!(sub.is_attached());
        d.create_instance("u1", inv, top).unwrap();
        drop(sub);
        d.create_instance("u2", inv, top).unwrap();
        assert_eq!(seen.get(), 1);
        assert_eq!(d.observers().subscriber_count(EventKind::PostInstanceCreate), 0);
    }

    #[test]
    fn detached_guard_keeps_callback() {
        let (mut d, inv) = design();
        let top = d.top_module();
        let seen = Rc::new(Cell::new(0));
        let s = seen.clone();
        d.observers()
            .on_post_instance_create(move |_, _| s.set(s.get() + 1))
            .detach();
        d.create_instance("u1", inv, top).unwrap();
        d.create_instance("u2", inv, top).unwrap();
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn guard_outlives_design() {
        let (d, _) = design();
        let sub = d.observers().on_post_net_create(|_, _| {});
        drop(d);
        assert!(!sub.is_attached());
        drop(sub);
    }

    #[test]
    fn destruction_fires_once_then_unregisters() {
        let (d, _) = design();
        let fired = Rc::new(Cell::new(0));
        let f = fired.clone();
        let sub = d.observers().on_design_destruction(move |design| {
            assert_eq!(design.name(), "top");
            f.set(f.get() + 1);
        });
        drop(d);
        assert_eq!(fired.get(), 1);
        assert!(!sub.is_attached());
    }

    #[test]
    fn unsubscribe_inside_callback_stops_later_subscribers() {
        let (mut d, inv) = design();
        let top = d.top_module();
        let order = Rc::new(RefCell::new(Vec::new()));
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let (o, v) = (order.clone(), victim.clone());
        let _first = d.observers().on_post_instance_create(move |_, _| {
            o.borrow_mut().push("first");
            // Unregister the second subscriber before it is reached.
            v.borrow_mut().take();
        });
        let o = order.clone();
        *victim.borrow_mut() = Some(
            d.observers()
                .on_post_instance_create(move |_, _| o.borrow_mut().push("second")),
        );

        d.create_instance("u1", inv, top).unwrap();
        d.create_instance("u2", inv, top).unwrap();
        assert_eq!(*order.borrow(), vec!["first", "first"]);
    }

    #[test]
    fn unused_kinds_have_no_subscribers() {
        let (d, _) = design();
        let _sub = d.observers().on_post_cell_remap(|_, _, _| {});
        assert_eq!(d.observers().subscriber_count(EventKind::PostCellRemap), 1);
        assert_eq!(d.observers().subscriber_count(EventKind::PreNetRemove), 0);
    }
}
