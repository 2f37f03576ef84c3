// Message endpoints
// Each isolated context owns one Endpoint. Other contexts hold MessageTargets
// and post opaque JSON values into it; the owner validates and fans them out
// to its listeners when it dispatches.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::mpsc;

use peek_core::{Message, MessageKind};
use serde_json::Value;

type Handler = Box<dyn FnMut(&Message)>;

struct Listener {
    id: u64,
    kind: MessageKind,
    handler: Rc<RefCell<Handler>>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<Listener>,
}

// ──────────────────────────────────────────────
// MessageTarget
// ──────────────────────────────────────────────

/// Sending half of an endpoint. Cheap to clone; sending never blocks and never
/// fails observably.
#[derive(Debug, Clone)]
pub struct MessageTarget {
    name: Rc<str>,
    tx: mpsc::Sender<Value>,
}

impl MessageTarget {
    pub fn send(&self, message: &Message) {
        self.post_raw(message.to_value());
    }

    /// Post an arbitrary value. The receiver validates it on dispatch.
    pub fn post_raw(&self, value: Value) {
        if self.tx.send(value).is_err() {
            log::debug!("endpoint {} is gone; message dropped", self.name);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

// ──────────────────────────────────────────────
// Endpoint
// ──────────────────────────────────────────────

pub struct Endpoint {
    name: Rc<str>,
    tx: mpsc::Sender<Value>,
    inbox: mpsc::Receiver<Value>,
    registry: Rc<RefCell<Registry>>,
}

impl Endpoint {
    /// Create an endpoint and a first target pointing at it.
    pub fn new(name: &str) -> (Self, MessageTarget) {
        let (tx, inbox) = mpsc::channel();
        let endpoint = Self {
            name: Rc::from(name),
            tx,
            inbox,
            registry: Rc::new(RefCell::new(Registry::default())),
        };
        let target = endpoint.target();
        (endpoint, target)
    }

    pub fn target(&self) -> MessageTarget {
        MessageTarget {
            name: self.name.clone(),
            tx: self.tx.clone(),
        }
    }

    /// Register `handler` for messages of `kind`. The handler stays registered
    /// until the returned subscription is unsubscribed or dropped.
    pub fn listen<F>(&self, kind: MessageKind, handler: F) -> Subscription
    where
        F: FnMut(&Message) + 'static,
    {
        let handler: Handler = Box::new(handler);
        let mut registry = self.registry.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.listeners.push(Listener {
            id,
            kind,
            handler: Rc::new(RefCell::new(handler)),
        });
        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    pub fn listener_count(&self, kind: MessageKind) -> usize {
        self.registry
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.kind == kind)
            .count()
    }

    /// Drain the inbox, delivering each valid message to every listener of its
    /// kind in registration order. Returns the number of valid messages.
    pub fn dispatch(&self) -> usize {
        let mut delivered = 0;
        while let Ok(value) = self.inbox.try_recv() {
            let Some(message) = Message::from_value(value) else {
                log::debug!("{}: ignoring malformed message", self.name);
                continue;
            };
            delivered += 1;

            // Snapshot so handlers may (un)subscribe while being called.
            let handlers: Vec<Rc<RefCell<Handler>>> = self
                .registry
                .borrow()
                .listeners
                .iter()
                .filter(|l| l.kind == message.kind())
                .map(|l| l.handler.clone())
                .collect();

            for handler in handlers {
                match handler.try_borrow_mut() {
                    Ok(mut h) => (&mut *h)(&message),
                    Err(_) => log::warn!("{}: re-entrant dispatch skipped", self.name),
                }
            }
        }
        delivered
    }
}

// ──────────────────────────────────────────────
// Subscription
// ──────────────────────────────────────────────

/// Unsubscribe handle returned by [`Endpoint::listen`].
#[must_use = "dropping a Subscription unsubscribes its handler"]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if let Ok(mut registry) = registry.try_borrow_mut() {
                registry.listeners.retain(|l| l.id != self.id);
            }
        }
    }
}
