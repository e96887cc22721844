//! Wheel input dispatch for the viewer surface.
//!
//! Handlers are registered under a name and a name can only be held by one
//! handler at a time, so remounting a viewer never stacks listeners.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    pub delta_y: f32,
    pub cancelable: bool,
    default_prevented: bool,
}

impl WheelEvent {
    pub fn new(delta_y: f32, cancelable: bool) -> Self {
        Self {
            delta_y,
            cancelable,
            default_prevented: false,
        }
    }

    /// Stops the host page from scrolling. Has no effect on events that
    /// cannot be cancelled.
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

pub type WheelHandler = Rc<dyn Fn(&mut WheelEvent)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Listener {
    id: ListenerId,
    name: &'static str,
    handler: WheelHandler,
}

#[derive(Default)]
pub struct InputSurface {
    listeners: RefCell<Vec<Listener>>,
    next_id: Cell<u64>,
}

impl InputSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `handler` under `name`. Returns `None` if a handler with that
    /// name is already attached.
    pub fn register(&self, name: &'static str, handler: WheelHandler) -> Option<ListenerId> {
        let mut listeners = self.listeners.borrow_mut();
        if listeners.iter().any(|l| l.name == name) {
            log::warn!("wheel handler {name:?} is already registered");
            return None;
        }
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        listeners.push(Listener { id, name, handler });
        log::debug!("registered wheel handler {name:?}");
        Some(id)
    }

    /// Detaches a handler. Returns whether it was attached.
    pub fn deregister(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        before != listeners.len()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.listeners.borrow().iter().any(|l| l.name == name)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Runs every handler on the event and hands it back, so the host can
    /// check whether the default scroll was prevented.
    pub fn dispatch_wheel(&self, mut event: WheelEvent) -> WheelEvent {
        // handlers may (de)register while running
        let handlers: Vec<WheelHandler> = self
            .listeners
            .borrow()
            .iter()
            .map(|l| l.handler.clone())
            .collect();
        for handler in handlers {
            handler(&mut event);
        }
        event
    }
}
