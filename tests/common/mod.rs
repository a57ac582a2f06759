//! Shared harness for cache integration tests: an observable resource.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gpucache::resource::GpuResource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    Live,
    Released,
    Abandoned,
}

/// Test double for a GPU object. Size and pending-IO are settable; the
/// paired [`ResourceProbe`] observes teardown from outside the cache.
pub struct TestResource {
    pub size: usize,
    label: String,
    pending_io: Rc<Cell<bool>>,
    state: Rc<Cell<ResourceState>>,
    release_log: Option<Rc<RefCell<Vec<String>>>>,
}

impl TestResource {
    pub fn new(size: usize) -> (Self, ResourceProbe) {
        Self::labeled(size, "")
    }

    pub fn labeled(size: usize, label: &str) -> (Self, ResourceProbe) {
        let pending_io = Rc::new(Cell::new(false));
        let state = Rc::new(Cell::new(ResourceState::Live));
        let resource = Self {
            size,
            label: label.to_string(),
            pending_io: Rc::clone(&pending_io),
            state: Rc::clone(&state),
            release_log: None,
        };
        (resource, ResourceProbe { pending_io, state })
    }

    /// Appends this resource's label to `log` when it is released.
    pub fn logged_to(mut self, log: &Rc<RefCell<Vec<String>>>) -> Self {
        self.release_log = Some(Rc::clone(log));
        self
    }
}

impl GpuResource for TestResource {
    fn gpu_memory_size(&self) -> usize {
        self.size
    }

    fn has_pending_io(&self) -> bool {
        self.pending_io.get()
    }

    fn release(&mut self) {
        self.state.set(ResourceState::Released);
        if let Some(log) = &self.release_log {
            log.borrow_mut().push(self.label.clone());
        }
    }

    fn abandon(&mut self) {
        self.state.set(ResourceState::Abandoned);
    }
}

/// Outside view of a [`TestResource`]'s lifecycle.
pub struct ResourceProbe {
    pending_io: Rc<Cell<bool>>,
    state: Rc<Cell<ResourceState>>,
}

impl ResourceProbe {
    pub fn state(&self) -> ResourceState {
        self.state.get()
    }

    pub fn is_live(&self) -> bool {
        self.state.get() == ResourceState::Live
    }

    pub fn set_pending_io(&self, pending: bool) {
        self.pending_io.set(pending);
    }
}
