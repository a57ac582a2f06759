//! The resource trait and insertion options.
//!
//! The cache treats resources as opaque: everything it needs from a
//! backend object fits the [`GpuResource`] capability set. Lifecycle
//! bookkeeping (timestamps, partition indices, reference counts, keys,
//! budget flags) lives cache-side, so backend types stay free of cache
//! plumbing and the cache can update positions without reaching into the
//! resource.
//!
//! Consumers refer to tracked resources by [`ResourceId`], a copyable
//! generational handle. A handle to a released resource goes stale; cache
//! accessors then return `None` rather than aliasing a recycled slot.

use crate::ds::Handle;
use crate::key::ScratchKey;

/// Handle to a resource tracked by a
/// [`ResourceCache`](crate::cache::ResourceCache).
pub type ResourceId = Handle;

/// Capability set the cache requires from a GPU-backed object.
///
/// Implementations own the actual GPU state (texture, buffer, render
/// target, path range). The cache calls [`release`](GpuResource::release)
/// when it evicts or is shut down, and [`abandon`](GpuResource::abandon)
/// when the device is lost and GPU teardown must be skipped.
pub trait GpuResource {
    /// Current GPU memory footprint in bytes.
    ///
    /// If the footprint changes while tracked, the owner must report it
    /// via [`ResourceCache::resource_size_changed`](crate::cache::ResourceCache::resource_size_changed).
    fn gpu_memory_size(&self) -> usize;

    /// Returns `true` while GPU reads or writes are still scheduled
    /// against the resource. Consulted by scratch lookups that want (or
    /// require) an idle resource.
    fn has_pending_io(&self) -> bool {
        false
    }

    /// Destroys the underlying GPU objects.
    ///
    /// Wrapped resources do not own their GPU state; their implementation
    /// drops the borrowed handle without destroying anything.
    fn release(&mut self);

    /// Forgets the underlying GPU objects without freeing them. Used when
    /// the device is lost and GPU calls would be invalid.
    fn abandon(&mut self);
}

/// Per-resource settings fixed at insertion.
#[derive(Debug, Clone, Default)]
pub struct ResourceOptions {
    /// Scratch pool identity, if the resource is reusable as scratch.
    pub scratch_key: Option<ScratchKey>,
    /// Whether the resource counts against the cache budgets.
    pub budgeted: bool,
    /// Whether the underlying GPU state is owned externally. Wrapped
    /// resources are never budgeted and never usable as scratch.
    pub wrapped: bool,
}

impl ResourceOptions {
    /// Options for a budgeted resource without a scratch key.
    pub fn budgeted() -> Self {
        Self {
            scratch_key: None,
            budgeted: true,
            wrapped: false,
        }
    }

    /// Options for a budgeted scratch resource.
    pub fn scratch(key: ScratchKey) -> Self {
        Self {
            scratch_key: Some(key),
            budgeted: true,
            wrapped: false,
        }
    }

    /// Options for a tracked but unbudgeted resource.
    pub fn unbudgeted() -> Self {
        Self::default()
    }

    /// Options for a resource whose GPU state is owned externally.
    pub fn wrapped() -> Self {
        Self {
            scratch_key: None,
            budgeted: false,
            wrapped: true,
        }
    }

    /// Attaches a scratch key.
    pub fn with_scratch_key(mut self, key: ScratchKey) -> Self {
        self.scratch_key = Some(key);
        self
    }
}
