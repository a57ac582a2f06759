//! Budgeted registry for GPU-backed resources.
//!
//! [`ResourceCache`] tracks every resource a rendering backend owns,
//! hands out interchangeable scratch resources, evicts in LRU order when
//! the budgets are exceeded, and services unique-key invalidation posted
//! from other threads.
//!
//! ## Architecture
//!
//! ```text
//!   entries: GenArena<Entry>      ┌─ nonpurgeable: Vec<ResourceId>
//!   (owns the resources,         │    unordered; slot recorded on the
//!    timestamps, keys, refs) ────┤    entry for O(1) swap-remove
//!                                 └─ purgeable: IndexedMinHeap<ResourceId>
//!                                      min-timestamp first; heap slot
//!                                      recorded on the entry
//!
//!   scratch_map: MultiMap<ScratchKey, ResourceId>   many per key
//!   unique_map:  FxHashMap<UniqueKey, ResourceId>   at most one per key
//! ```
//!
//! Every tracked resource lives in exactly one partition: referenced
//! resources in the nonpurgeable array, unreferenced ones in the
//! purgeable heap. Crossing the reference-count-zero boundary migrates
//! the entry between partitions in O(log n); eviction pops the heap, so
//! the oldest unreferenced resource always goes first.
//!
//! ## Core Operations
//!
//! | Operation                       | Description                            | Complexity |
//! |---------------------------------|----------------------------------------|------------|
//! | `insert`                        | Register a new resource                | O(log n)   |
//! | `find_and_ref_scratch_resource` | Reuse an idle interchangeable resource | O(bucket)  |
//! | `find_and_ref_unique_resource`  | Look up content by unique key          | O(1) avg   |
//! | `change_unique_key`             | (Re)install content identity           | O(1) avg   |
//! | `unref_resource`                | Drop a reference; may purge            | O(log n)   |
//! | `process_invalid_unique_keys`   | Apply a drained invalidation batch     | O(batch)   |
//! | `purge_all_unlocked`            | Release everything unreferenced        | O(k log n) |
//!
//! Timestamps order eviction. The 32-bit allocator is monotonic; on wrap
//! it renumbers all live resources densely from 0, preserving relative
//! order, so LRU order survives (rare, O(n log n)).
//!
//! ## Example
//!
//! ```
//! use gpucache::cache::ResourceCache;
//! use gpucache::key::{ResourceType, ScratchKey};
//! use gpucache::resource::{GpuResource, ResourceOptions};
//!
//! struct Texture { bytes: usize }
//!
//! impl GpuResource for Texture {
//!     fn gpu_memory_size(&self) -> usize { self.bytes }
//!     fn release(&mut self) {}
//!     fn abandon(&mut self) {}
//! }
//!
//! let mut cache: ResourceCache<Texture> = ResourceCache::new();
//! let ty = ResourceType::generate();
//! let key = ScratchKey::new(ty, &[256, 256]);
//!
//! let id = cache.insert(Texture { bytes: 1 << 20 }, ResourceOptions::scratch(key.clone()));
//! cache.unref_resource(id); // parks in the purgeable pool
//!
//! // The next compatible request gets the same texture back.
//! let reused = cache.find_and_ref_scratch_resource(&key, Default::default());
//! assert_eq!(reused, Some(id));
//! ```

#[cfg(debug_assertions)]
use std::cell::Cell;

use rustc_hash::FxHashMap;
#[cfg(any(test, debug_assertions))]
use rustc_hash::FxHashSet;

use crate::ds::{GenArena, HeapAdapter, IndexedMinHeap, MultiMap, NOT_IN_PARTITION};
#[cfg(any(test, debug_assertions))]
use crate::error::InvariantError;
use crate::bus::UniqueKeyInvalidatedMessage;
use crate::key::{ScratchKey, UniqueKey};
use crate::resource::{GpuResource, ResourceId, ResourceOptions};
#[cfg(feature = "metrics")]
use crate::metrics::CacheMetrics;

/// Default budget: maximum number of budgeted resources.
pub const DEFAULT_MAX_COUNT: usize = 2 * (1 << 10);
/// Default budget: maximum budgeted bytes (96 MiB).
pub const DEFAULT_MAX_BYTES: usize = 96 * (1 << 20);

/// Pending-IO preference for scratch lookups.
///
/// `PreferNoPendingIo` first looks for an idle resource and falls back to
/// any available one; `RequireNoPendingIo` fails instead of falling back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScratchLookup {
    /// Any resource without outstanding references qualifies.
    #[default]
    Any,
    /// Prefer a resource with no pending GPU IO, but take any if none is.
    PreferNoPendingIo,
    /// Only a resource with no pending GPU IO qualifies.
    RequireNoPendingIo,
}

/// Cache-side state for one tracked resource.
struct Entry<R> {
    resource: R,
    timestamp: u32,
    /// Slot in the current partition; `NOT_IN_PARTITION` only transiently.
    index: i32,
    /// Outstanding external references. Zero means purgeable.
    refs: u32,
    budgeted: bool,
    wrapped: bool,
    scratch_key: Option<ScratchKey>,
    unique_key: Option<UniqueKey>,
}

impl<R: GpuResource> HeapAdapter<ResourceId> for GenArena<Entry<R>> {
    fn precedes(&self, a: &ResourceId, b: &ResourceId) -> bool {
        self[*a].timestamp < self[*b].timestamp
    }

    fn set_index(&mut self, item: &ResourceId, index: i32) {
        self[*item].index = index;
    }

    fn index(&self, item: &ResourceId) -> i32 {
        self[*item].index
    }
}

type OverBudgetCallback<R> = Box<dyn FnMut(&mut ResourceCache<R>)>;

/// Budgeted, LRU-evicting registry of GPU-backed resources.
///
/// Single-threaded: all mutation happens on the owning (render) thread.
/// Cross-thread invalidation arrives through
/// [`InvalidationBus`](crate::bus::InvalidationBus) and is applied here
/// via [`process_invalid_unique_keys`](Self::process_invalid_unique_keys).
pub struct ResourceCache<R: GpuResource> {
    entries: GenArena<Entry<R>>,
    nonpurgeable: Vec<ResourceId>,
    purgeable: IndexedMinHeap<ResourceId>,
    scratch_map: MultiMap<ScratchKey, ResourceId>,
    unique_map: FxHashMap<UniqueKey, ResourceId>,
    timestamp: u32,
    max_count: usize,
    max_bytes: usize,
    bytes: usize,
    budgeted_count: usize,
    budgeted_bytes: usize,
    over_budget_callback: Option<OverBudgetCallback<R>>,
    #[cfg(debug_assertions)]
    validate_tick: Cell<u32>,
    #[cfg(feature = "metrics")]
    metrics: CacheMetrics,
}

impl<R: GpuResource> ResourceCache<R> {
    /// Creates a cache with the default budgets.
    pub fn new() -> Self {
        Self::with_budgets(DEFAULT_MAX_COUNT, DEFAULT_MAX_BYTES)
    }

    /// Creates a cache with the given budgets.
    pub fn with_budgets(max_count: usize, max_bytes: usize) -> Self {
        Self {
            entries: GenArena::new(),
            nonpurgeable: Vec::new(),
            purgeable: IndexedMinHeap::new(),
            scratch_map: MultiMap::new(),
            unique_map: FxHashMap::default(),
            timestamp: 0,
            max_count,
            max_bytes,
            bytes: 0,
            budgeted_count: 0,
            budgeted_bytes: 0,
            over_budget_callback: None,
            #[cfg(debug_assertions)]
            validate_tick: Cell::new(0),
            #[cfg(feature = "metrics")]
            metrics: CacheMetrics::default(),
        }
    }

    // -----------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------

    /// Installs new budgets and immediately purges down to them.
    pub fn set_limits(&mut self, max_count: usize, max_bytes: usize) {
        self.max_count = max_count;
        self.max_bytes = max_bytes;
        self.purge_as_needed();
    }

    /// Installs the over-budget callback.
    ///
    /// Invoked at most once per purge pass, only when the purgeable heap
    /// has been drained and the cache is still over budget. The callback
    /// must not mutate the cache other than by dropping external
    /// references (which re-enter as purgeable notifications).
    pub fn set_over_budget_callback(
        &mut self,
        callback: impl FnMut(&mut ResourceCache<R>) + 'static,
    ) {
        self.over_budget_callback = Some(Box::new(callback));
    }

    // -----------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------

    /// Registers a resource and returns its handle.
    ///
    /// The caller holds one external reference afterwards; the resource
    /// starts nonpurgeable with a fresh timestamp.
    pub fn insert(&mut self, resource: R, options: ResourceOptions) -> ResourceId {
        let ResourceOptions {
            scratch_key,
            budgeted,
            wrapped,
        } = options;
        debug_assert!(
            !(wrapped && scratch_key.is_some()),
            "wrapped resources cannot be scratch"
        );
        debug_assert!(!(wrapped && budgeted), "wrapped resources are never budgeted");

        // Timestamp before tracking: wrap recovery walks the resources
        // that already carry timestamps.
        let timestamp = self.next_timestamp();
        let size = resource.gpu_memory_size();

        let id = self.entries.insert(Entry {
            resource,
            timestamp,
            index: NOT_IN_PARTITION,
            refs: 1,
            budgeted,
            wrapped,
            scratch_key: scratch_key.clone(),
            unique_key: None,
        });
        self.add_to_nonpurgeable(id);

        self.bytes += size;
        if budgeted {
            self.budgeted_count += 1;
            self.budgeted_bytes += size;
        }
        if let Some(key) = scratch_key {
            self.scratch_map.insert(key, id);
        }
        #[cfg(feature = "metrics")]
        self.metrics.record_totals(
            self.entries.len(),
            self.bytes,
            self.budgeted_count,
            self.budgeted_bytes,
        );

        self.purge_as_needed();
        self.validate();
        id
    }

    /// Untracks a resource and hands it back without releasing GPU state.
    ///
    /// For teardown paths where the caller owns the underlying GPU
    /// objects (wrapped resources). Returns `None` for a stale handle.
    pub fn remove(&mut self, id: ResourceId) -> Option<R> {
        if !self.entries.contains(id) {
            return None;
        }
        let entry = self.detach(id);
        self.validate();
        Some(entry.resource)
    }

    // -----------------------------------------------------------------
    // References
    // -----------------------------------------------------------------

    /// Adds an external reference to a resource the caller already holds.
    ///
    /// Acquiring a reference to an *unreferenced* resource goes through
    /// the find-and-ref lookups, which also promote and restamp it.
    pub fn ref_resource(&mut self, id: ResourceId) {
        let entry = &mut self.entries[id];
        debug_assert!(
            entry.refs > 0,
            "ref_resource requires an outstanding reference"
        );
        entry.refs += 1;
    }

    /// Drops an external reference.
    ///
    /// When the last reference goes, the resource migrates to the
    /// purgeable heap, where it is kept for reuse or released according
    /// to its keys and the budget.
    pub fn unref_resource(&mut self, id: ResourceId) {
        let refs = {
            let entry = &mut self.entries[id];
            debug_assert!(entry.refs > 0, "unbalanced unref");
            entry.refs -= 1;
            entry.refs
        };
        if refs == 0 {
            self.notify_purgeable(id);
        }
    }

    // -----------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------

    /// Finds an idle resource under `key`, references it, and makes it
    /// most recently used.
    ///
    /// Resources with outstanding references or a unique key never
    /// qualify; `lookup` controls how pending GPU IO is treated.
    pub fn find_and_ref_scratch_resource(
        &mut self,
        key: &ScratchKey,
        lookup: ScratchLookup,
    ) -> Option<ResourceId> {
        if lookup != ScratchLookup::Any {
            if let Some(id) = self.find_scratch(key, true) {
                self.ref_and_make_mru(id);
                #[cfg(feature = "metrics")]
                self.metrics.record_scratch_find(true);
                self.validate();
                return Some(id);
            }
            if lookup == ScratchLookup::RequireNoPendingIo {
                #[cfg(feature = "metrics")]
                self.metrics.record_scratch_find(false);
                return None;
            }
            // TODO: if budget headroom remains, allocating fresh may beat
            // reusing a resource with pending IO. For now fall through to
            // any available match.
        }
        let found = self.find_scratch(key, false);
        if let Some(id) = found {
            self.ref_and_make_mru(id);
        }
        #[cfg(feature = "metrics")]
        self.metrics.record_scratch_find(found.is_some());
        self.validate();
        found
    }

    /// Finds the resource holding `key`, references it, and makes it most
    /// recently used.
    pub fn find_and_ref_unique_resource(&mut self, key: &UniqueKey) -> Option<ResourceId> {
        let found = self.unique_map.get(key).copied();
        if let Some(id) = found {
            self.ref_and_make_mru(id);
        }
        #[cfg(feature = "metrics")]
        self.metrics.record_unique_find(found.is_some());
        self.validate();
        found
    }

    // -----------------------------------------------------------------
    // Unique keys
    // -----------------------------------------------------------------

    /// Installs `new_key` on a resource, displacing any current holder.
    ///
    /// A displaced holder that is unreferenced and has no scratch key is
    /// released (nothing can reach it again); otherwise it merely loses
    /// the key.
    pub fn change_unique_key(&mut self, id: ResourceId, new_key: UniqueKey) {
        debug_assert!(self.entries.contains(id));
        debug_assert!(
            self.entries[id].budgeted,
            "uniquely keyed resources must be budgeted"
        );
        debug_assert!(!self.entries[id].wrapped);

        // Drop this resource's current key entry first; the index must be
        // consistent if displacing the other holder releases it below.
        if let Some(old_key) = self.entries[id].unique_key.take() {
            debug_assert_eq!(self.unique_map.get(&old_key), Some(&id));
            self.unique_map.remove(&old_key);
        }

        if let Some(other) = self.unique_map.get(&new_key).copied() {
            let (purgeable, has_scratch) = {
                let entry = &self.entries[other];
                (entry.refs == 0, entry.scratch_key.is_some())
            };
            if purgeable && !has_scratch {
                self.release_entry(other);
            } else {
                self.unique_map.remove(&new_key);
                self.entries[other].unique_key = None;
            }
        }

        self.entries[id].unique_key = Some(new_key.clone());
        self.unique_map.insert(new_key, id);
        self.validate();
    }

    /// Strips a resource's unique key.
    ///
    /// The caller may be holding the last reference just to invalidate;
    /// when it unrefs, the purgeable notification decides the resource's
    /// fate.
    pub fn remove_unique_key(&mut self, id: ResourceId) {
        if let Some(key) = self.entries[id].unique_key.take() {
            debug_assert_eq!(self.unique_map.get(&key), Some(&id));
            self.unique_map.remove(&key);
        }
        self.validate();
    }

    /// Applies a batch of invalidation messages.
    ///
    /// Each resolvable key is stripped from its resource; a resource that
    /// was only being kept alive by its content identity is released.
    /// Messages whose key no longer resolves are ignored.
    pub fn process_invalid_unique_keys(&mut self, messages: &[UniqueKeyInvalidatedMessage]) {
        for message in messages {
            let Some(id) = self.find_and_ref_unique_resource(message.key()) else {
                continue;
            };
            self.remove_unique_key(id);
            self.unref_resource(id); // may release via the purgeable path
        }
    }

    // -----------------------------------------------------------------
    // Budget updates
    // -----------------------------------------------------------------

    /// Reports that a resource's GPU footprint changed.
    ///
    /// `old_size` is the footprint last known to the cache. Adjusts the
    /// totals and purges if the growth pushed the cache over budget.
    pub fn resource_size_changed(&mut self, id: ResourceId, old_size: usize) {
        let (new_size, budgeted) = {
            let entry = &self.entries[id];
            (entry.resource.gpu_memory_size(), entry.budgeted)
        };
        self.bytes = self.bytes - old_size + new_size;
        if budgeted {
            self.budgeted_bytes = self.budgeted_bytes - old_size + new_size;
        }
        #[cfg(feature = "metrics")]
        self.metrics.record_totals(
            self.entries.len(),
            self.bytes,
            self.budgeted_count,
            self.budgeted_bytes,
        );
        self.purge_as_needed();
        self.validate();
    }

    /// Moves a resource into or out of the budget.
    pub fn set_budgeted(&mut self, id: ResourceId, budgeted: bool) {
        let size = {
            let entry = &mut self.entries[id];
            if entry.budgeted == budgeted {
                return;
            }
            debug_assert!(!entry.wrapped, "wrapped resources are never budgeted");
            entry.budgeted = budgeted;
            entry.resource.gpu_memory_size()
        };
        if budgeted {
            self.budgeted_count += 1;
            self.budgeted_bytes += size;
            #[cfg(feature = "metrics")]
            self.metrics.record_totals(
                self.entries.len(),
                self.bytes,
                self.budgeted_count,
                self.budgeted_bytes,
            );
            self.purge_as_needed();
        } else {
            debug_assert!(
                self.entries[id].unique_key.is_none(),
                "uniquely keyed resources must stay budgeted"
            );
            self.budgeted_count -= 1;
            self.budgeted_bytes -= size;
        }
        self.validate();
    }

    // -----------------------------------------------------------------
    // Purging
    // -----------------------------------------------------------------

    /// Releases every unreferenced resource, regardless of budget.
    pub fn purge_all_unlocked(&mut self) {
        while let Some(&id) = self.purgeable.peek() {
            self.release_entry(id);
        }
        self.validate();
    }

    /// Releases every resource, destroying GPU state.
    ///
    /// Afterwards all maps and counters are empty. Outstanding handles go
    /// stale.
    pub fn release_all(&mut self) {
        self.drain_all(false);
    }

    /// Drops every resource without GPU teardown (device lost).
    pub fn abandon_all(&mut self) {
        self.drain_all(true);
    }

    // -----------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------

    /// Returns the number of tracked resources.
    pub fn resource_count(&self) -> usize {
        self.entries.len()
    }

    /// Returns the total GPU bytes of tracked resources.
    pub fn resource_bytes(&self) -> usize {
        self.bytes
    }

    /// Returns the number of budgeted resources.
    pub fn budgeted_resource_count(&self) -> usize {
        self.budgeted_count
    }

    /// Returns the GPU bytes of budgeted resources.
    pub fn budgeted_resource_bytes(&self) -> usize {
        self.budgeted_bytes
    }

    /// Returns the count budget.
    pub fn max_resource_count(&self) -> usize {
        self.max_count
    }

    /// Returns the byte budget.
    pub fn max_resource_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Returns the number of unreferenced resources awaiting reuse.
    pub fn purgeable_resource_count(&self) -> usize {
        self.purgeable.len()
    }

    /// Returns `true` if the budgeted totals exceed either budget.
    pub fn is_over_budget(&self) -> bool {
        self.budgeted_bytes > self.max_bytes || self.budgeted_count > self.max_count
    }

    /// Returns `true` if `id` refers to a tracked resource.
    pub fn is_tracked(&self, id: ResourceId) -> bool {
        self.entries.contains(id)
    }

    /// Returns whether the resource has no outstanding references.
    pub fn is_purgeable(&self, id: ResourceId) -> Option<bool> {
        self.entries.get(id).map(|entry| entry.refs == 0)
    }

    /// Returns whether the resource counts against the budgets.
    pub fn is_budgeted(&self, id: ResourceId) -> Option<bool> {
        self.entries.get(id).map(|entry| entry.budgeted)
    }

    /// Returns whether the resource's GPU state is externally owned.
    pub fn is_wrapped(&self, id: ResourceId) -> Option<bool> {
        self.entries.get(id).map(|entry| entry.wrapped)
    }

    /// Returns the resource behind `id`, if still tracked.
    pub fn resource(&self, id: ResourceId) -> Option<&R> {
        self.entries.get(id).map(|entry| &entry.resource)
    }

    /// Returns the resource behind `id` mutably, if still tracked.
    ///
    /// Callers changing the GPU footprint must follow up with
    /// [`resource_size_changed`](Self::resource_size_changed).
    pub fn resource_mut(&mut self, id: ResourceId) -> Option<&mut R> {
        self.entries.get_mut(id).map(|entry| &mut entry.resource)
    }

    /// Returns the resource's scratch key, if tracked and present.
    pub fn scratch_key(&self, id: ResourceId) -> Option<&ScratchKey> {
        self.entries.get(id)?.scratch_key.as_ref()
    }

    /// Returns the resource's unique key, if tracked and present.
    pub fn unique_key(&self, id: ResourceId) -> Option<&UniqueKey> {
        self.entries.get(id)?.unique_key.as_ref()
    }

    /// Returns the resource's LRU timestamp. Diagnostic.
    pub fn resource_timestamp(&self, id: ResourceId) -> Option<u32> {
        self.entries.get(id).map(|entry| entry.timestamp)
    }

    /// Returns the number of scratch index entries.
    pub fn scratch_entry_count(&self) -> usize {
        self.scratch_map.len()
    }

    /// Returns the number of installed unique keys.
    pub fn unique_key_count(&self) -> usize {
        self.unique_map.len()
    }

    /// Returns the collected statistics.
    #[cfg(feature = "metrics")]
    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    fn find_scratch(&self, key: &ScratchKey, reject_pending_io: bool) -> Option<ResourceId> {
        let entries = &self.entries;
        self.scratch_map
            .find(key, |&id| {
                let entry = &entries[id];
                entry.refs == 0
                    && entry.unique_key.is_none()
                    && (!reject_pending_io || !entry.resource.has_pending_io())
            })
            .copied()
    }

    fn ref_and_make_mru(&mut self, id: ResourceId) {
        if self.entries[id].refs == 0 {
            // About to become nonpurgeable.
            self.purgeable.remove(&mut self.entries, id);
            self.add_to_nonpurgeable(id);
        }
        self.entries[id].refs += 1;
        let timestamp = self.next_timestamp();
        self.entries[id].timestamp = timestamp;
    }

    /// The last external reference is gone; keep the resource for reuse
    /// or release it, per its keys and the budget.
    fn notify_purgeable(&mut self, id: ResourceId) {
        debug_assert_eq!(self.entries[id].refs, 0);
        self.remove_from_nonpurgeable(id);
        self.purgeable.insert(&mut self.entries, id);

        let (size, budgeted, wrapped, has_scratch, has_unique) = {
            let entry = &self.entries[id];
            (
                entry.resource.gpu_memory_size(),
                entry.budgeted,
                entry.wrapped,
                entry.scratch_key.is_some(),
                entry.unique_key.is_some(),
            )
        };

        if !budgeted {
            // An unbudgeted resource can earn its keep as scratch, but
            // never by purging an existing resource to make room for it.
            if !wrapped
                && has_scratch
                && self.budgeted_count < self.max_count
                && self.budgeted_bytes + size <= self.max_bytes
            {
                self.entries[id].budgeted = true;
                self.budgeted_count += 1;
                self.budgeted_bytes += size;
                #[cfg(feature = "metrics")]
                self.metrics.record_totals(
                    self.entries.len(),
                    self.bytes,
                    self.budgeted_count,
                    self.budgeted_bytes,
                );
                self.validate();
                return;
            }
        } else {
            // Keep it only if it is reachable by some key and the cache
            // has room.
            let no_key = !has_scratch && !has_unique;
            if !self.is_over_budget() && !no_key {
                self.validate();
                return;
            }
        }

        self.release_entry(id);
        self.validate();
    }

    fn purge_as_needed(&mut self) {
        if !self.is_over_budget() {
            return;
        }
        let mut still_over_budget = true;
        while let Some(&id) = self.purgeable.peek() {
            self.release_entry(id);
            if !self.is_over_budget() {
                still_over_budget = false;
                break;
            }
        }
        self.validate();

        if still_over_budget {
            // The heap is drained and we are still over budget. Any
            // references the callback drops come back as purgeable
            // notifications. Taking the callback out keeps a reentrant
            // purge from invoking it again.
            if let Some(mut callback) = self.over_budget_callback.take() {
                callback(self);
                self.over_budget_callback = Some(callback);
                self.validate();
            }
        }
    }

    fn release_entry(&mut self, id: ResourceId) {
        // Bookkeeping first; teardown may drop dependent objects.
        let mut entry = self.detach(id);
        #[cfg(feature = "metrics")]
        self.metrics.record_release(entry.resource.gpu_memory_size());
        entry.resource.release();
    }

    fn abandon_entry(&mut self, id: ResourceId) {
        let mut entry = self.detach(id);
        entry.resource.abandon();
    }

    /// Removes `id` from its partition, the key indexes, and the totals.
    fn detach(&mut self, id: ResourceId) -> Entry<R> {
        if self.entries[id].refs == 0 {
            self.purgeable.remove(&mut self.entries, id);
        } else {
            self.remove_from_nonpurgeable(id);
        }
        let entry = self.entries.remove(id).expect("tracked resource");

        let size = entry.resource.gpu_memory_size();
        self.bytes -= size;
        if entry.budgeted {
            self.budgeted_count -= 1;
            self.budgeted_bytes -= size;
        }
        if let Some(key) = &entry.scratch_key {
            self.scratch_map.remove(key, &id);
        }
        if let Some(key) = &entry.unique_key {
            self.unique_map.remove(key);
        }
        entry
    }

    fn drain_all(&mut self, abandon: bool) {
        while let Some(&id) = self.nonpurgeable.last() {
            if abandon {
                self.abandon_entry(id);
            } else {
                self.release_entry(id);
            }
        }
        while let Some(&id) = self.purgeable.peek() {
            if abandon {
                self.abandon_entry(id);
            } else {
                self.release_entry(id);
            }
        }
        debug_assert!(self.scratch_map.is_empty());
        debug_assert!(self.unique_map.is_empty());
        debug_assert_eq!(self.entries.len(), 0);
        debug_assert_eq!(self.bytes, 0);
        debug_assert_eq!(self.budgeted_count, 0);
        debug_assert_eq!(self.budgeted_bytes, 0);
        self.validate();
    }

    fn add_to_nonpurgeable(&mut self, id: ResourceId) {
        let index = self.nonpurgeable.len() as i32;
        self.nonpurgeable.push(id);
        self.entries[id].index = index;
    }

    fn remove_from_nonpurgeable(&mut self, id: ResourceId) {
        let index = self.entries[id].index;
        debug_assert!(index >= 0);
        let index = index as usize;
        debug_assert_eq!(self.nonpurgeable[index], id);

        // Fill the hole with the tail entry, fix its stored index, pop.
        let tail = self.nonpurgeable[self.nonpurgeable.len() - 1];
        self.nonpurgeable[index] = tail;
        self.entries[tail].index = index as i32;
        self.nonpurgeable.pop();
        self.entries[id].index = NOT_IN_PARTITION;
    }

    fn next_timestamp(&mut self) -> u32 {
        // Zero means the previous allocation wrapped; survivors of the
        // wrap would look newer than anything stamped after it, so
        // renumber everything first.
        if self.timestamp == 0 {
            self.recover_timestamps();
        }
        let timestamp = self.timestamp;
        self.timestamp = self.timestamp.wrapping_add(1);
        timestamp
    }

    /// Renumbers all tracked resources densely from 0 in current LRU
    /// order. O(n log n), expected to be rare.
    fn recover_timestamps(&mut self) {
        let count = self.entries.len();
        if count == 0 {
            return;
        }

        // Heap pops in timestamp order; the array needs an explicit sort.
        let mut sorted_purgeable = Vec::with_capacity(self.purgeable.len());
        while let Some(id) = self.purgeable.pop(&mut self.entries) {
            sorted_purgeable.push(id);
        }
        let entries = &self.entries;
        self.nonpurgeable.sort_by_key(|&id| entries[id].timestamp);

        // Merge-walk both sorted sequences, assigning 0, 1, 2, ... and
        // re-pointing nonpurgeable back-indices at their post-sort slots.
        let mut purgeable_at = 0;
        let mut nonpurgeable_at = 0;
        while purgeable_at < sorted_purgeable.len() && nonpurgeable_at < self.nonpurgeable.len() {
            let purgeable_ts = self.entries[sorted_purgeable[purgeable_at]].timestamp;
            let nonpurgeable_ts = self.entries[self.nonpurgeable[nonpurgeable_at]].timestamp;
            debug_assert_ne!(purgeable_ts, nonpurgeable_ts);
            if purgeable_ts < nonpurgeable_ts {
                self.entries[sorted_purgeable[purgeable_at]].timestamp = self.timestamp;
                purgeable_at += 1;
            } else {
                let id = self.nonpurgeable[nonpurgeable_at];
                let entry = &mut self.entries[id];
                entry.index = nonpurgeable_at as i32;
                entry.timestamp = self.timestamp;
                nonpurgeable_at += 1;
            }
            self.timestamp += 1;
        }
        while purgeable_at < sorted_purgeable.len() {
            self.entries[sorted_purgeable[purgeable_at]].timestamp = self.timestamp;
            purgeable_at += 1;
            self.timestamp += 1;
        }
        while nonpurgeable_at < self.nonpurgeable.len() {
            let id = self.nonpurgeable[nonpurgeable_at];
            let entry = &mut self.entries[id];
            entry.index = nonpurgeable_at as i32;
            entry.timestamp = self.timestamp;
            nonpurgeable_at += 1;
            self.timestamp += 1;
        }

        for id in sorted_purgeable {
            self.purgeable.insert(&mut self.entries, id);
        }

        debug_assert_eq!(self.timestamp as usize, count);
        self.validate();
    }

    #[inline]
    fn validate(&self) {
        #[cfg(debug_assertions)]
        self.validate_sampled();
    }

    /// Validates on a subset of calls; large caches validate less often.
    /// A deterministic tick stands in for the usual random mask, keeping
    /// the amortized cost while staying reproducible.
    #[cfg(debug_assertions)]
    fn validate_sampled(&self) {
        let count = self.entries.len() as u32;
        let mask = ((count + 1).next_power_of_two() >> 5).wrapping_sub(1);
        let tick = self.validate_tick.get();
        self.validate_tick.set(tick.wrapping_add(1));
        if mask != u32::MAX && (tick & mask) != 0 {
            return;
        }
        if let Err(err) = self.check_invariants() {
            panic!("resource cache invariant violated: {err}");
        }
    }

    /// Walks both partitions and every index, recomputing all totals.
    ///
    /// Returns the first violated invariant. Debug and test builds only.
    #[cfg(any(test, debug_assertions))]
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        fn fail<T>(msg: String) -> Result<T, InvariantError> {
            Err(InvariantError::new(msg))
        }

        let mut bytes = 0usize;
        let mut budgeted_count = 0usize;
        let mut budgeted_bytes = 0usize;
        let mut scratch_keyed = 0usize;
        let mut unique_keyed = 0usize;
        let mut timestamps = FxHashSet::default();

        for (id, entry) in self.entries.iter() {
            let size = entry.resource.gpu_memory_size();
            bytes += size;
            if entry.budgeted {
                budgeted_count += 1;
                budgeted_bytes += size;
            }
            if entry.wrapped && entry.budgeted {
                return fail(format!("wrapped resource {id:?} is budgeted"));
            }
            if let Some(key) = &entry.scratch_key {
                scratch_keyed += 1;
                if entry.wrapped {
                    return fail(format!("wrapped resource {id:?} has a scratch key"));
                }
                if self.scratch_map.find(key, |&v| v == id).is_none() {
                    return fail(format!("resource {id:?} missing from scratch map"));
                }
            }
            if let Some(key) = &entry.unique_key {
                unique_keyed += 1;
                if entry.wrapped {
                    return fail(format!("wrapped resource {id:?} has a unique key"));
                }
                if !entry.budgeted {
                    return fail(format!("unique key on unbudgeted resource {id:?}"));
                }
                if self.unique_map.get(key) != Some(&id) {
                    return fail(format!("unique map does not point at resource {id:?}"));
                }
            }
            if !timestamps.insert(entry.timestamp) {
                return fail(format!("duplicate timestamp {}", entry.timestamp));
            }
        }

        if self.nonpurgeable.len() + self.purgeable.len() != self.entries.len() {
            return fail(format!(
                "partition sizes {} + {} do not cover {} tracked resources",
                self.nonpurgeable.len(),
                self.purgeable.len(),
                self.entries.len()
            ));
        }
        for (pos, &id) in self.nonpurgeable.iter().enumerate() {
            let Some(entry) = self.entries.get(id) else {
                return fail(format!("nonpurgeable array references untracked {id:?}"));
            };
            if entry.refs == 0 {
                return fail(format!("unreferenced resource {id:?} in nonpurgeable array"));
            }
            if entry.index != pos as i32 {
                return fail(format!(
                    "back-index {} of {id:?} does not match array slot {pos}",
                    entry.index
                ));
            }
        }
        for (pos, &id) in self.purgeable.iter().enumerate() {
            let Some(entry) = self.entries.get(id) else {
                return fail(format!("purgeable heap references untracked {id:?}"));
            };
            if entry.refs != 0 {
                return fail(format!("referenced resource {id:?} in purgeable heap"));
            }
            if entry.index != pos as i32 {
                return fail(format!(
                    "back-index {} of {id:?} does not match heap slot {pos}",
                    entry.index
                ));
            }
            if pos > 0 {
                let parent = *self.purgeable.at((pos - 1) / 2);
                if self.entries[parent].timestamp > entry.timestamp {
                    return fail(format!("heap property violated at slot {pos}"));
                }
            }
        }

        if bytes != self.bytes {
            return fail(format!("byte total {} != recomputed {bytes}", self.bytes));
        }
        if budgeted_count != self.budgeted_count {
            return fail(format!(
                "budgeted count {} != recomputed {budgeted_count}",
                self.budgeted_count
            ));
        }
        if budgeted_bytes != self.budgeted_bytes {
            return fail(format!(
                "budgeted bytes {} != recomputed {budgeted_bytes}",
                self.budgeted_bytes
            ));
        }
        if scratch_keyed != self.scratch_map.len() {
            return fail(format!(
                "scratch map holds {} entries for {scratch_keyed} scratch-keyed resources",
                self.scratch_map.len()
            ));
        }
        if unique_keyed != self.unique_map.len() {
            return fail(format!(
                "unique map holds {} entries for {unique_keyed} keyed resources",
                self.unique_map.len()
            ));
        }
        Ok(())
    }

    #[cfg(test)]
    fn set_next_timestamp(&mut self, timestamp: u32) {
        self.timestamp = timestamp;
    }

    #[cfg(test)]
    fn timestamp_counter(&self) -> u32 {
        self.timestamp
    }
}

impl<R: GpuResource> Default for ResourceCache<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: GpuResource> Drop for ResourceCache<R> {
    fn drop(&mut self) {
        self.release_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{Domain, ResourceType};
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum State {
        Live,
        Released,
        Abandoned,
    }

    struct TestResource {
        size: usize,
        pending_io: bool,
        state: Rc<Cell<State>>,
    }

    impl TestResource {
        fn new(size: usize) -> (Self, Rc<Cell<State>>) {
            let state = Rc::new(Cell::new(State::Live));
            (
                Self {
                    size,
                    pending_io: false,
                    state: Rc::clone(&state),
                },
                state,
            )
        }
    }

    impl GpuResource for TestResource {
        fn gpu_memory_size(&self) -> usize {
            self.size
        }

        fn has_pending_io(&self) -> bool {
            self.pending_io
        }

        fn release(&mut self) {
            self.state.set(State::Released);
        }

        fn abandon(&mut self) {
            self.state.set(State::Abandoned);
        }
    }

    fn scratch_key() -> ScratchKey {
        ScratchKey::new(ResourceType::generate(), &[16, 16])
    }

    #[test]
    fn test_insert_starts_nonpurgeable() {
        let mut cache = ResourceCache::new();
        let (resource, _state) = TestResource::new(100);

        let id = cache.insert(resource, ResourceOptions::budgeted());

        assert!(cache.is_tracked(id));
        assert_eq!(cache.is_purgeable(id), Some(false));
        assert_eq!(cache.resource_count(), 1);
        assert_eq!(cache.resource_bytes(), 100);
        assert_eq!(cache.budgeted_resource_count(), 1);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn test_unref_parks_keyed_resource() {
        let mut cache = ResourceCache::new();
        let key = scratch_key();
        let (resource, state) = TestResource::new(100);

        let id = cache.insert(resource, ResourceOptions::scratch(key));
        cache.unref_resource(id);

        assert_eq!(cache.is_purgeable(id), Some(true));
        assert_eq!(state.get(), State::Live);
        assert_eq!(cache.purgeable_resource_count(), 1);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn test_unref_releases_keyless_resource() {
        let mut cache = ResourceCache::new();
        let (resource, state) = TestResource::new(100);

        // Budgeted but reachable by no key: nothing can ever find it.
        let id = cache.insert(resource, ResourceOptions::budgeted());
        cache.unref_resource(id);

        assert!(!cache.is_tracked(id));
        assert_eq!(state.get(), State::Released);
        assert_eq!(cache.resource_count(), 0);
    }

    #[test]
    fn test_scratch_reuse_promotes_and_restamps() {
        let mut cache = ResourceCache::new();
        let key = scratch_key();
        let (resource, _state) = TestResource::new(100);

        let id = cache.insert(resource, ResourceOptions::scratch(key.clone()));
        let stamped = cache.resource_timestamp(id).unwrap();
        cache.unref_resource(id);

        let found = cache.find_and_ref_scratch_resource(&key, ScratchLookup::Any);
        assert_eq!(found, Some(id));
        assert_eq!(cache.is_purgeable(id), Some(false));
        assert!(cache.resource_timestamp(id).unwrap() > stamped);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn test_referenced_resource_is_not_scratch_candidate() {
        let mut cache = ResourceCache::new();
        let key = scratch_key();
        let (resource, _state) = TestResource::new(100);

        let _id = cache.insert(resource, ResourceOptions::scratch(key.clone()));

        // Still referenced by the inserter.
        assert_eq!(
            cache.find_and_ref_scratch_resource(&key, ScratchLookup::Any),
            None
        );
    }

    #[test]
    fn test_unbudgeted_scratch_adopted_when_budget_allows() {
        let mut cache = ResourceCache::with_budgets(4, 1024);
        let key = scratch_key();
        let (resource, state) = TestResource::new(100);

        let id = cache.insert(
            resource,
            ResourceOptions::unbudgeted().with_scratch_key(key),
        );
        assert_eq!(cache.budgeted_resource_count(), 0);

        cache.unref_resource(id);

        assert!(cache.is_tracked(id));
        assert_eq!(state.get(), State::Live);
        assert_eq!(cache.budgeted_resource_count(), 1);
        assert_eq!(cache.budgeted_resource_bytes(), 100);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn test_unbudgeted_scratch_released_when_budget_full() {
        let mut cache = ResourceCache::with_budgets(4, 150);

        let (filler, _filler_state) = TestResource::new(100);
        let _filler_id = cache.insert(filler, ResourceOptions::budgeted());

        let (resource, state) = TestResource::new(100);
        let id = cache.insert(
            resource,
            ResourceOptions::unbudgeted().with_scratch_key(scratch_key()),
        );

        // 100 budgeted bytes held; adopting 100 more would exceed 150.
        cache.unref_resource(id);

        assert!(!cache.is_tracked(id));
        assert_eq!(state.get(), State::Released);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn test_wrapped_resource_released_on_unref() {
        let mut cache = ResourceCache::new();
        let (resource, state) = TestResource::new(100);

        let id = cache.insert(resource, ResourceOptions::wrapped());
        cache.unref_resource(id);

        assert!(!cache.is_tracked(id));
        // The cache calls release; a wrapped impl drops only its borrow.
        assert_eq!(state.get(), State::Released);
    }

    #[test]
    fn test_over_budget_callback_runs_once_per_purge() {
        let mut cache: ResourceCache<TestResource> = ResourceCache::with_budgets(1, 1 << 20);
        let calls = Rc::new(Cell::new(0u32));
        let victims: Rc<std::cell::RefCell<Vec<ResourceId>>> =
            Rc::new(std::cell::RefCell::new(Vec::new()));

        let cb_calls = Rc::clone(&calls);
        let cb_victims = Rc::clone(&victims);
        cache.set_over_budget_callback(move |cache| {
            cb_calls.set(cb_calls.get() + 1);
            if let Some(id) = cb_victims.borrow_mut().pop() {
                cache.unref_resource(id);
            }
        });

        let (first, first_state) = TestResource::new(100);
        let first_id = cache.insert(first, ResourceOptions::scratch(scratch_key()));
        victims.borrow_mut().push(first_id);

        // Second insert overflows the count budget while everything is
        // still referenced: the heap drains empty and the callback fires.
        let (second, _second_state) = TestResource::new(100);
        let _second_id = cache.insert(second, ResourceOptions::scratch(scratch_key()));

        assert_eq!(calls.get(), 1);
        // The dropped reference came back as notify-purgeable and, with
        // the cache over budget, was released on the spot.
        assert_eq!(first_state.get(), State::Released);
        assert_eq!(cache.resource_count(), 1);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn test_wrap_recovery_renumbers_two_resources() {
        let mut cache = ResourceCache::new();
        cache.set_next_timestamp(u32::MAX);

        let (r1, _s1) = TestResource::new(10);
        let (r2, _s2) = TestResource::new(10);
        let id1 = cache.insert(r1, ResourceOptions::scratch(scratch_key()));
        // id1 was stamped u32::MAX; the counter wrapped to 0, so this
        // insert runs recovery before stamping.
        let id2 = cache.insert(r2, ResourceOptions::scratch(scratch_key()));

        assert_eq!(cache.resource_timestamp(id1), Some(0));
        assert_eq!(cache.resource_timestamp(id2), Some(1));
        assert_eq!(cache.timestamp_counter(), 2);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn test_wrap_recovery_preserves_order_across_partitions() {
        let mut cache = ResourceCache::new();

        let mut ids = Vec::new();
        for _ in 0..6 {
            let (resource, _state) = TestResource::new(10);
            ids.push(cache.insert(resource, ResourceOptions::scratch(scratch_key())));
        }
        // Park every other resource in the heap.
        for &id in ids.iter().step_by(2) {
            cache.unref_resource(id);
        }

        cache.set_next_timestamp(u32::MAX);
        let (trigger, _trigger_state) = TestResource::new(10);
        let trigger_id = cache.insert(trigger, ResourceOptions::scratch(scratch_key()));
        assert_eq!(cache.resource_timestamp(trigger_id), Some(u32::MAX));

        let (after, _after_state) = TestResource::new(10);
        let after_id = cache.insert(after, ResourceOptions::scratch(scratch_key()));

        // Dense from 0, insertion order preserved, counter past the end.
        for (expected, &id) in ids.iter().enumerate() {
            assert_eq!(cache.resource_timestamp(id), Some(expected as u32));
        }
        assert_eq!(cache.resource_timestamp(trigger_id), Some(6));
        assert_eq!(cache.resource_timestamp(after_id), Some(7));
        assert_eq!(cache.timestamp_counter(), 8);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn test_change_unique_key_releases_unreachable_holder() {
        let mut cache = ResourceCache::new();
        let domain = Domain::generate();
        let unique = UniqueKey::new(domain, &[1]);

        let (r1, s1) = TestResource::new(100);
        let id1 = cache.insert(r1, ResourceOptions::budgeted());
        cache.change_unique_key(id1, unique.clone());
        cache.unref_resource(id1); // purgeable, no scratch key

        let (r2, _s2) = TestResource::new(100);
        let id2 = cache.insert(r2, ResourceOptions::budgeted());
        cache.change_unique_key(id2, unique.clone());

        assert!(!cache.is_tracked(id1));
        assert_eq!(s1.get(), State::Released);
        assert_eq!(cache.find_and_ref_unique_resource(&unique), Some(id2));
        cache.check_invariants().unwrap();
    }

    #[test]
    fn test_change_unique_key_strips_reachable_holder() {
        let mut cache = ResourceCache::new();
        let domain = Domain::generate();
        let unique = UniqueKey::new(domain, &[1]);

        let (r1, s1) = TestResource::new(100);
        // Scratch-keyed: still reachable after losing the unique key.
        let id1 = cache.insert(r1, ResourceOptions::scratch(scratch_key()));
        cache.change_unique_key(id1, unique.clone());
        cache.unref_resource(id1);

        let (r2, _s2) = TestResource::new(100);
        let id2 = cache.insert(r2, ResourceOptions::budgeted());
        cache.change_unique_key(id2, unique.clone());

        assert!(cache.is_tracked(id1));
        assert_eq!(s1.get(), State::Live);
        assert_eq!(cache.unique_key(id1), None);
        assert_eq!(cache.unique_key(id2), Some(&unique));
        cache.check_invariants().unwrap();
    }

    #[test]
    fn test_rekeying_same_resource_moves_the_index() {
        let mut cache = ResourceCache::new();
        let domain = Domain::generate();
        let first = UniqueKey::new(domain, &[1]);
        let second = UniqueKey::new(domain, &[2]);

        let (resource, _state) = TestResource::new(100);
        let id = cache.insert(resource, ResourceOptions::budgeted());
        cache.change_unique_key(id, first.clone());
        cache.change_unique_key(id, second.clone());

        assert_eq!(cache.unique_key_count(), 1);
        assert_eq!(cache.find_and_ref_unique_resource(&second), Some(id));
        assert_eq!(cache.find_and_ref_unique_resource(&first), None);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn test_purge_all_unlocked_spares_referenced() {
        let mut cache = ResourceCache::new();
        let (kept, kept_state) = TestResource::new(100);
        let (purged, purged_state) = TestResource::new(100);

        let _kept_id = cache.insert(kept, ResourceOptions::scratch(scratch_key()));
        let purged_id = cache.insert(purged, ResourceOptions::scratch(scratch_key()));
        cache.unref_resource(purged_id);

        cache.purge_all_unlocked();

        assert_eq!(kept_state.get(), State::Live);
        assert_eq!(purged_state.get(), State::Released);
        assert_eq!(cache.resource_count(), 1);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn test_release_all_and_abandon_all_zero_everything() {
        for abandon in [false, true] {
            let mut cache = ResourceCache::new();
            let domain = Domain::generate();
            let mut states = Vec::new();

            for i in 0..4 {
                let (resource, state) = TestResource::new(50);
                let id = cache.insert(resource, ResourceOptions::scratch(scratch_key()));
                if i == 0 {
                    cache.change_unique_key(id, UniqueKey::new(domain, &[i]));
                }
                if i % 2 == 0 {
                    cache.unref_resource(id);
                }
                states.push(state);
            }

            if abandon {
                cache.abandon_all();
            } else {
                cache.release_all();
            }

            let expected = if abandon {
                State::Abandoned
            } else {
                State::Released
            };
            assert!(states.iter().all(|s| s.get() == expected));
            assert_eq!(cache.resource_count(), 0);
            assert_eq!(cache.resource_bytes(), 0);
            assert_eq!(cache.scratch_entry_count(), 0);
            assert_eq!(cache.unique_key_count(), 0);
            cache.check_invariants().unwrap();
        }
    }

    #[test]
    fn test_remove_returns_resource_without_release() {
        let mut cache = ResourceCache::new();
        let (resource, state) = TestResource::new(100);

        let id = cache.insert(resource, ResourceOptions::wrapped());
        let resource = cache.remove(id).unwrap();

        assert_eq!(state.get(), State::Live);
        assert_eq!(resource.gpu_memory_size(), 100);
        assert_eq!(cache.resource_count(), 0);
        assert!(cache.remove(id).is_none());
        cache.check_invariants().unwrap();
    }

    #[test]
    fn test_resource_size_changed_adjusts_totals() {
        let mut cache = ResourceCache::new();
        let (resource, _state) = TestResource::new(100);

        let id = cache.insert(resource, ResourceOptions::budgeted());
        cache.resource_mut(id).unwrap().size = 250;
        cache.resource_size_changed(id, 100);

        assert_eq!(cache.resource_bytes(), 250);
        assert_eq!(cache.budgeted_resource_bytes(), 250);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn test_set_budgeted_toggles_totals() {
        let mut cache = ResourceCache::new();
        let (resource, _state) = TestResource::new(100);

        let id = cache.insert(resource, ResourceOptions::unbudgeted());
        assert_eq!(cache.budgeted_resource_count(), 0);

        cache.set_budgeted(id, true);
        assert_eq!(cache.budgeted_resource_count(), 1);
        assert_eq!(cache.budgeted_resource_bytes(), 100);

        cache.set_budgeted(id, false);
        assert_eq!(cache.budgeted_resource_count(), 0);
        assert_eq!(cache.budgeted_resource_bytes(), 0);
        cache.check_invariants().unwrap();
    }
}
