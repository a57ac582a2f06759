//! Key types identifying cached GPU resources.
//!
//! Two key spaces with different uniqueness semantics:
//!
//! - [`ScratchKey`]: identifies a pool of interchangeable resources (e.g.
//!   "256x256 RGBA8 texture"). Many resources may carry the same scratch
//!   key, and any one of them satisfies a lookup.
//! - [`UniqueKey`]: identifies resource *content* (e.g. "mipmapped copy of
//!   bitmap 7"). At most one resource in the cache holds a given unique
//!   key at a time.
//!
//! Both key kinds pair an opaque `u32`-word payload with a 16-bit tag that
//! namespaces the payload: a [`ResourceType`] for scratch keys and a
//! [`Domain`] for unique keys. Tags are allocated process-wide and
//! monotonically; subsystems call [`ResourceType::generate`] /
//! [`Domain::generate`] once at startup and build all their keys under the
//! returned tag. Exhausting the 16-bit tag space is a fatal configuration
//! error and panics.
//!
//! ## Example Usage
//!
//! ```
//! use gpucache::key::{Domain, ResourceType, ScratchKey, UniqueKey};
//!
//! let textures = ResourceType::generate();
//! // width, height, format word
//! let key_a = ScratchKey::new(textures, &[256, 256, 0x8058]);
//! let key_b = ScratchKey::new(textures, &[256, 256, 0x8058]);
//! assert_eq!(key_a, key_b);
//!
//! let bitmaps = Domain::generate();
//! let content = UniqueKey::new(bitmaps, &[7, 0]);
//! assert_eq!(content.domain(), bitmaps);
//! ```

use std::sync::atomic::{AtomicU32, Ordering};

// Tag 0 is never produced; both allocators start at 1.
static NEXT_RESOURCE_TYPE: AtomicU32 = AtomicU32::new(1);
static NEXT_DOMAIN: AtomicU32 = AtomicU32::new(1);

fn allocate_tag(counter: &AtomicU32, space: &str) -> u16 {
    let raw = counter.fetch_add(1, Ordering::Relaxed);
    if raw > u16::MAX as u32 {
        panic!("{space} tag space exhausted (more than {} allocated)", u16::MAX);
    }
    raw as u16
}

/// Process-wide tag namespacing [`ScratchKey`] payloads.
///
/// Two scratch keys compare equal only if they were built under the same
/// resource type, so independently chosen payload encodings cannot collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceType(u16);

impl ResourceType {
    /// Allocates a fresh resource type.
    ///
    /// # Panics
    ///
    /// Panics when more than `u16::MAX` types have been allocated.
    pub fn generate() -> Self {
        ResourceType(allocate_tag(&NEXT_RESOURCE_TYPE, "scratch resource type"))
    }
}

/// Process-wide tag namespacing [`UniqueKey`] payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Domain(u16);

impl Domain {
    /// Allocates a fresh unique-key domain.
    ///
    /// # Panics
    ///
    /// Panics when more than `u16::MAX` domains have been allocated.
    pub fn generate() -> Self {
        Domain(allocate_tag(&NEXT_DOMAIN, "unique-key domain"))
    }
}

/// Key identifying a pool of interchangeable scratch resources.
///
/// Equality covers the resource type and the full payload. The payload is
/// opaque to the cache; callers encode dimensions, formats, sample counts
/// and similar into it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScratchKey {
    resource_type: ResourceType,
    data: Box<[u32]>,
}

impl ScratchKey {
    /// Builds a scratch key from a resource type and payload words.
    pub fn new(resource_type: ResourceType, data: &[u32]) -> Self {
        Self {
            resource_type,
            data: data.into(),
        }
    }

    /// Returns the resource type this key was built under.
    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// Returns the payload words.
    pub fn data(&self) -> &[u32] {
        &self.data
    }
}

/// Key identifying singleton resource content.
///
/// The cache guarantees at most one tracked resource holds a given unique
/// key; installing a key on a second resource displaces the first holder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniqueKey {
    domain: Domain,
    data: Box<[u32]>,
}

impl UniqueKey {
    /// Builds a unique key from a domain and payload words.
    pub fn new(domain: Domain, data: &[u32]) -> Self {
        Self {
            domain,
            data: data.into(),
        }
    }

    /// Returns the domain this key was built under.
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Returns the payload words.
    pub fn data(&self) -> &[u32] {
        &self.data
    }
}
