pub use crate::builder::CacheBuilder;
pub use crate::bus::{InvalidationBus, InvalidationSender, UniqueKeyInvalidatedMessage};
pub use crate::cache::{ResourceCache, ScratchLookup, DEFAULT_MAX_BYTES, DEFAULT_MAX_COUNT};
pub use crate::key::{Domain, ResourceType, ScratchKey, UniqueKey};
pub use crate::resource::{GpuResource, ResourceId, ResourceOptions};

#[cfg(feature = "metrics")]
pub use crate::metrics::CacheMetrics;
