//! Builder for [`ResourceCache`] configuration.
//!
//! Budgets can always be changed later with
//! [`ResourceCache::set_limits`](crate::cache::ResourceCache::set_limits);
//! the builder exists so construction sites read declaratively and so
//! user-supplied budgets can be validated up front.
//!
//! ## Example
//!
//! ```
//! use gpucache::builder::CacheBuilder;
//! use gpucache::resource::GpuResource;
//!
//! struct Buffer(usize);
//!
//! impl GpuResource for Buffer {
//!     fn gpu_memory_size(&self) -> usize { self.0 }
//!     fn release(&mut self) {}
//!     fn abandon(&mut self) {}
//! }
//!
//! let cache = CacheBuilder::new()
//!     .max_count(512)
//!     .max_bytes(32 << 20)
//!     .build::<Buffer>();
//! assert_eq!(cache.max_resource_count(), 512);
//! ```

use crate::cache::{ResourceCache, DEFAULT_MAX_BYTES, DEFAULT_MAX_COUNT};
use crate::error::ConfigError;
use crate::resource::GpuResource;

/// Configures and constructs a [`ResourceCache`].
#[derive(Debug, Clone)]
pub struct CacheBuilder {
    max_count: usize,
    max_bytes: usize,
}

impl CacheBuilder {
    /// Starts from the default budgets (2048 resources, 96 MiB).
    pub fn new() -> Self {
        Self {
            max_count: DEFAULT_MAX_COUNT,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }

    /// Sets the maximum number of budgeted resources.
    pub fn max_count(mut self, max_count: usize) -> Self {
        self.max_count = max_count;
        self
    }

    /// Sets the maximum budgeted bytes.
    pub fn max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Checks the configured budgets.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_count == 0 {
            return Err(ConfigError::new("max_count must be non-zero"));
        }
        if self.max_bytes == 0 {
            return Err(ConfigError::new("max_bytes must be non-zero"));
        }
        Ok(())
    }

    /// Builds the cache with the configured budgets as-is.
    pub fn build<R: GpuResource>(self) -> ResourceCache<R> {
        ResourceCache::with_budgets(self.max_count, self.max_bytes)
    }

    /// Builds the cache, rejecting degenerate budgets.
    pub fn try_build<R: GpuResource>(self) -> Result<ResourceCache<R>, ConfigError> {
        self.validate()?;
        Ok(self.build())
    }
}

impl Default for CacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}
