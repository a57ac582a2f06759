//! gpucache: budgeted tracking and reuse of GPU-backed resources.
//!
//! See `DESIGN.md` for internal architecture and invariants.

pub mod ds;

pub mod builder;
pub mod bus;
pub mod cache;
pub mod error;
pub mod key;
pub mod prelude;
pub mod resource;

#[cfg(feature = "metrics")]
pub mod metrics;
