//! Opened-slide handles and the bounded slide cache.
//!
//! [`SlideCache`] is the entry point for slide requests: it opens slides
//! through the decode backend on demand, derives per-slide display metadata
//! and the color transform exactly once, and keeps a bounded
//! least-recently-used set of handles alive. A single backend-managed pixel
//! cache is shared across every cached slide so total decoded-pixel memory
//! stays bounded regardless of how many slides are open.

mod cache;
mod handle;

pub use cache::SlideCache;
pub use handle::{SlideHandle, DEFAULT_MPP};
