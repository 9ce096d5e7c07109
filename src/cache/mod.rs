//! Caching layer.
//!
//! [`store::CacheStore`] is the pluggable contract: async get/set plus
//! clear-by-prefix. Two implementations ship with the crate — a bounded
//! LRU+TTL [`store::MemoryStore`] and an always-miss [`store::NoopStore`]
//! for disabled caching. [`manager::CacheManager`] layers a fixed key
//! prefix (`<endpoint>:<tenant-or-default>:`) on top of a shared store so
//! independent logical caches never collide.

pub mod manager;
pub mod store;

mod lock;

pub use manager::CacheManager;
pub use store::{CacheStore, MemoryStore, NoopStore, StoreError};
