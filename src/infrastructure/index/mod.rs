//! Policy index implementations

pub mod in_memory;

pub use in_memory::{InMemoryPolicyIndex, IndexedDocument};
