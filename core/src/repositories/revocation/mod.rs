//! Revocation store contract and the in-memory adapter.

mod memory;
mod store;

pub use memory::MemoryRevocationStore;
pub use store::RevocationStore;
