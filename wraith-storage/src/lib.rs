mod entry;
mod memory;
mod store;

pub use entry::{Entry, SearchParams};
pub use memory::MemoryStore;
pub use store::{EntryStore, StoreError};
