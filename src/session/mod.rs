pub mod storage;
pub mod store;

pub use storage::{LocalStorage, MemoryStorage, SqliteStorage, StorageError};
pub use store::SessionStore;
