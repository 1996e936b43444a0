//! Built-in storage and file-storage providers.

pub mod in_memory;
pub mod local_fs;

pub use in_memory::{InMemoryStorageManager, IN_MEMORY_STORAGE_ID};
pub use local_fs::{LocalFileStorage, LOCAL_FS_STORAGE_ID};
