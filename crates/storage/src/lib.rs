mod error;
mod memory;
mod record;
mod traits;

pub use error::StoreError;
pub use memory::{MemoryStore, StoreWrite};
pub use record::{Record, RecordId};
pub use traits::RecordStore;
