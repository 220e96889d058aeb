// Document Locks - serializes read-modify-write cycles on the same document
// within this process. A fixed stripe set keeps memory bounded; two documents
// may share a stripe, which only costs throughput.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tokio::sync::{Mutex, MutexGuard};

use crate::core::DocId;

const DEFAULT_STRIPES: usize = 64;

pub struct DocLocks {
    stripes: Vec<Mutex<()>>,
}

impl DocLocks {
    pub fn new(stripes: usize) -> Self {
        Self {
            stripes: (0..stripes.max(1)).map(|_| Mutex::new(())).collect(),
        }
    }

    // Snowflake ids have mostly-zero low bits, so hash before picking a stripe
    fn stripe(&self, id: DocId) -> usize {
        let mut hasher = DefaultHasher::new();
        id.hash(&mut hasher);
        (hasher.finish() % self.stripes.len() as u64) as usize
    }

    /// Held for the whole read-modify-write of `id`
    pub async fn lock(&self, id: DocId) -> MutexGuard<'_, ()> {
        self.stripes[self.stripe(id)].lock().await
    }
}

impl Default for DocLocks {
    fn default() -> Self {
        Self::new(DEFAULT_STRIPES)
    }
}
