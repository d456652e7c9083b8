use crate::table::NameTable;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The slot holding the currently published [`NameTable`].
///
/// The refresh loop is the only writer. It builds a complete table off to the side and then
/// swaps the `Arc` in the slot; the write lock is held only for that pointer replacement.
/// Readers clone the `Arc` under the read lock and keep using their snapshot for as long as
/// they like, so a reader sees either the previous table or the next one, never a mix.
#[derive(Default, Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct SharedTable {
    current: Arc<RwLock<Arc<NameTable>>>,
}

impl SharedTable {
    pub fn new(table: NameTable) -> Self {
        SharedTable {
            current: Arc::new(RwLock::new(Arc::new(table))),
        }
    }

    /// A snapshot of the most recently published table.
    pub async fn snapshot(&self) -> Arc<NameTable> {
        self.current.read().await.clone()
    }

    /// Replace the published table as a whole, returning the one it replaced.
    pub async fn publish(&self, table: NameTable) -> Arc<NameTable> {
        let next = Arc::new(table);
        let mut current = self.current.write().await;
        std::mem::replace(&mut *current, next)
    }
}
