use crate::error::Error;
use crate::inventory::{Instance, InventorySource};
use tokio::sync::RwLock;

/// A scripted, in-memory inventory. It reports whatever instance list it was last given, or
/// fails every fetch while a failure is set.
#[derive(Default, Debug)]
pub struct InMemoryInventory {
    state: RwLock<Script>,
}

#[derive(Default, Debug)]
struct Script {
    instances: Vec<Instance>,
    failure: Option<String>,
    fetches: usize,
}

impl InMemoryInventory {
    pub fn new(instances: Vec<Instance>) -> Self {
        InMemoryInventory {
            state: RwLock::new(Script {
                instances,
                ..Script::default()
            }),
        }
    }

    /// Replace the instance list reported by subsequent fetches.
    pub async fn set_instances(&self, instances: Vec<Instance>) {
        self.state.write().await.instances = instances;
    }

    /// Make every subsequent fetch fail with [`Error::Fetch`] until [`Self::clear_failure`].
    pub async fn fail_with(&self, reason: &str) {
        self.state.write().await.failure = Some(reason.to_string());
    }

    pub async fn clear_failure(&self) {
        self.state.write().await.failure = None;
    }

    /// How many times [`InventorySource::fetch`] has been called.
    pub async fn fetches(&self) -> usize {
        self.state.read().await.fetches
    }
}

#[async_trait::async_trait]
impl InventorySource for InMemoryInventory {
    async fn fetch(&self) -> Result<Vec<Instance>, Error> {
        let mut state = self.state.write().await;
        state.fetches += 1;
        match &state.failure {
            Some(reason) => Err(Error::fetch("servers", reason)),
            None => Ok(state.instances.clone()),
        }
    }
}
