//! In-memory gateway and blob store used by the repository tests

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{Entity, EntityId, Product, RecordMeta};
use crate::ports::{IBlobStore, IProductGateway, IRemoteGateway, RemoteError};

#[derive(Default)]
pub(crate) struct MemoryStore {
    docs: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn get(&self, key: &str) -> Option<String> {
        self.docs.lock().unwrap().get(key).cloned()
    }

    pub fn put(&self, key: &str, value: &str) {
        self.docs
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

#[async_trait]
impl IBlobStore for MemoryStore {
    async fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.get(key))
    }

    async fn write(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.put(key, value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.docs.lock().unwrap().remove(key);
        Ok(())
    }

    async fn keys(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.docs.lock().unwrap().keys().cloned().collect())
    }
}

struct MockState<E> {
    next_id: u64,
    records: Vec<E>,
    failures: VecDeque<RemoteError>,
    calls: Vec<String>,
}

/// Server double that issues sequential numeric ids
pub(crate) struct MockGateway<E: Entity> {
    state: Mutex<MockState<E>>,
}

impl<E: Entity> MockGateway<E> {
    pub fn starting_at(first_id: u64) -> Self {
        Self {
            state: Mutex::new(MockState {
                next_id: first_id,
                records: Vec::new(),
                failures: VecDeque::new(),
                calls: Vec::new(),
            }),
        }
    }

    /// Queue an error for the next call
    pub fn fail_next(&self, err: RemoteError) {
        self.state.lock().unwrap().failures.push_back(err);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn server_record(&self, id: &str) -> Option<E> {
        self.state
            .lock()
            .unwrap()
            .records
            .iter()
            .find(|r| r.id().as_str() == id)
            .cloned()
    }

    fn begin(&self, call: String) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        match state.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn with_record<T>(
        &self,
        id: &EntityId,
        f: impl FnOnce(&mut E) -> Result<T, RemoteError>,
    ) -> Result<T, RemoteError> {
        let mut state = self.state.lock().unwrap();
        let record = state
            .records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| RemoteError::NotFound(id.to_string()))?;
        f(record)
    }
}

#[async_trait]
impl<E: Entity> IRemoteGateway<E> for MockGateway<E> {
    async fn create(&self, draft: &E::Draft) -> Result<E, RemoteError> {
        self.begin("create".to_string())?;
        let mut state = self.state.lock().unwrap();
        let id = EntityId::from(state.next_id);
        state.next_id += 1;
        let record = E::from_parts(RecordMeta::synced(id, Utc::now()), draft.clone());
        state.records.push(record.clone());
        Ok(record)
    }

    async fn fetch(&self, id: &EntityId) -> Result<E, RemoteError> {
        self.begin(format!("fetch {id}"))?;
        self.with_record(id, |r| Ok(r.clone()))
    }

    async fn list(&self) -> Result<Vec<E>, RemoteError> {
        self.begin("list".to_string())?;
        Ok(self.state.lock().unwrap().records.clone())
    }

    async fn update(&self, id: &EntityId, patch: &E::Patch) -> Result<E, RemoteError> {
        self.begin(format!("update {id}"))?;
        self.with_record(id, |r| {
            r.apply(patch);
            Ok(r.clone())
        })
    }

    async fn delete(&self, id: &EntityId) -> Result<(), RemoteError> {
        self.begin(format!("delete {id}"))?;
        let mut state = self.state.lock().unwrap();
        let before = state.records.len();
        state.records.retain(|r| r.id() != id);
        if state.records.len() == before {
            return Err(RemoteError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl IProductGateway for MockGateway<Product> {
    async fn reduce_quantity(&self, id: &EntityId, quantity: u32) -> Result<Product, RemoteError> {
        self.begin(format!("reduce {id} {quantity}"))?;
        self.with_record(id, |p| {
            p.take_stock(quantity)
                .map_err(|_| RemoteError::Conflict("insufficient stock".to_string()))?;
            Ok(p.clone())
        })
    }

    async fn restore_quantity(
        &self,
        id: &EntityId,
        quantity: u32,
    ) -> Result<Product, RemoteError> {
        self.begin(format!("restore {id} {quantity}"))?;
        self.with_record(id, |p| {
            p.return_stock(quantity);
            Ok(p.clone())
        })
    }
}
