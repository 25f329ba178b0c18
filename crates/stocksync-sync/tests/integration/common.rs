//! Shared helpers: a scripted server double per kind and a workspace
//! wired to them

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use stocksync_api::gateway::WireFormat;
use stocksync_cache::{DatabasePool, SqliteBlobStore};
use stocksync_core::domain::{Branch, Entity, EntityId, Product, RecordMeta, Sale, User};
use stocksync_core::ports::{IBlobStore, IProductGateway, IRemoteGateway, RemoteError};
use stocksync_core::repository::{Gateways, Workspace};

struct ServerState<E> {
    next_id: u64,
    records: Vec<E>,
    sent: Vec<Value>,
    failures: VecDeque<RemoteError>,
    calls: usize,
}

/// Server double issuing sequential numeric ids
pub struct FakeServer<E: Entity> {
    state: Mutex<ServerState<E>>,
    delay: Mutex<Option<Duration>>,
}

impl<E: Entity> FakeServer<E> {
    pub fn starting_at(first_id: u64) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ServerState {
                next_id: first_id,
                records: Vec::new(),
                sent: Vec::new(),
                failures: VecDeque::new(),
                calls: 0,
            }),
            delay: Mutex::new(None),
        })
    }

    /// The next create fails with `err`
    pub fn fail_next(&self, err: RemoteError) {
        self.state.lock().unwrap().failures.push_back(err);
    }

    /// Every create takes at least `delay`
    pub fn respond_after(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }

    /// Create request bodies received, in order, as the REST gateway
    /// would send them
    pub fn sent(&self) -> Vec<Value> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn stored(&self) -> Vec<E> {
        self.state.lock().unwrap().records.clone()
    }
}

#[async_trait]
impl<E: WireFormat> IRemoteGateway<E> for FakeServer<E> {
    async fn create(&self, draft: &E::Draft) -> Result<E, RemoteError> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        if let Some(err) = state.failures.pop_front() {
            return Err(err);
        }

        state.sent.push(E::create_body(draft));
        let id = EntityId::from(state.next_id);
        state.next_id += 1;
        let record = E::from_parts(RecordMeta::synced(id, Utc::now()), draft.clone());
        state.records.push(record.clone());
        Ok(record)
    }

    async fn fetch(&self, id: &EntityId) -> Result<E, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        state
            .records
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(id.to_string()))
    }

    async fn list(&self) -> Result<Vec<E>, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        Ok(state.records.clone())
    }

    async fn update(&self, id: &EntityId, patch: &E::Patch) -> Result<E, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        let record = state
            .records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| RemoteError::NotFound(id.to_string()))?;
        record.apply(patch);
        Ok(record.clone())
    }

    async fn delete(&self, id: &EntityId) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        state.records.retain(|r| r.id() != id);
        Ok(())
    }
}

#[async_trait]
impl IProductGateway for FakeServer<Product> {
    async fn reduce_quantity(&self, id: &EntityId, quantity: u32) -> Result<Product, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        let product = state
            .records
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or_else(|| RemoteError::NotFound(id.to_string()))?;
        product
            .take_stock(quantity)
            .map_err(|e| RemoteError::Conflict(e.to_string()))?;
        Ok(product.clone())
    }

    async fn restore_quantity(
        &self,
        id: &EntityId,
        quantity: u32,
    ) -> Result<Product, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        let product = state
            .records
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or_else(|| RemoteError::NotFound(id.to_string()))?;
        product.return_stock(quantity);
        Ok(product.clone())
    }
}

/// The four server doubles, numbered like a small live system
pub struct Servers {
    pub branches: Arc<FakeServer<Branch>>,
    pub users: Arc<FakeServer<User>>,
    pub products: Arc<FakeServer<Product>>,
    pub sales: Arc<FakeServer<Sale>>,
}

impl Servers {
    pub fn new() -> Self {
        Self {
            branches: FakeServer::starting_at(101),
            users: FakeServer::starting_at(7),
            products: FakeServer::starting_at(55),
            sales: FakeServer::starting_at(900),
        }
    }

    pub fn total_calls(&self) -> usize {
        self.branches.calls() + self.users.calls() + self.products.calls() + self.sales.calls()
    }

    fn gateways(&self) -> Gateways {
        Gateways {
            branches: self.branches.clone(),
            users: self.users.clone(),
            products: self.products.clone(),
            sales: self.sales.clone(),
        }
    }
}

/// A workspace over a fresh in-memory database
pub struct Harness {
    pub servers: Servers,
    pub store: Arc<dyn IBlobStore>,
    pub workspace: Workspace,
}

impl Harness {
    pub async fn new() -> Self {
        let pool = DatabasePool::in_memory()
            .await
            .expect("Failed to create in-memory database");
        let store: Arc<dyn IBlobStore> = Arc::new(SqliteBlobStore::new(pool.pool().clone()));
        let servers = Servers::new();
        let workspace = Workspace::load(servers.gateways(), Arc::clone(&store))
            .await
            .unwrap();
        Self {
            servers,
            store,
            workspace,
        }
    }

    /// Loads a second workspace from the same store, as a restart would
    pub async fn reload(&self) -> Workspace {
        Workspace::load(self.servers.gateways(), Arc::clone(&self.store))
            .await
            .unwrap()
    }
}
