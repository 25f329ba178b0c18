//! Entity repositories
//!
//! An [`EntityRepository`] holds the authoritative local collection for one
//! entity kind. Every mutation is written back to the blob store as a single
//! JSON document under the kind's collection key.
//!
//! Records are created in one of two modes:
//!
//! - [`CreateMode::Remote`]: the gateway is called first; on success the
//!   server's canonical copy is stored tagged `Synced`. On failure nothing is
//!   stored and the error propagates.
//! - [`CreateMode::Local`]: a local id is fabricated and the record is stored
//!   tagged `Local` without touching the network.
//!
//! Updates and deletes follow the record's state: Synced records go through
//! the gateway, Local records are changed in place.

mod error;
mod product;
mod sale;
mod workspace;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info};

use crate::domain::{Branch, Entity, EntityId, Product, RecordMeta, Sale, User};
use crate::ports::{IBlobStore, IRemoteGateway, Syncable};

pub use error::RepositoryError;
pub use product::ReductionOutcome;
pub use workspace::{Gateways, KindStatus, Workspace, WorkspaceStatus};

pub type BranchRepository = EntityRepository<Branch>;
pub type UserRepository = EntityRepository<User>;
pub type ProductRepository = EntityRepository<Product>;
pub type SaleRepository = EntityRepository<Sale>;

/// How a new record reaches the system of record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateMode {
    /// Create on the server now
    Remote,
    /// Store locally; a later sync run pushes it
    Local,
}

/// Local collection of one entity kind with its gateway and persistence
pub struct EntityRepository<E: Syncable> {
    records: Vec<E>,
    gateway: Arc<E::Gateway>,
    store: Arc<dyn IBlobStore>,
}

impl<E: Syncable> EntityRepository<E> {
    /// Creates a repository by reading the persisted collection
    ///
    /// A missing document yields an empty collection.
    pub async fn load(
        gateway: Arc<E::Gateway>,
        store: Arc<dyn IBlobStore>,
    ) -> Result<Self, RepositoryError> {
        let key = E::KIND.collection();
        let records = match store
            .read(key)
            .await
            .with_context(|| format!("Failed to read {key} collection"))
            .map_err(RepositoryError::Storage)?
        {
            Some(doc) => serde_json::from_str::<Vec<E>>(&doc)
                .with_context(|| format!("Corrupt {key} collection"))
                .map_err(RepositoryError::Storage)?,
            None => Vec::new(),
        };

        debug!(kind = %E::KIND, count = records.len(), "Loaded collection");

        Ok(Self {
            records,
            gateway,
            store,
        })
    }

    /// The gateway this repository pushes through
    pub fn gateway(&self) -> Arc<E::Gateway> {
        Arc::clone(&self.gateway)
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Finds a record by its current id or by the local id it had before sync
    pub fn get(&self, id: &EntityId) -> Option<&E> {
        self.records.iter().find(|r| r.answers_to(id))
    }

    /// All records in insertion order
    pub fn list(&self) -> &[E] {
        &self.records
    }

    /// Records still waiting to be pushed
    pub fn pending(&self) -> Vec<&E> {
        self.records.iter().filter(|r| r.is_local()).collect()
    }

    /// Records hanging off the given parent
    pub fn by_parent(&self, parent_id: &EntityId) -> Vec<&E> {
        self.records
            .iter()
            .filter(|r| r.parent_id() == Some(parent_id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // ------------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------------

    /// Creates a record
    ///
    /// # Errors
    ///
    /// - `Validation` if the draft is rejected (no I/O happens)
    /// - `Remote` if remote mode was requested and the gateway failed
    /// - `Storage` if the collection could not be written back
    pub async fn create(&mut self, draft: E::Draft, mode: CreateMode) -> Result<E, RepositoryError> {
        E::validate_draft(&draft)?;

        let record = match mode {
            CreateMode::Remote => {
                let created = self.gateway.create(&draft).await?;
                info!(kind = %E::KIND, id = %created.id(), "Created on server");
                created
            }
            CreateMode::Local => {
                let record = E::from_parts(RecordMeta::local(E::KIND), draft);
                debug!(kind = %E::KIND, id = %record.id(), "Created locally");
                record
            }
        };

        self.records.push(record.clone());
        self.persist().await?;
        Ok(record)
    }

    /// Updates a record, remotely if it is Synced and in place if it is Local
    pub async fn update(&mut self, id: &EntityId, patch: E::Patch) -> Result<E, RepositoryError> {
        E::validate_patch(&patch)?;
        let index = self.position(id)?;

        let updated = if self.records[index].is_local() {
            let mut record = self.records[index].clone();
            record.apply(&patch);
            record
        } else {
            let server_id = self.records[index].id().clone();
            let fresh = self.gateway.update(&server_id, &patch).await?;
            self.carry_origin(index, fresh)
        };

        self.records[index] = updated.clone();
        self.persist().await?;
        Ok(updated)
    }

    /// Deletes a record, remotely first if it is Synced
    ///
    /// Returns the removed record.
    pub async fn delete(&mut self, id: &EntityId) -> Result<E, RepositoryError> {
        let index = self.position(id)?;

        if !self.records[index].is_local() {
            let server_id = self.records[index].id().clone();
            self.gateway.delete(&server_id).await?;
            info!(kind = %E::KIND, id = %server_id, "Deleted on server");
        }

        let removed = self.records.remove(index);
        self.persist().await?;
        Ok(removed)
    }

    /// Re-reads a Synced record from the gateway
    pub async fn refresh(&mut self, id: &EntityId) -> Result<E, RepositoryError> {
        let index = self.position(id)?;
        if self.records[index].is_local() {
            return Err(RepositoryError::InvalidState(format!(
                "{} {id} has not been synced yet",
                E::KIND
            )));
        }

        let server_id = self.records[index].id().clone();
        let fresh = self.gateway.fetch(&server_id).await?;
        let fresh = self.carry_origin(index, fresh);
        self.records[index] = fresh.clone();
        self.persist().await?;
        Ok(fresh)
    }

    /// Replaces a Local record with the server's copy returned by a create
    ///
    /// The local id is kept as the synced record's origin so later lookups
    /// by the old id still succeed. A Synced record is never replaced.
    pub async fn mark_synced(
        &mut self,
        local_id: &EntityId,
        mut synced: E,
    ) -> Result<E, RepositoryError> {
        let index = self
            .records
            .iter()
            .position(|r| r.id() == local_id)
            .ok_or_else(|| RepositoryError::not_found(E::KIND, local_id))?;

        if !self.records[index].is_local() {
            return Err(RepositoryError::InvalidState(format!(
                "{} {local_id} is already synced",
                E::KIND
            )));
        }

        synced.meta_mut().origin_id = Some(local_id.clone());
        self.records[index] = synced.clone();
        self.persist().await?;
        Ok(synced)
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn position(&self, id: &EntityId) -> Result<usize, RepositoryError> {
        self.records
            .iter()
            .position(|r| r.answers_to(id))
            .ok_or_else(|| RepositoryError::not_found(E::KIND, id))
    }

    /// Keeps the origin id of the record at `index` on its replacement
    fn carry_origin(&self, index: usize, mut fresh: E) -> E {
        if fresh.meta().origin_id.is_none() {
            fresh.meta_mut().origin_id = self.records[index].meta().origin_id.clone();
        }
        fresh
    }

    async fn persist(&self) -> Result<(), RepositoryError> {
        let key = E::KIND.collection();
        let doc = serde_json::to_string(&self.records)
            .with_context(|| format!("Failed to serialize {key} collection"))
            .map_err(RepositoryError::Storage)?;
        self.store
            .write(key, &doc)
            .await
            .with_context(|| format!("Failed to write {key} collection"))
            .map_err(RepositoryError::Storage)
    }
}
