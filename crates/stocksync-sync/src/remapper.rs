//! Local-to-server identifier tables
//!
//! While a sync run progresses, records created offline receive server ids.
//! Records of later kinds still reference their parents by the old local id;
//! the remapper answers "what is this id called on the server now?".
//!
//! Tables are rebuilt from repository state at the start of each stage, so
//! a run picks up ids assigned by earlier runs (through each synced record's
//! `originId`) as well as those assigned moments ago.

use std::collections::HashMap;

use stocksync_core::domain::{Entity, EntityId, EntityKind};

/// Per-kind `local id -> server id` tables
#[derive(Debug, Default, Clone)]
pub struct IdRemapper {
    tables: HashMap<EntityKind, HashMap<EntityId, EntityId>>,
}

impl IdRemapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the table for `E::KIND` with the ids known to `records`
    ///
    /// Every Synced record maps its own id to itself and, when it was
    /// created offline, its origin id to its server id. Local records are
    /// left out: they have no server id yet.
    pub fn rebuild<E: Entity>(&mut self, records: &[E]) {
        let table = self.tables.entry(E::KIND).or_default();
        table.clear();

        for record in records.iter().filter(|r| !r.is_local()) {
            let server_id = record.id().clone();
            if let Some(origin) = &record.meta().origin_id {
                table.insert(origin.clone(), server_id.clone());
            }
            table.insert(server_id.clone(), server_id);
        }

        tracing::trace!(kind = %E::KIND, entries = table.len(), "Remap table rebuilt");
    }

    /// Adds a single mapping, typically right after a successful create
    pub fn record(&mut self, kind: EntityKind, local_id: EntityId, server_id: EntityId) {
        let table = self.tables.entry(kind).or_default();
        table.insert(server_id.clone(), server_id.clone());
        table.insert(local_id, server_id);
    }

    /// Resolves `id` to the server id of a `kind` record
    ///
    /// A server-shaped id resolves to itself even when the record is not
    /// held locally. Returns `None` for a local id with no server
    /// counterpart yet.
    pub fn resolve(&self, kind: EntityKind, id: &EntityId) -> Option<EntityId> {
        if let Some(server_id) = self.tables.get(&kind).and_then(|t| t.get(id)) {
            return Some(server_id.clone());
        }
        id.is_server().then(|| id.clone())
    }

    /// Number of entries held for `kind`
    pub fn len(&self, kind: EntityKind) -> usize {
        self.tables.get(&kind).map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.values().all(HashMap::is_empty)
    }
}
