//! Domain newtypes with validation
//!
//! Identifier and envelope types shared by every entity kind. The shape of an
//! [`EntityId`] carries meaning: server-issued ids are purely numeric strings,
//! while ids fabricated on the client follow `{kind}_{timestamp}_{random}` and
//! therefore never parse as a number.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

// ============================================================================
// EntityKind
// ============================================================================

/// The four record kinds handled by the system, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Branch,
    User,
    Product,
    Sale,
}

impl EntityKind {
    /// All kinds in dependency order (parents before dependents)
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Branch,
        EntityKind::User,
        EntityKind::Product,
        EntityKind::Sale,
    ];

    /// Singular lowercase name, also used as the local id prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Branch => "branch",
            EntityKind::User => "user",
            EntityKind::Product => "product",
            EntityKind::Sale => "sale",
        }
    }

    /// Plural name used for REST collections and blob store keys
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Branch => "branches",
            EntityKind::User => "users",
            EntityKind::Product => "products",
            EntityKind::Sale => "sales",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        EntityKind::ALL
            .into_iter()
            .find(|k| k.as_str() == lowered || k.collection() == lowered)
            .ok_or_else(|| DomainError::UnknownKind(s.to_string()))
    }
}

// ============================================================================
// EntityId
// ============================================================================

/// Opaque record identifier
///
/// Server ids are numeric strings (`"101"`). Local ids are generated with
/// [`EntityId::generate_local`] and look like `product_1718000000000_3f9a1c2be`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    /// Create an EntityId from an existing string
    ///
    /// # Errors
    /// Returns `DomainError::InvalidId` if the id is empty or contains
    /// characters outside `[A-Za-z0-9_-]`
    pub fn new(id: String) -> Result<Self, DomainError> {
        if id.is_empty() {
            return Err(DomainError::InvalidId("ID cannot be empty".to_string()));
        }

        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(DomainError::InvalidId(format!(
                "ID contains invalid characters: {id}"
            )));
        }

        Ok(Self(id))
    }

    /// Fabricate a fresh local-only id for the given kind
    ///
    /// The kind prefix guarantees the result is never numeric-only.
    #[must_use]
    pub fn generate_local(kind: EntityKind) -> Self {
        let random = Uuid::new_v4().simple().to_string();
        Self(format!(
            "{}_{}_{}",
            kind.as_str(),
            Utc::now().timestamp_millis(),
            &random[..9]
        ))
    }

    /// Returns true if this is a server-issued (purely numeric) id
    pub fn is_server(&self) -> bool {
        self.0.bytes().all(|b| b.is_ascii_digit())
    }

    /// Returns true if this id was fabricated locally
    ///
    /// Decided by shape alone, without consulting any sync status.
    pub fn is_local(&self) -> bool {
        !self.is_server()
    }

    /// The kind encoded in a local id's prefix, if any
    pub fn local_kind(&self) -> Option<EntityKind> {
        if !self.is_local() {
            return None;
        }
        let (prefix, _) = self.0.split_once('_')?;
        prefix.parse().ok()
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for EntityId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl From<u64> for EntityId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

// ============================================================================
// SyncStatus
// ============================================================================

/// Synchronization state of a stored record
///
/// ```text
///   Local ──(create accepted by server)──► Synced
/// ```
///
/// The transition is one-directional. A failed sync attempt leaves the
/// record Local, indistinguishable from never having tried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Persisted only on this client
    #[default]
    Local,
    /// Acknowledged by the remote system of record
    Synced,
}

impl SyncStatus {
    pub fn is_local(&self) -> bool {
        matches!(self, SyncStatus::Local)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SyncStatus::Local => "local",
            SyncStatus::Synced => "synced",
        }
    }
}

impl Display for SyncStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// RecordMeta
// ============================================================================

/// Envelope fields common to every entity kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMeta {
    /// Current identifier (local or server)
    pub id: EntityId,
    /// Whether the server has acknowledged this record
    pub sync_status: SyncStatus,
    /// When the record was first created
    pub created_at: DateTime<Utc>,
    /// The local id this record carried before it was synced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_id: Option<EntityId>,
}

impl RecordMeta {
    /// Envelope for a brand-new local-only record
    pub fn local(kind: EntityKind) -> Self {
        Self {
            id: EntityId::generate_local(kind),
            sync_status: SyncStatus::Local,
            created_at: Utc::now(),
            origin_id: None,
        }
    }

    /// Envelope for a record as returned by the server
    pub fn synced(id: EntityId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            sync_status: SyncStatus::Synced,
            created_at,
            origin_id: None,
        }
    }
}
