//! The common shape shared by Branch, User, Product and Sale
//!
//! Every record is a [`RecordMeta`] envelope plus kind-specific fields. The
//! kind-specific fields double as the *draft*: the payload a user supplies
//! when creating a record and the payload a gateway sends upstream.

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::errors::DomainError;
use super::newtypes::{EntityId, EntityKind, RecordMeta, SyncStatus};

/// A record kind managed by a repository and pushed by the sync pipeline
pub trait Entity:
    Clone + Debug + PartialEq + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Which kind this is
    const KIND: EntityKind;

    /// Kind-specific fields, without the envelope
    type Draft: Clone + Debug + PartialEq + Send + Sync + Serialize;

    /// Partial update; `None` fields are left untouched
    type Patch: Clone + Debug + Default + Send + Sync + Serialize;

    /// Assemble a record from an envelope and its fields
    fn from_parts(meta: RecordMeta, draft: Self::Draft) -> Self;

    fn meta(&self) -> &RecordMeta;

    fn meta_mut(&mut self) -> &mut RecordMeta;

    /// A copy of the kind-specific fields
    fn draft(&self) -> Self::Draft;

    /// Apply a patch in place
    fn apply(&mut self, patch: &Self::Patch);

    /// Check a draft before any I/O
    fn validate_draft(draft: &Self::Draft) -> Result<(), DomainError>;

    /// Check a patch before any I/O
    fn validate_patch(patch: &Self::Patch) -> Result<(), DomainError>;

    /// The owning record this one hangs off, used by `by_parent` queries
    fn parent_id(&self) -> Option<&EntityId>;

    fn id(&self) -> &EntityId {
        &self.meta().id
    }

    fn sync_status(&self) -> SyncStatus {
        self.meta().sync_status
    }

    /// Local records have never been acknowledged by the server
    fn is_local(&self) -> bool {
        self.meta().sync_status.is_local()
    }

    /// True if `id` is this record's current id or the local id it had
    /// before being synced
    fn answers_to(&self, id: &EntityId) -> bool {
        let meta = self.meta();
        &meta.id == id || meta.origin_id.as_ref() == Some(id)
    }
}

// ============================================================================
// Shared validation helpers
// ============================================================================

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::MissingField(field));
    }
    Ok(())
}

pub(crate) fn require_server_id(field: &'static str, id: &EntityId) -> Result<(), DomainError> {
    if !id.is_server() {
        return Err(DomainError::invalid(
            field,
            format!("must reference an existing server record (got '{id}')"),
        ));
    }
    Ok(())
}

pub(crate) fn require_amount(field: &'static str, value: f64) -> Result<(), DomainError> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::invalid(
            field,
            format!("must be a non-negative amount (got {value})"),
        ));
    }
    Ok(())
}
