//! Branch entity, the root of the sync pipeline

use serde::{Deserialize, Serialize};

use super::entity::{require_server_id, require_text, Entity};
use super::errors::DomainError;
use super::newtypes::{EntityId, EntityKind, RecordMeta};

/// Fields of a branch, also used as the create payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchDraft {
    /// Owning company; always a pre-existing server id
    pub company_id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl BranchDraft {
    pub fn new(company_id: EntityId, name: impl Into<String>) -> Self {
        Self {
            company_id,
            name: name.into(),
            address: None,
            phone: None,
        }
    }
}

/// Partial branch update
///
/// `company_id` is accepted for symmetry with the draft but never applied
/// or sent upstream; a branch stays with the company it was created under.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// A store location belonging to a company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    #[serde(flatten)]
    meta: RecordMeta,
    #[serde(flatten)]
    fields: BranchDraft,
}

impl Branch {
    pub fn fields(&self) -> &BranchDraft {
        &self.fields
    }

    pub fn name(&self) -> &str {
        &self.fields.name
    }

    pub fn company_id(&self) -> &EntityId {
        &self.fields.company_id
    }
}

impl Entity for Branch {
    const KIND: EntityKind = EntityKind::Branch;
    type Draft = BranchDraft;
    type Patch = BranchPatch;

    fn from_parts(meta: RecordMeta, draft: BranchDraft) -> Self {
        Self {
            meta,
            fields: draft,
        }
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn draft(&self) -> BranchDraft {
        self.fields.clone()
    }

    /// `company_id` is fixed at creation and ignored here
    fn apply(&mut self, patch: &BranchPatch) {
        if let Some(name) = &patch.name {
            self.fields.name = name.clone();
        }
        if let Some(address) = &patch.address {
            self.fields.address = Some(address.clone());
        }
        if let Some(phone) = &patch.phone {
            self.fields.phone = Some(phone.clone());
        }
    }

    fn validate_draft(draft: &BranchDraft) -> Result<(), DomainError> {
        require_server_id("companyId", &draft.company_id)?;
        require_text("name", &draft.name)
    }

    fn validate_patch(patch: &BranchPatch) -> Result<(), DomainError> {
        if let Some(name) = &patch.name {
            require_text("name", name)?;
        }
        Ok(())
    }

    fn parent_id(&self) -> Option<&EntityId> {
        Some(&self.fields.company_id)
    }
}
