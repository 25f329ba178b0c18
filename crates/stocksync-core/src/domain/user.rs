//! User entity

use std::fmt;

use serde::{Deserialize, Serialize};

use super::entity::{require_text, Entity};
use super::errors::DomainError;
use super::newtypes::{EntityId, EntityKind, RecordMeta};

/// Access role of a user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Manager,
    #[default]
    Seller,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Manager => "manager",
            UserRole::Seller => "seller",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "manager" => Ok(UserRole::Manager),
            "seller" => Ok(UserRole::Seller),
            other => Err(DomainError::invalid(
                "role",
                format!("expected admin, manager or seller (got '{other}')"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    /// Branch the user works at; may be a local branch id until synced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<EntityId>,
    /// Legacy free-text branch name, kept for display only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl UserDraft {
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: UserRole) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            role,
            branch_id: None,
            branch: None,
        }
    }

    pub fn at_branch(mut self, branch_id: EntityId) -> Self {
        self.branch_id = Some(branch_id);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<EntityId>,
}

/// A person who can log in and record sales
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(flatten)]
    meta: RecordMeta,
    #[serde(flatten)]
    fields: UserDraft,
}

impl User {
    pub fn fields(&self) -> &UserDraft {
        &self.fields
    }

    pub fn name(&self) -> &str {
        &self.fields.name
    }

    pub fn email(&self) -> &str {
        &self.fields.email
    }

    pub fn role(&self) -> UserRole {
        self.fields.role
    }

    pub fn branch_id(&self) -> Option<&EntityId> {
        self.fields.branch_id.as_ref()
    }
}

fn require_email(email: &str) -> Result<(), DomainError> {
    require_text("email", email)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(DomainError::invalid(
            "email",
            format!("not an email address: '{email}'"),
        )),
    }
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;
    type Draft = UserDraft;
    type Patch = UserPatch;

    fn from_parts(meta: RecordMeta, draft: UserDraft) -> Self {
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

    fn draft(&self) -> UserDraft {
        self.fields.clone()
    }

    fn apply(&mut self, patch: &UserPatch) {
        if let Some(name) = &patch.name {
            self.fields.name = name.clone();
        }
        if let Some(email) = &patch.email {
            self.fields.email = email.clone();
        }
        if let Some(role) = patch.role {
            self.fields.role = role;
        }
        if let Some(branch_id) = &patch.branch_id {
            self.fields.branch_id = Some(branch_id.clone());
        }
    }

    fn validate_draft(draft: &UserDraft) -> Result<(), DomainError> {
        require_text("name", &draft.name)?;
        require_email(&draft.email)
    }

    fn validate_patch(patch: &UserPatch) -> Result<(), DomainError> {
        if let Some(name) = &patch.name {
            require_text("name", name)?;
        }
        if let Some(email) = &patch.email {
            require_email(email)?;
        }
        Ok(())
    }

    fn parent_id(&self) -> Option<&EntityId> {
        self.fields.branch_id.as_ref()
    }
}
