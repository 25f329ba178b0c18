//! User wire mapping
//!
//! Field priority:
//!
//! | Field      | Accepted keys                                     |
//! |------------|---------------------------------------------------|
//! | `id`       | `id`, `Id`, `ID`, `_id`                           |
//! | `name`     | `name`, `Name`, `fullName`                        |
//! | `email`    | `email`, `Email`, `mail`                          |
//! | `role`     | `role`, `Role` (unknown values read as `seller`)  |
//! | `branchId` | `branchId`, `branch_id`, `BranchId`, `branch.id`  |
//!
//! Older servers sent `branch` as a free-text name; it is kept as the legacy
//! display field.

use serde_json::{Map, Value};

use stocksync_core::domain::{Entity, User, UserDraft, UserPatch, UserRole};

use crate::gateway::WireFormat;
use crate::normalize::{self, Object};
use crate::ApiError;

const NAME: &[&str] = &["name", "Name", "fullName"];
const EMAIL: &[&str] = &["email", "Email", "mail"];
const ROLE: &[&str] = &["role", "Role"];
const BRANCH_ID: &[&str] = &["branchId", "branch_id", "BranchId", "branch.id"];

fn role_of(obj: &Object) -> UserRole {
    match normalize::text_field(obj, ROLE) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(role = %raw, "Unknown role, treating as seller");
            UserRole::Seller
        }),
        None => UserRole::default(),
    }
}

fn legacy_branch_name(obj: &Object) -> Option<String> {
    match obj.get("branch") {
        Some(Value::String(name)) => Some(name.clone()),
        Some(Value::Object(branch)) => normalize::text_field(branch, &["name"]),
        _ => None,
    }
}

impl WireFormat for User {
    fn from_wire(obj: &Object) -> Result<Self, ApiError> {
        let meta = normalize::synced_meta(obj)?;
        let draft = UserDraft {
            name: normalize::required_text(obj, NAME)?,
            email: normalize::required_text(obj, EMAIL)?,
            role: role_of(obj),
            branch_id: normalize::id_field(obj, BRANCH_ID)?,
            branch: legacy_branch_name(obj),
        };
        Ok(User::from_parts(meta, draft))
    }

    fn create_body(draft: &UserDraft) -> Value {
        let mut body = Map::new();
        body.insert("name".into(), draft.name.clone().into());
        body.insert("email".into(), draft.email.clone().into());
        body.insert("role".into(), draft.role.as_str().into());
        normalize::put_opt(
            &mut body,
            "branchId",
            draft.branch_id.as_ref().map(normalize::id_value),
        );
        Value::Object(body)
    }

    fn update_body(patch: &UserPatch) -> Value {
        let mut body = Map::new();
        normalize::put_opt(&mut body, "name", patch.name.clone());
        normalize::put_opt(&mut body, "email", patch.email.clone());
        normalize::put_opt(&mut body, "role", patch.role.map(|r| r.as_str()));
        normalize::put_opt(
            &mut body,
            "branchId",
            patch.branch_id.as_ref().map(normalize::id_value),
        );
        Value::Object(body)
    }
}
