//! Branch wire mapping
//!
//! Field priority:
//!
//! | Field       | Accepted keys                                      |
//! |-------------|----------------------------------------------------|
//! | `id`        | `id`, `Id`, `ID`, `_id`                            |
//! | `createdAt` | `createdAt`, `created_at`, `CreatedAt`, `createdDate` |
//! | `companyId` | `companyId`, `company_id`, `CompanyId`, `company.id` |
//! | `name`      | `name`, `Name`                                     |
//! | `address`   | `address`, `Address`                               |
//! | `phone`     | `phone`, `Phone`, `phoneNumber`                    |

use serde_json::{Map, Value};

use stocksync_core::domain::{Branch, BranchDraft, BranchPatch, Entity};

use crate::gateway::WireFormat;
use crate::normalize::{self, Object};
use crate::ApiError;

const COMPANY_ID: &[&str] = &["companyId", "company_id", "CompanyId", "company.id"];
const NAME: &[&str] = &["name", "Name"];
const ADDRESS: &[&str] = &["address", "Address"];
const PHONE: &[&str] = &["phone", "Phone", "phoneNumber"];

impl WireFormat for Branch {
    fn from_wire(obj: &Object) -> Result<Self, ApiError> {
        let meta = normalize::synced_meta(obj)?;
        let draft = BranchDraft {
            company_id: normalize::required_id(obj, COMPANY_ID)?,
            name: normalize::required_text(obj, NAME)?,
            address: normalize::text_field(obj, ADDRESS),
            phone: normalize::text_field(obj, PHONE),
        };
        Ok(Branch::from_parts(meta, draft))
    }

    fn create_body(draft: &BranchDraft) -> Value {
        let mut body = Map::new();
        body.insert(
            "companyId".into(),
            normalize::id_value(&draft.company_id),
        );
        body.insert("name".into(), draft.name.clone().into());
        normalize::put_opt(&mut body, "address", draft.address.clone());
        normalize::put_opt(&mut body, "phone", draft.phone.clone());
        Value::Object(body)
    }

    /// `companyId` is fixed at creation and never sent
    fn update_body(patch: &BranchPatch) -> Value {
        let mut body = Map::new();
        normalize::put_opt(&mut body, "name", patch.name.clone());
        normalize::put_opt(&mut body, "address", patch.address.clone());
        normalize::put_opt(&mut body, "phone", patch.phone.clone());
        Value::Object(body)
    }
}
