//! Product wire mapping
//!
//! Field priority:
//!
//! | Field        | Accepted keys                                       |
//! |--------------|-----------------------------------------------------|
//! | `id`         | `id`, `Id`, `ID`, `_id`                             |
//! | `companyId`  | `companyId`, `company_id`, `CompanyId`, `company.id` |
//! | `name`       | `name`, `Name`                                      |
//! | `price`      | `price`, `Price`, `unitPrice` (numbers or numeric strings) |
//! | `quantity`   | `quantity`, `Quantity`, `qty`, `stock`              |
//! | `attributes` | `attributes`, `Attributes`                          |

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use stocksync_core::domain::{Entity, Product, ProductDraft, ProductPatch};

use crate::gateway::WireFormat;
use crate::normalize::{self, Object};
use crate::ApiError;

const COMPANY_ID: &[&str] = &["companyId", "company_id", "CompanyId", "company.id"];
const NAME: &[&str] = &["name", "Name"];
const PRICE: &[&str] = &["price", "Price", "unitPrice"];
const QUANTITY: &[&str] = &["quantity", "Quantity", "qty", "stock"];
const ATTRIBUTES: &[&str] = &["attributes", "Attributes"];

fn attributes_of(obj: &Object) -> BTreeMap<String, Value> {
    match normalize::field(obj, ATTRIBUTES) {
        Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        _ => BTreeMap::new(),
    }
}

fn attributes_value(attributes: &BTreeMap<String, Value>) -> Value {
    Value::Object(attributes.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
}

impl WireFormat for Product {
    fn from_wire(obj: &Object) -> Result<Self, ApiError> {
        let meta = normalize::synced_meta(obj)?;
        let draft = ProductDraft {
            company_id: normalize::required_id(obj, COMPANY_ID)?,
            name: normalize::required_text(obj, NAME)?,
            price: normalize::amount_field(obj, PRICE)?.unwrap_or_default(),
            quantity: normalize::count_field(obj, QUANTITY)?.unwrap_or_default(),
            attributes: attributes_of(obj),
        };
        Ok(Product::from_parts(meta, draft))
    }

    fn create_body(draft: &ProductDraft) -> Value {
        let mut body = Map::new();
        body.insert(
            "companyId".into(),
            normalize::id_value(&draft.company_id),
        );
        body.insert("name".into(), draft.name.clone().into());
        body.insert("price".into(), draft.price.into());
        body.insert("quantity".into(), draft.quantity.into());
        if !draft.attributes.is_empty() {
            body.insert("attributes".into(), attributes_value(&draft.attributes));
        }
        Value::Object(body)
    }

    /// `companyId` is fixed at creation and never sent
    fn update_body(patch: &ProductPatch) -> Value {
        let mut body = Map::new();
        normalize::put_opt(&mut body, "name", patch.name.clone());
        normalize::put_opt(&mut body, "price", patch.price);
        normalize::put_opt(&mut body, "quantity", patch.quantity);
        normalize::put_opt(
            &mut body,
            "attributes",
            patch.attributes.as_ref().map(attributes_value),
        );
        Value::Object(body)
    }
}

/// Body of the reduce/restore stock calls
pub(crate) fn stock_body(quantity: u32) -> Value {
    serde_json::json!({ "quantity": quantity })
}
