//! Sale entity, the leaf of the sync pipeline

use serde::{Deserialize, Serialize};

use super::entity::{require_amount, Entity};
use super::errors::DomainError;
use super::newtypes::{EntityId, EntityKind, RecordMeta};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDraft {
    /// Product sold; required
    pub product_id: EntityId,
    /// Seller; best effort, the server falls back to the caller when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<EntityId>,
    pub quantity: u32,
    pub total_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
}

impl SaleDraft {
    pub fn new(product_id: EntityId, quantity: u32, total_price: f64) -> Self {
        Self {
            product_id,
            seller_id: None,
            quantity,
            total_price,
            customer_name: None,
        }
    }

    pub fn sold_by(mut self, seller_id: EntityId) -> Self {
        self.seller_id = Some(seller_id);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    #[serde(flatten)]
    meta: RecordMeta,
    #[serde(flatten)]
    fields: SaleDraft,
    /// Set once the server's stock has been reduced for this sale. Only
    /// meaningful while the sale is Local: until then its quantity is held
    /// back from the product's available stock.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    stock_reduced: bool,
}

impl Sale {
    pub fn fields(&self) -> &SaleDraft {
        &self.fields
    }

    pub fn product_id(&self) -> &EntityId {
        &self.fields.product_id
    }

    pub fn seller_id(&self) -> Option<&EntityId> {
        self.fields.seller_id.as_ref()
    }

    pub fn quantity(&self) -> u32 {
        self.fields.quantity
    }

    pub fn total_price(&self) -> f64 {
        self.fields.total_price
    }

    pub fn stock_reduced(&self) -> bool {
        self.stock_reduced
    }

    pub fn mark_stock_reduced(&mut self) {
        self.stock_reduced = true;
    }

    /// A Local sale whose units the server has not taken out of stock yet
    pub fn holds_stock(&self) -> bool {
        self.is_local() && !self.stock_reduced
    }
}

impl Entity for Sale {
    const KIND: EntityKind = EntityKind::Sale;
    type Draft = SaleDraft;
    type Patch = SalePatch;

    fn from_parts(meta: RecordMeta, draft: SaleDraft) -> Self {
        Self {
            meta,
            fields: draft,
            stock_reduced: false,
        }
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn draft(&self) -> SaleDraft {
        self.fields.clone()
    }

    fn apply(&mut self, patch: &SalePatch) {
        if let Some(customer) = &patch.customer_name {
            self.fields.customer_name = Some(customer.clone());
        }
        if let Some(total) = patch.total_price {
            self.fields.total_price = total;
        }
    }

    fn validate_draft(draft: &SaleDraft) -> Result<(), DomainError> {
        if draft.quantity == 0 {
            return Err(DomainError::invalid("quantity", "must be at least 1"));
        }
        require_amount("totalPrice", draft.total_price)
    }

    fn validate_patch(patch: &SalePatch) -> Result<(), DomainError> {
        if let Some(total) = patch.total_price {
            require_amount("totalPrice", total)?;
        }
        Ok(())
    }

    fn parent_id(&self) -> Option<&EntityId> {
        Some(&self.fields.product_id)
    }
}
