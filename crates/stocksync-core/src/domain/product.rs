//! Product entity

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entity::{require_amount, require_server_id, require_text, Entity};
use super::errors::DomainError;
use super::newtypes::{EntityId, EntityKind, RecordMeta};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub company_id: EntityId,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    /// Free-form attributes (size, colour, ...); not interpreted by sync
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,
}

impl ProductDraft {
    pub fn new(company_id: EntityId, name: impl Into<String>, price: f64, quantity: u32) -> Self {
        Self {
            company_id,
            name: name.into(),
            price,
            quantity,
            attributes: BTreeMap::new(),
        }
    }
}

/// Partial product update; `company_id` is never applied or sent upstream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, Value>>,
}

/// A stocked item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(flatten)]
    meta: RecordMeta,
    #[serde(flatten)]
    fields: ProductDraft,
}

impl Product {
    pub fn fields(&self) -> &ProductDraft {
        &self.fields
    }

    pub fn name(&self) -> &str {
        &self.fields.name
    }

    pub fn price(&self) -> f64 {
        self.fields.price
    }

    pub fn quantity(&self) -> u32 {
        self.fields.quantity
    }

    /// Decrement stock, refusing to go below zero
    ///
    /// Returns the remaining quantity.
    pub fn take_stock(&mut self, n: u32) -> Result<u32, DomainError> {
        let remaining = self.fields.quantity.checked_sub(n).ok_or_else(|| {
            DomainError::invalid(
                "quantity",
                format!("cannot take {n} from {}", self.fields.quantity),
            )
        })?;
        self.fields.quantity = remaining;
        Ok(remaining)
    }

    pub fn return_stock(&mut self, n: u32) -> u32 {
        self.fields.quantity = self.fields.quantity.saturating_add(n);
        self.fields.quantity
    }
}

impl Entity for Product {
    const KIND: EntityKind = EntityKind::Product;
    type Draft = ProductDraft;
    type Patch = ProductPatch;

    fn from_parts(meta: RecordMeta, draft: ProductDraft) -> Self {
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

    fn draft(&self) -> ProductDraft {
        self.fields.clone()
    }

    /// `company_id` is fixed at creation and ignored here
    fn apply(&mut self, patch: &ProductPatch) {
        if let Some(name) = &patch.name {
            self.fields.name = name.clone();
        }
        if let Some(price) = patch.price {
            self.fields.price = price;
        }
        if let Some(quantity) = patch.quantity {
            self.fields.quantity = quantity;
        }
        if let Some(attributes) = &patch.attributes {
            self.fields.attributes = attributes.clone();
        }
    }

    fn validate_draft(draft: &ProductDraft) -> Result<(), DomainError> {
        require_server_id("companyId", &draft.company_id)?;
        require_text("name", &draft.name)?;
        require_amount("price", draft.price)
    }

    fn validate_patch(patch: &ProductPatch) -> Result<(), DomainError> {
        if let Some(name) = &patch.name {
            require_text("name", name)?;
        }
        if let Some(price) = patch.price {
            require_amount("price", price)?;
        }
        Ok(())
    }

    fn parent_id(&self) -> Option<&EntityId> {
        Some(&self.fields.company_id)
    }
}
