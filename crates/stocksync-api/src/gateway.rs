//! REST implementation of the remote gateway ports
//!
//! A single generic [`HttpGateway`] serves every entity kind; the per-kind
//! differences (field names, payload shapes) live behind [`WireFormat`].

use std::marker::PhantomData;
use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info};

use stocksync_core::domain::{Branch, Entity, EntityId, Product, Sale, User};
use stocksync_core::ports::{IProductGateway, IRemoteGateway, RemoteError};

use crate::client::ApiClient;
use crate::normalize::{self, Object};
use crate::product::stock_body;
use crate::ApiError;

/// Translation between an entity and its JSON representation on the wire
pub trait WireFormat: Entity {
    /// Normalizes a server object into a Synced record
    fn from_wire(obj: &Object) -> Result<Self, ApiError>;

    /// Request body for a create call
    fn create_body(draft: &Self::Draft) -> Value;

    /// Request body for a partial update
    ///
    /// Must never carry the record's fixed parent association.
    fn update_body(patch: &Self::Patch) -> Value;
}

/// Gateway for one entity kind over the REST API
pub struct HttpGateway<E> {
    client: Arc<ApiClient>,
    _kind: PhantomData<fn() -> E>,
}

pub type BranchGateway = HttpGateway<Branch>;
pub type UserGateway = HttpGateway<User>;
pub type ProductGateway = HttpGateway<Product>;
pub type SaleGateway = HttpGateway<Sale>;

impl<E: WireFormat> HttpGateway<E> {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            _kind: PhantomData,
        }
    }

    fn collection_path() -> String {
        format!("/{}", E::KIND.collection())
    }

    fn record_path(id: &EntityId) -> String {
        format!("/{}/{}", E::KIND.collection(), id)
    }

    /// Sends a request that must answer with a single record
    async fn record_call(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<E, ApiError> {
        let value = self.client.send_expecting(method, path, body).await?;
        E::from_wire(&normalize::unwrap_record(value)?)
    }
}

impl<E> Clone for HttpGateway<E> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            _kind: PhantomData,
        }
    }
}

#[async_trait::async_trait]
impl<E: WireFormat> IRemoteGateway<E> for HttpGateway<E> {
    #[tracing::instrument(skip(self, draft), fields(kind = %E::KIND))]
    async fn create(&self, draft: &E::Draft) -> Result<E, RemoteError> {
        let body = E::create_body(draft);
        let record = self
            .record_call(Method::POST, &Self::collection_path(), Some(&body))
            .await?;
        info!(id = %record.id(), "Created on server");
        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(kind = %E::KIND))]
    async fn fetch(&self, id: &EntityId) -> Result<E, RemoteError> {
        Ok(self
            .record_call(Method::GET, &Self::record_path(id), None)
            .await?)
    }

    #[tracing::instrument(skip(self), fields(kind = %E::KIND))]
    async fn list(&self) -> Result<Vec<E>, RemoteError> {
        let value = self
            .client
            .send_expecting(Method::GET, &Self::collection_path(), None)
            .await?;

        let records = normalize::unwrap_list(value)?
            .into_iter()
            .map(|item| normalize::unwrap_record(item).and_then(|obj| E::from_wire(&obj)))
            .collect::<Result<Vec<E>, ApiError>>()?;

        debug!(count = records.len(), "Listed records");
        Ok(records)
    }

    #[tracing::instrument(skip(self, patch), fields(kind = %E::KIND))]
    async fn update(&self, id: &EntityId, patch: &E::Patch) -> Result<E, RemoteError> {
        let body = E::update_body(patch);
        Ok(self
            .record_call(Method::PATCH, &Self::record_path(id), Some(&body))
            .await?)
    }

    #[tracing::instrument(skip(self), fields(kind = %E::KIND))]
    async fn delete(&self, id: &EntityId) -> Result<(), RemoteError> {
        self.client
            .send(Method::DELETE, &Self::record_path(id), None)
            .await?;
        info!("Deleted on server");
        Ok(())
    }
}

#[async_trait::async_trait]
impl IProductGateway for HttpGateway<Product> {
    #[tracing::instrument(skip(self))]
    async fn reduce_quantity(&self, id: &EntityId, quantity: u32) -> Result<Product, RemoteError> {
        let path = format!("{}/reduce-quantity", Self::record_path(id));
        let product = self
            .record_call(Method::POST, &path, Some(&stock_body(quantity)))
            .await?;
        info!(remaining = product.quantity(), "Stock reduced on server");
        Ok(product)
    }

    #[tracing::instrument(skip(self))]
    async fn restore_quantity(
        &self,
        id: &EntityId,
        quantity: u32,
    ) -> Result<Product, RemoteError> {
        let path = format!("{}/restore-quantity", Self::record_path(id));
        let product = self
            .record_call(Method::POST, &path, Some(&stock_body(quantity)))
            .await?;
        info!(remaining = product.quantity(), "Stock restored on server");
        Ok(product)
    }
}
