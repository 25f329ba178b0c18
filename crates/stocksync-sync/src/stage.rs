//! Stage descriptors
//!
//! A stage pushes the Local records of one entity kind. Each is described by
//! plain functions:
//!
//! - `repository`: which repository of the workspace it works on
//! - `remap`: rebuilds the remapper tables of the kinds it depends on
//! - `select`: which records to push
//! - `rewrite`: replaces local foreign keys with server ids in the payload
//! - `prepare`: server-side work that must precede the create
//!
//! Rewritten payloads are only sent, never stored: a record that fails to
//! push keeps its original references for the next run.
//!
//! [`default_pipeline`] lists the four stages in dependency order.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::{debug, info, warn};

use stocksync_core::domain::{
    Branch, BranchDraft, Entity, EntityId, EntityKind, Product, ProductDraft, Sale, SaleDraft,
    User, UserDraft,
};
use stocksync_core::ports::{IRemoteGateway, RemoteError, Syncable};
use stocksync_core::repository::{EntityRepository, Workspace};

use crate::remapper::IdRemapper;
use crate::report::{FailureReason, StageOutcome};

/// Settings shared by every stage of a run
#[derive(Debug, Clone, Copy)]
pub struct StageContext {
    /// Upper bound on each gateway call
    pub call_timeout: Duration,
}

/// One step of the sync pipeline
#[async_trait::async_trait]
pub trait SyncStage: Send + Sync {
    /// The entity kind this stage pushes
    fn kind(&self) -> EntityKind;

    /// Pushes every selected record, isolating per-record failures
    async fn run(
        &self,
        workspace: &mut Workspace,
        remapper: &mut IdRemapper,
        ctx: &StageContext,
    ) -> StageOutcome;
}

/// A required foreign key with no server id yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    pub field: &'static str,
    pub reference: EntityId,
}

impl From<Unresolved> for FailureReason {
    fn from(u: Unresolved) -> Self {
        FailureReason::Unresolved {
            field: u.field,
            reference: u.reference,
        }
    }
}

pub type RepositoryFn<E> = fn(&mut Workspace) -> &mut EntityRepository<E>;
pub type RemapFn = fn(&Workspace, &mut IdRemapper);
pub type SelectFn<E> = fn(&E) -> bool;
pub type RewriteFn<E> = fn(<E as Entity>::Draft, &IdRemapper) -> Result<<E as Entity>::Draft, Unresolved>;
pub type PrepareFuture<'a> = Pin<Box<dyn Future<Output = Result<(), FailureReason>> + Send + 'a>>;
pub type PrepareFn<E> = for<'a> fn(&'a mut Workspace, &'a E) -> PrepareFuture<'a>;

/// Data-driven stage for one entity kind
pub struct EntityStage<E: Syncable> {
    pub repository: RepositoryFn<E>,
    pub remap: RemapFn,
    pub select: SelectFn<E>,
    pub rewrite: RewriteFn<E>,
    pub prepare: PrepareFn<E>,
}

impl<E: Syncable> EntityStage<E> {
    /// Pushes a single record; returns its server id
    async fn push(
        &self,
        workspace: &mut Workspace,
        remapper: &IdRemapper,
        ctx: &StageContext,
        record: &E,
    ) -> Result<EntityId, FailureReason> {
        let local_id = record.id();
        let draft = (self.rewrite)(record.draft(), remapper)?;

        match tokio::time::timeout(ctx.call_timeout, (self.prepare)(workspace, record)).await {
            Ok(result) => result?,
            Err(_) => return Err(RemoteError::Timeout.into()),
        }

        let repo = (self.repository)(workspace);
        debug!(id = %local_id, "Syncing");
        let gateway = repo.gateway();
        let created = match tokio::time::timeout(ctx.call_timeout, gateway.create(&draft)).await {
            Ok(result) => result?,
            Err(_) => return Err(RemoteError::Timeout.into()),
        };

        let server_id = created.id().clone();
        repo.mark_synced(local_id, created)
            .await
            .map_err(|e| FailureReason::Storage(e.to_string()))?;

        Ok(server_id)
    }
}

#[async_trait::async_trait]
impl<E: Syncable> SyncStage for EntityStage<E> {
    fn kind(&self) -> EntityKind {
        E::KIND
    }

    async fn run(
        &self,
        workspace: &mut Workspace,
        remapper: &mut IdRemapper,
        ctx: &StageContext,
    ) -> StageOutcome {
        (self.remap)(workspace, remapper);

        let selected: Vec<E> = (self.repository)(workspace)
            .list()
            .iter()
            .filter(|r| (self.select)(r))
            .cloned()
            .collect();

        let mut outcome = StageOutcome::new(E::KIND, selected.len());
        if selected.is_empty() {
            debug!(kind = %E::KIND, "Nothing to push");
            return outcome;
        }
        info!(kind = %E::KIND, count = selected.len(), "Pushing local records");

        // Sequential: later records may reference ids recorded here
        for record in &selected {
            let local_id = record.id().clone();
            match self.push(workspace, remapper, ctx, record).await {
                Ok(server_id) => {
                    info!(kind = %E::KIND, local = %local_id, server = %server_id, "Synced");
                    remapper.record(E::KIND, local_id, server_id);
                    outcome.synced();
                }
                Err(reason) if reason.is_skip() => {
                    debug!(kind = %E::KIND, id = %local_id, %reason, "Skipped");
                    outcome.fail(local_id, reason);
                }
                Err(reason) => {
                    warn!(kind = %E::KIND, id = %local_id, %reason, "Sync failed, record stays local");
                    outcome.fail(local_id, reason);
                }
            }
        }

        outcome
    }
}

// ============================================================================
// Default pipeline
// ============================================================================

/// Branch, User, Product, Sale: parents before the records that reference
/// them
pub fn default_pipeline() -> Vec<Box<dyn SyncStage>> {
    vec![
        Box::new(EntityStage::<Branch> {
            repository: branches,
            remap: no_dependencies,
            select: is_local::<Branch>,
            prepare: nothing_to_prepare::<Branch>,
            rewrite: keep_branch,
        }),
        Box::new(EntityStage::<User> {
            repository: users,
            remap: remap_branches,
            select: is_local::<User>,
            prepare: nothing_to_prepare::<User>,
            rewrite: rewrite_user,
        }),
        Box::new(EntityStage::<Product> {
            repository: products,
            remap: no_dependencies,
            select: is_local::<Product>,
            prepare: nothing_to_prepare::<Product>,
            rewrite: keep_product,
        }),
        Box::new(EntityStage::<Sale> {
            repository: sales,
            remap: remap_products_and_users,
            select: is_local::<Sale>,
            rewrite: rewrite_sale,
            prepare: reduce_sold_stock,
        }),
    ]
}

fn branches(ws: &mut Workspace) -> &mut EntityRepository<Branch> {
    &mut ws.branches
}

fn users(ws: &mut Workspace) -> &mut EntityRepository<User> {
    &mut ws.users
}

fn products(ws: &mut Workspace) -> &mut EntityRepository<Product> {
    &mut ws.products
}

fn sales(ws: &mut Workspace) -> &mut EntityRepository<Sale> {
    &mut ws.sales
}

pub fn is_local<E: Entity>(record: &E) -> bool {
    record.is_local()
}

fn no_dependencies(_: &Workspace, _: &mut IdRemapper) {}

fn nothing_to_prepare<'a, E>(_: &'a mut Workspace, _: &'a E) -> PrepareFuture<'a> {
    Box::pin(async { Ok::<(), FailureReason>(()) })
}

/// A Local sale's units leave the server's stock before the sale is created
fn reduce_sold_stock<'a>(ws: &'a mut Workspace, sale: &'a Sale) -> PrepareFuture<'a> {
    Box::pin(async move {
        ws.reduce_sale_stock(sale.id())
            .await
            .map(|_| ())
            .map_err(FailureReason::from)
    })
}

fn remap_branches(ws: &Workspace, remapper: &mut IdRemapper) {
    remapper.rebuild(ws.branches.list());
}

fn remap_products_and_users(ws: &Workspace, remapper: &mut IdRemapper) {
    remapper.rebuild(ws.products.list());
    remapper.rebuild(ws.users.list());
}

/// The owning company is always a server id
fn keep_branch(draft: BranchDraft, _: &IdRemapper) -> Result<BranchDraft, Unresolved> {
    Ok(draft)
}

fn keep_product(draft: ProductDraft, _: &IdRemapper) -> Result<ProductDraft, Unresolved> {
    Ok(draft)
}

/// `branchId` is optional, but once set it must resolve
pub fn rewrite_user(mut draft: UserDraft, remapper: &IdRemapper) -> Result<UserDraft, Unresolved> {
    if let Some(branch_id) = draft.branch_id.take() {
        let resolved = remapper
            .resolve(EntityKind::Branch, &branch_id)
            .ok_or(Unresolved {
                field: "branchId",
                reference: branch_id,
            })?;
        draft.branch_id = Some(resolved);
    }
    Ok(draft)
}

/// `productId` must resolve; an unresolved `sellerId` is dropped and the
/// server attributes the sale to the caller
pub fn rewrite_sale(mut draft: SaleDraft, remapper: &IdRemapper) -> Result<SaleDraft, Unresolved> {
    draft.product_id = remapper
        .resolve(EntityKind::Product, &draft.product_id)
        .ok_or_else(|| Unresolved {
            field: "productId",
            reference: draft.product_id.clone(),
        })?;

    if let Some(seller_id) = draft.seller_id.take() {
        draft.seller_id = remapper.resolve(EntityKind::User, &seller_id);
        if draft.seller_id.is_none() {
            debug!(seller = %seller_id, "Seller not synced, sending sale without it");
        }
    }
    Ok(draft)
}
