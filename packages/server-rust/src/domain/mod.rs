//! Business domains and the composition root that wires them to a backend.
//!
//! Each domain module owns its entity types (`mod.rs`), its SQL mapping
//! (`store.rs`) and its client-facing DTOs (`app.rs`). [`Domains`] builds one
//! [`App`] per domain over a shared [`Backend`] and [`Delegate`].

pub mod asset;
pub mod assettag;
pub mod country;
pub mod currency;
pub mod form;
pub mod inventorytransaction;
pub mod lottracking;
pub mod office;
pub mod orderlineitem;
mod pattern;
pub mod purchaseorderlineitemstatus;
pub mod region;
pub mod street;
pub mod supplier;
pub mod supplierproduct;
pub mod tag;
pub mod user;

use std::collections::HashSet;
use std::sync::Arc;

use ichor_core::{Delegate, Error, Page, RequestContext};
use tracing::{info, warn};
use uuid::Uuid;

use crate::app::{to_app_error, App, AppDomain};
use crate::bus::{BusError, Business, Domain};
use crate::sqldb::Tx;
use crate::store::{Backend, CacheConfig, CachedStore, PgTable};

use self::asset::AssetDomain;
use self::assettag::{AssetTagDomain, AssetTagDto, AssetTagFilter, NewAssetTag};
use self::country::CountryDomain;
use self::currency::CurrencyDomain;
use self::form::FormDomain;
use self::inventorytransaction::InventoryTransactionDomain;
use self::lottracking::LotTrackingDomain;
use self::office::OfficeDomain;
use self::orderlineitem::OrderLineItemDomain;
use self::purchaseorderlineitemstatus::PurchaseOrderLineItemStatusDomain;
use self::region::RegionDomain;
use self::street::StreetDomain;
use self::supplier::SupplierDomain;
use self::supplierproduct::SupplierProductDomain;
use self::tag::TagDomain;
use self::user::UserDomain;

/// Upper bound on the tags attached to one asset in a single replace call.
pub const MAX_ASSET_TAGS: usize = 100;

/// Event names of every domain, as carried in delegate events.
pub const DOMAIN_NAMES: [&str; 16] = [
    AssetDomain::NAME,
    AssetTagDomain::NAME,
    CountryDomain::NAME,
    CurrencyDomain::NAME,
    FormDomain::NAME,
    InventoryTransactionDomain::NAME,
    LotTrackingDomain::NAME,
    OfficeDomain::NAME,
    OrderLineItemDomain::NAME,
    PurchaseOrderLineItemStatusDomain::NAME,
    RegionDomain::NAME,
    StreetDomain::NAME,
    SupplierDomain::NAME,
    SupplierProductDomain::NAME,
    TagDomain::NAME,
    UserDomain::NAME,
];

fn app<D: AppDomain + PgTable>(backend: &Backend, delegate: &Arc<Delegate>) -> App<D> {
    App::new(Business::new(backend.storer::<D>(), Arc::clone(delegate)))
}

/// Every domain's application layer over one backend.
#[derive(Clone)]
pub struct Domains {
    backend: Backend,
    pub asset: App<AssetDomain>,
    pub asset_tag: App<AssetTagDomain>,
    pub country: App<CountryDomain>,
    pub currency: App<CurrencyDomain>,
    pub form: App<FormDomain>,
    pub inventory_transaction: App<InventoryTransactionDomain>,
    pub lot_tracking: App<LotTrackingDomain>,
    pub office: App<OfficeDomain>,
    pub order_line_item: App<OrderLineItemDomain>,
    pub purchase_order_line_item_status: App<PurchaseOrderLineItemStatusDomain>,
    pub region: App<RegionDomain>,
    pub street: App<StreetDomain>,
    pub supplier: App<SupplierDomain>,
    pub supplier_product: App<SupplierProductDomain>,
    pub tag: App<TagDomain>,
    pub user: App<UserDomain>,
}

impl Domains {
    /// Builds every domain. Currencies are read through a cache configured by
    /// `cache`.
    #[must_use]
    pub fn new(backend: Backend, delegate: Arc<Delegate>, cache: CacheConfig) -> Self {
        let currency_store = Arc::new(CachedStore::new(
            backend.storer::<CurrencyDomain>(),
            cache,
        ));

        Self {
            asset: app(&backend, &delegate),
            asset_tag: app(&backend, &delegate),
            country: app(&backend, &delegate),
            currency: App::new(Business::new(currency_store, Arc::clone(&delegate))),
            form: app(&backend, &delegate),
            inventory_transaction: app(&backend, &delegate),
            lot_tracking: app(&backend, &delegate),
            office: app(&backend, &delegate),
            order_line_item: app(&backend, &delegate),
            purchase_order_line_item_status: app(&backend, &delegate),
            region: app(&backend, &delegate),
            street: app(&backend, &delegate),
            supplier: app(&backend, &delegate),
            supplier_product: app(&backend, &delegate),
            tag: app(&backend, &delegate),
            user: app(&backend, &delegate),
            backend,
        }
    }

    #[must_use]
    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Replaces the tags of `asset_id` with exactly `tag_ids` inside one
    /// transaction. Rows for tags that stay are kept; duplicates in
    /// `tag_ids` are ignored. Returns the asset's tag rows afterwards.
    ///
    /// # Errors
    ///
    /// `NotFound` if the asset does not exist, `InvalidArgument` if a tag id
    /// is unknown or too many are given, `Internal` if the transaction fails.
    pub async fn replace_asset_tags(
        &self,
        ctx: &RequestContext,
        asset_id: Uuid,
        tag_ids: Vec<Uuid>,
    ) -> Result<Vec<AssetTagDto>, Error> {
        let mut seen = HashSet::new();
        let tag_ids: Vec<Uuid> = tag_ids.into_iter().filter(|id| seen.insert(*id)).collect();
        if tag_ids.len() > MAX_ASSET_TAGS {
            return Err(Error::field(
                "tag_ids",
                format!("at most {MAX_ASSET_TAGS} tags may be attached to an asset"),
            ));
        }

        self.asset
            .business()
            .query_by_id(asset_id)
            .await
            .map_err(to_app_error)?;

        let known = self
            .tag
            .business()
            .query_by_ids(&tag_ids)
            .await
            .map_err(to_app_error)?;
        if known.len() != tag_ids.len() {
            let known: HashSet<Uuid> = known.iter().map(|t| t.id).collect();
            let unknown: Vec<String> = tag_ids
                .iter()
                .filter(|id| !known.contains(id))
                .map(Uuid::to_string)
                .collect();
            return Err(Error::field(
                "tag_ids",
                format!("unknown tag ids: {}", unknown.join(", ")),
            ));
        }

        let tx = self
            .backend
            .begin()
            .await
            .map_err(|e| to_app_error(BusError::from_store(AssetTagDomain::NAME, e)))?;

        match self.replace_in_tx(&tx, ctx, asset_id, &tag_ids).await {
            Ok(rows) => {
                tx.commit()
                    .await
                    .map_err(|e| to_app_error(BusError::from_store(AssetTagDomain::NAME, e)))?;
                info!(%asset_id, tags = rows.len(), "asset tags replaced");
                Ok(rows.into_iter().map(AssetTagDomain::to_dto).collect())
            }
            Err(err) => {
                if let Err(rollback) = tx.rollback().await {
                    warn!(%asset_id, error = %rollback, "asset tag rollback failed");
                }
                Err(to_app_error(err))
            }
        }
    }

    async fn replace_in_tx(
        &self,
        tx: &Tx,
        ctx: &RequestContext,
        asset_id: Uuid,
        tag_ids: &[Uuid],
    ) -> Result<Vec<assettag::AssetTag>, BusError> {
        let bus = self.asset_tag.business().new_with_tx(tx)?;
        let filter = AssetTagFilter {
            asset_id: Some(asset_id),
            ..AssetTagFilter::default()
        };
        let existing = bus
            .query(&filter, &AssetTagDomain::DEFAULT_ORDER, Page::everything())
            .await?;

        let mut kept = Vec::with_capacity(tag_ids.len());
        for row in existing {
            if tag_ids.contains(&row.tag_id) {
                kept.push(row);
            } else {
                bus.delete(ctx, row).await?;
            }
        }

        for tag_id in tag_ids {
            if kept.iter().any(|row| row.tag_id == *tag_id) {
                continue;
            }
            let row = bus
                .create(
                    ctx,
                    NewAssetTag {
                        asset_id,
                        tag_id: *tag_id,
                    },
                )
                .await?;
            kept.push(row);
        }

        Ok(kept)
    }
}
