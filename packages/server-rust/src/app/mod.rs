//! Application layer: DTO translation, validation and error mapping between
//! the HTTP handlers and the business layer.

use ichor_core::filter::QueryParams;
use ichor_core::{order, Error, ErrorKind, FieldErrors, Page, QueryResult, RequestContext};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::error;
use uuid::Uuid;
use validator::Validate;

use crate::bus::{BusError, Business, Domain};

/// Client-facing description of a domain.
pub trait AppDomain: Domain {
    /// Path below `/v1/` (`"core/currencies"`).
    const ROUTE: &'static str;
    /// `orderBy` names accepted from clients, mapped to business fields.
    const ORDER_FIELDS: &'static [(&'static str, &'static str)];

    type Dto: Serialize + Send + 'static;
    type NewDto: DeserializeOwned + Validate + Send + 'static;
    type UpdateDto: DeserializeOwned + Validate + Send + 'static;

    fn to_dto(entity: Self::Entity) -> Self::Dto;

    /// Converts an already validated create payload.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for failures the declarative validators cannot
    /// express (cross-field rules, allowed values).
    fn to_bus_new(dto: Self::NewDto) -> Result<Self::New, Error>;

    /// Converts an already validated update payload.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for values outside their allowed set.
    fn to_bus_update(dto: Self::UpdateDto) -> Result<Self::Update, Error>;

    /// # Errors
    ///
    /// `InvalidArgument` listing every filter parameter that failed to parse.
    fn parse_filter(params: &QueryParams) -> Result<Self::Filter, Error>;

    /// Cross-field rules that need the stored entity to evaluate.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if applying `update` to `entity` would break a rule.
    fn check_update(_entity: &Self::Entity, _update: &Self::Update) -> Result<(), Error> {
        Ok(())
    }
}

/// Maps business errors to client-facing errors. Store failures are logged
/// here and reach the client only as a generic internal error.
#[must_use]
pub fn to_app_error(err: BusError) -> Error {
    match &err {
        BusError::NotFound { .. } => Error::not_found(err.to_string()),
        BusError::UniqueEntry { .. } | BusError::ForeignKeyViolation { .. } => {
            Error::new(ErrorKind::Aborted, err.to_string())
        }
        BusError::Store { domain, .. } => {
            error!(domain = *domain, error = %err, "store failure");
            Error::internal("internal server error")
        }
    }
}

/// Parses a path identifier.
///
/// # Errors
///
/// `InvalidArgument` if `raw` is not a UUID.
pub fn parse_id(raw: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(raw).map_err(|e| Error::field("id", format!("invalid id {raw}: {e}")))
}

/// Application-layer API for domain `D`.
pub struct App<D: AppDomain> {
    bus: Business<D>,
}

impl<D: AppDomain> Clone for App<D> {
    fn clone(&self) -> Self {
        Self {
            bus: self.bus.clone(),
        }
    }
}

impl<D: AppDomain> App<D> {
    #[must_use]
    pub fn new(bus: Business<D>) -> Self {
        Self { bus }
    }

    #[must_use]
    pub fn business(&self) -> &Business<D> {
        &self.bus
    }

    /// # Errors
    ///
    /// `InvalidArgument` for validation failures, `Aborted` for uniqueness
    /// or foreign-key conflicts.
    pub async fn create(&self, ctx: &RequestContext, dto: D::NewDto) -> Result<D::Dto, Error> {
        dto.validate()?;
        let new = D::to_bus_new(dto)?;
        let entity = self.bus.create(ctx, new).await.map_err(to_app_error)?;
        Ok(D::to_dto(entity))
    }

    /// # Errors
    ///
    /// `NotFound` if `id` does not exist, otherwise as [`App::create`].
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        dto: D::UpdateDto,
    ) -> Result<D::Dto, Error> {
        dto.validate()?;
        let update = D::to_bus_update(dto)?;
        let entity = self.bus.query_by_id(id).await.map_err(to_app_error)?;
        D::check_update(&entity, &update)?;
        let entity = self
            .bus
            .update(ctx, entity, update)
            .await
            .map_err(to_app_error)?;
        Ok(D::to_dto(entity))
    }

    /// # Errors
    ///
    /// `NotFound` if `id` does not exist, `Aborted` if it is still referenced.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), Error> {
        let entity = self.bus.query_by_id(id).await.map_err(to_app_error)?;
        self.bus.delete(ctx, entity).await.map_err(to_app_error)
    }

    /// Parses `page`, `rows`, `orderBy` and the domain filters from `params`
    /// and returns one page of results with the total count.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` with every malformed parameter listed together.
    pub async fn query(&self, params: &QueryParams) -> Result<QueryResult<D::Dto>, Error> {
        let param = |key: &str| params.get(key).map(String::as_str);
        let mut errors = FieldErrors::new();

        let page = Page::parse(param("page"), param("rows"))
            .map_err(|e| errors.absorb("page", e))
            .ok();
        let order = order::parse(D::ORDER_FIELDS, param("orderBy"), D::DEFAULT_ORDER)
            .map_err(|e| errors.absorb("orderBy", e))
            .ok();
        let filter = D::parse_filter(params)
            .map_err(|e| errors.absorb("filter", e))
            .ok();

        let (Some(page), Some(order), Some(filter)) = (page, order, filter) else {
            return Err(errors.into());
        };

        let items = self
            .bus
            .query(&filter, &order, page)
            .await
            .map_err(to_app_error)?;
        let total = self.bus.count(&filter).await.map_err(to_app_error)?;

        Ok(QueryResult::new(
            items.into_iter().map(D::to_dto).collect(),
            total,
            page,
        ))
    }

    /// # Errors
    ///
    /// `NotFound` if `id` does not exist.
    pub async fn query_by_id(&self, id: Uuid) -> Result<D::Dto, Error> {
        let entity = self.bus.query_by_id(id).await.map_err(to_app_error)?;
        Ok(D::to_dto(entity))
    }
}
