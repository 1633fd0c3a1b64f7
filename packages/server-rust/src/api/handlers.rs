//! Handlers shared by every domain, generic over [`AppDomain`].

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use ichor_core::filter::QueryParams;
use ichor_core::{Error, ErrorKind, QueryResult, RequestContext};
use serde::Deserialize;
use uuid::Uuid;

use super::ApiError;
use crate::app::{parse_id, App, AppDomain};
use crate::domain::assettag::AssetTagDto;
use crate::domain::user::{UpdateUserDto, UserDomain, UserDto};
use crate::domain::Domains;

pub async fn query<D: AppDomain>(
    State(app): State<App<D>>,
    Query(params): Query<QueryParams>,
) -> Result<Json<QueryResult<D::Dto>>, ApiError> {
    Ok(Json(app.query(&params).await?))
}

pub async fn query_by_id<D: AppDomain>(
    State(app): State<App<D>>,
    Path(id): Path<String>,
) -> Result<Json<D::Dto>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(app.query_by_id(id).await?))
}

pub async fn create<D: AppDomain>(
    State(app): State<App<D>>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<D::NewDto>, JsonRejection>,
) -> Result<(StatusCode, Json<D::Dto>), ApiError> {
    let Json(dto) = payload?;
    let created = app.create(&ctx, dto).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update<D: AppDomain>(
    State(app): State<App<D>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    payload: Result<Json<D::UpdateDto>, JsonRejection>,
) -> Result<Json<D::Dto>, ApiError> {
    let id = parse_id(&id)?;
    let Json(dto) = payload?;
    Ok(Json(app.update(&ctx, id, dto).await?))
}

pub async fn delete<D: AppDomain>(
    State(app): State<App<D>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    app.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /v1/core/users/{id}`. Only admins may change roles or the enabled
/// flag, including their own.
pub async fn update_user(
    State(app): State<App<UserDomain>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserDto>, JsonRejection>,
) -> Result<Json<UserDto>, ApiError> {
    let id = parse_id(&id)?;
    let Json(dto) = payload?;
    if !ctx.is_admin() && (dto.roles.is_some() || dto.enabled.is_some()) {
        return Err(Error::new(
            ErrorKind::PermissionDenied,
            "only admins may change roles or enabled",
        )
        .into());
    }
    Ok(Json(app.update(&ctx, id, dto).await?))
}

#[derive(Debug, Deserialize)]
pub struct ReplaceAssetTags {
    pub tag_ids: Vec<Uuid>,
}

/// `PUT /v1/assets/assets/{id}/tags`
pub async fn replace_asset_tags(
    State(domains): State<Domains>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    payload: Result<Json<ReplaceAssetTags>, JsonRejection>,
) -> Result<Json<Vec<AssetTagDto>>, ApiError> {
    let asset_id = parse_id(&id)?;
    let Json(body) = payload?;
    Ok(Json(
        domains
            .replace_asset_tags(&ctx, asset_id, body.tag_ids)
            .await?,
    ))
}
