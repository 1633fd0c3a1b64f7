//! `/v1` REST routes for every domain.
//!
//! Each domain gets the same five routes under `/v1/{route}`. Every route
//! carries its own [`authorize`] layer naming the table and action it
//! touches; [`authenticate`] wraps the whole router.

mod error;
mod handlers;

pub use error::ApiError;
pub use handlers::ReplaceAssetTags;

use axum::middleware;
use axum::routing::{delete, get, post, put, MethodRouter};
use axum::Router;

use crate::app::{App, AppDomain};
use crate::auth::{authenticate, authorize, Access, AuthState, Rule, TableAction};
use crate::bus::Domain;
use crate::domain::assettag::AssetTagDomain;
use crate::domain::user::UserDomain;
use crate::domain::Domains;

fn guarded<S>(route: MethodRouter<S>, table: &'static str, action: TableAction, rule: Rule) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.route_layer(middleware::from_fn_with_state(
        Access::new(table, action, rule),
        authorize,
    ))
}

fn paths<D: AppDomain>() -> (String, String) {
    let collection = format!("/v1/{}", D::ROUTE);
    let item = format!("{collection}/{{id}}");
    (collection, item)
}

fn crud<D: AppDomain>(app: App<D>) -> Router {
    let (collection, item) = paths::<D>();
    let table = D::TABLE;

    Router::new()
        .route(
            &collection,
            guarded(get(handlers::query::<D>), table, TableAction::Read, Rule::Any).merge(guarded(
                post(handlers::create::<D>),
                table,
                TableAction::Create,
                Rule::Any,
            )),
        )
        .route(
            &item,
            guarded(get(handlers::query_by_id::<D>), table, TableAction::Read, Rule::Any)
                .merge(guarded(
                    put(handlers::update::<D>),
                    table,
                    TableAction::Update,
                    Rule::Any,
                ))
                .merge(guarded(
                    delete(handlers::delete::<D>),
                    table,
                    TableAction::Delete,
                    Rule::Any,
                )),
        )
        .with_state(app)
}

/// Users may read and update only themselves; listing, creating and
/// deleting users is for admins.
fn users(app: App<UserDomain>) -> Router {
    let (collection, item) = paths::<UserDomain>();
    let table = UserDomain::TABLE;

    Router::new()
        .route(
            &collection,
            guarded(
                get(handlers::query::<UserDomain>),
                table,
                TableAction::Read,
                Rule::AdminOnly,
            )
            .merge(guarded(
                post(handlers::create::<UserDomain>),
                table,
                TableAction::Create,
                Rule::AdminOnly,
            )),
        )
        .route(
            &item,
            guarded(
                get(handlers::query_by_id::<UserDomain>),
                table,
                TableAction::Read,
                Rule::AdminOrSubject,
            )
            .merge(guarded(
                put(handlers::update_user),
                table,
                TableAction::Update,
                Rule::AdminOrSubject,
            ))
            .merge(guarded(
                delete(handlers::delete::<UserDomain>),
                table,
                TableAction::Delete,
                Rule::AdminOnly,
            )),
        )
        .with_state(app)
}

fn asset_tags(domains: Domains) -> Router {
    Router::new()
        .route(
            "/v1/assets/assets/{id}/tags",
            guarded(
                put(handlers::replace_asset_tags),
                AssetTagDomain::TABLE,
                TableAction::Update,
                Rule::Any,
            ),
        )
        .with_state(domains)
}

/// Builds the authenticated `/v1` router over `domains`.
#[must_use]
pub fn router(domains: &Domains, auth: AuthState) -> Router {
    Router::new()
        .merge(crud(domains.asset.clone()))
        .merge(crud(domains.asset_tag.clone()))
        .merge(crud(domains.country.clone()))
        .merge(crud(domains.currency.clone()))
        .merge(crud(domains.form.clone()))
        .merge(crud(domains.inventory_transaction.clone()))
        .merge(crud(domains.lot_tracking.clone()))
        .merge(crud(domains.office.clone()))
        .merge(crud(domains.order_line_item.clone()))
        .merge(crud(domains.purchase_order_line_item_status.clone()))
        .merge(crud(domains.region.clone()))
        .merge(crud(domains.street.clone()))
        .merge(crud(domains.supplier.clone()))
        .merge(crud(domains.supplier_product.clone()))
        .merge(crud(domains.tag.clone()))
        .merge(users(domains.user.clone()))
        .merge(asset_tags(domains.clone()))
        .layer(middleware::from_fn_with_state(auth, authenticate))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
    use axum::http::{Method, Request, StatusCode};
    use ichor_core::Delegate;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::auth::{AuthConfig, JwtAuthenticator, BEARER_FORMAT};
    use crate::store::{Backend, CacheConfig};

    struct Harness {
        router: Router,
        jwt: Arc<JwtAuthenticator>,
        admin: String,
        user: String,
    }

    fn harness() -> Harness {
        let domains = Domains::new(
            Backend::Memory,
            Arc::new(Delegate::new()),
            CacheConfig::default(),
        );
        let jwt = Arc::new(
            JwtAuthenticator::new(&AuthConfig {
                secret: "test-secret".to_string(),
                ..AuthConfig::default()
            })
            .unwrap(),
        );
        let admin = jwt.issue(Uuid::new_v4(), &["ADMIN".to_string()]).unwrap();
        let user = jwt.issue(Uuid::new_v4(), &["USER".to_string()]).unwrap();
        let router = router(&domains, AuthState::new(jwt.clone()));
        Harness {
            router,
            jwt,
            admin,
            user,
        }
    }

    async fn send(
        router: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn forms_list_is_sorted_by_name() {
        let h = harness();
        for name in ["j", "c", "a", "h", "e", "b", "i", "d", "g", "f"] {
            let (status, _) = send(
                &h.router,
                Method::POST,
                "/v1/config/forms",
                Some(&h.admin),
                Some(json!({"name": format!("form-{name}")})),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = send(
            &h.router,
            Method::GET,
            "/v1/config/forms?page=1&rows=10",
            Some(&h.user),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 10);
        assert_eq!(body["page"], 1);
        assert_eq!(body["rowsPerPage"], 10);

        let names: Vec<&str> = body["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["name"].as_str().unwrap())
            .collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names.len(), 10);
        assert_eq!(names, sorted);
    }

    #[tokio::test]
    async fn currency_without_code_is_a_field_error() {
        let h = harness();
        let (status, body) = send(
            &h.router,
            Method::POST,
            "/v1/core/currencies",
            Some(&h.admin),
            Some(json!({
                "name": "US Dollar",
                "symbol": "$",
                "locale": "en-US",
                "decimal_places": 2
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_argument");
        assert_eq!(body["fields"][0]["field"], "code");
        assert_eq!(body["fields"][0]["error"], "code is a required field");
    }

    #[tokio::test]
    async fn non_admin_cannot_create_currency() {
        let h = harness();
        let (status, body) = send(
            &h.router,
            Method::POST,
            "/v1/core/currencies",
            Some(&h.user),
            Some(json!({
                "code": "USD",
                "name": "US Dollar",
                "symbol": "$",
                "locale": "en-US",
                "decimal_places": 2
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body["message"],
            "user does not have permission CREATE for table: core.currencies"
        );
    }

    #[tokio::test]
    async fn missing_or_bad_token_is_unauthenticated() {
        let h = harness();
        let (status, body) = send(&h.router, Method::GET, "/v1/assets/tags", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], BEARER_FORMAT);

        let (status, body) = send(
            &h.router,
            Method::GET,
            "/v1/assets/tags",
            Some("not-a-token"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("authentication failed: "));
    }

    #[tokio::test]
    async fn second_page_of_tags_is_disjoint() {
        let h = harness();
        for i in 0..25 {
            let (status, _) = send(
                &h.router,
                Method::POST,
                "/v1/assets/tags",
                Some(&h.admin),
                Some(json!({"name": format!("tag-{i:02}"), "description": "d"})),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, first) = send(
            &h.router,
            Method::GET,
            "/v1/assets/tags?page=1&rows=10",
            Some(&h.admin),
            None,
        )
        .await;
        let (status, second) = send(
            &h.router,
            Method::GET,
            "/v1/assets/tags?page=2&rows=10",
            Some(&h.admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["total"], 25);

        let first = first["items"].as_array().unwrap();
        let second = second["items"].as_array().unwrap();
        assert_eq!(second.len(), 10);
        assert!(second.iter().all(|t| !first.contains(t)));
    }

    #[tokio::test]
    async fn bad_query_parameters_are_rejected() {
        let h = harness();
        let (status, body) = send(
            &h.router,
            Method::GET,
            "/v1/assets/tags?orderBy=secret,ASC&rows=1000",
            Some(&h.admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["fields"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn tag_crud_round_trip() {
        let h = harness();
        let (status, created) = send(
            &h.router,
            Method::POST,
            "/v1/assets/tags",
            Some(&h.admin),
            Some(json!({"name": "fragile", "description": "handle with care"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let uri = format!("/v1/assets/tags/{}", created["id"].as_str().unwrap());

        let (status, fetched) = send(&h.router, Method::GET, &uri, Some(&h.user), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);

        let (status, updated) = send(
            &h.router,
            Method::PUT,
            &uri,
            Some(&h.admin),
            Some(json!({"description": "glass"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], "fragile");
        assert_eq!(updated["description"], "glass");

        let (status, _) = send(&h.router, Method::DELETE, &uri, Some(&h.user), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&h.router, Method::DELETE, &uri, Some(&h.admin), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, _) = send(&h.router, Method::GET, &uri, Some(&h.admin), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_id_and_body_are_bad_requests() {
        let h = harness();
        let (status, body) = send(
            &h.router,
            Method::GET,
            "/v1/assets/tags/not-a-uuid",
            Some(&h.admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["fields"][0]["field"], "id");

        let (status, body) = send(
            &h.router,
            Method::POST,
            "/v1/assets/tags",
            Some(&h.admin),
            Some(json!({"name": 42})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_argument");
    }

    #[tokio::test]
    async fn duplicate_tag_name_conflicts() {
        let h = harness();
        let tag = json!({"name": "dup", "description": "d"});
        let (status, _) = send(
            &h.router,
            Method::POST,
            "/v1/assets/tags",
            Some(&h.admin),
            Some(tag.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = send(
            &h.router,
            Method::POST,
            "/v1/assets/tags",
            Some(&h.admin),
            Some(tag),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "aborted");
    }

    #[tokio::test]
    async fn asset_tags_are_replaced() {
        let h = harness();
        let (_, asset) = send(
            &h.router,
            Method::POST,
            "/v1/assets/assets",
            Some(&h.admin),
            Some(json!({"name": "Pallet jack", "serial_number": "PJ-1", "model_number": "PJ"})),
        )
        .await;
        let mut tag_ids = Vec::new();
        for name in ["blue", "red", "green"] {
            let (_, tag) = send(
                &h.router,
                Method::POST,
                "/v1/assets/tags",
                Some(&h.admin),
                Some(json!({"name": name, "description": ""})),
            )
            .await;
            tag_ids.push(tag["id"].clone());
        }

        let uri = format!("/v1/assets/assets/{}/tags", asset["id"].as_str().unwrap());
        let (status, rows) = send(
            &h.router,
            Method::PUT,
            &uri,
            Some(&h.admin),
            Some(json!({"tag_ids": [tag_ids[0], tag_ids[1]]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(rows.as_array().unwrap().len(), 2);

        let (status, rows) = send(
            &h.router,
            Method::PUT,
            &uri,
            Some(&h.admin),
            Some(json!({"tag_ids": [tag_ids[2]]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(rows[0]["tag_id"], tag_ids[2]);

        let (_, listed) = send(
            &h.router,
            Method::GET,
            &format!(
                "/v1/assets/assettags?asset_id={}",
                asset["id"].as_str().unwrap()
            ),
            Some(&h.admin),
            None,
        )
        .await;
        assert_eq!(listed["total"], 1);

        let (status, _) = send(
            &h.router,
            Method::PUT,
            &uri,
            Some(&h.user),
            Some(json!({"tag_ids": []})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn users_may_only_edit_themselves() {
        let h = harness();
        let (status, me) = send(
            &h.router,
            Method::POST,
            "/v1/core/users",
            Some(&h.admin),
            Some(json!({
                "username": "jdoe",
                "first_name": "Jo",
                "last_name": "Doe",
                "email": "jdoe@example.com",
                "roles": ["USER"]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let my_id = Uuid::parse_str(me["id"].as_str().unwrap()).unwrap();
        let token = h.jwt.issue(my_id, &["USER".to_string()]).unwrap();
        let uri = format!("/v1/core/users/{my_id}");

        let (status, updated) = send(
            &h.router,
            Method::PUT,
            &uri,
            Some(&token),
            Some(json!({"first_name": "Joanna"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["first_name"], "Joanna");

        let (status, _) = send(
            &h.router,
            Method::PUT,
            &uri,
            Some(&token),
            Some(json!({"roles": ["ADMIN"]})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            &h.router,
            Method::GET,
            &format!("/v1/core/users/{}", Uuid::new_v4()),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&h.router, Method::GET, "/v1/core/users", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
