//! Tower layers wrapped around every ichor route, plus the drain gate that
//! only wraps `/v1`.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Request, State};
use axum::http::header::HeaderName;
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use ichor_core::{Error, ErrorKind};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::config::NetworkConfig;
use super::shutdown::ShutdownController;
use crate::api::ApiError;

/// Spelled out so `build_http_layers` can be named in a signature. Reads
/// inside out: the body limit is innermost.
type HttpLayers = tower::layer::util::Stack<
    DefaultBodyLimit,
    tower::layer::util::Stack<
        PropagateRequestIdLayer,
        tower::layer::util::Stack<
            TimeoutLayer,
            tower::layer::util::Stack<
                CorsLayer,
                tower::layer::util::Stack<
                    CompressionLayer,
                    tower::layer::util::Stack<
                        TraceLayer<
                            tower_http::classify::SharedClassifier<
                                tower_http::classify::ServerErrorsAsFailures,
                            >,
                        >,
                        tower::layer::util::Stack<
                            SetRequestIdLayer<MakeRequestUuid>,
                            tower::layer::util::Identity,
                        >,
                    >,
                >,
            >,
        >,
    >,
>;

/// Layers shared by the probes and the API, first entry outermost.
///
/// A request id is minted before the trace span opens so every log line of
/// the request carries it, and the same id is echoed on the response.
/// Handlers running past `request_timeout` answer 408. Body extractors
/// answer 413 once more than `max_body_bytes` arrive.
#[must_use]
pub fn build_http_layers(config: &NetworkConfig) -> HttpLayers {
    let x_request_id = HeaderName::from_static("x-request-id");

    let cors = build_cors_layer(config);

    ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            x_request_id.clone(),
            MakeRequestUuid,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(PropagateRequestIdLayer::new(x_request_id))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .into_inner()
}

/// Explicit origins that fail to parse as header values are skipped.
fn build_cors_layer(config: &NetworkConfig) -> CorsLayer {
    let allow_origin = if config.allows_any_origin() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            config
                .cors_origins
                .iter()
                .filter_map(|o| o.trim().parse().ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}

/// Counts the request as in flight for the shutdown drain. Once draining
/// has started new requests are refused with 503.
pub async fn track_in_flight(
    State(shutdown): State<Arc<ShutdownController>>,
    req: Request,
    next: Next,
) -> Response {
    if !shutdown.health_state().accepts_requests() {
        return ApiError(Error::new(
            ErrorKind::Unavailable,
            "server is shutting down",
        ))
        .into_response();
    }

    let _guard = shutdown.in_flight_guard();
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    use super::*;

    fn layered(config: &NetworkConfig) -> Router {
        Router::new()
            .route("/echo", axum::routing::post(|body: String| async move { body }))
            .layer(build_http_layers(config))
    }

    #[tokio::test]
    async fn responses_carry_a_request_id() {
        let response = layered(&NetworkConfig::default())
            .oneshot(
                axum::http::Request::post("/echo")
                    .body(Body::from("hello"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn oversized_bodies_are_refused() {
        let config = NetworkConfig {
            max_body_bytes: 4,
            ..NetworkConfig::default()
        };
        let response = layered(&config)
            .oneshot(
                axum::http::Request::post("/echo")
                    .header("content-length", "16")
                    .body(Body::from("0123456789abcdef"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn body_at_the_limit_is_accepted() {
        let config = NetworkConfig {
            max_body_bytes: 4,
            ..NetworkConfig::default()
        };
        let response = layered(&config)
            .oneshot(
                axum::http::Request::post("/echo")
                    .body(Body::from("abcd"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"abcd");
    }

    fn tracked(shutdown: &Arc<ShutdownController>) -> Router {
        let counter = Arc::clone(shutdown);
        Router::new()
            .route(
                "/",
                get(move || async move { counter.in_flight_count().to_string() }),
            )
            .layer(axum::middleware::from_fn_with_state(
                Arc::clone(shutdown),
                track_in_flight,
            ))
    }

    #[tokio::test]
    async fn requests_are_counted_while_running() {
        let shutdown = Arc::new(ShutdownController::new());
        shutdown.set_ready();

        let response = tracked(&shutdown)
            .oneshot(Request::new(Body::empty()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"1");
        assert_eq!(shutdown.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn requests_are_refused_while_draining() {
        let shutdown = Arc::new(ShutdownController::new());
        shutdown.set_ready();
        shutdown.trigger_shutdown();

        let response = tracked(&shutdown)
            .oneshot(Request::new(Body::empty()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
