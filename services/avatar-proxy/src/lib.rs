//! Avatar proxy.
//!
//! Accepts `POST /api/edit-avatar` from the game client, builds a request for either the Gemini
//! (`:generateContent`) or Imagen (`imagegeneration:edit|generate`) API, and returns the
//! generated image as a data URI. The API key never leaves the server.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State as AxumState},
    http::{header, Method},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use url::Url;

pub mod error;
pub mod request;
pub mod sanitize;
pub mod upstream;

pub use error::ApiError;
pub use request::{AvatarRequest, RequestMeta};
pub use upstream::{AvatarResponse, Upstream, DEFAULT_UPSTREAM_BASE};

pub const EDIT_AVATAR_PATH: &str = "/api/edit-avatar";

#[derive(Clone, Debug)]
pub struct ProxyConfig {
    /// Key for the image API. Requests fail with 500 while unset.
    pub api_key: Option<String>,
    pub upstream_base: Url,
    pub timeout: Duration,
    pub body_limit_bytes: usize,
}

pub struct AppState {
    api_key: Option<String>,
    upstream: Upstream,
}

impl AppState {
    pub fn new(config: &ProxyConfig) -> reqwest::Result<Self> {
        Ok(Self {
            api_key: config
                .api_key
                .as_deref()
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(str::to_string),
            upstream: Upstream::new(config.upstream_base.clone(), config.timeout)?,
        })
    }
}

pub fn router(config: &ProxyConfig) -> reqwest::Result<Router> {
    let state = Arc::new(AppState::new(config)?);
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Ok(Router::new()
        .route(
            EDIT_AVATAR_PATH,
            post(edit_avatar).fallback(method_not_allowed),
        )
        .layer(DefaultBodyLimit::max(config.body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn edit_avatar(
    AxumState(state): AxumState<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<AvatarResponse>, ApiError> {
    let api_key = state.api_key.as_deref().ok_or(ApiError::MissingApiKey)?;
    let payload: Value = serde_json::from_slice(&body).map_err(|_| ApiError::InvalidJson)?;
    let request = AvatarRequest::from_payload(payload)?;
    let response = state.upstream.forward(api_key, &request).await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::IntoResponse,
    };
    use serde_json::json;
    use tower::ServiceExt;

    fn config(base: &str, api_key: Option<&str>) -> ProxyConfig {
        ProxyConfig {
            api_key: api_key.map(str::to_string),
            upstream_base: Url::parse(base).unwrap(),
            timeout: Duration::from_secs(5),
            body_limit_bytes: 1024 * 1024,
        }
    }

    /// Serve `status` and `body` for every POST, returning the base URL.
    async fn fake_upstream(status: StatusCode, body: Value) -> String {
        let app = Router::new().fallback(move || {
            let body = body.clone();
            async move { (status, Json(body)).into_response() }
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1beta/models")
    }

    async fn call(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(EDIT_AVATAR_PATH)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_wrong_method_is_405() {
        let router = router(&config(DEFAULT_UPSTREAM_BASE, Some("k"))).unwrap();
        let request = Request::builder()
            .method(Method::GET)
            .uri(EDIT_AVATAR_PATH)
            .body(Body::empty())
            .unwrap();
        let (status, body) = call(router, request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "Método no permitido");
    }

    #[tokio::test]
    async fn test_preflight_is_answered() {
        let router = router(&config(DEFAULT_UPSTREAM_BASE, Some("k"))).unwrap();
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri(EDIT_AVATAR_PATH)
            .header(header::ORIGIN, "https://example.com")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
        assert!(response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
    }

    #[tokio::test]
    async fn test_missing_key_is_500() {
        let router = router(&config(DEFAULT_UPSTREAM_BASE, Some("  "))).unwrap();
        let (status, body) = call(router, post_json(r#"{"image":"AAAA"}"#)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("GOOGLE_AI_KEY"));
    }

    #[tokio::test]
    async fn test_bad_bodies_are_400() {
        let router = router(&config(DEFAULT_UPSTREAM_BASE, Some("k"))).unwrap();
        for raw in ["{ nope", "[1,2]", r#"{"mode":"edit"}"#] {
            let (status, body) = call(router.clone(), post_json(raw)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{raw}");
            assert!(body.get("meta").is_none());
        }
    }

    #[tokio::test]
    async fn test_success_returns_data_uri_and_meta() {
        let base = fake_upstream(
            StatusCode::OK,
            json!({ "candidates": [{ "content": { "parts": [
                { "inlineData": { "mimeType": "image/png", "data": "QUJD" } }
            ] } }] }),
        )
        .await;
        let router = router(&config(&base, Some("k"))).unwrap();
        let (status, body) = call(
            router,
            post_json(r#"{"image":"AAAA","prompt":"hat","includeRaw":true}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["avatar"], "data:image/png;base64,QUJD");
        assert_eq!(body["meta"]["googleStatus"], 200);
        assert_eq!(body["meta"]["apiFamily"], "gemini");
        assert_eq!(body["meta"]["promptLength"], 3);
        assert_eq!(body["meta"]["inputBytes"], 3);
        assert!(body["meta"]["endpoint"]
            .as_str()
            .unwrap()
            .ends_with("/gemini-2.5-flash-image:generateContent"));
        assert!(body["raw"]["candidates"].is_array());
    }

    #[tokio::test]
    async fn test_rate_limit_passes_through() {
        let base = fake_upstream(
            StatusCode::TOO_MANY_REQUESTS,
            json!({ "error": { "code": 429 } }),
        )
        .await;
        let router = router(&config(&base, Some("k"))).unwrap();
        let (status, body) = call(router, post_json(r#"{"image":"AAAA"}"#)).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["details"]["error"]["code"], 429);
        assert_eq!(body["meta"]["mode"], "edit");
    }

    #[tokio::test]
    async fn test_upstream_failure_is_502() {
        let base = fake_upstream(StatusCode::INTERNAL_SERVER_ERROR, json!("boom")).await;
        let router = router(&config(&base, Some("k"))).unwrap();
        let (status, body) = call(router, post_json(r#"{"image":"AAAA"}"#)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "La llamada a Google falló (500)");
        assert_eq!(body["details"], "boom");
    }

    #[tokio::test]
    async fn test_response_without_image_is_502() {
        let base = fake_upstream(StatusCode::OK, json!({ "candidates": [] })).await;
        let router = router(&config(&base, Some("k"))).unwrap();
        let (status, body) = call(
            router,
            post_json(r#"{"mode":"generate","model":"imagen-3"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["details"]["payload"]["candidates"], json!([]));
        assert!(body["meta"]["endpoint"]
            .as_str()
            .unwrap()
            .ends_with("/imagegeneration:generate"));
    }

    #[tokio::test]
    async fn test_transport_failure_is_500() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let router = router(&config(&format!("http://{addr}/models"), Some("k"))).unwrap();
        let (status, body) = call(router, post_json(r#"{"image":"AAAA"}"#)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("No se pudo procesar la imagen"));
        assert!(body["meta"].is_object());
    }
}
