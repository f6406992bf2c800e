//! API route configuration.

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers;
use crate::state::AppState;

/// Creates the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))

        // Cache-first geocoding
        .route("/geocode", get(handlers::geocode))

        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use tower::ServiceExt;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use geoproxy_core::traits::LookupStore;
    use geoproxy_core::types::CacheEntry;
    use geoproxy_lookup::LookupHandler;
    use geoproxy_store::MemoryStore;
    use geoproxy_upstream::{GeocodingClient, GeocodingConfig};

    use crate::dto::HealthResponse;
    use crate::state::ApiConfig;

    const ADDRESS_QUERY: &str = "70%20Vanderbilt%20Ave%2C%20New%20York%2C%20NY%2010017";
    const ADDRESS: &str = "70 Vanderbilt Ave, New York, NY 10017";
    const BODY: &str = r#"{"results":[{"geometry":{"location":{"lat":40.7529,"lng":-73.9772}}}],"status":"OK"}"#;

    fn test_app(server: &MockServer, store: Arc<MemoryStore>, api_key: Option<&str>) -> Router {
        let client = GeocodingClient::with_config(GeocodingConfig {
            base_url: format!("{}/geocode/json", server.uri()),
            api_key: api_key.map(Into::into),
            timeout_seconds: 5,
        })
        .unwrap();
        let handler = LookupHandler::new(store, Arc::new(client));
        create_router(Arc::new(AppState::new(ApiConfig::default(), handler)))
    }

    async fn get_uri(app: &Router, uri: &str) -> Response {
        app.clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn header<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
        response.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockServer::start().await;
        let app = test_app(&server, Arc::new(MemoryStore::new()), Some("k"));

        let response = get_uri(&app, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);

        let health: HealthResponse = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.cache_ttl_days, 30);
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("address", ADDRESS))
            .and(query_param("key", "k"))
            .respond_with(ResponseTemplate::new(200).set_body_string(BODY))
            .expect(1)
            .mount(&server)
            .await;
        let app = test_app(&server, Arc::new(MemoryStore::new()), Some("k"));
        let uri = format!("/geocode?address={ADDRESS_QUERY}");

        let first = get_uri(&app, &uri).await;
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(header(&first, "content-type"), Some("application/json"));
        assert_eq!(header(&first, "x-cache"), Some("MISS"));
        assert_eq!(body_string(first).await, BODY);

        let second = get_uri(&app, &uri).await;
        assert_eq!(second.status(), StatusCode::OK);
        assert_eq!(header(&second, "x-cache"), Some("HIT"));
        assert_eq!(body_string(second).await, BODY);
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(BODY))
            .expect(1)
            .mount(&server)
            .await;
        let store = Arc::new(MemoryStore::new());
        let past = chrono_past();
        store.put(CacheEntry::new(ADDRESS, "{\"stale\":true}", past)).await.unwrap();
        let app = test_app(&server, store.clone(), Some("k"));

        let response = get_uri(&app, &format!("/geocode?address={ADDRESS_QUERY}")).await;
        assert_eq!(header(&response, "x-cache"), Some("MISS"));
        assert_eq!(body_string(response).await, BODY);
        assert_eq!(store.get(ADDRESS).await.unwrap().unwrap().payload, BODY);
    }

    fn chrono_past() -> chrono::DateTime<chrono::Utc> {
        chrono::Utc::now() - chrono::Duration::hours(1)
    }

    #[tokio::test]
    async fn test_missing_address_is_400_plain_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let app = test_app(&server, Arc::new(MemoryStore::new()), Some("k"));

        for uri in ["/geocode", "/geocode?address=", "/geocode?address=%20%20"] {
            let response = get_uri(&app, uri).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert!(header(&response, "content-type").unwrap().starts_with("text/plain"));
            assert!(header(&response, "x-cache").is_none());
            assert_eq!(body_string(response).await, "Missing required parameter: address");
        }
    }

    #[tokio::test]
    async fn test_non_utf8_address_is_decoded_lossily() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("address", "\u{FFFD}"))
            .respond_with(ResponseTemplate::new(200).set_body_string(BODY))
            .expect(1)
            .mount(&server)
            .await;
        let store = Arc::new(MemoryStore::new());
        let app = test_app(&server, store.clone(), Some("k"));

        let first = get_uri(&app, "/geocode?address=%FF").await;
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(header(&first, "x-cache"), Some("MISS"));
        assert!(store.get("\u{FFFD}").await.unwrap().is_some());

        let second = get_uri(&app, "/geocode?address=%FF").await;
        assert_eq!(header(&second, "x-cache"), Some("HIT"));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_500_and_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;
        let store = Arc::new(MemoryStore::new());
        let app = test_app(&server, store.clone(), Some("k"));

        let response = get_uri(&app, &format!("/geocode?address={ADDRESS_QUERY}")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_string(response).await.contains("bad gateway"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_missing_api_key_is_500() {
        let server = MockServer::start().await;
        let app = test_app(&server, Arc::new(MemoryStore::new()), None);

        let response = get_uri(&app, &format!("/geocode?address={ADDRESS_QUERY}")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_string(response).await.contains("API key"));
    }
}
