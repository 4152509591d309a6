//! vocabs-api - HTTP API server for the vocabs SKOS editor.

mod auth;
mod error;
mod handlers;

use std::net::SocketAddr;

use axum::{
    http::Method,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use vocabs_core::defaults;
use vocabs_db::Database;

use handlers::{autocomplete, collections, concepts, labels, schemes, users};

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically — useful for
/// log correlation and debugging.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// STATE AND ROUTER
// =============================================================================

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

/// Build the full application router over the given state.
fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/:id",
            get(users::get_user).delete(users::delete_user),
        )
        .route("/users/:id/deactivate", post(users::deactivate_user))
        // Concept schemes and curators
        .route(
            "/schemes",
            get(schemes::list_schemes).post(schemes::create_scheme),
        )
        .route(
            "/schemes/:id",
            get(schemes::get_scheme)
                .patch(schemes::update_scheme)
                .delete(schemes::delete_scheme),
        )
        .route(
            "/schemes/:id/curators",
            get(schemes::list_curators)
                .post(schemes::add_curators)
                .delete(schemes::remove_curators),
        )
        // Collections and membership
        .route(
            "/collections",
            get(collections::list_collections).post(collections::create_collection),
        )
        .route(
            "/collections/:id",
            get(collections::get_collection)
                .patch(collections::update_collection)
                .delete(collections::delete_collection),
        )
        .route("/collections/:id/members", get(collections::list_members))
        .route(
            "/collections/:id/members/:concept_id",
            post(collections::add_member).delete(collections::remove_member),
        )
        // Concepts, hierarchy and relations
        .route(
            "/concepts",
            get(concepts::list_concepts).post(concepts::create_concept),
        )
        .route(
            "/concepts/:id",
            get(concepts::get_concept)
                .patch(concepts::update_concept)
                .delete(concepts::delete_concept),
        )
        .route("/concepts/:id/path", get(concepts::concept_path))
        .route(
            "/concepts/:id/descendants",
            get(concepts::concept_descendants),
        )
        .route("/concepts/:id/broader", get(concepts::concept_broader))
        .route("/concepts/:id/narrower", get(concepts::concept_narrower))
        .route(
            "/concepts/:id/relations",
            get(concepts::list_relations)
                .post(concepts::add_relation)
                .delete(concepts::remove_relation),
        )
        .route(
            "/concepts/:id/other-labels",
            get(concepts::list_other_labels),
        )
        .route(
            "/concepts/:id/other-labels/:label_id",
            post(concepts::add_other_label).delete(concepts::remove_other_label),
        )
        // Labels
        .route(
            "/labels",
            get(labels::list_labels).post(labels::create_label),
        )
        .route(
            "/labels/:id",
            get(labels::get_label)
                .patch(labels::update_label)
                .delete(labels::delete_label),
        )
        // Autocomplete
        .route("/ac/concepts", get(autocomplete::ac_concepts))
        .route(
            "/ac/concepts/unscoped",
            get(autocomplete::ac_concepts_unscoped),
        )
        .route("/ac/concepts/broader", get(autocomplete::ac_broader))
        .route(
            "/ac/concepts/external",
            get(autocomplete::ac_external_match),
        )
        .route("/ac/pref-labels", get(autocomplete::ac_pref_labels))
        .route("/ac/schemes", get(autocomplete::ac_schemes))
        .route("/ac/collections", get(autocomplete::ac_collections))
        .route("/ac/users", get(autocomplete::ac_users))
        // Middleware stack
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::any())
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::DELETE,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::HeaderName::from_static(auth::USER_ID_HEADER),
                ])
                .max_age(std::time::Duration::from_secs(defaults::CORS_MAX_AGE_SECS)),
        )
        .layer(RequestBodyLimitLayer::new(defaults::MAX_BODY_SIZE_BYTES))
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// =============================================================================
// MAIN
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   RUST_LOG    - standard env filter (default: "vocabs_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vocabs_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/vocabs".to_string());
    let bind_addr = std::env::var("VOCABS_BIND_ADDR")
        .unwrap_or_else(|_| format!("0.0.0.0:{}", defaults::SERVER_PORT));

    let db = Database::connect(&database_url).await?;
    db.migrate().await?;

    let state = AppState { db };
    let router = app(state);

    let addr: SocketAddr = bind_addr.parse()?;
    info!(
        subsystem = "api",
        component = "server",
        addr = %addr,
        "Starting vocabs API server"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[test]
    fn test_request_id_is_v7() {
        let mut maker = MakeRequestUuidV7;
        let req = axum::http::Request::new(());
        let id = maker.make_request_id(&req).expect("request id");
        let parsed = Uuid::parse_str(id.header_value().to_str().unwrap()).unwrap();
        assert_eq!(parsed.get_version_num(), 7);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let router: Router = Router::new().route("/health", get(health_check));

        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }
}
