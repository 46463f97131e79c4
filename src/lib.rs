use axum::{
    extract::{FromRef, Request, State},
    http::HeaderName,
    Router,
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod access;
pub mod auth;
pub mod config;
pub mod forms;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod session;
pub mod storage;

// Module for routing segregation (Public, Authenticated).
pub mod routes;
use access::{AccessRuleTable, Requirement};
use auth::{AuthenticationGate, PasswordEncoder};
use routes::{authenticated, public};
use session::{SESSION_COOKIE, SessionLifecycle};

// --- Public Re-exports ---

// Makes core state types easily accessible to the application entry point.
pub use config::AppConfig;
pub use repository::{PostgresRepository, RepositoryState};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation (Swagger JSON) for the
/// application, aggregating all paths and schemas decorated with the
/// `#[utoipa::path]` and `#[derive(utoipa::ToSchema)]` macros.
/// The resulting JSON is served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login_page, handlers::login, handlers::logout,
        handlers::create_member, handlers::list_books, handlers::get_book,
        handlers::register_book, handlers::update_stock
    ),
    components(
        schemas(
            models::Book, models::LoginPage, models::MemberResponse,
            models::CreateMemberRequest, models::StockUpdateRequest,
            auth::Credentials, forms::FieldError,
        )
    ),
    tags(
        (name = "stock-portal", description = "Book stock management API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe, immutable container holding all application
/// services and configuration, shared across all incoming requests. Every
/// collaborator is injected here explicitly in `main` (the authentication
/// gate gets its repository and hasher, the lifecycle gets its store), so
/// the whole dependency graph is visible in one place.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: member and book persistence behind a trait object.
    pub repo: RepositoryState,
    /// Storage Layer: cover image object storage behind a trait object.
    pub storage: StorageState,
    /// Session issue/destroy/resolve over the session store collaborator.
    pub sessions: SessionLifecycle,
    /// Credential validation over the repository and the password encoder.
    pub gate: AuthenticationGate,
    /// The one-way secret hasher, shared with member registration.
    pub encoder: PasswordEncoder,
    /// The declarative per-request authorization table.
    pub access: AccessRuleTable,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These allow extractors and handlers to selectively pull components from
// the shared AppState instead of taking the whole state.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for SessionLifecycle {
    fn from_ref(app_state: &AppState) -> SessionLifecycle {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// access_gate
///
/// The middleware enforcing the access rule table on every request.
///
/// *Mechanism*: the table decides the requirement for the request path.
/// Bypassed and allowed paths proceed untouched; paths requiring
/// authentication proceed only when the request carries a session cookie
/// that resolves to a live session, and are otherwise redirected to the
/// login page. Because the layer wraps the entire router, fallback
/// included, a path that matches no route at all still fails closed.
async fn access_gate(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    match state.access.decide(request.uri().path()) {
        // Static-asset style paths skip the gate without consulting the
        // session store at all.
        Requirement::Bypass => next.run(request).await,
        Requirement::AllowAll => next.run(request).await,
        Requirement::RequireAuth => {
            if let Some(cookie) = jar.get(SESSION_COOKIE) {
                if state.sessions.resolve(cookie.value()).await.is_some() {
                    return next.run(request).await;
                }
            }
            Redirect::to("/").into_response()
        }
    }
}

/// create_router
///
/// Assembles the application's entire routing structure, applies the access
/// gate and the observability layers, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public Routes: the rule table lists each of these as open.
        .merge(public::public_routes())
        // Book Routes: protected by the gate's fail-closed default.
        .merge(authenticated::book_routes())
        // Apply the Unified State to all routes.
        .with_state(state.clone())
        // Access gate over the whole router, fallback included.
        .layer(middleware::from_fn_with_state(state, access_gate));

    // 3. Observability and Correlation Layers (Applied outermost/first)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: a unique UUID per incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: wraps the request/response lifecycle in
                // a span carrying the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: return the x-request-id header
                // to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Helper used by `TraceLayer` to customize span creation: the
/// `x-request-id` header (if present) is included in the structured logging
/// metadata alongside the HTTP method and URI, so every log line for a
/// single request is correlated by a unique ID.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
