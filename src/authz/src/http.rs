//! Decision HTTP API
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /v1/catalog` - Permission catalog grouped by category
//! - `GET /v1/roles` - Roles with labels and descriptions
//! - `GET /v1/roles/:role/permissions` - Permissions held by one role
//! - `POST /v1/check` - Permission check
//! - `POST /v1/routes/check` - Route check
//!
//! Every handler is a thin wrapper over [`AccessEngine`]; decisions for
//! unknown roles or permissions come back as ordinary denials, not errors.

use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

use crate::catalog::CategoryGroup;
use crate::engine::{AccessDecision, AccessEngine, PermissionCheck, RouteCheck};
use crate::types::{Permission, Role};

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    engine: AccessEngine,
    start_time: Instant,
}

impl AppState {
    pub fn new(engine: AccessEngine) -> Self {
        Self {
            engine,
            start_time: Instant::now(),
        }
    }

    pub fn engine(&self) -> &AccessEngine {
        &self.engine
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

/// API error type
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

fn require_non_blank(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{} cannot be empty", field)));
    }
    Ok(())
}

// =============================================================================
// Responses
// =============================================================================

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    uptime_seconds: u64,
    version: String,
    roles: usize,
    permissions: usize,
    guarded_routes: usize,
}

#[derive(Debug, Serialize)]
struct CatalogResponse {
    categories: Vec<CategoryGroup>,
}

#[derive(Debug, Serialize)]
struct RoleSummary {
    key: Role,
    label: String,
    description: String,
    permission_count: usize,
}

#[derive(Debug, Serialize)]
struct RolesResponse {
    roles: Vec<RoleSummary>,
}

#[derive(Debug, Serialize)]
struct RolePermissionsResponse {
    role: String,
    known: bool,
    permissions: Vec<Permission>,
    groups: Vec<CategoryGroup>,
}

/// Route check response; echoes the route as looked up
#[derive(Debug, Serialize)]
struct RouteCheckResponse {
    route: String,
    #[serde(flatten)]
    decision: AccessDecision,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /health - Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let policy = state.engine.policy();

    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        version: crate::VERSION.to_string(),
        roles: Role::all().len(),
        permissions: policy.catalog().len(),
        guarded_routes: policy.routes().len(),
    })
}

/// GET /v1/catalog - Grouped permission catalog
async fn catalog(State(state): State<AppState>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        categories: state.engine.policy().catalog().groups().to_vec(),
    })
}

/// GET /v1/roles - Role display table
async fn roles(State(state): State<AppState>) -> Json<RolesResponse> {
    let engine = &state.engine;

    let roles = Role::all()
        .iter()
        .map(|role| RoleSummary {
            key: *role,
            label: engine.role_label(role.as_str()).to_string(),
            description: engine.role_description(role.as_str()).to_string(),
            permission_count: engine.permissions_of(*role).len(),
        })
        .collect();

    Json(RolesResponse { roles })
}

/// GET /v1/roles/:role/permissions - Permissions held by a role
async fn role_permissions(
    State(state): State<AppState>,
    Path(role): Path<String>,
) -> Json<RolePermissionsResponse> {
    let response = match Role::parse(&role) {
        Some(parsed) => RolePermissionsResponse {
            role: parsed.as_str().to_string(),
            known: true,
            permissions: state.engine.permissions_of(parsed).to_vec(),
            groups: state.engine.grouped_permissions_of(parsed).to_vec(),
        },
        None => RolePermissionsResponse {
            known: false,
            permissions: state.engine.permissions_of_raw(&role).to_vec(),
            groups: Vec::new(),
            role,
        },
    };

    Json(response)
}

/// POST /v1/check - Permission check
async fn check_permission(
    State(state): State<AppState>,
    Json(req): Json<PermissionCheck>,
) -> Result<Json<AccessDecision>, ApiError> {
    require_non_blank("permission", &req.permission)?;

    let decision = state.engine.check_permission(&req.role, &req.permission);

    info!(
        "Permission check: role={}, permission={} -> {}",
        req.role,
        req.permission,
        if decision.allowed { "ALLOW" } else { "DENY" }
    );

    Ok(Json(decision))
}

/// POST /v1/routes/check - Route check
async fn check_route(
    State(state): State<AppState>,
    Json(req): Json<RouteCheck>,
) -> Result<Json<RouteCheckResponse>, ApiError> {
    require_non_blank("route", &req.route)?;

    let decision = state.engine.check_route(&req.role, &req.route);

    info!(
        "Route check: role={}, route={} -> {}",
        req.role,
        req.route,
        if decision.allowed { "ALLOW" } else { "DENY" }
    );

    Ok(Json(RouteCheckResponse {
        route: crate::routes::normalize(&req.route).to_string(),
        decision,
    }))
}

// =============================================================================
// Router
// =============================================================================

/// Create the HTTP router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace = TraceLayer::new_for_http().on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_check))
        .route("/v1/catalog", get(catalog))
        .route("/v1/roles", get(roles))
        .route("/v1/roles/:role/permissions", get(role_permissions))
        .route("/v1/check", post(check_permission))
        .route("/v1/routes/check", post(check_route))
        .layer(ServiceBuilder::new().layer(trace).layer(cors))
        .with_state(state)
}
