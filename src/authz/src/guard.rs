//! Route guard middleware
//!
//! Wraps any axum/tower service and checks the request path against the
//! route guard table before the inner service runs. Denied requests get a
//! `403 Forbidden` with a JSON body.
//!
//! The caller's role comes from a [`SessionRole`] request extension set by
//! the upstream identity layer, falling back to the `x-user-role` header.
//! No role at all counts as an unknown role: guarded routes are refused,
//! unguarded routes pass through.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tower::{Layer, Service};

use crate::engine::{AccessDecision, AccessEngine};

/// Header carrying the role when no [`SessionRole`] extension is present
pub const ROLE_HEADER: &str = "x-user-role";

/// Role of the authenticated session, inserted by the identity layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRole(pub String);

// =============================================================================
// RouteGuardLayer
// =============================================================================

/// Layer applying route guard decisions
#[derive(Debug, Clone)]
pub struct RouteGuardLayer {
    engine: AccessEngine,
}

impl RouteGuardLayer {
    pub fn new(engine: AccessEngine) -> Self {
        Self { engine }
    }
}

impl<S> Layer<S> for RouteGuardLayer {
    type Service = RouteGuard<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RouteGuard {
            inner,
            engine: self.engine.clone(),
        }
    }
}

// =============================================================================
// RouteGuard
// =============================================================================

/// Middleware produced by [`RouteGuardLayer`]
#[derive(Debug, Clone)]
pub struct RouteGuard<S> {
    inner: S,
    engine: AccessEngine,
}

impl<S> Service<Request<Body>> for RouteGuard<S>
where
    S: Service<Request<Body>, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let role = session_role(&req).unwrap_or_default();
        let route = req.uri().path().to_string();
        let decision = self.engine.check_route(&role, &route);

        if decision.allowed {
            return Box::pin(self.inner.call(req));
        }

        tracing::warn!(
            role = %role,
            route = %route,
            required_permission = ?decision.required_permission,
            reason = ?decision.reason,
            "Route access denied"
        );

        let response = forbidden(&route, decision);
        Box::pin(async move { Ok(response) })
    }
}

/// Role for the request: extension first, then header
pub fn session_role<B>(req: &Request<B>) -> Option<String> {
    if let Some(SessionRole(role)) = req.extensions().get::<SessionRole>() {
        return Some(role.clone());
    }

    req.headers()
        .get(ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[derive(Debug, Serialize)]
struct ForbiddenBody<'a> {
    error: &'static str,
    message: &'static str,
    route: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    required_permission: Option<&'static str>,
}

fn forbidden(route: &str, decision: AccessDecision) -> Response {
    let body = ForbiddenBody {
        error: "forbidden",
        message: decision.reason.message(),
        route,
        required_permission: decision.required_permission.map(|p| p.as_str()),
    };

    (StatusCode::FORBIDDEN, Json(body)).into_response()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use tower::util::BoxCloneService;
    use tower::ServiceExt;

    type MockService = BoxCloneService<Request<Body>, Response, Infallible>;

    fn mock_service() -> MockService {
        BoxCloneService::new(tower::service_fn(|_req: Request<Body>| async {
            Ok::<_, Infallible>(Response::new(Body::empty()))
        }))
    }

    fn guarded() -> RouteGuard<MockService> {
        RouteGuardLayer::new(AccessEngine::builtin()).layer(mock_service())
    }

    fn request(path: &str, role: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(path);
        if let Some(role) = role {
            builder = builder.header(ROLE_HEADER, role);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_poll_ready_delegates_to_inner() {
        let mut service = guarded();
        let mut task = tokio_test::task::spawn(());

        let ready = task.enter(|cx, _| service.poll_ready(cx));
        tokio_test::assert_ready_ok!(ready);
    }

    #[tokio::test]
    async fn test_guard_allows_permitted_role() {
        let response = guarded().oneshot(request("/users", Some("admin"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_guard_forbids_missing_permission() {
        let response = guarded().oneshot(request("/users", Some("cashier"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_guard_passes_unguarded_route_without_role() {
        let response = guarded().oneshot(request("/login", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_guard_forbids_guarded_route_without_role() {
        let response = guarded().oneshot(request("/dashboard", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_extension_takes_precedence_over_header() {
        let mut req = request("/subscriptions", Some("admin"));
        req.extensions_mut().insert(SessionRole("cashier".to_string()));

        let response = guarded().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_forbidden_body_names_required_permission() {
        let response = guarded().oneshot(request("/roles", Some("manager"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "forbidden");
        assert_eq!(body["route"], "/roles");
        assert_eq!(body["required_permission"], "manage_roles");
    }
}
