use std::sync::Arc;
use std::time::Duration;

use auth::AccessGate;
use auth::Authenticator;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::create_user::create_user;
use super::handlers::current_user::current_user;
use super::handlers::delete_user::delete_user;
use super::handlers::get_user::get_user;
use super::handlers::list_users::list_users;
use super::handlers::login::login;
use super::handlers::update_user::update_user;
use super::middleware::authenticate;
use crate::domain::user::ports::UserServicePort;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServicePort>,
    pub authenticator: Arc<Authenticator>,
    pub gate: Arc<AccessGate>,
}

pub fn create_router(
    user_service: Arc<dyn UserServicePort>,
    authenticator: Arc<Authenticator>,
    gate: Arc<AccessGate>,
) -> Router {
    let state = AppState {
        user_service,
        authenticator,
        gate,
    };

    let require_auth = middleware::from_fn_with_state(state.clone(), authenticate);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    // Registration and login are public, everything else sits behind the gate.
    Router::new()
        .route(
            "/api/user",
            post(create_user).merge(get(list_users).route_layer(require_auth.clone())),
        )
        .route("/api/user/login", post(login))
        .route(
            "/api/user/me",
            get(current_user).route_layer(require_auth.clone()),
        )
        .route(
            "/api/user/:user_id",
            get(get_user)
                .patch(update_user)
                .delete(delete_user)
                .route_layer(require_auth),
        )
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
