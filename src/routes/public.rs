use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any client
/// (anonymous or logged-in): the content reads and the two identity entry
/// points (register, login).
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // GET|POST /register
        // Account creation. POST never establishes a session; a duplicate email
        // redirects to the login flow instead.
        .route(
            "/register",
            get(handlers::register_form).post(handlers::register),
        )
        // GET|POST /login
        // Credential verification and session establishment. The failure
        // redirects distinguish unknown email from wrong password.
        .route("/login", get(handlers::login_form).post(handlers::login))
        // GET /
        // Lists all posts. The landing page data source.
        .route("/", get(handlers::list_posts))
        // GET /post/{id}
        // Single post with comments. The POST on this path (commenting) lives
        // in the authenticated router; axum merges the two method routers.
        .route("/post/{id}", get(handlers::show_post))
}
