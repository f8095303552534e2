use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Defines the routes accessible to any user with an established session.
///
/// Access Control Strategy:
/// Both handlers gate themselves through the `RequireAuthenticated` extractor
/// rather than a router-level 401 middleware, because the required denial here
/// is a redirect toward the login flow: an anonymous comment POST must bounce
/// to /login with nothing persisted, and an anonymous /logout has no session
/// to destroy in the first place.
pub fn authenticated_routes() -> Router<AppState> {
    Router::new()
        // GET /logout
        // Destroys the current session (clears the cookie) and returns to the listing.
        .route("/logout", get(handlers::logout))
        // POST /post/{id}
        // Persists a comment on the post, bound to the acting identity.
        .route("/post/{id}", post(handlers::add_comment))
}
