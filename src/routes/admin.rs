use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Defines the content mutation surface, exclusively accessible to the admin.
///
/// Access Control:
/// This entire router is wrapped (in `create_router`) with a middleware layer
/// built from the `RequireAdmin` extractor, and every handler additionally
/// takes `RequireAdmin` itself. Either layer alone denies a non-admin with a
/// generic 403; together they make an accidental unguarded route here
/// impossible to merge.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET|POST /new-post
        // Create a post authored by the acting admin.
        .route(
            "/new-post",
            get(handlers::new_post_form).post(handlers::create_post),
        )
        // GET|POST /edit-post/{id}
        // Fetch the form seed / apply the edit. The author never changes on edit.
        .route(
            "/edit-post/{id}",
            get(handlers::edit_post_form).post(handlers::edit_post),
        )
        // GET /delete/{id}
        // Delete the post and, in the same transaction, its comments.
        .route("/delete/{id}", get(handlers::delete_post))
}
