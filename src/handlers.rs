use crate::{
    AppState, auth,
    auth::{RequireAdmin, RequireAuthenticated},
    error::AppError,
    models::{
        BlogPost, CommentRequest, CreatePostRequest, LoginRequest, PostDetail, RegisterRequest,
    },
    password,
};
use axum::{
    Json,
    extract::{Form, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;

// --- Input Validation ---

// The real form widgets live in the rendering frontend; these checks are the
// server-side floor underneath them.
fn validate_registration(req: &RegisterRequest) -> Result<(), AppError> {
    if !req.email.contains('@') {
        return Err(AppError::Validation("invalid email address".into()));
    }
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".into()));
    }
    if req.password.len() < 8 {
        return Err(AppError::Validation(
            "password must be at least 8 characters".into(),
        ));
    }
    Ok(())
}

fn validate_post(req: &CreatePostRequest) -> Result<(), AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("title must not be empty".into()));
    }
    if req.body.trim().is_empty() {
        return Err(AppError::Validation("body must not be empty".into()));
    }
    Ok(())
}

// --- Identity Handlers ---

/// register_form
///
/// [Public Route] The registration form itself is owned by the rendering
/// frontend; this endpoint only confirms the route exists.
#[utoipa::path(get, path = "/register", responses((status = 200, description = "Form available")))]
pub async fn register_form() -> StatusCode {
    StatusCode::OK
}

/// register
///
/// [Public Route] Creates a new user account. The first account ever created
/// becomes the administrator; every later account is a member. No session is
/// established; the new user proceeds through the login flow.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 303, description = "Registered; redirected to the listing (or to login when the email is taken)"),
        (status = 422, description = "Malformed input")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Form(payload): Form<RegisterRequest>,
) -> Result<Redirect, AppError> {
    validate_registration(&payload)?;

    let password_hash = password::hash(&payload.password)?;

    match state
        .repo
        .register_user(&payload.email, &payload.name, &password_hash)
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = user.id, role = ?user.role, "user registered");
            Ok(Redirect::to("/"))
        }
        // Same outcome whether the email was taken long ago or in a race.
        Err(AppError::DuplicateEmail) => Ok(Redirect::to("/login?error=email_taken")),
        Err(e) => Err(e),
    }
}

/// login_form
///
/// [Public Route] Counterpart of `register_form`; the form is external.
#[utoipa::path(get, path = "/login", responses((status = 200, description = "Form available")))]
pub async fn login_form() -> StatusCode {
    StatusCode::OK
}

/// login
///
/// [Public Route] Verifies credentials and establishes a session. The two
/// failure redirects are deliberately distinct: unknown email gets the generic
/// "incorrect" code, a known email with a wrong password gets the specific one.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 303, description = "Redirected; on success the session cookie is set")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Form(payload): Form<LoginRequest>,
) -> Result<Response, AppError> {
    let Some(user) = state.repo.find_user_by_email(&payload.email).await? else {
        return Ok(Redirect::to("/login?error=invalid_credentials").into_response());
    };

    if !password::verify(&payload.password, &user.password_hash) {
        return Ok(Redirect::to("/login?error=wrong_password").into_response());
    }

    let token = auth::issue_token(user.id, &state.config)?;
    tracing::info!(user_id = user.id, "session established");

    Ok((
        [(header::SET_COOKIE, auth::session_cookie(&token))],
        Redirect::to("/?flash=welcome"),
    )
        .into_response())
}

/// logout
///
/// [Authenticated Route] Destroys the current session by clearing the cookie.
/// Clearing is idempotent at the session level; an anonymous caller is simply
/// redirected to login by the gate.
#[utoipa::path(
    get,
    path = "/logout",
    responses((status = 303, description = "Session destroyed; redirected to the listing"))
)]
pub async fn logout(RequireAuthenticated(user): RequireAuthenticated) -> impl IntoResponse {
    tracing::info!(user_id = user.id, "session destroyed");
    (
        [(header::SET_COOKIE, auth::clear_session_cookie())],
        Redirect::to("/"),
    )
}

// --- Content Handlers ---

/// list_posts
///
/// [Public Route] Lists all posts. No auth required.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "All posts", body = [BlogPost]))
)]
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<BlogPost>>, AppError> {
    Ok(Json(state.repo.list_posts().await?))
}

/// show_post
///
/// [Public Route] A single post with its comments in insertion order.
#[utoipa::path(
    get,
    path = "/post/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Found", body = PostDetail),
        (status = 404, description = "No such post")
    )
)]
pub async fn show_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Json<PostDetail>, AppError> {
    let post = state
        .repo
        .get_post(post_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let comments = state.repo.comments_for_post(post_id).await?;
    Ok(Json(PostDetail { post, comments }))
}

/// add_comment
///
/// [Authenticated Route] Persists a comment bound to the resolved identity and
/// the target post. An anonymous POST is redirected to login by the gate before
/// this handler runs, so nothing is persisted for it.
#[utoipa::path(
    post,
    path = "/post/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    request_body = CommentRequest,
    responses(
        (status = 303, description = "Comment added; redirected back to the post"),
        (status = 404, description = "No such post")
    )
)]
pub async fn add_comment(
    RequireAuthenticated(user): RequireAuthenticated,
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Form(payload): Form<CommentRequest>,
) -> Result<Redirect, AppError> {
    if payload.text.trim().is_empty() {
        return Err(AppError::Validation("comment must not be empty".into()));
    }

    let comment = state
        .repo
        .add_comment(post_id, user.id, &payload.text)
        .await?;
    tracing::info!(comment_id = comment.id, post_id, "comment added");

    Ok(Redirect::to(&format!("/post/{post_id}")))
}

// --- Admin Handlers (Content Mutation Surface) ---

/// new_post_form
///
/// [Admin Route] The form is external; the gate is the point.
#[utoipa::path(
    get,
    path = "/new-post",
    responses(
        (status = 200, description = "Form available"),
        (status = 403, description = "Not the admin")
    )
)]
pub async fn new_post_form(_admin: RequireAdmin) -> StatusCode {
    StatusCode::OK
}

/// create_post
///
/// [Admin Route] Creates a post authored by the acting admin, stamped with
/// today's display date.
#[utoipa::path(
    post,
    path = "/new-post",
    request_body = CreatePostRequest,
    responses(
        (status = 303, description = "Created; redirected to the listing"),
        (status = 403, description = "Not the admin"),
        (status = 409, description = "Title already in use")
    )
)]
pub async fn create_post(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Form(payload): Form<CreatePostRequest>,
) -> Result<Redirect, AppError> {
    validate_post(&payload)?;

    let date = Utc::now().format("%B %d, %Y").to_string();
    let post = state.repo.create_post(payload, admin.id, date).await?;
    tracing::info!(post_id = post.id, author_id = admin.id, "post created");

    Ok(Redirect::to("/"))
}

/// edit_post_form
///
/// [Admin Route] Returns the current post as the seed data for the external
/// edit form.
#[utoipa::path(
    get,
    path = "/edit-post/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Current post", body = BlogPost),
        (status = 403, description = "Not the admin"),
        (status = 404, description = "No such post")
    )
)]
pub async fn edit_post_form(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Json<BlogPost>, AppError> {
    let post = state
        .repo
        .get_post(post_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(post))
}

/// edit_post
///
/// [Admin Route] Updates a post's content. The author is never reassigned by
/// an edit; it stays with whoever created the post.
#[utoipa::path(
    post,
    path = "/edit-post/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    request_body = CreatePostRequest,
    responses(
        (status = 303, description = "Updated; redirected to the post"),
        (status = 403, description = "Not the admin"),
        (status = 404, description = "No such post"),
        (status = 409, description = "Title already in use")
    )
)]
pub async fn edit_post(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Form(payload): Form<CreatePostRequest>,
) -> Result<Redirect, AppError> {
    validate_post(&payload)?;

    match state.repo.update_post(post_id, payload).await? {
        Some(post) => {
            tracing::info!(post_id = post.id, "post updated");
            Ok(Redirect::to(&format!("/post/{}", post.id)))
        }
        None => Err(AppError::NotFound),
    }
}

/// delete_post
///
/// [Admin Route] Deletes a post together with its comments.
#[utoipa::path(
    get,
    path = "/delete/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 303, description = "Deleted; redirected to the listing"),
        (status = 403, description = "Not the admin"),
        (status = 404, description = "No such post")
    )
)]
pub async fn delete_post(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Redirect, AppError> {
    if state.repo.delete_post(post_id).await? {
        tracing::info!(post_id, "post deleted");
        Ok(Redirect::to("/"))
    } else {
        Err(AppError::NotFound)
    }
}
