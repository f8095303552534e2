use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Core Application Schemas (Mapped to Database) ---

/// Role
///
/// The explicit role attribute carried by every user record. Exactly one account
/// holds `Admin`: the first account ever created. The role is decided inside the
/// INSERT that creates the row, so it never depends on how the store assigns ids.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default,
)]
#[ts(export)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Member,
}

/// User
///
/// The canonical identity record stored in the `users` table. Resolved on every
/// request that carries a session, and consulted by both authorization gates.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    // Store-assigned, never reused.
    pub id: i64,
    // Unique, case-sensitive as stored.
    pub email: String,
    pub name: String,
    /// Argon2 PHC string. The plaintext is hashed at the registration boundary
    /// and never stored; this field is never serialized to clients.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
}

/// BlogPost
///
/// A content item from the `blog_posts` table, owned by exactly one author.
/// The author is fixed at creation; editing never reassigns it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct BlogPost {
    pub id: i64,
    // Unique across all posts.
    pub title: String,
    pub subtitle: String,
    // Display date, e.g. "August 05, 2026". Set once when the post is created.
    pub date: String,
    pub body: String,
    pub img_url: String,
    // FK to users.id.
    pub author_id: i64,
    // Loaded via a JOIN on users in the read queries.
    #[sqlx(default)]
    pub author_name: Option<String>,
}

/// Comment
///
/// A comment from the `comments` table, owned by one user and one post.
/// Comments are only ever created, never edited or deleted on their own;
/// they disappear with their post.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    // FK to users.id (the comment author).
    pub user_id: i64,
    // FK to blog_posts.id.
    pub post_id: i64,
    // Loaded via a JOIN on users in the read queries.
    #[sqlx(default)]
    pub author_name: Option<String>,
}

// --- Request Payloads (Input Schemas) ---

/// RegisterRequest
///
/// Input payload for POST /register. The password is hashed at the handler
/// boundary; it is never persisted or logged.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// LoginRequest
///
/// Input payload for POST /login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// CreatePostRequest
///
/// Input payload for creating or editing a post. There is deliberately no
/// author field: the author is taken from the acting identity on create and
/// left untouched on edit.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatePostRequest {
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub img_url: String,
}

/// CommentRequest
///
/// Input payload for posting a comment on a post.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CommentRequest {
    pub text: String,
}

// --- Response Schemas (Output) ---

/// PostDetail
///
/// Output schema for the single-post view: the post plus its comments in
/// insertion order.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PostDetail {
    pub post: BlogPost,
    pub comments: Vec<Comment>,
}
