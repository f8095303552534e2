use crate::error::AppError;
use crate::models::{BlogPost, Comment, CreatePostRequest, User};
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations: the credential
/// store consulted during registration/login/identity resolution, and the content
/// repository whose mutation entry points sit behind the authorization gates.
/// Handlers interact with this trait only, never with the concrete store.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's asynchronous task
/// boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Credential Store ---
    // Creates a user record. The first record ever created receives the admin
    // role; the decision is made inside the INSERT so it is race-safe.
    // Fails with `DuplicateEmail` (and nothing else observable) if the email
    // is taken, whether it was taken long ago or by a concurrent registration.
    async fn register_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> Result<User, AppError>;
    // Login lookup.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    // Per-request identity re-hydration. `None` means the referenced user no
    // longer exists; the session layer treats that as anonymous.
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    // --- Content: reads ---
    async fn list_posts(&self) -> Result<Vec<BlogPost>, AppError>;
    async fn get_post(&self, id: i64) -> Result<Option<BlogPost>, AppError>;
    // Comments in insertion order.
    async fn comments_for_post(&self, post_id: i64) -> Result<Vec<Comment>, AppError>;

    // --- Content: admin-gated mutation surface ---
    // Fails with `DuplicateTitle` on a title collision, leaving the store unchanged.
    async fn create_post(
        &self,
        req: CreatePostRequest,
        author_id: i64,
        date: String,
    ) -> Result<BlogPost, AppError>;
    // Updates everything except the author and the creation date.
    async fn update_post(
        &self,
        id: i64,
        req: CreatePostRequest,
    ) -> Result<Option<BlogPost>, AppError>;
    // Deletes the post and its comments in one transaction. Returns false if
    // the post did not exist.
    async fn delete_post(&self, id: i64) -> Result<bool, AppError>;

    // --- Comments ---
    // Binds a new comment to the post and the acting user; `NotFound` if the
    // post is missing, with no row written.
    async fn add_comment(&self, post_id: i64, user_id: i64, text: &str)
    -> Result<Comment, AppError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the application state.
pub type RepositoryState = Arc<dyn Repository>;

// Schema applied at startup. `IF NOT EXISTS` keeps restarts idempotent.
const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'member'
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS blog_posts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL UNIQUE,
        subtitle TEXT NOT NULL,
        date TEXT NOT NULL,
        body TEXT NOT NULL,
        img_url TEXT NOT NULL,
        author_id INTEGER NOT NULL REFERENCES users(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS comments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        text TEXT NOT NULL,
        user_id INTEGER NOT NULL REFERENCES users(id),
        post_id INTEGER NOT NULL REFERENCES blog_posts(id)
    )
    "#,
];

/// run_migrations
///
/// Applies the schema to a freshly opened pool. Called once from `main` (and
/// from test setup) before the repository is constructed.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// SqliteRepository
///
/// The concrete implementation of the `Repository` trait, backed by SQLite.
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

// AUTOINCREMENT ids are unique violations too; the caller's context decides
// which user-facing variant a violation maps to (email vs title), since each
// statement can only trip one unique constraint.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl Repository for SqliteRepository {
    /// register_user
    ///
    /// Single-statement insert: the role subquery and the row creation commit
    /// together, so two racing "first" registrations cannot both become admin,
    /// and a duplicate email leaves no partial record behind.
    async fn register_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, password_hash, role)
            VALUES (
                ?1, ?2, ?3,
                CASE WHEN EXISTS (SELECT 1 FROM users) THEN 'member' ELSE 'admin' END
            )
            RETURNING id, email, name, password_hash, role
            "#,
        )
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(e) if is_unique_violation(&e) => Err(AppError::DuplicateEmail),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, name, password_hash, role FROM users WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, name, password_hash, role FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// list_posts
    ///
    /// All posts, oldest first, enriched with the author's display name.
    async fn list_posts(&self) -> Result<Vec<BlogPost>, AppError> {
        let posts = sqlx::query_as::<_, BlogPost>(
            r#"
            SELECT p.id, p.title, p.subtitle, p.date, p.body, p.img_url,
                   p.author_id, u.name AS author_name
            FROM blog_posts p
            JOIN users u ON p.author_id = u.id
            ORDER BY p.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    async fn get_post(&self, id: i64) -> Result<Option<BlogPost>, AppError> {
        let post = sqlx::query_as::<_, BlogPost>(
            r#"
            SELECT p.id, p.title, p.subtitle, p.date, p.body, p.img_url,
                   p.author_id, u.name AS author_name
            FROM blog_posts p
            JOIN users u ON p.author_id = u.id
            WHERE p.id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(post)
    }

    /// comments_for_post
    ///
    /// Ordered by insertion (id), which is the only ordering the post view promises.
    async fn comments_for_post(&self, post_id: i64) -> Result<Vec<Comment>, AppError> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT c.id, c.text, c.user_id, c.post_id, u.name AS author_name
            FROM comments c
            JOIN users u ON c.user_id = u.id
            WHERE c.post_id = ?1
            ORDER BY c.id
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    /// create_post
    ///
    /// The title's UNIQUE constraint does the collision detection; a violation
    /// surfaces as `DuplicateTitle` with the store untouched.
    async fn create_post(
        &self,
        req: CreatePostRequest,
        author_id: i64,
        date: String,
    ) -> Result<BlogPost, AppError> {
        let result = sqlx::query_as::<_, BlogPost>(
            r#"
            INSERT INTO blog_posts (title, subtitle, date, body, img_url, author_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING id, title, subtitle, date, body, img_url, author_id
            "#,
        )
        .bind(req.title)
        .bind(req.subtitle)
        .bind(date)
        .bind(req.body)
        .bind(req.img_url)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(post) => Ok(post),
            Err(e) if is_unique_violation(&e) => Err(AppError::DuplicateTitle),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    /// update_post
    ///
    /// `author_id` and `date` are deliberately absent from the SET list: the
    /// author is fixed at creation and the date records when the post appeared.
    async fn update_post(
        &self,
        id: i64,
        req: CreatePostRequest,
    ) -> Result<Option<BlogPost>, AppError> {
        let result = sqlx::query_as::<_, BlogPost>(
            r#"
            UPDATE blog_posts
            SET title = ?2, subtitle = ?3, body = ?4, img_url = ?5
            WHERE id = ?1
            RETURNING id, title, subtitle, date, body, img_url, author_id
            "#,
        )
        .bind(id)
        .bind(req.title)
        .bind(req.subtitle)
        .bind(req.body)
        .bind(req.img_url)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(post) => Ok(post),
            Err(e) if is_unique_violation(&e) => Err(AppError::DuplicateTitle),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    /// delete_post
    ///
    /// Explicit cascade: dependent comments go in the same transaction as the
    /// post, so readers never observe an orphaned comment.
    async fn delete_post(&self, id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM comments WHERE post_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// add_comment
    ///
    /// Existence check and insert share a transaction; an early return rolls
    /// back, so a comment on a vanished post leaves no row.
    async fn add_comment(
        &self,
        post_id: i64,
        user_id: i64,
        text: &str,
    ) -> Result<Comment, AppError> {
        let mut tx = self.pool.begin().await?;

        let post_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM blog_posts WHERE id = ?1")
                .bind(post_id)
                .fetch_one(&mut *tx)
                .await?;
        if post_count == 0 {
            return Err(AppError::NotFound);
        }

        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (text, user_id, post_id)
            VALUES (?1, ?2, ?3)
            RETURNING id, text, user_id, post_id
            "#,
        )
        .bind(text)
        .bind(user_id)
        .bind(post_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(comment)
    }
}
