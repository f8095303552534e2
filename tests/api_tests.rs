use blog_portal::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    models::PostDetail,
    repository::{RepositoryState, SqliteRepository, run_migrations},
};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
    pub pool: sqlx::SqlitePool,
}

async fn spawn_app() -> TestApp {
    // One connection keeps the in-memory database shared between the server
    // and the test's direct assertions.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite in tests");

    run_migrations(&pool).await.expect("Failed to apply schema");

    let repo = Arc::new(SqliteRepository::new(pool.clone())) as RepositoryState;
    // Production env: the x-user-id bypass must stay off so these tests
    // exercise the real cookie flow.
    let mut config = AppConfig::default();
    config.env = Env::Production;

    let state = AppState { repo, config };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address, pool }
}

// A fresh browser: its own cookie jar, and no automatic redirect following so
// the 303s themselves can be asserted.
fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

async fn register(app: &TestApp, client: &reqwest::Client, email: &str, name: &str) {
    let response = client
        .post(format!("{}/register", app.address))
        .form(&[("email", email), ("name", name), ("password", "hunter2hunter2")])
        .send()
        .await
        .expect("register request failed");
    assert_eq!(response.status(), 303);
}

async fn login(app: &TestApp, client: &reqwest::Client, email: &str) {
    let response = client
        .post(format!("{}/login", app.address))
        .form(&[("email", email), ("password", "hunter2hunter2")])
        .send()
        .await
        .expect("login request failed");
    assert_eq!(response.status(), 303);
    assert_eq!(response.headers().get("location").unwrap(), "/?flash=welcome");
}

async fn count(app: &TestApp, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(&app.pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let response = browser()
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_full_admin_and_comment_scenario() {
    let app = spawn_app().await;
    let alice = browser();
    let bob = browser();
    let anonymous = browser();

    // Alice registers first and becomes the admin; Bob is a member.
    register(&app, &alice, "alice@example.com", "Alice").await;
    register(&app, &bob, "bob@example.com", "Bob").await;
    login(&app, &alice, "alice@example.com").await;
    login(&app, &bob, "bob@example.com").await;

    // Bob attempts to create a post: Forbidden, nothing created.
    let response = bob
        .post(format!("{}/new-post", app.address))
        .form(&[
            ("title", "Bob's Takeover"),
            ("subtitle", "Unauthorized"),
            ("body", "This should never persist."),
            ("img_url", "http://example.com/bob.png"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
    assert_eq!(count(&app, "blog_posts").await, 0);

    // Alice creates a post successfully.
    let response = alice
        .post(format!("{}/new-post", app.address))
        .form(&[
            ("title", "Hello World"),
            ("subtitle", "The first post"),
            ("body", "Welcome to the blog."),
            ("img_url", "http://example.com/hello.png"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 303);
    assert_eq!(response.headers().get("location").unwrap(), "/");
    assert_eq!(count(&app, "blog_posts").await, 1);

    // The listing shows the post with Alice as author.
    let posts: Vec<blog_portal::models::BlogPost> = browser()
        .get(format!("{}/", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].author_id, 1);
    assert_eq!(posts[0].author_name.as_deref(), Some("Alice"));
    let post_id = posts[0].id;

    // Bob, authenticated, comments on the post.
    let response = bob
        .post(format!("{}/post/{post_id}", app.address))
        .form(&[("text", "Great post!")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 303);
    assert_eq!(
        response.headers().get("location").unwrap().to_str().unwrap(),
        format!("/post/{post_id}")
    );

    // An anonymous client attempting the same is redirected to login, and
    // nothing new is persisted.
    let response = anonymous
        .post(format!("{}/post/{post_id}", app.address))
        .form(&[("text", "Drive-by comment")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 303);
    assert_eq!(
        response.headers().get("location").unwrap(),
        "/login?error=login_required"
    );
    assert_eq!(count(&app, "comments").await, 1);

    // The post view carries Bob's comment.
    let detail: PostDetail = browser()
        .get(format!("{}/post/{post_id}", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail.comments.len(), 1);
    assert_eq!(detail.comments[0].user_id, 2);
    assert_eq!(detail.comments[0].author_name.as_deref(), Some("Bob"));
}

#[tokio::test]
async fn test_login_failure_modes() {
    let app = spawn_app().await;
    let client = browser();
    register(&app, &client, "alice@example.com", "Alice").await;

    // Unknown email: the generic failure code, no session cookie.
    let response = client
        .post(format!("{}/login", app.address))
        .form(&[("email", "nobody@example.com"), ("password", "hunter2hunter2")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 303);
    assert_eq!(
        response.headers().get("location").unwrap(),
        "/login?error=invalid_credentials"
    );
    assert!(response.headers().get("set-cookie").is_none());

    // Known email, wrong password: the more specific code, still no cookie.
    let response = client
        .post(format!("{}/login", app.address))
        .form(&[("email", "alice@example.com"), ("password", "wrong-password")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 303);
    assert_eq!(
        response.headers().get("location").unwrap(),
        "/login?error=wrong_password"
    );
    assert!(response.headers().get("set-cookie").is_none());
}

#[tokio::test]
async fn test_duplicate_registration_redirects_to_login() {
    let app = spawn_app().await;
    let client = browser();

    register(&app, &client, "alice@example.com", "Alice").await;

    let response = client
        .post(format!("{}/register", app.address))
        .form(&[
            ("email", "alice@example.com"),
            ("name", "Imposter"),
            ("password", "hunter2hunter2"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 303);
    assert_eq!(
        response.headers().get("location").unwrap(),
        "/login?error=email_taken"
    );
    assert_eq!(count(&app, "users").await, 1);
}

#[tokio::test]
async fn test_registration_input_floor() {
    let app = spawn_app().await;
    let client = browser();

    // Short password never reaches the store.
    let response = client
        .post(format!("{}/register", app.address))
        .form(&[("email", "short@example.com"), ("name", "Shorty"), ("password", "abc")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);
    assert_eq!(count(&app, "users").await, 0);
}

#[tokio::test]
async fn test_logout_destroys_the_session() {
    let app = spawn_app().await;
    let alice = browser();
    register(&app, &alice, "alice@example.com", "Alice").await;
    login(&app, &alice, "alice@example.com").await;

    // Sanity: the session works (Alice is the admin).
    let response = alice
        .get(format!("{}/new-post", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // Logout clears the cookie and redirects to the listing.
    let response = alice
        .get(format!("{}/logout", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 303);
    assert_eq!(response.headers().get("location").unwrap(), "/");
    let cleared = response
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cleared.contains("Max-Age=0"));

    // The same client is now anonymous: the admin surface denies it, and a
    // second logout just bounces to login.
    let response = alice
        .get(format!("{}/new-post", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let response = alice
        .get(format!("{}/logout", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 303);
    assert_eq!(
        response.headers().get("location").unwrap(),
        "/login?error=login_required"
    );
}

#[tokio::test]
async fn test_edit_and_delete_flows() {
    let app = spawn_app().await;
    let alice = browser();
    register(&app, &alice, "alice@example.com", "Alice").await;
    login(&app, &alice, "alice@example.com").await;

    alice
        .post(format!("{}/new-post", app.address))
        .form(&[
            ("title", "Draft"),
            ("subtitle", "v1"),
            ("body", "First draft."),
            ("img_url", "http://example.com/draft.png"),
        ])
        .send()
        .await
        .unwrap();

    // Edit: 303 back to the post, content changed, author untouched.
    let response = alice
        .post(format!("{}/edit-post/1", app.address))
        .form(&[
            ("title", "Final"),
            ("subtitle", "v2"),
            ("body", "Polished."),
            ("img_url", "http://example.com/final.png"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 303);
    assert_eq!(response.headers().get("location").unwrap(), "/post/1");

    let detail: PostDetail = browser()
        .get(format!("{}/post/1", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail.post.title, "Final");
    assert_eq!(detail.post.author_id, 1);

    // Delete: 303 to the listing, post gone afterwards.
    let response = alice
        .get(format!("{}/delete/1", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 303);
    assert_eq!(response.headers().get("location").unwrap(), "/");

    let response = browser()
        .get(format!("{}/post/1", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    // Deleting it again is a 404, not a crash.
    let response = alice
        .get(format!("{}/delete/1", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}
