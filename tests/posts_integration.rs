use serde_json::{json, Value};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use std::net::TcpListener;

use auth_server::configuration::{get_configuration, DatabaseSettings};
use auth_server::startup::run;

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
}

async fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let mut configuration = get_configuration().expect("Failed to read configuration.");
    configuration.database.database_name = uuid::Uuid::new_v4().to_string();
    let connection_pool = configure_database(&configuration.database).await;

    let server = run(listener, connection_pool.clone(), configuration.jwt.clone())
        .expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        db_pool: connection_pool,
    }
}

pub async fn configure_database(config: &DatabaseSettings) -> PgPool {
    let mut connection = PgConnection::connect(&config.connection_string_without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, config.database_name))
        .await
        .expect("Failed to create database.");

    let connection_pool = PgPool::connect(&config.connection_string())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database.");
    connection_pool
}

/// Register + login, returning the access token.
async fn access_token_for(app: &TestApp, email: &str) -> String {
    let client = reqwest::Client::new();

    client
        .post(&format!("{}/auth/register", &app.address))
        .json(&json!({ "email": email, "password": "secret123" }))
        .send()
        .await
        .expect("Failed to register");

    let login: Value = client
        .post(&format!("{}/auth/login", &app.address))
        .json(&json!({ "email": email, "password": "secret123" }))
        .send()
        .await
        .expect("Failed to login")
        .json()
        .await
        .expect("Failed to parse login response");

    login["access_token"]
        .as_str()
        .expect("No access token")
        .to_string()
}

async fn create_post(app: &TestApp, token: &str, title: &str, content: &str) -> reqwest::Response {
    reqwest::Client::new()
        .post(&format!("{}/posts", &app.address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "title": title, "content": content }))
        .send()
        .await
        .expect("Failed to execute request.")
}

#[tokio::test]
async fn listing_posts_is_public_and_initially_empty() {
    let app = spawn_app().await;

    let response = reqwest::Client::new()
        .get(&format!("{}/posts", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("parse");
    assert_eq!(body.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn creating_a_post_requires_authentication() {
    let app = spawn_app().await;

    let response = reqwest::Client::new()
        .post(&format!("{}/posts", &app.address))
        .json(&json!({ "title": "Hello", "content": "World" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn created_post_is_attributed_to_the_caller_and_readable() {
    let app = spawn_app().await;
    let token = access_token_for(&app, "alice@example.com").await;

    let created = create_post(&app, &token, "First post", "Some content").await;
    assert_eq!(201, created.status().as_u16());

    let body: Value = created.json().await.expect("parse");
    assert_eq!(body["title"], "First post");
    assert_eq!(body["author"], "alice@example.com");
    let post_id = body["id"].as_i64().expect("post id");

    // Readable without a token
    let fetched: Value = reqwest::Client::new()
        .get(&format!("{}/posts/{}", &app.address, post_id))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .expect("parse");
    assert_eq!(fetched["content"], "Some content");

    let list: Value = reqwest::Client::new()
        .get(&format!("{}/posts", &app.address))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .expect("parse");
    assert_eq!(list.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn empty_title_or_content_is_rejected() {
    let app = spawn_app().await;
    let token = access_token_for(&app, "alice@example.com").await;

    let no_title = create_post(&app, &token, "", "Some content").await;
    assert_eq!(400, no_title.status().as_u16());

    let no_content = create_post(&app, &token, "A title", "   ").await;
    assert_eq!(400, no_content.status().as_u16());
}

#[tokio::test]
async fn only_the_owner_can_update_or_delete() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let alice = access_token_for(&app, "alice@example.com").await;
    let mallory = access_token_for(&app, "mallory@example.com").await;

    let created: Value = create_post(&app, &alice, "Alice's post", "Private thoughts")
        .await
        .json()
        .await
        .expect("parse");
    let post_id = created["id"].as_i64().expect("post id");

    let update = client
        .put(&format!("{}/posts/{}", &app.address, post_id))
        .header("Authorization", format!("Bearer {}", mallory))
        .json(&json!({ "title": "Defaced", "content": "Hacked" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(403, update.status().as_u16());

    let delete = client
        .delete(&format!("{}/posts/{}", &app.address, post_id))
        .header("Authorization", format!("Bearer {}", mallory))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(403, delete.status().as_u16());

    // The post is untouched
    let fetched: Value = client
        .get(&format!("{}/posts/{}", &app.address, post_id))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .expect("parse");
    assert_eq!(fetched["title"], "Alice's post");
}

#[tokio::test]
async fn owner_can_update_and_delete_their_post() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let token = access_token_for(&app, "alice@example.com").await;
    let created: Value = create_post(&app, &token, "Draft", "v1")
        .await
        .json()
        .await
        .expect("parse");
    let post_id = created["id"].as_i64().expect("post id");

    let update = client
        .put(&format!("{}/posts/{}", &app.address, post_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "title": "Published", "content": "v2" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, update.status().as_u16());
    let updated: Value = update.json().await.expect("parse");
    assert_eq!(updated["title"], "Published");
    assert_eq!(updated["content"], "v2");

    let delete = client
        .delete(&format!("{}/posts/{}", &app.address, post_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(204, delete.status().as_u16());

    let gone = client
        .get(&format!("{}/posts/{}", &app.address, post_id))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(404, gone.status().as_u16());
}

#[tokio::test]
async fn updating_a_missing_post_returns_404() {
    let app = spawn_app().await;
    let token = access_token_for(&app, "alice@example.com").await;

    let response = reqwest::Client::new()
        .put(&format!("{}/posts/9999", &app.address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "title": "Ghost", "content": "Nothing here" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(404, response.status().as_u16());
}
