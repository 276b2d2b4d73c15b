/// Posts resource.
///
/// Reads are public; writes require an authenticated principal and update or
/// delete only the caller's own rows. The caller identity always comes from
/// the gate extractor, never from the request body.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::error::{AppError, AuthError, DatabaseError, ValidationError};

#[derive(Deserialize)]
pub struct PostRequest {
    pub title: String,
    pub content: String,
}

#[derive(Serialize)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub author: String,
    pub created_at: String,
}

type PostRow = (i64, String, String, Uuid, String, DateTime<Utc>);

impl From<PostRow> for PostResponse {
    fn from((id, title, content, user_id, email, created_at): PostRow) -> Self {
        Self {
            id,
            title,
            content,
            author_id: user_id.to_string(),
            author: email,
            created_at: created_at.to_rfc3339(),
        }
    }
}

fn validate_post_body(form: &PostRequest) -> Result<(), AppError> {
    if form.title.trim().is_empty() {
        return Err(AppError::Validation(ValidationError::EmptyField(
            "title".to_string(),
        )));
    }
    if form.content.trim().is_empty() {
        return Err(AppError::Validation(ValidationError::EmptyField(
            "content".to_string(),
        )));
    }
    Ok(())
}

/// GET /posts
pub async fn list_posts(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let rows = sqlx::query_as::<_, PostRow>(
        r#"
        SELECT p.id, p.title, p.content, p.user_id, u.email, p.created_at
        FROM posts p
        JOIN users u ON p.user_id = u.id
        ORDER BY p.created_at DESC
        "#,
    )
    .fetch_all(pool.get_ref())
    .await?;

    let posts: Vec<PostResponse> = rows.into_iter().map(PostResponse::from).collect();
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /posts/{id}
pub async fn get_post(
    path: web::Path<i64>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let post_id = path.into_inner();

    let row = sqlx::query_as::<_, PostRow>(
        r#"
        SELECT p.id, p.title, p.content, p.user_id, u.email, p.created_at
        FROM posts p
        JOIN users u ON p.user_id = u.id
        WHERE p.id = $1
        "#,
    )
    .bind(post_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| AppError::Database(DatabaseError::NotFound("Post not found".to_string())))?;

    Ok(HttpResponse::Ok().json(PostResponse::from(row)))
}

/// POST /posts
///
/// # Errors
/// - 400: empty title or content
/// - 401: missing/invalid access token
pub async fn create_post(
    user: AuthenticatedUser,
    form: web::Json<PostRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    validate_post_body(&form)?;

    let post_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO posts (title, content, user_id)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(&form.title)
    .bind(&form.content)
    .bind(user.id)
    .fetch_one(pool.get_ref())
    .await?;

    tracing::info!(user_id = %user.id, post_id, "Post created");

    let row = sqlx::query_as::<_, PostRow>(
        r#"
        SELECT p.id, p.title, p.content, p.user_id, u.email, p.created_at
        FROM posts p
        JOIN users u ON p.user_id = u.id
        WHERE p.id = $1
        "#,
    )
    .bind(post_id)
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(PostResponse::from(row)))
}

/// Fetch the owner of a post, or 404.
async fn post_owner(pool: &PgPool, post_id: i64) -> Result<Uuid, AppError> {
    sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::Database(DatabaseError::NotFound("Post not found".to_string())))
}

/// PUT /posts/{id}
///
/// # Errors
/// - 400: empty title or content
/// - 401: missing/invalid access token
/// - 403: caller does not own the post
/// - 404: no such post
pub async fn update_post(
    user: AuthenticatedUser,
    path: web::Path<i64>,
    form: web::Json<PostRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let post_id = path.into_inner();
    validate_post_body(&form)?;

    let owner = post_owner(pool.get_ref(), post_id).await?;
    if owner != user.id {
        tracing::warn!(user_id = %user.id, post_id, "Rejected update of another user's post");
        return Err(AppError::Auth(AuthError::NotResourceOwner));
    }

    sqlx::query("UPDATE posts SET title = $1, content = $2 WHERE id = $3")
        .bind(&form.title)
        .bind(&form.content)
        .bind(post_id)
        .execute(pool.get_ref())
        .await?;

    let row = sqlx::query_as::<_, PostRow>(
        r#"
        SELECT p.id, p.title, p.content, p.user_id, u.email, p.created_at
        FROM posts p
        JOIN users u ON p.user_id = u.id
        WHERE p.id = $1
        "#,
    )
    .bind(post_id)
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(PostResponse::from(row)))
}

/// DELETE /posts/{id}
///
/// # Errors
/// - 401: missing/invalid access token
/// - 403: caller does not own the post
/// - 404: no such post
pub async fn delete_post(
    user: AuthenticatedUser,
    path: web::Path<i64>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let post_id = path.into_inner();

    let owner = post_owner(pool.get_ref(), post_id).await?;
    if owner != user.id {
        tracing::warn!(user_id = %user.id, post_id, "Rejected delete of another user's post");
        return Err(AppError::Auth(AuthError::NotResourceOwner));
    }

    sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(post_id)
        .execute(pool.get_ref())
        .await?;

    tracing::info!(user_id = %user.id, post_id, "Post deleted");

    Ok(HttpResponse::NoContent().finish())
}
