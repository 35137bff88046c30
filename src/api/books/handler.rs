use axum::{extract::{Extension, Path, State}, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::instrument;

use crate::api::{db_pool, field_errors_json, FieldErrors};
use crate::api::middleware::CurrentUser;
use crate::config::state::AppState;
use crate::utils::response_handler::HandlerResponse;
use crate::utils::utils::{is_http_url, non_empty};

use super::price::parse_price;

const MAX_TITLE_LENGTH: usize = 200;
const MAX_URL_LENGTH: usize = 500;
pub const DEFAULT_COVER_IMAGE_URL: &str = "https://placehold.co/400x600/1e293b/d1d5db?text=Book+Cover";

// =============================================================================
// DTOs
// =============================================================================

#[derive(Serialize)]
pub struct BookView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub cover_image_url: String,
    pub book_file_url: String,
    pub price: String,
    pub uploaded_by_id: i64,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
}

impl BookView {
    fn from_row(row: &PgRow) -> Self {
        Self {
            id: row.get("id"),
            title: row.get("title"),
            description: row.get("description"),
            cover_image_url: row.get("cover_image_url"),
            book_file_url: row.get("book_file_url"),
            price: row.get("price"),
            uploaded_by_id: row.get("uploaded_by_id"),
            uploaded_by: row.get("uploaded_by"),
            created_at: row.get("created_at"),
        }
    }
}

/// Body of upload and edit
#[derive(Debug, Default, Deserialize)]
pub struct BookForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub book_file_url: Option<String>,
    #[serde(default)]
    pub price: Value,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ValidBook<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub cover_image_url: &'a str,
    pub book_file_url: &'a str,
    pub price: String,
}

fn check_url(field: &'static str, value: &str, errors: &mut FieldErrors) {
    if !is_http_url(value) {
        errors.push((field, "Enter a valid URL.".into()));
    } else if value.chars().count() > MAX_URL_LENGTH {
        errors.push((field, format!("Ensure this value has at most {MAX_URL_LENGTH} characters.")));
    }
}

impl BookForm {
    pub fn validate(&self) -> Result<ValidBook<'_>, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = non_empty(self.title.as_deref());
        match title {
            None => errors.push(("title", "This field is required.".into())),
            Some(t) if t.chars().count() > MAX_TITLE_LENGTH => errors.push((
                "title",
                format!("Ensure this value has at most {MAX_TITLE_LENGTH} characters."),
            )),
            _ => {}
        }

        let description = non_empty(self.description.as_deref());
        if description.is_none() {
            errors.push(("description", "This field is required.".into()));
        }

        let cover_image_url: &str = non_empty(self.cover_image_url.as_deref()).unwrap_or(DEFAULT_COVER_IMAGE_URL);
        check_url("cover_image_url", cover_image_url, &mut errors);

        let book_file_url = non_empty(self.book_file_url.as_deref());
        match book_file_url {
            None => errors.push(("book_file_url", "This field is required.".into())),
            Some(u) => check_url("book_file_url", u, &mut errors),
        }

        let price: Option<String> = match parse_price(&self.price) {
            Ok(price) => Some(price),
            Err(e) => {
                errors.push(("price", e));
                None
            }
        };

        match (title, description, book_file_url, price) {
            (Some(title), Some(description), Some(book_file_url), Some(price)) if errors.is_empty() => {
                Ok(ValidBook { title, description, cover_image_url, book_file_url, price })
            }
            _ => Err(errors),
        }
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// All books, newest first
pub async fn book_list(State(state): State<AppState>) -> Result<HandlerResponse, HandlerResponse> {
    let pool = db_pool(&state)?;
    let books: Vec<BookView> = fetch_books(pool, None)
        .await
        .map_err(|e| HandlerResponse::internal_error("Failed to list books", &e))?;
    Ok(HandlerResponse::new(StatusCode::OK).data(json!(books)))
}

/// The caller's own uploads
pub async fn teacher_book_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<HandlerResponse, HandlerResponse> {
    let pool = db_pool(&state)?;
    let books: Vec<BookView> = fetch_books(pool, Some(user.id))
        .await
        .map_err(|e| HandlerResponse::internal_error("Failed to list books", &e))?;
    Ok(HandlerResponse::new(StatusCode::OK).data(json!({ "user_books": books })))
}

pub async fn book_detail(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
) -> Result<HandlerResponse, HandlerResponse> {
    let pool = db_pool(&state)?;
    let book: BookView = fetch_book(pool, book_id).await?;
    Ok(HandlerResponse::new(StatusCode::OK).data(json!(book)))
}

/// Where to fetch the book file from
pub async fn download_book(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
) -> Result<HandlerResponse, HandlerResponse> {
    let pool = db_pool(&state)?;
    let book: BookView = fetch_book(pool, book_id).await?;
    Ok(HandlerResponse::new(StatusCode::OK).data(json!({
        "id": book.id,
        "title": book.title,
        "book_file_url": book.book_file_url,
    })))
}

#[instrument(skip_all, fields(teacher = %user.username))]
pub async fn book_upload(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(form): Json<BookForm>,
) -> Result<HandlerResponse, HandlerResponse> {
    let book: ValidBook<'_> = form.validate().map_err(invalid_form)?;
    let pool = db_pool(&state)?;

    let book_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO books (title, description, cover_image_url, book_file_url, price, uploaded_by)
        VALUES ($1, $2, $3, $4, $5::NUMERIC, $6)
        RETURNING id
        "#,
    )
    .bind(book.title)
    .bind(book.description)
    .bind(book.cover_image_url)
    .bind(book.book_file_url)
    .bind(&book.price)
    .bind(user.id)
    .fetch_one(pool)
    .await
    .map_err(|e| HandlerResponse::internal_error("Failed to save book", &e.into()))?;

    Ok(HandlerResponse::new(StatusCode::CREATED)
        .message(format!("\"{}\" has been uploaded successfully!", book.title))
        .data(json!({ "id": book_id })))
}

/// Replaces every field of a book the caller uploaded
#[instrument(skip_all, fields(teacher = %user.username, book_id = book_id))]
pub async fn edit_book(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(book_id): Path<i64>,
    Json(form): Json<BookForm>,
) -> Result<HandlerResponse, HandlerResponse> {
    let pool = db_pool(&state)?;
    ensure_owner(pool, book_id, user.id).await?;

    let book: ValidBook<'_> = form.validate().map_err(invalid_form)?;

    sqlx::query(
        r#"
        UPDATE books
        SET title = $1, description = $2, cover_image_url = $3, book_file_url = $4, price = $5::NUMERIC
        WHERE id = $6
        "#,
    )
    .bind(book.title)
    .bind(book.description)
    .bind(book.cover_image_url)
    .bind(book.book_file_url)
    .bind(&book.price)
    .bind(book_id)
    .execute(pool)
    .await
    .map_err(|e| HandlerResponse::internal_error("Failed to save book", &e.into()))?;

    Ok(HandlerResponse::new(StatusCode::OK)
        .message(format!("\"{}\" has been updated successfully!", book.title))
        .data(json!({ "id": book_id })))
}

#[instrument(skip_all, fields(teacher = %user.username, book_id = book_id))]
pub async fn delete_book(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(book_id): Path<i64>,
) -> Result<HandlerResponse, HandlerResponse> {
    let pool = db_pool(&state)?;
    let title: String = ensure_owner(pool, book_id, user.id).await?;

    sqlx::query("DELETE FROM books WHERE id = $1")
        .bind(book_id)
        .execute(pool)
        .await
        .map_err(|e| HandlerResponse::internal_error("Failed to delete book", &e.into()))?;

    Ok(HandlerResponse::new(StatusCode::OK)
        .message(format!("\"{}\" has been deleted successfully.", title)))
}

// =============================================================================
// QUERIES
// =============================================================================

const BOOK_SELECT: &str = r#"
    SELECT b.id, b.title, b.description, b.cover_image_url, b.book_file_url,
           b.price::TEXT AS price, b.uploaded_by AS uploaded_by_id,
           u.username AS uploaded_by, b.created_at
    FROM books b
    JOIN users u ON u.id = b.uploaded_by
"#;

fn invalid_form(errors: FieldErrors) -> HandlerResponse {
    HandlerResponse::new(StatusCode::BAD_REQUEST)
        .message("Please correct the errors below.")
        .data(json!({ "errors": field_errors_json(&errors) }))
}

async fn fetch_books(pool: &PgPool, uploaded_by: Option<i64>) -> anyhow::Result<Vec<BookView>> {
    let rows = sqlx::query(&format!(
        "{BOOK_SELECT} WHERE ($1::BIGINT IS NULL OR b.uploaded_by = $1) ORDER BY b.created_at DESC, b.id DESC"
    ))
    .bind(uploaded_by)
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(BookView::from_row).collect())
}

async fn fetch_book(pool: &PgPool, book_id: i64) -> Result<BookView, HandlerResponse> {
    sqlx::query(&format!("{BOOK_SELECT} WHERE b.id = $1"))
        .bind(book_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| HandlerResponse::internal_error("Failed to load book", &e.into()))?
        .map(|row| BookView::from_row(&row))
        .ok_or_else(|| HandlerResponse::not_found("Book not found"))
}

/// Title of the book when `user_id` uploaded it. Missing and foreign books are both 404.
async fn ensure_owner(pool: &PgPool, book_id: i64, user_id: i64) -> Result<String, HandlerResponse> {
    let row = sqlx::query("SELECT title, uploaded_by FROM books WHERE id = $1")
        .bind(book_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| HandlerResponse::internal_error("Failed to load book", &e.into()))?;

    match row {
        Some(row) if row.get::<i64, _>("uploaded_by") == user_id => Ok(row.get("title")),
        _ => Err(HandlerResponse::not_found("Book not found")),
    }
}
