use axum::{extract::{Extension, Path, State}, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::instrument;

use crate::api::{db_pool, field_errors_json, FieldErrors};
use crate::api::middleware::CurrentUser;
use crate::config::state::AppState;
use crate::utils::response_handler::HandlerResponse;
use crate::utils::utils::{is_http_url, non_empty};

use super::embed::embed_url;

const MAX_TITLE_LENGTH: usize = 200;
const MAX_URL_LENGTH: usize = 200;

// =============================================================================
// DTOs
// =============================================================================

#[derive(Serialize)]
pub struct VideoView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub url: String,
    pub embed_url: Option<String>,
    pub teacher_id: i64,
    pub teacher: String,
    pub created_at: DateTime<Utc>,
}

impl VideoView {
    fn from_row(row: &PgRow) -> Self {
        let url: String = row.get("url");
        Self {
            id: row.get("id"),
            title: row.get("title"),
            description: row.get("description"),
            embed_url: embed_url(&url),
            url,
            teacher_id: row.get("teacher_id"),
            teacher: row.get("teacher"),
            created_at: row.get("created_at"),
        }
    }
}

/// Body of create and edit
#[derive(Debug, Default, Deserialize)]
pub struct VideoForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub quizzes: Vec<i64>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ValidVideo<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub url: &'a str,
    pub quizzes: Vec<i64>,
}

impl VideoForm {
    pub fn validate(&self) -> Result<ValidVideo<'_>, FieldErrors> {
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

        let url = non_empty(self.url.as_deref());
        match url {
            None => errors.push(("url", "This field is required.".into())),
            Some(u) if !is_http_url(u) => errors.push(("url", "Enter a valid URL.".into())),
            Some(u) if u.chars().count() > MAX_URL_LENGTH => errors.push((
                "url",
                format!("Ensure this value has at most {MAX_URL_LENGTH} characters."),
            )),
            _ => {}
        }

        match (title, description, url) {
            (Some(title), Some(description), Some(url)) if errors.is_empty() => {
                let mut quizzes: Vec<i64> = self.quizzes.clone();
                quizzes.sort_unstable();
                quizzes.dedup();
                Ok(ValidVideo { title, description, url, quizzes })
            }
            _ => Err(errors),
        }
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// All videos, newest first
pub async fn video_list(State(state): State<AppState>) -> Result<HandlerResponse, HandlerResponse> {
    let pool = db_pool(&state)?;
    let videos: Vec<VideoView> = fetch_videos(pool, None)
        .await
        .map_err(|e| HandlerResponse::internal_error("Failed to list videos", &e))?;
    Ok(HandlerResponse::new(StatusCode::OK).data(json!(videos)))
}

/// The caller's own uploads
pub async fn teacher_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<HandlerResponse, HandlerResponse> {
    let pool = db_pool(&state)?;
    let videos: Vec<VideoView> = fetch_videos(pool, Some(user.id))
        .await
        .map_err(|e| HandlerResponse::internal_error("Failed to list videos", &e))?;
    Ok(HandlerResponse::new(StatusCode::OK).data(json!({ "user_videos": videos })))
}

/// One video with its embed URL and linked quizzes
pub async fn video_detail(
    State(state): State<AppState>,
    Path(video_id): Path<i64>,
) -> Result<HandlerResponse, HandlerResponse> {
    let pool = db_pool(&state)?;

    let row = sqlx::query(&format!("{VIDEO_SELECT} WHERE v.id = $1"))
        .bind(video_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| HandlerResponse::internal_error("Failed to load video", &e.into()))?
        .ok_or_else(|| HandlerResponse::not_found("Video not found"))?;

    let quizzes = sqlx::query(
        r#"
        SELECT q.id, q.title
        FROM video_quizzes vq
        JOIN quizzes q ON q.id = vq.quiz_id
        WHERE vq.video_id = $1
        ORDER BY q.created_at DESC
        "#,
    )
    .bind(video_id)
    .fetch_all(pool)
    .await
    .map_err(|e| HandlerResponse::internal_error("Failed to load video", &e.into()))?;

    let linked: Vec<serde_json::Value> = quizzes
        .iter()
        .map(|q| json!({ "id": q.get::<i64, _>("id"), "title": q.get::<String, _>("title") }))
        .collect();

    let mut data = json!(VideoView::from_row(&row));
    data["quizzes"] = json!(linked);

    Ok(HandlerResponse::new(StatusCode::OK).data(data))
}

#[instrument(skip_all, fields(teacher = %user.username))]
pub async fn create_video(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(form): Json<VideoForm>,
) -> Result<HandlerResponse, HandlerResponse> {
    let video: ValidVideo<'_> = form.validate().map_err(invalid_form)?;
    let pool = db_pool(&state)?;
    check_quizzes_exist(pool, &video.quizzes).await?;

    let video_id: i64 = save_video(pool, None, user.id, &video)
        .await
        .map_err(|e| HandlerResponse::internal_error("Failed to save video", &e))?;

    Ok(HandlerResponse::new(StatusCode::CREATED)
        .message(format!("\"{}\" has been uploaded successfully!", video.title))
        .data(json!({ "id": video_id })))
}

/// Replaces every field of a video the caller owns
#[instrument(skip_all, fields(teacher = %user.username, video_id = video_id))]
pub async fn edit_video(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(video_id): Path<i64>,
    Json(form): Json<VideoForm>,
) -> Result<HandlerResponse, HandlerResponse> {
    let pool = db_pool(&state)?;
    ensure_owner(pool, video_id, user.id).await?;

    let video: ValidVideo<'_> = form.validate().map_err(invalid_form)?;
    check_quizzes_exist(pool, &video.quizzes).await?;

    save_video(pool, Some(video_id), user.id, &video)
        .await
        .map_err(|e| HandlerResponse::internal_error("Failed to save video", &e))?;

    Ok(HandlerResponse::new(StatusCode::OK)
        .message(format!("\"{}\" has been updated successfully!", video.title))
        .data(json!({ "id": video_id })))
}

#[instrument(skip_all, fields(teacher = %user.username, video_id = video_id))]
pub async fn delete_video(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(video_id): Path<i64>,
) -> Result<HandlerResponse, HandlerResponse> {
    let pool = db_pool(&state)?;
    let title: String = ensure_owner(pool, video_id, user.id).await?;

    sqlx::query("DELETE FROM videos WHERE id = $1")
        .bind(video_id)
        .execute(pool)
        .await
        .map_err(|e| HandlerResponse::internal_error("Failed to delete video", &e.into()))?;

    Ok(HandlerResponse::new(StatusCode::OK)
        .message(format!("\"{}\" has been deleted successfully.", title)))
}

// =============================================================================
// QUERIES
// =============================================================================

const VIDEO_SELECT: &str = r#"
    SELECT v.id, v.title, v.description, v.url, v.teacher_id, u.username AS teacher, v.created_at
    FROM videos v
    JOIN users u ON u.id = v.teacher_id
"#;

fn invalid_form(errors: FieldErrors) -> HandlerResponse {
    HandlerResponse::new(StatusCode::BAD_REQUEST)
        .message("Please correct the errors below.")
        .data(json!({ "errors": field_errors_json(&errors) }))
}

async fn fetch_videos(pool: &PgPool, teacher_id: Option<i64>) -> anyhow::Result<Vec<VideoView>> {
    let rows = sqlx::query(&format!(
        "{VIDEO_SELECT} WHERE ($1::BIGINT IS NULL OR v.teacher_id = $1) ORDER BY v.created_at DESC, v.id DESC"
    ))
    .bind(teacher_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(VideoView::from_row).collect())
}

/// Title of the video when `user_id` owns it. Missing and foreign videos are both 404.
async fn ensure_owner(pool: &PgPool, video_id: i64, user_id: i64) -> Result<String, HandlerResponse> {
    let row = sqlx::query("SELECT title, teacher_id FROM videos WHERE id = $1")
        .bind(video_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| HandlerResponse::internal_error("Failed to load video", &e.into()))?;

    match row {
        Some(row) if row.get::<i64, _>("teacher_id") == user_id => Ok(row.get("title")),
        _ => Err(HandlerResponse::not_found("Video not found")),
    }
}

async fn check_quizzes_exist(pool: &PgPool, quiz_ids: &[i64]) -> Result<(), HandlerResponse> {
    if quiz_ids.is_empty() {
        return Ok(());
    }

    let found: Vec<i64> = sqlx::query_scalar("SELECT id FROM quizzes WHERE id = ANY($1)")
        .bind(quiz_ids)
        .fetch_all(pool)
        .await
        .map_err(|e| HandlerResponse::internal_error("Failed to check quizzes", &e.into()))?;

    let errors: FieldErrors = quiz_ids
        .iter()
        .filter(|id| !found.contains(*id))
        .map(|id| ("quizzes", format!("Select a valid choice. {id} is not one of the available choices.")))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(invalid_form(errors))
    }
}

/// Inserts (`video_id` = None) or updates, then replaces the quiz links
async fn save_video(
    pool: &PgPool,
    video_id: Option<i64>,
    teacher_id: i64,
    video: &ValidVideo<'_>,
) -> anyhow::Result<i64> {
    let mut tx = pool.begin().await?;

    let id: i64 = match video_id {
        None => {
            sqlx::query_scalar(
                "INSERT INTO videos (title, description, url, teacher_id) VALUES ($1, $2, $3, $4) RETURNING id",
            )
            .bind(video.title)
            .bind(video.description)
            .bind(video.url)
            .bind(teacher_id)
            .fetch_one(&mut *tx)
            .await?
        }
        Some(id) => {
            sqlx::query("UPDATE videos SET title = $1, description = $2, url = $3 WHERE id = $4")
                .bind(video.title)
                .bind(video.description)
                .bind(video.url)
                .bind(id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM video_quizzes WHERE video_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            id
        }
    };

    for quiz_id in &video.quizzes {
        sqlx::query("INSERT INTO video_quizzes (video_id, quiz_id) VALUES ($1, $2)")
            .bind(id)
            .bind(quiz_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str, description: &str, url: &str) -> VideoForm {
        VideoForm {
            title: Some(title.into()),
            description: Some(description.into()),
            url: Some(url.into()),
            quizzes: vec![3, 1, 3],
        }
    }

    #[test]
    fn valid_form_trims_and_dedups_quizzes() {
        let f = form(" Fractions ", "Halves and quarters", "https://youtu.be/abc");
        let video = f.validate().unwrap();
        assert_eq!(video.title, "Fractions");
        assert_eq!(video.quizzes, vec![1, 3]);
    }

    #[test]
    fn missing_fields_are_reported_together() {
        let errors = VideoForm::default().validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|(f, _)| *f).collect();
        assert_eq!(fields, vec!["title", "description", "url"]);
    }

    #[test]
    fn rejects_bad_and_long_values() {
        let errors = form(&"x".repeat(201), "d", "youtube").validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].1.contains("at most 200"));
        assert_eq!(errors[1].1, "Enter a valid URL.");
    }
}
