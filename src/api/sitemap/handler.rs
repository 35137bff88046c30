use axum::{
    extract::State,
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::api::db_pool;
use crate::config::state::AppState;
use crate::utils::response_handler::HandlerResponse;

use super::render::{render_sitemap, SitemapEntry};

const STATIC_PAGES: [&str; 4] = ["/", "/quizzes", "/video", "/book"];
const QUIZ_PRIORITY: f32 = 0.8;
const BOOK_PRIORITY: f32 = 0.9;
const VIDEO_PRIORITY: f32 = 0.8;

/// Static pages, then quizzes, books and videos, newest first
pub async fn sitemap(State(state): State<AppState>) -> Result<Response, HandlerResponse> {
    let pool = db_pool(&state)?;

    let entries: Vec<SitemapEntry> = collect_entries(pool)
        .await
        .map_err(|e| HandlerResponse::internal_error("Failed to build sitemap", &e))?;

    let xml: String = render_sitemap(&state.environment.site_domain, &entries);
    Ok(([(CONTENT_TYPE, "application/xml")], xml).into_response())
}

async fn collect_entries(pool: &PgPool) -> anyhow::Result<Vec<SitemapEntry>> {
    let mut entries: Vec<SitemapEntry> = STATIC_PAGES
        .iter()
        .map(|path| SitemapEntry::weekly(*path, 1.0, None))
        .collect();

    let sources: [(&str, &str, f32); 3] = [
        ("SELECT id, COALESCE(updated_at, created_at) AS lastmod FROM quizzes ORDER BY created_at DESC", "/quizzes", QUIZ_PRIORITY),
        ("SELECT id, created_at AS lastmod FROM books ORDER BY created_at DESC", "/book", BOOK_PRIORITY),
        ("SELECT id, created_at AS lastmod FROM videos ORDER BY created_at DESC", "/video", VIDEO_PRIORITY),
    ];

    for (query, prefix, priority) in sources {
        let rows = sqlx::query(query).fetch_all(pool).await?;
        entries.extend(rows.iter().map(|row| {
            let id: i64 = row.get("id");
            let lastmod: Option<DateTime<Utc>> = row.get("lastmod");
            SitemapEntry::weekly(format!("{prefix}/{id}"), priority, lastmod)
        }));
    }

    Ok(entries)
}
