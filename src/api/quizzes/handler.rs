use std::collections::HashMap;

use axum::{extract::{Extension, Path, State}, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::api::auth::service;
use crate::api::db_pool;
use crate::api::middleware::CurrentUser;
use crate::config::state::AppState;
use crate::database::QuizResult;
use crate::utils::response_handler::HandlerResponse;
use crate::utils::utils::non_empty;

use super::scoring::{self, ChoiceKey, Grading};

// =============================================================================
// DTOs
// =============================================================================

#[derive(Serialize)]
pub struct QuizSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub teacher_id: i64,
    pub teacher: String,
    pub question_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct ChoiceView {
    pub id: i64,
    pub text: String,
}

#[derive(Serialize)]
pub struct QuestionView {
    pub id: i64,
    pub text: String,
    pub question_type: String,
    pub choices: Vec<ChoiceView>,
}

#[derive(Deserialize)]
pub struct NewQuestion {
    #[serde(default)]
    pub text: String,
    pub option_a: Option<String>,
    pub option_b: Option<String>,
    pub option_c: Option<String>,
    pub option_d: Option<String>,
    pub correct_option: Option<String>,
}

impl NewQuestion {
    fn options(&self) -> [Option<&str>; 4] {
        [
            non_empty(self.option_a.as_deref()),
            non_empty(self.option_b.as_deref()),
            non_empty(self.option_c.as_deref()),
            non_empty(self.option_d.as_deref()),
        ]
    }
}

#[derive(Deserialize)]
pub struct CreateQuizRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Vec<NewQuestion>,
}

#[derive(Deserialize)]
pub struct AttemptRequest {
    #[serde(default)]
    pub answers: HashMap<i64, i64>,
}

// =============================================================================
// HANDLERS
// =============================================================================

/// Counts for the landing page
pub async fn home(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<HandlerResponse, HandlerResponse> {
    let pool = db_pool(&state)?;

    let row = sqlx::query(
        r#"
        SELECT
            (SELECT COUNT(*) FROM quizzes) AS quizzes,
            (SELECT COUNT(*) FROM videos) AS videos,
            (SELECT COUNT(*) FROM books) AS books
        "#,
    )
    .fetch_one(pool)
    .await
    .map_err(|e| HandlerResponse::internal_error("Failed to load home page", &e.into()))?;

    Ok(HandlerResponse::new(StatusCode::OK).data(json!({
        "user": user.username,
        "quizzes": row.get::<i64, _>("quizzes"),
        "videos": row.get::<i64, _>("videos"),
        "books": row.get::<i64, _>("books"),
    })))
}

/// All quizzes, newest first
pub async fn quiz_list(State(state): State<AppState>) -> Result<HandlerResponse, HandlerResponse> {
    let pool = db_pool(&state)?;

    let rows = sqlx::query(
        r#"
        SELECT q.id, q.title, q.description, q.teacher_id, u.username AS teacher, q.created_at,
               (SELECT COUNT(*) FROM questions qs WHERE qs.quiz_id = q.id) AS question_count
        FROM quizzes q
        JOIN users u ON u.id = q.teacher_id
        ORDER BY q.created_at DESC, q.id DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| HandlerResponse::internal_error("Failed to list quizzes", &e.into()))?;

    let quizzes: Vec<QuizSummary> = rows
        .iter()
        .map(|row| QuizSummary {
            id: row.get("id"),
            title: row.get("title"),
            description: row.get("description"),
            teacher_id: row.get("teacher_id"),
            teacher: row.get("teacher"),
            question_count: row.get("question_count"),
            created_at: row.get("created_at"),
        })
        .collect();

    Ok(HandlerResponse::new(StatusCode::OK).data(json!(quizzes)))
}

/// A quiz with its questions and choices. Which choice is correct stays hidden.
pub async fn quiz_detail(
    State(state): State<AppState>,
    Path(quiz_id): Path<i64>,
) -> Result<HandlerResponse, HandlerResponse> {
    let pool = db_pool(&state)?;

    let quiz = sqlx::query(
        r#"
        SELECT q.id, q.title, q.description, q.teacher_id, u.username AS teacher,
               q.created_at, q.updated_at
        FROM quizzes q
        JOIN users u ON u.id = q.teacher_id
        WHERE q.id = $1
        "#,
    )
    .bind(quiz_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| HandlerResponse::internal_error("Failed to load quiz", &e.into()))?
    .ok_or_else(|| HandlerResponse::not_found("Quiz not found"))?;

    let questions: Vec<QuestionView> = load_questions(pool, quiz_id)
        .await
        .map_err(|e| HandlerResponse::internal_error("Failed to load quiz", &e))?;

    Ok(HandlerResponse::new(StatusCode::OK).data(json!({
        "id": quiz.get::<i64, _>("id"),
        "title": quiz.get::<String, _>("title"),
        "description": quiz.get::<String, _>("description"),
        "teacher_id": quiz.get::<i64, _>("teacher_id"),
        "teacher": quiz.get::<String, _>("teacher"),
        "created_at": quiz.get::<DateTime<Utc>, _>("created_at"),
        "updated_at": quiz.get::<DateTime<Utc>, _>("updated_at"),
        "questions": questions,
    })))
}

/// Creates a quiz with four-option multiple choice questions
#[instrument(skip_all, fields(teacher = %user.username))]
pub async fn create_quiz(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<HandlerResponse, HandlerResponse> {
    let Some(title) = non_empty(payload.title.as_deref()) else {
        return Err(HandlerResponse::new(StatusCode::BAD_REQUEST)
            .message("Quiz title is required. Please provide a title."));
    };
    let description: &str = payload.description.as_deref().unwrap_or("").trim();

    let questions: Vec<&NewQuestion> = payload
        .questions
        .iter()
        .filter(|q| !q.text.trim().is_empty())
        .collect();

    for (number, question) in questions.iter().enumerate() {
        if question.options().iter().any(Option::is_none) {
            return Err(HandlerResponse::new(StatusCode::BAD_REQUEST)
                .message(format!("Question {} needs all four options (A-D).", number + 1)));
        }
    }

    let pool = db_pool(&state)?;
    let quiz_id: i64 = insert_quiz(pool, user.id, title, description, &questions)
        .await
        .map_err(|e| HandlerResponse::internal_error("An unexpected error occurred while creating the quiz", &e))?;

    tracing::info!("Quiz {} created with {} question(s)", quiz_id, questions.len());

    Ok(HandlerResponse::new(StatusCode::CREATED)
        .message(format!("\"{}\" has been created successfully!", title))
        .data(json!({ "id": quiz_id, "question_count": questions.len() })))
}

/// Grades an attempt, records the answers and keeps the score for the results page
#[instrument(skip_all, fields(student = %user.username, quiz_id = quiz_id))]
pub async fn quiz_attempt(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<AttemptRequest>,
) -> Result<HandlerResponse, HandlerResponse> {
    let pool = db_pool(&state)?;
    ensure_quiz_exists(pool, quiz_id).await?;

    let grading: Grading = grade_attempt(pool, quiz_id, &payload.answers)
        .await
        .map_err(|e| HandlerResponse::internal_error("Failed to grade quiz", &e))?;

    record_answers(pool, user.id, &grading)
        .await
        .map_err(|e| HandlerResponse::internal_error("Failed to save answers", &e))?;

    let result = QuizResult {
        score: grading.score,
        total_questions: grading.total_questions,
    };
    state
        .redis
        .store_quiz_result(&user.token, quiz_id, result)
        .await
        .map_err(|e| HandlerResponse::internal_error("Failed to store quiz result", &e))?;

    let mut response = HandlerResponse::new(StatusCode::OK)
        .message("Quiz submitted")
        .data(json!({ "quiz_id": quiz_id, "results_url": format!("/quizzes/{quiz_id}/results") }));
    for question_id in &grading.rejected {
        tracing::warn!("Invalid choice submitted for question {}", question_id);
        response = response.message("An invalid choice was submitted.");
    }
    Ok(response)
}

/// Score of the last attempt; readable once
pub async fn quiz_results(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(quiz_id): Path<i64>,
) -> Result<HandlerResponse, HandlerResponse> {
    let pool = db_pool(&state)?;
    let title: String = ensure_quiz_exists(pool, quiz_id).await?;

    let result: Option<QuizResult> = state
        .redis
        .take_quiz_result(&user.token, quiz_id)
        .await
        .map_err(|e| HandlerResponse::internal_error("Failed to load quiz results", &e))?;

    match result {
        Some(result) => Ok(HandlerResponse::new(StatusCode::OK).data(json!({
            "quiz_id": quiz_id,
            "title": title,
            "score": result.score,
            "total_questions": result.total_questions,
        }))),
        None => Err(HandlerResponse::not_found(
            "Quiz results not found. Please attempt the quiz again.",
        )),
    }
}

/// Public profile of any user
pub async fn user_profile(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<HandlerResponse, HandlerResponse> {
    let pool = db_pool(&state)?;

    let user = service::find_user(pool, user_id)
        .await
        .map_err(|e| HandlerResponse::internal_error("Failed to load profile", &e))?
        .ok_or_else(|| HandlerResponse::not_found("User not found"))?;

    Ok(HandlerResponse::new(StatusCode::OK).data(json!({
        "id": user.id,
        "username": user.username,
        "role": user.role,
        "date_joined": user.created_at,
    })))
}

// =============================================================================
// QUERIES
// =============================================================================

/// Title of the quiz, or 404
async fn ensure_quiz_exists(pool: &PgPool, quiz_id: i64) -> Result<String, HandlerResponse> {
    sqlx::query_scalar::<_, String>("SELECT title FROM quizzes WHERE id = $1")
        .bind(quiz_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| HandlerResponse::internal_error("Failed to load quiz", &e.into()))?
        .ok_or_else(|| HandlerResponse::not_found("Quiz not found"))
}

async fn load_questions(pool: &PgPool, quiz_id: i64) -> anyhow::Result<Vec<QuestionView>> {
    let question_rows = sqlx::query(
        "SELECT id, text, question_type FROM questions WHERE quiz_id = $1 ORDER BY id",
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await?;

    let choice_rows = sqlx::query(
        r#"
        SELECT c.id, c.question_id, c.text
        FROM choices c
        JOIN questions q ON q.id = c.question_id
        WHERE q.quiz_id = $1
        ORDER BY c.text, c.id
        "#,
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await?;

    let mut by_question: HashMap<i64, Vec<ChoiceView>> = HashMap::new();
    for row in &choice_rows {
        by_question
            .entry(row.get("question_id"))
            .or_default()
            .push(ChoiceView { id: row.get("id"), text: row.get("text") });
    }

    Ok(question_rows
        .iter()
        .map(|row| {
            let id: i64 = row.get("id");
            QuestionView {
                id,
                text: row.get("text"),
                question_type: row.get("question_type"),
                choices: by_question.remove(&id).unwrap_or_default(),
            }
        })
        .collect())
}

async fn insert_quiz(
    pool: &PgPool,
    teacher_id: i64,
    title: &str,
    description: &str,
    questions: &[&NewQuestion],
) -> anyhow::Result<i64> {
    let mut tx = pool.begin().await?;

    let quiz_id: i64 = sqlx::query_scalar(
        "INSERT INTO quizzes (teacher_id, title, description) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(teacher_id)
    .bind(title)
    .bind(description)
    .fetch_one(&mut *tx)
    .await?;

    for question in questions {
        let question_id: i64 = sqlx::query_scalar(
            "INSERT INTO questions (quiz_id, text) VALUES ($1, $2) RETURNING id",
        )
        .bind(quiz_id)
        .bind(question.text.trim())
        .fetch_one(&mut *tx)
        .await?;

        let correct: Option<usize> = scoring::correct_option_index(question.correct_option.as_deref());
        for (index, option) in question.options().iter().enumerate() {
            sqlx::query("INSERT INTO choices (question_id, text, is_correct) VALUES ($1, $2, $3)")
                .bind(question_id)
                .bind(option.unwrap_or_default())
                .bind(correct == Some(index))
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;
    Ok(quiz_id)
}

async fn grade_attempt(pool: &PgPool, quiz_id: i64, submitted: &HashMap<i64, i64>) -> anyhow::Result<Grading> {
    let question_ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM questions WHERE quiz_id = $1 ORDER BY id")
        .bind(quiz_id)
        .fetch_all(pool)
        .await?;

    let choice_ids: Vec<i64> = submitted.values().copied().collect();
    let rows = sqlx::query("SELECT id, question_id, is_correct FROM choices WHERE id = ANY($1)")
        .bind(choice_ids)
        .fetch_all(pool)
        .await?;

    let choices: HashMap<i64, ChoiceKey> = rows
        .iter()
        .map(|row| {
            (
                row.get("id"),
                ChoiceKey { question_id: row.get("question_id"), is_correct: row.get("is_correct") },
            )
        })
        .collect();

    Ok(scoring::grade(&question_ids, &choices, submitted))
}

async fn record_answers(pool: &PgPool, student_id: i64, grading: &Grading) -> anyhow::Result<()> {
    if grading.answers.is_empty() {
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for answer in &grading.answers {
        sqlx::query(
            r#"
            INSERT INTO student_answers (student_id, question_id, selected_choice_id, is_correct)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(student_id)
        .bind(answer.question_id)
        .bind(answer.choice_id)
        .bind(answer.is_correct)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}
