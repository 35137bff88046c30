use axum::{extract::{Extension, State}, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::api::{db_pool, field_errors_json};
use crate::api::middleware::CurrentUser;
use crate::config::state::AppState;
use crate::database::{is_unique_violation, SessionData};
use crate::utils::response_handler::HandlerResponse;
use crate::utils::utils::non_empty;

use super::service::{self, FieldErrors, NewUser, Role, UserRecord};

// =============================================================================
// DTOs
// =============================================================================

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password2: String,
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct PasswordChangeRequest {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password1: String,
    #[serde(default)]
    pub new_password2: String,
}

// =============================================================================
// HANDLERS
// =============================================================================

pub async fn ping() -> HandlerResponse {
    HandlerResponse::new(StatusCode::OK).data(json!("pong"))
}

/// Creates the account and its profile, then logs the new user in
#[instrument(skip_all, fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<HandlerResponse, HandlerResponse> {
    let username: &str = payload.username.trim();
    let email: &str = payload.email.trim();

    let mut errors = FieldErrors::new();
    service::validate_username(username, &mut errors);
    if email.is_empty() {
        errors.push(("email", "This field is required.".into()));
    } else {
        service::validate_email(email, &mut errors);
    }
    if payload.password.is_empty() {
        errors.push(("password", "This field is required.".into()));
    } else {
        service::validate_password(&payload.password, username, &mut errors);
    }
    if payload.password != payload.password2 {
        errors.push(("password2", "The two password fields didn't match.".into()));
    }

    let role: Role = match non_empty(payload.role.as_deref()) {
        Some(raw) => match raw.parse() {
            Ok(role) => role,
            Err(e) => {
                errors.push(("role", e));
                Role::default()
            }
        },
        None => Role::default(),
    };

    if !errors.is_empty() {
        return Err(HandlerResponse::new(StatusCode::BAD_REQUEST)
            .message("Registration failed")
            .data(json!({ "errors": field_errors_json(&errors) })));
    }

    let pool = db_pool(&state)?;

    match service::username_exists(pool, username).await {
        Ok(true) => return Err(duplicate("A user with that username already exists.", "duplicate_username")),
        Ok(false) => {}
        Err(e) => return Err(HandlerResponse::internal_error("Registration failed", &e)),
    }
    match service::email_exists(pool, email).await {
        Ok(true) => return Err(duplicate("A user with that email already exists.", "duplicate_email")),
        Ok(false) => {}
        Err(e) => return Err(HandlerResponse::internal_error("Registration failed", &e)),
    }

    let new_user = NewUser {
        username,
        email,
        password: &payload.password,
        role,
        is_superuser: false,
    };

    let user: UserRecord = match service::create_user(pool, &new_user).await {
        Ok(user) => user,
        // Lost a race with a concurrent registration
        Err(e) if is_unique_violation(&e) => {
            return Err(duplicate("A user with that username or email already exists.", "duplicate_user"))
        }
        Err(e) => return Err(HandlerResponse::internal_error("Registration failed", &e)),
    };

    let token: String = open_session(&state, &user).await?;
    tracing::info!("Registered user {} as {}", user.username, user.role);

    Ok(HandlerResponse::new(StatusCode::CREATED)
        .message("User registered successfully")
        .data(json!({ "token": token, "user": user })))
}

/// Verifies credentials and opens a session
#[instrument(skip_all, fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<HandlerResponse, HandlerResponse> {
    let invalid = || HandlerResponse::new(StatusCode::UNAUTHORIZED).message("Invalid credentials");

    let pool = db_pool(&state)?;
    let (user_id, password_hash) = match service::credentials(pool, payload.username.trim()).await {
        Ok(Some(found)) => found,
        Ok(None) => return Err(invalid()),
        Err(e) => return Err(HandlerResponse::internal_error("Login failed", &e)),
    };

    let password: String = payload.password;
    let verified: bool = tokio::task::spawn_blocking(move || service::verify_password(&password, &password_hash))
        .await
        .unwrap_or(false);
    if !verified {
        return Err(invalid());
    }

    let user: UserRecord = match service::find_user(pool, user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(invalid()),
        Err(e) => return Err(HandlerResponse::internal_error("Login failed", &e)),
    };

    let token: String = open_session(&state, &user).await?;

    Ok(HandlerResponse::new(StatusCode::OK)
        .message("Login successful")
        .data(json!({ "token": token, "user": user })))
}

#[instrument(skip_all, fields(user = %user.username))]
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> HandlerResponse {
    match state.redis.delete_session(&user.token).await {
        Ok(()) => HandlerResponse::new(StatusCode::OK).message("Logged out"),
        Err(e) => HandlerResponse::internal_error("Logout failed", &e),
    }
}

pub async fn profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<HandlerResponse, HandlerResponse> {
    let pool = db_pool(&state)?;
    match service::find_user(pool, user.id).await {
        Ok(Some(record)) => Ok(HandlerResponse::new(StatusCode::OK).data(json!(record))),
        Ok(None) => Err(HandlerResponse::not_found("User not found")),
        Err(e) => Err(HandlerResponse::internal_error("Failed to load profile", &e)),
    }
}

#[instrument(skip_all, fields(user = %user.username))]
pub async fn password_change(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<PasswordChangeRequest>,
) -> Result<HandlerResponse, HandlerResponse> {
    let pool = db_pool(&state)?;

    let stored_hash: String = match service::password_hash_for(pool, user.id).await {
        Ok(Some(hash)) => hash,
        Ok(None) => return Err(HandlerResponse::not_found("User not found")),
        Err(e) => return Err(HandlerResponse::internal_error("Password change failed", &e)),
    };

    let old_password: String = payload.old_password.clone();
    let old_ok: bool = tokio::task::spawn_blocking(move || service::verify_password(&old_password, &stored_hash))
        .await
        .unwrap_or(false);

    let mut errors = FieldErrors::new();
    if !old_ok {
        errors.push(("old_password", "Your old password was entered incorrectly. Please enter it again.".into()));
    }
    if payload.new_password1 != payload.new_password2 {
        errors.push(("new_password2", "The two password fields didn't match.".into()));
    }
    service::validate_password(&payload.new_password1, &user.username, &mut errors);

    if !errors.is_empty() {
        return Err(HandlerResponse::new(StatusCode::BAD_REQUEST)
            .message("Password change failed")
            .data(json!({ "errors": field_errors_json(&errors) })));
    }

    if let Err(e) = service::set_password(pool, user.id, &payload.new_password1).await {
        return Err(HandlerResponse::internal_error("Password change failed", &e));
    }

    Ok(HandlerResponse::new(StatusCode::OK).message("Your password was changed."))
}

// =============================================================================
// HELPERS
// =============================================================================

fn duplicate(message: &str, code: &str) -> HandlerResponse {
    HandlerResponse::new(StatusCode::CONFLICT)
        .message(message)
        .data(json!({ "error": code }))
}

async fn open_session(state: &AppState, user: &UserRecord) -> Result<String, HandlerResponse> {
    let session = SessionData {
        user_id: user.id,
        username: user.username.clone(),
    };
    state
        .redis
        .create_session(&session)
        .await
        .map_err(|e| HandlerResponse::internal_error("Failed to create session", &e))
}
