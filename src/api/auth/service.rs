// Account rules and persistence shared by the auth handlers and the createadmin command

use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};
use std::fmt;
use std::str::FromStr;

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_USERNAME_LENGTH: usize = 150;
const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "12345678", "123456789", "1234567890", "qwerty123",
    "iloveyou", "admin123", "welcome1", "letmein1", "football", "baseball",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Teacher,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            other => Err(format!("'{other}' is not a valid role")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Everything needed to insert a user and its profile
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub role: Role,
    pub is_superuser: bool,
}

pub use crate::api::FieldErrors;

pub fn validate_username(username: &str, errors: &mut FieldErrors) {
    if username.is_empty() {
        errors.push(("username", "This field is required.".into()));
    } else if username.chars().count() > MAX_USERNAME_LENGTH {
        errors.push(("username", format!("Ensure this value has at most {MAX_USERNAME_LENGTH} characters.")));
    } else if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        errors.push((
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.".into(),
        ));
    }
}

pub fn validate_email(email: &str, errors: &mut FieldErrors) {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        errors.push(("email", "Enter a valid email address.".into()));
    }
}

/// Password strength rules; `username` feeds the similarity check
pub fn validate_password(password: &str, username: &str, errors: &mut FieldErrors) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push((
            "password",
            format!("This password is too short. It must contain at least {MIN_PASSWORD_LENGTH} characters."),
        ));
    }
    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        errors.push(("password", "This password is entirely numeric.".into()));
    }
    if COMMON_PASSWORDS.contains(&password.to_lowercase().as_str()) {
        errors.push(("password", "This password is too common.".into()));
    }
    let lowered = password.to_lowercase();
    let user = username.to_lowercase();
    if user.chars().count() >= 3 && (lowered.contains(&user) || user.contains(&lowered)) {
        errors.push(("password", "The password is too similar to the username.".into()));
    }
}

pub fn hash_password(password: &str) -> Result<String> {
    hash(password.as_bytes(), DEFAULT_COST).context("Failed to hash password")
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    verify(password.as_bytes(), password_hash).unwrap_or(false)
}

/// Inserts the user and its profile in one transaction
pub async fn create_user(pool: &PgPool, new_user: &NewUser<'_>) -> Result<UserRecord> {
    // bcrypt is CPU bound; keep it off the async workers
    let password = new_user.password.to_string();
    let password_hash: String = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("Password hashing task failed")??;

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let row = sqlx::query(
        r#"
        INSERT INTO users (username, email, password_hash, is_staff, is_superuser)
        VALUES ($1, $2, $3, $4, $4)
        RETURNING id, created_at
        "#,
    )
    .bind(new_user.username)
    .bind(new_user.email)
    .bind(password_hash)
    .bind(new_user.is_superuser)
    .fetch_one(&mut *tx)
    .await
    .context("Failed to insert user")?;

    let id: i64 = row.get("id");

    sqlx::query("INSERT INTO profiles (user_id, role) VALUES ($1, $2)")
        .bind(id)
        .bind(new_user.role.as_str())
        .execute(&mut *tx)
        .await
        .context("Failed to insert profile")?;

    tx.commit().await.context("Failed to commit user")?;

    Ok(UserRecord {
        id,
        username: new_user.username.to_string(),
        email: new_user.email.to_string(),
        role: new_user.role,
        is_staff: new_user.is_superuser,
        is_superuser: new_user.is_superuser,
        created_at: row.get("created_at"),
    })
}

const USER_COLUMNS: &str = r#"
    u.id, u.username, u.email, u.is_staff, u.is_superuser, u.created_at,
    COALESCE(p.role, 'student') AS role
"#;

fn user_from_row(row: &sqlx::postgres::PgRow) -> UserRecord {
    let role: String = row.get("role");
    UserRecord {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        role: role.parse().unwrap_or_default(),
        is_staff: row.get("is_staff"),
        is_superuser: row.get("is_superuser"),
        created_at: row.get("created_at"),
    }
}

pub async fn find_user(pool: &PgPool, user_id: i64) -> Result<Option<UserRecord>> {
    let query = format!(
        "SELECT {USER_COLUMNS} FROM users u LEFT JOIN profiles p ON p.user_id = u.id WHERE u.id = $1"
    );
    let row = sqlx::query(&query)
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .context("Failed to load user")?;
    Ok(row.as_ref().map(user_from_row))
}

pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
        .bind(username)
        .fetch_one(pool)
        .await
        .context("Failed to check username")
}

pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
        .bind(email)
        .fetch_one(pool)
        .await
        .context("Failed to check email")
}

/// Id and hash for a login attempt
pub async fn credentials(pool: &PgPool, username: &str) -> Result<Option<(i64, String)>> {
    let row = sqlx::query("SELECT id, password_hash FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
        .context("Failed to load credentials")?;
    Ok(row.map(|r| (r.get("id"), r.get("password_hash"))))
}

pub async fn password_hash_for(pool: &PgPool, user_id: i64) -> Result<Option<String>> {
    sqlx::query_scalar("SELECT password_hash FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .context("Failed to load password hash")
}

pub async fn set_password(pool: &PgPool, user_id: i64, password: &str) -> Result<()> {
    let password = password.to_string();
    let password_hash: String = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("Password hashing task failed")??;

    sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
        .bind(password_hash)
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to update password")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn password_errors(password: &str, username: &str) -> Vec<String> {
        let mut errors = FieldErrors::new();
        validate_password(password, username, &mut errors);
        errors.into_iter().map(|(_, e)| e).collect()
    }

    #[test]
    fn strong_password_passes() {
        assert!(password_errors("blue-kettle-42", "amina").is_empty());
    }

    #[test]
    fn short_numeric_and_common_passwords_fail() {
        assert!(password_errors("abc", "amina")[0].contains("too short"));
        assert!(password_errors("9876543210", "amina").iter().any(|e| e.contains("entirely numeric")));
        assert!(password_errors("Password1", "amina").iter().any(|e| e.contains("too common")));
    }

    #[test]
    fn password_similar_to_username_fails() {
        assert!(password_errors("amina2024!", "amina").iter().any(|e| e.contains("similar")));
    }

    #[test]
    fn username_characters_are_restricted() {
        let mut errors = FieldErrors::new();
        validate_username("kintu.peter+1@x", &mut errors);
        assert!(errors.is_empty());

        validate_username("no spaces", &mut errors);
        validate_username("", &mut errors);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn email_shape_is_checked() {
        let mut errors = FieldErrors::new();
        validate_email("teacher@learnflow.africa", &mut errors);
        assert!(errors.is_empty());

        for bad in ["teacher", "@learnflow.africa", "teacher@localhost", "a b@c.de"] {
            validate_email(bad, &mut errors);
        }
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn roles_parse_and_default_to_student() {
        assert_eq!("Teacher".parse::<Role>().unwrap(), Role::Teacher);
        assert!("principal".parse::<Role>().is_err());
        assert_eq!(Role::default(), Role::Student);
    }

    #[test]
    fn hashes_verify() {
        let hashed = bcrypt::hash("blue-kettle-42", 4).unwrap();
        assert!(verify_password("blue-kettle-42", &hashed));
        assert!(!verify_password("wrong", &hashed));
        assert!(!verify_password("blue-kettle-42", "not-a-hash"));
    }
}
