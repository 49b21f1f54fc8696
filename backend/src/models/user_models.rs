use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use ring::rand::{SecureRandom, SystemRandom};
use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    schema::users,
};

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[cfg(not(test))]
const PASSWORD_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const PASSWORD_COST: u32 = 4;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_digest: String,
    pub session_token: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl User {
    pub fn verify_password(&self, plaintext: &str) -> bool {
        bcrypt::verify(plaintext, &self.password_digest).unwrap_or(false)
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_digest: String,
    pub session_token: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A user about to be inserted. The plaintext password only lives here long
/// enough to be length-checked; it is never written.
pub struct UserDraft {
    pub user: NewUser,
    password: Option<String>,
}

impl UserDraft {
    pub fn new(username: String, email: String) -> AppResult<Self> {
        let now = super::now();
        Ok(Self {
            user: NewUser {
                username: username.trim().to_string(),
                email: email.trim().to_string(),
                password_digest: String::new(),
                session_token: generate_session_token()?,
                created_at: now,
                updated_at: now,
            },
            password: None,
        })
    }

    pub fn set_password(&mut self, plaintext: &str) -> AppResult<()> {
        self.user.password_digest = bcrypt::hash(plaintext, PASSWORD_COST)?;
        self.password = Some(plaintext.to_string());
        Ok(())
    }

    /// Every rule the draft breaks, uniqueness included.
    pub fn validate(&self, conn: &mut SqliteConnection) -> QueryResult<Vec<String>> {
        let user = &self.user;
        let mut errors = Vec::new();

        if user.username.is_empty() {
            errors.push("Username can't be blank".to_string());
        }
        if user.email.is_empty() {
            errors.push("Email can't be blank".to_string());
        } else if !is_email(&user.email) {
            errors.push("Email is invalid".to_string());
        }

        if !user.username.is_empty() && username_taken(conn, &user.username)? {
            errors.push("Username has already been taken".to_string());
        }
        if !user.email.is_empty() && email_taken(conn, &user.email)? {
            errors.push("Email has already been taken".to_string());
        }

        if let Some(password) = &self.password {
            if password.chars().count() < MIN_PASSWORD_LENGTH {
                errors.push(format!(
                    "Password is too short (minimum is {MIN_PASSWORD_LENGTH} characters)"
                ));
            }
        }
        if user.password_digest.is_empty() {
            errors.push("Password can't be blank".to_string());
        }
        if user.session_token.is_empty() {
            errors.push("Session token can't be blank".to_string());
        }

        Ok(errors)
    }
}

fn username_taken(conn: &mut SqliteConnection, name: &str) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(
        users::table.filter(users::username.eq(name)),
    ))
    .get_result(conn)
}

fn email_taken(conn: &mut SqliteConnection, address: &str) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(
        users::table.filter(users::email.eq(address)),
    ))
    .get_result(conn)
}

/// 16 bytes from the OS generator, URL-safe base64.
pub fn generate_session_token() -> AppResult<String> {
    let mut bytes = [0u8; 16];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::Internal("session token generation failed"))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

pub fn is_email(address: &str) -> bool {
    if address.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
