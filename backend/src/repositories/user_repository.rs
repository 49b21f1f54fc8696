use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use tracing::info;

use crate::{
    error::{AppError, AppResult},
    models::{
        now,
        user_models::{generate_session_token, User, UserDraft},
    },
    schema::users,
};

pub struct UserRepository;

impl UserRepository {
    pub fn all(conn: &mut SqliteConnection) -> QueryResult<Vec<User>> {
        users::table
            .order(users::id)
            .select(User::as_select())
            .load(conn)
    }

    pub fn find(conn: &mut SqliteConnection, id: i32) -> AppResult<User> {
        users::table
            .find(id)
            .select(User::as_select())
            .first(conn)
            .optional()?
            .ok_or_else(|| AppError::not_found("User", id))
    }

    pub fn find_by_username(
        conn: &mut SqliteConnection,
        search_username: &str,
    ) -> QueryResult<Option<User>> {
        users::table
            .filter(users::username.eq(search_username))
            .select(User::as_select())
            .first(conn)
            .optional()
    }

    pub fn find_by_session_token(
        conn: &mut SqliteConnection,
        token: &str,
    ) -> QueryResult<Option<User>> {
        users::table
            .filter(users::session_token.eq(token))
            .select(User::as_select())
            .first(conn)
            .optional()
    }

    /// The same error whether the username is unknown or the password wrong.
    pub fn find_by_credentials(
        conn: &mut SqliteConnection,
        username: &str,
        password: &str,
    ) -> AppResult<User> {
        match Self::find_by_username(conn, username)? {
            Some(user) if user.verify_password(password) => Ok(user),
            _ => Err(AppError::InvalidCredentials),
        }
    }

    pub fn create(conn: &mut SqliteConnection, draft: UserDraft) -> AppResult<User> {
        conn.transaction(|conn| {
            let errors = draft.validate(conn)?;
            if !errors.is_empty() {
                return Err(AppError::Validation(errors));
            }

            let user = diesel::insert_into(users::table)
                .values(&draft.user)
                .returning(User::as_returning())
                .get_result(conn)?;

            info!("created user {} ({})", user.username, user.id);
            Ok(user)
        })
    }

    /// Swaps in a fresh token; sessions holding the old one stop resolving.
    pub fn reset_session_token(conn: &mut SqliteConnection, user: &mut User) -> AppResult<String> {
        let token = generate_session_token()?;
        let updated_at = now();

        diesel::update(&*user)
            .set((
                users::session_token.eq(&token),
                users::updated_at.eq(updated_at),
            ))
            .execute(conn)?;

        user.session_token = token.clone();
        user.updated_at = updated_at;
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{conn, demo_draft};

    #[test]
    fn creating_a_user_assigns_a_session_token() {
        let conn = &mut conn();
        let user = UserRepository::create(conn, demo_draft("demo", "demo@example.com")).unwrap();

        assert!(!user.session_token.is_empty());
        assert_ne!(user.password_digest, "password123");
    }

    #[test]
    fn duplicates_are_rejected_and_nothing_is_written() {
        let conn = &mut conn();
        UserRepository::create(conn, demo_draft("demo", "demo@example.com")).unwrap();

        let err = UserRepository::create(conn, demo_draft("demo", "demo@example.com")).unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert!(errors.contains(&"Username has already been taken".to_string()));
                assert!(errors.contains(&"Email has already been taken".to_string()));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(UserRepository::all(conn).unwrap().len(), 1);
    }

    #[test]
    fn every_violation_is_reported_together() {
        let conn = &mut conn();
        let mut draft = UserDraft::new(String::new(), "not-an-email".into()).unwrap();
        draft.set_password("abc").unwrap();

        let Err(AppError::Validation(errors)) = UserRepository::create(conn, draft) else {
            panic!("expected validation error");
        };
        assert_eq!(
            errors,
            vec![
                "Username can't be blank",
                "Email is invalid",
                "Password is too short (minimum is 6 characters)",
            ]
        );
    }

    #[test]
    fn missing_password_is_reported() {
        let conn = &mut conn();
        let draft = UserDraft::new("demo".into(), "demo@example.com".into()).unwrap();

        let Err(AppError::Validation(errors)) = UserRepository::create(conn, draft) else {
            panic!("expected validation error");
        };
        assert_eq!(errors, vec!["Password can't be blank"]);
    }

    #[test]
    fn credentials_check_does_not_reveal_unknown_usernames() {
        let conn = &mut conn();
        UserRepository::create(conn, demo_draft("demo", "demo@example.com")).unwrap();

        let found = UserRepository::find_by_credentials(conn, "demo", "password123").unwrap();
        assert_eq!(found.username, "demo");

        let wrong_password = UserRepository::find_by_credentials(conn, "demo", "nope").unwrap_err();
        let unknown_user = UserRepository::find_by_credentials(conn, "ghost", "nope").unwrap_err();
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[test]
    fn resetting_the_token_invalidates_the_old_one() {
        let conn = &mut conn();
        let mut user = UserRepository::create(conn, demo_draft("demo", "demo@example.com")).unwrap();
        let old_token = user.session_token.clone();

        let new_token = UserRepository::reset_session_token(conn, &mut user).unwrap();

        assert_ne!(old_token, new_token);
        assert!(UserRepository::find_by_session_token(conn, &old_token)
            .unwrap()
            .is_none());
        let resolved = UserRepository::find_by_session_token(conn, &new_token)
            .unwrap()
            .unwrap();
        assert_eq!(resolved.id, user.id);
    }
}
