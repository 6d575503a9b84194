//! Staff sign-in and accounts

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, LoginForm, User},
    repository::{self, Repository},
};

pub const INVALID_CREDENTIALS: &str = "Invalid username or password";
pub const USERNAME_IN_USE: &str = "This username is already in use";

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
}

impl AuthService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Check a login form against the stored hash
    pub async fn authenticate(&self, form: &LoginForm) -> AppResult<User> {
        let username = form.username.trim();
        if username.is_empty() || form.password.is_empty() {
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        let mut conn = self.repository.acquire().await?;
        let user = repository::users::find_active_by_username(&mut conn, username).await?;

        match user {
            Some(user) if verify_password(&user.password_hash, &form.password)? => {
                tracing::info!("User {} signed in", user.username);
                Ok(user)
            }
            _ => {
                tracing::warn!("Failed sign-in for {}", username);
                Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()))
            }
        }
    }

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        let mut conn = self.repository.acquire().await?;
        repository::users::list_active(&mut conn).await
    }

    /// Create an account; the username is unique
    pub async fn create_user(&self, form: CreateUser) -> AppResult<User> {
        let form = CreateUser {
            username: form.username.trim().to_string(),
            password: form.password,
        };
        form.validate().map_err(|_| {
            AppError::Validation(
                "Please enter a username and a password of at least 8 characters".to_string(),
            )
        })?;
        let password_hash = hash_password(&form.password)?;

        let mut uow = self.repository.begin().await?;
        let user = match repository::users::insert(&mut uow, &form.username, &password_hash).await {
            Ok(user) => user,
            Err(e) if e.is_unique_violation() => {
                uow.rollback().await?;
                return Err(AppError::Conflict(USERNAME_IN_USE.to_string()));
            }
            Err(e) => return Err(e),
        };
        uow.commit().await?;

        tracing::info!("Created user {}", user.username);
        Ok(user)
    }

    /// Create the first account when there is none. Returns whether one was created.
    pub async fn seed_admin(&self, username: &str, password: &str) -> AppResult<bool> {
        let mut uow = self.repository.begin().await?;
        if repository::users::count(&mut uow).await? > 0 {
            return Ok(false);
        }

        let password_hash = hash_password(password)?;
        match repository::users::insert(&mut uow, username, &password_hash).await {
            Ok(_) => {}
            // Another instance seeded it first
            Err(e) if e.is_unique_violation() => return Ok(false),
            Err(e) => return Err(e),
        }
        uow.commit().await?;

        tracing::info!("Created initial account {}", username);
        Ok(true)
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Check a password against an Argon2 PHC string
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
