use entity::users;
use platform_api::{ApiError, ApiResult};
use platform_authn::{hash_password, issue_token, verify_password, verify_token};
use platform_authz::Caller;
use platform_db::users::{self as user_store, NewUser};
use sea_orm::SqlErr;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::{BlogService, caller_of, views::AuthPayload};

const USERNAME_MIN_LEN: usize = 3;
const PASSWORD_MIN_LEN: usize = 6;

#[derive(Clone, Debug, Deserialize)]
pub struct RegisterInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: Option<users::Role>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

fn normalize_email(raw: &str) -> ApiResult<String> {
    let email = raw.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(ApiError::InvalidInput("a valid email is required".into())),
    }
}

impl BlogService {
    /// Self-registration may pick `USER` or `AUTHOR`; admins are provisioned
    /// out of band.
    #[instrument(name = "accounts.register", skip_all)]
    pub async fn register(&self, input: RegisterInput) -> ApiResult<AuthPayload> {
        let email = normalize_email(&input.email)?;
        let username = input.username.trim().to_string();
        if username.chars().count() < USERNAME_MIN_LEN {
            return Err(ApiError::InvalidInput(format!(
                "username must be at least {USERNAME_MIN_LEN} characters"
            )));
        }
        if input.password.chars().count() < PASSWORD_MIN_LEN {
            return Err(ApiError::InvalidInput(format!(
                "password must be at least {PASSWORD_MIN_LEN} characters"
            )));
        }
        let role = input.role.unwrap_or_default();
        if role == users::Role::Admin {
            return Err(ApiError::Forbidden);
        }
        if user_store::email_or_username_taken(&self.db, &email, &username).await? {
            return Err(ApiError::Conflict("email or username already registered".into()));
        }

        let password = input.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(ApiError::internal)??;

        let user = user_store::insert(
            &self.db,
            NewUser {
                email,
                username,
                password_hash,
                role,
            },
        )
        .await
        .map_err(|err| match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                ApiError::Conflict("email or username already registered".into())
            }
            _ => ApiError::from(err),
        })?;

        let token = issue_token(user.id, user.role.as_str(), &self.tokens)?;
        info!(user_id = %user.id, role = user.role.as_str(), "user registered");
        Ok(AuthPayload {
            message: "User registered successfully",
            token,
            user: user.into(),
        })
    }

    /// Unknown email and wrong password fail identically.
    #[instrument(name = "accounts.login", skip_all)]
    pub async fn login(&self, input: LoginInput) -> ApiResult<AuthPayload> {
        let email = input.email.trim().to_lowercase();
        let Some(user) = user_store::find_by_email(&self.db, &email).await? else {
            return Err(ApiError::Unauthenticated);
        };

        let stored = user.password_hash.clone();
        let password = input.password;
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
            .await
            .map_err(ApiError::internal)??;
        if !matches {
            return Err(ApiError::Unauthenticated);
        }

        let token = issue_token(user.id, user.role.as_str(), &self.tokens)?;
        Ok(AuthPayload {
            message: "Login successful",
            token,
            user: user.into(),
        })
    }

    /// Resolves a bearer token to a caller. The role comes from the stored
    /// user, so a demoted account loses rights without reissuing tokens.
    pub async fn resolve_caller(&self, token: &str) -> ApiResult<Caller> {
        let claims = verify_token(token, &self.tokens)?;
        let user = user_store::find_by_id(&self.db, claims.sub)
            .await?
            .ok_or(ApiError::Unauthenticated)?;
        Ok(caller_of(&user))
    }
}
