use std::sync::Arc;

use auth::AuthenticationError;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::EmailAddress;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

const INVALID_CREDENTIALS: &str = "Invalid credentials.";

/// Exchange email and password for an access token.
///
/// Unknown email, malformed email and wrong password are indistinguishable
/// to the caller.
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    let Json(body) = body?;
    let (email, password) = body.credentials()?;

    let email = EmailAddress::new(email).map_err(|_| invalid_credentials())?;

    let user = state
        .user_service
        .get_user_by_email(&email)
        .await
        .map_err(|e| match e {
            UserError::NotFoundByEmail(_) => invalid_credentials(),
            _ => ApiError::from(e),
        })?;

    let authenticator = Arc::clone(&state.authenticator);
    let identity = user.identity_claims();
    let stored_hash = user.password_hash.clone();

    let result = tokio::task::spawn_blocking(move || {
        authenticator.authenticate(&password, &stored_hash, &identity)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Credential check task failed");
        ApiError::InternalServerError("Internal server error".to_string())
    })?
    .map_err(|e| match e {
        AuthenticationError::InvalidCredentials => invalid_credentials(),
        AuthenticationError::PasswordError(err) => {
            tracing::error!(user_id = %user.id, error = %err, "Stored hash is unusable");
            ApiError::InternalServerError("Internal server error".to_string())
        }
        AuthenticationError::TokenError(err) => {
            tracing::error!(user_id = %user.id, error = %err, "Token generation failed");
            ApiError::InternalServerError("Error generating token".to_string())
        }
    })?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(ApiSuccess::new(
        StatusCode::OK,
        LoginResponseData {
            message: "Login successful!".to_string(),
            token: result.access_token,
        },
    ))
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized(INVALID_CREDENTIALS.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

impl LoginRequest {
    fn credentials(self) -> Result<(String, String), ApiError> {
        match (self.email, self.password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Ok((email, password))
            }
            _ => Err(ApiError::BadRequest(
                "Email and password required".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub message: String,
    pub token: String,
}
