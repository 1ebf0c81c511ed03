use std::sync::Arc;

use async_trait::async_trait;
use auth::IdentityClaims;
use auth::IdentityResolver;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::user::models::UserId;
use crate::domain::user::models::UserProfile;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// Identity attached to a request admitted by the access gate.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserProfile);

/// Resolves token claims against the user store.
pub struct UserIdentityResolver {
    user_service: Arc<dyn UserServicePort>,
}

impl UserIdentityResolver {
    pub fn new(user_service: Arc<dyn UserServicePort>) -> Self {
        Self { user_service }
    }
}

#[async_trait]
impl IdentityResolver for UserIdentityResolver {
    type Identity = UserProfile;
    type Error = UserError;

    async fn resolve(&self, claims: &IdentityClaims) -> Result<Option<UserProfile>, UserError> {
        // A well-signed token naming no user we could ever have stored.
        let Ok(user_id) = UserId::from_string(&claims.id) else {
            return Ok(None);
        };

        match self.user_service.get_user(&user_id).await {
            Ok(user) => Ok(Some(user.into())),
            Err(UserError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Access gate middleware.
///
/// Either produces exactly one 401 or runs the wrapped handler once with a
/// [`CurrentUser`] extension.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Non-UTF-8 header values are treated as absent.
    let authorization = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let resolver = UserIdentityResolver::new(Arc::clone(&state.user_service));

    let profile = state
        .gate
        .admit(authorization.as_deref(), &resolver)
        .await
        .map_err(|rejection| {
            tracing::warn!(
                reason = rejection.reason(),
                method = %req.method(),
                uri = %req.uri(),
                "Request rejected by access gate"
            );
            ApiError::Unauthorized(rejection.to_string())
        })?;

    tracing::debug!(user_id = %profile.id, "Request admitted");
    req.extensions_mut().insert(CurrentUser(profile));

    Ok(next.run(req).await)
}
