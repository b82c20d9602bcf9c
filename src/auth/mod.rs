/*!
 * # Authentication and Authorization Module
 *
 * Authentication is delegated entirely to the third-party identity
 * provider: the bearer token is opaque here and verified provider-side.
 * On every successful verification the local user record is materialized
 * (or refreshed) through an idempotent upsert keyed on the external
 * account id, then attached to the request as [`CurrentUser`].
 *
 * Authorization is role-based with exactly two roles (admin | user) plus
 * an active-account check.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::entities::UserModel;
use crate::errors::ServiceError;
use crate::AppState;

/// The locally bound user for an authenticated request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserModel);

impl CurrentUser {
    pub fn id(&self) -> uuid::Uuid {
        self.0.id
    }

    pub fn is_admin(&self) -> bool {
        self.0.is_admin()
    }
}

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| ServiceError::Unauthorized("No token provided".to_string()))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Verify the bearer token with the identity provider and bind the local
/// user record.
async fn bind_user(state: &AppState, headers: &HeaderMap) -> Result<CurrentUser, ServiceError> {
    let token =
        bearer_token(headers).ok_or_else(|| ServiceError::Unauthorized("No token provided".to_string()))?;

    let subject = match state.identity.verify_token(token).await {
        Ok(subject) => subject,
        Err(err @ ServiceError::Unauthorized(_)) => return Err(err),
        Err(err) => {
            // A provider outage means the token cannot be proven valid.
            debug!(error = %err, "token verification unavailable");
            return Err(ServiceError::Unauthorized(
                "Authentication failed".to_string(),
            ));
        }
    };

    let account = state.identity.fetch_account(&subject).await?;
    let user = state.services.users.upsert_from_identity(&account).await?;

    Ok(CurrentUser(user))
}

/// Authentication middleware: requires a valid token and binds the user.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match bind_user(&state, request.headers()).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

/// Optional authentication: a missing or unverifiable token leaves the
/// request anonymous instead of rejecting it.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if bearer_token(request.headers()).is_some() {
        if let Ok(user) = bind_user(&state, request.headers()).await {
            request.extensions_mut().insert(user);
        }
    }
    next.run(request).await
}

/// Reject requests from deactivated accounts.
pub async fn require_active_middleware(request: Request, next: Next) -> Response {
    match request.extensions().get::<CurrentUser>() {
        Some(user) if user.0.is_active => next.run(request).await,
        Some(_) => ServiceError::Forbidden("Account is not active".to_string()).into_response(),
        None => ServiceError::Unauthorized("No token provided".to_string()).into_response(),
    }
}

/// Reject requests from non-admin users.
pub async fn require_admin_middleware(request: Request, next: Next) -> Response {
    match request.extensions().get::<CurrentUser>() {
        Some(user) if user.is_admin() => next.run(request).await,
        Some(_) => ServiceError::Forbidden("Admin access required".to_string()).into_response(),
        None => ServiceError::Unauthorized("No token provided".to_string()).into_response(),
    }
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self, state: AppState) -> Self;
    fn with_admin(self, state: AppState) -> Self;
    fn with_optional_auth(self, state: AppState) -> Self;
}

impl AuthRouterExt for axum::Router<AppState> {
    fn with_auth(self, state: AppState) -> Self {
        self.layer(axum::middleware::from_fn(require_active_middleware))
            .layer(axum::middleware::from_fn_with_state(state, auth_middleware))
    }

    fn with_admin(self, state: AppState) -> Self {
        self.layer(axum::middleware::from_fn(require_admin_middleware))
            .with_auth(state)
    }

    fn with_optional_auth(self, state: AppState) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            state,
            optional_auth_middleware,
        ))
    }
}
