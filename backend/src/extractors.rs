use axum::{extract::FromRequestParts, http::request::Parts};
use common::Role;

use crate::{error::AppError, web_server::AppState};

/// The authenticated account for the current request.
///
/// Placed in request extensions by `auth::require_auth`; handlers pull it
/// out with this extractor.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub store_id: Option<i64>,
}

impl CurrentUser {
    /// Guards role-restricted handlers. 403 rather than 401: the caller is
    /// signed in, just on the wrong side of the platform.
    pub fn require_role(&self, role: Role) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // The middleware is responsible for putting CurrentUser in
        // extensions. Its absence means a route was wired without
        // `require_auth`, which is a server bug, not a client one.
        let user = parts.extensions.get::<CurrentUser>().ok_or_else(|| {
            AppError::Internal(
                "CurrentUser not found in request extensions. Is the auth middleware missing?"
                    .into(),
            )
        })?;

        Ok(user.clone())
    }
}
