//! services/api/src/web/middleware.rs
//!
//! Authentication middleware and session-cookie helpers. The session is
//! resolved once here; handlers receive the authenticated user through
//! request extensions and pass the user id down explicitly.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use storefront_core::domain::{AuthUser, Role};

use crate::web::respond::ApiFailure;
use crate::web::state::AppState;

/// Pulls the opaque session id out of the `Cookie` header, if present.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .find_map(|c| c.trim().strip_prefix("session="))
}

/// Resolves the session cookie to an authenticated user, or `None` for
/// anonymous or expired sessions. Used by routes that merely enrich their
/// response when a viewer is signed in.
pub async fn current_user(state: &AppState, headers: &HeaderMap) -> Option<AuthUser> {
    let session_id = session_id_from_headers(headers)?;
    state.store.validate_auth_session(session_id).await.ok()
}

/// Resolves the session and requires the admin role on top of it.
pub async fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, ApiFailure> {
    let user = current_user(state, headers)
        .await
        .ok_or_else(ApiFailure::unauthorized)?;
    if user.role != Role::Admin {
        return Err(ApiFailure::forbidden(
            "You are not authorized to perform this action.",
        ));
    }
    Ok(user)
}

/// Middleware that validates the auth session cookie and extracts the user.
///
/// If valid, inserts the `AuthUser` into request extensions for handlers to use.
/// If invalid or missing, returns 401 with the JSON error envelope.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiFailure> {
    let session_id =
        session_id_from_headers(req.headers()).ok_or_else(ApiFailure::unauthorized)?;

    let user = state
        .store
        .validate_auth_session(session_id)
        .await
        .map_err(|_| ApiFailure::unauthorized())?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_session_id_among_other_cookies() {
        let headers = headers_with_cookie("theme=dark; session=abc-123; lang=en");
        assert_eq!(session_id_from_headers(&headers), Some("abc-123"));
    }

    #[test]
    fn missing_cookie_or_session_yields_none() {
        assert_eq!(session_id_from_headers(&HeaderMap::new()), None);
        let headers = headers_with_cookie("theme=dark");
        assert_eq!(session_id_from_headers(&headers), None);
    }
}
