use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::{self, AuthError, Role};
use crate::error::ApiError;

/// Authenticated caller context extracted from the bearer token.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i64,
    pub role: Role,
}

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
pub const STAFF: &[Role] = &[Role::Admin, Role::Mechanic];
/// Any valid, unexpired credential. Used by customer self-service endpoints,
/// which read the subject id as the acting customer id.
pub const ANY_AUTHENTICATED: &[Role] = &[];

/// Per-route guard; applied with `axum::middleware::from_fn`, never globally,
/// since registration, login, and public listings take no credential.
///
/// An empty `allowed` set means "any authenticated principal". On success the
/// caller identity is injected as an `AuthUser` request extension.
pub async fn authorize(allowed: &'static [Role], mut request: Request, next: Next) -> Response {
    match check(allowed, request.headers()) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(err) => ApiError::from(err).into_response(),
    }
}

fn check(allowed: &[Role], headers: &HeaderMap) -> Result<AuthUser, AuthError> {
    let token = bearer_token(headers)?;
    let claims = auth::verify(&token)?;

    if !allowed.is_empty() && !allowed.contains(&claims.role) {
        return Err(AuthError::Forbidden);
    }

    Ok(AuthUser { id: claims.subject_id()?, role: claims.role })
}

fn bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let value = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(AuthError::Missing)?
        .to_str()
        .map_err(|_| AuthError::Missing)?;

    let token = value.strip_prefix("Bearer ").ok_or(AuthError::Missing)?;
    if token.trim().is_empty() {
        return Err(AuthError::Missing);
    }
    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::AUTHORIZATION;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn test_missing_header_is_missing() {
        assert!(matches!(check(ADMIN_ONLY, &HeaderMap::new()), Err(AuthError::Missing)));
    }

    #[test]
    fn test_non_bearer_scheme_is_missing() {
        let headers = headers_with("Basic abc123");
        assert!(matches!(check(ADMIN_ONLY, &headers), Err(AuthError::Missing)));
    }

    #[test]
    fn test_role_outside_allow_list_is_forbidden() {
        let token = auth::issue(5, Role::Customer).unwrap();
        let headers = headers_with(&format!("Bearer {token}"));
        assert!(matches!(check(ADMIN_ONLY, &headers), Err(AuthError::Forbidden)));
    }

    #[test]
    fn test_empty_allow_list_accepts_any_role() {
        let token = auth::issue(5, Role::Customer).unwrap();
        let headers = headers_with(&format!("Bearer {token}"));
        let user = check(ANY_AUTHENTICATED, &headers).unwrap();
        assert_eq!(user.id, 5);
        assert_eq!(user.role, Role::Customer);
    }

    #[test]
    fn test_allowed_role_passes_with_identity() {
        let token = auth::issue(9, Role::Mechanic).unwrap();
        let headers = headers_with(&format!("Bearer {token}"));
        let user = check(STAFF, &headers).unwrap();
        assert_eq!(user.id, 9);
    }
}
