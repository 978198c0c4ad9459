//! Caller identity from trusted upstream headers.
//!
//! Authentication happens in front of this service; it forwards the user id
//! in `x-user-id` and the user's roles, in order, in `x-user-roles`
//! (comma-separated). A request without `x-user-id` is a guest.

use crate::{behavior::CallerContext, errors::AppError, services::repository::Repository};
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLES_HEADER: &str = "x-user-roles";

impl FromRequestParts<Repository> for CallerContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Repository,
    ) -> Result<Self, Self::Rejection> {
        caller_from_headers(
            &parts.headers,
            &state.interceptor().settings().superuser_role,
        )
    }
}

pub fn caller_from_headers(
    headers: &HeaderMap,
    superuser_role: &str,
) -> Result<CallerContext, AppError> {
    let Some(raw_id) = headers.get(USER_ID_HEADER) else {
        return Ok(CallerContext::Guest);
    };
    let id = raw_id
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<i64>().ok())
        .ok_or_else(|| AppError::bad_request(format!("invalid {} header", USER_ID_HEADER)))?;

    let roles = match headers.get(USER_ROLES_HEADER) {
        Some(value) => value
            .to_str()
            .map_err(|_| AppError::bad_request(format!("invalid {} header", USER_ROLES_HEADER)))?
            .split(',')
            .map(str::trim)
            .filter(|role| !role.is_empty())
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    };

    Ok(CallerContext::user(id, roles, superuser_role))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_missing_id_is_guest() {
        let headers = HeaderMap::new();
        assert_eq!(
            caller_from_headers(&headers, "Superuser").unwrap(),
            CallerContext::Guest
        );
    }

    #[test]
    fn test_roles_keep_order() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("12"));
        headers.insert(USER_ROLES_HEADER, HeaderValue::from_static("Author, Superuser,,"));
        let caller = caller_from_headers(&headers, "Superuser").unwrap();
        assert_eq!(caller.user_id(), Some(12));
        assert_eq!(caller.roles(), ["Author".to_string(), "Superuser".to_string()]);
        assert!(caller.is_superuser());
    }

    #[test]
    fn test_bad_id_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("abc"));
        let err = caller_from_headers(&headers, "Superuser").unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }
}
