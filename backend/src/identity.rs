//! Caller identity.
//!
//! The session layer in front of this service authenticates the user and
//! forwards who they are in the `X-User-Id` and `X-User-Role` headers.

use crate::error::ApiError;
use actix_web::dev::Payload;
use actix_web::http::header::HeaderMap;
use actix_web::{FromRequest, HttpRequest};
use common::model::user::Role;
use std::future::{ready, Ready};

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_ROLE_HEADER: &str = "X-User-Role";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!(
                "user {} is not an admin",
                self.user_id
            )))
        }
    }

    fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        let user_id = header(USER_ID_HEADER)
            .ok_or_else(|| ApiError::Unauthorized(format!("missing {} header", USER_ID_HEADER)))?;
        let role = header(USER_ROLE_HEADER)
            .and_then(Role::parse)
            .ok_or_else(|| {
                ApiError::Unauthorized(format!("missing or unknown {} header", USER_ROLE_HEADER))
            })?;

        Ok(Caller {
            user_id: user_id.to_string(),
            role,
        })
    }
}

impl FromRequest for Caller {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Caller::from_headers(req.headers()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn reads_identity_headers() {
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, "ENU-1001"))
            .insert_header((USER_ROLE_HEADER, "Enumerator"))
            .to_http_request();
        let caller = Caller::from_headers(req.headers()).unwrap();
        assert_eq!(caller.user_id, "ENU-1001");
        assert_eq!(caller.role, Role::Enumerator);
        assert!(caller.require_admin().is_err());
    }

    #[test]
    fn rejects_missing_or_unknown_role() {
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, "ADM-1"))
            .insert_header((USER_ROLE_HEADER, "superuser"))
            .to_http_request();
        assert!(matches!(
            Caller::from_headers(req.headers()),
            Err(ApiError::Unauthorized(_))
        ));

        let req = TestRequest::default().to_http_request();
        assert!(matches!(
            Caller::from_headers(req.headers()),
            Err(ApiError::Unauthorized(_))
        ));
    }
}
