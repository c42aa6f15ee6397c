use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::AccessClaims;
use crate::error::AppError;
use crate::models::Role;

/// The caller identified by `AuthMiddleware`.
///
/// Extraction fails with `401 Unauthorized` when the middleware did not run or
/// did not insert claims for this request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub AccessClaims);

impl AuthenticatedUser {
    pub fn id(&self) -> &str {
        &self.0.user_id
    }

    pub fn role(&self) -> Role {
        self.0.role
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AccessClaims>().cloned() {
            Some(claims) => ready(Ok(AuthenticatedUser(claims))),
            None => {
                let err = AppError::Unauthorized(
                    "No credentials found in request. Ensure AuthMiddleware is active.".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}

/// An authenticated caller whose access key carries the admin role.
///
/// Non-admin callers get `403 Forbidden`.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AccessClaims);

impl FromRequest for AdminUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AccessClaims>().cloned() {
            Some(claims) if claims.role == Role::Admin => ready(Ok(AdminUser(claims))),
            Some(_) => {
                let err = AppError::Forbidden("Only admins may do this".to_string());
                ready(Err(err.into()))
            }
            None => {
                let err = AppError::Unauthorized("No credentials found in request".to_string());
                ready(Err(err.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::dev::Payload;
    use actix_web::http::StatusCode;
    use actix_web::test;

    fn claims(role: Role) -> AccessClaims {
        AccessClaims {
            user_id: "user-123".to_string(),
            role,
            expires_at: 0,
        }
    }

    #[actix_rt::test]
    async fn test_authenticated_user_extractor_success() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(claims(Role::User));

        let mut payload = Payload::None;
        let user = AuthenticatedUser::from_request(&req, &mut payload)
            .await
            .unwrap();
        assert_eq!(user.id(), "user-123");
        assert_eq!(user.role(), Role::User);
    }

    #[actix_rt::test]
    async fn test_authenticated_user_extractor_failure() {
        let req = test::TestRequest::default().to_http_request();

        let mut payload = Payload::None;
        let err = AuthenticatedUser::from_request(&req, &mut payload)
            .await
            .unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_admin_extractor() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(claims(Role::User));
        let mut payload = Payload::None;
        let err = AdminUser::from_request(&req, &mut payload).await.unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(claims(Role::Admin));
        let mut payload = Payload::None;
        assert!(AdminUser::from_request(&req, &mut payload).await.is_ok());
    }
}
