use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use log::{debug, error};

use crate::auth::AuthService;
use crate::error::AppError;

/// Paths under the protected scope that are reachable without a bearer token.
const PUBLIC_PREFIXES: [&str; 1] = ["/api/users/auth/"];

/// Verifies the `Authorization: Bearer <access key>` header and stores the
/// decoded `AccessClaims` in the request extensions.
///
/// Rejections are answered here with the `AppError` response, so the wrapped
/// service is never called for them. Needs `web::Data<AuthService>` registered
/// on the app.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

type AuthFuture<B> = LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>>;

impl<S, B> AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    fn forward(&self, req: ServiceRequest) -> AuthFuture<B> {
        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }

    fn reject(req: ServiceRequest, err: AppError) -> AuthFuture<B> {
        Box::pin(ready(Ok(req.error_response(err).map_into_right_body())))
    }
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = AuthFuture<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let path = req.path();
        if PUBLIC_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
            return self.forward(req);
        }

        let access_key = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|value| value.trim().to_string());

        let Some(access_key) = access_key else {
            return Self::reject(req, AppError::Unauthorized("Missing bearer token".into()));
        };

        let verdict = match req.app_data::<web::Data<AuthService>>() {
            Some(auth) => auth.unpack_access_key(&access_key).map_err(|e| {
                debug!("rejected access key on {}: {}", req.path(), e);
                AppError::from(e)
            }),
            None => {
                error!("AuthMiddleware is mounted without web::Data<AuthService>");
                Err(AppError::InternalServerError(
                    "Authentication is not configured".into(),
                ))
            }
        };

        match verdict {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                self.forward(req)
            }
            Err(err) => Self::reject(req, err),
        }
    }
}
