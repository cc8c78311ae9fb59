use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, ResponseError,
};
use std::future::{ready, Ready};
use std::pin::Pin;
use std::rc::Rc;

use crate::error::AppError;
use crate::services::RateLimiter;

/// Middleware admitting at most the limiter's quota per client address.
///
/// Reads the shared [`RateLimiter`] from app data.
pub struct RateLimit;

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let rejection = match req.app_data::<web::Data<RateLimiter>>() {
            Some(limiter) => {
                let client_id = req
                    .connection_info()
                    .realip_remote_addr()
                    .unwrap_or("unknown")
                    .to_string();

                limiter.check(&client_id).err().map(|exceeded| {
                    log::warn!(
                        "Rate limit exceeded for {}: max={} retry_after={}s",
                        client_id,
                        limiter.max_requests(),
                        exceeded.retry_after
                    );
                    AppError::RateLimited {
                        retry_after: exceeded.retry_after,
                    }
                })
            }
            None => Some(AppError::Internal(
                "Rate limiter not configured".to_string(),
            )),
        };

        match rejection {
            None => {
                let service = Rc::clone(&self.service);
                Box::pin(async move { service.call(req).await.map(|res| res.map_into_left_body()) })
            }
            Some(error) => {
                let (http_req, _) = req.into_parts();
                let response = error.error_response();
                Box::pin(async move {
                    Ok(ServiceResponse::new(http_req, response).map_into_right_body())
                })
            }
        }
    }
}
