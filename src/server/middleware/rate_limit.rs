//! Rate limiting middleware
//!
//! Consults the sliding-window limiter before the handler runs. Rejected
//! requests are answered directly with 429, a JSON body describing the
//! applied limit, and the conventional `Retry-After`/`X-RateLimit-*`
//! headers; the handler is never invoked for them.

use crate::core::rate_limiter::{SlidingWindowLimiter, client_identifier};
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::{Error, HttpResponse};
use futures::future::{LocalBoxFuture, Ready, ready};
use serde_json::json;
use std::rc::Rc;
use std::sync::Arc;
use tracing::debug;

/// Rate limit middleware for actix-web.
pub struct RateLimitMiddleware {
    limiter: Arc<SlidingWindowLimiter>,
}

impl RateLimitMiddleware {
    pub fn new(limiter: Arc<SlidingWindowLimiter>) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            limiter: Arc::clone(&self.limiter),
        }))
    }
}

/// Service implementation for the rate limit middleware.
pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    limiter: Arc<SlidingWindowLimiter>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let limiter = Arc::clone(&self.limiter);
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let forwarded = req
                .headers()
                .get("x-forwarded-for")
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let peer = req.peer_addr().map(|addr| addr.ip().to_string());
            let client = client_identifier(forwarded.as_deref(), peer.as_deref());

            let decision = limiter
                .check_and_record(&client, req.method().as_str(), req.path())
                .await;

            if !decision.allowed {
                let retry_after = decision.retry_after_secs.unwrap_or(1);
                let response = HttpResponse::TooManyRequests()
                    .insert_header(("Retry-After", retry_after.to_string()))
                    .insert_header(("X-RateLimit-Limit", decision.limit.to_string()))
                    .insert_header(("X-RateLimit-Remaining", "0"))
                    .insert_header(("X-RateLimit-Reset", retry_after.to_string()))
                    .json(json!({
                        "detail": "Too many requests. Please try again later.",
                        "limit": decision.limit,
                        "window": decision.window_secs,
                        "retry_after": retry_after,
                    }));
                return Ok(req.into_response(response).map_into_right_body());
            }

            debug!(
                client = %client,
                remaining = decision.remaining,
                "request admitted by rate limiter"
            );
            let response = service.call(req).await?;
            Ok(response.map_into_left_body())
        })
    }
}
