//! Rate-limit middleware tests
//!
//! The limiter's window arithmetic is covered by unit tests next to the
//! implementation; these verify the HTTP translation: the 429 shape, the
//! resolution order of limits, and per-client keying.

use actix_web::{App, HttpResponse, test, web};
use prompt_arena::{RateLimitConfig, RateLimitMiddleware, SlidingWindowLimiter};
use std::sync::Arc;

fn limiter() -> Arc<SlidingWindowLimiter> {
    Arc::new(SlidingWindowLimiter::new(RateLimitConfig::default()))
}

async fn ok() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

#[actix_web::test]
async fn test_route_override_rejects_with_429_and_headers() {
    let app = test::init_service(
        App::new()
            .wrap(RateLimitMiddleware::new(limiter()))
            .route("/api/v1/token", web::post().to(ok)),
    )
    .await;

    // The token route is capped at 10/60s even though POSTs default to 40.
    for _ in 0..10 {
        let req = test::TestRequest::post()
            .uri("/api/v1/token")
            .peer_addr("203.0.113.5:443".parse().unwrap())
            .to_request();
        let res = test::call_service(&app, req).await;
        assert!(res.status().is_success());
    }

    let req = test::TestRequest::post()
        .uri("/api/v1/token")
        .peer_addr("203.0.113.5:443".parse().unwrap())
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 429);

    let headers = res.headers();
    assert_eq!(headers.get("x-ratelimit-limit").unwrap(), "10");
    assert_eq!(headers.get("x-ratelimit-remaining").unwrap(), "0");
    let retry_after: u64 = headers
        .get("retry-after")
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after >= 1 && retry_after <= 60);

    let body: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(body["limit"], 10);
    assert_eq!(body["window"], 60);
    assert!(body["detail"].as_str().unwrap().contains("Too many requests"));
}

#[actix_web::test]
async fn test_unlisted_route_uses_method_default() {
    let app = test::init_service(
        App::new()
            .wrap(RateLimitMiddleware::new(limiter()))
            .route("/api/v1/ratings", web::post().to(ok)),
    )
    .await;

    // POST default is 40/60s.
    for _ in 0..40 {
        let req = test::TestRequest::post()
            .uri("/api/v1/ratings")
            .peer_addr("203.0.113.5:443".parse().unwrap())
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());
    }
    let req = test::TestRequest::post()
        .uri("/api/v1/ratings")
        .peer_addr("203.0.113.5:443".parse().unwrap())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 429);
}

#[actix_web::test]
async fn test_forwarded_for_separates_clients() {
    let app = test::init_service(
        App::new()
            .wrap(RateLimitMiddleware::new(limiter()))
            .route("/api/v1/token", web::post().to(ok)),
    )
    .await;

    // Exhaust the budget for one forwarded client.
    for _ in 0..10 {
        let req = test::TestRequest::post()
            .uri("/api/v1/token")
            .insert_header(("x-forwarded-for", "198.51.100.1"))
            .peer_addr("10.0.0.1:80".parse().unwrap())
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());
    }
    let req = test::TestRequest::post()
        .uri("/api/v1/token")
        .insert_header(("x-forwarded-for", "198.51.100.1"))
        .peer_addr("10.0.0.1:80".parse().unwrap())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 429);

    // A different forwarded identity behind the same proxy is unaffected.
    let req = test::TestRequest::post()
        .uri("/api/v1/token")
        .insert_header(("x-forwarded-for", "198.51.100.2"))
        .peer_addr("10.0.0.1:80".parse().unwrap())
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());
}

#[actix_web::test]
async fn test_routes_have_independent_windows() {
    let shared = limiter();
    let app = test::init_service(
        App::new()
            .wrap(RateLimitMiddleware::new(shared))
            .route("/api/v1/token", web::post().to(ok))
            .route("/api/v1/compare", web::post().to(ok)),
    )
    .await;

    for _ in 0..10 {
        let req = test::TestRequest::post()
            .uri("/api/v1/token")
            .peer_addr("203.0.113.5:443".parse().unwrap())
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());
    }

    // The same client still has full budget on the comparison route.
    let req = test::TestRequest::post()
        .uri("/api/v1/compare")
        .peer_addr("203.0.113.5:443".parse().unwrap())
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());
}
