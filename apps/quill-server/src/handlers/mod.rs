//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod health;
mod images;
mod posts;

use actix_web::web;

use crate::middleware::rate_limit::RateLimitMiddleware;

fn auth_scope() -> actix_web::Scope {
    web::scope("/api/auth")
        .route("/register", web::post().to(auth::register))
        .route("/login", web::post().to(auth::login))
        .route("/me", web::get().to(auth::me))
}

/// Configure all application routes. The auth routes are rate limited when a
/// limiter is given.
pub fn configure_routes(cfg: &mut web::ServiceConfig, limiter: Option<RateLimitMiddleware>) {
    // Registered ahead of `/api` so the narrower scope wins.
    match limiter {
        Some(limiter) => cfg.service(auth_scope().wrap(limiter)),
        None => cfg.service(auth_scope()),
    };

    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::resource("/posts")
                    .route(web::get().to(posts::list_own))
                    .route(web::post().to(posts::create)),
            )
            .service(
                web::resource("/posts/{id}")
                    .route(web::get().to(posts::get))
                    .route(web::patch().to(posts::update))
                    .route(web::delete().to(posts::delete)),
            )
            .service(
                web::resource("/posts/{id}/comments")
                    .route(web::get().to(comments::list))
                    .route(web::post().to(comments::create)),
            )
            .route(
                "/authors/{author_id}/posts",
                web::get().to(posts::list_by_author),
            )
            .route("/blog/{author}/{slug}", web::get().to(posts::get_by_slug))
            .route("/images", web::post().to(images::upload)),
    )
    .route("/storage/images/{path:.*}", web::get().to(images::serve));
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};
    use uuid::Uuid;

    use quill_core::domain::User;
    use quill_core::ports::{BaseRepository, RateLimitResult, RateLimiter};

    use super::*;
    use crate::state::AppState;

    struct Exhausted;

    impl RateLimiter for Exhausted {
        fn check(&self, _key: &str) -> RateLimitResult {
            RateLimitResult {
                allowed: false,
                retry_after: Duration::from_millis(2500),
            }
        }
    }

    /// Allows everything and remembers the keys it was asked about.
    #[derive(Default)]
    struct Recording(Mutex<Vec<String>>);

    impl RateLimiter for Recording {
        fn check(&self, key: &str) -> RateLimitResult {
            self.0.lock().unwrap().push(key.to_string());
            RateLimitResult {
                allowed: true,
                retry_after: Duration::ZERO,
            }
        }
    }

    fn login_from(peer: &str, forwarded_for: &str) -> actix_web::test::TestRequest {
        test::TestRequest::post()
            .uri("/api/auth/login")
            .peer_addr(peer.parse().unwrap())
            .insert_header(("X-Forwarded-For", forwarded_for.to_string()))
            .set_json(json!({ "email": "nobody@example.com", "password": "Passw0rdX" }))
    }

    /// Insert a user straight into the repository and mint a token for them.
    async fn author(state: &AppState, email: &str) -> (Uuid, String) {
        let user = state
            .users
            .insert(User::new(email.to_string(), "unused".to_string()))
            .await
            .unwrap();
        let token = state.tokens.generate_token(user.id, &user.email).unwrap();
        (user.id, token)
    }

    fn bearer(token: &str) -> (&'static str, String) {
        ("Authorization", format!("Bearer {token}"))
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state.clone()))
                    .configure(|cfg| configure_routes(cfg, $state.auth_rate_limit())),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_health_reports_backend() {
        let state = AppState::for_tests();
        let app = app!(state);

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "ok");
        assert_eq!(body["backend"], "memory");
    }

    #[actix_web::test]
    async fn test_register_login_and_me() {
        let state = AppState::for_tests();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "email": "ada@example.com",
                "password": "Passw0rdX",
                "confirm_password": "Passw0rdX",
            }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "ada@example.com", "password": "Passw0rdX" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let token = body["data"]["access_token"].as_str().unwrap().to_string();
        assert_eq!(body["data"]["user"]["username"], "ada");

        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(bearer(&token))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["email"], "ada@example.com");
    }

    #[actix_web::test]
    async fn test_mismatched_passwords_are_unprocessable() {
        let state = AppState::for_tests();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "email": "ada@example.com",
                "password": "Passw0rdX",
                "confirm_password": "Different1",
            }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    async fn test_create_requires_token() {
        let state = AppState::for_tests();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .set_json(json!({ "title": "Hi", "content": "<p>x</p>" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_post_lifecycle() {
        let state = AppState::for_tests();
        let (user_id, token) = author(&state, "writer@example.com").await;
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(bearer(&token))
            .set_json(json!({ "title": "First Light", "content": "<p>Dawn</p>" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        let id = body["data"]["id"].as_str().unwrap().to_string();
        assert_eq!(body["data"]["slug"], "first-light");

        let req = test::TestRequest::get()
            .uri("/api/posts?page=1&page_size=5")
            .insert_header(bearer(&token))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["total_count"], 1);
        assert_eq!(body["data"]["total_pages"], 1);

        let req = test::TestRequest::get()
            .uri(&format!("/api/authors/{user_id}/posts"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["items"][0]["id"], id.as_str());

        let req = test::TestRequest::get()
            .uri("/api/blog/writer/first-light")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["title"], "First Light");

        let req = test::TestRequest::patch()
            .uri(&format!("/api/posts/{id}"))
            .insert_header(bearer(&token))
            .set_json(json!({ "title": "Second Light" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["title"], "Second Light");

        let req = test::TestRequest::delete()
            .uri(&format!("/api/posts/{id}"))
            .insert_header(bearer(&token))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{id}"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_foreign_delete_is_forbidden() {
        let state = AppState::for_tests();
        let (_, owner) = author(&state, "owner@example.com").await;
        let (_, intruder) = author(&state, "intruder@example.com").await;
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(bearer(&owner))
            .set_json(json!({ "title": "Mine", "content": "<p>Keep out</p>" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::delete()
            .uri(&format!("/api/posts/{id}"))
            .insert_header(bearer(&intruder))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{id}"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_oversized_page_is_unprocessable() {
        let state = AppState::for_tests();
        let app = app!(state);

        let req = test::TestRequest::get()
            .uri(&format!("/api/authors/{}/posts?page_size=500", Uuid::new_v4()))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    async fn test_anonymous_comment_flow() {
        let state = AppState::for_tests();
        let (_, token) = author(&state, "host@example.com").await;
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(bearer(&token))
            .set_json(json!({ "title": "Open Thread", "content": "<p>Talk</p>" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri(&format!("/api/posts/{id}/comments"))
            .set_json(json!({ "author_name": "", "content": "Nameless" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let req = test::TestRequest::post()
            .uri(&format!("/api/posts/{id}/comments"))
            .set_json(json!({ "author_name": "Reader", "content": "Nice" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{id}/comments"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"][0]["author_name"], "Reader");
    }

    #[actix_web::test]
    async fn test_image_upload_and_serve() {
        let state = AppState::for_tests();
        let app = app!(state);
        let png = vec![0x89, 0x50, 0x4e, 0x47];

        let req = test::TestRequest::post()
            .uri("/api/images?kind=cover&file_name=a.png")
            .insert_header(("Content-Type", "image/png"))
            .set_payload(png.clone())
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/api/images?kind=comment&file_name=a.svg")
            .insert_header(("Content-Type", "image/svg+xml"))
            .set_payload("<svg onload=\"alert(1)\"/>")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let req = test::TestRequest::post()
            .uri("/api/images?kind=comment&file_name=a.png")
            .insert_header(("Content-Type", "image/png"))
            .set_payload(png.clone())
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        let url = body["data"]["url"].as_str().unwrap();
        let path = url.strip_prefix("http://localhost:8080").unwrap();
        assert!(path.starts_with("/storage/images/public/"));

        let res = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers().get("content-type").unwrap(), "image/png");
        assert_eq!(res.headers().get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(test::read_body(res).await.as_ref(), png.as_slice());

        let req = test::TestRequest::get()
            .uri("/storage/images/public/missing.png")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_auth_routes_are_rate_limited() {
        let state = AppState::for_tests().with_rate_limiter(Some(Arc::new(Exhausted)));
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "ada@example.com", "password": "Passw0rdX" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(res.headers().get("Retry-After").unwrap(), "3");

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request())
                .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_rate_limit_ignores_forwarded_headers_by_default() {
        let recording = Arc::new(Recording::default());
        let state = AppState::for_tests().with_rate_limiter(Some(recording.clone()));
        let app = app!(state);

        for forwarded in ["1.1.1.1", "2.2.2.2", "3.3.3.3"] {
            let req = login_from("10.0.0.7:4000", forwarded).to_request();
            test::call_service(&app, req).await;
        }
        assert_eq!(*recording.0.lock().unwrap(), vec!["10.0.0.7"; 3]);
    }

    #[actix_web::test]
    async fn test_rate_limit_uses_forwarded_for_behind_trusted_proxy() {
        let recording = Arc::new(Recording::default());
        let mut state = AppState::for_tests().with_rate_limiter(Some(recording.clone()));
        state.trust_proxy_headers = true;
        let app = app!(state);

        for forwarded in ["1.1.1.1", "2.2.2.2"] {
            let req = login_from("10.0.0.7:4000", forwarded).to_request();
            test::call_service(&app, req).await;
        }
        assert_eq!(*recording.0.lock().unwrap(), vec!["1.1.1.1", "2.2.2.2"]);
    }

    #[cfg(feature = "rate-limit")]
    #[actix_web::test]
    async fn test_rotating_forwarded_for_still_hits_the_limit() {
        use quill_infra::{InMemoryRateLimiter, RateLimitConfig};

        let limiter = InMemoryRateLimiter::new(RateLimitConfig {
            max_requests: 1,
            window: Duration::from_secs(60),
        });
        let state = AppState::for_tests().with_rate_limiter(Some(Arc::new(limiter)));
        let app = app!(state);

        let mut statuses = Vec::new();
        for i in 0..5 {
            let req = login_from("10.0.0.8:4000", &format!("192.0.2.{i}")).to_request();
            statuses.push(test::call_service(&app, req).await.status());
        }
        assert_eq!(statuses[0], StatusCode::UNAUTHORIZED);
        assert!(statuses[1..].iter().all(|s| *s == StatusCode::TOO_MANY_REQUESTS));
    }

    #[actix_web::test]
    async fn test_missing_post_is_not_found_for_writes() {
        let state = AppState::for_tests();
        let (_, token) = author(&state, "editor@example.com").await;
        let app = app!(state);
        let missing = Uuid::new_v4();

        let req = test::TestRequest::patch()
            .uri(&format!("/api/posts/{missing}"))
            .insert_header(bearer(&token))
            .set_json(json!({ "title": "Ghost" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post()
            .uri(&format!("/api/posts/{missing}/comments"))
            .set_json(json!({ "author_name": "Reader", "content": "Hello?" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
