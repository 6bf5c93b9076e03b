//! HTTP Request Handlers
//!
//! This module contains all HTTP request handlers organized by domain.

pub mod attempts;
pub mod health;

use axum::{middleware, Json, Router};
use serde::Serialize;

use crate::{middleware::auth::auth_middleware, state::AppState};

/// Success envelope shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

/// Create all API routes
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new().merge(health::routes()).nest(
        "/attempts",
        attempts::routes()
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
    )
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::{
        constants::{roles, API_BASE_PATH},
        test_utils::{harness, issue_token, test_definition, TestHarness, TEST_JWT_SECRET},
    };

    fn app(h: &TestHarness) -> Router {
        Router::new()
            .nest(API_BASE_PATH, routes(&h.state))
            .with_state(h.state.clone())
    }

    async fn send(
        app: &Router,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(format!("{}{}", API_BASE_PATH, path));
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    fn student() -> (Uuid, String) {
        let id = Uuid::new_v4();
        (id, issue_token(id, roles::STUDENT, TEST_JWT_SECRET))
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness();
        let (status, body) = send(&app(&h), Method::GET, "/health", None, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "healthy");
    }

    #[tokio::test]
    async fn test_start_requires_token() {
        let h = harness();
        let (status, body) = send(
            &app(&h),
            Method::POST,
            "/attempts/start",
            None,
            Some(json!({ "test_id": Uuid::new_v4() })),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["error_code"], "UNAUTHORIZED");

        let (status, _) = send(
            &app(&h),
            Method::POST,
            "/attempts/start",
            Some("garbage"),
            Some(json!({ "test_id": Uuid::new_v4() })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_start_validation() {
        let h = harness();
        let app = app(&h);
        let (_, token) = student();

        let (status, body) =
            send(&app, Method::POST, "/attempts/start", Some(&token), Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "MISSING_TEST_ID");

        let (status, body) = send(
            &app,
            Method::POST,
            "/attempts/start",
            Some(&token),
            Some(json!({ "test_id": "not-a-uuid" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "VALIDATION_ERROR");

        let (status, body) = send(
            &app,
            Method::POST,
            "/attempts/start",
            Some(&token),
            Some(json!({ "test_id": Uuid::new_v4() })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error_code"], "TEST_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_attempt_flow() {
        let h = harness();
        let test = test_definition(Some(60), &[Some(50), Some(50)]);
        h.catalog.add(test.clone()).await;
        let app = app(&h);
        let (user_id, token) = student();
        let judge = issue_token(Uuid::new_v4(), roles::JUDGE, TEST_JWT_SECRET);

        let (status, body) = send(
            &app,
            Method::POST,
            "/attempts/start",
            Some(&token),
            Some(json!({ "test_id": test.id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "active");
        assert_eq!(body["data"]["score"], 0);
        assert_eq!(body["data"]["user_id"], user_id.to_string());
        let attempt_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            Method::POST,
            "/attempts/start",
            Some(&token),
            Some(json!({ "test_id": test.id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], attempt_id.as_str());

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/attempts/{}", attempt_id),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["expired"], false);
        assert!(body["data"]["remaining_seconds"].as_i64().unwrap() > 3500);

        let result = json!({
            "question_id": test.questions[0].question_id,
            "run_type": "scored",
            "passed_count": 3,
            "total_count": 4,
            "language": "cpp",
            "verdict": "wrong_answer"
        });
        let path = format!("/attempts/{}/submissions", attempt_id);

        let (status, body) =
            send(&app, Method::POST, &path, Some(&token), Some(result.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error_code"], "FORBIDDEN");

        let (status, body) = send(&app, Method::POST, &path, Some(&judge), Some(result)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["run_type"], "scored");

        let (status, body) = send(
            &app,
            Method::POST,
            "/attempts/finalize",
            Some(&token),
            Some(json!({ "attempt_id": attempt_id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "submitted");
        assert_eq!(body["data"]["score"], 38);
        assert_eq!(body["data"]["max_score"], 100);
        assert_eq!(body["data"]["already_finalized"], false);
        let submitted_at = body["data"]["submitted_at"].clone();

        let (status, body) = send(
            &app,
            Method::POST,
            "/attempts/finalize",
            Some(&token),
            Some(json!({ "attempt_id": attempt_id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["already_finalized"], true);
        assert_eq!(body["data"]["score"], 38);
        assert_eq!(body["data"]["submitted_at"], submitted_at);
    }

    #[tokio::test]
    async fn test_finalize_foreign_or_unknown_attempt() {
        let h = harness();
        let test = test_definition(Some(60), &[Some(100)]);
        h.catalog.add(test.clone()).await;
        let app = app(&h);
        let (_, owner) = student();
        let (_, intruder) = student();

        let (_, body) = send(
            &app,
            Method::POST,
            "/attempts/start",
            Some(&owner),
            Some(json!({ "test_id": test.id })),
        )
        .await;
        let attempt_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            Method::POST,
            "/attempts/finalize",
            Some(&intruder),
            Some(json!({ "attempt_id": attempt_id })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error_code"], "INVALID_ATTEMPT");

        let (status, body) = send(
            &app,
            Method::POST,
            "/attempts/finalize",
            Some(&owner),
            Some(json!({ "attempt_id": Uuid::new_v4() })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error_code"], "INVALID_ATTEMPT");
    }
}
