use crate::{
    alert::{alert_handlers, alert_models::MarkAlertsReadRequest},
    message::{
        message_dto::{ConversationSummary, LastMessage, SendMessageRequest, StatusResponse},
        message_handlers,
        message_models::Message,
    },
    middleware::auth_middleware,
    state::AppState,
    user::{user_handlers, User, UserSummary},
};
use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::message::message_handlers::get_conversations,
        crate::message::message_handlers::get_thread,
        crate::message::message_handlers::send_message,
        crate::message::message_handlers::mark_delivered,
        crate::message::message_handlers::mark_read,
        crate::user::user_handlers::get_current_user,
        crate::user::user_handlers::list_contacts,
        crate::alert::alert_handlers::mark_alerts_read,
    ),
    components(
        schemas(
            SendMessageRequest,
            ConversationSummary,
            LastMessage,
            StatusResponse,
            Message,
            User,
            UserSummary,
            MarkAlertsReadRequest,
        )
    ),
    tags(
        (name = "messages", description = "Staff messaging endpoints"),
        (name = "users", description = "User directory endpoints"),
        (name = "alerts", description = "Emergency alert endpoints")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            )
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);

    let message_routes = Router::new()
        .route("/", post(message_handlers::send_message))
        .route("/:user_id", get(message_handlers::get_thread))
        .route("/deliver/:sender_id", put(message_handlers::mark_delivered))
        .route("/read/:sender_id", put(message_handlers::mark_read));

    let user_routes = Router::new()
        .route("/me", get(user_handlers::get_current_user))
        .route("/contacts", get(user_handlers::list_contacts));

    let alert_routes = Router::new().route("/read", put(alert_handlers::mark_alerts_read));

    // Every API route acts on behalf of an authenticated viewer
    let api_routes = Router::new()
        .route("/conversations", get(message_handlers::get_conversations))
        .nest("/messages", message_routes)
        .nest("/users", user_routes)
        .nest("/alerts", alert_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        alert::Alert,
        auth::create_jwt,
        message::MessageStore,
        store::InMemoryStore,
        test_support::{failing_state, memory_state, staff, token},
        user::User,
    };
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use chrono::Utc;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    struct TestApp {
        router: Router,
        store: Arc<InMemoryStore>,
    }

    async fn app(users: &[User]) -> TestApp {
        let (state, store) = memory_state(users).await;
        TestApp {
            router: create_router(state),
            store,
        }
    }

    async fn call(
        app: &TestApp,
        method: Method,
        uri: &str,
        as_user: Option<&User>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = as_user {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token(user)));
        }
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        // Extractor rejections are plain text
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn send(app: &TestApp, from: &User, to: &User, content: &str) -> (StatusCode, Value) {
        call(
            app,
            Method::POST,
            "/api/messages",
            Some(from),
            Some(json!({ "receiverId": to.id, "content": content })),
        )
        .await
    }

    #[tokio::test]
    async fn test_requires_authentication() {
        let a = staff("Alice", "nurse");
        let app = app(&[a.clone()]).await;

        let (status, body) = call(&app, Method::GET, "/api/conversations", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_rejects_unknown_and_inactive_users() {
        let ghost = staff("Ghost", "nurse");
        let mut inactive = staff("Idle", "nurse");
        inactive.is_active = false;
        let app = app(&[inactive.clone()]).await;

        let (status, _) = call(&app, Method::GET, "/api/conversations", Some(&ghost), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) =
            call(&app, Method::GET, "/api/conversations", Some(&inactive), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_token_signed_with_another_secret_is_rejected() {
        let a = staff("Alice", "nurse");
        let app = app(&[a.clone()]).await;
        let forged = create_jwt(a.id, "not-the-server-secret", 1).unwrap();

        let request = Request::builder()
            .uri("/api/conversations")
            .header(AUTHORIZATION, format!("Bearer {}", forged))
            .body(Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_send_message_returns_created_message() {
        let (a, b) = (staff("Alice", "nurse"), staff("Bob", "caregiver"));
        let app = app(&[a.clone(), b.clone()]).await;

        let (status, body) = send(&app, &a, &b, " hello ").await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["senderId"], json!(a.id));
        assert_eq!(body["receiverId"], json!(b.id));
        assert_eq!(body["content"], "hello");
        assert_eq!(body["isRead"], false);
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_send_blank_message_is_bad_request() {
        let (a, b) = (staff("Alice", "nurse"), staff("Bob", "caregiver"));
        let app = app(&[a.clone(), b.clone()]).await;

        let (status, body) = send(&app, &a, &b, "   ").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("content"));
        assert!(app.store.find_involving(a.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_to_unknown_receiver_is_not_found() {
        let a = staff("Alice", "nurse");
        let app = app(&[a.clone()]).await;

        let (status, body) = send(&app, &a, &staff("Nobody", "nurse"), "hi").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Receiver not found");
    }

    #[tokio::test]
    async fn test_unread_scenario_over_http() {
        let (a, b) = (staff("Alice", "nurse"), staff("Bob", "caregiver"));
        let app = app(&[a.clone(), b.clone()]).await;
        send(&app, &a, &b, "hello").await;

        let (status, list) = call(&app, Method::GET, "/api/conversations", Some(&b), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);
        assert_eq!(list[0]["user"]["id"], json!(a.id));
        assert_eq!(list[0]["user"]["fullName"], "Alice");
        assert_eq!(list[0]["user"]["userType"], "nurse");
        assert_eq!(list[0]["lastMessage"]["content"], "hello");
        assert_eq!(list[0]["lastMessage"]["isRead"], false);
        assert_eq!(list[0]["unreadCount"], 1);

        let uri = format!("/api/messages/{}", a.id);
        let (status, thread) = call(&app, Method::GET, &uri, Some(&b), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(thread.as_array().unwrap().len(), 1);
        // pre-update state is echoed back
        assert_eq!(thread[0]["isRead"], false);

        let (_, list) = call(&app, Method::GET, "/api/conversations", Some(&b), None).await;
        assert_eq!(list[0]["unreadCount"], 0);
        assert_eq!(list[0]["lastMessage"]["isRead"], true);
    }

    #[tokio::test]
    async fn test_thread_is_chronological() {
        let (a, b) = (staff("Alice", "nurse"), staff("Bob", "caregiver"));
        let app = app(&[a.clone(), b.clone()]).await;
        for (from, to, text) in [(&a, &b, "one"), (&b, &a, "two"), (&a, &b, "three")] {
            send(&app, from, to, text).await;
        }

        let uri = format!("/api/messages/{}", b.id);
        let (_, thread) = call(&app, Method::GET, &uri, Some(&a), None).await;

        let contents: Vec<_> = thread
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["content"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_thread_with_unknown_user_is_not_found() {
        let a = staff("Alice", "nurse");
        let app = app(&[a.clone()]).await;

        let uri = format!("/api/messages/{}", Uuid::new_v4());
        let (status, _) = call(&app, Method::GET, &uri, Some(&a), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_mark_read_and_delivered_are_idempotent() {
        let (a, b) = (staff("Alice", "nurse"), staff("Bob", "caregiver"));
        let app = app(&[a.clone(), b.clone()]).await;
        send(&app, &a, &b, "one").await;
        send(&app, &a, &b, "two").await;

        let uri = format!("/api/messages/deliver/{}", a.id);
        let (status, body) = call(&app, Method::PUT, &uri, Some(&b), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Messages marked as delivered");
        assert_eq!(body["updated"], 2);

        let uri = format!("/api/messages/read/{}", a.id);
        for _ in 0..2 {
            let (status, body) = call(&app, Method::PUT, &uri, Some(&b), None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["message"], "Messages marked as read");
            assert_eq!(body["updated"], 0);
        }
    }

    #[tokio::test]
    async fn test_malformed_counterpart_id_is_rejected() {
        let a = staff("Alice", "nurse");
        let app = app(&[a.clone()]).await;

        let (status, _) =
            call(&app, Method::GET, "/api/messages/not-a-uuid", Some(&a), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_contacts_only_list_staff() {
        let a = staff("Alice", "nurse");
        let b = staff("Bob", "doctor");
        let r = staff("Rita", "resident");
        let f = staff("Fred", "family");
        let app = app(&[a.clone(), b.clone(), r, f]).await;

        let (status, contacts) =
            call(&app, Method::GET, "/api/users/contacts", Some(&a), None).await;

        assert_eq!(status, StatusCode::OK);
        let ids: Vec<_> = contacts.as_array().unwrap().iter().map(|u| u["id"].clone()).collect();
        assert_eq!(ids, vec![json!(b.id)]);
    }

    #[tokio::test]
    async fn test_current_user() {
        let a = staff("Alice", "nurse");
        let app = app(&[a.clone()]).await;

        let (status, me) = call(&app, Method::GET, "/api/users/me", Some(&a), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["fullName"], "Alice");
        assert_eq!(me["isActive"], true);
    }

    #[tokio::test]
    async fn test_mark_alerts_read() {
        let a = staff("Alice", "nurse");
        let app = app(&[a.clone()]).await;
        let alert = Alert {
            id: Uuid::new_v4(),
            resident_name: "Mr. Grey".to_string(),
            alert_type: "fall".to_string(),
            description: None,
            is_read: false,
            created_at: Utc::now(),
        };
        app.store.insert_alert(alert.clone()).await;

        let body = json!({ "alertIds": [alert.id, Uuid::new_v4()] });
        let (status, res) =
            call(&app, Method::PUT, "/api/alerts/read", Some(&a), Some(body.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(res["updated"], 1);
        assert!(app.store.alerts().await.iter().all(|a| a.is_read));

        let (_, res) = call(&app, Method::PUT, "/api/alerts/read", Some(&a), Some(body)).await;
        assert_eq!(res["updated"], 0);

        let (status, _) = call(
            &app,
            Method::PUT,
            "/api/alerts/read",
            Some(&a),
            Some(json!({ "alertIds": [] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_store_failure_is_500_with_underlying_message() {
        let (a, b) = (staff("Alice", "nurse"), staff("Bob", "caregiver"));
        let (state, store) = failing_state(&[a.clone(), b.clone()], true, true).await;
        let app = TestApp {
            router: create_router(state),
            store,
        };

        let (status, body) = call(&app, Method::GET, "/api/conversations", Some(&b), None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["message"].as_str().unwrap().starts_with("Database error: "));

        let uri = format!("/api/messages/{}", a.id);
        let (status, body) = call(&app, Method::GET, &uri, Some(&b), None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["message"].as_str().unwrap().starts_with("Database error: "));
    }

    #[tokio::test]
    async fn test_thread_open_is_500_when_marking_read_fails() {
        let (a, b) = (staff("Alice", "nurse"), staff("Bob", "caregiver"));
        let (state, store) = failing_state(&[a.clone(), b.clone()], false, true).await;
        let app = TestApp {
            router: create_router(state),
            store,
        };
        send(&app, &a, &b, "hi").await;

        let uri = format!("/api/messages/{}", a.id);
        let (status, body) = call(&app, Method::GET, &uri, Some(&b), None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["message"].as_str().unwrap().starts_with("Database error: "));
        let thread = app.store.find_thread(a.id, b.id).await.unwrap();
        assert!(thread.iter().all(|m| !m.is_read));
    }

    #[tokio::test]
    async fn test_openapi_lists_messaging_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/conversations",
            "/api/messages",
            "/api/messages/{user_id}",
            "/api/messages/deliver/{sender_id}",
            "/api/messages/read/{sender_id}",
            "/api/alerts/read",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
