//! HTTP API handlers

use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use gr_hangouts::{HangoutsError, HangoutsWebhook};
use gr_whatsapp::{find_group, SessionClient};

use crate::error::{ApiError, Result};
use crate::server::{AppState, Delivery};

// ============================================================================
// Request/Response types
// ============================================================================

/// Send-message request payload
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// Destination group name
    pub group_name: Option<String>,
    /// Text to relay
    pub message: Option<String>,
}

impl SendMessageRequest {
    /// Both fields, or `MissingFields` if either is absent or empty
    fn into_parts(self) -> Result<(String, String)> {
        match (self.group_name, self.message) {
            (Some(group), Some(message)) if !group.is_empty() && !message.is_empty() => {
                Ok((group, message))
            }
            _ => Err(ApiError::MissingFields),
        }
    }
}

/// Success acknowledgement
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Generic API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handler functions
// ============================================================================

/// Liveness endpoint
pub async fn root() -> &'static str {
    "WhatsApp group relay is running!"
}

/// Relay a message to an allow-listed group
pub async fn send_message(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StatusResponse>> {
    debug!("Request body: {}", String::from_utf8_lossy(&body));

    // An unparseable body is reported the same way as missing fields.
    let request: SendMessageRequest = serde_json::from_slice(&body).unwrap_or_else(|e| {
        debug!("Ignoring malformed request body: {}", e);
        SendMessageRequest::default()
    });
    let (group_name, message) = request.into_parts()?;

    if !state.allow_list.contains(&group_name) {
        return Err(ApiError::GroupNotAllowed(group_name));
    }

    match &state.delivery {
        Delivery::WhatsApp(session) => {
            send_to_group(session.as_ref(), &group_name, &message).await?;
        }
        Delivery::Hangouts(hangouts) => {
            forward_to_hangouts(hangouts, &message).await?;
        }
        Delivery::Both { session, hangouts } => {
            send_to_group(session.as_ref(), &group_name, &message).await?;
            forward_to_hangouts(hangouts, &message).await?;
        }
    }

    Ok(Json(StatusResponse {
        status: "Message sent successfully.".to_string(),
    }))
}

async fn send_to_group(session: &dyn SessionClient, group_name: &str, message: &str) -> Result<()> {
    let chats = session
        .chats()
        .await
        .map_err(|e| ApiError::Delivery(e.to_string()))?;

    let group = find_group(&chats, group_name)
        .ok_or_else(|| ApiError::GroupNotFound(group_name.to_string()))?;

    session
        .send_text(&group.id.serialized, message)
        .await
        .map_err(|e| ApiError::Delivery(e.to_string()))?;

    info!("Message sent to group {:?} ({})", group_name, group.id.serialized);
    Ok(())
}

async fn forward_to_hangouts(hangouts: &HangoutsWebhook, message: &str) -> Result<()> {
    hangouts.forward(message).await.map_err(|e| match e {
        HangoutsError::NotConfigured => ApiError::WebhookNotConfigured,
        other => ApiError::Forward(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use gr_core::AllowList;
    use gr_whatsapp::{Chat, WhatsAppError};
    use tower::ServiceExt;
    use wiremock::matchers::{body_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::server::app;

    // ========================================================================
    // Mock session client
    // ========================================================================

    #[derive(Default)]
    struct MockSession {
        chats: Vec<Chat>,
        fail_chats: bool,
        fail_send: bool,
        sent: Mutex<Vec<(String, String)>>,
    }

    impl MockSession {
        fn with_chats(chats: Vec<Chat>) -> Arc<Self> {
            Arc::new(Self {
                chats,
                ..Default::default()
            })
        }

        fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SessionClient for MockSession {
        async fn chats(&self) -> gr_whatsapp::Result<Vec<Chat>> {
            if self.fail_chats {
                return Err(WhatsAppError::Api("session not ready".to_string()));
            }
            Ok(self.chats.clone())
        }

        async fn send_text(&self, chat_id: &str, text: &str) -> gr_whatsapp::Result<()> {
            if self.fail_send {
                return Err(WhatsAppError::Api("send failed".to_string()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((chat_id.to_string(), text.to_string()));
            Ok(())
        }
    }

    fn team_a_chats() -> Vec<Chat> {
        vec![
            Chat::direct("Team A", "999@c.us"),
            Chat::group("Team A", "123@g.us"),
        ]
    }

    fn whatsapp_app(allowed: &str, session: Arc<MockSession>) -> Router {
        app(AppState::new(
            AllowList::parse(allowed),
            Delivery::WhatsApp(session),
        ))
    }

    async fn post_json(app: Router, body: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/send-message")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    // ========================================================================
    // Tests
    // ========================================================================

    #[tokio::test]
    async fn test_root_returns_liveness_text() {
        let app = whatsapp_app("Team A", MockSession::with_chats(vec![]));
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"WhatsApp group relay is running!");
    }

    #[tokio::test]
    async fn test_sends_to_allowed_group() {
        let session = MockSession::with_chats(team_a_chats());
        let app = whatsapp_app("Team A", session.clone());

        let (status, body) = post_json(app, r#"{"groupName":"Team A","message":"hi"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "Message sent successfully.");
        assert_eq!(session.sent(), vec![("123@g.us".to_string(), "hi".to_string())]);
    }

    #[tokio::test]
    async fn test_missing_fields_is_bad_request() {
        let bodies = [
            r#"{"message":"hi"}"#,
            r#"{"groupName":"Team A"}"#,
            r#"{"groupName":"","message":"hi"}"#,
            r#"{"groupName":"Team A","message":""}"#,
            r#"{"groupName":null,"message":"hi"}"#,
            r#"{"groupName":"Team A","message":123}"#,
            r#"{"groupName":["Team A"],"message":"hi"}"#,
            r#"{}"#,
            "",
            "not json",
        ];

        for raw in bodies {
            let session = MockSession::with_chats(team_a_chats());
            let (status, body) = post_json(whatsapp_app("Team A", session.clone()), raw).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {raw:?}");
            assert_eq!(body["error"], "Missing groupName or message in request body.");
            assert!(session.sent().is_empty());
        }
    }

    #[tokio::test]
    async fn test_group_not_in_allow_list_is_forbidden() {
        let session = MockSession::with_chats(vec![Chat::group("Team B", "456@g.us")]);
        let app = whatsapp_app("Team A", session.clone());

        let (status, body) = post_json(app, r#"{"groupName":"Team B","message":"hi"}"#).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Forbidden: Group \"Team B\" is not allowed.");
        assert!(session.sent().is_empty());
    }

    #[tokio::test]
    async fn test_empty_allow_list_forbids_everything() {
        let session = MockSession::with_chats(team_a_chats());
        let (status, _) =
            post_json(whatsapp_app("", session), r#"{"groupName":"Team A","message":"hi"}"#).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_allowed_but_absent_group_is_not_found() {
        let session = MockSession::with_chats(vec![Chat::direct("Team A", "999@c.us")]);
        let app = whatsapp_app("Team A", session.clone());

        let (status, body) = post_json(app, r#"{"groupName":"Team A","message":"hi"}"#).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Group \"Team A\" not found.");
        assert!(session.sent().is_empty());
    }

    #[tokio::test]
    async fn test_session_failure_is_internal_error() {
        let session = Arc::new(MockSession {
            chats: team_a_chats(),
            fail_send: true,
            ..Default::default()
        });

        let (status, body) =
            post_json(whatsapp_app("Team A", session), r#"{"groupName":"Team A","message":"hi"}"#)
                .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to send message.");
    }

    #[tokio::test]
    async fn test_chat_listing_failure_is_internal_error() {
        let session = Arc::new(MockSession {
            fail_chats: true,
            ..Default::default()
        });

        let (status, body) =
            post_json(whatsapp_app("Team A", session), r#"{"groupName":"Team A","message":"hi"}"#)
                .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to send message.");
    }

    #[tokio::test]
    async fn test_hangouts_without_url_is_configuration_error() {
        let app = app(AppState::new(
            AllowList::parse("Team A"),
            Delivery::Hangouts(Arc::new(HangoutsWebhook::new(None))),
        ));

        let (status, body) = post_json(app, r#"{"groupName":"Team A","message":"hi"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Hangouts webhook URL is not configured.");
    }

    #[tokio::test]
    async fn test_hangouts_forwards_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(serde_json::json!({"text": "hi"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let app = app(AppState::new(
            AllowList::parse("Team A"),
            Delivery::Hangouts(Arc::new(HangoutsWebhook::new(Some(server.uri())))),
        ));

        let (status, body) = post_json(app, r#"{"groupName":"Team A","message":"hi"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "Message sent successfully.");
    }

    #[tokio::test]
    async fn test_hangouts_rejection_is_internal_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let app = app(AppState::new(
            AllowList::parse("Team A"),
            Delivery::Hangouts(Arc::new(HangoutsWebhook::new(Some(server.uri())))),
        ));

        let (status, body) = post_json(app, r#"{"groupName":"Team A","message":"hi"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to forward message to Hangouts.");
    }

    #[tokio::test]
    async fn test_both_sends_to_group_then_forwards() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(serde_json::json!({"text": "hi"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let session = MockSession::with_chats(team_a_chats());
        let app = app(AppState::new(
            AllowList::parse("Team A"),
            Delivery::Both {
                session: session.clone(),
                hangouts: Arc::new(HangoutsWebhook::new(Some(server.uri()))),
            },
        ));

        let (status, _) = post_json(app, r#"{"groupName":"Team A","message":"hi"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(session.sent(), vec![("123@g.us".to_string(), "hi".to_string())]);
    }

    #[tokio::test]
    async fn test_both_skips_forward_when_group_missing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let app = app(AppState::new(
            AllowList::parse("Team A"),
            Delivery::Both {
                session: MockSession::with_chats(vec![]),
                hangouts: Arc::new(HangoutsWebhook::new(Some(server.uri()))),
            },
        ));

        let (status, _) = post_json(app, r#"{"groupName":"Team A","message":"hi"}"#).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
