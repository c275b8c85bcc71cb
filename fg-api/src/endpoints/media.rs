//! Media action endpoints.

use fg_core::error::FgResult;

use crate::client::ApiClient;
use crate::response::StatusResponse;

impl ApiClient {
    /// Like a media item.
    pub async fn like_media(&self, media_id: &str) -> FgResult<StatusResponse> {
        self.media_action(media_id, "like").await
    }

    /// Remove a like from a media item.
    pub async fn unlike_media(&self, media_id: &str) -> FgResult<StatusResponse> {
        self.media_action(media_id, "unlike").await
    }

    /// Delete a media item.
    pub async fn delete_media(&self, media_id: &str) -> FgResult<StatusResponse> {
        self.media_action(media_id, "delete").await
    }

    async fn media_action(&self, media_id: &str, action: &str) -> FgResult<StatusResponse> {
        let session = self.session().clone();
        self.request(&format!("media/{media_id}/{action}/"))
            .auth_required(true)
            .sign_post(true)
            .post("media_id", media_id)
            .post("_csrftoken", session.csrf_token())
            .post("_uuid", session.device_uuid())
            .json()
            .await
    }

    /// Fetch a media item's info payload.
    pub async fn media_info(&self, media_id: &str) -> FgResult<serde_json::Value> {
        self.request(&format!("media/{media_id}/info/"))
            .auth_required(true)
            .json()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySession;
    use crate::transport::{RawResponse, Transport, WireBody, WireRequest};
    use async_trait::async_trait;
    use fg_core::config::ClientConfig;
    use fg_core::error::FgError;
    use std::sync::{Arc, Mutex};

    struct RecordingTransport {
        urls: Mutex<Vec<String>>,
        bodies: Mutex<Vec<String>>,
        response: String,
    }

    impl RecordingTransport {
        fn new(response: &str) -> Arc<Self> {
            Arc::new(Self {
                urls: Mutex::new(Vec::new()),
                bodies: Mutex::new(Vec::new()),
                response: response.to_string(),
            })
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn execute(&self, request: WireRequest) -> FgResult<RawResponse> {
            self.urls.lock().unwrap().push(request.url);
            if let Some(WireBody::Bytes { payload, .. }) = request.body {
                self.bodies
                    .lock()
                    .unwrap()
                    .push(String::from_utf8_lossy(&payload).into_owned());
            }
            Ok(RawResponse {
                status: 200,
                headers: vec![],
                body: self.response.clone().into_bytes(),
            })
        }
    }

    fn client(transport: Arc<RecordingTransport>) -> ApiClient {
        ApiClient::new(
            ClientConfig::default(),
            Arc::new(MemorySession::logged_in("csrf-token")),
        )
        .unwrap()
        .with_transport(transport)
    }

    #[tokio::test]
    async fn test_like_media_posts_session_fields() {
        let transport = RecordingTransport::new(r#"{"status":"ok"}"#);
        let resp = client(transport.clone()).like_media("12345_678").await.unwrap();
        assert!(resp.is_ok());

        let url = transport.urls.lock().unwrap()[0].clone();
        assert!(url.contains("media/12345_678/like/"));

        let body = transport.bodies.lock().unwrap()[0].clone();
        assert!(body.contains("_csrftoken=csrf-token"));
        assert!(body.contains("media_id=12345_678"));
    }

    #[tokio::test]
    async fn test_media_action_requires_auth() {
        let transport = RecordingTransport::new(r#"{"status":"ok"}"#);
        let client = ApiClient::new(ClientConfig::default(), Arc::new(MemorySession::new()))
            .unwrap()
            .with_transport(transport.clone());

        let err = client.like_media("1").await.unwrap_err();
        assert!(matches!(err, FgError::AuthRequired));
        assert!(transport.urls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_api_failure_surfaces_code() {
        let transport = RecordingTransport::new(
            r#"{"status":"fail","message":"media not found","error_type":"not_found"}"#,
        );
        let err = client(transport).media_info("999").await.unwrap_err();
        assert!(matches!(err, FgError::Api { ref code, .. } if code == "not_found"));
    }
}
