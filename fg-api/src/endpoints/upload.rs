//! Upload and configure endpoints.
//!
//! These are the wire operations behind the album workflow: per-item media
//! uploads against the v2 API and the configure call that commits them.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use fg_core::config::ApiVersion;
use fg_core::error::{FgError, FgResult};

use crate::client::ApiClient;
use crate::upload::{generate_upload_id, AlbumOps, AlbumWorkflow, UploadItem, UploadKind};

/// Response shape of the upload endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    /// Success/failure discriminant.
    pub status: String,
    /// Upload session id echoed by the server, when present.
    #[serde(default)]
    pub upload_id: Option<String>,
}

impl ApiClient {
    /// Upload a photo under the given upload session id.
    pub async fn upload_photo_file(&self, upload_id: &str, path: &Path) -> FgResult<UploadResponse> {
        let session = self.session().clone();
        self.request("upload/photo/")
            .version(ApiVersion::V2)
            .auth_required(true)
            .post("upload_id", upload_id)
            .post("_csrftoken", session.csrf_token())
            .post("_uuid", session.device_uuid())
            .post("image_compression", r#"{"lib_name":"jt","lib_version":"1.3.0","quality":"87"}"#)
            .file("photo", path, "image/jpeg")?
            .json()
            .await
    }

    /// Upload a video under the given upload session id.
    pub async fn upload_video_file(&self, upload_id: &str, path: &Path) -> FgResult<UploadResponse> {
        let session = self.session().clone();
        self.request("upload/video/")
            .version(ApiVersion::V2)
            .auth_required(true)
            .post("upload_id", upload_id)
            .post("_csrftoken", session.csrf_token())
            .post("_uuid", session.device_uuid())
            .post("media_type", "2")
            .file("video", path, "video/mp4")?
            .json()
            .await
    }

    /// Commit previously uploaded items into a published album.
    ///
    /// Retried by the workflow on the transient failure class; a single call
    /// here performs no retry of its own.
    pub async fn configure_album(
        &self,
        items: &[UploadItem],
        caption: Option<&str>,
    ) -> FgResult<serde_json::Value> {
        let session = self.session().clone();
        let children: Vec<serde_json::Value> = items
            .iter()
            .map(|item| {
                json!({
                    "upload_id": item.upload_id(),
                    "media_type": match item.kind {
                        UploadKind::Photo => 1,
                        UploadKind::Video => 2,
                    },
                    "usertags": item.usertags,
                })
            })
            .collect();

        self.request("media/configure_sidecar/")
            .auth_required(true)
            .sign_post(true)
            .post("client_sidecar_id", generate_upload_id())
            .post("_csrftoken", session.csrf_token())
            .post("_uuid", session.device_uuid())
            .post("caption", caption.unwrap_or_default())
            .post("children_metadata", serde_json::to_string(&children)?)
            .json()
            .await
    }

    /// Upload an album end to end: sequential item uploads, then a
    /// retry-wrapped configure call.
    pub async fn upload_album(
        &self,
        items: Vec<UploadItem>,
        caption: Option<&str>,
    ) -> FgResult<serde_json::Value> {
        let uploader = AlbumUploader::new(self).with_caption(caption);
        AlbumWorkflow::new(items).run(&uploader).await
    }
}

/// Production [`AlbumOps`] implementation backed by an [`ApiClient`].
pub struct AlbumUploader<'a> {
    client: &'a ApiClient,
    caption: Option<String>,
}

impl<'a> AlbumUploader<'a> {
    /// Wrap a client for album uploads.
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client, caption: None }
    }

    /// Set the album caption sent with the configure call.
    pub fn with_caption(mut self, caption: Option<&str>) -> Self {
        self.caption = caption.map(str::to_string);
        self
    }
}

#[async_trait]
impl AlbumOps for AlbumUploader<'_> {
    async fn upload_photo(&self, upload_id: &str, item: &UploadItem) -> FgResult<()> {
        self.client.upload_photo_file(upload_id, &item.path).await?;
        Ok(())
    }

    async fn upload_video(&self, upload_id: &str, item: &UploadItem) -> FgResult<()> {
        self.client.upload_video_file(upload_id, &item.path).await?;
        Ok(())
    }

    async fn upload_video_thumbnail(&self, upload_id: &str, item: &UploadItem) -> FgResult<()> {
        let thumbnail = item.thumbnail.as_deref().ok_or_else(|| {
            FgError::Usage(format!("video item has no thumbnail: {}", item.path.display()))
        })?;
        self.client.upload_photo_file(upload_id, thumbnail).await?;
        Ok(())
    }

    async fn configure_album(&self, items: &[UploadItem]) -> FgResult<serde_json::Value> {
        self.client.configure_album(items, self.caption.as_deref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySession;
    use crate::transport::{RawResponse, Transport, WireBody, WireRequest};
    use fg_core::config::ClientConfig;
    use fg_core::constants;
    use std::sync::{Arc, Mutex};

    /// Transport that answers upload endpoints with ok and configure with a
    /// scripted sequence of payloads.
    struct ScriptedTransport {
        requests: Mutex<Vec<(String, bool)>>,
        configure_responses: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(configure_responses: Vec<&str>) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                configure_responses: Mutex::new(
                    configure_responses.iter().rev().map(|s| s.to_string()).collect(),
                ),
            })
        }

        fn urls(&self) -> Vec<String> {
            self.requests.lock().unwrap().iter().map(|(u, _)| u.clone()).collect()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn execute(&self, request: WireRequest) -> FgResult<RawResponse> {
            let multipart = matches!(request.body, Some(WireBody::Multipart(_)));
            self.requests.lock().unwrap().push((request.url.clone(), multipart));

            let body = if request.url.contains("configure_sidecar") {
                self.configure_responses
                    .lock()
                    .unwrap()
                    .pop()
                    .unwrap_or_else(|| r#"{"status":"ok"}"#.to_string())
            } else {
                r#"{"status":"ok","upload_id":"171"}"#.to_string()
            };
            Ok(RawResponse {
                status: 200,
                headers: vec![],
                body: body.into_bytes(),
            })
        }
    }

    fn client(transport: Arc<ScriptedTransport>) -> ApiClient {
        ApiClient::new(
            ClientConfig::default(),
            Arc::new(MemorySession::logged_in("csrf-token")),
        )
        .unwrap()
        .with_transport(transport)
    }

    #[tokio::test]
    async fn test_upload_photo_targets_v2_multipart() {
        let transport = ScriptedTransport::new(vec![]);
        let tmp = tempfile::NamedTempFile::new().unwrap();

        let resp = client(transport.clone())
            .upload_photo_file("171", tmp.path())
            .await
            .unwrap();
        assert_eq!(resp.status, "ok");
        assert_eq!(resp.upload_id.as_deref(), Some("171"));

        let requests = transport.requests.lock().unwrap();
        let (url, multipart) = &requests[0];
        assert!(url.starts_with(constants::API_BASE_V2));
        assert!(url.contains("upload/photo/"));
        assert!(multipart);
    }

    #[tokio::test]
    async fn test_album_end_to_end() {
        let transport = ScriptedTransport::new(vec![r#"{"status":"ok","media":{"pk":1}}"#]);
        let photo_a = tempfile::NamedTempFile::new().unwrap();
        let photo_b = tempfile::NamedTempFile::new().unwrap();
        let items = vec![
            UploadItem::photo(photo_a.path()),
            UploadItem::photo(photo_b.path()),
        ];

        let result = client(transport.clone())
            .upload_album(items, Some("two photos"))
            .await
            .unwrap();
        assert_eq!(result["media"]["pk"], 1);

        let urls = transport.urls();
        assert_eq!(urls.len(), 3);
        assert!(urls[0].contains("upload/photo/"));
        assert!(urls[1].contains("upload/photo/"));
        assert!(urls[2].contains("configure_sidecar"));
    }

    #[tokio::test]
    async fn test_album_configure_retries_through_client() {
        let transient =
            r#"{"status":"fail","message":"Transcode not finished yet.","error_type":"transcode_not_finished"}"#;
        let transport = ScriptedTransport::new(vec![transient, r#"{"status":"ok"}"#]);
        let photo_a = tempfile::NamedTempFile::new().unwrap();
        let photo_b = tempfile::NamedTempFile::new().unwrap();
        let items = vec![
            UploadItem::photo(photo_a.path()),
            UploadItem::photo(photo_b.path()),
        ];

        let api = client(transport.clone());
        let uploader = AlbumUploader::new(&api);
        let mut workflow = AlbumWorkflow::new(items)
            .with_finalize_delay(std::time::Duration::ZERO);
        workflow.run(&uploader).await.unwrap();

        let configure_calls = transport
            .urls()
            .iter()
            .filter(|u| u.contains("configure_sidecar"))
            .count();
        assert_eq!(configure_calls, 2);
    }
}
