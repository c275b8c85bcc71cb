//! Album upload workflow.
//!
//! Publishing an album is a multi-step protocol: every item is uploaded
//! sequentially (videos additionally upload a derived thumbnail keyed to the
//! video's upload session id), then one configure call commits the album.
//! The configure call is the only retried step, and only for the transient
//! failure class ("not ready yet" responses and timeouts).
//!
//! Later steps depend on identifiers produced by earlier ones, so the
//! sequential ordering is a correctness constraint, not a performance choice.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};

use fg_core::constants;
use fg_core::error::{FgError, FgResult};

/// Media type of an album item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadKind {
    /// Single-image item: one upload call.
    Photo,
    /// Video item: upload call plus thumbnail upload keyed to the same id.
    Video,
}

/// A user tagged at a position within a photo.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Usertag {
    /// Tagged account id.
    pub user_id: i64,
    /// Normalized (x, y) position within the frame.
    pub position: (f32, f32),
}

/// One item in an album upload.
///
/// The upload session id is assigned by the workflow when the item's upload
/// step runs and is carried into the configure call.
#[derive(Debug, Clone)]
pub struct UploadItem {
    /// Media type.
    pub kind: UploadKind,
    /// Source file path.
    pub path: PathBuf,
    /// Thumbnail image path. Required for videos, invalid on photos.
    pub thumbnail: Option<PathBuf>,
    /// Tagged users. Only valid on photos; rejected on videos up front.
    pub usertags: Vec<Usertag>,
    upload_id: Option<String>,
}

impl UploadItem {
    /// A photo item.
    pub fn photo(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: UploadKind::Photo,
            path: path.into(),
            thumbnail: None,
            usertags: Vec::new(),
            upload_id: None,
        }
    }

    /// A video item. A thumbnail must be attached before the workflow runs.
    pub fn video(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: UploadKind::Video,
            path: path.into(),
            thumbnail: None,
            usertags: Vec::new(),
            upload_id: None,
        }
    }

    /// Attach the video's thumbnail image.
    pub fn with_thumbnail(mut self, path: impl Into<PathBuf>) -> Self {
        self.thumbnail = Some(path.into());
        self
    }

    /// Attach usertags to this item.
    pub fn with_usertags(mut self, usertags: Vec<Usertag>) -> Self {
        self.usertags = usertags;
        self
    }

    /// The upload session id assigned during the upload phase, if any.
    pub fn upload_id(&self) -> Option<&str> {
        self.upload_id.as_deref()
    }
}

/// Client-side upload session id: unix milliseconds, matching the app.
pub fn generate_upload_id() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}

/// The per-item upload and finalize operations the workflow drives.
///
/// Implemented for [`crate::ApiClient`] by the endpoint layer; tests provide
/// recording mocks.
#[async_trait]
pub trait AlbumOps: Send + Sync {
    /// Upload a photo under the given upload session id.
    async fn upload_photo(&self, upload_id: &str, item: &UploadItem) -> FgResult<()>;

    /// Upload a video under the given upload session id.
    async fn upload_video(&self, upload_id: &str, item: &UploadItem) -> FgResult<()>;

    /// Upload the video's derived thumbnail under the video's session id.
    async fn upload_video_thumbnail(&self, upload_id: &str, item: &UploadItem) -> FgResult<()>;

    /// Commit all uploaded items into a published album.
    async fn configure_album(&self, items: &[UploadItem]) -> FgResult<serde_json::Value>;
}

/// Workflow states. No state is re-entrant; the workflow is single-shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    /// Items are being validated; no network has happened yet.
    Validating,
    /// Per-item uploads in progress.
    Uploading,
    /// Configure call in progress (with bounded retry).
    Finalizing,
    /// Configure succeeded.
    Done,
    /// Validation, an upload step, or the retry budget failed.
    Failed,
}

/// Single-shot album upload state machine.
pub struct AlbumWorkflow {
    items: Vec<UploadItem>,
    state: WorkflowState,
    max_finalize_retries: u32,
    finalize_retry_delay: Duration,
}

impl AlbumWorkflow {
    /// Create a workflow over the given items.
    pub fn new(items: Vec<UploadItem>) -> Self {
        Self {
            items,
            state: WorkflowState::Validating,
            max_finalize_retries: constants::CONFIGURE_MAX_RETRIES,
            finalize_retry_delay: Duration::from_millis(constants::CONFIGURE_RETRY_DELAY_MS),
        }
    }

    /// Override the finalize retry budget.
    pub fn with_finalize_retries(mut self, retries: u32) -> Self {
        self.max_finalize_retries = retries;
        self
    }

    /// Override the delay between finalize retries.
    pub fn with_finalize_delay(mut self, delay: Duration) -> Self {
        self.finalize_retry_delay = delay;
        self
    }

    /// Current workflow state.
    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// The items, including upload ids assigned so far.
    pub fn items(&self) -> &[UploadItem] {
        &self.items
    }

    /// Inspect all items before any network call.
    ///
    /// Rejects the whole workflow on an out-of-bounds item count, a missing
    /// source file, or usertags on a non-photo item.
    fn validate(&self) -> FgResult<()> {
        let count = self.items.len();
        if !(constants::ALBUM_MIN_ITEMS..=constants::ALBUM_MAX_ITEMS).contains(&count) {
            return Err(FgError::Usage(format!(
                "album must contain {} to {} items, got {count}",
                constants::ALBUM_MIN_ITEMS,
                constants::ALBUM_MAX_ITEMS
            )));
        }
        for item in &self.items {
            if !item.path.is_file() {
                return Err(FgError::Usage(format!(
                    "item source is not a readable file: {}",
                    item.path.display()
                )));
            }
            if item.kind != UploadKind::Photo && !item.usertags.is_empty() {
                return Err(FgError::Usage(format!(
                    "usertags are only valid on photos: {}",
                    item.path.display()
                )));
            }
            match (item.kind, &item.thumbnail) {
                (UploadKind::Video, None) => {
                    return Err(FgError::Usage(format!(
                        "video items require a thumbnail: {}",
                        item.path.display()
                    )));
                }
                (UploadKind::Video, Some(thumb)) if !thumb.is_file() => {
                    return Err(FgError::Usage(format!(
                        "thumbnail is not a readable file: {}",
                        thumb.display()
                    )));
                }
                (UploadKind::Photo, Some(_)) => {
                    return Err(FgError::Usage(format!(
                        "thumbnails are only valid on videos: {}",
                        item.path.display()
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Run the workflow to completion.
    ///
    /// Uploads run strictly sequentially in list order; any upload failure
    /// aborts the workflow with no partial commit. The configure call is
    /// retried on transient failures up to the retry budget.
    pub async fn run(&mut self, ops: &dyn AlbumOps) -> FgResult<serde_json::Value> {
        if self.state != WorkflowState::Validating {
            return Err(FgError::Usage("workflow already run".into()));
        }
        match self.run_phases(ops).await {
            Ok(result) => {
                self.state = WorkflowState::Done;
                info!("album upload complete ({} items)", self.items.len());
                Ok(result)
            }
            Err(e) => {
                self.state = WorkflowState::Failed;
                Err(e)
            }
        }
    }

    async fn run_phases(&mut self, ops: &dyn AlbumOps) -> FgResult<serde_json::Value> {
        self.validate()?;

        self.state = WorkflowState::Uploading;
        for item in self.items.iter_mut() {
            let upload_id = generate_upload_id();
            debug!("uploading {:?} item {} as {upload_id}", item.kind, item.path.display());
            match item.kind {
                UploadKind::Photo => ops.upload_photo(&upload_id, item).await?,
                UploadKind::Video => {
                    ops.upload_video(&upload_id, item).await?;
                    ops.upload_video_thumbnail(&upload_id, item).await?;
                }
            }
            item.upload_id = Some(upload_id);
        }

        self.state = WorkflowState::Finalizing;
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match ops.configure_album(&self.items).await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_transient() => {
                    if attempts > self.max_finalize_retries {
                        return Err(FgError::RetriesExhausted { attempts });
                    }
                    warn!(
                        "transient configure failure (attempt {attempts}/{}): {e}; retrying",
                        self.max_finalize_retries + 1
                    );
                    tokio::time::sleep(self.finalize_retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
