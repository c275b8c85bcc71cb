//! Fotogram API - request construction and execution engine for the
//! reverse-engineered fotogram mobile API.
//!
//! The server silently rejects requests whose form fields are not serialized
//! in its expected deterministic order, whose POST bodies are not signed, or
//! whose encoding does not match the attachment set. This crate reproduces
//! that pipeline exactly: hash-ordered fields, injected signing, automatic
//! urlencoded/multipart selection, one-shot execution with a cached response,
//! typed response mapping, and the retry-wrapped album upload workflow.

pub mod body;
pub mod client;
pub mod endpoints;
pub mod ordering;
pub mod request;
pub mod response;
pub mod session;
pub mod sign;
pub mod transport;
pub mod upload;

// Re-export key types
pub use body::{EncodedBody, FileAttachment};
pub use client::ApiClient;
pub use endpoints::AlbumUploader;
pub use request::RequestBuilder;
pub use response::{map_response, StatusResponse};
pub use session::{MemorySession, SessionState};
pub use sign::{PassthroughSigner, Signer};
pub use transport::{HttpTransport, RawResponse, Transport, WireBody, WireRequest};
pub use upload::{AlbumOps, AlbumWorkflow, UploadItem, UploadKind, Usertag, WorkflowState};
