//! API endpoint modules organized by category.
//!
//! Each module provides typed methods for a group of related server
//! endpoints, built on the core request engine.

pub mod media;
pub mod upload;

pub use upload::AlbumUploader;
