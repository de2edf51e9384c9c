//! # Document service API client
//!
//! HTTP client for the document Q&A backend: multipart PDF uploads with
//! byte-level progress reporting, plus the credentialed auth endpoints that
//! stay dormant while the product runs in guest-only mode.
//!
//! ## Example
//!
//! ```no_run
//! use docqa_api::{Client, ClientConfig, FnProgress, UploadFile};
//! use docqa_api::api::UploadApi;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("http://localhost:5041/api/uploads")?;
//!     let client = Client::new(config)?;
//!
//!     let files = vec![UploadFile::from_path("report.pdf", "application/pdf")];
//!     let progress = FnProgress(|p: docqa_api::ByteProgress| {
//!         println!("{}/{}", p.loaded, p.total);
//!     });
//!
//!     let response = client.upload_files(files, None, Arc::new(progress)).await?;
//!     println!("real-time progress: {}", response.supports_progress);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod models;
pub mod multipart;
pub mod progress;

pub use client::{Client, ClientConfig, CONNECTION_ID_HEADER};
pub use error::{ApiError, ApiResult};
pub use models::upload::UploadResponse;
pub use multipart::{PartStream, UploadData, UploadFile};
pub use progress::{ByteProgress, FnProgress, NoOpProgress, ProgressCallback};
