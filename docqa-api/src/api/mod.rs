pub mod auth;
pub mod upload;

// Re-export for convenience
pub use auth::AuthApi;
pub use upload::UploadApi;
