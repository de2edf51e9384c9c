use crate::client::{read_json, Client, RequestOptions, CONNECTION_ID_HEADER};
use crate::error::ApiResult;
use crate::models::upload::UploadResponse;
use crate::multipart::{build_form, UploadFile};
use crate::progress::{ProgressCallback, ProgressTracker};
use async_trait::async_trait;
use std::sync::Arc;

/// Document upload API methods
#[async_trait]
pub trait UploadApi {
    /// Upload a batch of files as one multipart request.
    ///
    /// `connection_id` is sent as the correlation header (empty when the
    /// push channel is down). `progress` fires with byte counts whenever the
    /// batch size is known.
    async fn upload_files(
        &self,
        files: Vec<UploadFile>,
        connection_id: Option<&str>,
        progress: Arc<dyn ProgressCallback>,
    ) -> ApiResult<UploadResponse>;
}

#[async_trait]
impl UploadApi for Client {
    async fn upload_files(
        &self,
        files: Vec<UploadFile>,
        connection_id: Option<&str>,
        progress: Arc<dyn ProgressCallback>,
    ) -> ApiResult<UploadResponse> {
        let url = self.config().upload_url.clone();
        let file_count = files.len();

        let form = build_form(files, |total| Arc::new(ProgressTracker::new(total, progress)))
            .await?;

        tracing::info!(
            target: "api::upload",
            url = %url,
            files = file_count,
            connection_id = connection_id.unwrap_or(""),
            "Starting upload"
        );

        let request = self
            .http()
            .post(url)
            .header(CONNECTION_ID_HEADER, connection_id.unwrap_or(""))
            .multipart(form);
        let request = self.authorize(request, RequestOptions::new()).await;

        let response = request.send().await?;
        let body: UploadResponse = read_json(response).await?;

        tracing::info!(
            target: "api::upload",
            supports_progress = body.supports_progress,
            message = ?body.message,
            "Upload finished"
        );

        Ok(body)
    }
}
