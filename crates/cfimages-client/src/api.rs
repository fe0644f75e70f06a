//! Domain methods for the upload client.
//!
//! Request and response shapes live in `cfimages_core::models`; this module
//! only maps HTTP outcomes onto the upload error taxonomy.

use async_trait::async_trait;
use cfimages_core::{
    AssetId, DirectUploadResponse, SelectedFile, UploadError, UploadTarget, UploadTargetRequest,
};
use reqwest::multipart::{Form, Part};

use crate::transport::UploadTransport;
use crate::{describe_failure, ApiClient};

impl ApiClient {
    /// POST the upload-target request to the backend.
    pub async fn get_upload_url(
        &self,
        request: &UploadTargetRequest,
    ) -> Result<UploadTarget, UploadError> {
        let url = self.upload_url_endpoint();
        let http_request = self.client().post(&url).json(request);
        let http_request = self.apply_credential(http_request);

        tracing::debug!(url = %url, "Requesting upload URL");

        let response = http_request
            .send()
            .await
            .map_err(|e| UploadError::BackendUnavailable(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(UploadError::BackendUnavailable(
                describe_failure(response).await,
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| UploadError::BackendUnavailable(format!("failed to read body: {}", e)))?;

        let target: UploadTarget = serde_json::from_slice(&body).map_err(|e| {
            UploadError::MalformedResponse(format!("invalid upload-url response: {}", e))
        })?;

        if target.upload_url.is_empty() {
            return Err(UploadError::MalformedResponse(
                "upload-url response has an empty uploadURL".to_string(),
            ));
        }

        Ok(target)
    }

    /// POST the file as multipart field `file` to a one-time upload URL.
    ///
    /// No credential is attached: the target URL itself authorises the upload.
    pub async fn direct_upload(
        &self,
        target: &UploadTarget,
        file: &SelectedFile,
    ) -> Result<AssetId, UploadError> {
        let form = Form::new().part("file", file_part(file));

        tracing::debug!(
            file_name = %file.file_name,
            size = file.size(),
            "Submitting file to image host"
        );

        let response = self
            .client()
            .post(&target.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::UploadRejected(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(UploadError::UploadRejected(describe_failure(response).await));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| UploadError::UploadRejected(format!("failed to read body: {}", e)))?;

        let parsed: DirectUploadResponse = serde_json::from_slice(&body).map_err(|e| {
            UploadError::MalformedResponse(format!("invalid direct-upload response: {}", e))
        })?;

        parsed.asset_id()
    }
}

fn file_part(file: &SelectedFile) -> Part {
    let part = Part::stream_with_length(file.data.clone(), file.size())
        .file_name(file.file_name.clone());
    if file.media_type.is_empty() {
        return part;
    }
    // An unparseable declared type is sent without a part content type.
    match part.mime_str(&file.media_type) {
        Ok(part) => part,
        Err(_) => Part::stream_with_length(file.data.clone(), file.size())
            .file_name(file.file_name.clone()),
    }
}

#[async_trait]
impl UploadTransport for ApiClient {
    async fn request_upload_target(
        &self,
        request: &UploadTargetRequest,
    ) -> Result<UploadTarget, UploadError> {
        self.get_upload_url(request).await
    }

    async fn submit_file(
        &self,
        target: &UploadTarget,
        file: &SelectedFile,
    ) -> Result<AssetId, UploadError> {
        self.direct_upload(target, file).await
    }
}
