//! Network seam between the upload orchestrator and the outside world.

use async_trait::async_trait;
use cfimages_core::{AssetId, SelectedFile, UploadError, UploadTarget, UploadTargetRequest};

/// The two remote calls of an upload attempt.
///
/// Implementations map their own failures onto the upload taxonomy:
/// `request_upload_target` fails with `BackendUnavailable` or
/// `MalformedResponse`, `submit_file` with `UploadRejected` or
/// `MalformedResponse`.
#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// Ask the backend for a one-time upload target.
    async fn request_upload_target(
        &self,
        request: &UploadTargetRequest,
    ) -> Result<UploadTarget, UploadError>;

    /// Post the file to the upload target and return the issued asset id.
    async fn submit_file(
        &self,
        target: &UploadTarget,
        file: &SelectedFile,
    ) -> Result<AssetId, UploadError>;
}
