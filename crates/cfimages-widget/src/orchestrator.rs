//! Upload orchestrator
//!
//! Runs one upload attempt for one field:
//!
//! 1. validate the selected file (no network I/O on rejection)
//! 2. enter the uploading state
//! 3. request an upload target from the backend
//! 4. post the file to that target
//! 5. read the asset identifier from the host's response
//! 6. commit the identifier and render its preview
//!
//! A failure at 3-5 is reported and leaves the field's value untouched. Every
//! attempt ends with the binding idle. Nothing is retried.

use cfimages_client::UploadTransport;
use cfimages_core::{
    validate, AssetId, ErrorMetadata, LogLevel, SelectedFile, UploadConfiguration, UploadError,
    UploadOutcome, UploadTargetRequest,
};

use crate::binding::{BindingSurface, FieldBinding};
use crate::ui_state::UploadingGuard;

/// Drives upload attempts through a transport. One orchestrator can serve any
/// number of bindings; each attempt borrows its binding exclusively.
#[derive(Debug, Clone)]
pub struct UploadOrchestrator<T> {
    transport: T,
}

impl<T: UploadTransport> UploadOrchestrator<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Initialise a freshly attached binding: preview a pre-populated value.
    ///
    /// Makes no network call.
    pub fn attach<S: BindingSurface>(&self, binding: &mut FieldBinding<S>) -> Option<AssetId> {
        let id = binding.value()?;
        tracing::debug!(
            field = %binding.ids().field_id,
            asset_id = %id,
            "Rendering preview for existing value"
        );
        binding.render_preview()
    }

    /// Run a single upload attempt for `file` on `binding`.
    pub async fn upload<S: BindingSurface>(
        &self,
        file: &SelectedFile,
        binding: &mut FieldBinding<S>,
        config: &UploadConfiguration,
    ) -> UploadOutcome {
        if let Err(err) = validate(file, config) {
            let err = UploadError::from(err);
            log_failure(&binding.ids().field_id, &err);
            binding.surface_mut().notify(&err.client_message());
            return Err(err);
        }

        tracing::info!(
            field = %binding.ids().field_id,
            file_name = %file.file_name,
            size = file.size(),
            media_type = %file.media_type,
            "Starting upload"
        );

        let mut busy = UploadingGuard::enter(binding);
        let outcome = self.transfer(file, config).await;

        match &outcome {
            Ok(id) => {
                busy.commit(id);
                tracing::info!(field = %busy.ids().field_id, asset_id = %id, "Upload complete");
            }
            Err(err) => {
                log_failure(&busy.ids().field_id, err);
                busy.surface_mut()
                    .notify(&format!("Upload failed: {}", err.client_message()));
                // The surviving value gets its preview back.
                busy.render_preview();
            }
        }

        outcome
    }

    async fn transfer(
        &self,
        file: &SelectedFile,
        config: &UploadConfiguration,
    ) -> Result<AssetId, UploadError> {
        let request = UploadTargetRequest {
            metadata: config.metadata().clone(),
            require_signed_urls: config.require_signed_urls(),
            variants: config.variants().to_vec(),
        };

        let target = self.transport.request_upload_target(&request).await?;
        tracing::debug!(session_id = ?target.id, "Received upload target");

        self.transport.submit_file(&target, file).await
    }
}

fn log_failure(field: &str, err: &UploadError) {
    let code = err.error_code();
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(field = %field, code, error = %err, "Upload not started"),
        LogLevel::Warn => tracing::warn!(field = %field, code, error = %err, "Upload failed"),
        LogLevel::Error => tracing::error!(field = %field, code, error = %err, "Upload failed"),
    }
}
