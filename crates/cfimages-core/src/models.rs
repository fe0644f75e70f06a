//! Data model for a single field upload.
//!
//! Wire shapes match the backend upload-url endpoint and the Cloudflare
//! Images direct-upload API.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::UploadError;

/// Path prefix for preview thumbnails served by the backend.
pub const PREVIEW_PATH_PREFIX: &str = "/cloudflare-images/image/";

/// Path suffix for preview thumbnails served by the backend.
pub const PREVIEW_PATH_SUFFIX: &str = "/thumbnail/";

/// Default backend path that issues one-time upload URLs.
pub const UPLOAD_URL_PATH: &str = "/cloudflare-images/get-upload-url/";

/// Opaque identifier issued by the remote image host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    /// Returns `None` for an empty identifier; the remote host never issues one.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Preview `src` for this asset.
    pub fn preview_path(&self) -> String {
        preview_path(&self.0)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build the preview thumbnail path for an asset identifier.
///
/// The identifier is percent-encoded so that it always occupies exactly one
/// path segment.
pub fn preview_path(id: &str) -> String {
    format!(
        "{}{}{}",
        PREVIEW_PATH_PREFIX,
        urlencoding::encode(id),
        PREVIEW_PATH_SUFFIX
    )
}

/// A file chosen in the picker, ready to be validated and submitted.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    /// Original filename, sent as the multipart part filename
    pub file_name: String,
    /// Declared media type (e.g. "image/png")
    pub media_type: String,
    /// File contents
    pub data: Bytes,
}

impl SelectedFile {
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            data: data.into(),
        }
    }

    /// Size in bytes
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// The part of the declared media type after the first `/`, if any.
    pub fn subtype(&self) -> Option<&str> {
        self.media_type.split('/').nth(1)
    }
}

/// JSON body sent to the backend upload-url endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct UploadTargetRequest {
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub require_signed_urls: bool,
    /// Only sent when non-empty; backends that predate it see the original body.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<String>,
}

/// Upload target descriptor issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadTarget {
    /// One-time URL authorising a single direct upload
    #[serde(rename = "uploadURL")]
    pub upload_url: String,
    /// Upload session / image identifier reserved by the backend, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Direct-upload response from the remote image host.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectUploadResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
    #[serde(default)]
    pub result: Option<DirectUploadResult>,
}

/// Nested `result` object of a direct-upload response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectUploadResult {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub uploaded: Option<String>,
    #[serde(default, rename = "requireSignedURLs")]
    pub require_signed_urls: Option<bool>,
    #[serde(default)]
    pub variants: Vec<String>,
}

impl DirectUploadResponse {
    /// Extract `result.id`; its absence is a protocol error.
    pub fn asset_id(self) -> Result<AssetId, UploadError> {
        self.result
            .and_then(|result| result.id)
            .and_then(AssetId::new)
            .ok_or_else(|| {
                UploadError::MalformedResponse("response has no result.id".to_string())
            })
    }
}

/// Result of one upload attempt.
pub type UploadOutcome = Result<AssetId, UploadError>;
