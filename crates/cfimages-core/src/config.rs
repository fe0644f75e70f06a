//! Configuration module
//!
//! `UploadConfiguration` is the per-widget set of upload constraints handed over
//! by the host form system. `ClientConfig` carries the settings of a process that
//! drives uploads itself (the CLI), loaded from the environment.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::env;
use std::fmt;

use crate::models::UPLOAD_URL_PATH;

/// Formats accepted when the host does not configure any.
pub const DEFAULT_ALLOWED_FORMATS: &[&str] = &["jpeg", "png", "gif", "webp"];

const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
const HTTP_TIMEOUT_SECS: u64 = 60;

/// Upload constraints for one widget. Read-only once built.
///
/// Every field is optional on the wire. An absent, null or empty
/// `allowed_formats` falls back to [`DEFAULT_ALLOWED_FORMATS`]. A zero
/// `max_file_size` means no limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfiguration {
    variants: Vec<String>,
    metadata: serde_json::Map<String, serde_json::Value>,
    require_signed_urls: bool,
    #[serde(deserialize_with = "deserialize_max_file_size")]
    max_file_size: Option<u64>,
    #[serde(deserialize_with = "deserialize_formats")]
    allowed_formats: BTreeSet<String>,
}

impl Default for UploadConfiguration {
    fn default() -> Self {
        Self {
            variants: Vec::new(),
            metadata: serde_json::Map::new(),
            require_signed_urls: false,
            max_file_size: None,
            allowed_formats: normalize_formats(DEFAULT_ALLOWED_FORMATS.iter().copied()),
        }
    }
}

fn normalize_formats<I, S>(formats: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let formats: BTreeSet<String> = formats
        .into_iter()
        .map(|f| f.as_ref().trim().to_lowercase())
        .filter(|f| !f.is_empty())
        .collect();
    if formats.is_empty() {
        normalize_formats(DEFAULT_ALLOWED_FORMATS.iter().copied())
    } else {
        formats
    }
}

fn deserialize_formats<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let formats = Option::<Vec<String>>::deserialize(deserializer)?;
    Ok(normalize_formats(formats.unwrap_or_default()))
}

fn deserialize_max_file_size<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let max = Option::<u64>::deserialize(deserializer)?;
    Ok(max.filter(|&max| max > 0))
}

impl UploadConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variants<I, S>(mut self, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variants = variants.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Map<String, serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_require_signed_urls(mut self, require_signed_urls: bool) -> Self {
        self.require_signed_urls = require_signed_urls;
        self
    }

    /// Zero is treated as no limit.
    pub fn with_max_file_size(mut self, max_file_size: Option<u64>) -> Self {
        self.max_file_size = max_file_size.filter(|&max| max > 0);
        self
    }

    /// Replace the allowed formats. Names are trimmed and lowercased; an empty
    /// list restores the defaults.
    pub fn with_allowed_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_formats = normalize_formats(formats);
        self
    }

    #[cfg(test)]
    pub(crate) fn without_format_restriction(mut self) -> Self {
        self.allowed_formats.clear();
        self
    }

    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    pub fn metadata(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.metadata
    }

    pub fn require_signed_urls(&self) -> bool {
        self.require_signed_urls
    }

    pub fn max_file_size(&self) -> Option<u64> {
        self.max_file_size
    }

    pub fn allowed_formats(&self) -> &BTreeSet<String> {
        &self.allowed_formats
    }

    /// Parse upload constraints from `CFIMAGES_*` variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = UploadConfiguration::default();

        if let Some(variants) = lookup("CFIMAGES_VARIANTS") {
            config.variants = variants
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(metadata) = lookup("CFIMAGES_METADATA").filter(|s| !s.trim().is_empty()) {
            let value: serde_json::Value = serde_json::from_str(&metadata)
                .map_err(|e| anyhow::anyhow!("CFIMAGES_METADATA must be valid JSON: {}", e))?;
            config.metadata = match value {
                serde_json::Value::Object(map) => map,
                _ => {
                    return Err(anyhow::anyhow!(
                        "CFIMAGES_METADATA must be a JSON object"
                    ))
                }
            };
        }

        config.require_signed_urls = lookup("CFIMAGES_REQUIRE_SIGNED_URLS")
            .map(|s| s.trim().to_lowercase())
            .and_then(|s| s.parse().ok())
            .unwrap_or(false);

        config.max_file_size = match lookup("CFIMAGES_MAX_FILE_SIZE_BYTES") {
            Some(s) if !s.trim().is_empty() => s
                .trim()
                .parse::<u64>()
                .map_err(|_| {
                    anyhow::anyhow!("CFIMAGES_MAX_FILE_SIZE_BYTES must be a valid number")
                })
                .map(|max| Some(max).filter(|&max| max > 0))?,
            _ => None,
        };

        if let Some(formats) = lookup("CFIMAGES_ALLOWED_FORMATS") {
            config.allowed_formats = normalize_formats(formats.split(','));
        }

        Ok(config)
    }
}

/// Settings for a process that talks to the backend and image host directly.
#[derive(Clone)]
pub struct ClientConfig {
    pub backend_url: String,
    pub upload_url_path: String,
    pub csrf_token: Option<String>,
    pub http_timeout_secs: u64,
    pub upload: UploadConfiguration,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("backend_url", &self.backend_url)
            .field("upload_url_path", &self.upload_url_path)
            .field("csrf_token", &self.csrf_token.as_ref().map(|_| "<redacted>"))
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("upload", &self.upload)
            .finish()
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = ClientConfig {
            backend_url: lookup("CFIMAGES_BACKEND_URL")
                .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            upload_url_path: lookup("CFIMAGES_UPLOAD_URL_PATH")
                .unwrap_or_else(|| UPLOAD_URL_PATH.to_string()),
            csrf_token: lookup("CFIMAGES_CSRF_TOKEN").filter(|s| !s.is_empty()),
            http_timeout_secs: lookup("CFIMAGES_HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|| HTTP_TIMEOUT_SECS.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("CFIMAGES_HTTP_TIMEOUT_SECS must be a valid number"))?,
            upload: UploadConfiguration::from_lookup(&lookup)?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.backend_url.starts_with("http://") && !self.backend_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "CFIMAGES_BACKEND_URL must be an http(s) URL"
            ));
        }

        if !self.upload_url_path.starts_with('/') {
            return Err(anyhow::anyhow!(
                "CFIMAGES_UPLOAD_URL_PATH must start with '/'"
            ));
        }

        if self.http_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "CFIMAGES_HTTP_TIMEOUT_SECS must be greater than zero"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_upload_configuration_defaults() {
        let config = UploadConfiguration::default();
        assert!(config.variants().is_empty());
        assert!(config.metadata().is_empty());
        assert!(!config.require_signed_urls());
        assert_eq!(config.max_file_size(), None);
        let formats: Vec<&str> = config.allowed_formats().iter().map(String::as_str).collect();
        assert_eq!(formats, vec!["gif", "jpeg", "png", "webp"]);
    }

    #[test]
    fn test_deserialize_absent_formats_uses_defaults() {
        let config: UploadConfiguration =
            serde_json::from_str(r#"{"max_file_size": 1024}"#).unwrap();
        assert_eq!(config.max_file_size(), Some(1024));
        assert_eq!(config.allowed_formats().len(), DEFAULT_ALLOWED_FORMATS.len());
    }

    #[test]
    fn test_deserialize_empty_or_null_formats_uses_defaults() {
        for body in [r#"{"allowed_formats": []}"#, r#"{"allowed_formats": null}"#] {
            let config: UploadConfiguration = serde_json::from_str(body).unwrap();
            assert_eq!(config, UploadConfiguration::default());
        }
    }

    #[test]
    fn test_empty_formats_builder_uses_defaults() {
        let config = UploadConfiguration::new().with_allowed_formats(Vec::<String>::new());
        assert_eq!(config.allowed_formats().len(), DEFAULT_ALLOWED_FORMATS.len());

        let config = UploadConfiguration::new().with_allowed_formats([" ", ""]);
        assert_eq!(config.allowed_formats().len(), DEFAULT_ALLOWED_FORMATS.len());
    }

    #[test]
    fn test_zero_max_file_size_means_no_limit() {
        assert_eq!(
            UploadConfiguration::new()
                .with_max_file_size(Some(0))
                .max_file_size(),
            None
        );

        let config: UploadConfiguration =
            serde_json::from_str(r#"{"max_file_size": 0}"#).unwrap();
        assert_eq!(config.max_file_size(), None);

        let config: UploadConfiguration =
            serde_json::from_str(r#"{"max_file_size": null}"#).unwrap();
        assert_eq!(config.max_file_size(), None);

        let config = UploadConfiguration::from_lookup(lookup_from(&[(
            "CFIMAGES_MAX_FILE_SIZE_BYTES",
            "0",
        )]))
        .unwrap();
        assert_eq!(config.max_file_size(), None);
    }

    #[test]
    fn test_empty_formats_env_var_uses_defaults() {
        let config = UploadConfiguration::from_lookup(lookup_from(&[(
            "CFIMAGES_ALLOWED_FORMATS",
            "",
        )]))
        .unwrap();
        assert_eq!(config.allowed_formats().len(), DEFAULT_ALLOWED_FORMATS.len());
    }

    #[test]
    fn test_formats_are_normalized() {
        let config = UploadConfiguration::new().with_allowed_formats([" PNG", "Avif ", ""]);
        let formats: Vec<&str> = config.allowed_formats().iter().map(String::as_str).collect();
        assert_eq!(formats, vec!["avif", "png"]);
    }

    #[test]
    fn test_upload_configuration_from_lookup() {
        let config = UploadConfiguration::from_lookup(lookup_from(&[
            ("CFIMAGES_VARIANTS", "thumbnail, public"),
            ("CFIMAGES_METADATA", r#"{"source": "cli"}"#),
            ("CFIMAGES_REQUIRE_SIGNED_URLS", "TRUE"),
            ("CFIMAGES_MAX_FILE_SIZE_BYTES", "5242880"),
            ("CFIMAGES_ALLOWED_FORMATS", "png,jpeg"),
        ]))
        .unwrap();
        assert_eq!(config.variants(), ["thumbnail", "public"]);
        assert_eq!(config.metadata()["source"], "cli");
        assert!(config.require_signed_urls());
        assert_eq!(config.max_file_size(), Some(5_242_880));
        assert_eq!(config.allowed_formats().len(), 2);
    }

    #[test]
    fn test_upload_configuration_rejects_non_object_metadata() {
        let err = UploadConfiguration::from_lookup(lookup_from(&[(
            "CFIMAGES_METADATA",
            "[1, 2]",
        )]))
        .unwrap_err();
        assert!(err.to_string().contains("JSON object"));
    }

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.backend_url, "http://localhost:8000");
        assert_eq!(config.upload_url_path, "/cloudflare-images/get-upload-url/");
        assert_eq!(config.csrf_token, None);
        assert_eq!(config.http_timeout_secs, 60);
    }

    #[test]
    fn test_client_config_validation() {
        assert!(ClientConfig::from_lookup(lookup_from(&[(
            "CFIMAGES_BACKEND_URL",
            "ftp://example.com"
        )]))
        .is_err());
        assert!(ClientConfig::from_lookup(lookup_from(&[(
            "CFIMAGES_HTTP_TIMEOUT_SECS",
            "0"
        )]))
        .is_err());
    }

    #[test]
    fn test_client_config_debug_redacts_token() {
        let config = ClientConfig::from_lookup(lookup_from(&[(
            "CFIMAGES_CSRF_TOKEN",
            "secret-token",
        )]))
        .unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("<redacted>"));
    }
}
