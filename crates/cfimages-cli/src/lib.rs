use anyhow::{Context, Result};
use cfimages_core::SelectedFile;
use cfimages_widget::{BindingSurface, MemorySurface};
use std::path::Path;

/// Detect an image media type from magic bytes.
pub fn detect_media_type(data: &[u8]) -> Option<&'static str> {
    if data.len() < 4 {
        return None;
    }

    // JPEG: FF D8 FF
    if data[0] == 0xFF && data[1] == 0xD8 && data[2] == 0xFF {
        return Some("image/jpeg");
    }

    // PNG: 89 50 4E 47
    if data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47 {
        return Some("image/png");
    }

    // GIF: 47 49 46
    if data[0] == 0x47 && data[1] == 0x49 && data[2] == 0x46 {
        return Some("image/gif");
    }

    // WebP: RIFF ... WEBP
    if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        return Some("image/webp");
    }

    None
}

/// Media type from the file extension, for formats without a magic-byte rule.
pub fn media_type_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        "avif" => Some("image/avif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// Read a local file into a `SelectedFile`, declaring its media type the way a
/// browser picker would (empty when unknown).
pub fn read_selected_file(path: &Path) -> Result<SelectedFile> {
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let media_type = detect_media_type(&data)
        .or_else(|| media_type_from_extension(path))
        .unwrap_or("");

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    Ok(SelectedFile::new(file_name, media_type, data))
}

/// Binding surface for a terminal: state is kept in memory and every
/// notification is written to stderr as it happens.
#[derive(Debug, Default)]
pub struct TerminalSurface {
    inner: MemorySurface,
}

impl TerminalSurface {
    pub fn new(initial_value: impl Into<String>) -> Self {
        Self {
            inner: MemorySurface::new(initial_value),
        }
    }

    pub fn preview_src(&self) -> Option<&str> {
        self.inner.preview_src()
    }
}

impl BindingSurface for TerminalSurface {
    fn hidden_value(&self) -> String {
        self.inner.hidden_value()
    }

    fn set_hidden_value(&mut self, value: &str) {
        self.inner.set_hidden_value(value);
    }

    fn set_progress_visible(&mut self, visible: bool) {
        if visible {
            eprintln!("Uploading...");
        }
        self.inner.set_progress_visible(visible);
    }

    fn set_picker_enabled(&mut self, enabled: bool) {
        self.inner.set_picker_enabled(enabled);
    }

    fn clear_preview(&mut self) {
        self.inner.clear_preview();
    }

    fn show_preview(&mut self, src: &str) {
        self.inner.show_preview(src);
    }

    fn notify(&mut self, message: &str) {
        eprintln!("{}", message);
        self.inner.notify(message);
    }
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
