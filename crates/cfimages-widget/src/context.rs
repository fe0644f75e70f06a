//! Typed widget context handed from the host form system to its client module.

use cfimages_core::{preview_path, UploadConfiguration};
use serde::Serialize;

use crate::binding::{BindingIds, BindingSurface, FieldBinding};

/// A configured upload widget. Holds the constraints shared by every field
/// instance it renders.
#[derive(Debug, Clone, Default)]
pub struct Widget {
    config: UploadConfiguration,
}

/// Everything a host template or client module needs to render and wire one
/// field instance.
#[derive(Debug, Clone, Serialize)]
pub struct WidgetContext {
    /// Form field name
    pub name: String,
    /// Current value; empty when the field holds no asset
    pub value: String,
    #[serde(flatten)]
    pub ids: BindingIds,
    /// Preview `src` for the current value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_src: Option<String>,
    pub config: UploadConfiguration,
}

impl Widget {
    pub fn new(config: UploadConfiguration) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &UploadConfiguration {
        &self.config
    }

    /// Build the context for field `name` holding `value`.
    pub fn context(&self, name: &str, value: Option<&str>, id_attr: Option<&str>) -> WidgetContext {
        let value = format_value(value);
        let preview_src = if value.is_empty() {
            None
        } else {
            Some(preview_path(&value))
        };
        WidgetContext {
            name: name.to_string(),
            ids: BindingIds::new(name, id_attr),
            value,
            preview_src,
            config: self.config.clone(),
        }
    }

    /// Bind the host's surface for field `name`.
    pub fn bind<S: BindingSurface>(
        &self,
        name: &str,
        id_attr: Option<&str>,
        surface: S,
    ) -> FieldBinding<S> {
        FieldBinding::new(BindingIds::new(name, id_attr), surface)
    }
}

fn format_value(value: Option<&str>) -> String {
    value.map(str::to_string).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::MemorySurface;
    use serde_json::json;

    #[test]
    fn test_context_serializes_for_host() {
        let widget = Widget::new(
            UploadConfiguration::new()
                .with_max_file_size(Some(1024))
                .with_allowed_formats(["png"]),
        );
        let context = widget.context("photo", Some("abc123"), None);

        assert_eq!(
            serde_json::to_value(&context).unwrap(),
            json!({
                "name": "photo",
                "value": "abc123",
                "field_id": "id_photo",
                "upload_id": "id_photo_upload",
                "preview_id": "id_photo_preview",
                "progress_id": "id_photo_progress",
                "preview_src": "/cloudflare-images/image/abc123/thumbnail/",
                "config": {
                    "variants": [],
                    "metadata": {},
                    "require_signed_urls": false,
                    "max_file_size": 1024,
                    "allowed_formats": ["png"]
                }
            })
        );
    }

    #[test]
    fn test_context_none_value_formats_empty() {
        let context = Widget::default().context("photo", None, Some("custom"));
        assert_eq!(context.value, "");
        assert_eq!(context.preview_src, None);
        assert_eq!(context.ids.field_id, "custom");
    }

    #[test]
    fn test_bind_uses_same_ids_as_context() {
        let widget = Widget::default();
        let binding = widget.bind("photo", None, MemorySurface::default());
        assert_eq!(binding.ids(), &widget.context("photo", None, None).ids);
    }
}
