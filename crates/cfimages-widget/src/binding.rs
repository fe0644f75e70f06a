//! Field binding: the UI elements of one rendered field instance.

use cfimages_core::{preview_path, AssetId};
use serde::Serialize;

use crate::ui_state::UiState;

/// Element identifiers of one field instance, derived from a shared prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingIds {
    /// Hidden value holder
    pub field_id: String,
    /// File picker
    pub upload_id: String,
    /// Preview surface
    pub preview_id: String,
    /// Progress indicator
    pub progress_id: String,
}

impl BindingIds {
    /// Use the explicit `id` attribute when the host sets one, else `id_{name}`.
    pub fn new(name: &str, id_attr: Option<&str>) -> Self {
        let field_id = match id_attr {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => format!("id_{}", name),
        };
        Self::from_field_id(field_id)
    }

    pub fn from_field_id(field_id: impl Into<String>) -> Self {
        let field_id = field_id.into();
        Self {
            upload_id: format!("{}_upload", field_id),
            preview_id: format!("{}_preview", field_id),
            progress_id: format!("{}_progress", field_id),
            field_id,
        }
    }
}

/// The host's UI elements for one field.
///
/// Methods are synchronous and must not fail; a host that cannot reach an
/// element (e.g. it was removed from the document) should ignore the call.
pub trait BindingSurface {
    /// Current content of the hidden value holder (empty when unset)
    fn hidden_value(&self) -> String;

    fn set_hidden_value(&mut self, value: &str);

    fn set_progress_visible(&mut self, visible: bool);

    fn set_picker_enabled(&mut self, enabled: bool);

    fn clear_preview(&mut self);

    /// Replace the preview with an image at `src`
    fn show_preview(&mut self, src: &str);

    /// Surface a message to the user. Blocking alerts are acceptable.
    fn notify(&mut self, message: &str);
}

/// One bound field: its identifiers, its surface and its UI state.
///
/// The hidden value is only ever written through [`FieldBinding::commit`],
/// which takes an identifier confirmed by the image host.
#[derive(Debug)]
pub struct FieldBinding<S> {
    ids: BindingIds,
    surface: S,
    state: UiState,
}

impl<S: BindingSurface> FieldBinding<S> {
    pub fn new(ids: BindingIds, surface: S) -> Self {
        Self {
            ids,
            surface,
            state: UiState::Idle,
        }
    }

    pub fn ids(&self) -> &BindingIds {
        &self.ids
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn state(&self) -> UiState {
        self.state
    }

    /// The committed asset identifier, if the field holds one.
    pub fn value(&self) -> Option<AssetId> {
        AssetId::new(self.surface.hidden_value())
    }

    /// Render the preview for the current value, or clear it when empty.
    pub fn render_preview(&mut self) -> Option<AssetId> {
        match self.value() {
            Some(id) => {
                self.surface.show_preview(&preview_path(id.as_str()));
                Some(id)
            }
            None => {
                self.surface.clear_preview();
                None
            }
        }
    }

    pub(crate) fn commit(&mut self, id: &AssetId) {
        self.surface.set_hidden_value(id.as_str());
        self.surface.show_preview(&id.preview_path());
    }

    pub(crate) fn enter_uploading(&mut self) {
        self.state = UiState::Uploading;
        self.surface.set_picker_enabled(false);
        self.surface.set_progress_visible(true);
        self.surface.clear_preview();
    }

    pub(crate) fn enter_idle(&mut self) {
        self.surface.set_progress_visible(false);
        self.surface.set_picker_enabled(true);
        self.state = UiState::Idle;
    }
}

/// Recorded surface call, for hosts and tests that need the transition history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    HiddenValue(String),
    Progress(bool),
    Picker(bool),
    PreviewCleared,
    Preview(String),
    Notified(String),
}

/// Headless in-memory surface.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    hidden_value: String,
    progress_visible: bool,
    picker_enabled: bool,
    preview_src: Option<String>,
    events: Vec<SurfaceEvent>,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new("")
    }
}

impl MemorySurface {
    /// A surface as first rendered, holding `initial_value` in its hidden input.
    pub fn new(initial_value: impl Into<String>) -> Self {
        Self {
            hidden_value: initial_value.into(),
            progress_visible: false,
            picker_enabled: true,
            preview_src: None,
            events: Vec::new(),
        }
    }

    pub fn progress_visible(&self) -> bool {
        self.progress_visible
    }

    pub fn picker_enabled(&self) -> bool {
        self.picker_enabled
    }

    pub fn preview_src(&self) -> Option<&str> {
        self.preview_src.as_deref()
    }

    pub fn events(&self) -> &[SurfaceEvent] {
        &self.events
    }

    pub fn notifications(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::Notified(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl BindingSurface for MemorySurface {
    fn hidden_value(&self) -> String {
        self.hidden_value.clone()
    }

    fn set_hidden_value(&mut self, value: &str) {
        self.hidden_value = value.to_string();
        self.events.push(SurfaceEvent::HiddenValue(value.to_string()));
    }

    fn set_progress_visible(&mut self, visible: bool) {
        self.progress_visible = visible;
        self.events.push(SurfaceEvent::Progress(visible));
    }

    fn set_picker_enabled(&mut self, enabled: bool) {
        self.picker_enabled = enabled;
        self.events.push(SurfaceEvent::Picker(enabled));
    }

    fn clear_preview(&mut self) {
        self.preview_src = None;
        self.events.push(SurfaceEvent::PreviewCleared);
    }

    fn show_preview(&mut self, src: &str) {
        self.preview_src = Some(src.to_string());
        self.events.push(SurfaceEvent::Preview(src.to_string()));
    }

    fn notify(&mut self, message: &str) {
        self.events.push(SurfaceEvent::Notified(message.to_string()));
    }
}
