//! Cloudflare Images field widget
//!
//! Binds one form field's UI surface (hidden value, file picker, preview,
//! progress indicator) to the two-step upload sequence: ask the backend for a
//! one-time upload URL, post the file directly to the image host, then commit
//! the returned asset identifier into the field.
//!
//! Rendering is the host's concern. The host builds a [`WidgetContext`] for its
//! templates and implements [`BindingSurface`] over its own UI elements.

pub mod binding;
pub mod context;
pub mod orchestrator;
pub mod ui_state;

pub use binding::{BindingIds, BindingSurface, FieldBinding, MemorySurface, SurfaceEvent};
pub use context::{Widget, WidgetContext};
pub use orchestrator::UploadOrchestrator;
pub use ui_state::UiState;
