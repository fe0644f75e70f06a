//! Idle/uploading state of a field and the guard that restores idle.

use std::ops::{Deref, DerefMut};

use crate::binding::{BindingSurface, FieldBinding};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiState {
    /// Progress hidden, picker enabled
    Idle,
    /// Progress visible, picker disabled, preview cleared
    Uploading,
}

/// Holds a binding in the uploading state until dropped.
///
/// Dropping returns the binding to idle on every path out of an attempt,
/// including an early return and the caller dropping the upload future.
pub(crate) struct UploadingGuard<'a, S: BindingSurface> {
    binding: &'a mut FieldBinding<S>,
}

impl<'a, S: BindingSurface> UploadingGuard<'a, S> {
    pub(crate) fn enter(binding: &'a mut FieldBinding<S>) -> Self {
        binding.enter_uploading();
        Self { binding }
    }
}

impl<S: BindingSurface> Deref for UploadingGuard<'_, S> {
    type Target = FieldBinding<S>;

    fn deref(&self) -> &Self::Target {
        self.binding
    }
}

impl<S: BindingSurface> DerefMut for UploadingGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.binding
    }
}

impl<S: BindingSurface> Drop for UploadingGuard<'_, S> {
    fn drop(&mut self) {
        self.binding.enter_idle();
    }
}
