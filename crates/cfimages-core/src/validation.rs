//! Field validator
//!
//! Gate-checks a selected file against the widget's size and format
//! constraints. Size is checked first, so a file failing both reports
//! `FileTooLarge`.

use crate::config::UploadConfiguration;
use crate::error::ValidationError;
use crate::models::SelectedFile;

/// Validate a selected file against the upload configuration.
///
/// Format membership is case-sensitive against the declared subtype.
pub fn validate(file: &SelectedFile, config: &UploadConfiguration) -> Result<(), ValidationError> {
    if let Some(max) = config.max_file_size() {
        let size = file.size();
        if size > max {
            return Err(ValidationError::FileTooLarge { size, max });
        }
    }

    let allowed = config.allowed_formats();
    if !allowed.is_empty() {
        let permitted = file
            .subtype()
            .map(|subtype| allowed.contains(subtype))
            .unwrap_or(false);
        if !permitted {
            return Err(ValidationError::FormatNotAllowed {
                media_type: file.media_type.clone(),
            });
        }
    }

    Ok(())
}
