//! Multipart form plumbing for the two upload surfaces: product images
//! and hero video files. Size and content-type constraints are enforced
//! here, before any byte reaches the media CDN.

use std::collections::HashMap;

use axum::extract::Multipart;
use bytes::Bytes;

use crate::errors::ServiceError;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const MAX_IMAGES_PER_PRODUCT: usize = 5;
pub const MAX_VIDEO_BYTES: usize = 100 * 1024 * 1024;

/// Extra request-body headroom on top of the media limits
pub const PRODUCT_BODY_LIMIT: usize = MAX_IMAGES_PER_PRODUCT * MAX_IMAGE_BYTES + 1024 * 1024;
pub const VIDEO_BODY_LIMIT: usize = MAX_VIDEO_BYTES + 1024 * 1024;

const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];
const ALLOWED_VIDEO_TYPES: &[&str] = &[
    "video/mp4",
    "video/x-msvideo",
    "video/quicktime",
    "video/x-ms-wmv",
    "video/x-flv",
    "video/webm",
];

/// Constraints applied to the file parts of one upload surface.
#[derive(Debug, Clone, Copy)]
pub struct UploadPolicy {
    pub field: &'static str,
    pub allowed_types: &'static [&'static str],
    pub max_bytes: usize,
    pub max_files: usize,
    pub type_error: &'static str,
    pub size_error: &'static str,
}

/// Product images: JPEG/PNG/WebP, at most 5 files of 5MB each.
pub const IMAGE_POLICY: UploadPolicy = UploadPolicy {
    field: "images",
    allowed_types: ALLOWED_IMAGE_TYPES,
    max_bytes: MAX_IMAGE_BYTES,
    max_files: MAX_IMAGES_PER_PRODUCT,
    type_error: "Only image files are allowed",
    size_error: "File too large. Maximum size is 5MB",
};

/// Hero videos: common video containers, one file of at most 100MB.
pub const VIDEO_POLICY: UploadPolicy = UploadPolicy {
    field: "video",
    allowed_types: ALLOWED_VIDEO_TYPES,
    max_bytes: MAX_VIDEO_BYTES,
    max_files: 1,
    type_error: "Only video files are allowed",
    size_error: "Video too large. Maximum size is 100MB",
};

/// A file part pulled out of a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Text fields plus validated file parts of one multipart request.
#[derive(Debug, Default)]
pub struct ParsedForm {
    pub fields: HashMap<String, String>,
    pub files: Vec<UploadedFile>,
}

impl ParsedForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Required text field; missing or blank is a validation error.
    pub fn require_field(&self, name: &str) -> Result<&str, ServiceError> {
        self.field(name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ServiceError::ValidationError(format!("{name} is required")))
    }
}

/// Validate one file part against the policy.
pub fn validate_file(policy: &UploadPolicy, file: &UploadedFile) -> Result<(), ServiceError> {
    if !policy
        .allowed_types
        .iter()
        .any(|allowed| file.content_type.eq_ignore_ascii_case(allowed))
    {
        return Err(ServiceError::ValidationError(policy.type_error.to_string()));
    }
    if file.data.len() > policy.max_bytes {
        return Err(ServiceError::ValidationError(policy.size_error.to_string()));
    }
    Ok(())
}

/// Drain a multipart request into text fields and validated files.
pub async fn read_form(
    multipart: &mut Multipart,
    policy: &UploadPolicy,
) -> Result<ParsedForm, ServiceError> {
    let mut form = ParsedForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::ValidationError(format!("Invalid multipart payload: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == policy.field {
            if form.files.len() >= policy.max_files {
                return Err(ServiceError::ValidationError(format!(
                    "At most {} {} file(s) allowed",
                    policy.max_files, policy.field
                )));
            }

            let filename = field.file_name().unwrap_or("upload").to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let data = field.bytes().await.map_err(|e| {
                ServiceError::ValidationError(format!("Failed to read uploaded file: {e}"))
            })?;

            let file = UploadedFile {
                filename,
                content_type,
                data,
            };
            validate_file(policy, &file)?;
            form.files.push(file);
        } else {
            let value = field.text().await.map_err(|e| {
                ServiceError::ValidationError(format!("Invalid multipart payload: {e}"))
            })?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}
