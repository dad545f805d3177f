//! Upload pipeline: validation, streaming, progress, store handoff.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use bytes::Bytes;
use tracing::{info, warn};

use vitrine_common::config::UploadConfig;
use vitrine_common::{AppError, AppResult, MediaStorage, ProgressFn};
use vitrine_store::{GalleryStore, is_allowed_content_type};

use crate::services::auth::AuthService;
use crate::services::cache::GalleryCache;

/// Placeholder title when none is provided.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Maximum title length in characters.
const MAX_TITLE_LEN: usize = 256;

/// Maximum description length in characters.
const MAX_DESCRIPTION_LEN: usize = 2048;

/// Input for uploading a new gallery entry.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Raw binary content.
    pub data: Bytes,
    /// Declared MIME content type.
    pub content_type: String,
    /// Optional title; defaults to [`DEFAULT_TITLE`].
    pub title: Option<String>,
    /// Optional description; defaults to empty.
    pub description: Option<String>,
}

/// Enforces the progress contract for one upload: reported values are
/// monotonically non-decreasing, transport progress is capped below 100,
/// and 100 is reported only after the store confirms the entry.
struct ProgressReporter<'a> {
    callback: &'a ProgressFn<'a>,
    last: AtomicU8,
}

impl<'a> ProgressReporter<'a> {
    fn new(callback: &'a ProgressFn<'a>) -> Self {
        Self {
            callback,
            last: AtomicU8::new(0),
        }
    }

    fn begin(&self) {
        (self.callback)(0);
    }

    fn transfer(&self, pct: u8) {
        let clamped = pct.min(99);
        let previous = self.last.fetch_max(clamped, Ordering::SeqCst);
        if clamped > previous {
            (self.callback)(clamped);
        }
    }

    fn finish(&self) {
        self.last.store(100, Ordering::SeqCst);
        (self.callback)(100);
    }
}

/// Moves binary content and metadata into the store.
pub struct UploadService {
    auth: Arc<AuthService>,
    store: Arc<dyn GalleryStore>,
    media: Arc<dyn MediaStorage>,
    cache: Arc<GalleryCache>,
    config: UploadConfig,
}

impl UploadService {
    /// Create the pipeline over its collaborators.
    #[must_use]
    pub fn new(
        auth: Arc<AuthService>,
        store: Arc<dyn GalleryStore>,
        media: Arc<dyn MediaStorage>,
        cache: Arc<GalleryCache>,
        config: UploadConfig,
    ) -> Self {
        Self {
            auth,
            store,
            media,
            cache,
            config,
        }
    }

    /// Upload new content and create its gallery entry.
    ///
    /// On any failure no entry is created and nothing partial stays
    /// visible. Retried submissions are not deduplicated: a retry after
    /// an ambiguous failure produces a second, distinct entry.
    pub async fn upload(&self, request: UploadRequest, on_progress: &ProgressFn<'_>) -> AppResult<()> {
        let caller = self.auth.require_admin().await?;
        validate(&request, &self.config)?;

        let reporter = ProgressReporter::new(on_progress);
        reporter.begin();

        let media = self
            .media
            .upload(request.data.clone(), &request.content_type, &|pct| {
                reporter.transfer(pct);
            })
            .await?;

        let title = request
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());
        let description = request.description.unwrap_or_default();

        match self
            .store
            .create_entry(&caller, media.clone(), &title, &description)
            .await
        {
            Ok(()) => {
                reporter.finish();
                self.cache.notify_changed().await;
                info!(title = %title, size = request.data.len(), "upload confirmed");
                Ok(())
            }
            Err(err) => {
                // The store rejected the entry; take the content back out
                // so nothing partial is left behind.
                if let Err(cleanup) = self.media.delete(&media).await {
                    warn!(error = %cleanup, "content cleanup after rejected create failed");
                }
                Err(err)
            }
        }
    }
}

/// Client-side fast-fail checks. The store re-validates and stays the
/// final arbiter.
fn validate(request: &UploadRequest, config: &UploadConfig) -> AppResult<()> {
    if !is_allowed_content_type(&request.content_type) {
        return Err(AppError::InvalidArgument(format!(
            "Unsupported content type: {} (expected image/jpeg or image/png)",
            request.content_type
        )));
    }

    if request.data.is_empty() {
        return Err(AppError::InvalidArgument("Content is empty".to_string()));
    }
    if request.data.len() as u64 > config.max_size_bytes {
        return Err(AppError::InvalidArgument(format!(
            "Content too large: maximum is {} bytes",
            config.max_size_bytes
        )));
    }

    if sniff_format(&request.data) != Some(request.content_type.as_str()) {
        return Err(AppError::InvalidArgument(
            "Content does not match its declared type".to_string(),
        ));
    }

    if let Some(ref title) = request.title
        && title.len() > MAX_TITLE_LEN
    {
        return Err(AppError::InvalidArgument(format!(
            "Title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    if let Some(ref description) = request.description
        && description.len() > MAX_DESCRIPTION_LEN
    {
        return Err(AppError::InvalidArgument(format!(
            "Description must be at most {MAX_DESCRIPTION_LEN} characters"
        )));
    }

    Ok(())
}

/// Detect a raster format from its magic bytes.
fn sniff_format(data: &[u8]) -> Option<&'static str> {
    // JPEG: FF D8 FF
    if data.len() >= 3 && data[0] == 0xFF && data[1] == 0xD8 && data[2] == 0xFF {
        return Some("image/jpeg");
    }
    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.len() >= 8 && data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("image/png");
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn png_bytes() -> Bytes {
        let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        data.extend_from_slice(&[0u8; 16]);
        Bytes::from(data)
    }

    fn png_request() -> UploadRequest {
        UploadRequest {
            data: png_bytes(),
            content_type: "image/png".to_string(),
            title: None,
            description: None,
        }
    }

    #[test]
    fn test_sniff_format() {
        assert_eq!(sniff_format(&png_bytes()), Some("image/png"));
        assert_eq!(sniff_format(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(sniff_format(b"plain text"), None);
        assert_eq!(sniff_format(&[]), None);
    }

    #[test]
    fn test_validate_rejects_disallowed_type() {
        let request = UploadRequest {
            content_type: "image/gif".to_string(),
            ..png_request()
        };
        let err = validate(&request, &UploadConfig::default()).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[test]
    fn test_validate_rejects_mismatched_magic_bytes() {
        let request = UploadRequest {
            data: Bytes::from_static(b"not actually a png"),
            ..png_request()
        };
        let err = validate(&request, &UploadConfig::default()).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[test]
    fn test_validate_rejects_oversize_content() {
        let config = UploadConfig {
            max_size_bytes: 8,
            ..UploadConfig::default()
        };
        let err = validate(&png_request(), &config).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[test]
    fn test_progress_reporter_is_monotonic_and_caps_transfer() {
        let seen = Mutex::new(Vec::new());
        let callback = |pct: u8| seen.lock().unwrap().push(pct);
        let reporter = ProgressReporter::new(&callback);

        reporter.begin();
        reporter.transfer(40);
        reporter.transfer(30); // regression is dropped
        reporter.transfer(100); // transport never reports completion
        reporter.finish();

        assert_eq!(*seen.lock().unwrap(), vec![0, 40, 99, 100]);
    }
}
