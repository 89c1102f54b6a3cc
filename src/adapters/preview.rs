use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use base64::{prelude::BASE64_STANDARD, Engine};
use parking_lot::Mutex;
use tracing::debug;

use crate::application::ports::{PreviewHandle, PreviewPort};
use crate::domain::image::ImageAsset;

/// Keeps a downscaled JPEG data URL per live preview.
pub struct ThumbnailPreviews {
    max_side: u32,
    next: AtomicU64,
    live: Mutex<HashMap<u64, Option<String>>>,
}

impl ThumbnailPreviews {
    pub fn new(max_side: u32) -> Self {
        Self { max_side, next: AtomicU64::new(1), live: Mutex::new(HashMap::new()) }
    }

    fn thumbnail(&self, image: &ImageAsset) -> Option<String> {
        let decoded = image::load_from_memory(&image.bytes)
            .map_err(|e| debug!("No preview for {}: {}", image.name, e))
            .ok()?;
        let rgb = decoded.thumbnail(self.max_side, self.max_side).to_rgb8();

        let mut buf = Vec::new();
        let mut enc = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, 80);
        enc.encode(rgb.as_raw(), rgb.width(), rgb.height(), image::ExtendedColorType::Rgb8)
            .map_err(|e| debug!("Preview encoding failed for {}: {}", image.name, e))
            .ok()?;
        Some(format!("data:image/jpeg;base64,{}", BASE64_STANDARD.encode(buf)))
    }
}

impl Default for ThumbnailPreviews {
    fn default() -> Self {
        Self::new(256)
    }
}

impl PreviewPort for ThumbnailPreviews {
    fn create(&self, image: &ImageAsset) -> PreviewHandle {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        let preview = self.thumbnail(image);
        self.live.lock().insert(id, preview);
        PreviewHandle(id)
    }

    fn render(&self, handle: &PreviewHandle) -> Option<String> {
        self.live.lock().get(&handle.0).cloned().flatten()
    }

    fn release(&self, handle: PreviewHandle) {
        if self.live.lock().remove(&handle.0).is_some() {
            debug!("Preview {} released", handle.0);
        }
    }
}
