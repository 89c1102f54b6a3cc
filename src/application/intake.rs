use std::sync::Arc;

use tracing::{debug, info};

use crate::application::ports::{PreviewHandle, PreviewPort};
use crate::domain::{
    errors::DomainResult,
    image::{ImageAsset, ImageSummary},
};

/// A validated image whose preview is already built, ready to become the held image.
pub struct PreparedImage {
    asset: ImageAsset,
    handle: PreviewHandle,
}

/// Holds the selected image and its preview. Replacing or clearing releases the old preview.
pub struct ImageIntake {
    previews: Arc<dyn PreviewPort>,
    current: Option<(ImageAsset, PreviewHandle)>,
}

impl ImageIntake {
    pub fn new(previews: Arc<dyn PreviewPort>) -> Self {
        Self { previews, current: None }
    }

    /// Validates and builds the preview without touching any held image.
    /// `previews` must be the port this intake was created with.
    pub fn prepare(previews: &dyn PreviewPort, candidate: ImageAsset) -> DomainResult<PreparedImage> {
        candidate.ensure_image()?;
        let handle = previews.create(&candidate);
        Ok(PreparedImage { asset: candidate, handle })
    }

    /// Makes `prepared` the held image, releasing the one it replaces.
    pub fn select(&mut self, prepared: PreparedImage) -> &ImageAsset {
        let PreparedImage { asset, handle } = prepared;
        info!("Image selected: {} ({}, {} bytes)", asset.name, asset.media_type, asset.bytes.len());
        if let Some((old, old_handle)) = self.current.take() {
            debug!("Releasing preview of replaced image {}", old.name);
            self.previews.release(old_handle);
        }
        let (asset, _) = self.current.insert((asset, handle));
        asset
    }

    /// Releases the held preview, if any. Idempotent.
    pub fn clear(&mut self) {
        if let Some((old, handle)) = self.current.take() {
            debug!("Releasing preview of {}", old.name);
            self.previews.release(handle);
        }
    }

    pub fn current(&self) -> Option<&ImageAsset> {
        self.current.as_ref().map(|(asset, _)| asset)
    }

    pub fn summary(&self) -> Option<ImageSummary> {
        self.current
            .as_ref()
            .map(|(asset, handle)| asset.summary(self.previews.render(handle)))
    }
}

impl Drop for ImageIntake {
    fn drop(&mut self) {
        self.clear();
    }
}
