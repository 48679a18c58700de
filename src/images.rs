use image::RgbaImage;
use std::sync::Arc;
use tracing::debug;

use crate::http::HttpClient;

/// A render-ready image, or the stand-in used when none could be obtained.
#[derive(Debug, Clone)]
pub enum Bitmap {
    Decoded(Arc<RgbaImage>),
    Placeholder,
}

impl Bitmap {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Bitmap::Placeholder)
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            Bitmap::Decoded(img) => Some(img.dimensions()),
            Bitmap::Placeholder => None,
        }
    }

    /// Decode encoded image bytes (PNG/JPEG). Returns `None` for anything undecodable.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        image::load_from_memory(bytes)
            .map_err(|e| debug!(error = %e, "image decode failed"))
            .ok()
            .map(|img| Bitmap::Decoded(Arc::new(img.to_rgba8())))
    }
}

/// Downloads and decodes images. Never fails; falls back to [`Bitmap::Placeholder`].
#[derive(Clone)]
pub struct ImageLoader {
    http: HttpClient,
}

impl ImageLoader {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn load(&self, url: &str) -> Bitmap {
        if url.is_empty() {
            return Bitmap::Placeholder;
        }
        let bytes = match self.http.fetch_bytes(url).await {
            Ok(b) => b,
            Err(e) => {
                debug!(url, error = %e, "image fetch failed, using placeholder");
                return Bitmap::Placeholder;
            }
        };
        // Decoding is CPU-bound; keep it off the async workers.
        match tokio::task::spawn_blocking(move || Bitmap::decode(&bytes)).await {
            Ok(Some(bitmap)) => bitmap,
            Ok(None) => Bitmap::Placeholder,
            Err(e) => {
                debug!(url, error = %e, "image decode task failed");
                Bitmap::Placeholder
            }
        }
    }
}
