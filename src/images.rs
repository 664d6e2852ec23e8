use std::collections::HashMap;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// A decoded image ready for embedding: intrinsic size plus a data URI.
#[derive(Debug, Clone)]
pub struct CachedImage {
    pub width: u32,
    pub height: u32,
    pub data_uri: String,
}

pub type ImageLoader = Box<dyn FnMut(&str) -> anyhow::Result<CachedImage>>;

/// Memoizing image loader. Each path is loaded at most once; failures
/// are remembered too, so a missing file is not retried on every
/// rebuild of the scene.
pub struct ImageCache {
    loader: ImageLoader,
    entries: HashMap<String, Option<CachedImage>>,
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new(Box::new(|path| load_from_disk(Path::new(path))))
    }
}

impl ImageCache {
    pub fn new(loader: ImageLoader) -> Self {
        Self {
            loader,
            entries: HashMap::new(),
        }
    }

    pub fn get(&mut self, path: &str) -> Option<&CachedImage> {
        if !self.entries.contains_key(path) {
            let loaded = (self.loader)(path).ok();
            self.entries.insert(path.to_string(), loaded);
        }
        self.entries.get(path).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn load_from_disk(path: &Path) -> anyhow::Result<CachedImage> {
    let bytes = std::fs::read(path)?;
    let mime = match path.extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    };
    let (width, height) = png_dimensions(&bytes).unwrap_or((0, 0));
    Ok(CachedImage {
        width,
        height,
        data_uri: format!("data:{mime};base64,{}", STANDARD.encode(&bytes)),
    })
}

/// Width/height from a PNG IHDR chunk. Other formats report (0, 0) and
/// are drawn at the size of their diagram element.
fn png_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    if bytes.len() < 24 || bytes[..8] != SIGNATURE {
        return None;
    }
    let width = u32::from_be_bytes(bytes[16..20].try_into().ok()?);
    let height = u32::from_be_bytes(bytes[20..24].try_into().ok()?);
    Some((width, height))
}
