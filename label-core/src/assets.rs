//! Logo and pictogram images, decoded once and shared by every page.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::model::Pictogram;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read image {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode PNG {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: png::DecodingError,
    },
    #[error("unsupported pixel layout in {path}")]
    Unsupported { path: String },
}

/// Which graphic a draw operation refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetKey {
    Logo,
    Pictogram(Pictogram),
}

/// Decoded 8-bit image split into color and alpha planes, as PDF wants them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    /// File the image came from; referenced by the SVG preview.
    pub source: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Row-major RGB triplets.
    pub rgb: Vec<u8>,
    /// Row-major alpha, present only when the image has transparency.
    pub alpha: Option<Vec<u8>>,
}

impl RasterImage {
    pub fn open(path: &Path) -> Result<Self, AssetError> {
        let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::decode(path, &bytes)
    }

    /// Decode PNG bytes of any bit depth and color type.
    pub fn decode(source: &Path, bytes: &[u8]) -> Result<Self, AssetError> {
        let map_err = |e: png::DecodingError| AssetError::Decode {
            path: source.display().to_string(),
            source: e,
        };
        let mut decoder = png::Decoder::new(bytes);
        decoder.set_transformations(png::Transformations::normalize_to_color8());
        let mut reader = decoder.read_info().map_err(map_err)?;
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).map_err(map_err)?;
        let data = &buf[..info.buffer_size()];

        let px = (info.width as usize) * (info.height as usize);
        let mut rgb = Vec::with_capacity(px * 3);
        let mut alpha = Vec::with_capacity(px);
        match info.color_type {
            png::ColorType::Rgb => rgb.extend_from_slice(data),
            png::ColorType::Rgba => {
                for p in data.chunks_exact(4) {
                    rgb.extend_from_slice(&p[..3]);
                    alpha.push(p[3]);
                }
            }
            png::ColorType::Grayscale => {
                for &g in data {
                    rgb.extend_from_slice(&[g, g, g]);
                }
            }
            png::ColorType::GrayscaleAlpha => {
                for p in data.chunks_exact(2) {
                    rgb.extend_from_slice(&[p[0], p[0], p[0]]);
                    alpha.push(p[1]);
                }
            }
            // normalize_to_color8 expands palettes
            png::ColorType::Indexed => {
                return Err(AssetError::Unsupported {
                    path: source.display().to_string(),
                });
            }
        }
        let alpha = if alpha.iter().any(|&a| a != 0xff) {
            Some(alpha)
        } else {
            None
        };
        Ok(RasterImage {
            source: source.to_path_buf(),
            width: info.width,
            height: info.height,
            rgb,
            alpha,
        })
    }
}

/// Images available to the compositor. Anything absent is simply not drawn.
#[derive(Clone, Debug, Default)]
pub struct AssetLibrary {
    images: BTreeMap<AssetKey, RasterImage>,
}

impl AssetLibrary {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the logo and every `SGHxx.png` found in `pictogram_dir`.
    ///
    /// Missing or broken files are logged and skipped.
    pub fn load(logo: &Path, pictogram_dir: &Path) -> Self {
        let mut lib = Self::default();
        lib.load_one(AssetKey::Logo, logo);
        for p in Pictogram::ALL {
            lib.load_one(AssetKey::Pictogram(p), &pictogram_dir.join(p.file_name()));
        }
        tracing::debug!(images = lib.images.len(), "image assets loaded");
        lib
    }

    fn load_one(&mut self, key: AssetKey, path: &Path) {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "image asset missing, it will be left out");
            return;
        }
        match RasterImage::open(path) {
            Ok(img) => {
                self.images.insert(key, img);
            }
            Err(e) => tracing::warn!(error = %e, "image asset unusable, it will be left out"),
        }
    }

    pub fn insert(&mut self, key: AssetKey, image: RasterImage) {
        self.images.insert(key, image);
    }

    pub fn get(&self, key: AssetKey) -> Option<&RasterImage> {
        self.images.get(&key)
    }

    pub fn contains(&self, key: AssetKey) -> bool {
        self.images.contains_key(&key)
    }
}
