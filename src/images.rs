//! Raster image classification, resizing, and copy fallback.

use anyhow::{Context, Result};
use image::imageops::FilterType;
use std::fs;
use std::path::Path;

use crate::config::Config;

/// Raster extensions eligible for embedding and resizing.
///
/// Matches Obsidian's attachment types; everything else is copied
/// byte-for-byte by the pipeline.
const RASTER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tif", "tiff", "webp"];

/// Returns true when the path names a raster image by extension.
///
/// Extension comparison is case-insensitive; paths without an
/// extension are never raster images.
pub fn is_raster(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .is_some_and(|ext| RASTER_EXTENSIONS.contains(&ext.as_str()))
}

/// Converts one raster image into the output tree.
///
/// With resizing enabled, images exceeding either configured maximum
/// are scaled to fit within the bounds preserving aspect ratio; images
/// within bounds are copied byte-for-byte. Decode or encode failures
/// fall back to a byte copy with a diagnostic, never failing the file.
/// With resizing disabled the file is always copied unmodified.
///
/// # Arguments
///
/// * `source`: Absolute path of the vault image
/// * `dest`: Absolute output path
/// * `config`: Conversion configuration (resize flag and maxima)
///
/// # Errors
///
/// Returns error only when the fallback byte copy itself fails.
pub fn convert_image(source: &Path, dest: &Path, config: &Config) -> Result<()> {
    if config.image_resize {
        match resize_if_oversized(source, dest, config.image_max_width, config.image_max_height) {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(e) => {
                log::warn!(
                    "resize failed for {}, copying unmodified: {:#}",
                    source.display(),
                    e
                );
            }
        }
    }

    fs::copy(source, dest)
        .with_context(|| format!("failed to copy {}", source.display()))?;
    Ok(())
}

/// Resizes the image when either dimension exceeds its maximum.
///
/// # Returns
///
/// `true` when a resized copy was written, `false` when the image is
/// already within bounds and the caller should copy it instead.
fn resize_if_oversized(source: &Path, dest: &Path, max_width: u32, max_height: u32) -> Result<bool> {
    let img = image::open(source)
        .with_context(|| format!("failed to decode {}", source.display()))?;

    if img.width() <= max_width && img.height() <= max_height {
        return Ok(false);
    }

    img.resize(max_width, max_height, FilterType::Lanczos3)
        .save(dest)
        .with_context(|| format!("failed to write resized image {}", dest.display()))?;

    Ok(true)
}
