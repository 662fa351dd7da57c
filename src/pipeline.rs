//! Batch and single-file conversion of a vault into Hugo content.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::images;
use crate::markdown::MarkupRewriter;
use crate::vault::{self, PageIndex};

/// Converts the whole vault into the content tree.
///
/// Rebuilds the page index, then clears and recreates the content root
/// so a full conversion always starts from an empty tree. Each indexed
/// file is converted in listing order; a per-file failure is reported
/// and the batch continues with the remaining files.
///
/// # Arguments
///
/// * `config`: Conversion configuration
///
/// # Errors
///
/// Returns error if the vault cannot be indexed, the content root
/// cannot be reset, or any file failed to convert.
pub fn convert_all(config: &Config) -> Result<()> {
    let index = PageIndex::build(&config.vault)?;

    if config.content.exists() {
        fs::remove_dir_all(&config.content).with_context(|| {
            format!("failed to clear content root: {}", config.content.display())
        })?;
    }
    fs::create_dir_all(&config.content).with_context(|| {
        format!("failed to create content root: {}", config.content.display())
    })?;

    let mut failed = 0;
    for file in index.files() {
        if let Err(e) = convert_entry(config, &index, file) {
            log::error!("failed to convert {}: {:#}", file, e);
            failed += 1;
        }
    }

    log::info!("converted {} of {} files", index.len() - failed, index.len());

    if failed > 0 {
        bail!("{} of {} files failed to convert", failed, index.len());
    }

    Ok(())
}

/// Converts a single vault file, for incremental re-conversion.
///
/// Paths the batch exclusion filter rejects are skipped, never copied.
/// Still rebuilds the full page index first: any file's link targets
/// may reference any other file. Does not clear the content root, so
/// the rest of the output tree stays intact.
///
/// # Arguments
///
/// * `config`: Conversion configuration
/// * `rel_path`: Vault-relative path with `/` separators
///
/// # Errors
///
/// Returns error if the vault cannot be indexed or the file fails to
/// convert.
pub fn convert_one(config: &Config, rel_path: &str) -> Result<()> {
    if vault::is_excluded(rel_path) {
        log::debug!("skipping excluded path: {}", rel_path);
        return Ok(());
    }

    let index = PageIndex::build(&config.vault)?;
    convert_entry(config, &index, rel_path)
}

/// Converts one file, classified by extension.
fn convert_entry(config: &Config, index: &PageIndex, rel_path: &str) -> Result<()> {
    let source = config.vault.join(rel_path);
    let dest = config.content.join(rel_path);

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory: {}", parent.display()))?;
    }

    let extension = Path::new(rel_path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();

    if extension == "md" {
        let text = fs::read_to_string(&source)
            .with_context(|| format!("failed to read {}", source.display()))?;

        let rewritten = MarkupRewriter::new(index, config.unsafe_render, rel_path).rewrite(&text);

        fs::write(&dest, rewritten)
            .with_context(|| format!("failed to write {}", dest.display()))?;
    } else if images::is_raster(&source) {
        images::convert_image(&source, &dest, config)?;
    } else {
        fs::copy(&source, &dest)
            .with_context(|| format!("failed to copy {}", source.display()))?;
    }

    Ok(())
}
