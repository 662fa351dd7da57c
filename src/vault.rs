//! Vault indexing and page key derivation.

use anyhow::{Context, Result, bail};
use std::path::Path;
use walkdir::WalkDir;

/// Obsidian's hidden configuration directory at the vault root.
///
/// Everything under this directory is plugin state and workspace layout,
/// never content, so it is excluded from indexing and never copied to
/// the output tree.
pub const VAULT_CONFIG_DIR: &str = ".obsidian";

/// Index of every convertible file in a vault, built once per batch.
///
/// Holds two order-aligned sequences: the vault-relative source paths
/// (forward-slash separators) and their derived page keys. Link targets
/// may reference any file in the vault, so the index is rebuilt from
/// scratch even for single-file conversions.
#[derive(Debug, Clone)]
pub struct PageIndex {
    files: Vec<String>,
    keys: Vec<String>,
}

impl PageIndex {
    /// Builds the index by walking the vault recursively.
    ///
    /// Excludes everything under the vault configuration directory and
    /// every file without an extension. Retained paths are normalized
    /// to `/` separators.
    ///
    /// # Arguments
    ///
    /// * `vault_root`: Path to the vault directory
    ///
    /// # Errors
    ///
    /// Returns error if the vault root does not exist or cannot be walked.
    pub fn build(vault_root: impl AsRef<Path>) -> Result<Self> {
        let vault_root = vault_root.as_ref();

        if !vault_root.exists() {
            bail!("vault does not exist: {}", vault_root.display());
        }

        let mut files = Vec::new();
        let mut keys = Vec::new();

        for entry in WalkDir::new(vault_root).sort_by_file_name() {
            let entry = entry
                .with_context(|| format!("failed to walk vault: {}", vault_root.display()))?;

            if !entry.file_type().is_file() {
                continue;
            }

            let rel = entry
                .path()
                .strip_prefix(vault_root)
                .with_context(|| format!("entry outside vault: {}", entry.path().display()))?;

            let Some(rel_str) = rel.to_str() else {
                log::warn!("skipping file with non-UTF8 path: {}", rel.display());
                continue;
            };

            let rel_str = rel_str.replace(std::path::MAIN_SEPARATOR, "/");

            if is_excluded(&rel_str) {
                continue;
            }

            keys.push(page_key(&rel_str));
            files.push(rel_str);
        }

        Ok(Self { files, keys })
    }

    /// Vault-relative source paths, `/`-separated, in listing order.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Page keys aligned positionally with [`files`](Self::files).
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Number of indexed files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if the vault contains no convertible files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Checks the exclusion filter for a vault-relative path.
///
/// Excluded: any path inside the configuration directory, and any file
/// without an extension (directory markers, extensionless notes). The
/// same rule applies to batch indexing and incremental conversion, so
/// no excluded file can reach the output through either path.
pub(crate) fn is_excluded(rel: &str) -> bool {
    let first_segment = rel.split('/').next().unwrap_or(rel);
    if first_segment == VAULT_CONFIG_DIR {
        return true;
    }

    Path::new(rel).extension().is_none()
}

/// Derives the canonical page key for a vault-relative path.
///
/// Drops a trailing `.md`, then normalizes the final path segment.
/// Directory segments are preserved verbatim; only the name segment is
/// lower-cased and hyphenated, and only when it does not look like a
/// file with another extension (e.g. `Photo One.png` stays as-is).
///
/// # Arguments
///
/// * `rel`: Vault-relative path with `/` separators
///
/// # Returns
///
/// Canonical page key, e.g. `Notes/My Page.md` → `Notes/my-page`
pub fn page_key(rel: &str) -> String {
    let trimmed = rel.strip_suffix(".md").unwrap_or(rel);
    normalize_target(trimmed)
}

/// Applies page-name normalization to a link target or key stem.
///
/// The same rule serves key derivation and raw link targets, so a
/// `[[My Page]]` reference normalizes to the key of `My Page.md`.
pub fn normalize_target(target: &str) -> String {
    match target.rsplit_once('/') {
        Some((dir, name)) => format!("{}/{}", dir, normalize_name(name)),
        None => normalize_name(target),
    }
}

/// Normalizes a single name-like segment.
///
/// Segments that still carry an extension name attachments rather than
/// pages and pass through verbatim.
fn normalize_name(segment: &str) -> String {
    if Path::new(segment).extension().is_some() {
        return segment.to_string();
    }

    segment.to_lowercase().replace(' ', "-")
}
