//! Link resolution against the vault page index.

use crate::vault::{PageIndex, normalize_target};

/// Reserved key segment marking a directory's landing page.
///
/// Hugo addresses a section's `_index.md` at the section path itself,
/// so resolved keys ending in this segment collapse to their parent.
const INDEX_SEGMENT: &str = "_index";

/// Outcome of resolving an ambiguous link target.
///
/// Wiki references name pages by (possibly partial) name, so a short
/// target can match zero, one, or several indexed keys. Callers choose
/// the policy; the rewriter treats anything but `Unique` as unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one page matches; carries the absolute site path.
    Unique(String),
    /// Several pages share the suffix; carries the candidate keys.
    Ambiguous(Vec<String>),
    /// No page matches the target.
    NotFound,
}

/// Resolves path-free wiki references to absolute site paths.
///
/// The same algorithm serves wiki-links, relative markdown links, and
/// both image embed forms; only the surrounding syntax differs.
pub struct LinkResolver<'a> {
    index: &'a PageIndex,
}

impl<'a> LinkResolver<'a> {
    /// Creates a resolver over a fully built page index.
    pub fn new(index: &'a PageIndex) -> Self {
        Self { index }
    }

    /// Resolves a raw link target to an absolute site path.
    ///
    /// Resolution order:
    /// 1. Normalize the target with the page-name rule used for key
    ///    derivation, so `[[My Page]]` matches the key of `My Page.md`.
    /// 2. An exact key match wins outright, even when suffix matches
    ///    also exist.
    /// 3. Otherwise every key ending in `/target` is a candidate: one
    ///    candidate resolves, several report ambiguity, none reports
    ///    not-found.
    ///
    /// A resolved key ending in the `_index` segment collapses to its
    /// parent path (`docs/_index` → `/docs`).
    ///
    /// Deterministic for a fixed index: candidates are collected in
    /// index order.
    ///
    /// # Arguments
    ///
    /// * `raw_target`: Link target as captured from document text
    pub fn resolve(&self, raw_target: &str) -> Resolution {
        let target = normalize_target(raw_target);

        if self.index.keys().iter().any(|key| *key == target) {
            return Resolution::Unique(site_path(&target));
        }

        let suffix = format!("/{}", target);
        let candidates: Vec<&String> = self
            .index
            .keys()
            .iter()
            .filter(|key| key.ends_with(&suffix))
            .collect();

        match candidates.as_slice() {
            [] => Resolution::NotFound,
            [only] => Resolution::Unique(site_path(only)),
            many => Resolution::Ambiguous(many.iter().map(|key| key.to_string()).collect()),
        }
    }
}

/// Converts a resolved key to its absolute site path.
///
/// Index pages map to their parent directory's address; a root-level
/// index page maps to the site root.
fn site_path(key: &str) -> String {
    if key == INDEX_SEGMENT {
        return "/".to_string();
    }

    let collapsed = key
        .strip_suffix(INDEX_SEGMENT)
        .and_then(|prefix| prefix.strip_suffix('/'))
        .map(|parent| parent.to_string());

    match collapsed {
        Some(parent) => format!("/{}", parent),
        None => format!("/{}", key),
    }
}
