//! Markup resolution and rewriting.
//!
//! This module turns Obsidian's wiki-style markup into Hugo syntax:
//! link resolution against the page index, and per-document rewriting
//! of wiki-links, images, highlight spans, and callout blocks.

mod links;
mod rewriter;

pub use links::{LinkResolver, Resolution};
pub use rewriter::MarkupRewriter;
