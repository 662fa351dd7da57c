//! Document rewriting from Obsidian markup to Hugo syntax.
//!
//! Inline constructs are recognized in a single tagged-token scan: one
//! alternation classifies every occurrence as wiki-image, inline image,
//! wiki-link, inline link, or highlight span, in that precedence order.
//! A rewritten token can therefore never be re-matched by a later pass.
//! Callout lines are handled by a separate line-anchored pass.

use regex::{Captures, Regex};
use std::path::Path;
use std::sync::LazyLock;

use super::links::{LinkResolver, Resolution};
use crate::images;
use crate::vault::PageIndex;

/// Inline token alternation.
///
/// Alternation order is the precedence order: image forms before their
/// link counterparts, so `![[x]]` never half-matches as `[[x]]`.
static INLINE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
          !\[\[(?P<wiki_image>[^\[\]]*)\]\]
        | !\[(?P<image_alt>[^\]]*)\]\((?P<image_url>[^()]*)\)
        | \[\[(?P<wiki_link>[^\[\]]*)\]\]
        | \[(?P<link_text>[^\]]*)\]\((?P<link_url>[^()]*)\)
        | ==(?P<highlight>[^\n]+?)==
        ",
    )
    .expect("inline token pattern is valid")
});

/// Callout marker line: `> [!kind] body`, at any quote depth.
static CALLOUT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?P<prefix>(?:>\s*)+)\[!(?P<kind>[^\]]*)\](?P<body>.*)$")
        .expect("callout pattern is valid")
});

/// Parsed size spec from an image embed.
///
/// A non-numeric spec is demoted to alt text; a zero height emits
/// width-only sizing.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ImageSize {
    alt: String,
    width: Option<u32>,
    height: Option<u32>,
}

/// Rewrites one document's markup against a fixed page index.
///
/// Created per file so diagnostics can name the source document. Never
/// aborts on malformed or unresolvable tokens: those stay verbatim in
/// the output and produce a log line instead.
pub struct MarkupRewriter<'a> {
    resolver: LinkResolver<'a>,
    unsafe_render: bool,
    source: &'a str,
}

impl<'a> MarkupRewriter<'a> {
    /// Creates a rewriter for one source document.
    ///
    /// # Arguments
    ///
    /// * `index`: Page index for the whole vault
    /// * `unsafe_render`: Permit raw inline HTML in the output
    /// * `source`: Vault-relative path of the document, for diagnostics
    pub fn new(index: &'a PageIndex, unsafe_render: bool, source: &'a str) -> Self {
        Self {
            resolver: LinkResolver::new(index),
            unsafe_render,
            source,
        }
    }

    /// Rewrites a full document.
    ///
    /// # Returns
    ///
    /// The document text with all recognized constructs converted to
    /// Hugo syntax; unrecognized or unresolvable tokens are untouched.
    pub fn rewrite(&self, text: &str) -> String {
        let inline = self.rewrite_inline(text);
        self.rewrite_callouts(&inline)
    }

    /// Single scan over all inline constructs.
    fn rewrite_inline(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for caps in INLINE_TOKEN.captures_iter(text) {
            let whole = caps.get(0).expect("alternation match has a whole span");
            out.push_str(&text[last..whole.start()]);

            let token = whole.as_str();
            let replacement = if let Some(body) = caps.name("wiki_image") {
                self.rewrite_wiki_image(token, body.as_str())
            } else if let Some(url) = caps.name("image_url") {
                let alt = caps.name("image_alt").map_or("", |m| m.as_str());
                self.rewrite_inline_image(token, alt, url.as_str())
            } else if let Some(body) = caps.name("wiki_link") {
                self.rewrite_wiki_link(token, body.as_str())
            } else if let Some(url) = caps.name("link_url") {
                let label = caps.name("link_text").map_or("", |m| m.as_str());
                self.rewrite_plain_link(token, label, url.as_str())
            } else if let Some(inner) = caps.name("highlight") {
                self.rewrite_highlight(inner.as_str())
            } else {
                token.to_string()
            };

            out.push_str(&replacement);
            last = whole.end();
        }

        out.push_str(&text[last..]);
        out
    }

    /// `![[target]]` / `![[target|size]]` → media embed.
    fn rewrite_wiki_image(&self, token: &str, body: &str) -> String {
        let (target, spec) = match body.split_once('|') {
            Some((target, spec)) => (target, spec),
            None => (body, body),
        };

        let Some(src) = self.resolve_or_report(target) else {
            return token.to_string();
        };

        if !images::is_raster(Path::new(&src)) {
            return token.to_string();
        }

        self.media_embed(&src, &parse_image_size(spec))
    }

    /// `![alt](url)` → media embed, external urls untouched.
    fn rewrite_inline_image(&self, token: &str, alt: &str, url: &str) -> String {
        if is_external(url) {
            return token.to_string();
        }

        let Some(src) = self.resolve_or_report(url) else {
            return token.to_string();
        };

        if !images::is_raster(Path::new(&src)) {
            return token.to_string();
        }

        self.media_embed(&src, &parse_image_size(alt))
    }

    /// `[[target]]` / `[[target|text]]` → Hugo cross-reference link.
    fn rewrite_wiki_link(&self, token: &str, body: &str) -> String {
        let (target, text) = match body.split_once('|') {
            Some((target, text)) => (target, text),
            None => (body, body),
        };

        match self.resolve_or_report(target) {
            Some(path) => format!("[{}]({{{{< ref \"{}\" >}}}})", text, path),
            None => token.to_string(),
        }
    }

    /// `[text](target)` → site-relative link, external urls untouched.
    fn rewrite_plain_link(&self, token: &str, label: &str, url: &str) -> String {
        if is_external(url) {
            return token.to_string();
        }

        match self.resolve_or_report(url) {
            Some(path) => format!("[{}]({})", label, path),
            None => token.to_string(),
        }
    }

    /// `==text==` → `<mark>` or bold emphasis depending on render mode.
    fn rewrite_highlight(&self, inner: &str) -> String {
        if self.unsafe_render {
            format!("<mark>{}</mark>", inner)
        } else {
            format!("**{}**", inner)
        }
    }

    /// Callout line pass: `> [!kind] body` → icon-prefixed bold quote.
    ///
    /// The quote depth is preserved, so callouts nested inside block
    /// quotes keep their nesting level in the output.
    fn rewrite_callouts(&self, text: &str) -> String {
        CALLOUT_LINE
            .replace_all(text, |caps: &Captures| {
                let kind = &caps["kind"];
                let body = caps["body"].trim();
                let quotes = "> ".repeat(caps["prefix"].matches('>').count());

                match callout_icon(kind) {
                    Some(icon) if body.is_empty() => format!("{}**{} {}**", quotes, icon, kind),
                    Some(icon) => format!("{}**{} {}**", quotes, icon, body),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    /// Resolves a target, logging non-unique outcomes.
    ///
    /// Ambiguity counts as failure: picking a silent winner hides
    /// collisions from the author.
    fn resolve_or_report(&self, target: &str) -> Option<String> {
        match self.resolver.resolve(target) {
            Resolution::Unique(path) => Some(path),
            Resolution::Ambiguous(candidates) => {
                log::warn!(
                    "{}: ambiguous link target \"{}\" matches {}",
                    self.source,
                    target,
                    candidates.join(", ")
                );
                None
            }
            Resolution::NotFound => {
                log::warn!("{}: unresolved link target \"{}\"", self.source, target);
                None
            }
        }
    }

    /// Emits the media-embed construct for a resolved image path.
    ///
    /// Unsafe render mode emits a raw HTML block; restricted mode emits
    /// a Hugo figure shortcode.
    fn media_embed(&self, src: &str, size: &ImageSize) -> String {
        let mut attrs = String::new();
        if let Some(width) = size.width {
            attrs.push_str(&format!(" width=\"{}\"", width));
        }
        if let Some(height) = size.height {
            attrs.push_str(&format!(" height=\"{}\"", height));
        }

        if self.unsafe_render {
            format!(
                "\n<p><img src=\"{}\" alt=\"{}\"{}></p>\n",
                src, size.alt, attrs
            )
        } else {
            format!(
                "{{{{< figure src=\"{}\" alt=\"{}\"{} >}}}}",
                src, size.alt, attrs
            )
        }
    }
}

/// Returns true for urls that must pass through untouched.
fn is_external(url: &str) -> bool {
    url.starts_with('/') || url.starts_with("http:") || url.starts_with("https:")
}

/// Parses a `WIDTHxHEIGHT` or `WIDTH` size spec.
///
/// A pipe inside the spec separates a caption from the dimensions
/// (`logo|64`); only the part after the pipe is parsed as a size.
/// Both fields must be non-empty ASCII digit runs; anything else makes
/// the whole spec alt text. A height of zero means "no height".
fn parse_image_size(spec: &str) -> ImageSize {
    let original = spec;
    let spec = spec.split_once('|').map_or(spec, |(_, after)| after);

    let as_alt = || ImageSize {
        alt: original.to_string(),
        width: None,
        height: None,
    };

    let (width_str, height_str) = match spec.split_once('x') {
        Some((w, h)) => (w, Some(h)),
        None => (spec, None),
    };

    let Ok(width) = parse_dimension(width_str) else {
        return as_alt();
    };

    let height = match height_str {
        Some(h) => match parse_dimension(h) {
            Ok(0) => None,
            Ok(h) => Some(h),
            Err(()) => return as_alt(),
        },
        None => None,
    };

    ImageSize {
        alt: String::new(),
        width: Some(width),
        height,
    }
}

/// Parses one dimension field: non-empty, digits only, fits in u32.
fn parse_dimension(field: &str) -> Result<u32, ()> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(());
    }
    field.parse().map_err(|_| ())
}

/// Maps a callout kind to its icon.
///
/// Kind names are case-sensitive; aliases group to one icon following
/// Obsidian's callout taxonomy.
fn callout_icon(kind: &str) -> Option<&'static str> {
    match kind {
        "note" => Some("✏️"),
        "abstract" | "summary" | "tldr" => Some("📋"),
        "info" => Some("ℹ️"),
        "todo" => Some("☑️"),
        "tip" | "hint" | "important" => Some("💡"),
        "success" | "check" | "done" => Some("✅"),
        "question" | "help" | "faq" => Some("❓"),
        "warning" | "caution" | "attention" => Some("⚠️"),
        "failure" | "fail" | "missing" => Some("❌"),
        "danger" | "error" => Some("🚨"),
        "bug" => Some("🐛"),
        "example" => Some("🧾"),
        "quote" | "cite" => Some("❝"),
        _ => None,
    }
}
