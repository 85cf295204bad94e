//! Markup boundary scanning and annotation.
//!
//! The runtime never parses markup beyond element boundaries: it needs the
//! root-level start tags of a rendered fragment so it can stamp them with
//! back-reference markers, the content spans so the in-memory host can
//! materialize nodes, and the wrapper start/end tags. Everything else about
//! markup belongs to the host environment.

use std::collections::HashMap;

// =============================================================================
// Marker Attributes
// =============================================================================

/// Attribute carrying the owning instance's viewId.
pub const VIEW_ID_ATTR: &str = "data-vireo-view";

/// Attribute carrying the owning definition's path.
pub const VIEW_PATH_ATTR: &str = "data-vireo-path";

/// Tags that never take a closing tag and never change nesting depth.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta",
    "source", "track", "wbr",
];

// =============================================================================
// Root-Level Element Scanning
// =============================================================================

/// An element found at root level of a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootElement {
    pub name: String,
    pub attributes: HashMap<String, String>,
    /// Byte offset of the `<` opening the start tag.
    pub tag_open: usize,
    /// Byte offset of the `>` closing the start tag.
    pub tag_close: usize,
    /// Content span between start and end tag. Empty for self-closing
    /// and void elements.
    pub content_start: usize,
    pub content_end: usize,
}

impl RootElement {
    pub fn content<'a>(&self, markup: &'a str) -> &'a str {
        &markup[self.content_start..self.content_end]
    }
}

/// Whether a rendered output looks like a textual markup fragment.
pub fn is_markup(output: &str) -> bool {
    output.trim_start().starts_with('<')
}

/// Scan a fragment and return its root-level elements in document order.
///
/// Depth tracking is tag-count based: start tags push, end tags pop,
/// self-closing and void tags are neutral. Comments are skipped. Anything
/// malformed terminates the scan with what was found so far.
pub fn scan_root_elements(markup: &str) -> Vec<RootElement> {
    let bytes = markup.as_bytes();
    let mut elements: Vec<RootElement> = Vec::new();
    let mut depth: usize = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }
        // Comment: skip to -->
        if markup[i..].starts_with("<!--") {
            match markup[i..].find("-->") {
                Some(end) => i += end + 3,
                None => break,
            }
            continue;
        }
        // End tag
        if markup[i..].starts_with("</") {
            match markup[i..].find('>') {
                Some(end) => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        // Closes the most recent root element.
                        if let Some(root) = elements.last_mut() {
                            if root.content_end < root.content_start {
                                root.content_end = i;
                            }
                        }
                    }
                    i += end + 1;
                }
                None => break,
            }
            continue;
        }
        // Start tag
        let Some(close_rel) = markup[i..].find('>') else {
            break;
        };
        let close = i + close_rel;
        let inner = &markup[i + 1..close];
        let self_closing = inner.ends_with('/');
        let inner = inner.trim_end_matches('/');
        let name_end = inner
            .find(|c: char| c.is_whitespace())
            .unwrap_or(inner.len());
        let name = inner[..name_end].to_ascii_lowercase();
        if name.is_empty() {
            i = close + 1;
            continue;
        }
        let neutral = self_closing || VOID_TAGS.contains(&name.as_str());
        if depth == 0 {
            let (content_start, content_end) = if neutral {
                (close + 1, close + 1)
            } else {
                // content_end > content_start marks "still open"; patched
                // when the matching end tag is seen.
                (close + 1, close)
            };
            elements.push(RootElement {
                name: name.clone(),
                attributes: parse_attributes(&inner[name_end..]),
                tag_open: i,
                tag_close: close,
                content_start,
                content_end,
            });
        }
        if !neutral {
            depth += 1;
        }
        i = close + 1;
    }

    // An unterminated root element owns the rest of the fragment.
    if let Some(root) = elements.last_mut() {
        if root.content_end < root.content_start {
            root.content_end = markup.len();
        }
    }
    elements
}

/// Parse `key="value"` pairs from the attribute section of a start tag.
/// Bare attributes get an empty value.
fn parse_attributes(raw: &str) -> HashMap<String, String> {
    let mut attrs = HashMap::new();
    let mut rest = raw.trim();
    while !rest.is_empty() {
        let key_end = rest
            .find(|c: char| c.is_whitespace() || c == '=')
            .unwrap_or(rest.len());
        let key = rest[..key_end].to_string();
        rest = rest[key_end..].trim_start();
        if let Some(after_eq) = rest.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            if let Some(quoted) = after_eq.strip_prefix('"') {
                match quoted.find('"') {
                    Some(end) => {
                        attrs.insert(key, quoted[..end].to_string());
                        rest = quoted[end + 1..].trim_start();
                    }
                    None => {
                        attrs.insert(key, quoted.to_string());
                        rest = "";
                    }
                }
            } else {
                let val_end = after_eq
                    .find(|c: char| c.is_whitespace())
                    .unwrap_or(after_eq.len());
                attrs.insert(key, after_eq[..val_end].to_string());
                rest = after_eq[val_end..].trim_start();
            }
        } else if !key.is_empty() {
            attrs.insert(key, String::new());
        } else {
            break;
        }
    }
    attrs
}

// =============================================================================
// Annotation & Wrapping
// =============================================================================

/// Stamp every root-level start tag with the instance's path and viewId
/// markers. Fragments without root-level elements come back unchanged.
pub fn annotate_roots(markup: &str, path: &str, view_id: &str) -> String {
    let elements = scan_root_elements(markup);
    if elements.is_empty() {
        return markup.to_string();
    }
    let marker = format!(" {VIEW_PATH_ATTR}=\"{path}\" {VIEW_ID_ATTR}=\"{view_id}\"");
    let mut result = String::with_capacity(markup.len() + marker.len() * elements.len());
    let mut cursor = 0;
    for element in &elements {
        // Insert just before the `>` (or `/>`).
        let mut insert_at = element.tag_close;
        if markup[..insert_at].ends_with('/') {
            insert_at -= 1;
        }
        result.push_str(&markup[cursor..insert_at]);
        result.push_str(&marker);
        cursor = insert_at;
    }
    result.push_str(&markup[cursor..]);
    result
}

/// Opening prefix of a markup-boundary comment pair.
pub const BOUNDARY_OPEN: &str = "<!--vireo:";

/// Closing prefix of a markup-boundary comment pair.
pub const BOUNDARY_CLOSE: &str = "<!--/vireo:";

/// Wrap content in boundary comments for a tagless wrapper. The host's
/// markup-boundary lookup resolves the nodes between the pair.
pub fn boundary_wrap(content: &str, path: &str, view_id: &str) -> String {
    format!("{BOUNDARY_OPEN}{path}:{view_id}-->{content}{BOUNDARY_CLOSE}{path}:{view_id}-->")
}

/// Build the wrapper start tag + content + end tag for a wrapped render.
///
/// The start tag carries both back-reference markers plus the configured
/// wrapper attributes, in sorted key order for stable output.
pub fn wrap(
    content: &str,
    tag: &str,
    attributes: &HashMap<String, String>,
    path: &str,
    view_id: &str,
) -> String {
    let mut out = format!("<{tag} {VIEW_PATH_ATTR}=\"{path}\" {VIEW_ID_ATTR}=\"{view_id}\"");
    let mut keys: Vec<&String> = attributes.keys().collect();
    keys.sort();
    for key in keys {
        out.push_str(&format!(" {key}=\"{}\"", attributes[key]));
    }
    out.push('>');
    out.push_str(content);
    out.push_str(&format!("</{tag}>"));
    out
}
