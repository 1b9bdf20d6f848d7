//! Table of contents extraction.
//!
//! Walks an HTML subtree (usually a `<nav role="doc-toc">`) depth first and
//! rebuilds a nested outline: the first heading names the ToC, the first list
//! holds the entries, and every list item becomes a branch named after its
//! first anchor. Nested lists inside an item become its sub-entries.
//!
//! # Example
//!
//! ```
//! use pubmanifest::dom::parse_html;
//! use pubmanifest::toc::{extract_toc, locate_toc_root};
//! use pubmanifest::{Logger, Manifest};
//! use url::Url;
//!
//! let url = Url::parse("http://example.org/toc.html").unwrap();
//! let doc = parse_html(
//!     r#"<nav role="doc-toc"><h2>Contents</h2><ol><li><a href="c1.html">One</a></li></ol></nav>"#,
//!     url,
//! );
//! let root = locate_toc_root(&doc.dom, None).unwrap();
//!
//! let mut logger = Logger::new();
//! let toc = extract_toc(&Manifest::default(), &doc, root, &mut logger).unwrap();
//! assert_eq!(toc.name.as_deref(), Some("Contents"));
//! assert_eq!(toc.entries.unwrap()[0].name, "One");
//! ```

use serde::Serialize;
use serde_json::Value as JsonValue;
use url::Url;

use crate::dom::{ArenaDom, ArenaNodeId, ChildrenIter, HtmlDocument, normalize_whitespace};
use crate::logger::Logger;
use crate::model::Manifest;

/// Root of an extracted table of contents.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Toc {
    pub name: Option<String>,
    pub entries: Option<Vec<TocEntry>>,
}

/// One branch of the outline.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TocEntry {
    pub name: String,
    pub url: Option<Url>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub rel: Option<Vec<String>>,
    pub entries: Option<Vec<TocEntry>>,
}

impl Toc {
    /// Number of entries at every depth.
    pub fn len(&self) -> usize {
        fn count(entries: &[TocEntry]) -> usize {
            entries
                .iter()
                .map(|e| 1 + e.entries.as_deref().map_or(0, count))
                .sum()
        }
        self.entries.as_deref().map_or(0, count)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.as_ref().is_none_or(Vec::is_empty)
    }
}

/// Find the ToC root: the element with id `fragment` when given, otherwise
/// the first element whose `role` contains `doc-toc`.
pub fn locate_toc_root(dom: &ArenaDom, fragment: Option<&str>) -> Option<ArenaNodeId> {
    match fragment.filter(|f| !f.is_empty()) {
        Some(id) => dom.get_by_id(id),
        None => dom.find_from(dom.document(), |dom, id| {
            dom.attr_has_token(id, "role", "doc-toc")
        }),
    }
}

/// Extract the outline below `root`.
///
/// Returns `None` when no entry survived.
pub fn extract_toc(
    manifest: &Manifest,
    document: &HtmlDocument,
    root: ArenaNodeId,
    logger: &mut Logger,
) -> Option<Toc> {
    let toc = build_outline(manifest, document, root, logger);
    tracing::debug!(entries = toc.len(), "extracted table of contents");
    (!toc.is_empty()).then_some(toc)
}

/// Run the extractor and return the raw outline, even when it is empty.
pub fn build_outline(
    manifest: &Manifest,
    document: &HtmlDocument,
    root: ArenaNodeId,
    logger: &mut Logger,
) -> Toc {
    let mut builder = TocBuilder::new(manifest, &document.url, logger);
    builder.walk(&document.dom, root);
    builder.toc
}

// ============================================================================
// Element categories
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Heading,
    List,
    ListItem,
    Anchor,
    /// Sectioning content and roots, or hidden elements: never descended.
    Skipped,
    /// Visited for its children only.
    Transparent,
}

fn categorize(dom: &ArenaDom, id: ArenaNodeId) -> Category {
    if dom.has_attr(id, "hidden") {
        return Category::Skipped;
    }
    match dom.element_name(id) {
        Some("h1" | "h2" | "h3" | "h4" | "h5" | "h6") => Category::Heading,
        Some("ol" | "ul") => Category::List,
        Some("li") => Category::ListItem,
        Some("a") => Category::Anchor,
        Some(
            "article" | "aside" | "nav" | "section" | "blockquote" | "body" | "details"
            | "dialog" | "fieldset" | "figure" | "td",
        ) => Category::Skipped,
        _ => Category::Transparent,
    }
}

// ============================================================================
// State machine
// ============================================================================

/// What the walker does after entering an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Skip,
    Descend,
    Stop,
}

/// A branch under construction.
#[derive(Debug, Default)]
struct Branch {
    entry: TocEntry,
    entries: Vec<TocEntry>,
    anchored: bool,
    list_consumed: bool,
}

/// An open list, with the branch that encloses it.
#[derive(Debug)]
struct Frame {
    enclosing: Option<Branch>,
    /// A list nested directly in this one (no item between) was already read.
    list_consumed: bool,
}

impl Branch {
    fn finish(self) -> Option<TocEntry> {
        let mut entry = self.entry;
        if !self.entries.is_empty() {
            entry.entries = Some(self.entries);
        }
        if entry.name.is_empty() && entry.entries.is_none() {
            return None;
        }
        Some(entry)
    }
}

struct TocBuilder<'a> {
    manifest: &'a Manifest,
    base: &'a Url,
    logger: &'a mut Logger,
    toc: Toc,
    top_entries: Vec<TocEntry>,
    current: Option<Branch>,
    /// One frame per open list.
    stack: Vec<Frame>,
    top_list_consumed: bool,
}

impl<'a> TocBuilder<'a> {
    fn new(manifest: &'a Manifest, base: &'a Url, logger: &'a mut Logger) -> Self {
        Self {
            manifest,
            base,
            logger,
            toc: Toc::default(),
            top_entries: Vec::new(),
            current: None,
            stack: Vec::new(),
            top_list_consumed: false,
        }
    }

    /// Visit the elements below `root` depth first, without recursion.
    fn walk(&mut self, dom: &ArenaDom, root: ArenaNodeId) {
        // Descended elements, each with the remaining siblings to resume.
        let mut open: Vec<(Category, ChildrenIter<'_>)> = Vec::new();
        let mut children = dom.children(root);
        loop {
            let Some(child) = children.next() else {
                let Some((category, siblings)) = open.pop() else {
                    break;
                };
                self.exit(category);
                children = siblings;
                continue;
            };
            if !dom.is_element(child) {
                continue;
            }
            let category = categorize(dom, child);
            match self.enter(dom, child, category) {
                Decision::Skip => {}
                Decision::Stop => break,
                Decision::Descend => {
                    let siblings = std::mem::replace(&mut children, dom.children(child));
                    open.push((category, siblings));
                }
            }
        }
    }

    fn enter(&mut self, dom: &ArenaDom, id: ArenaNodeId, category: Category) -> Decision {
        match category {
            Category::Heading => {
                if self.toc.name.is_none() && self.stack.is_empty() && !self.top_list_consumed {
                    let text = normalize_whitespace(&dom.text_content(id));
                    if !text.is_empty() {
                        self.toc.name = Some(text);
                    }
                    Decision::Skip
                } else {
                    Decision::Descend
                }
            }
            Category::List => {
                let consumed = match (self.current.as_ref(), self.stack.last()) {
                    (Some(branch), _) => branch.list_consumed || !branch.entries.is_empty(),
                    (None, Some(frame)) => frame.list_consumed,
                    (None, None) => false,
                };
                if consumed {
                    return Decision::Skip;
                }
                if self.current.is_none() && self.stack.is_empty() && self.top_list_consumed {
                    return Decision::Stop;
                }
                self.stack.push(Frame {
                    enclosing: self.current.take(),
                    list_consumed: false,
                });
                Decision::Descend
            }
            Category::ListItem => {
                if self.stack.is_empty() || self.current.is_some() {
                    return Decision::Skip;
                }
                self.current = Some(Branch::default());
                Decision::Descend
            }
            Category::Anchor => {
                if let Some(branch) = self.current.as_mut()
                    && !branch.anchored
                {
                    branch.anchored = true;
                    branch.entry.name = normalize_whitespace(&dom.text_content(id));
                    branch.entry.media_type = dom
                        .get_attr(id, "type")
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(str::to_string);
                    branch.entry.rel = dom
                        .get_attr(id, "rel")
                        .map(|rel| rel.split_whitespace().map(str::to_string).collect::<Vec<_>>())
                        .filter(|rel| !rel.is_empty());
                    let href = dom.get_attr(id, "href");
                    branch.entry.url = resolve_entry_url(self.manifest, self.base, href, self.logger);
                }
                Decision::Skip
            }
            Category::Skipped => Decision::Skip,
            Category::Transparent => Decision::Descend,
        }
    }

    fn exit(&mut self, category: Category) {
        match category {
            Category::List => {
                let Some(frame) = self.stack.pop() else {
                    return;
                };
                self.current = frame.enclosing;
                match (self.current.as_mut(), self.stack.last_mut()) {
                    (Some(branch), _) => branch.list_consumed = true,
                    (None, Some(parent)) => parent.list_consumed = true,
                    (None, None) => self.top_list_consumed = true,
                }
                if self.stack.is_empty() && self.current.is_none() {
                    self.toc.entries = if self.top_entries.is_empty() {
                        None
                    } else {
                        Some(std::mem::take(&mut self.top_entries))
                    };
                }
            }
            Category::ListItem => {
                let Some(entry) = self.current.take().and_then(Branch::finish) else {
                    return;
                };
                match self.stack.iter_mut().rev().find_map(|f| f.enclosing.as_mut()) {
                    Some(parent) => parent.entries.push(entry),
                    None => self.top_entries.push(entry),
                }
            }
            _ => {}
        }
    }
}

/// Resolve an anchor `href` and check it points into the publication.
fn resolve_entry_url(
    manifest: &Manifest,
    base: &Url,
    href: Option<&str>,
    logger: &mut Logger,
) -> Option<Url> {
    let Some(href) = href.map(str::trim).filter(|h| !h.is_empty()) else {
        logger.warning("ToC entry without a link target", None);
        return None;
    };
    match base.join(href) {
        Ok(url) if manifest.contains_resource(&url) => Some(url),
        Ok(url) => {
            logger.warning(
                "ToC entry links outside the publication",
                Some(JsonValue::String(url.to_string())),
            );
            None
        }
        Err(_) => {
            logger.warning(
                "ToC entry with an invalid link",
                Some(JsonValue::String(href.to_string())),
            );
            None
        }
    }
}
