//! HTML parsing into an arena DOM.
//!
//! # Example
//!
//! ```
//! use pubmanifest::dom::parse_html;
//! use url::Url;
//!
//! let url = Url::parse("https://example.org/book/index.html").unwrap();
//! let doc = parse_html("<html lang='fr'><title>Le Livre</title></html>", url);
//!
//! assert_eq!(doc.title().as_deref(), Some("Le Livre"));
//! assert_eq!(doc.language(), Some("fr"));
//! ```

mod arena;
mod tree_sink;

pub use arena::{
    ArenaDom, ArenaNode, ArenaNodeData, ArenaNodeId, Attribute, ChildrenIter, Descendants,
};

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use url::Url;

use crate::model::Direction;
use crate::util::{decode_text, extract_charset};
use tree_sink::ArenaSink;

/// A parsed HTML document together with the URL it was loaded from.
#[derive(Debug)]
pub struct HtmlDocument {
    pub url: Url,
    pub dom: ArenaDom,
}

impl HtmlDocument {
    /// Text of the first `<title>`, whitespace-normalized; `None` if empty.
    pub fn title(&self) -> Option<String> {
        let title = self.dom.find_by_tag("title")?;
        let text = normalize_whitespace(&self.dom.text_content(title));
        (!text.is_empty()).then_some(text)
    }

    fn root_element(&self) -> Option<ArenaNodeId> {
        self.dom.find_by_tag("html")
    }

    /// The `lang` attribute of the root element.
    pub fn language(&self) -> Option<&str> {
        self.root_element()
            .and_then(|html| self.dom.get_attr(html, "lang"))
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
    }

    /// The `dir` attribute of the root element.
    pub fn direction(&self) -> Option<Direction> {
        self.root_element()
            .and_then(|html| self.dom.get_attr(html, "dir"))
            .and_then(|dir| Direction::parse(dir.trim()))
    }
}

/// Parse HTML text loaded from `url`.
pub fn parse_html(html: &str, url: Url) -> HtmlDocument {
    let sink = ArenaSink::default();
    let result = parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes());
    HtmlDocument {
        url,
        dom: result.into_dom(),
    }
}

/// Parse raw HTML bytes, detecting their encoding.
pub fn parse_html_bytes(html: &[u8], url: Url) -> HtmlDocument {
    let text = decode_text(html, extract_charset(html));
    parse_html(&text, url)
}

/// Collapse whitespace runs into single spaces and trim.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
