//! Table of contents extraction tests.

use pubmanifest::dom::{HtmlDocument, parse_html};
use pubmanifest::toc::build_outline;
use pubmanifest::{Logger, Manifest, ManifestSource, extract_toc, locate_toc_root, process_manifest};
use url::Url;

const BASE: &str = "http://example.org/book/";

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

/// A processed manifest whose reading order holds `c1.html` to `c<count>.html`.
fn manifest_with_chapters(count: usize) -> Manifest {
    let chapters: Vec<String> = (1..=count).map(|i| format!("\"c{i}.html\"")).collect();
    let text = format!(
        r#"{{
            "@context": ["https://schema.org", "https://www.w3.org/ns/pub-context"],
            "name": "Chapters",
            "readingOrder": [{}]
        }}"#,
        chapters.join(", ")
    );
    let result = process_manifest(&ManifestSource::new(text, Some(url(BASE))));
    assert!(!result.logger.has_fatal());
    result.manifest
}

fn toc_document(html: &str) -> HtmlDocument {
    parse_html(html, url(&format!("{BASE}toc.html")))
}

#[test]
fn test_heading_and_five_entries() {
    let manifest = manifest_with_chapters(5);
    let document = toc_document(
        r#"<html><body>
        <nav role="doc-toc">
            <h2>Contents</h2>
            <ol>
                <li><a href="c1.html">One</a></li>
                <li><a href="c2.html">Two</a></li>
                <li><a href="c3.html">Three</a></li>
                <li><a href="c4.html">Four</a></li>
                <li><a href="c5.html">Five</a></li>
            </ol>
        </nav>
        </body></html>"#,
    );
    let root = locate_toc_root(&document.dom, None).unwrap();

    let mut logger = Logger::new();
    let toc = extract_toc(&manifest, &document, root, &mut logger).unwrap();

    assert_eq!(toc.name.as_deref(), Some("Contents"));
    let entries = toc.entries.as_ref().unwrap();
    assert_eq!(entries.len(), 5);
    for entry in entries {
        assert!(!entry.name.is_empty());
        assert!(entry.url.is_some());
    }
    assert!(logger.is_empty());
}

#[test]
fn test_empty_list_yields_no_toc() {
    let manifest = manifest_with_chapters(1);
    let document = toc_document(r#"<nav role="doc-toc"><h2>Contents</h2><ol></ol></nav>"#);
    let root = locate_toc_root(&document.dom, None).unwrap();

    let mut logger = Logger::new();
    let outline = build_outline(&manifest, &document, root, &mut logger);
    assert_eq!(outline.name.as_deref(), Some("Contents"));
    assert_eq!(outline.entries, None);

    assert_eq!(extract_toc(&manifest, &document, root, &mut logger), None);
}

#[test]
fn test_deeply_nested_outline() {
    let manifest = manifest_with_chapters(3);
    let document = toc_document(
        r#"<nav role="doc-toc"><ol>
            <li><a href="c1.html">Part I</a>
                <ol>
                    <li><a href="c2.html">Chapter 1</a>
                        <ul><li><a href="c2.html#s1">Section 1.1</a></li></ul>
                    </li>
                    <li><a href="c3.html">Chapter 2</a></li>
                </ol>
            </li>
        </ol></nav>"#,
    );
    let root = locate_toc_root(&document.dom, None).unwrap();

    let mut logger = Logger::new();
    let toc = extract_toc(&manifest, &document, root, &mut logger).unwrap();
    assert_eq!(toc.len(), 4);

    let part = &toc.entries.as_ref().unwrap()[0];
    let chapters = part.entries.as_ref().unwrap();
    assert_eq!(chapters[0].name, "Chapter 1");
    assert_eq!(chapters[0].entries.as_ref().unwrap()[0].name, "Section 1.1");
    assert_eq!(chapters[1].entries, None);
}

#[test]
fn test_links_outside_publication_are_warned() {
    let manifest = manifest_with_chapters(1);
    let document = toc_document(
        r#"<nav role="doc-toc"><ol>
            <li><a href="c1.html">Inside</a></li>
            <li><a href="c9.html">Missing</a></li>
        </ol></nav>"#,
    );
    let root = locate_toc_root(&document.dom, None).unwrap();

    let mut logger = Logger::new();
    let toc = extract_toc(&manifest, &document, root, &mut logger).unwrap();
    let entries = toc.entries.unwrap();
    assert!(entries[0].url.is_some());
    assert!(entries[1].url.is_none());
    assert_eq!(logger.warnings.len(), 1);
}

#[test]
fn test_toc_serializes_nulls() {
    let manifest = manifest_with_chapters(1);
    let document =
        toc_document(r#"<nav role="doc-toc"><ol><li><a href="c1.html">One</a></li></ol></nav>"#);
    let root = locate_toc_root(&document.dom, None).unwrap();

    let mut logger = Logger::new();
    let toc = extract_toc(&manifest, &document, root, &mut logger).unwrap();
    let json = serde_json::to_value(&toc).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "name": null,
            "entries": [{
                "name": "One",
                "url": "http://example.org/book/c1.html",
                "type": null,
                "rel": null,
                "entries": null
            }]
        })
    );
}
