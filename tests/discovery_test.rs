//! Discovery and loading from disk through the file fetcher.

use std::fs;
use std::path::Path;

use pubmanifest::{
    Error, FileFetcher, Processor, discover, discover_and_process, load_toc,
};
use tempfile::TempDir;
use url::Url;

const CONTEXT: &str = r#""@context": ["https://schema.org", "https://www.w3.org/ns/pub-context"]"#;

fn write(dir: &Path, name: &str, contents: &str) -> Url {
    let path = dir.join(name);
    fs::write(&path, contents).expect("Failed to write fixture");
    Url::from_file_path(&path).unwrap()
}

/// An entry page linking to `pub.json`, two chapters and a separate ToC.
fn linked_publication() -> (TempDir, Url) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let index = write(
        dir.path(),
        "index.html",
        r#"<html lang="en"><head>
            <title>Linked Publication</title>
            <link rel="publication" href="pub.json">
        </head><body><p>Welcome</p></body></html>"#,
    );
    write(
        dir.path(),
        "pub.json",
        &format!(
            r#"{{
                {CONTEXT},
                "id": "urn:uuid:0d4b6e2c-7f3f-4c59-9f64-0f0c6f1f2a11",
                "readingOrder": ["c1.html", "c2.html"],
                "resources": [{{"url": "nav.html", "rel": "contents"}}]
            }}"#
        ),
    );
    write(dir.path(), "c1.html", "<p>one</p>");
    write(dir.path(), "c2.html", "<p>two</p>");
    write(
        dir.path(),
        "nav.html",
        r#"<html><body><nav role="doc-toc"><h1>Contents</h1><ol>
            <li><a href="c1.html">Chapter One</a></li>
            <li><a href="c2.html">Chapter Two</a></li>
        </ol></nav></body></html>"#,
    );
    (dir, index)
}

#[test]
fn test_discover_linked_manifest() {
    let (dir, index) = linked_publication();
    let source = discover(&index, &FileFetcher).expect("Failed to discover manifest");

    let expected_base = Url::from_file_path(dir.path().join("pub.json")).unwrap();
    assert_eq!(source.base, Some(expected_base));
    assert!(source.document.is_some());

    let result = Processor::new().process(&source);
    assert!(!result.logger.has_fatal());
    // Name comes from the entry page title.
    assert_eq!(result.manifest.name(), vec!["Linked Publication"]);
    assert_eq!(result.manifest.reading_order().len(), 2);
}

#[test]
fn test_load_toc_from_disk() {
    let (_dir, index) = linked_publication();
    let source = discover(&index, &FileFetcher).unwrap();
    let mut result = Processor::new().process(&source);

    let toc = load_toc(
        &result.manifest,
        source.document.as_ref(),
        &FileFetcher,
        &mut result.logger,
    )
    .expect("Failed to extract ToC");

    assert_eq!(toc.name.as_deref(), Some("Contents"));
    let names: Vec<_> = toc
        .entries
        .as_ref()
        .unwrap()
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(names, vec!["Chapter One", "Chapter Two"]);
}

#[test]
fn test_embedded_manifest_and_toc_in_entry_page() {
    let dir = TempDir::new().unwrap();
    let index = write(
        dir.path(),
        "index.html",
        &format!(
            r##"<html lang="fr"><head>
                <title>Publication intégrée</title>
                <link rel="publication" href="#manifest">
                <script type="application/ld+json" id="manifest">
                {{ {CONTEXT}, "readingOrder": [{{"url": "index.html", "rel": "contents"}}, "c1.html"] }}
                </script>
            </head><body>
                <nav role="doc-toc"><ol><li><a href="c1.html">Chapitre</a></li></ol></nav>
            </body></html>"##
        ),
    );
    write(dir.path(), "c1.html", "<p>un</p>");

    let source = discover(&index, &FileFetcher).unwrap();
    assert_eq!(source.base.as_ref(), Some(&index));

    let mut result = Processor::new().process(&source);
    assert!(!result.logger.has_fatal());
    let names = result.manifest.root().nodes("name");
    assert_eq!(names[0].string("value"), Some("Publication intégrée"));
    assert_eq!(names[0].string("language"), Some("fr"));

    // The ToC lives in the entry page itself, which is not fetched again.
    fs::remove_file(dir.path().join("index.html")).unwrap();
    let toc = load_toc(
        &result.manifest,
        source.document.as_ref(),
        &FileFetcher,
        &mut result.logger,
    )
    .unwrap();
    assert_eq!(toc.entries.unwrap()[0].name, "Chapitre");
}

#[test]
fn test_direct_json_address() {
    let dir = TempDir::new().unwrap();
    let manifest = write(
        dir.path(),
        "pub.jsonld",
        &format!(r#"{{ {CONTEXT}, "name": "Direct", "readingOrder": ["c1.html"] }}"#),
    );

    let result = discover_and_process(&manifest, &FileFetcher, &Processor::new());
    assert!(!result.logger.has_fatal());
    let expected = Url::from_file_path(dir.path().join("c1.html")).unwrap();
    assert_eq!(result.manifest.reading_order()[0].url(), Some(&expected));
}

#[test]
fn test_entry_page_without_link() {
    let dir = TempDir::new().unwrap();
    let index = write(dir.path(), "index.html", "<html><body>No manifest</body></html>");

    assert!(matches!(
        discover(&index, &FileFetcher),
        Err(Error::NoManifestLink(_))
    ));

    let result = discover_and_process(&index, &FileFetcher, &Processor::new());
    assert!(result.manifest.is_empty());
    assert_eq!(result.logger.fatal_errors.len(), 1);
}

#[test]
fn test_missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let missing = Url::from_file_path(dir.path().join("nothing.json")).unwrap();
    assert!(matches!(discover(&missing, &FileFetcher), Err(Error::Io(_))));
}
