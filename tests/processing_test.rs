//! End-to-end manifest processing tests.
//!
//! These drive the public API only: raw JSON text in, processed manifest and
//! diagnostics out.

use pubmanifest::dom::parse_html;
use pubmanifest::{
    Context, Direction, Logger, ManifestSource, Node, Processor, Profile, Value, process_manifest,
};
use url::Url;

const CONTEXT: &str = r#"["https://schema.org", "https://www.w3.org/ns/pub-context"]"#;

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

/// Wrap manifest members in an object with a valid `@context`.
fn manifest_text(members: &str) -> String {
    if members.trim().is_empty() {
        format!(r#"{{"@context": {CONTEXT}}}"#)
    } else {
        format!(r#"{{"@context": {CONTEXT}, {members}}}"#)
    }
}

fn process(members: &str, base: &str) -> pubmanifest::ProcessResult {
    let source = ManifestSource::new(manifest_text(members), Some(url(base)));
    process_manifest(&source)
}

fn warning_messages(logger: &Logger) -> Vec<&str> {
    logger.warnings.iter().map(|w| w.message.as_str()).collect()
}

// ============================================================================
// Boundary checks
// ============================================================================

#[test]
fn test_missing_context_is_fatal() {
    let cases = [
        r#"{"name": "No context", "readingOrder": ["c1.html"]}"#,
        r#"{"@context": "https://schema.org", "readingOrder": ["c1.html"]}"#,
        r#"{"@context": ["https://schema.org"], "readingOrder": ["c1.html"]}"#,
        r#"{"@context": ["https://www.w3.org/ns/pub-context", "https://schema.org"], "readingOrder": ["c1.html"]}"#,
    ];
    for text in cases {
        let result = process_manifest(&ManifestSource::new(text, Some(url("http://example.org/"))));
        assert!(result.manifest.is_empty(), "{text}");
        assert_eq!(result.logger.fatal_errors.len(), 1, "{text}");
    }
}

#[test]
fn test_malformed_json_is_fatal() {
    let result = process_manifest(&ManifestSource::new("{\"name\": ", None));
    assert!(result.manifest.is_empty());
    assert_eq!(result.logger.fatal_errors.len(), 1);

    let result = process_manifest(&ManifestSource::new("[1, 2]", None));
    assert!(result.manifest.is_empty());
    assert_eq!(result.logger.fatal_errors.len(), 1);
}

// ============================================================================
// Defaults and normalization
// ============================================================================

#[test]
fn test_minimal_manifest() {
    let result = process(r#""name": "Test", "readingOrder": ["c1.html"]"#, "http://example.org/");
    let manifest = &result.manifest;

    assert!(!result.logger.has_fatal());
    assert_eq!(
        manifest.reading_order()[0].url().unwrap().as_str(),
        "http://example.org/c1.html"
    );
    assert_eq!(manifest.reading_progression(), Some(Direction::Ltr));
    assert_eq!(manifest.types(), vec!["CreativeWork"]);
    assert!(warning_messages(&result.logger).contains(&"No id provided"));
}

#[test]
fn test_relative_url_resolution() {
    let result = process(r#""name": "T", "readingOrder": ["ch1.html"]"#, "http://example.org/pm/");
    assert_eq!(
        result.manifest.reading_order()[0].url().unwrap().as_str(),
        "http://example.org/pm/ch1.html"
    );
}

#[test]
fn test_creators_and_names() {
    let result = process(
        r#""name": ["Moby Dick", {"value": "Moby-Dick; or, The Whale", "language": "en-US"}],
           "author": ["Herman Melville", {"name": "Anonymous", "type": "Organization"}],
           "readBy": {"name": {"value": "Narrator"}},
           "readingOrder": ["c1.html"]"#,
        "http://example.org/",
    );
    let manifest = &result.manifest;
    assert_eq!(
        manifest.name(),
        vec!["Moby Dick", "Moby-Dick; or, The Whale"]
    );

    let authors = manifest.root().nodes("author");
    assert_eq!(authors.len(), 2);
    assert!(authors[0].has_type("Person"));
    assert!(authors[1].has_type("Organization"));
    assert!(!authors[1].has_type("Person"));

    let readers = manifest.root().nodes("readBy");
    assert_eq!(readers.len(), 1);
    assert_eq!(readers[0].texts("name"), vec!["Narrator"]);
}

#[test]
fn test_ambient_language_from_context() {
    let text = r#"{
        "@context": ["https://schema.org", "https://www.w3.org/ns/pub-context", {"language": "fr", "direction": "ltr"}],
        "name": ["Le Livre", {"value": "The Book", "language": "en"}],
        "readingOrder": ["c1.html"]
    }"#;
    let result = process_manifest(&ManifestSource::new(text, Some(url("http://example.org/"))));
    let names = result.manifest.root().nodes("name");
    assert_eq!(names[0].string("language"), Some("fr"));
    assert_eq!(names[0].string("direction"), Some("ltr"));
    assert_eq!(names[1].string("language"), Some("en"));
}

#[test]
fn test_defaults_from_source_document() {
    let document = parse_html(
        r#"<html lang="de"><head><title>Das Buch</title></head><body></body></html>"#,
        url("http://example.org/book/index.html#start"),
    );
    let source = ManifestSource::new(manifest_text(""), Some(url("http://example.org/book/")))
        .with_document(document);

    let result = process_manifest(&source);
    assert!(!result.logger.has_fatal());

    let names = result.manifest.root().nodes("name");
    assert_eq!(names.len(), 1);
    assert_eq!(names[0].string("value"), Some("Das Buch"));
    assert_eq!(names[0].string("language"), Some("de"));

    let reading_order = result.manifest.reading_order();
    assert_eq!(reading_order.len(), 1);
    assert_eq!(
        reading_order[0].url().unwrap().as_str(),
        "http://example.org/book/index.html"
    );
}

#[test]
fn test_missing_reading_order_without_document_is_fatal() {
    let result = process(r#""name": "Nothing to read""#, "http://example.org/");
    assert!(result.manifest.is_empty());
    assert_eq!(result.logger.fatal_errors.len(), 1);
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_resources_without_url_are_removed() {
    let result = process(
        r#""name": "T",
           "readingOrder": [{"name": "no url"}, "c1.html"],
           "resources": [{"encodingFormat": "text/css"}, "style.css"],
           "links": [{"rel": "privacy-policy"}, {"url": "https://example.com/privacy", "rel": "privacy-policy"}]"#,
        "http://example.org/",
    );
    let manifest = &result.manifest;
    for resource in manifest
        .reading_order()
        .into_iter()
        .chain(manifest.resources())
        .chain(manifest.links())
    {
        assert!(resource.url().is_some());
    }
    assert_eq!(manifest.reading_order().len(), 1);
    assert_eq!(manifest.resources().len(), 1);
    assert_eq!(manifest.links().len(), 1);
}

#[test]
fn test_unique_resources_are_deduplicated() {
    let result = process(r#""name": "T", "readingOrder": ["a#x", "a#y"]"#, "http://example.org/");
    assert_eq!(result.manifest.unique_resources(), &[url("http://example.org/a")]);

    let duplicates = result
        .logger
        .warnings
        .iter()
        .filter(|w| w.message.contains("more than once"))
        .count();
    assert_eq!(duplicates, 1);
}

#[test]
fn test_links_duplicating_resources_are_removed() {
    let result = process(
        r#""name": "T",
           "readingOrder": ["c1.html"],
           "resources": ["cover.jpg"],
           "links": [
               {"url": "c1.html#top", "rel": "alternate"},
               {"url": "toc.html", "rel": "contents"},
               {"url": "https://example.com/license", "rel": "license"}
           ]"#,
        "http://example.org/",
    );
    let links = result.manifest.links();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].url().unwrap().as_str(), "https://example.com/license");
    assert_eq!(result.logger.validation_errors.len(), 2);
}

#[test]
fn test_ill_typed_values_are_removed() {
    let result = process(
        r#""name": "T",
           "readingOrder": ["c1.html"],
           "abridged": "no",
           "dateModified": "yesterday",
           "duration": "PT1H30M",
           "inLanguage": ["en", 42],
           "readingProgression": "sideways""#,
        "http://example.org/",
    );
    let root = result.manifest.root();
    assert!(!root.contains("abridged"));
    assert!(!root.contains("dateModified"));
    assert_eq!(root.string("duration"), Some("PT1H30M"));
    assert_eq!(root.strings("inLanguage"), vec!["en"]);
    assert_eq!(result.manifest.reading_progression(), Some(Direction::Ltr));
    assert_eq!(result.logger.validation_errors.len(), 4);
}

#[test]
fn test_unknown_terms_are_preserved() {
    let result = process(
        r#""name": "T", "readingOrder": ["c1.html"], "x-publisher-id": {"isbn": "978-0"}"#,
        "http://example.org/",
    );
    assert_eq!(
        result.manifest.get("x-publisher-id").map(Value::to_json),
        Some(serde_json::json!({"isbn": "978-0"}))
    );
}

#[test]
fn test_revalidation_is_a_fixed_point() {
    let result = process(
        r#""id": "urn:isbn:9780000000000",
           "name": ["T", {"value": "", "language": "en"}],
           "author": ["A", 42, {"name": "B"}],
           "readingOrder": ["c1.html", "c1.html#frag", {"url": "c2.html", "length": 3}],
           "resources": [{"url": "cover.png", "rel": "cover"}, {"url": "audio.mp3", "alternate": ["audio.ogg"]}],
           "links": [{"url": "c2.html"}, {"url": "https://example.com/about"}],
           "accessModeSufficient": {"type": "ItemList", "itemListElement": ["textual"]},
           "inLanguage": ["en", "??"]"#,
        "http://example.org/",
    );
    assert!(!result.logger.has_fatal());

    let processor = Processor::new();
    let mut logger = Logger::new();
    let again = processor.revalidate(&result.manifest, &mut logger);
    assert_eq!(again, result.manifest);
    assert!(logger.validation_errors.is_empty());
}

#[test]
fn test_empty_type_gets_default() {
    let result = process(
        r#""name": "T", "type": [], "readingOrder": ["c1.html"]"#,
        "http://example.org/",
    );
    assert!(!result.logger.has_fatal());
    assert_eq!(result.manifest.types(), vec!["CreativeWork"]);
    assert!(warning_messages(&result.logger).contains(&"No type provided, defaulting to CreativeWork"));

    let mut logger = Logger::new();
    let again = Processor::new().revalidate(&result.manifest, &mut logger);
    assert_eq!(again, result.manifest);
    assert!(logger.validation_errors.is_empty());
}

#[test]
fn test_type_emptied_by_validation_gets_default() {
    let result = process(
        r#""name": "T", "type": [42, true], "readingOrder": ["c1.html"]"#,
        "http://example.org/",
    );
    assert_eq!(result.manifest.types(), vec!["CreativeWork"]);
    assert_eq!(result.logger.validation_errors.len(), 2);
}

#[test]
fn test_serialized_manifest_has_sorted_properties() {
    let result = process(r#""readingOrder": ["c1.html"], "name": "T""#, "http://example.org/");
    let json = serde_json::to_value(&result.manifest).unwrap();
    let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    assert_eq!(json["readingOrder"][0]["url"], "http://example.org/c1.html");
}

// ============================================================================
// Profiles
// ============================================================================

/// Requires a duration and tags every resource it sees.
struct Audiobook;

impl Profile for Audiobook {
    fn identifier(&self) -> &str {
        "https://www.w3.org/TR/audiobooks/"
    }

    fn data_validation(&self, _ctx: &Context<'_>, mut manifest: Node, logger: &mut Logger) -> Node {
        if !manifest.contains("duration") {
            logger.warning("Audiobook without duration", None);
            manifest.set("duration", Value::String("PT0S".to_string()));
        }
        manifest
    }

    fn generate_internal_representation(
        &self,
        _ctx: &Context<'_>,
        manifest: Node,
        logger: &mut Logger,
    ) -> Option<Node> {
        let has_audio = manifest
            .nodes("readingOrder")
            .iter()
            .any(|r| r.string("encodingFormat").is_some_and(|f| f.starts_with("audio/")));
        if !has_audio {
            logger.fatal("Audiobook without audio in the reading order", None);
            return None;
        }
        Some(manifest)
    }
}

#[test]
fn test_profile_hooks_are_invoked() {
    let text = manifest_text(
        r#""conformsTo": "https://www.w3.org/TR/audiobooks/",
           "name": "Listen",
           "readingOrder": [{"url": "t1.mp3", "encodingFormat": "audio/mpeg"}]"#,
    );
    let processor = Processor::new().with_profile(Audiobook);
    let result = processor.process(&ManifestSource::new(text, Some(url("http://example.org/"))));

    assert!(!result.logger.has_fatal());
    assert_eq!(result.manifest.root().string("duration"), Some("PT0S"));
    assert!(warning_messages(&result.logger).contains(&"Audiobook without duration"));
}

#[test]
fn test_profile_can_reject() {
    let text = manifest_text(
        r#""conformsTo": ["https://www.w3.org/TR/audiobooks/"],
           "name": "Silent",
           "readingOrder": ["c1.html"]"#,
    );
    let processor = Processor::new().with_profile(Audiobook);
    let result = processor.process(&ManifestSource::new(text, Some(url("http://example.org/"))));

    assert!(result.manifest.is_empty());
    assert_eq!(result.logger.fatal_errors.len(), 1);
}

#[test]
fn test_unknown_profile_falls_back_with_warning() {
    let result = process(
        r#""conformsTo": "https://example.org/unknown-profile", "name": "T", "readingOrder": ["c1.html"]"#,
        "http://example.org/",
    );
    assert!(!result.logger.has_fatal());
    assert!(
        warning_messages(&result.logger)
            .iter()
            .any(|m| m.starts_with("Unknown conformance class"))
    );
}
