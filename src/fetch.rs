//! Fetching and manifest discovery.
//!
//! A [`Fetcher`] turns a URL into bytes plus a content type. [`discover`]
//! decides whether an address is the manifest itself or an HTML entry page
//! linking to one, and [`load_toc`] finds and extracts the publication's
//! table of contents.

use std::borrow::Cow;
use std::collections::HashMap;

use serde_json::Value as JsonValue;
use url::Url;

use crate::dom::{ArenaDom, HtmlDocument, parse_html_bytes};
use crate::error::{Error, Result};
use crate::logger::Logger;
use crate::model::Manifest;
use crate::process::{ManifestSource, ProcessResult, Processor};
use crate::toc::{Toc, extract_toc, locate_toc_root};
use crate::util::{MediaClass, decode_text, extract_charset, media_class_from_path, strip_fragment};

/// Broad content type of a fetched resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentType {
    Json,
    Html,
    Other(String),
}

impl ContentType {
    /// Guess the content type from a path extension.
    pub fn from_path(path: &str) -> Self {
        match media_class_from_path(path) {
            MediaClass::Json => ContentType::Json,
            MediaClass::Html => ContentType::Html,
            _ => ContentType::Other(
                path.rsplit_once('.')
                    .map(|(_, ext)| ext.to_lowercase())
                    .unwrap_or_default(),
            ),
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentType::Json => f.write_str("json"),
            ContentType::Html => f.write_str("html"),
            ContentType::Other(other) => write!(f, "other ({other})"),
        }
    }
}

/// A fetched resource.
#[derive(Debug, Clone)]
pub struct Fetched {
    /// Final URL of the resource.
    pub url: Url,
    pub content_type: ContentType,
    pub body: Vec<u8>,
}

impl Fetched {
    /// Body decoded as text, honouring a BOM or an in-document charset.
    pub fn text(&self) -> Cow<'_, str> {
        decode_text(&self.body, extract_charset(&self.body))
    }
}

/// Source of remote or local resources.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &Url) -> Result<Fetched>;
}

// --- Implementation: Local File ---

/// Serves `file://` URLs from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

impl Fetcher for FileFetcher {
    fn fetch(&self, url: &Url) -> Result<Fetched> {
        if url.scheme() != "file" {
            return Err(Error::UnsupportedScheme(url.scheme().to_string()));
        }
        let path = url
            .to_file_path()
            .map_err(|()| Error::UnsupportedScheme(url.to_string()))?;
        let body = std::fs::read(&path)?;
        let content_type = ContentType::from_path(url.path());
        tracing::debug!(%url, %content_type, bytes = body.len(), "fetched");

        Ok(Fetched {
            url: strip_fragment(url),
            content_type,
            body,
        })
    }
}

// --- Implementation: In-Memory ---

/// Serves resources registered up front, keyed by fragment-free URL.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    resources: HashMap<Url, (ContentType, Vec<u8>)>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: Url, content_type: ContentType, body: impl Into<Vec<u8>>) {
        self.resources
            .insert(strip_fragment(&url), (content_type, body.into()));
    }

    pub fn with(mut self, url: Url, content_type: ContentType, body: impl Into<Vec<u8>>) -> Self {
        self.insert(url, content_type, body);
        self
    }
}

impl Fetcher for MemoryFetcher {
    fn fetch(&self, url: &Url) -> Result<Fetched> {
        let key = strip_fragment(url);
        let (content_type, body) = self.resources.get(&key).ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, format!("{key} not found"))
        })?;
        Ok(Fetched {
            url: key,
            content_type: content_type.clone(),
            body: body.clone(),
        })
    }
}

// ============================================================================
// Discovery
// ============================================================================

/// Load the manifest behind `address`.
///
/// A JSON resource is the manifest itself. An HTML resource must carry a
/// `<link rel="publication">`: a same-document fragment selects an embedded
/// `<script type="application/ld+json">`, anything else is fetched. The HTML
/// page becomes the source document either way.
pub fn discover(address: &Url, fetcher: &dyn Fetcher) -> Result<ManifestSource> {
    let fetched = fetcher.fetch(address)?;
    match fetched.content_type {
        ContentType::Json => {
            let text = fetched.text().into_owned();
            Ok(ManifestSource::new(text, Some(fetched.url)))
        }
        ContentType::Html => {
            let document = parse_html_bytes(&fetched.body, fetched.url);
            let href = find_manifest_link(&document.dom)
                .ok_or_else(|| Error::NoManifestLink(document.url.to_string()))?;
            let target = document.url.join(href)?;

            if strip_fragment(&target) == strip_fragment(&document.url)
                && let Some(id) = target.fragment()
            {
                let text = embedded_manifest(&document.dom, id)
                    .ok_or_else(|| Error::MissingEmbeddedManifest(id.to_string()))?;
                tracing::debug!(id, "using embedded manifest");
                let base = document.url.clone();
                return Ok(ManifestSource::new(text, Some(base)).with_document(document));
            }

            let manifest = fetcher.fetch(&target)?;
            if manifest.content_type != ContentType::Json {
                return Err(Error::ContentType {
                    url: manifest.url.to_string(),
                    content_type: manifest.content_type.to_string(),
                });
            }
            let text = manifest.text().into_owned();
            Ok(ManifestSource::new(text, Some(manifest.url)).with_document(document))
        }
        ContentType::Other(content_type) => Err(Error::ContentType {
            url: fetched.url.to_string(),
            content_type,
        }),
    }
}

fn find_manifest_link(dom: &ArenaDom) -> Option<&str> {
    let link = dom.find_from(dom.document(), |dom, id| {
        dom.element_name(id) == Some("link") && dom.attr_has_token(id, "rel", "publication")
    })?;
    dom.get_attr(link, "href")
}

fn embedded_manifest(dom: &ArenaDom, id: &str) -> Option<String> {
    let script = dom.get_by_id(id)?;
    let is_json_ld = dom.element_name(script) == Some("script")
        && dom
            .get_attr(script, "type")
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("application/ld+json"));
    is_json_ld.then(|| dom.text_content(script))
}

/// Discover and process in one call. Discovery failures become a fatal
/// diagnostic and an empty manifest.
pub fn discover_and_process(
    address: &Url,
    fetcher: &dyn Fetcher,
    processor: &Processor,
) -> ProcessResult {
    match discover(address, fetcher) {
        Ok(source) => processor.process(&source),
        Err(e) => {
            let mut logger = Logger::new();
            logger.fatal(
                format!("Could not load manifest: {e}"),
                Some(JsonValue::String(address.to_string())),
            );
            ProcessResult {
                manifest: Manifest::default(),
                logger,
            }
        }
    }
}

// ============================================================================
// Table of contents
// ============================================================================

/// Extract the table of contents of a processed publication.
///
/// The resource with `rel` `contents` holds it; the source document is
/// reused when it is that resource. A publication without such a resource
/// has no ToC and logs nothing.
pub fn load_toc(
    manifest: &Manifest,
    source_document: Option<&HtmlDocument>,
    fetcher: &dyn Fetcher,
    logger: &mut Logger,
) -> Option<Toc> {
    let url = manifest.find_by_rel("contents")?.url()?;
    let target = strip_fragment(url);

    let loaded;
    let document = match source_document {
        Some(document) if strip_fragment(&document.url) == target => document,
        _ => match fetcher.fetch(&target) {
            Ok(fetched) if fetched.content_type == ContentType::Html => {
                loaded = parse_html_bytes(&fetched.body, fetched.url);
                &loaded
            }
            Ok(fetched) => {
                logger.warning(
                    format!("ToC resource is not HTML ({})", fetched.content_type),
                    Some(JsonValue::String(target.to_string())),
                );
                return None;
            }
            Err(e) => {
                logger.warning(
                    format!("Could not load ToC resource: {e}"),
                    Some(JsonValue::String(target.to_string())),
                );
                return None;
            }
        },
    };

    let Some(root) = locate_toc_root(&document.dom, url.fragment()) else {
        logger.warning(
            "No table of contents element found",
            Some(JsonValue::String(url.to_string())),
        );
        return None;
    };
    extract_toc(manifest, document, root, logger)
}
