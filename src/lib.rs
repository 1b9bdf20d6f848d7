//! # pubmanifest
//!
//! Processing of JSON publication manifests (web publications, audiobooks)
//! into a validated, strictly typed representation, and extraction of the
//! table of contents from the publication's HTML.
//!
//! ## Features
//!
//! - Normalizes shorthand manifest data (bare strings, single values,
//!   relative URLs) into typed nodes
//! - Validates every property against the publication vocabulary, repairing
//!   or removing bad data and recording why
//! - Pluggable conformance profiles through the [`Profile`] trait
//! - Table of contents extraction from `<nav role="doc-toc">` markup
//! - Manifest discovery from HTML entry pages
//!
//! ## Quick Start
//!
//! ```
//! use pubmanifest::{ManifestSource, process_manifest};
//! use url::Url;
//!
//! let text = r#"{
//!     "@context": ["https://schema.org", "https://www.w3.org/ns/pub-context"],
//!     "name": "Moby Dick",
//!     "author": "Herman Melville",
//!     "readingOrder": ["chapter1.html", "chapter2.html"]
//! }"#;
//! let base = Url::parse("https://example.org/moby/").unwrap();
//!
//! let result = process_manifest(&ManifestSource::new(text, Some(base)));
//! assert!(!result.logger.has_fatal());
//!
//! let manifest = result.manifest;
//! assert_eq!(manifest.name(), vec!["Moby Dick"]);
//! assert_eq!(manifest.reading_order().len(), 2);
//! assert_eq!(manifest.types(), vec!["CreativeWork"]);
//!
//! // Missing recommended terms are reported, not fatal.
//! for (severity, diagnostic) in result.logger.iter() {
//!     println!("{severity}: {diagnostic}");
//! }
//! ```
//!
//! ## Loading from disk
//!
//! ```no_run
//! use pubmanifest::{FileFetcher, Processor, discover, load_toc};
//! use url::Url;
//!
//! let address = Url::from_file_path("/books/moby/index.html").unwrap();
//! let source = discover(&address, &FileFetcher).unwrap();
//!
//! let mut result = Processor::new().process(&source);
//! let toc = load_toc(
//!     &result.manifest,
//!     source.document.as_ref(),
//!     &FileFetcher,
//!     &mut result.logger,
//! );
//! println!("{} ToC entries", toc.map_or(0, |t| t.len()));
//! ```

pub mod dom;
pub mod error;
pub mod fetch;
pub mod logger;
pub mod model;
pub mod process;
pub mod profile;
pub mod toc;
pub(crate) mod util;

pub use error::{Error, Result};
pub use fetch::{
    ContentType, Fetched, Fetcher, FileFetcher, MemoryFetcher, discover, discover_and_process,
    load_toc,
};
pub use logger::{Diagnostic, Logger, Severity};
pub use model::{Direction, EntityKind, Manifest, Node, NodeKind, Value};
pub use process::{Context, ManifestSource, ProcessResult, Processor, process_manifest};
pub use profile::{DEFAULT_PROFILE, DefaultProfile, Profile};
pub use toc::{Toc, TocEntry, extract_toc, locate_toc_root};
