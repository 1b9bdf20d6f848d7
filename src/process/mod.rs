//! Manifest processing pipeline.
//!
//! Raw JSON text goes through a fixed sequence of stages:
//!
//! 1. JSON parsing and `@context` check (failures are fatal);
//! 2. profile selection from `conformsTo`;
//! 3. normalization into typed nodes ([`normalize`]);
//! 4. validation and repair ([`validate`]);
//! 5. the profile's final `generate_internal_representation` hook.
//!
//! # Example
//!
//! ```
//! use pubmanifest::{ManifestSource, Processor};
//! use url::Url;
//!
//! let text = r#"{
//!     "@context": ["https://schema.org", "https://www.w3.org/ns/pub-context"],
//!     "name": "Test",
//!     "readingOrder": ["c1.html"]
//! }"#;
//! let source = ManifestSource::new(text, Some(Url::parse("http://example.org/").unwrap()));
//!
//! let result = Processor::new().process(&source);
//! assert!(!result.logger.has_fatal());
//! assert_eq!(
//!     result.manifest.reading_order()[0].url().unwrap().as_str(),
//!     "http://example.org/c1.html"
//! );
//! ```

pub mod formats;
mod normalize;
mod validate;

use serde_json::Value as JsonValue;
use url::Url;

use crate::dom::HtmlDocument;
use crate::logger::Logger;
use crate::model::{Direction, Manifest};
use crate::profile::{DefaultProfile, Profile};

/// The schema.org vocabulary, required as the first `@context` entry.
pub const SCHEMA_ORG_CONTEXT: &str = "https://schema.org";

/// The publication context, required as the second `@context` entry.
pub const PUB_CONTEXT: &str = "https://www.w3.org/ns/pub-context";

/// Input of the pipeline: the manifest text, its base URL and, when the
/// manifest was discovered through an HTML page, that page.
#[derive(Debug)]
pub struct ManifestSource {
    pub text: String,
    pub base: Option<Url>,
    pub document: Option<HtmlDocument>,
}

impl ManifestSource {
    pub fn new(text: impl Into<String>, base: Option<Url>) -> Self {
        Self {
            text: text.into(),
            base,
            document: None,
        }
    }

    pub fn with_document(mut self, document: HtmlDocument) -> Self {
        self.document = Some(document);
        self
    }
}

/// Ambient state of one processing call.
///
/// Built once per call and passed by reference to every stage.
pub struct Context<'a> {
    pub base: Option<Url>,
    pub language: Option<String>,
    pub direction: Option<Direction>,
    pub profile: &'a dyn Profile,
    pub document: Option<&'a HtmlDocument>,
}

/// Output of the pipeline. Check `logger.fatal_errors` (or
/// `manifest.is_empty()`) to detect a fatal failure.
#[derive(Debug, Clone, Default)]
pub struct ProcessResult {
    pub manifest: Manifest,
    pub logger: Logger,
}

/// Manifest processor configured with an ordered list of profiles.
///
/// The [`DefaultProfile`] is always consulted last.
pub struct Processor {
    profiles: Vec<Box<dyn Profile>>,
    fallback: DefaultProfile,
}

impl Default for Processor {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor {
    pub fn new() -> Self {
        Self {
            profiles: Vec::new(),
            fallback: DefaultProfile,
        }
    }

    /// Register an additional profile. Earlier registrations win.
    pub fn with_profile(mut self, profile: impl Profile + 'static) -> Self {
        self.profiles.push(Box::new(profile));
        self
    }

    /// Registered profiles followed by the default one.
    pub fn profiles(&self) -> impl Iterator<Item = &dyn Profile> {
        self.profiles
            .iter()
            .map(|p| p.as_ref())
            .chain(std::iter::once(&self.fallback as &dyn Profile))
    }

    /// Process a manifest with a fresh logger.
    pub fn process(&self, source: &ManifestSource) -> ProcessResult {
        let mut logger = Logger::new();
        let manifest = self.process_with(source, &mut logger);
        ProcessResult { manifest, logger }
    }

    /// Process a manifest, recording diagnostics into a caller-supplied logger.
    pub fn process_with(&self, source: &ManifestSource, logger: &mut Logger) -> Manifest {
        let data = match serde_json::from_str::<JsonValue>(&source.text) {
            Ok(JsonValue::Object(data)) => data,
            Ok(other) => {
                logger.fatal("Manifest is not a JSON object", Some(other));
                return Manifest::default();
            }
            Err(e) => {
                logger.fatal(format!("Invalid JSON: {e}"), None);
                return Manifest::default();
            }
        };

        let Some(ambient) = check_context(data.get("@context"), logger) else {
            return Manifest::default();
        };

        let profile = self.select_profile(data.get("conformsTo"), logger);
        tracing::debug!(profile = profile.identifier(), "selected profile");

        let document = source.document.as_ref();
        let ctx = Context {
            base: source.base.clone(),
            language: ambient
                .language
                .or_else(|| document.and_then(|d| d.language()).map(str::to_string)),
            direction: ambient.direction.or_else(|| document.and_then(|d| d.direction())),
            profile,
            document,
        };

        self.run(&ctx, data, logger)
    }

    /// Re-run validation over an already processed manifest.
    ///
    /// Processing output is a fixed point of validation: the returned
    /// manifest equals the input.
    pub fn revalidate(&self, manifest: &Manifest, logger: &mut Logger) -> Manifest {
        let profile = self.match_profile(&manifest.conforms_to());
        let ctx = Context {
            base: None,
            language: None,
            direction: None,
            profile,
            document: None,
        };
        let fatal_before = logger.fatal_errors.len();
        match validate::validate_manifest(&ctx, manifest.root().clone(), logger) {
            Some((root, unique_resources)) => Manifest::new(root, unique_resources),
            None => {
                ensure_fatal(logger, fatal_before);
                Manifest::default()
            }
        }
    }

    fn run(
        &self,
        ctx: &Context<'_>,
        data: serde_json::Map<String, JsonValue>,
        logger: &mut Logger,
    ) -> Manifest {
        let fatal_before = logger.fatal_errors.len();

        tracing::debug!("normalizing");
        let normalized = normalize::normalize_manifest(ctx, data, logger);

        tracing::debug!("validating");
        let Some((validated, unique_resources)) =
            validate::validate_manifest(ctx, normalized, logger)
        else {
            ensure_fatal(logger, fatal_before);
            return Manifest::default();
        };

        let Some(root) = ctx
            .profile
            .generate_internal_representation(ctx, validated, logger)
        else {
            ensure_fatal(logger, fatal_before);
            return Manifest::default();
        };

        Manifest::new(root, unique_resources)
    }

    fn select_profile(&self, conforms_to: Option<&JsonValue>, logger: &mut Logger) -> &dyn Profile {
        let requested: Vec<&str> = match conforms_to {
            Some(JsonValue::String(s)) => vec![s.as_str()],
            Some(JsonValue::Array(items)) => items.iter().filter_map(JsonValue::as_str).collect(),
            _ => Vec::new(),
        };

        if requested.is_empty() {
            logger.warning(
                format!("No conformance class provided, falling back to {}", self.fallback.identifier()),
                None,
            );
            return &self.fallback;
        }

        let profile = self.match_profile(&requested);
        if !requested.contains(&profile.identifier()) {
            logger.warning(
                format!(
                    "Unknown conformance class, falling back to {}",
                    self.fallback.identifier()
                ),
                conforms_to.cloned(),
            );
        }
        profile
    }

    fn match_profile(&self, requested: &[&str]) -> &dyn Profile {
        self.profiles()
            .find(|p| requested.contains(&p.identifier()))
            .unwrap_or(&self.fallback)
    }
}

/// Process a manifest with only the default profile.
pub fn process_manifest(source: &ManifestSource) -> ProcessResult {
    Processor::new().process(source)
}

/// Language and direction declared in the `@context`.
#[derive(Debug, Default)]
struct Ambient {
    language: Option<String>,
    direction: Option<Direction>,
}

/// Check the `@context` array; `None` means a fatal error was logged.
fn check_context(context: Option<&JsonValue>, logger: &mut Logger) -> Option<Ambient> {
    let entries = match context {
        Some(JsonValue::Array(entries)) => entries,
        Some(other) => {
            logger.fatal("The @context must be an array", Some(other.clone()));
            return None;
        }
        None => {
            logger.fatal("No @context provided", None);
            return None;
        }
    };

    let valid = entries.len() >= 2
        && entries[0].as_str() == Some(SCHEMA_ORG_CONTEXT)
        && entries[1].as_str() == Some(PUB_CONTEXT);
    if !valid {
        logger.fatal(
            format!("The @context must start with \"{SCHEMA_ORG_CONTEXT}\" and \"{PUB_CONTEXT}\""),
            Some(JsonValue::Array(entries.clone())),
        );
        return None;
    }

    let mut ambient = Ambient::default();
    if let Some(JsonValue::Object(extra)) = entries.get(2) {
        match extra.get("language") {
            Some(JsonValue::String(lang)) if formats::is_valid_language_tag(lang) => {
                ambient.language = Some(lang.clone());
            }
            Some(other) => {
                logger.validation_error("Invalid language in @context", Some(other.clone()))
            }
            None => {}
        }
        match extra.get("direction") {
            Some(JsonValue::String(dir)) if Direction::parse(dir).is_some() => {
                ambient.direction = Direction::parse(dir);
            }
            Some(other) => {
                logger.validation_error("Invalid direction in @context", Some(other.clone()))
            }
            None => {}
        }
    }
    Some(ambient)
}

fn ensure_fatal(logger: &mut Logger, fatal_before: usize) {
    if logger.fatal_errors.len() == fatal_before {
        logger.fatal("Profile rejected the manifest", None);
    }
}
