//! Small helpers shared by the pipeline and the fetch layer.

use std::borrow::Cow;

use url::Url;

// ============================================================================
// URL Helpers
// ============================================================================

/// Resolve `reference` against `base`.
///
/// Returns `None` when there is no base and the reference is relative, or when
/// the result is not a valid absolute URL.
pub fn resolve_url(base: Option<&Url>, reference: &str) -> Option<Url> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    match base {
        Some(base) => base.join(reference).ok(),
        // Without a base only absolute URLs survive
        None => Url::parse(reference).ok(),
    }
}

/// Copy of `url` without its fragment.
pub fn strip_fragment(url: &Url) -> Url {
    let mut stripped = url.clone();
    stripped.set_fragment(None);
    stripped
}

// ============================================================================
// Media Type Detection
// ============================================================================

/// Broad media class of a resource, guessed from its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaClass {
    Json,
    Html,
    Image,
    Audio,
    Other,
}

/// Guess the media class of a path or URL path from its extension.
pub fn media_class_from_path(path: &str) -> MediaClass {
    let path_lower = path.to_lowercase();
    let ext = path_lower.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");

    match ext {
        "json" | "jsonld" => MediaClass::Json,
        "html" | "htm" | "xhtml" => MediaClass::Html,
        "jpg" | "jpeg" | "png" | "gif" | "svg" | "webp" | "avif" => MediaClass::Image,
        "mp3" | "m4a" | "aac" | "ogg" | "oga" | "opus" | "wav" | "flac" => MediaClass::Audio,
        _ => MediaClass::Other,
    }
}

// ============================================================================
// Encoding Detection
// ============================================================================

/// Decode bytes to a string, handling various encodings.
///
/// UTF-8 is tried first (BOM handled by encoding_rs), then the hint encoding,
/// then Windows-1252 as the last resort. Returns a borrowed string when the
/// input is valid UTF-8.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Extract the charset declared in an HTML `<meta>` tag or XML declaration.
///
/// Only the first kilobyte is inspected.
pub fn extract_charset(bytes: &[u8]) -> Option<&str> {
    let check_len = bytes.len().min(1024);
    let prefix = &bytes[..check_len];

    let (marker_len, pos) = prefix
        .windows(8)
        .position(|w| w.eq_ignore_ascii_case(b"charset="))
        .map(|p| (8, p))
        .or_else(|| {
            prefix
                .windows(9)
                .position(|w| w.eq_ignore_ascii_case(b"encoding="))
                .map(|p| (9, p))
        })?;
    let mut rest = &prefix[pos + marker_len..];

    if let Some(&quote) = rest.first()
        && (quote == b'"' || quote == b'\'')
    {
        rest = &rest[1..];
    }
    let end = rest
        .iter()
        .position(|&b| matches!(b, b'"' | b'\'' | b';' | b'>' | b' ' | b'/'))
        .unwrap_or(rest.len());

    let name = std::str::from_utf8(&rest[..end]).ok()?;
    (!name.is_empty()).then_some(name)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url_relative() {
        let base = Url::parse("http://example.org/pm/").unwrap();
        assert_eq!(
            resolve_url(Some(&base), "ch1.html").unwrap().as_str(),
            "http://example.org/pm/ch1.html"
        );
        assert_eq!(
            resolve_url(Some(&base), "../img/a.png").unwrap().as_str(),
            "http://example.org/img/a.png"
        );
    }

    #[test]
    fn test_resolve_url_without_base() {
        assert!(resolve_url(None, "ch1.html").is_none());
        assert_eq!(
            resolve_url(None, "https://example.org/x").unwrap().as_str(),
            "https://example.org/x"
        );
        assert!(resolve_url(None, "").is_none());
    }

    #[test]
    fn test_strip_fragment() {
        let url = Url::parse("http://example.org/a.html#sec2").unwrap();
        assert_eq!(strip_fragment(&url).as_str(), "http://example.org/a.html");
    }

    #[test]
    fn test_media_class_from_path() {
        assert_eq!(media_class_from_path("/pub/manifest.json"), MediaClass::Json);
        assert_eq!(media_class_from_path("index.XHTML"), MediaClass::Html);
        assert_eq!(media_class_from_path("cover.JPG"), MediaClass::Image);
        assert_eq!(media_class_from_path("track01.mp3"), MediaClass::Audio);
        assert_eq!(media_class_from_path("README"), MediaClass::Other);
    }

    #[test]
    fn test_decode_text_utf8() {
        assert_eq!(decode_text("héllo".as_bytes(), None), "héllo");
    }

    #[test]
    fn test_decode_text_with_hint() {
        // "é" in ISO-8859-1
        let bytes = [b'c', b'a', b'f', 0xE9];
        assert_eq!(decode_text(&bytes, Some("iso-8859-1")), "café");
    }

    #[test]
    fn test_extract_charset() {
        assert_eq!(
            extract_charset(br#"<html><head><meta charset="windows-1252">"#),
            Some("windows-1252")
        );
        assert_eq!(
            extract_charset(
                br#"<meta http-equiv="Content-Type" content="text/html; charset=iso-8859-1">"#
            ),
            Some("iso-8859-1")
        );
        assert_eq!(
            extract_charset(br#"<?xml version="1.0" encoding="UTF-8"?>"#),
            Some("UTF-8")
        );
        assert_eq!(extract_charset(b"<html></html>"), None);
    }
}
