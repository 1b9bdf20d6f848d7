//! Well-formedness checks for language tags, durations and dates.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

// RFC 5646 `Language-Tag` production, without registry lookups.
static BCP47_RE: LazyLock<Regex> = LazyLock::new(|| {
    let language = r"(?:[a-z]{2,3}(?:-[a-z]{3}){0,3}|[a-z]{4}|[a-z]{5,8})";
    let script = r"(?:-[a-z]{4})?";
    let region = r"(?:-(?:[a-z]{2}|[0-9]{3}))?";
    let variant = r"(?:-(?:[a-z0-9]{5,8}|[0-9][a-z0-9]{3}))*";
    let extension = r"(?:-[0-9a-wy-z](?:-[a-z0-9]{2,8})+)*";
    let private_use = r"(?:-x(?:-[a-z0-9]{1,8})+)?";
    let pattern = format!(
        r"(?i)^(?:{language}{script}{region}{variant}{extension}{private_use}|x(?:-[a-z0-9]{{1,8}})+|{grandfathered})$",
        grandfathered = r"en-gb-oed|i-ami|i-bnn|i-default|i-enochian|i-hak|i-klingon|i-lux|i-mingo|i-navajo|i-pwn|i-tao|i-tay|i-tsu|sgn-be-fr|sgn-be-nl|sgn-ch-de|art-lojban|cel-gaulish|no-bok|no-nyn|zh-guoyu|zh-hakka|zh-min|zh-min-nan|zh-xiang",
    );
    Regex::new(&pattern).unwrap()
});

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^P(?:\d+(?:[.,]\d+)?Y)?(?:\d+(?:[.,]\d+)?M)?(?:\d+(?:[.,]\d+)?W)?(?:\d+(?:[.,]\d+)?D)?(?:T(?:\d+(?:[.,]\d+)?H)?(?:\d+(?:[.,]\d+)?M)?(?:\d+(?:[.,]\d+)?S)?)?$",
    )
    .unwrap()
});

static YEAR_MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}(?:-(?:0[1-9]|1[0-2]))?$").unwrap());

/// Whether `tag` is a well-formed BCP 47 language tag.
pub fn is_valid_language_tag(tag: &str) -> bool {
    BCP47_RE.is_match(tag)
}

/// Whether `value` follows the ISO 8601 duration grammar (`PnYnMnWnDTnHnMnS`).
pub fn is_valid_duration(value: &str) -> bool {
    // "P" and a dangling "T" match the pattern but carry no component
    value.len() > 1 && !value.ends_with('T') && DURATION_RE.is_match(value)
}

/// Whether `value` is an ISO 8601 date or date-time.
///
/// Accepts `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, and date-times with or without
/// an offset.
pub fn is_valid_date(value: &str) -> bool {
    if YEAR_MONTH_RE.is_match(value) {
        return true;
    }
    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() {
        return true;
    }
    if DateTime::parse_from_rfc3339(value).is_ok() {
        return true;
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .any(|format| NaiveDateTime::parse_from_str(value, format).is_ok())
}
