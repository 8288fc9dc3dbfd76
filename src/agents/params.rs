// Pattern extraction of command parameters from raw input text
//
// Used only when the resolved intent does not carry the parameter itself.

use regex::Regex;
use std::sync::LazyLock;

use crate::domain::region::LOCATION_KEYWORDS;
use crate::intent::Intent;

/// Instance size used when none is given
pub const DEFAULT_INSTANCE_TYPE: &str = "t2.micro";

static INSTANCE_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(i-[a-f0-9]{8,17})\b").expect("INSTANCE_ID_RE is a compile-time constant")
});

static LABELLED_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\binstances?\s+(?:id\s+)?([a-z0-9]+-[a-z0-9-]+)")
        .expect("LABELLED_ID_RE is a compile-time constant")
});

static BUCKET_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\bbucket\s+([a-z0-9][a-z0-9.\-]{1,61}[a-z0-9])\b",
        r"\bin\s+([a-z0-9][a-z0-9.\-]{1,61}[a-z0-9])\b",
        r"\b(?:named?|called)\s+([a-z0-9][a-z0-9.\-]{1,61}[a-z0-9])\b",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("BUCKET_RES are compile-time constants"))
    .collect()
});

static REGION_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:us|eu|ap|ca|sa)-(?:east|west|south|central|north|northeast|southeast)-[1-3]\b",
    )
    .expect("REGION_CODE_RE is a compile-time constant")
});

// Hyphens count as part of a word so bucket names like "paris-photos" are not places
static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?:^|[^a-z0-9\-])({})(?:$|[^a-z0-9\-])",
        LOCATION_KEYWORDS.join("|")
    ))
    .expect("LOCATION_RE is built from constant keywords")
});

static INSTANCE_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bt[23]\.(?:nano|micro|small|medium|large|xlarge)\b")
        .expect("INSTANCE_TYPE_RE is a compile-time constant")
});

/// Words that follow "bucket"/"in"/"named" without being a bucket name
const BUCKET_STOPWORDS: &[&str] = &["named", "name", "called", "for", "the", "bucket", "with"];

/// Explicit intent parameter first, then the text extractor
pub fn resolve(
    intent: &Intent,
    key: &str,
    text: &str,
    extract: fn(&str) -> Option<String>,
) -> Option<String> {
    intent.param(key).or_else(|| extract(text))
}

pub fn extract_instance_id(text: &str) -> Option<String> {
    INSTANCE_ID_RE
        .captures(text)
        .or_else(|| LABELLED_ID_RE.captures(text))
        .map(|caps| caps[1].to_string())
}

pub fn extract_bucket_name(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();

    BUCKET_RES.iter().find_map(|re| {
        re.captures_iter(&lowered)
            .map(|caps| caps[1].to_string())
            .find(|candidate| {
                !BUCKET_STOPWORDS.contains(&candidate.as_str())
                    && !LOCATION_KEYWORDS.contains(&candidate.as_str())
                    && !REGION_CODE_RE.is_match(candidate)
            })
    })
}

/// A region code or a recognised place name, left for the region table to map
pub fn extract_region(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();

    if let Some(found) = REGION_CODE_RE.find(&lowered) {
        return Some(found.as_str().to_string());
    }

    LOCATION_RE
        .captures(&lowered)
        .map(|caps| caps[1].to_string())
}

pub fn extract_instance_type(text: &str) -> Option<String> {
    INSTANCE_TYPE_RE
        .find(&text.to_lowercase())
        .map(|found| found.as_str().to_string())
}
